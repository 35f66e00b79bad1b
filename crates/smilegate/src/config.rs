use anyhow::Context;
use serde::Deserialize;
use smilegate_core::{CameraConstraints, GateConfig, Layout, MeshConfig, SmileConfig};
use std::path::PathBuf;

/// Gate configuration: defaults, optionally seeded from a TOML file named by
/// `SMILEGATE_CONFIG`, then overridden by `SMILEGATE_*` environment variables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// V4L2 device path (default: /dev/video0).
    pub camera_device: String,
    /// Requested capture size; the driver may negotiate another.
    pub capture_width: u32,
    pub capture_height: u32,
    /// Face mesh ONNX model.
    pub model_path: PathBuf,
    /// Mouth width (pixels) a frame must exceed.
    pub smile_threshold: f32,
    /// Consecutive wide frames needed to unlock.
    pub confirm_frames: u32,
    /// Detector and animation cadence.
    pub refresh_hz: u32,
    pub max_faces: usize,
    /// Minimum face presence probability.
    pub presence_threshold: f32,
    /// Simulated portfolio layout for the terminal stage.
    pub content_width: f32,
    pub viewport_width: f32,
    pub trigger_top: f32,
    /// Scroll scrub smoothing in seconds.
    pub scrub_secs: f32,
    /// Export the captured photo as PNG here.
    pub photo_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let gate = GateConfig::default();
        let mesh = MeshConfig::default();
        Self {
            camera_device: "/dev/video0".to_string(),
            capture_width: gate.camera.width,
            capture_height: gate.camera.height,
            model_path: smilegate_core::default_model_dir().join("face_landmark.onnx"),
            smile_threshold: gate.smile.threshold,
            confirm_frames: gate.smile.confirm_frames,
            refresh_hz: gate.refresh_hz,
            max_faces: mesh.max_faces,
            presence_threshold: mesh.presence_threshold,
            content_width: 4000.0,
            viewport_width: 1280.0,
            trigger_top: 0.0,
            scrub_secs: gate.scrub_secs,
            photo_path: None,
        }
    }
}

impl Config {
    /// Load from the optional TOML file, then apply environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = match std::env::var("SMILEGATE_CONFIG") {
            Ok(path) => {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config file {path}"))?;
                Self::from_toml(&text).with_context(|| format!("invalid config file {path}"))?
            }
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Apply `SMILEGATE_*` overrides from `lookup`. Unparseable values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("SMILEGATE_CAMERA_DEVICE") {
            self.camera_device = v;
        }
        if let Some(v) = lookup("SMILEGATE_MODEL_PATH") {
            self.model_path = PathBuf::from(v);
        } else if let Some(v) = lookup("SMILEGATE_MODEL_DIR") {
            self.model_path = PathBuf::from(v).join("face_landmark.onnx");
        }
        if let Some(v) = lookup("SMILEGATE_PHOTO_PATH") {
            self.photo_path = Some(PathBuf::from(v));
        }

        override_parsed(&lookup, "SMILEGATE_CAPTURE_WIDTH", &mut self.capture_width);
        override_parsed(&lookup, "SMILEGATE_CAPTURE_HEIGHT", &mut self.capture_height);
        override_parsed(&lookup, "SMILEGATE_SMILE_THRESHOLD", &mut self.smile_threshold);
        override_parsed(&lookup, "SMILEGATE_CONFIRM_FRAMES", &mut self.confirm_frames);
        override_parsed(&lookup, "SMILEGATE_REFRESH_HZ", &mut self.refresh_hz);
        override_parsed(&lookup, "SMILEGATE_MAX_FACES", &mut self.max_faces);
        override_parsed(&lookup, "SMILEGATE_PRESENCE_THRESHOLD", &mut self.presence_threshold);
        override_parsed(&lookup, "SMILEGATE_CONTENT_WIDTH", &mut self.content_width);
        override_parsed(&lookup, "SMILEGATE_VIEWPORT_WIDTH", &mut self.viewport_width);
        override_parsed(&lookup, "SMILEGATE_TRIGGER_TOP", &mut self.trigger_top);
        override_parsed(&lookup, "SMILEGATE_SCRUB_SECS", &mut self.scrub_secs);
    }

    pub fn model_path_str(&self) -> String {
        self.model_path.to_string_lossy().into_owned()
    }

    pub fn gate_config(&self) -> GateConfig {
        GateConfig {
            smile: SmileConfig {
                threshold: self.smile_threshold,
                confirm_frames: self.confirm_frames,
            },
            refresh_hz: self.refresh_hz,
            scrub_secs: self.scrub_secs,
            camera: CameraConstraints {
                width: self.capture_width,
                height: self.capture_height,
            },
        }
    }

    pub fn mesh_config(&self) -> MeshConfig {
        MeshConfig {
            max_faces: self.max_faces,
            presence_threshold: self.presence_threshold,
        }
    }

    pub fn layout(&self) -> Layout {
        Layout {
            content_width: self.content_width,
            viewport_width: self.viewport_width,
            trigger_top: self.trigger_top,
        }
    }
}

fn override_parsed<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    slot: &mut T,
) {
    if let Some(raw) = lookup(key) {
        match raw.parse() {
            Ok(value) => *slot = value,
            Err(_) => tracing::warn!(key, value = %raw, "ignoring unparseable override"),
        }
    }
}
