use crate::config::Config;
use smilegate_core::{CameraConstraints, FaceMesh, GateBackend, GateError};
use smilegate_hw::{Camera, LiveVideo};

/// Acquires the real collaborators: the face mesh model and the webcam.
pub struct HardwareBackend {
    config: Config,
}

impl HardwareBackend {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl GateBackend for HardwareBackend {
    type Model = FaceMesh;
    type Video = LiveVideo;

    async fn load_model(&mut self) -> Result<FaceMesh, GateError> {
        let path = self.config.model_path_str();
        let mesh = FaceMesh::load(&path, self.config.mesh_config())?;
        tracing::info!(path = %path, "face mesh loaded");
        Ok(mesh)
    }

    async fn open_camera(&mut self, constraints: CameraConstraints) -> Result<LiveVideo, GateError> {
        let device = self.config.camera_device.as_str();
        let camera = Camera::open(device, constraints.width, constraints.height)
            .map_err(|e| GateError::Camera(e.to_string()))?;
        tracing::info!(
            device,
            width = camera.width,
            height = camera.height,
            fourcc = ?camera.fourcc,
            "camera opened"
        );
        LiveVideo::start(camera).map_err(|e| GateError::Camera(e.to_string()))
    }
}
