//! Face mesh landmark model via ONNX Runtime.
//!
//! Runs a 468-point face landmark network (192×192 RGB input) on the centred
//! square crop of each frame and maps the landmarks back to frame pixels.
//! There is no separate face detector: a face that does not fill the crop
//! reports a low presence score and is dropped.

use crate::model::{FaceModel, ModelError};
use crate::types::{Face, LandmarkSet, Point, VideoFrame};
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;

const MESH_INPUT_SIZE: usize = 192;
const MESH_LANDMARK_COUNT: usize = 468;
const MESH_VALUES_PER_LANDMARK: usize = 3;
const MESH_PIXEL_SCALE: f32 = 255.0;
const MESH_DEFAULT_PRESENCE_THRESHOLD: f32 = 0.5;

/// Load-time options.
#[derive(Debug, Clone, Copy)]
pub struct MeshConfig {
    /// Upper bound on faces returned per frame.
    pub max_faces: usize,
    /// Minimum presence probability for a face to be reported.
    pub presence_threshold: f32,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            max_faces: 1,
            presence_threshold: MESH_DEFAULT_PRESENCE_THRESHOLD,
        }
    }
}

/// Square region of the source frame fed to the network.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CropRegion {
    x: usize,
    y: usize,
    size: usize,
}

/// Output tensor indices: (landmarks, optional presence score).
type MeshOutputIndices = (usize, Option<usize>);

pub struct FaceMesh {
    session: Session,
    config: MeshConfig,
    outputs: MeshOutputIndices,
}

impl FaceMesh {
    /// Load the face mesh ONNX model from the given path.
    pub fn load(model_path: &str, config: MeshConfig) -> Result<Self, ModelError> {
        if !Path::new(model_path).exists() {
            return Err(ModelError::ModelNotFound(model_path.to_string()));
        }

        let session = Session::builder()?
            .with_intra_threads(2)?
            .commit_from_file(model_path)?;

        let output_names: Vec<String> = session.outputs().iter().map(|o| o.name().to_string()).collect();

        tracing::info!(
            path = model_path,
            inputs = ?session.inputs().iter().map(|i| (i.name(), i.dtype())).collect::<Vec<_>>(),
            outputs = ?output_names,
            max_faces = config.max_faces,
            "loaded face mesh model"
        );

        if output_names.is_empty() {
            return Err(ModelError::InferenceFailed(
                "face mesh model exposes no outputs".into(),
            ));
        }

        let outputs = discover_output_indices(&output_names);
        tracing::debug!(?outputs, "face mesh output tensor mapping");

        Ok(Self {
            session,
            config,
            outputs,
        })
    }

    /// Estimate landmarks for the face filling the centre of `frame`.
    pub fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<Face>, ModelError> {
        if self.config.max_faces == 0 {
            return Ok(Vec::new());
        }
        if frame.data.len() < frame.expected_len() || frame.width == 0 || frame.height == 0 {
            return Err(ModelError::InferenceFailed(format!(
                "frame buffer too short: expected {}, got {}",
                frame.expected_len(),
                frame.data.len()
            )));
        }

        let crop = crop_region(frame.width as usize, frame.height as usize);
        let input = preprocess(&frame.data, frame.width as usize, crop);

        let outputs = self.session.run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let (landmarks_idx, score_idx) = self.outputs;

        let confidence = match score_idx {
            Some(idx) => {
                let (_, logits) = outputs[idx]
                    .try_extract_tensor::<f32>()
                    .map_err(|e| ModelError::InferenceFailed(format!("presence score: {e}")))?;
                sigmoid(logits.first().copied().unwrap_or(f32::NEG_INFINITY))
            }
            None => 1.0,
        };

        if confidence < self.config.presence_threshold {
            tracing::trace!(confidence, "no face in crop");
            return Ok(Vec::new());
        }

        let (_, raw) = outputs[landmarks_idx]
            .try_extract_tensor::<f32>()
            .map_err(|e| ModelError::InferenceFailed(format!("landmarks: {e}")))?;

        let expected = MESH_LANDMARK_COUNT * MESH_VALUES_PER_LANDMARK;
        if raw.len() < expected {
            return Err(ModelError::InferenceFailed(format!(
                "expected {expected} landmark values, got {}",
                raw.len()
            )));
        }

        let mut faces = vec![Face {
            landmarks: decode_landmarks(&raw[..expected], crop),
            confidence,
        }];
        faces.truncate(self.config.max_faces);
        Ok(faces)
    }
}

impl FaceModel for FaceMesh {
    async fn estimate_faces(&mut self, frame: &VideoFrame) -> Result<Vec<Face>, ModelError> {
        self.detect(frame)
    }
}

/// Discover output tensor ordering by name.
///
/// MediaPipe exports name the landmark tensor "conv2d_21" and the presence
/// logit "conv2d_31"; re-exports tend to use "landmarks" / "score". Falls back
/// to positional ordering [0] = landmarks, [1] = score.
fn discover_output_indices(names: &[String]) -> MeshOutputIndices {
    let find = |needles: &[&str]| -> Option<usize> {
        names.iter().position(|n| {
            let n = n.to_ascii_lowercase();
            needles.iter().any(|needle| n.contains(needle))
        })
    };

    let landmarks = find(&["landmark", "conv2d_21"]);
    let score = find(&["score", "flag", "presence", "conv2d_31"]);

    match landmarks {
        Some(idx) => (idx, score.filter(|&s| s != idx)),
        None => {
            tracing::info!(
                ?names,
                "face mesh: output names not recognized, using positional mapping [0]=landmarks, [1]=score"
            );
            (0, (names.len() > 1).then_some(1))
        }
    }
}

/// Largest centred square that fits in the frame.
fn crop_region(width: usize, height: usize) -> CropRegion {
    let size = width.min(height);
    CropRegion {
        x: (width - size) / 2,
        y: (height - size) / 2,
        size,
    }
}

/// Bilinear-resize the crop to an NHWC float tensor scaled to [0, 1].
fn preprocess(rgb: &[u8], width: usize, crop: CropRegion) -> Array4<f32> {
    let out = MESH_INPUT_SIZE;
    let mut tensor = Array4::<f32>::zeros((1, out, out, 3));
    let scale = crop.size as f32 / out as f32;
    let max = crop.size - 1;

    for y in 0..out {
        let src_y = (y as f32 + 0.5) * scale - 0.5;
        let y0 = (src_y.floor() as i32).clamp(0, max as i32) as usize;
        let y1 = (y0 + 1).min(max);
        let fy = (src_y - src_y.floor()).clamp(0.0, 1.0);

        for x in 0..out {
            let src_x = (x as f32 + 0.5) * scale - 0.5;
            let x0 = (src_x.floor() as i32).clamp(0, max as i32) as usize;
            let x1 = (x0 + 1).min(max);
            let fx = (src_x - src_x.floor()).clamp(0.0, 1.0);

            let at = |cx: usize, cy: usize, c: usize| -> f32 {
                rgb[((crop.y + cy) * width + crop.x + cx) * 3 + c] as f32
            };

            for c in 0..3 {
                let val = at(x0, y0, c) * (1.0 - fx) * (1.0 - fy)
                    + at(x1, y0, c) * fx * (1.0 - fy)
                    + at(x0, y1, c) * (1.0 - fx) * fy
                    + at(x1, y1, c) * fx * fy;
                tensor[[0, y, x, c]] = val / MESH_PIXEL_SCALE;
            }
        }
    }

    tensor
}

/// Map raw network coordinates (192-pixel input space) back to frame pixels.
fn decode_landmarks(raw: &[f32], crop: CropRegion) -> LandmarkSet {
    let scale = crop.size as f32 / MESH_INPUT_SIZE as f32;
    let points = raw
        .chunks_exact(MESH_VALUES_PER_LANDMARK)
        .map(|v| {
            Point::new(
                crop.x as f32 + v[0] * scale,
                crop.y as f32 + v[1] * scale,
                v[2] * scale,
            )
        })
        .collect();
    LandmarkSet::new(points)
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
