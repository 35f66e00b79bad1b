use crate::types::{Face, VideoFrame};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("model file not found: {0} — download a face landmark ONNX model and place it in models/")]
    ModelNotFound(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// Face landmark estimator consulted once per detector tick.
///
/// Returns zero or more faces, each with an indexable landmark set.
/// An empty result is not an error.
#[allow(async_fn_in_trait)]
pub trait FaceModel {
    async fn estimate_faces(&mut self, frame: &VideoFrame) -> Result<Vec<Face>, ModelError>;
}
