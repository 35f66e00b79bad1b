//! smilegate-core — Smile detection and the unlock reveal.
//!
//! A face mesh model measures mouth width every frame; five consecutive wide
//! frames open the gate, which snaps a photo, plays the stamp animation and
//! binds the portfolio's horizontal scroll.

pub mod gate;
pub mod mesh;
pub mod model;
pub mod player;
pub mod scroll;
pub mod smile;
pub mod stage;
pub mod timeline;
pub mod types;

pub use gate::{
    run_gate, CameraConstraints, GateBackend, GateConfig, GateError, GateOutcome, Session, Tick,
    UnlockTrigger, VideoSource,
};
pub use mesh::{FaceMesh, MeshConfig};
pub use model::{FaceModel, ModelError};
pub use scroll::{Layout, ScrollBinding, ScrollSurface, Scrubber};
pub use smile::{SmileConfig, SmileDebouncer, SmileVerdict};
pub use stage::{Stage, Status};
pub use types::{CapturedPhoto, Face, LandmarkSet, Point, VideoFrame};

/// Default directory for ONNX model files (`$XDG_DATA_HOME/smilegate/models`).
pub fn default_model_dir() -> std::path::PathBuf {
    let data_dir = std::env::var("XDG_DATA_HOME")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            std::path::PathBuf::from(home).join(".local/share")
        });
    data_dir.join("smilegate").join("models")
}
