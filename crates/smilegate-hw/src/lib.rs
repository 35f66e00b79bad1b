//! smilegate-hw — Webcam capture for the smile gate.
//!
//! Provides V4L2-based camera access, pixel conversion to RGB8 and a live
//! video source that always exposes the most recent frame.

pub mod camera;
pub mod frame;
pub mod live;

pub use camera::{Camera, CameraError, DeviceInfo, PixelFormat};
pub use live::LiveVideo;
