//! Smile metric and consecutive-frame debouncing.
//!
//! The metric is the mouth width: the 2D distance between the left and right
//! mouth-corner landmarks of the face mesh. A smile is confirmed once the
//! width stays above the threshold for a run of consecutive frames.

use crate::types::{LandmarkSet, Point};

/// Face mesh index of the left mouth corner.
pub const MOUTH_LEFT_INDEX: usize = 61;
/// Face mesh index of the right mouth corner.
pub const MOUTH_RIGHT_INDEX: usize = 291;
/// Mouth width (frame pixels) a frame must exceed to count as smiling.
pub const SMILE_THRESHOLD: f32 = 50.0;
/// Consecutive smiling frames required to confirm.
pub const SMILE_CONFIRM_FRAMES: u32 = 5;

/// 2D Euclidean distance between two optional points. Missing points yield 0.
pub fn point_distance(a: Option<&Point>, b: Option<&Point>) -> f32 {
    let (Some(a), Some(b)) = (a, b) else {
        return 0.0;
    };
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Mouth-corner distance for one face.
pub fn smile_metric(landmarks: &LandmarkSet) -> f32 {
    point_distance(
        landmarks.get(MOUTH_LEFT_INDEX),
        landmarks.get(MOUTH_RIGHT_INDEX),
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmileConfig {
    pub threshold: f32,
    pub confirm_frames: u32,
}

impl Default for SmileConfig {
    fn default() -> Self {
        Self {
            threshold: SMILE_THRESHOLD,
            confirm_frames: SMILE_CONFIRM_FRAMES,
        }
    }
}

/// Outcome of feeding one metric into the debouncer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmileVerdict {
    /// Above threshold; this many consecutive frames so far.
    Building(u32),
    /// At or below threshold; the run was reset to zero.
    Reset,
    /// The run reached `confirm_frames`.
    Confirmed,
}

/// Consecutive-frame counter. Any sub-threshold frame fully resets it.
#[derive(Debug, Clone)]
pub struct SmileDebouncer {
    config: SmileConfig,
    count: u32,
}

impl SmileDebouncer {
    pub fn new(config: SmileConfig) -> Self {
        Self { config, count: 0 }
    }

    pub fn observe(&mut self, metric: f32) -> SmileVerdict {
        if metric > self.config.threshold {
            self.count += 1;
            if self.count >= self.config.confirm_frames {
                SmileVerdict::Confirmed
            } else {
                SmileVerdict::Building(self.count)
            }
        } else {
            self.count = 0;
            SmileVerdict::Reset
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn config(&self) -> &SmileConfig {
        &self.config
    }
}

impl Default for SmileDebouncer {
    fn default() -> Self {
        Self::new(SmileConfig::default())
    }
}
