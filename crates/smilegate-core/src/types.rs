use serde::{Deserialize, Serialize};

/// A single landmark point in frame pixel coordinates.
///
/// `z` is the model's relative depth; the smile metric ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Ordered landmark points for one detected face, indexable by anatomical index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LandmarkSet {
    points: Vec<Point>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Landmark at `index`, or `None` when the model produced fewer points.
    pub fn get(&self, index: usize) -> Option<&Point> {
        self.points.get(index)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

/// A face returned by the landmark model for one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Face {
    pub landmarks: LandmarkSet,
    /// Face presence probability in [0, 1].
    pub confidence: f32,
}

/// A decoded camera frame at the source's native resolution.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Packed RGB8 pixel data, row-major (width * height * 3 bytes).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub sequence: u32,
}

impl VideoFrame {
    /// Expected byte length for packed RGB8 at this frame's size.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

/// Still image copied from the live video at the moment of unlock.
///
/// Sized to the video's native resolution, never to a displayed size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedPhoto {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl CapturedPhoto {
    /// Copy `frame` pixel-for-pixel.
    pub fn from_frame(frame: &VideoFrame) -> Self {
        Self {
            pixels: frame.data.clone(),
            width: frame.width,
            height: frame.height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Packed RGB8 pixels.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_get_out_of_range() {
        let set = LandmarkSet::new(vec![Point::new(1.0, 2.0, 0.0)]);
        assert!(set.get(0).is_some());
        assert!(set.get(291).is_none());
    }

    #[test]
    fn test_captured_photo_keeps_native_size() {
        let frame = VideoFrame {
            data: (0..(4 * 2 * 3)).map(|v| v as u8).collect(),
            width: 4,
            height: 2,
            sequence: 7,
        };
        let photo = CapturedPhoto::from_frame(&frame);
        assert_eq!(photo.width(), 4);
        assert_eq!(photo.height(), 2);
        assert_eq!(photo.pixels(), frame.data.as_slice());
    }
}
