//! Webcam access over V4L2.
//!
//! The gate asks for a small video-only stream; whatever size and format the
//! driver settles on becomes the camera's native resolution.

use crate::frame::{self, FrameError};
use smilegate_core::VideoFrame;
use std::path::Path;
use thiserror::Error;
use v4l::buffer::Type as BufType;
use v4l::capability::Flags;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::{Format, FourCC};

const STREAM_BUFFERS: u32 = 4;

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("no camera at {0}")]
    NotFound(String),
    #[error("camera {0} is in use by another process")]
    Busy(String),
    #[error("{0} is not a video capture device")]
    NotCapture(String),
    #[error("could not agree on a video format: {0}")]
    Format(String),
    #[error("video stream failed: {0}")]
    Stream(String),
    #[error("frame conversion failed: {0}")]
    Frame(#[from] FrameError),
}

/// A capture-capable V4L2 node found by [`Camera::list_devices`].
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub path: String,
    pub card: String,
    pub driver: String,
    pub bus: String,
}

/// Pixel layouts the gate can turn into RGB8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Packed 4:2:2, two pixels per four bytes. Requested first.
    Yuyv,
    /// One JPEG per buffer.
    Mjpg,
    Grey,
    Rgb3,
}

impl PixelFormat {
    fn from_fourcc(fourcc: FourCC) -> Option<Self> {
        match &fourcc.repr {
            b"YUYV" => Some(Self::Yuyv),
            b"MJPG" => Some(Self::Mjpg),
            b"GREY" => Some(Self::Grey),
            b"RGB3" => Some(Self::Rgb3),
            _ => None,
        }
    }
}

/// An opened webcam with its negotiated format.
pub struct Camera {
    device: Device,
    pub device_path: String,
    pub width: u32,
    pub height: u32,
    pub fourcc: FourCC,
    pixel_format: PixelFormat,
}

impl Camera {
    /// Open `device_path` and request `width`×`height` video.
    pub fn open(device_path: &str, width: u32, height: u32) -> Result<Self, CameraError> {
        let device = open_capture_device(device_path)?;
        let format = request_format(&device, width, height)?;

        let pixel_format = PixelFormat::from_fourcc(format.fourcc).ok_or_else(|| {
            CameraError::Format(format!(
                "driver offered {:?}; supported are YUYV, MJPG, GREY and RGB3",
                format.fourcc
            ))
        })?;

        if (format.width, format.height) != (width, height) {
            tracing::info!(
                requested = ?(width, height),
                native = ?(format.width, format.height),
                "driver chose a different capture size"
            );
        }

        Ok(Self {
            device,
            device_path: device_path.to_string(),
            width: format.width,
            height: format.height,
            fourcc: format.fourcc,
            pixel_format,
        })
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    /// Deliver RGB8 frames to `on_frame` until it returns `false`.
    ///
    /// Undecodable buffers are dropped; device errors end the stream.
    pub fn stream<F>(&self, mut on_frame: F) -> Result<(), CameraError>
    where
        F: FnMut(VideoFrame) -> bool,
    {
        let mut stream = MmapStream::with_buffers(&self.device, BufType::VideoCapture, STREAM_BUFFERS)
            .map_err(|e| CameraError::Stream(format!("mmap setup: {e}")))?;

        loop {
            let (buf, meta) = stream
                .next()
                .map_err(|e| CameraError::Stream(format!("dequeue: {e}")))?;

            // Some drivers leave bytesused at zero.
            let payload = match meta.bytesused as usize {
                0 => buf,
                n => &buf[..n.min(buf.len())],
            };

            let data = match self.to_rgb(payload) {
                Ok(data) => data,
                Err(err) => {
                    tracing::debug!(seq = meta.sequence, error = %err, "dropping undecodable frame");
                    continue;
                }
            };

            let keep_going = on_frame(VideoFrame {
                data,
                width: self.width,
                height: self.height,
                sequence: meta.sequence,
            });
            if !keep_going {
                return Ok(());
            }
        }
    }

    fn to_rgb(&self, payload: &[u8]) -> Result<Vec<u8>, FrameError> {
        let (w, h) = (self.width, self.height);
        match self.pixel_format {
            PixelFormat::Yuyv => frame::yuyv_to_rgb(payload, w, h),
            PixelFormat::Mjpg => frame::decode_mjpeg(payload, w, h),
            PixelFormat::Grey => frame::grey_to_rgb(payload, w, h),
            PixelFormat::Rgb3 => {
                let expected = (w * h * 3) as usize;
                payload
                    .get(..expected)
                    .map(<[u8]>::to_vec)
                    .ok_or(FrameError::InvalidLength {
                        expected,
                        actual: payload.len(),
                    })
            }
        }
    }

    /// Capture-capable `/dev/video*` nodes, sorted by path.
    pub fn list_devices() -> Vec<DeviceInfo> {
        let Ok(entries) = std::fs::read_dir("/dev") else {
            return Vec::new();
        };

        let mut paths: Vec<String> = entries
            .filter_map(Result::ok)
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|name| name.starts_with("video"))
            .map(|name| format!("/dev/{name}"))
            .collect();
        paths.sort();

        paths.into_iter().filter_map(|path| probe(&path)).collect()
    }
}

fn open_capture_device(path: &str) -> Result<Device, CameraError> {
    if !Path::new(path).exists() {
        return Err(CameraError::NotFound(path.to_string()));
    }

    let device = Device::with_path(path).map_err(|e| match e.raw_os_error() {
        Some(16) => CameraError::Busy(path.to_string()),
        _ => CameraError::NotFound(format!("{path}: {e}")),
    })?;

    let caps = device
        .query_caps()
        .map_err(|e| CameraError::NotFound(format!("{path}: capability query failed: {e}")))?;
    if !caps.capabilities.contains(Flags::VIDEO_CAPTURE) {
        return Err(CameraError::NotCapture(path.to_string()));
    }

    tracing::debug!(device = path, card = %caps.card, driver = %caps.driver, "capture device");
    Ok(device)
}

/// Ask for YUYV at the requested size and return what the driver granted.
fn request_format(device: &Device, width: u32, height: u32) -> Result<Format, CameraError> {
    let mut wanted = device
        .format()
        .map_err(|e| CameraError::Format(format!("reading current format: {e}")))?;
    wanted.fourcc = FourCC::new(b"YUYV");
    wanted.width = width;
    wanted.height = height;

    device
        .set_format(&wanted)
        .map_err(|e| CameraError::Format(format!("setting {width}x{height} YUYV: {e}")))
}

fn probe(path: &str) -> Option<DeviceInfo> {
    let caps = Device::with_path(path).ok()?.query_caps().ok()?;
    caps.capabilities
        .contains(Flags::VIDEO_CAPTURE)
        .then(|| DeviceInfo {
            path: path.to_string(),
            card: caps.card,
            driver: caps.driver,
            bus: caps.bus,
        })
}
