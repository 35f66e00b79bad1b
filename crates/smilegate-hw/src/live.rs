//! Live video source: a capture thread publishing the latest frame.
//!
//! Plays the role of a `<video>` element: the gate reads whatever frame is
//! current, never queues. Stopping the tracks tells the thread to exit, which
//! drops the device and releases the camera.

use crate::camera::{Camera, CameraError};
use smilegate_core::{VideoFrame, VideoSource};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tokio::sync::watch;

type LatestFrame = Option<Arc<VideoFrame>>;

pub struct LiveVideo {
    rx: watch::Receiver<LatestFrame>,
    stop: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl LiveVideo {
    /// Start streaming from an opened camera.
    pub fn start(camera: Camera) -> Result<Self, CameraError> {
        let device = camera.device_path.clone();
        Self::spawn(move |on_frame| {
            tracing::info!(device = %device, "capture thread started");
            let result = camera.stream(on_frame);
            tracing::info!(device = %device, "capture thread exiting; camera released");
            result
        })
    }

    /// Run `produce` on a dedicated capture thread. It receives a sink that
    /// publishes each frame and returns `false` once tracks are stopped.
    pub fn spawn<P>(produce: P) -> Result<Self, CameraError>
    where
        P: FnOnce(&mut dyn FnMut(VideoFrame) -> bool) -> Result<(), CameraError> + Send + 'static,
    {
        let (tx, rx) = watch::channel::<LatestFrame>(None);
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);

        let thread = std::thread::Builder::new()
            .name("smilegate-capture".into())
            .spawn(move || {
                let mut publish = |frame: VideoFrame| {
                    if thread_stop.load(Ordering::Acquire) {
                        return false;
                    }
                    tx.send_replace(Some(Arc::new(frame)));
                    !thread_stop.load(Ordering::Acquire)
                };
                if let Err(err) = produce(&mut publish) {
                    tracing::warn!(error = %err, "capture stream ended with error");
                }
            })
            .map_err(|e| CameraError::Stream(format!("spawning capture thread: {e}")))?;

        Ok(Self { rx, stop, thread })
    }

    /// Whether the capture thread is still running.
    pub fn is_running(&self) -> bool {
        !self.thread.is_finished()
    }
}

impl VideoSource for LiveVideo {
    fn is_ready(&self) -> bool {
        self.rx.borrow().is_some()
    }

    fn current_frame(&self) -> Option<Arc<VideoFrame>> {
        self.rx.borrow().clone()
    }

    async fn wait_ready(&mut self) -> bool {
        self.rx.wait_for(|frame| frame.is_some()).await.is_ok()
    }

    fn stop_tracks(&mut self) {
        self.stop.store(true, Ordering::Release);
    }
}

impl Drop for LiveVideo {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
    }
}
