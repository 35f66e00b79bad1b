//! The smile gate: detection session, per-frame detector, one-shot unlock
//! sequence and startup glue.
//!
//! Everything runs cooperatively on one task. The session's `unlocked` flag is
//! the only cancellation signal: it is set before the unlock sequence does any
//! awaiting, so the detector can never run a tick or trigger a second unlock
//! after it.

use crate::model::{FaceModel, ModelError};
use crate::player::{TimelinePlayer, DEFAULT_REFRESH_HZ};
use crate::scroll::{init_horizontal_scroll, ScrollBinding, DEFAULT_SCRUB_SECS};
use crate::smile::{smile_metric, SmileConfig, SmileDebouncer, SmileVerdict};
use crate::stage::{Stage, Status};
use crate::timeline::{unlock_timeline, Cue};
use crate::types::{CapturedPhoto, VideoFrame};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{interval, MissedTickBehavior};

#[derive(Error, Debug)]
pub enum GateError {
    #[error("face model failed to load: {0}")]
    Model(#[from] ModelError),
    #[error("camera unavailable: {0}")]
    Camera(String),
    #[error("video ended before delivering a frame")]
    NoFirstFrame,
}

/// Media request for the camera. Video only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraConstraints {
    pub width: u32,
    pub height: u32,
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
        }
    }
}

/// Live camera feed, exclusively owned by the session until unlock.
#[allow(async_fn_in_trait)]
pub trait VideoSource {
    /// True once at least one frame has been delivered.
    fn is_ready(&self) -> bool;

    /// Most recent frame at native resolution.
    fn current_frame(&self) -> Option<Arc<VideoFrame>>;

    /// Wait for the first frame. Returns `false` if the stream ended first.
    async fn wait_ready(&mut self) -> bool;

    /// Stop every track and release the camera.
    fn stop_tracks(&mut self);
}

/// Acquires the gate's collaborators at startup.
#[allow(async_fn_in_trait)]
pub trait GateBackend {
    type Model: FaceModel;
    type Video: VideoSource;

    async fn load_model(&mut self) -> Result<Self::Model, GateError>;

    async fn open_camera(
        &mut self,
        constraints: CameraConstraints,
    ) -> Result<Self::Video, GateError>;
}

#[derive(Debug, Clone)]
pub struct GateConfig {
    pub smile: SmileConfig,
    /// Detector and animation cadence.
    pub refresh_hz: u32,
    pub scrub_secs: f32,
    pub camera: CameraConstraints,
}

impl GateConfig {
    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.refresh_hz.max(1) as f64)
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            smile: SmileConfig::default(),
            refresh_hz: DEFAULT_REFRESH_HZ,
            scrub_secs: DEFAULT_SCRUB_SECS,
            camera: CameraConstraints::default(),
        }
    }
}

/// What one detector tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    /// Model or video not ready yet; nothing happened.
    NotReady,
    /// No face this frame (or the estimate failed); no measurement.
    NoFace,
    Measured { metric: f32, verdict: SmileVerdict },
    /// This tick completed the run of smiling frames.
    Confirmed { metric: f32 },
    /// The gate is already open.
    Unlocked,
}

/// Process-wide detection state: model, camera, debounce counter and the
/// monotonic unlocked flag.
pub struct Session<M, V> {
    model: Option<M>,
    video: Option<V>,
    debouncer: SmileDebouncer,
    unlocked: bool,
    config: GateConfig,
    player: TimelinePlayer,
}

impl<M: FaceModel, V: VideoSource> Session<M, V> {
    pub fn new(config: GateConfig) -> Self {
        Self {
            model: None,
            video: None,
            debouncer: SmileDebouncer::new(config.smile),
            unlocked: false,
            player: TimelinePlayer::new(config.frame_period()),
            config,
        }
    }

    pub fn set_model(&mut self, model: M) {
        self.model = Some(model);
    }

    pub fn set_video(&mut self, video: V) {
        self.video = Some(video);
    }

    pub fn video(&self) -> Option<&V> {
        self.video.as_ref()
    }

    pub fn model(&self) -> Option<&M> {
        self.model.as_ref()
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Current run of consecutive smiling frames.
    pub fn smile_count(&self) -> u32 {
        self.debouncer.count()
    }

    /// Run one detection pass on the current frame.
    pub async fn tick<S: Stage + ?Sized>(&mut self, stage: &mut S) -> Tick {
        if self.unlocked {
            return Tick::Unlocked;
        }

        let (Some(model), Some(video)) = (self.model.as_mut(), self.video.as_ref()) else {
            return Tick::NotReady;
        };
        if !video.is_ready() {
            return Tick::NotReady;
        }
        let Some(frame) = video.current_frame() else {
            return Tick::NotReady;
        };

        let faces = match model.estimate_faces(&frame).await {
            Ok(faces) => faces,
            Err(err) => {
                tracing::warn!(error = %err, seq = frame.sequence, "face estimation failed; skipping frame");
                return Tick::NoFace;
            }
        };

        let Some(face) = faces.first() else {
            return Tick::NoFace;
        };

        let metric = smile_metric(&face.landmarks);
        stage.set_status(&Status::Distance(metric));

        match self.debouncer.observe(metric) {
            SmileVerdict::Confirmed => Tick::Confirmed { metric },
            verdict => {
                tracing::trace!(metric, ?verdict, seq = frame.sequence, "smile measured");
                Tick::Measured { metric, verdict }
            }
        }
    }

    /// Poll once per refresh tick until a smile is confirmed, then unlock.
    ///
    /// Each tick's estimate completes before the next tick is scheduled.
    pub async fn run_detector<S: Stage + ?Sized>(&mut self, stage: &mut S) -> Option<ScrollBinding> {
        let mut refresh = interval(self.config.frame_period());
        refresh.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            threshold = self.config.smile.threshold,
            confirm_frames = self.config.smile.confirm_frames,
            refresh_hz = self.config.refresh_hz,
            "smile detector running"
        );

        while !self.unlocked {
            refresh.tick().await;
            match self.tick(stage).await {
                Tick::Confirmed { metric } => {
                    tracing::info!(metric, "smile confirmed");
                    return self.unlock(stage).await;
                }
                Tick::Unlocked => break,
                _ => {}
            }
        }

        None
    }

    /// Open the gate: capture the photo, release the camera and play the
    /// reveal. A second call is a no-op returning `None`.
    pub async fn unlock<S: Stage + ?Sized>(&mut self, stage: &mut S) -> Option<ScrollBinding> {
        if self.unlocked {
            tracing::debug!("unlock already ran");
            return None;
        }
        self.unlocked = true;

        if let Some(frame) = self.video.as_ref().and_then(|v| v.current_frame()) {
            let photo = CapturedPhoto::from_frame(&frame);
            let (width, height) = (photo.width(), photo.height());
            if stage.draw_photo(photo) {
                tracing::info!(width, height, seq = frame.sequence, "photo captured");
            } else {
                tracing::debug!("no capture surface; photo skipped");
            }
        }

        if let Some(video) = self.video.as_mut() {
            video.stop_tracks();
            tracing::info!("camera released");
        }

        stage.set_status(&Status::Confirmed);

        let scrub_secs = self.config.scrub_secs;
        let mut binding = None;
        self.player
            .play(&unlock_timeline(), stage, |stage, cue| match cue {
                Cue::InitHorizontalScroll => {
                    binding = Some(init_horizontal_scroll(stage, scrub_secs));
                }
            })
            .await;

        binding
    }
}

/// How the gate opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockTrigger {
    Smile,
    Bypass,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome {
    Unlocked {
        trigger: UnlockTrigger,
        binding: Option<ScrollBinding>,
    },
    /// Startup failed and the bypass control was never pressed.
    Abandoned,
}

/// Page-ready glue: load the model, open the camera, wait for the first
/// frame, then run the detector. Any startup failure shows the bypass
/// control, which unlocks directly.
pub async fn run_gate<B, S>(backend: &mut B, stage: &mut S, config: GateConfig) -> GateOutcome
where
    B: GateBackend,
    S: Stage + ?Sized,
{
    let mut session: Session<B::Model, B::Video> = Session::new(config);

    match start_session(backend, stage, &mut session).await {
        Ok(()) => {
            stage.set_status(&Status::Ready);
            let binding = session.run_detector(stage).await;
            GateOutcome::Unlocked {
                trigger: UnlockTrigger::Smile,
                binding,
            }
        }
        Err(err) => {
            tracing::error!(error = %err, "camera/model initialization failed");
            stage.set_status(&Status::CameraFailed);
            if stage.await_bypass().await {
                tracing::info!("bypass pressed; unlocking without detection");
                let binding = session.unlock(stage).await;
                GateOutcome::Unlocked {
                    trigger: UnlockTrigger::Bypass,
                    binding,
                }
            } else {
                GateOutcome::Abandoned
            }
        }
    }
}

async fn start_session<B, S>(
    backend: &mut B,
    stage: &mut S,
    session: &mut Session<B::Model, B::Video>,
) -> Result<(), GateError>
where
    B: GateBackend,
    S: Stage + ?Sized,
{
    stage.set_status(&Status::Loading);

    let model = backend.load_model().await?;
    session.set_model(model);

    let mut video = backend.open_camera(session.config().camera).await?;
    if !video.wait_ready().await {
        return Err(GateError::NoFirstFrame);
    }
    session.set_video(video);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scroll::{Layout, ScrollSurface};
    use crate::smile::{MOUTH_LEFT_INDEX, MOUTH_RIGHT_INDEX};
    use crate::timeline::{Element, Props};
    use crate::types::{Face, LandmarkSet, Point};
    use std::collections::{HashMap, VecDeque};

    /// One scripted model answer per call.
    #[derive(Debug, Clone, Copy)]
    enum Answer {
        Smile(f32),
        NoFace,
        NoLandmarks,
        Fail,
    }

    struct ScriptedModel {
        script: VecDeque<Answer>,
        calls: usize,
    }

    impl ScriptedModel {
        fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
            Self {
                script: answers.into_iter().collect(),
                calls: 0,
            }
        }

        fn smiles(metrics: &[f32]) -> Self {
            Self::new(metrics.iter().map(|&m| Answer::Smile(m)))
        }
    }

    fn face_with_mouth_width(width: f32) -> Face {
        let mut points = vec![Point::new(0.0, 0.0, 0.0); 468];
        points[MOUTH_LEFT_INDEX] = Point::new(100.0, 150.0, 0.0);
        points[MOUTH_RIGHT_INDEX] = Point::new(100.0 + width, 150.0, 0.0);
        Face {
            landmarks: LandmarkSet::new(points),
            confidence: 0.99,
        }
    }

    impl FaceModel for ScriptedModel {
        async fn estimate_faces(&mut self, _frame: &VideoFrame) -> Result<Vec<Face>, ModelError> {
            self.calls += 1;
            match self.script.pop_front().unwrap_or(Answer::NoFace) {
                Answer::Smile(width) => Ok(vec![face_with_mouth_width(width)]),
                Answer::NoFace => Ok(Vec::new()),
                Answer::NoLandmarks => Ok(vec![Face {
                    landmarks: LandmarkSet::default(),
                    confidence: 0.9,
                }]),
                Answer::Fail => Err(ModelError::InferenceFailed("scripted".into())),
            }
        }
    }

    struct FakeVideo {
        frame: Option<Arc<VideoFrame>>,
        stops: usize,
    }

    impl FakeVideo {
        fn live(width: u32, height: u32) -> Self {
            Self {
                frame: Some(Arc::new(VideoFrame {
                    data: vec![90; (width * height * 3) as usize],
                    width,
                    height,
                    sequence: 1,
                })),
                stops: 0,
            }
        }

        fn dead() -> Self {
            Self {
                frame: None,
                stops: 0,
            }
        }
    }

    impl VideoSource for FakeVideo {
        fn is_ready(&self) -> bool {
            self.frame.is_some()
        }
        fn current_frame(&self) -> Option<Arc<VideoFrame>> {
            self.frame.clone()
        }
        async fn wait_ready(&mut self) -> bool {
            self.frame.is_some()
        }
        fn stop_tracks(&mut self) {
            self.stops += 1;
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Status(String),
        Photo(u32, u32),
        Visible(Element, bool),
        Bind(ScrollBinding),
        Refresh,
    }

    struct FakeStage {
        events: Vec<Event>,
        props: HashMap<Element, Props>,
        capture_surface: bool,
        bypass: bool,
    }

    impl FakeStage {
        fn new() -> Self {
            Self {
                events: Vec::new(),
                props: HashMap::new(),
                capture_surface: true,
                bypass: true,
            }
        }

        fn statuses(&self) -> Vec<String> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    Event::Status(s) => Some(s.clone()),
                    _ => None,
                })
                .collect()
        }

        fn position(&self, wanted: impl Fn(&Event) -> bool) -> Option<usize> {
            self.events.iter().position(wanted)
        }
    }

    impl ScrollSurface for FakeStage {
        fn layout(&self) -> Layout {
            Layout {
                content_width: 4000.0,
                viewport_width: 1280.0,
                trigger_top: 0.0,
            }
        }
        fn bind_scroll(&mut self, binding: &ScrollBinding) {
            self.events.push(Event::Bind(*binding));
        }
        fn refresh_scroll_triggers(&mut self) {
            self.events.push(Event::Refresh);
        }
    }

    impl Stage for FakeStage {
        fn set_status(&mut self, status: &Status) {
            self.events.push(Event::Status(status.to_string()));
        }
        fn draw_photo(&mut self, photo: CapturedPhoto) -> bool {
            if !self.capture_surface {
                return false;
            }
            self.events.push(Event::Photo(photo.width(), photo.height()));
            true
        }
        fn set_visible(&mut self, element: Element, visible: bool) {
            self.events.push(Event::Visible(element, visible));
        }
        fn apply(&mut self, element: Element, props: &Props) {
            self.props.entry(element).or_insert(Props::IDENTITY).merge(props);
        }
        async fn await_bypass(&mut self) -> bool {
            self.bypass
        }
    }

    fn session(model: ScriptedModel, video: FakeVideo) -> Session<ScriptedModel, FakeVideo> {
        let mut session = Session::new(GateConfig::default());
        session.set_model(model);
        session.set_video(video);
        session
    }

    fn model_calls(session: &Session<ScriptedModel, FakeVideo>) -> usize {
        session.model().map(|m| m.calls).unwrap_or(0)
    }

    #[tokio::test(start_paused = true)]
    async fn test_five_smiles_unlock_after_fifth_tick() {
        let mut s = session(ScriptedModel::smiles(&[60.0; 5]), FakeVideo::live(320, 240));
        let mut stage = FakeStage::new();

        let binding = s.run_detector(&mut stage).await;

        assert!(s.is_unlocked());
        assert_eq!(model_calls(&s), 5);
        assert_eq!(binding.map(|b| b.distance), Some(2720.0));
        assert!(stage.statuses().contains(&"Snap! 100% REAL!".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dip_delays_unlock_to_eighth_tick() {
        let metrics = [60.0, 60.0, 40.0, 60.0, 60.0, 60.0, 60.0, 60.0];
        let mut s = session(ScriptedModel::smiles(&metrics), FakeVideo::live(320, 240));
        let mut stage = FakeStage::new();

        s.run_detector(&mut stage).await;

        assert!(s.is_unlocked());
        assert_eq!(model_calls(&s), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_four_smiles_never_unlock() {
        let mut s = session(ScriptedModel::smiles(&[60.0; 4]), FakeVideo::live(320, 240));
        let mut stage = FakeStage::new();

        let res = tokio::time::timeout(Duration::from_secs(5), s.run_detector(&mut stage)).await;

        assert!(res.is_err(), "detector should still be polling");
        assert!(!s.is_unlocked());
        assert!(model_calls(&s) > 4);
        assert_eq!(s.smile_count(), 4);
        assert!(!stage.statuses().contains(&"Snap! 100% REAL!".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_not_ready_has_no_side_effects() {
        let mut s: Session<ScriptedModel, FakeVideo> = Session::new(GateConfig::default());
        let mut stage = FakeStage::new();
        assert_eq!(s.tick(&mut stage).await, Tick::NotReady);

        s.set_model(ScriptedModel::smiles(&[60.0]));
        s.set_video(FakeVideo::dead());
        assert_eq!(s.tick(&mut stage).await, Tick::NotReady);

        assert!(stage.events.is_empty());
        assert_eq!(model_calls(&s), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_face_keeps_counter_and_status() {
        let model = ScriptedModel::new([Answer::Smile(60.0), Answer::NoFace]);
        let mut s = session(model, FakeVideo::live(320, 240));
        let mut stage = FakeStage::new();

        s.tick(&mut stage).await;
        assert_eq!(s.tick(&mut stage).await, Tick::NoFace);
        assert_eq!(s.smile_count(), 1);
        assert_eq!(stage.statuses().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_landmarks_measure_zero_and_reset() {
        let model = ScriptedModel::new([Answer::Smile(60.0), Answer::NoLandmarks]);
        let mut s = session(model, FakeVideo::live(320, 240));
        let mut stage = FakeStage::new();

        s.tick(&mut stage).await;
        let tick = s.tick(&mut stage).await;

        assert_eq!(
            tick,
            Tick::Measured {
                metric: 0.0,
                verdict: SmileVerdict::Reset
            }
        );
        assert_eq!(s.smile_count(), 0);
        assert_eq!(
            stage.statuses().last().map(String::as_str),
            Some("Distance: 0.00. Smile wider!")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_estimation_error_is_skipped() {
        let model = ScriptedModel::new([Answer::Fail, Answer::Smile(70.0)]);
        let mut s = session(model, FakeVideo::live(320, 240));
        let mut stage = FakeStage::new();

        assert_eq!(s.tick(&mut stage).await, Tick::NoFace);
        assert!(matches!(s.tick(&mut stage).await, Tick::Measured { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unlock_is_idempotent() {
        let mut s = session(ScriptedModel::smiles(&[]), FakeVideo::live(320, 240));
        let mut stage = FakeStage::new();

        assert!(s.unlock(&mut stage).await.is_some());
        let events = stage.events.len();
        let props = stage.props.clone();

        assert!(s.unlock(&mut stage).await.is_none());
        assert_eq!(stage.events.len(), events);
        assert_eq!(stage.props, props);
        assert_eq!(s.video().map(|v| v.stops), Some(1));
        assert_eq!(s.tick(&mut stage).await, Tick::Unlocked);
    }

    #[tokio::test(start_paused = true)]
    async fn test_photo_uses_native_video_size() {
        let mut s = session(ScriptedModel::smiles(&[]), FakeVideo::live(640, 480));
        let mut stage = FakeStage::new();

        s.unlock(&mut stage).await;

        assert_eq!(stage.events[0], Event::Photo(640, 480));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unlock_sequence_order() {
        let mut s = session(ScriptedModel::smiles(&[]), FakeVideo::live(320, 240));
        let mut stage = FakeStage::new();

        s.unlock(&mut stage).await;

        let photo = stage.position(|e| matches!(e, Event::Photo(..))).unwrap();
        let confirmed = stage
            .position(|e| *e == Event::Status("Snap! 100% REAL!".into()))
            .unwrap();
        let wrapper = stage
            .position(|e| *e == Event::Visible(Element::PinWrapper, true))
            .unwrap();
        let bind = stage.position(|e| matches!(e, Event::Bind(_))).unwrap();
        let refresh = stage.position(|e| *e == Event::Refresh).unwrap();

        assert!(photo < confirmed);
        assert!(confirmed < wrapper);
        assert!(wrapper < bind);
        assert_eq!(refresh, bind + 1);
        assert_eq!(stage.props[&Element::GateContainer].opacity, Some(0.0));
        assert_eq!(stage.props[&Element::PinWrapper].opacity, Some(1.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unlock_without_capture_surface_still_reveals() {
        let mut s = session(ScriptedModel::smiles(&[]), FakeVideo::live(320, 240));
        let mut stage = FakeStage::new();
        stage.capture_surface = false;

        let binding = s.unlock(&mut stage).await;

        assert!(binding.is_some());
        assert!(stage.position(|e| matches!(e, Event::Photo(..))).is_none());
        assert_eq!(s.video().map(|v| v.stops), Some(1));
    }

    struct FakeBackend {
        model: Option<ScriptedModel>,
        video: Option<FakeVideo>,
    }

    impl GateBackend for FakeBackend {
        type Model = ScriptedModel;
        type Video = FakeVideo;

        async fn load_model(&mut self) -> Result<ScriptedModel, GateError> {
            self.model
                .take()
                .ok_or_else(|| GateError::Model(ModelError::ModelNotFound("face_landmark.onnx".into())))
        }

        async fn open_camera(
            &mut self,
            constraints: CameraConstraints,
        ) -> Result<FakeVideo, GateError> {
            assert_eq!(constraints, CameraConstraints::default());
            self.video
                .take()
                .ok_or_else(|| GateError::Camera("permission denied".into()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_gate_smile_path() {
        let mut backend = FakeBackend {
            model: Some(ScriptedModel::smiles(&[60.0; 5])),
            video: Some(FakeVideo::live(320, 240)),
        };
        let mut stage = FakeStage::new();

        let outcome = run_gate(&mut backend, &mut stage, GateConfig::default()).await;

        assert!(matches!(
            outcome,
            GateOutcome::Unlocked {
                trigger: UnlockTrigger::Smile,
                binding: Some(_)
            }
        ));
        let statuses = stage.statuses();
        assert_eq!(statuses[0], "Loading Machine Learning Model...");
        assert_eq!(statuses[1], "Ready! Show us your best smile!");
        assert_eq!(statuses.last().map(String::as_str), Some("Snap! 100% REAL!"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gate_camera_failure_bypass() {
        let mut backend = FakeBackend {
            model: Some(ScriptedModel::smiles(&[])),
            video: None,
        };
        let mut stage = FakeStage::new();

        let outcome = run_gate(&mut backend, &mut stage, GateConfig::default()).await;

        assert!(matches!(
            outcome,
            GateOutcome::Unlocked {
                trigger: UnlockTrigger::Bypass,
                binding: Some(_)
            }
        ));
        let statuses = stage.statuses();
        assert_eq!(statuses[1], "Camera Access Failed.");
        assert!(stage.position(|e| matches!(e, Event::Photo(..))).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_gate_model_failure_without_bypass_abandons() {
        let mut backend = FakeBackend {
            model: None,
            video: Some(FakeVideo::live(320, 240)),
        };
        let mut stage = FakeStage::new();
        stage.bypass = false;

        let outcome = run_gate(&mut backend, &mut stage, GateConfig::default()).await;

        assert_eq!(outcome, GateOutcome::Abandoned);
        assert_eq!(
            stage.statuses(),
            vec![
                "Loading Machine Learning Model...".to_string(),
                "Camera Access Failed.".to_string()
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_gate_video_without_frames_fails_over() {
        let mut backend = FakeBackend {
            model: Some(ScriptedModel::smiles(&[])),
            video: Some(FakeVideo::dead()),
        };
        let mut stage = FakeStage::new();

        let outcome = run_gate(&mut backend, &mut stage, GateConfig::default()).await;

        assert!(matches!(
            outcome,
            GateOutcome::Unlocked {
                trigger: UnlockTrigger::Bypass,
                ..
            }
        ));
    }
}
