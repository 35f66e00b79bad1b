//! Sequence runner: plays a [`Timeline`] against a [`Stage`] at the display
//! refresh cadence.

use crate::stage::Stage;
use crate::timeline::{Cue, Effect, Element, Props, Timeline};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::{interval, Instant, MissedTickBehavior};

/// Default display refresh rate.
pub const DEFAULT_REFRESH_HZ: u32 = 60;

#[derive(Debug, Clone, Copy)]
enum StepState {
    Pending,
    /// Tween in flight; start values captured when it was reached.
    Running { origin: Props },
    Done,
}

#[derive(Debug, Clone)]
pub struct TimelinePlayer {
    frame_period: Duration,
}

impl TimelinePlayer {
    pub fn new(frame_period: Duration) -> Self {
        Self { frame_period }
    }

    pub fn with_refresh_hz(hz: u32) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / hz.max(1) as f64))
    }

    pub fn frame_period(&self) -> Duration {
        self.frame_period
    }

    /// Play `timeline` to completion. `on_cue` runs for each call step, in
    /// timeline order, with the stage handed back to it.
    pub async fn play<S, F>(&self, timeline: &Timeline, stage: &mut S, mut on_cue: F)
    where
        S: Stage + ?Sized,
        F: FnMut(&mut S, Cue),
    {
        let steps = timeline.steps();
        let mut states = vec![StepState::Pending; steps.len()];
        let mut rendered: HashMap<Element, Props> = HashMap::new();

        tracing::debug!(
            steps = steps.len(),
            duration = timeline.duration(),
            "playing timeline"
        );

        // From-values render up front, before their tween is reached.
        for step in steps {
            if let Effect::Tween {
                element,
                from: Some(from),
                ..
            } = &step.effect
            {
                render(stage, &mut rendered, *element, from);
            }
        }

        let started = Instant::now();
        let mut refresh = interval(self.frame_period);
        refresh.set_missed_tick_behavior(MissedTickBehavior::Skip);

        while states.iter().any(|s| !matches!(s, StepState::Done)) {
            refresh.tick().await;
            let t = started.elapsed().as_secs_f32();

            for (step, state) in steps.iter().zip(states.iter_mut()) {
                if matches!(state, StepState::Done) || t < step.start {
                    continue;
                }

                match &step.effect {
                    Effect::Set { element, visible } => {
                        tracing::debug!(%element, visible, at = step.start, "set visibility");
                        stage.set_visible(*element, *visible);
                        *state = StepState::Done;
                    }
                    Effect::Tween {
                        element,
                        from,
                        to,
                        ease,
                    } => {
                        let origin = match *state {
                            StepState::Running { origin } => origin,
                            _ => {
                                let origin = from.unwrap_or_else(|| {
                                    rendered
                                        .get(element)
                                        .copied()
                                        .unwrap_or_else(|| stage.initial_props(*element))
                                });
                                tracing::debug!(%element, at = step.start, duration = step.duration, "tween started");
                                *state = StepState::Running { origin };
                                origin
                            }
                        };

                        let progress = if step.duration > 0.0 {
                            ((t - step.start) / step.duration).clamp(0.0, 1.0)
                        } else {
                            1.0
                        };

                        if progress >= 1.0 {
                            render(stage, &mut rendered, *element, to);
                            *state = StepState::Done;
                        } else {
                            let props = origin.lerp(to, ease.apply(progress));
                            render(stage, &mut rendered, *element, &props);
                        }
                    }
                    Effect::Call { cue } => {
                        tracing::debug!(?cue, at = step.start, "timeline call");
                        on_cue(stage, *cue);
                        *state = StepState::Done;
                    }
                }
            }
        }

        tracing::debug!(elapsed = ?started.elapsed(), "timeline complete");
    }
}

impl Default for TimelinePlayer {
    fn default() -> Self {
        Self::with_refresh_hz(DEFAULT_REFRESH_HZ)
    }
}

fn render<S: Stage + ?Sized>(
    stage: &mut S,
    rendered: &mut HashMap<Element, Props>,
    element: Element,
    props: &Props,
) {
    rendered
        .entry(element)
        .or_insert_with(|| stage.initial_props(element))
        .merge(props);
    stage.apply(element, props);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scroll::{Layout, ScrollBinding, ScrollSurface};
    use crate::stage::Status;
    use crate::timeline::{unlock_timeline, Easing, Position, Tween};
    use crate::types::CapturedPhoto;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Visible(Element, bool),
        Apply(Element, Props),
        Cue(Cue),
    }

    #[derive(Default)]
    struct RecordingStage {
        events: Vec<Event>,
        state: HashMap<Element, Props>,
    }

    impl RecordingStage {
        fn current(&self, element: Element) -> Props {
            self.state.get(&element).copied().unwrap_or(Props::IDENTITY)
        }
    }

    impl ScrollSurface for RecordingStage {
        fn layout(&self) -> Layout {
            Layout {
                content_width: 0.0,
                viewport_width: 0.0,
                trigger_top: 0.0,
            }
        }
        fn bind_scroll(&mut self, _binding: &ScrollBinding) {}
        fn refresh_scroll_triggers(&mut self) {}
    }

    impl Stage for RecordingStage {
        fn set_status(&mut self, _status: &Status) {}
        fn draw_photo(&mut self, _photo: CapturedPhoto) -> bool {
            true
        }
        fn set_visible(&mut self, element: Element, visible: bool) {
            self.events.push(Event::Visible(element, visible));
        }
        fn apply(&mut self, element: Element, props: &Props) {
            self.state.entry(element).or_insert(Props::IDENTITY).merge(props);
            self.events.push(Event::Apply(element, *props));
        }
        fn initial_props(&self, element: Element) -> Props {
            match element {
                Element::PinWrapper => Props {
                    opacity: Some(0.0),
                    ..Props::IDENTITY
                },
                _ => Props::IDENTITY,
            }
        }
        async fn await_bypass(&mut self) -> bool {
            false
        }
    }

    async fn play(timeline: &Timeline, stage: &mut RecordingStage) {
        TimelinePlayer::default()
            .play(timeline, stage, |stage, cue| stage.events.push(Event::Cue(cue)))
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_from_values_render_before_any_tick() {
        let mut stage = RecordingStage::default();
        play(&unlock_timeline(), &mut stage).await;

        // The two from→to tweens render their start state first.
        assert!(matches!(stage.events[0], Event::Apply(Element::CapturedPhoto, p) if p.scale == Some(0.1)));
        assert!(matches!(stage.events[1], Event::Apply(Element::PassStamp, p) if p.rotate == Some(-45.0)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unlock_timeline_final_state() {
        let mut stage = RecordingStage::default();
        play(&unlock_timeline(), &mut stage).await;

        assert_eq!(stage.current(Element::CapturedPhoto).opacity, Some(0.0));
        assert_eq!(stage.current(Element::CapturedPhoto).scale, Some(1.0));
        assert_eq!(stage.current(Element::PassStamp).opacity, Some(0.0));
        assert_eq!(stage.current(Element::PassStamp).rotate, Some(0.0));
        assert_eq!(stage.current(Element::GateContainer).opacity, Some(0.0));
        assert_eq!(stage.current(Element::PinWrapper).opacity, Some(1.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_visibility_order_and_single_cue_last() {
        let mut stage = RecordingStage::default();
        play(&unlock_timeline(), &mut stage).await;

        let shown: Vec<Element> = stage
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Visible(el, true) => Some(*el),
                _ => None,
            })
            .collect();
        assert_eq!(
            shown,
            vec![Element::CapturedPhoto, Element::PassStamp, Element::PinWrapper]
        );

        let cues = stage.events.iter().filter(|e| matches!(e, Event::Cue(_))).count();
        assert_eq!(cues, 1);
        assert_eq!(stage.events.last(), Some(&Event::Cue(Cue::InitHorizontalScroll)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_takes_timeline_duration() {
        let mut stage = RecordingStage::default();
        let started = Instant::now();
        play(&unlock_timeline(), &mut stage).await;
        let elapsed = started.elapsed().as_secs_f32();
        assert!(elapsed >= 3.5, "finished early: {elapsed}");
        assert!(elapsed < 3.6, "finished late: {elapsed}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_to_tween_starts_from_initial_props() {
        let timeline = Timeline::builder()
            .to(
                Element::PinWrapper,
                Props::opacity(1.0),
                Tween::new(1.0).ease(Easing::None),
                Position::End,
            )
            .build();
        let mut stage = RecordingStage::default();
        play(&timeline, &mut stage).await;

        let opacities: Vec<f32> = stage
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Apply(Element::PinWrapper, p) => p.opacity,
                _ => None,
            })
            .collect();
        // Starts at the stage's hidden opacity and climbs monotonically to 1.
        assert!(opacities[0] < 0.05, "first frame {}", opacities[0]);
        assert!(opacities.windows(2).all(|w| w[1] >= w[0]));
        assert_eq!(opacities.last(), Some(&1.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_timeline_returns() {
        let mut stage = RecordingStage::default();
        play(&Timeline::default(), &mut stage).await;
        assert!(stage.events.is_empty());
    }
}
