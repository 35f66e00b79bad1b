//! Ordered list of timed visual steps.
//!
//! A [`Timeline`] is built the way a sequential animation timeline is authored:
//! each step is appended at the end by default, or placed relative to the
//! previous step's start (`"<"`) or the timeline's end (`"-=0.5"`). The
//! builder resolves every position to an absolute start time so the player
//! only has to compare against a clock.

use serde::Serialize;

/// Visual regions the unlock sequence drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    CapturedPhoto,
    PassStamp,
    GateContainer,
    PinWrapper,
    HorizontalSections,
}

impl Element {
    pub const ALL: [Element; 5] = [
        Element::CapturedPhoto,
        Element::PassStamp,
        Element::GateContainer,
        Element::PinWrapper,
        Element::HorizontalSections,
    ];

    /// DOM-style selector, used in logs.
    pub fn selector(self) -> &'static str {
        match self {
            Element::CapturedPhoto => "#captured-photo-canvas",
            Element::PassStamp => "#pass-stamp",
            Element::GateContainer => "#smile-gate-container",
            Element::PinWrapper => "#pin-wrapper",
            Element::HorizontalSections => "#horizontal-sections-wrapper",
        }
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.selector())
    }
}

/// Transform and opacity properties. Unset fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Props {
    /// Horizontal offset in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    /// Vertical offset as a percentage of the element's own height.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_percent: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    /// Rotation in degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate: Option<f32>,
}

impl Props {
    /// Resting values: no offset, unit scale, opaque, unrotated.
    pub const IDENTITY: Props = Props {
        x: Some(0.0),
        y_percent: Some(0.0),
        scale: Some(1.0),
        opacity: Some(1.0),
        rotate: Some(0.0),
    };

    pub fn opacity(value: f32) -> Self {
        Self {
            opacity: Some(value),
            ..Self::default()
        }
    }

    pub fn x(value: f32) -> Self {
        Self {
            x: Some(value),
            ..Self::default()
        }
    }

    /// Overlay every field set in `other` onto `self`.
    pub fn merge(&mut self, other: &Props) {
        self.x = other.x.or(self.x);
        self.y_percent = other.y_percent.or(self.y_percent);
        self.scale = other.scale.or(self.scale);
        self.opacity = other.opacity.or(self.opacity);
        self.rotate = other.rotate.or(self.rotate);
    }

    /// Interpolate toward `to` by `progress`. Only fields set in `to` are
    /// produced; missing start values fall back to [`Props::IDENTITY`].
    pub fn lerp(&self, to: &Props, progress: f32) -> Props {
        let mix = |from: Option<f32>, rest: Option<f32>, to: Option<f32>| {
            to.map(|end| {
                let start = from.or(rest).unwrap_or(end);
                start + (end - start) * progress
            })
        };
        let rest = Props::IDENTITY;
        Props {
            x: mix(self.x, rest.x, to.x),
            y_percent: mix(self.y_percent, rest.y_percent, to.y_percent),
            scale: mix(self.scale, rest.scale, to.scale),
            opacity: mix(self.opacity, rest.opacity, to.opacity),
            rotate: mix(self.rotate, rest.rotate, to.rotate),
        }
    }
}

/// Easing curves. `PowerX(n)` follows the power-n family: power1 is
/// quadratic, power2 cubic, power4 quintic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Linear.
    None,
    PowerIn(u8),
    PowerOut(u8),
    PowerInOut(u8),
    /// Overshoots past the end value then settles.
    BackOut(f32),
}

impl Default for Easing {
    fn default() -> Self {
        Easing::PowerOut(1)
    }
}

impl Easing {
    /// Map linear progress in [0, 1] to eased progress.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::None => t,
            Easing::PowerIn(n) => t.powi(n as i32 + 1),
            Easing::PowerOut(n) => 1.0 - (1.0 - t).powi(n as i32 + 1),
            Easing::PowerInOut(n) => {
                let exp = n as i32 + 1;
                if t < 0.5 {
                    (2.0 * t).powi(exp) / 2.0
                } else {
                    1.0 - (2.0 * (1.0 - t)).powi(exp) / 2.0
                }
            }
            Easing::BackOut(s) => {
                let p = t - 1.0;
                p * p * ((s + 1.0) * p + s) + 1.0
            }
        }
    }
}

/// Deferred actions fired by [`Effect::Call`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    InitHorizontalScroll,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Effect {
    /// Instantly show or hide an element.
    Set { element: Element, visible: bool },
    /// Animate props. Without `from`, starts from whatever is rendered.
    Tween {
        element: Element,
        from: Option<Props>,
        to: Props,
        ease: Easing,
    },
    Call { cue: Cue },
}

/// Where to place a step, relative to what was added before it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    /// At the current end of the timeline.
    End,
    /// Offset from the previous step's start (`"<"`, `"<0.1"`).
    PrevStart(f32),
    /// Offset from the current end (`"-=0.5"` is `FromEnd(-0.5)`).
    FromEnd(f32),
    /// Absolute time.
    At(f32),
}

/// Duration, delay and easing of one tween.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub duration: f32,
    pub delay: f32,
    pub ease: Easing,
}

impl Tween {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            delay: 0.0,
            ease: Easing::default(),
        }
    }

    pub fn ease(mut self, ease: Easing) -> Self {
        self.ease = ease;
        self
    }

    pub fn delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }
}

/// One effect with its resolved absolute start time (seconds).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub start: f32,
    pub duration: f32,
    pub effect: Effect,
}

impl Step {
    pub fn end(&self) -> f32 {
        self.start + self.duration
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Timeline {
    steps: Vec<Step>,
    duration: f32,
}

impl Timeline {
    pub fn builder() -> TimelineBuilder {
        TimelineBuilder::default()
    }

    /// Steps in authoring order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }
}

#[derive(Debug, Default)]
pub struct TimelineBuilder {
    steps: Vec<Step>,
    duration: f32,
}

impl TimelineBuilder {
    fn resolve(&self, position: Position) -> f32 {
        let start = match position {
            Position::End => self.duration,
            Position::PrevStart(offset) => {
                self.steps.last().map(|s| s.start).unwrap_or(0.0) + offset
            }
            Position::FromEnd(offset) => self.duration + offset,
            Position::At(t) => t,
        };
        start.max(0.0)
    }

    fn push(mut self, position: Position, delay: f32, duration: f32, effect: Effect) -> Self {
        let start = self.resolve(position) + delay;
        self.duration = self.duration.max(start + duration);
        self.steps.push(Step {
            start,
            duration,
            effect,
        });
        self
    }

    pub fn set(self, element: Element, visible: bool, position: Position) -> Self {
        self.push(position, 0.0, 0.0, Effect::Set { element, visible })
    }

    pub fn from_to(
        self,
        element: Element,
        from: Props,
        to: Props,
        tween: Tween,
        position: Position,
    ) -> Self {
        let effect = Effect::Tween {
            element,
            from: Some(from),
            to,
            ease: tween.ease,
        };
        self.push(position, tween.delay, tween.duration, effect)
    }

    pub fn to(self, element: Element, to: Props, tween: Tween, position: Position) -> Self {
        let effect = Effect::Tween {
            element,
            from: None,
            to,
            ease: tween.ease,
        };
        self.push(position, tween.delay, tween.duration, effect)
    }

    pub fn call(self, cue: Cue, position: Position) -> Self {
        self.push(position, 0.0, 0.0, Effect::Call { cue })
    }

    pub fn build(self) -> Timeline {
        Timeline {
            steps: self.steps,
            duration: self.duration,
        }
    }
}

/// The celebratory reveal: photo prints out, stamp slams down, the gate
/// fades away and the portfolio fades in, then horizontal scroll binds.
pub fn unlock_timeline() -> Timeline {
    use Element::*;

    Timeline::builder()
        .set(CapturedPhoto, true, Position::End)
        .from_to(
            CapturedPhoto,
            Props {
                y_percent: Some(50.0),
                scale: Some(0.1),
                opacity: Some(0.0),
                ..Props::default()
            },
            Props {
                y_percent: Some(0.0),
                scale: Some(1.0),
                opacity: Some(1.0),
                ..Props::default()
            },
            Tween::new(0.8).ease(Easing::BackOut(1.7)),
            Position::End,
        )
        .set(PassStamp, true, Position::PrevStart(0.1))
        .from_to(
            PassStamp,
            Props {
                scale: Some(3.0),
                opacity: Some(0.0),
                rotate: Some(-45.0),
                ..Props::default()
            },
            Props {
                scale: Some(1.0),
                opacity: Some(1.0),
                rotate: Some(0.0),
                ..Props::default()
            },
            Tween::new(0.3).ease(Easing::PowerIn(4)),
            Position::End,
        )
        .to(
            CapturedPhoto,
            Props::opacity(0.0),
            Tween::new(0.5).delay(0.7).ease(Easing::PowerIn(1)),
            Position::End,
        )
        .to(
            PassStamp,
            Props::opacity(0.0),
            Tween::new(0.5),
            Position::PrevStart(0.0),
        )
        .to(
            GateContainer,
            Props::opacity(0.0),
            Tween::new(1.0).ease(Easing::PowerInOut(2)),
            Position::PrevStart(0.2),
        )
        .set(PinWrapper, true, Position::End)
        .to(
            PinWrapper,
            Props::opacity(1.0),
            Tween::new(1.0).ease(Easing::PowerInOut(2)),
            Position::FromEnd(-0.5),
        )
        .call(Cue::InitHorizontalScroll, Position::End)
        .build()
}
