use crate::scroll::ScrollSurface;
use crate::timeline::{Element, Props};
use crate::types::CapturedPhoto;
use std::fmt;

/// Label of the manual bypass control shown after a startup failure.
pub const BYPASS_LABEL: &str = "Continue Anyway";

/// User-facing progress text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Status {
    Loading,
    Ready,
    /// Live mouth-width readout.
    Distance(f32),
    Confirmed,
    /// Camera or model acquisition failed; rendered with the bypass control.
    CameraFailed,
}

impl Status {
    /// Whether the surface must offer the [`BYPASS_LABEL`] control with this status.
    pub fn offers_bypass(&self) -> bool {
        matches!(self, Status::CameraFailed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Loading => f.write_str("Loading Machine Learning Model..."),
            Status::Ready => f.write_str("Ready! Show us your best smile!"),
            Status::Distance(metric) => write!(f, "Distance: {metric:.2}. Smile wider!"),
            Status::Confirmed => f.write_str("Snap! 100% REAL!"),
            Status::CameraFailed => f.write_str("Camera Access Failed."),
        }
    }
}

/// The display the gate renders onto: status text, the capture surface and
/// the animated regions, plus the portfolio's scroll surface.
#[allow(async_fn_in_trait)]
pub trait Stage: ScrollSurface {
    fn set_status(&mut self, status: &Status);

    /// Show `photo` on the capture surface. Returns `false` when the stage has
    /// no capture surface; the photo is dropped and the unlock proceeds.
    fn draw_photo(&mut self, photo: CapturedPhoto) -> bool;

    fn set_visible(&mut self, element: Element, visible: bool);

    /// Render the given props; unset fields keep their current value.
    fn apply(&mut self, element: Element, props: &Props);

    /// Props an element has before any animation touched it.
    fn initial_props(&self, _element: Element) -> Props {
        Props::IDENTITY
    }

    /// Wait for the user to press the bypass control. Returns `false` if the
    /// control can never be pressed (input closed).
    async fn await_bypass(&mut self) -> bool;
}
