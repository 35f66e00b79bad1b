//! Horizontal scroll controller.
//!
//! Once the portfolio is revealed, vertical page scroll drives the horizontal
//! offset of the content strip while the pin wrapper stays fixed on screen.
//! The pinned range spans exactly the strip's overflow width.

use crate::timeline::{Easing, Element};
use serde::Serialize;

/// Catch-up smoothing between the scroll position and the applied offset.
pub const DEFAULT_SCRUB_SECS: f32 = 1.0;

const SCRUB_EASE: Easing = Easing::PowerOut(3);

/// Measured sizes needed to bind the scroll, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Layout {
    /// Full scrollable width of the horizontal strip.
    pub content_width: f32,
    pub viewport_width: f32,
    /// Page scroll position at which the trigger's top meets the viewport top.
    pub trigger_top: f32,
}

/// Surface that lays out the portfolio and hosts scroll-linked bindings.
pub trait ScrollSurface {
    fn layout(&self) -> Layout;
    fn bind_scroll(&mut self, binding: &ScrollBinding);
    /// Re-measure every scroll-linked trigger.
    fn refresh_scroll_triggers(&mut self);
}

/// Scroll-linked horizontal translation of `target` while `trigger` is pinned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScrollBinding {
    pub trigger: Element,
    pub target: Element,
    pub start: f32,
    pub distance: f32,
    pub pin: bool,
    pub scrub_secs: f32,
}

impl ScrollBinding {
    /// Scroll position where the pin releases.
    pub fn end(&self) -> f32 {
        self.start + self.distance
    }

    /// Progress in [0, 1] through the pinned range.
    pub fn progress(&self, scroll_y: f32) -> f32 {
        if self.distance <= 0.0 {
            return if scroll_y >= self.start { 1.0 } else { 0.0 };
        }
        ((scroll_y - self.start) / self.distance).clamp(0.0, 1.0)
    }

    /// Horizontal offset for a given progress. Linear, no easing.
    pub fn offset_at(&self, progress: f32) -> f32 {
        -progress.clamp(0.0, 1.0) * self.distance
    }

    pub fn offset_for_scroll(&self, scroll_y: f32) -> f32 {
        self.offset_at(self.progress(scroll_y))
    }

    pub fn is_pinned(&self, scroll_y: f32) -> bool {
        scroll_y >= self.start && scroll_y <= self.end()
    }
}

/// Bind the strip's horizontal offset to page scroll and refresh triggers.
///
/// Must run only after the wrapper is visible; hidden content measures zero.
pub fn init_horizontal_scroll<S: ScrollSurface + ?Sized>(
    surface: &mut S,
    scrub_secs: f32,
) -> ScrollBinding {
    let layout = surface.layout();
    let overflow = layout.content_width - layout.viewport_width;
    if overflow < 0.0 {
        tracing::warn!(
            content_width = layout.content_width,
            viewport_width = layout.viewport_width,
            "content narrower than viewport; horizontal scroll has no travel"
        );
    }

    let binding = ScrollBinding {
        trigger: Element::PinWrapper,
        target: Element::HorizontalSections,
        start: layout.trigger_top,
        distance: overflow.max(0.0),
        pin: true,
        scrub_secs,
    };

    surface.bind_scroll(&binding);
    surface.refresh_scroll_triggers();

    tracing::info!(
        distance = binding.distance,
        start = binding.start,
        end = binding.end(),
        "horizontal scroll bound"
    );

    binding
}

/// Smooths the applied offset toward the scroll-derived target.
///
/// Each new target restarts a catch-up tween from the current offset that
/// lasts `scrub_secs`.
#[derive(Debug, Clone)]
pub struct Scrubber {
    binding: ScrollBinding,
    from: f32,
    to: f32,
    elapsed: f32,
    current: f32,
}

impl Scrubber {
    pub fn new(binding: ScrollBinding) -> Self {
        Self {
            binding,
            from: 0.0,
            to: 0.0,
            elapsed: 0.0,
            current: 0.0,
        }
    }

    /// Advance by `dt` seconds with the page at `scroll_y`; returns the offset to render.
    pub fn advance(&mut self, scroll_y: f32, dt: f32) -> f32 {
        let target = self.binding.offset_for_scroll(scroll_y);
        if self.binding.scrub_secs <= 0.0 {
            self.from = target;
            self.to = target;
            self.current = target;
            return target;
        }

        if target != self.to {
            self.from = self.current;
            self.to = target;
            self.elapsed = 0.0;
        }

        self.elapsed += dt.max(0.0);
        let p = SCRUB_EASE.apply(self.elapsed / self.binding.scrub_secs);
        self.current = self.from + (self.to - self.from) * p;
        self.current
    }

    pub fn current(&self) -> f32 {
        self.current
    }
}
