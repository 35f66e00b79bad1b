//! Terminal rendition of the gate page.
//!
//! Status lines go to the output writer, the bypass control is a prompt
//! answered with Enter, and the animated regions are tracked as state so the
//! reveal can be logged and inspected.

use smilegate_core::stage::BYPASS_LABEL;
use smilegate_core::timeline::{Element, Props};
use smilegate_core::{CapturedPhoto, Layout, ScrollBinding, ScrollSurface, Stage, Status};
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

pub struct TerminalStage<W, R> {
    out: W,
    input: R,
    layout: Layout,
    photo_path: Option<PathBuf>,
    photo: Option<CapturedPhoto>,
    visible: HashMap<Element, bool>,
    props: HashMap<Element, Props>,
    binding: Option<ScrollBinding>,
    /// The last line written was a live distance readout.
    readout_open: bool,
}

impl TerminalStage<std::io::Stdout, tokio::io::BufReader<tokio::io::Stdin>> {
    pub fn stdio(layout: Layout, photo_path: Option<PathBuf>) -> Self {
        Self::new(
            std::io::stdout(),
            tokio::io::BufReader::new(tokio::io::stdin()),
            layout,
            photo_path,
        )
    }
}

impl<W: Write, R: AsyncBufRead + Unpin> TerminalStage<W, R> {
    pub fn new(out: W, input: R, layout: Layout, photo_path: Option<PathBuf>) -> Self {
        // The photo and stamp start hidden, the portfolio starts transparent.
        let visible = HashMap::from([
            (Element::CapturedPhoto, false),
            (Element::PassStamp, false),
            (Element::GateContainer, true),
            (Element::PinWrapper, false),
            (Element::HorizontalSections, true),
        ]);
        let mut stage = Self {
            out,
            input,
            layout,
            photo_path,
            photo: None,
            visible,
            props: HashMap::new(),
            binding: None,
            readout_open: false,
        };
        for element in Element::ALL {
            let initial = stage.initial_props(element);
            stage.props.insert(element, initial);
        }
        stage
    }

    pub fn is_visible(&self, element: Element) -> bool {
        self.visible.get(&element).copied().unwrap_or(false)
    }

    fn line(&mut self, text: &str) {
        if self.readout_open {
            let _ = writeln!(self.out);
            self.readout_open = false;
        }
        let _ = writeln!(self.out, "{text}");
        let _ = self.out.flush();
    }

    fn export_photo(&self, photo: &CapturedPhoto) {
        let Some(path) = &self.photo_path else {
            return;
        };
        let Some(img) = image::RgbImage::from_raw(photo.width(), photo.height(), photo.pixels().to_vec())
        else {
            tracing::warn!("captured photo has inconsistent dimensions; not exported");
            return;
        };
        match img.save(path) {
            Ok(()) => tracing::info!(path = %path.display(), "photo saved"),
            Err(err) => tracing::warn!(path = %path.display(), error = %err, "failed to save photo"),
        }
    }
}

#[cfg(test)]
impl<W, R> TerminalStage<W, R> {
    pub fn photo(&self) -> Option<&CapturedPhoto> {
        self.photo.as_ref()
    }

    pub fn binding(&self) -> Option<&ScrollBinding> {
        self.binding.as_ref()
    }

    pub fn props(&self, element: Element) -> Props {
        self.props.get(&element).copied().unwrap_or_default()
    }

    pub fn into_output(self) -> W {
        self.out
    }
}

impl<W: Write, R: AsyncBufRead + Unpin> ScrollSurface for TerminalStage<W, R> {
    fn layout(&self) -> Layout {
        // Hidden content has no size.
        if self.is_visible(Element::PinWrapper) {
            self.layout
        } else {
            Layout {
                content_width: 0.0,
                viewport_width: self.layout.viewport_width,
                trigger_top: self.layout.trigger_top,
            }
        }
    }

    fn bind_scroll(&mut self, binding: &ScrollBinding) {
        self.binding = Some(*binding);
        let text = format!(
            "Portfolio unlocked: {:.0}px of horizontal travel pinned from y={:.0}.",
            binding.distance, binding.start
        );
        self.line(&text);
    }

    fn refresh_scroll_triggers(&mut self) {
        tracing::debug!(bound = self.binding.is_some(), "scroll triggers refreshed");
    }
}

impl<W: Write, R: AsyncBufRead + Unpin> Stage for TerminalStage<W, R> {
    fn set_status(&mut self, status: &Status) {
        match status {
            Status::Distance(_) => {
                let _ = write!(self.out, "\r{status}");
                let _ = self.out.flush();
                self.readout_open = true;
            }
            _ if status.offers_bypass() => {
                let text = format!("{status} [{BYPASS_LABEL}: press Enter]");
                self.line(&text);
            }
            _ => self.line(&status.to_string()),
        }
    }

    fn draw_photo(&mut self, photo: CapturedPhoto) -> bool {
        tracing::info!(width = photo.width(), height = photo.height(), "photo captured");
        self.export_photo(&photo);
        self.photo = Some(photo);
        true
    }

    fn set_visible(&mut self, element: Element, visible: bool) {
        tracing::debug!(%element, visible, "display");
        self.visible.insert(element, visible);
    }

    fn apply(&mut self, element: Element, props: &Props) {
        let current = self.props.entry(element).or_insert(Props::IDENTITY);
        current.merge(props);
        tracing::trace!(%element, props = ?current, "render");
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
        let mut line = String::new();
        match self.input.read_line(&mut line).await {
            Ok(0) => false,
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(error = %err, "bypass input unreadable");
                false
            }
        }
    }
}
