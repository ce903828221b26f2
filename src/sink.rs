//! Presentation-side collaborators. Playback pushes frames at these
//! traits and owns no rendering itself.

use tracing::info;

use crate::frames::Frame;

/// Accepts decoded frames for presentation.
pub trait DisplaySink {
    /// Present `frame` until told otherwise.
    fn show(&mut self, frame: &Frame);
    /// Stop showing anything.
    fn clear(&mut self);
}

/// Receives the final image dimensions once a load completes, e.g. to fix
/// up a widget's aspect ratio.
pub trait AspectSink {
    fn on_dimensions(&mut self, width: u32, height: u32);
}

/// Sink that drops everything. Useful headless and in tests.
#[derive(Debug, Default)]
pub struct NullSink;

impl DisplaySink for NullSink {
    fn show(&mut self, _frame: &Frame) {}
    fn clear(&mut self) {}
}

impl AspectSink for NullSink {
    fn on_dimensions(&mut self, _width: u32, _height: u32) {}
}

/// Sink that logs frame transitions; the CLI's "display".
#[derive(Debug, Default)]
pub struct TerminalSink {
    shown: u64,
}

impl DisplaySink for TerminalSink {
    fn show(&mut self, frame: &Frame) {
        self.shown += 1;
        info!(
            shown = self.shown,
            width = frame.width,
            height = frame.height,
            delay_ms = frame.delay.as_millis() as u64,
            "frame"
        );
    }

    fn clear(&mut self) {
        info!("display cleared");
    }
}

impl AspectSink for TerminalSink {
    fn on_dimensions(&mut self, width: u32, height: u32) {
        info!(width, height, "image dimensions");
    }
}
