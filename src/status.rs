//! Two-line status text for the local display.
//!
//! ```text
//! T:30.0C S:50
//! G:50 R:LOW
//! ```
//!
//! Each line is cut to [`LINE_WIDTH`] columns.  Rendering is best-effort:
//! a display error never reaches the controller, it only produces one
//! `DisplayUnavailable` event per outage and `DisplayRecovered` when a
//! frame is accepted again.

use core::fmt::Write;

use crate::app::events::AppEvent;
use crate::app::ports::{DisplayPort, EventSink};
use crate::config::bounded;
use crate::context::SensorReading;
use crate::risk::RiskLevel;

/// Columns on the target panel.
pub const LINE_WIDTH: usize = 16;

pub type StatusLine = heapless::String<LINE_WIDTH>;

/// Format both lines.  Pure.
pub fn render(reading: &SensorReading, level: RiskLevel) -> (StatusLine, StatusLine) {
    // Wide enough for f32::MAX printed in full.
    let mut scratch: heapless::String<64> = heapless::String::new();

    let _ = write!(scratch, "T:{:.1}C S:{}", reading.temperature_c, reading.smoke_ppm);
    let line1 = bounded(&scratch);

    scratch.clear();
    let _ = write!(scratch, "G:{} R:{}", reading.gas_ppm, level.label());
    let line2 = bounded(&scratch);

    (line1, line2)
}

pub struct StatusRenderer {
    available: bool,
    frames_dropped: u32,
}

impl Default for StatusRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusRenderer {
    pub fn new() -> Self {
        Self {
            available: true,
            frames_dropped: 0,
        }
    }

    /// Push one frame to the display.  Never fails.
    pub fn render_to(
        &mut self,
        reading: &SensorReading,
        level: RiskLevel,
        display: &mut impl DisplayPort,
        sink: &mut impl EventSink,
    ) {
        let (line1, line2) = render(reading, level);
        match display.show(&line1, &line2) {
            Ok(()) => {
                if !self.available {
                    self.available = true;
                    sink.emit(&AppEvent::DisplayRecovered);
                }
            }
            Err(e) => {
                self.frames_dropped = self.frames_dropped.saturating_add(1);
                if self.available {
                    self.available = false;
                    log::debug!("Status: display write failed ({})", e);
                    sink.emit(&AppEvent::DisplayUnavailable);
                }
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn frames_dropped(&self) -> u32 {
        self.frames_dropped
    }
}
