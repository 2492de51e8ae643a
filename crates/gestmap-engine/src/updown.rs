//! Up/down detector – vertical bobbing of a single joint drives "walk".
//!
//! [`UpDownRecognizer`] watches one joint (typically the hip center) and
//! raises a signal whenever the vertical delta between the two newest samples
//! is large enough and fast enough. The listener-side [`WalkAccumulator`]
//! sums the *positive* deltas and issues one [`Walk`][gestmap_types::MapCommand::Walk]
//! command each time the running total crosses its threshold.
//!
//! Only upward motion feeds the accumulator. Downward deltas are raised as
//! signals but ignored by the walk logic, so a user bobbing in place advances
//! at half the rate of someone rising steadily.

use gestmap_surface::MapSurface;
use gestmap_types::{GestureError, GestureSignal, Sample};
use tracing::debug;

use crate::detector::{EventSink, Recognizer, SignalListener};
use crate::window::SampleWindow;

/// Minimum vertical delta (metres) between consecutive samples.
const MINIMAL_LENGTH: f32 = 0.015;
/// Maximum duration (ms) between consecutive samples for the delta to count.
const MINIMAL_DURATION_MS: f64 = 300.0;
/// Accumulated upward motion (metres) that triggers one walk pulse.
const WALK_THRESHOLD: f32 = 0.15;

/// Signal name raised by [`UpDownRecognizer`].
pub const UPDOWN_SIGNAL: &str = "updown";

fn round3(value: f32) -> f32 {
    (value * 1000.0).round() / 1000.0
}

// ────────────────────────────────────────────────────────────────────────────
// UpDownRecognizer
// ────────────────────────────────────────────────────────────────────────────

/// Single-joint vertical-delta recognizer.
///
/// Requires samples carrying exactly one joint. With fewer than two buffered
/// samples it declines; otherwise it compares the two newest samples and
/// raises a signal carrying the (3-decimal-rounded) vertical delta when
/// `|delta| > 0.015` and the samples are less than 300 ms apart.
#[derive(Debug, Default)]
pub struct UpDownRecognizer;

impl UpDownRecognizer {
    pub fn new() -> Self {
        Self
    }
}

impl Recognizer for UpDownRecognizer {
    fn name(&self) -> &'static str {
        UPDOWN_SIGNAL
    }

    fn required_joints(&self) -> usize {
        1
    }

    fn evaluate(
        &mut self,
        window: &SampleWindow,
        sink: &mut EventSink<'_>,
    ) -> Result<(), GestureError> {
        let (Some(latest), Some(previous)) = (window.from_newest(0), window.from_newest(1)) else {
            return Ok(());
        };

        let value = round3(latest.joints()[0].y - previous.joints()[0].y);
        let duration_ms = latest.millis_since(previous);

        if value.abs() > MINIMAL_LENGTH && duration_ms < MINIMAL_DURATION_MS {
            sink.raise(GestureSignal {
                name: UPDOWN_SIGNAL.to_string(),
                value,
            })?;
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// WalkAccumulator
// ────────────────────────────────────────────────────────────────────────────

/// Listener that converts accumulated upward deltas into walk pulses.
///
/// Register it on the up/down detector via
/// [`GestureDetector::set_listener`][crate::detector::GestureDetector::set_listener].
#[derive(Debug, Default)]
pub struct WalkAccumulator {
    count: f32,
}

impl WalkAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current accumulated upward motion (metres).
    pub fn count(&self) -> f32 {
        self.count
    }
}

impl SignalListener for WalkAccumulator {
    fn on_signal(
        &mut self,
        signal: &GestureSignal,
        surface: &mut dyn MapSurface,
    ) -> Result<(), GestureError> {
        // Only upward motion counts.
        if signal.value <= 0.0 {
            return Ok(());
        }

        self.count += signal.value;
        if self.count > WALK_THRESHOLD {
            self.count = 0.0;
            debug!("walk threshold crossed, issuing walk pulse");
            surface.walk()?;
        }
        Ok(())
    }
}
