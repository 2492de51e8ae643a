//! Hands detector – two-hand pan/zoom mode machine.
//!
//! Each sample carries five joints in a fixed order ([`RIGHT_HAND`] ..
//! [`SHOULDER_CENTER`]). Per sample, [`classify`] derives the instantaneous
//! [`HandsState`] (which hands are stretched forward) from pure geometry;
//! the recognizer then runs the [`HandsMode`] transition table against a
//! backward scan of the window ([`scan_sustained`]) so that a momentary
//! flicker in classification cannot, by itself, engage a mode.
//!
//! While a mode is engaged, each tick that causes no transition produces the
//! mode's continuous output: pan deltas from the active hand's displacement,
//! or zoom ticks quantized out of the accumulated change in hand separation.
//!
//! The zoom tick's sign follows the running counter's sign, and the counter
//! keeps whatever fraction of a tick is left over after each emission, so
//! continuous motion never drifts against the quantized output.

use chrono::{DateTime, Utc};
use gestmap_types::{GestureError, Point2, Sample};
use tracing::debug;

use crate::detector::{EventSink, Recognizer};
use crate::window::SampleWindow;

/// Joint order the hands detector expects in every [`Sample`].
pub const RIGHT_HAND: usize = 0;
pub const LEFT_HAND: usize = 1;
pub const RIGHT_SHOULDER: usize = 2;
pub const LEFT_SHOULDER: usize = 3;
pub const SHOULDER_CENTER: usize = 4;

/// Number of joints per sample.
pub const HANDS_JOINTS: usize = 5;

/// Run length (ms) a classification must sustain to engage a mode from None.
const MINIMAL_DURATION_MS: f64 = 300.0;
/// Run length (ms) required for a mode-to-mode switch.
const MINIMAL_SHORT_DURATION_MS: f64 = 100.0;
/// Grace period (ms) in ReadyForNone before falling back to None.
const READY_FOR_NONE_TIMEOUT_MS: f64 = 1_000.0;
/// Hand-separation change (metres) per discrete zoom tick.
const ZOOM_UNIT: f64 = 0.06;
/// Minimum distance (metres) from shoulder center for a hand to count as
/// stretched forward.
const MINIMAL_HANDS_DISTANCE: f32 = 0.6;
/// Minimum depth offset (metres) from shoulder center.
const MINIMAL_Z_SUBTRACT: f32 = 0.45;
/// Maximum depth mismatch (metres) between the two hands for Double.
const MAXIMUM_Z_SUBTRACT_BETWEEN_HANDS: f32 = 0.1;
/// Metres-to-pixels scale for pan deltas.
const PAN_RATIO: f32 = 500.0;

// ────────────────────────────────────────────────────────────────────────────
// Hand configuration
// ────────────────────────────────────────────────────────────────────────────

/// Instantaneous two-hand spatial configuration, derived per sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandsState {
    /// Neither hand stretched forward.
    None,
    /// Only the right hand stretched forward.
    SingleRight,
    /// Only the left hand stretched forward.
    SingleLeft,
    /// Both hands stretched forward at matching depth.
    Double,
}

/// Classify one sample's hand configuration. Pure: identical joints always
/// yield the identical state.
///
/// The sample must carry [`HANDS_JOINTS`] joints in the documented order
/// (the detector enforces this before a sample ever reaches the window).
pub fn classify(sample: &Sample) -> HandsState {
    let joints = sample.joints();
    let right_hand = joints[RIGHT_HAND];
    let left_hand = joints[LEFT_HAND];
    let shoulder_center = joints[SHOULDER_CENTER];
    let hands_midpoint = right_hand.midpoint(left_hand);

    let right_distance = right_hand.sub(shoulder_center).length();
    let right_z = (right_hand.z - shoulder_center.z).abs();
    let left_distance = left_hand.sub(shoulder_center).length();
    let left_z = (left_hand.z - shoulder_center.z).abs();

    let hands_distance = hands_midpoint.sub(shoulder_center).length();
    let z_subtract = (hands_midpoint.z - shoulder_center.z).abs();
    let z_between_hands = (right_hand.z - left_hand.z).abs();

    let right_up = right_distance > MINIMAL_HANDS_DISTANCE && right_z > MINIMAL_Z_SUBTRACT;
    let left_up = left_distance > MINIMAL_HANDS_DISTANCE && left_z > MINIMAL_Z_SUBTRACT;

    if right_up && !left_up {
        HandsState::SingleRight
    } else if left_up && !right_up {
        HandsState::SingleLeft
    } else if hands_distance > MINIMAL_HANDS_DISTANCE
        && z_subtract > MINIMAL_Z_SUBTRACT
        && z_between_hands < MAXIMUM_Z_SUBTRACT_BETWEEN_HANDS
    {
        HandsState::Double
    } else {
        HandsState::None
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sustained-state scan (hysteresis)
// ────────────────────────────────────────────────────────────────────────────

/// Result of scanning the window backward for a run of identical
/// classifications.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct StateScan {
    /// Classification of the newest sample. `None` with fewer than 2 samples.
    pre_state: Option<HandsState>,
    /// The sustained classification, set only when the run reaches back more
    /// than the requested period.
    state: Option<HandsState>,
    /// Elapsed milliseconds covered by the run found so far.
    period_ms: f64,
}

/// Scan backward from the newest sample for a maximal run of identical
/// classifications; report the run's span and, when it exceeds `period_ms`,
/// the sustained state.
fn scan_sustained(window: &SampleWindow, period_ms: f64) -> StateScan {
    let Some(newest) = window.from_newest(0) else {
        return StateScan::default();
    };
    if window.len() < 2 {
        return StateScan::default();
    }

    let target = classify(newest);
    let mut result = StateScan {
        pre_state: Some(target),
        state: None,
        period_ms: 0.0,
    };

    for sample in window.iter().rev().skip(1) {
        if classify(sample) != target {
            return result;
        }
        result.period_ms = newest.millis_since(sample);
        if result.period_ms > period_ms {
            result.state = Some(target);
            return result;
        }
    }
    result
}

// ────────────────────────────────────────────────────────────────────────────
// Mode machine
// ────────────────────────────────────────────────────────────────────────────

/// The hands detector's interaction mode. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandsMode {
    /// Idle; no map interaction.
    None,
    /// An active mode just lost its hand configuration; grace period before
    /// dropping back to [`HandsMode::None`].
    ReadyForNone,
    /// Both hands forward; hand separation drives zoom ticks.
    Zoom,
    /// Right hand forward; its displacement drives pan deltas.
    PanRight,
    /// Left hand forward; its displacement drives pan deltas.
    PanLeft,
}

/// The transition table: first matching rule wins, evaluated only for the
/// current mode (never multi-hop in one tick). Returns `None` when no rule
/// matches.
///
/// Kept separate from the per-tick action logic so the geometry-free rules
/// are testable on their own.
fn next_mode(mode: HandsMode, scan: &StateScan, ready_elapsed_ms: Option<f64>) -> Option<HandsMode> {
    match mode {
        HandsMode::None => match scan.state {
            Some(HandsState::Double) => Some(HandsMode::Zoom),
            Some(HandsState::SingleRight) => Some(HandsMode::PanRight),
            Some(HandsState::SingleLeft) => Some(HandsMode::PanLeft),
            _ => None,
        },

        HandsMode::Zoom => {
            if scan.pre_state == Some(HandsState::SingleRight)
                && scan.period_ms > MINIMAL_SHORT_DURATION_MS
            {
                Some(HandsMode::PanRight)
            } else if scan.pre_state == Some(HandsState::SingleLeft)
                && scan.period_ms > MINIMAL_SHORT_DURATION_MS
            {
                Some(HandsMode::PanLeft)
            } else if scan.pre_state == Some(HandsState::None) {
                Some(HandsMode::ReadyForNone)
            } else {
                None
            }
        }

        HandsMode::PanRight => {
            if scan.pre_state == Some(HandsState::SingleLeft)
                && scan.period_ms > MINIMAL_SHORT_DURATION_MS
            {
                Some(HandsMode::PanLeft)
            } else if scan.pre_state == Some(HandsState::Double)
                && scan.period_ms > MINIMAL_SHORT_DURATION_MS
            {
                Some(HandsMode::Zoom)
            } else if scan.pre_state == Some(HandsState::None) {
                Some(HandsMode::ReadyForNone)
            } else {
                None
            }
        }

        HandsMode::PanLeft => {
            if scan.pre_state == Some(HandsState::SingleRight)
                && scan.period_ms > MINIMAL_SHORT_DURATION_MS
            {
                Some(HandsMode::PanRight)
            } else if scan.pre_state == Some(HandsState::Double)
                && scan.period_ms > MINIMAL_SHORT_DURATION_MS
            {
                Some(HandsMode::Zoom)
            } else if scan.pre_state == Some(HandsState::None) {
                Some(HandsMode::ReadyForNone)
            } else {
                None
            }
        }

        HandsMode::ReadyForNone => match scan.pre_state {
            Some(HandsState::SingleRight) => Some(HandsMode::PanRight),
            Some(HandsState::SingleLeft) => Some(HandsMode::PanLeft),
            Some(HandsState::Double) => Some(HandsMode::Zoom),
            _ => match ready_elapsed_ms {
                Some(elapsed) if elapsed > READY_FOR_NONE_TIMEOUT_MS => Some(HandsMode::None),
                _ => None,
            },
        },
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HandsRecognizer
// ────────────────────────────────────────────────────────────────────────────

/// Dual-hand pan/zoom recognizer.
///
/// Transitions are checked once per inserted sample; only when no transition
/// fires does the current mode produce its continuous output. The zoom
/// residual survives mode changes.
#[derive(Debug)]
pub struct HandsRecognizer {
    mode: HandsMode,
    zoom_counter: f64,
    ready_since: Option<DateTime<Utc>>,
}

impl Default for HandsRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl HandsRecognizer {
    pub fn new() -> Self {
        Self {
            mode: HandsMode::None,
            zoom_counter: 0.0,
            ready_since: None,
        }
    }

    /// The currently active mode.
    pub fn mode(&self) -> HandsMode {
        self.mode
    }

    /// Fraction of a zoom tick accumulated but not yet emitted.
    pub fn zoom_residual(&self) -> f64 {
        self.zoom_counter
    }

    fn enter(
        &mut self,
        next: HandsMode,
        now: DateTime<Utc>,
        sink: &mut EventSink<'_>,
    ) -> Result<(), GestureError> {
        debug!(prev = ?self.mode, next = ?next, "hands mode transition");
        self.mode = next;
        match next {
            HandsMode::Zoom | HandsMode::PanRight | HandsMode::PanLeft => {
                sink.surface().switch_drag_or_zoom(true)?;
            }
            HandsMode::ReadyForNone => {
                self.ready_since = Some(now);
            }
            HandsMode::None => {
                self.ready_since = None;
                sink.surface().switch_drag_or_zoom(false)?;
            }
        }
        Ok(())
    }

    /// Quantize the accumulated separation change into whole ticks, keeping
    /// the sign-preserved residual.
    fn drain_zoom_ticks(&mut self) -> i32 {
        let mut ticks = (self.zoom_counter.abs() / ZOOM_UNIT) as i32;
        if self.zoom_counter >= 0.0 {
            self.zoom_counter -= ZOOM_UNIT * ticks as f64;
        } else {
            self.zoom_counter += ZOOM_UNIT * ticks as f64;
            ticks = -ticks;
        }
        ticks
    }
}

/// 2-D hand separation of one sample, in f64 so tick quantization does not
/// wobble on single-precision rounding.
fn hand_separation_xy(sample: &Sample) -> f64 {
    let right = sample.joints()[RIGHT_HAND];
    let left = sample.joints()[LEFT_HAND];
    let dx = right.x as f64 - left.x as f64;
    let dy = right.y as f64 - left.y as f64;
    (dx * dx + dy * dy).sqrt()
}

impl Recognizer for HandsRecognizer {
    fn name(&self) -> &'static str {
        "hands"
    }

    fn required_joints(&self) -> usize {
        HANDS_JOINTS
    }

    fn evaluate(
        &mut self,
        window: &SampleWindow,
        sink: &mut EventSink<'_>,
    ) -> Result<(), GestureError> {
        if window.len() < 2 {
            return Ok(());
        }

        let scan = scan_sustained(window, MINIMAL_DURATION_MS);
        let now = sink.now();
        let ready_elapsed_ms = self
            .ready_since
            .map(|since| (now - since).num_milliseconds() as f64);

        if let Some(next) = next_mode(self.mode, &scan, ready_elapsed_ms) {
            return self.enter(next, now, sink);
        }

        let (Some(latest), Some(previous)) = (window.from_newest(0), window.from_newest(1)) else {
            return Ok(());
        };

        match self.mode {
            HandsMode::Zoom => {
                self.zoom_counter += hand_separation_xy(latest) - hand_separation_xy(previous);
                let ticks = self.drain_zoom_ticks();
                if ticks != 0 {
                    debug!(ticks, residual = self.zoom_counter, "zoom ticks");
                    sink.surface().zoom(ticks)?;
                }
            }

            HandsMode::PanRight | HandsMode::PanLeft => {
                let hand = if self.mode == HandsMode::PanRight {
                    RIGHT_HAND
                } else {
                    LEFT_HAND
                };
                let v: Point2 = latest.joints()[hand].xy().sub(previous.joints()[hand].xy());
                if v.length() > 0.0 {
                    sink.surface().pan(-v.x * PAN_RATIO, v.y * PAN_RATIO)?;
                }
            }

            HandsMode::None | HandsMode::ReadyForNone => {}
        }
        Ok(())
    }
}
