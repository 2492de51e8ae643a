//! [`GestureDetector`] – the abstract detection contract.
//!
//! A detector wraps a [`SampleWindow`] and a pluggable [`Recognizer`]. Every
//! [`add`][GestureDetector::add] validates the incoming sample, pushes it
//! into the window, and synchronously runs the recognizer exactly once. The
//! recognizer emits through an [`EventSink`]: direct map commands via
//! [`EventSink::surface`], or debounced gesture signals via
//! [`EventSink::raise`].
//!
//! Raising a signal, whether or not the debounce gate lets it through,
//! unconditionally clears the window afterwards: one detected gesture
//! consumes the whole buffered history, so the next detection starts from an
//! empty buffer.
//!
//! All timing (the debounce gate included) advances on the sample clock, the
//! timestamps carried by the samples themselves. Replayed streams therefore
//! behave identically to live ones.

use chrono::{DateTime, Utc};
use gestmap_surface::MapSurface;
use gestmap_types::{GestureError, GestureSignal, Sample};
use tracing::debug;

use crate::window::{DEFAULT_WINDOW_SIZE, SampleWindow, WindowObserver};

// ────────────────────────────────────────────────────────────────────────────
// Recognizer and listener traits
// ────────────────────────────────────────────────────────────────────────────

/// The pluggable gesture-evaluation step.
///
/// Invoked once per inserted sample, never concurrently. Implementations
/// must decline quietly on sparse or insufficient data; returning an error
/// is reserved for surface failures.
pub trait Recognizer {
    /// Name used in log events and emitted signals.
    fn name(&self) -> &'static str;

    /// Number of joints every sample must carry.
    fn required_joints(&self) -> usize;

    /// Inspect the window after an insertion; emit zero or more commands or
    /// signals through `sink`.
    fn evaluate(
        &mut self,
        window: &SampleWindow,
        sink: &mut EventSink<'_>,
    ) -> Result<(), GestureError>;
}

/// Receiver of debounced [`GestureSignal`]s.
///
/// At most one listener per detector. The listener gets the surface handle
/// alongside the signal so that accumulation logic (e.g.
/// [`WalkAccumulator`][crate::updown::WalkAccumulator]) can issue its own
/// commands.
pub trait SignalListener {
    fn on_signal(
        &mut self,
        signal: &GestureSignal,
        surface: &mut dyn MapSurface,
    ) -> Result<(), GestureError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Debounce gate
// ────────────────────────────────────────────────────────────────────────────

/// Suppresses signal emissions closer together than a minimal period.
///
/// A period of 0 (the default) disables the gate entirely. The first
/// emission after construction always passes.
struct DebounceGate {
    minimal_period_ms: f64,
    last_emission: Option<DateTime<Utc>>,
}

impl DebounceGate {
    fn new(minimal_period_ms: f64) -> Self {
        Self {
            minimal_period_ms,
            last_emission: None,
        }
    }

    /// Returns `true` (and records the emission) when at least the minimal
    /// period elapsed since the last passed emission.
    fn try_pass(&mut self, now: DateTime<Utc>) -> bool {
        let allowed = match self.last_emission {
            None => true,
            Some(last) => (now - last).num_milliseconds() as f64 >= self.minimal_period_ms,
        };
        if allowed {
            self.last_emission = Some(now);
        }
        allowed
    }
}

// ────────────────────────────────────────────────────────────────────────────
// EventSink
// ────────────────────────────────────────────────────────────────────────────

/// Emission handle passed to [`Recognizer::evaluate`].
///
/// Borrows the detector's debounce state, its listener, and the caller's
/// map surface for the duration of one evaluation pass.
pub struct EventSink<'a> {
    surface: &'a mut dyn MapSurface,
    listener: Option<&'a mut (dyn SignalListener + 'static)>,
    gate: &'a mut DebounceGate,
    now: DateTime<Utc>,
    clear_window: bool,
}

impl EventSink<'_> {
    /// Direct access to the map surface for un-gated commands (pan deltas,
    /// zoom ticks, mode toggles).
    pub fn surface(&mut self) -> &mut dyn MapSurface {
        &mut *self.surface
    }

    /// Timestamp of the sample that triggered this evaluation.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Emit `signal` to the registered listener, subject to the debounce
    /// gate. Gated or not, the detector's window is cleared once evaluation
    /// returns.
    pub fn raise(&mut self, signal: GestureSignal) -> Result<(), GestureError> {
        self.clear_window = true;

        if !self.gate.try_pass(self.now) {
            debug!(name = %signal.name, value = signal.value, "gesture gated by debounce period");
            return Ok(());
        }

        debug!(name = %signal.name, value = signal.value, "gesture detected");
        if let Some(listener) = self.listener.as_mut() {
            listener.on_signal(&signal, &mut *self.surface)?;
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// GestureDetector
// ────────────────────────────────────────────────────────────────────────────

/// Wraps a [`SampleWindow`] and a [`Recognizer`]; one instance per tracked
/// body. Create it on the body's first qualifying frame and drop it when the
/// body leaves tracking; there is no pending work to drain.
pub struct GestureDetector<R: Recognizer> {
    window: SampleWindow,
    recognizer: R,
    gate: DebounceGate,
    listener: Option<Box<dyn SignalListener>>,
}

impl<R: Recognizer> GestureDetector<R> {
    /// Create a detector with the default window size (20 samples) and no
    /// debounce period.
    pub fn new(recognizer: R) -> Self {
        Self::with_window_size(recognizer, DEFAULT_WINDOW_SIZE)
    }

    /// Create a detector retaining at most `window_size` samples.
    pub fn with_window_size(recognizer: R, window_size: usize) -> Self {
        Self {
            window: SampleWindow::new(window_size),
            recognizer,
            gate: DebounceGate::new(0.0),
            listener: None,
        }
    }

    /// Set the minimal period between two listener notifications, in
    /// milliseconds. 0 disables the gate.
    pub fn set_minimal_period_ms(&mut self, period_ms: f64) {
        self.gate.minimal_period_ms = period_ms;
    }

    /// Register the signal listener. Replaces any previous listener.
    pub fn set_listener(&mut self, listener: Box<dyn SignalListener>) {
        self.listener = Some(listener);
    }

    /// Attach a rendering observer to the underlying window.
    pub fn set_window_observer(&mut self, observer: Box<dyn WindowObserver>) {
        self.window.set_observer(observer);
    }

    /// The wrapped recognizer.
    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    /// The underlying window (read-only; detection owns all mutation).
    pub fn window(&self) -> &SampleWindow {
        &self.window
    }

    /// Insert `sample` and run one evaluation pass.
    ///
    /// Runs synchronously: any commands the recognizer emits reach `surface`
    /// before this call returns.
    ///
    /// # Errors
    ///
    /// - [`GestureError::MalformedSample`] when the sample's joint count
    ///   does not match [`Recognizer::required_joints`].
    /// - [`GestureError::NonMonotonicTimestamp`] when the sample is older
    ///   than the window's newest entry.
    /// - Any error the recognizer's surface calls produce.
    pub fn add(
        &mut self,
        sample: Sample,
        surface: &mut dyn MapSurface,
    ) -> Result<(), GestureError> {
        let expected = self.recognizer.required_joints();
        let actual = sample.joints().len();
        if actual != expected {
            return Err(GestureError::MalformedSample { expected, actual });
        }

        if let Some(tail) = self.window.latest() {
            if sample.time() < tail.time() {
                return Err(GestureError::NonMonotonicTimestamp {
                    sample_ms: sample.time().timestamp_millis(),
                    tail_ms: tail.time().timestamp_millis(),
                });
            }
        }

        let now = sample.time();
        self.window.push(sample);

        let mut sink = EventSink {
            surface,
            listener: self.listener.as_deref_mut(),
            gate: &mut self.gate,
            now,
            clear_window: false,
        };
        let result = self.recognizer.evaluate(&self.window, &mut sink);
        let clear = sink.clear_window;

        if clear {
            self.window.clear();
        }
        result
    }
}
