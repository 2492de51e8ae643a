//! `gestmap-engine` – the gesture recognition core.
//!
//! Turns a continuous stream of 3-D body-joint [`Sample`][gestmap_types::Sample]s
//! into discrete map-control commands. Frame-driven and fully synchronous:
//! every inserted sample triggers exactly one evaluation pass, which may emit
//! zero or more commands to the [`MapSurface`][gestmap_surface::MapSurface]
//! before returning.
//!
//! # Modules
//!
//! - [`window`] – [`SampleWindow`][window::SampleWindow]: fixed-capacity,
//!   time-ordered buffer of recent samples with oldest-first eviction and an
//!   optional rendering observer.
//! - [`detector`] – [`GestureDetector`][detector::GestureDetector]: the
//!   abstract contract. Wraps a window, runs a pluggable
//!   [`Recognizer`][detector::Recognizer] after every insertion, and provides
//!   the debounced [`EventSink::raise`][detector::EventSink::raise] emission
//!   primitive.
//! - [`updown`] – [`UpDownRecognizer`][updown::UpDownRecognizer]: single-joint
//!   vertical-delta detector with duration gate, plus the listener-side
//!   [`WalkAccumulator`][updown::WalkAccumulator] that converts upward motion
//!   into discrete walk pulses.
//! - [`hands`] – [`HandsRecognizer`][hands::HandsRecognizer]: 5-state
//!   pan/zoom mode machine over two-hand spatial configuration, with
//!   hysteresis, priority-ordered transitions, and quantized zoom
//!   accumulation.

pub mod detector;
pub mod hands;
pub mod updown;
pub mod window;

pub use detector::{EventSink, GestureDetector, Recognizer, SignalListener};
pub use hands::{HandsMode, HandsRecognizer, HandsState};
pub use updown::{UpDownRecognizer, WalkAccumulator};
pub use window::{SampleWindow, WindowObserver};
