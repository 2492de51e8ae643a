//! `gestmap-session` – per-body detector lifecycle and frame routing.
//!
//! The detection crates know nothing about *who* is gesturing: a
//! [`GestureDetector`][gestmap_engine::GestureDetector] knows one body and
//! one window. This crate owns the caller side: a [`GestureSession`] keyed by
//! sensor tracking ids that creates detectors lazily on the first qualifying
//! frame, drops them when a body leaves tracking, and routes every frame's
//! joints to the right detector pair.
//!
//! It also carries the two frame-level measurements that do not belong to any
//! single detector (body orientation from the shoulder line, face pitch
//! averaging) and the process-wide `tracing` subscriber setup.
//!
//! # Modules
//!
//! - [`session`] – [`GestureSession`] and the per-frame [`BodyObservation`]
//!   input record.
//! - [`orientation`] – shoulder-line body-angle geometry.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing] subscriber
//!   setup.

pub mod orientation;
pub mod session;
pub mod telemetry;

pub use orientation::body_angle;
pub use session::{BodyObservation, GestureSession};
pub use telemetry::init_tracing;
