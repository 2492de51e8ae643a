//! `gestmap-surface` – the map-rendering seam.
//!
//! The gesture engine never talks to a browser, a tile renderer, or any
//! concrete map widget; it talks to the [`MapSurface`] trait defined here.
//! Swapping the surface (embedded web view, native renderer, test recorder)
//! never touches detection logic.
//!
//! # Modules
//!
//! - [`surface`] – the [`MapSurface`] trait: pan / zoom / walk / orientation
//!   commands, all fallible.
//! - [`sim`] – headless implementations for CI and tests:
//!   [`RecordingSurface`][sim::RecordingSurface] captures every command for
//!   assertions, [`NullSurface`][sim::NullSurface] discards them.

pub mod sim;
pub mod surface;

pub use sim::{NullSurface, RecordingSurface};
pub use surface::MapSurface;
