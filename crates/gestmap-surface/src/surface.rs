//! [`MapSurface`] – the command sink every detector emits into.
//!
//! Implementations wrap whatever actually renders the map (an embedded
//! browser bridge, a native tile widget). The engine only ever holds a
//! `&mut dyn MapSurface`, so surfaces can be swapped without touching
//! detection logic. All methods are fallible: a surface that has lost its
//! backend reports [`GestureError::SurfaceFault`] and the caller decides how
//! to react.

use gestmap_types::GestureError;

/// Receiver of discrete map-control commands.
///
/// Commands are fire-and-forget: the engine never waits on a surface and
/// never retries a failed command; the next frame simply produces fresh
/// ones.
pub trait MapSurface {
    /// Drag the map by `(dx, dy)` pixels.
    fn pan(&mut self, dx: f32, dy: f32) -> Result<(), GestureError>;

    /// Step the zoom level by `ticks` (positive zooms in).
    fn zoom(&mut self, ticks: i32) -> Result<(), GestureError>;

    /// Advance the street-level viewpoint one step.
    fn walk(&mut self) -> Result<(), GestureError>;

    /// Rotate the viewpoint at `degrees` per frame (0 stops rotation).
    fn set_angle_speed(&mut self, degrees: f32) -> Result<(), GestureError>;

    /// Tilt the viewpoint to the given face pitch in degrees.
    fn set_face_angle(&mut self, degrees: f32) -> Result<(), GestureError>;

    /// Toggle the surface between idle and drag/zoom interaction mode.
    fn switch_drag_or_zoom(&mut self, enabled: bool) -> Result<(), GestureError>;
}
