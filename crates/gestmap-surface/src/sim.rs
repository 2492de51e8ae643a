//! Headless map surfaces for CI and tests, no renderer required.
//!
//! [`RecordingSurface`] captures every [`MapCommand`] it receives so tests
//! can assert on exact command sequences; [`NullSurface`] discards
//! everything. Both always succeed.

use gestmap_types::{GestureError, MapCommand};
use tracing::trace;

use crate::surface::MapSurface;

// ────────────────────────────────────────────────────────────────────────────
// RecordingSurface
// ────────────────────────────────────────────────────────────────────────────

/// A surface that records every command in arrival order.
///
/// # Example
///
/// ```
/// use gestmap_surface::{MapSurface, RecordingSurface};
/// use gestmap_types::MapCommand;
///
/// let mut surface = RecordingSurface::new();
/// surface.zoom(1).unwrap();
/// assert_eq!(surface.commands(), &[MapCommand::Zoom { ticks: 1 }]);
/// ```
#[derive(Debug, Default)]
pub struct RecordingSurface {
    commands: Vec<MapCommand>,
}

impl RecordingSurface {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command received so far, oldest first.
    pub fn commands(&self) -> &[MapCommand] {
        &self.commands
    }

    /// Number of recorded commands matching `predicate`.
    pub fn count_matching(&self, predicate: impl Fn(&MapCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| predicate(c)).count()
    }

    /// Forget everything recorded so far.
    pub fn reset(&mut self) {
        self.commands.clear();
    }

    fn record(&mut self, command: MapCommand) -> Result<(), GestureError> {
        trace!(?command, "recording surface command");
        self.commands.push(command);
        Ok(())
    }
}

impl MapSurface for RecordingSurface {
    fn pan(&mut self, dx: f32, dy: f32) -> Result<(), GestureError> {
        self.record(MapCommand::Pan { dx, dy })
    }

    fn zoom(&mut self, ticks: i32) -> Result<(), GestureError> {
        self.record(MapCommand::Zoom { ticks })
    }

    fn walk(&mut self) -> Result<(), GestureError> {
        self.record(MapCommand::Walk)
    }

    fn set_angle_speed(&mut self, degrees: f32) -> Result<(), GestureError> {
        self.record(MapCommand::SetAngleSpeed { degrees })
    }

    fn set_face_angle(&mut self, degrees: f32) -> Result<(), GestureError> {
        self.record(MapCommand::SetFaceAngle { degrees })
    }

    fn switch_drag_or_zoom(&mut self, enabled: bool) -> Result<(), GestureError> {
        self.record(MapCommand::SwitchDragOrZoom { enabled })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// NullSurface
// ────────────────────────────────────────────────────────────────────────────

/// A surface that accepts and discards every command.
#[derive(Debug, Default)]
pub struct NullSurface;

impl NullSurface {
    /// Create a null surface.
    pub fn new() -> Self {
        Self
    }
}

impl MapSurface for NullSurface {
    fn pan(&mut self, _dx: f32, _dy: f32) -> Result<(), GestureError> {
        Ok(())
    }

    fn zoom(&mut self, _ticks: i32) -> Result<(), GestureError> {
        Ok(())
    }

    fn walk(&mut self) -> Result<(), GestureError> {
        Ok(())
    }

    fn set_angle_speed(&mut self, _degrees: f32) -> Result<(), GestureError> {
        Ok(())
    }

    fn set_face_angle(&mut self, _degrees: f32) -> Result<(), GestureError> {
        Ok(())
    }

    fn switch_drag_or_zoom(&mut self, _enabled: bool) -> Result<(), GestureError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_surface_preserves_order() {
        let mut surface = RecordingSurface::new();
        surface.switch_drag_or_zoom(true).unwrap();
        surface.pan(-10.0, 5.0).unwrap();
        surface.zoom(2).unwrap();
        surface.walk().unwrap();

        assert_eq!(
            surface.commands(),
            &[
                MapCommand::SwitchDragOrZoom { enabled: true },
                MapCommand::Pan { dx: -10.0, dy: 5.0 },
                MapCommand::Zoom { ticks: 2 },
                MapCommand::Walk,
            ]
        );
    }

    #[test]
    fn recording_surface_count_matching() {
        let mut surface = RecordingSurface::new();
        surface.zoom(1).unwrap();
        surface.pan(1.0, 1.0).unwrap();
        surface.zoom(-1).unwrap();

        let zooms = surface.count_matching(|c| matches!(c, MapCommand::Zoom { .. }));
        assert_eq!(zooms, 2);
    }

    #[test]
    fn recording_surface_reset_clears() {
        let mut surface = RecordingSurface::new();
        surface.walk().unwrap();
        surface.reset();
        assert!(surface.commands().is_empty());
    }

    #[test]
    fn null_surface_accepts_everything() {
        let mut surface = NullSurface::new();
        surface.pan(1.0, 2.0).unwrap();
        surface.zoom(-3).unwrap();
        surface.walk().unwrap();
        surface.set_angle_speed(20.0).unwrap();
        surface.set_face_angle(-15.0).unwrap();
        surface.switch_drag_or_zoom(false).unwrap();
    }
}
