//! `gestmap-types` – shared data model for the gesture-to-map pipeline.
//!
//! Defines the joint-space geometry primitives ([`Point3`], [`Point2`]), the
//! per-frame [`Sample`] snapshot consumed by the detectors in
//! `gestmap-engine`, the [`MapCommand`] vocabulary understood by the map
//! surface, the [`GestureSignal`] notification payload, and the crate-wide
//! [`GestureError`] taxonomy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ────────────────────────────────────────────────────────────────────────────
// Geometry primitives
// ────────────────────────────────────────────────────────────────────────────

/// A 3-D joint position in sensor space (metres).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    /// Create a new point.
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Component-wise difference `self − rhs`.
    pub fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }

    /// Euclidean length of this point treated as a vector.
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Midpoint between `self` and `rhs`.
    pub fn midpoint(self, rhs: Self) -> Self {
        Self::new(
            (self.x + rhs.x) * 0.5,
            (self.y + rhs.y) * 0.5,
            (self.z + rhs.z) * 0.5,
        )
    }

    /// Drop the depth axis, projecting onto the sensor's camera plane.
    pub fn xy(self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

/// A 2-D projection of a joint position (sensor camera plane).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    /// Create a new point.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self − rhs`.
    pub fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }

    /// Euclidean length of this point treated as a vector.
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sample
// ────────────────────────────────────────────────────────────────────────────

/// One snapshot of the joints a detector cares about, captured at one instant.
///
/// Joints are index-positional: the caller supplies the same ordering on
/// every frame (e.g. `[right_hand, left_hand, right_shoulder, left_shoulder,
/// shoulder_center]` for the hands detector). Immutable once created.
///
/// Timestamps must be monotonic (non-decreasing) per detector instance; the
/// detector rejects violations at insertion time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    joints: Vec<Point3>,
    time: DateTime<Utc>,
}

impl Sample {
    /// Create a sample from its joint positions and capture timestamp.
    pub fn new(joints: Vec<Point3>, time: DateTime<Utc>) -> Self {
        Self { joints, time }
    }

    /// The joint positions, in the caller-supplied order.
    pub fn joints(&self) -> &[Point3] {
        &self.joints
    }

    /// Capture timestamp (millisecond resolution).
    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    /// Milliseconds elapsed since `earlier` (negative when `earlier` is
    /// actually later).
    pub fn millis_since(&self, earlier: &Sample) -> f64 {
        (self.time - earlier.time).num_milliseconds() as f64
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Commands and signals
// ────────────────────────────────────────────────────────────────────────────

/// Discrete command sent to the external map-rendering surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "payload")]
pub enum MapCommand {
    /// Drag the map by real-valued pixel deltas.
    Pan { dx: f32, dy: f32 },
    /// Step the zoom level by a signed tick count.
    Zoom { ticks: i32 },
    /// Advance the street-level viewpoint one step.
    Walk,
    /// Rotate the viewpoint at the given angular speed (degrees).
    SetAngleSpeed { degrees: f32 },
    /// Tilt the viewpoint to the given face pitch (degrees).
    SetFaceAngle { degrees: f32 },
    /// Toggle the surface between idle and drag/zoom interaction mode.
    SwitchDragOrZoom { enabled: bool },
}

/// Notification emitted by a detector to its registered listener.
///
/// Not persisted; fire-and-forget, at most one listener per detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureSignal {
    /// Name of the gesture that fired, e.g. `"updown"`.
    pub name: String,
    /// Gesture magnitude (signed vertical delta for up/down).
    pub value: f32,
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Error type spanning malformed detector input and map-surface failures.
///
/// Insufficient data (fewer than two samples, an untracked joint) is *not*
/// an error: evaluation silently declines and the next frame tries again.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GestureError {
    #[error("malformed sample: expected {expected} joints, got {actual}")]
    MalformedSample { expected: usize, actual: usize },

    #[error("non-monotonic timestamp: sample at {sample_ms} ms precedes window tail at {tail_ms} ms")]
    NonMonotonicTimestamp { sample_ms: i64, tail_ms: i64 },

    #[error("map surface rejected {command}: {details}")]
    SurfaceFault { command: String, details: String },
}
