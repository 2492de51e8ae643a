//! [`GestureSession`] – routes sensor frames to per-body detectors.
//!
//! One session serves one sensor. Each frame the caller hands over every
//! tracked body as a [`BodyObservation`]; the session keeps an up/down
//! detector (walking) and a hands detector (pan/zoom) per tracking id,
//! creating them lazily and dropping them the moment a body disappears from
//! the frame.
//!
//! A detector is only fed while all of its joints are tracked; a body with a
//! momentarily occluded hand simply skips its hands detector that frame,
//! which the detector treats as any other gap in the stream.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use gestmap_engine::{GestureDetector, HandsRecognizer, UpDownRecognizer, WalkAccumulator};
use gestmap_surface::MapSurface;
use gestmap_types::{GestureError, Point3, Sample};

use crate::orientation::body_angle;

/// Average body angle (degrees) beyond which viewpoint rotation engages.
const BODY_ANGLE_THRESHOLD: f32 = 15.0;
/// Face pitch values outside ±this limit are sensor noise and are dropped.
const FACE_ANGLE_LIMIT: f32 = 90.0;

// ────────────────────────────────────────────────────────────────────────────
// BodyObservation
// ────────────────────────────────────────────────────────────────────────────

/// One tracked body as seen in one sensor frame.
///
/// Joints the sensor could not resolve this frame are `None`; the session
/// feeds each detector only when its full joint set is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyObservation {
    /// Sensor-assigned identity, stable while the body stays in view.
    pub tracking_id: i32,
    /// Frame capture timestamp.
    pub time: DateTime<Utc>,
    pub hip_center: Option<Point3>,
    pub hand_right: Option<Point3>,
    pub hand_left: Option<Point3>,
    pub shoulder_right: Option<Point3>,
    pub shoulder_left: Option<Point3>,
    pub shoulder_center: Option<Point3>,
    /// Face pitch in degrees, when a face tracker produced one this frame.
    pub face_angle: Option<f32>,
}

impl BodyObservation {
    /// An observation with no joints resolved yet.
    pub fn new(tracking_id: i32, time: DateTime<Utc>) -> Self {
        Self {
            tracking_id,
            time,
            hip_center: None,
            hand_right: None,
            hand_left: None,
            shoulder_right: None,
            shoulder_left: None,
            shoulder_center: None,
            face_angle: None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// GestureSession
// ────────────────────────────────────────────────────────────────────────────

/// Per-body detector registry plus the frame-level orientation outputs.
#[derive(Default)]
pub struct GestureSession {
    updown: HashMap<i32, GestureDetector<UpDownRecognizer>>,
    hands: HashMap<i32, GestureDetector<HandsRecognizer>>,
}

impl GestureSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any detector currently exists for `tracking_id`.
    pub fn tracks(&self, tracking_id: i32) -> bool {
        self.updown.contains_key(&tracking_id) || self.hands.contains_key(&tracking_id)
    }

    /// Current hands mode for `tracking_id`, when its hands detector exists.
    pub fn hands_mode(&self, tracking_id: i32) -> Option<gestmap_engine::HandsMode> {
        self.hands
            .get(&tracking_id)
            .map(|det| det.recognizer().mode())
    }

    /// Process one sensor frame.
    ///
    /// Drops detectors for bodies absent from `bodies`, feeds every present
    /// body's joints to its detectors (creating them on first sight), then
    /// emits the frame-level orientation commands: averaged body angle
    /// (rotation engages above ±15°, otherwise rotation is explicitly
    /// stopped) and averaged face pitch (values outside ±90° discarded).
    pub fn process_frame(
        &mut self,
        bodies: &[BodyObservation],
        surface: &mut dyn MapSurface,
    ) -> Result<(), GestureError> {
        let present: HashSet<i32> = bodies.iter().map(|b| b.tracking_id).collect();
        self.updown.retain(|id, _| {
            let keep = present.contains(id);
            if !keep {
                debug!(tracking_id = id, "body left tracking, dropping detectors");
            }
            keep
        });
        self.hands.retain(|id, _| present.contains(id));

        let mut angle_sum = 0.0_f32;
        let mut angle_count = 0_u32;
        let mut face_sum = 0.0_f32;
        let mut face_count = 0_u32;

        for body in bodies {
            if let Some(hip) = body.hip_center {
                let detector = self
                    .updown
                    .entry(body.tracking_id)
                    .or_insert_with(new_updown_detector);
                detector.add(Sample::new(vec![hip], body.time), surface)?;
            }

            if let (Some(rh), Some(lh), Some(rs), Some(ls), Some(sc)) = (
                body.hand_right,
                body.hand_left,
                body.shoulder_right,
                body.shoulder_left,
                body.shoulder_center,
            ) {
                let detector = self
                    .hands
                    .entry(body.tracking_id)
                    .or_insert_with(|| GestureDetector::new(HandsRecognizer::new()));
                detector.add(Sample::new(vec![rh, lh, rs, ls, sc], body.time), surface)?;
            }

            if let (Some(left), Some(right)) = (body.shoulder_left, body.shoulder_right) {
                angle_sum += body_angle(left, right);
                angle_count += 1;
            }

            if let Some(face) = body.face_angle {
                if (-FACE_ANGLE_LIMIT..=FACE_ANGLE_LIMIT).contains(&face) {
                    face_sum += face;
                    face_count += 1;
                }
            }
        }

        if angle_count > 0 {
            let average = angle_sum / angle_count as f32;
            if average.abs() > BODY_ANGLE_THRESHOLD {
                surface.set_angle_speed(average)?;
            } else {
                surface.set_angle_speed(0.0)?;
            }
        }

        if face_count > 0 {
            surface.set_face_angle(face_sum / face_count as f32)?;
        }

        Ok(())
    }
}

fn new_updown_detector() -> GestureDetector<UpDownRecognizer> {
    let mut detector = GestureDetector::new(UpDownRecognizer::new());
    detector.set_listener(Box::new(WalkAccumulator::new()));
    detector
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use gestmap_surface::RecordingSurface;
    use gestmap_types::MapCommand;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + chrono::Duration::milliseconds(ms)
    }

    fn hip_body(id: i32, ms: i64, y: f32) -> BodyObservation {
        let mut body = BodyObservation::new(id, at(ms));
        body.hip_center = Some(Point3::new(0.0, y, 2.0));
        body
    }

    fn shoulders_body(id: i32, ms: i64, left: Point3, right: Point3) -> BodyObservation {
        let mut body = BodyObservation::new(id, at(ms));
        body.shoulder_left = Some(left);
        body.shoulder_right = Some(right);
        body
    }

    fn full_body(id: i32, ms: i64) -> BodyObservation {
        let mut body = BodyObservation::new(id, at(ms));
        body.hip_center = Some(Point3::new(0.0, 0.0, 2.0));
        body.hand_right = Some(Point3::new(0.2, -0.45, 2.1));
        body.hand_left = Some(Point3::new(-0.2, -0.45, 2.1));
        body.shoulder_right = Some(Point3::new(0.2, 0.4, 2.0));
        body.shoulder_left = Some(Point3::new(-0.2, 0.4, 2.0));
        body.shoulder_center = Some(Point3::new(0.0, 0.4, 2.0));
        body
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    #[test]
    fn detectors_created_lazily_per_joint_set() {
        let mut session = GestureSession::new();
        let mut surface = RecordingSurface::new();

        // Hip only: the up/down detector appears, the hands one does not.
        session
            .process_frame(&[hip_body(7, 0, 0.0)], &mut surface)
            .unwrap();
        assert!(session.updown.contains_key(&7));
        assert!(!session.hands.contains_key(&7));

        // Full joint set: the hands detector joins.
        session
            .process_frame(&[full_body(7, 33)], &mut surface)
            .unwrap();
        assert!(session.hands.contains_key(&7));
    }

    #[test]
    fn departed_body_detectors_are_dropped() {
        let mut session = GestureSession::new();
        let mut surface = RecordingSurface::new();

        session
            .process_frame(&[full_body(1, 0)], &mut surface)
            .unwrap();
        assert!(session.tracks(1));

        session
            .process_frame(&[full_body(2, 33)], &mut surface)
            .unwrap();
        assert!(!session.tracks(1));
        assert!(session.tracks(2));
    }

    #[test]
    fn occluded_joints_skip_the_detector_without_error() {
        let mut session = GestureSession::new();
        let mut surface = RecordingSurface::new();

        session
            .process_frame(&[full_body(1, 0)], &mut surface)
            .unwrap();

        // Right hand lost: the hands detector is starved, not fed a
        // malformed sample.
        let mut occluded = full_body(1, 33);
        occluded.hand_right = None;
        session.process_frame(&[occluded], &mut surface).unwrap();
        assert_eq!(session.hands.get(&1).unwrap().window().len(), 1);
    }

    // ------------------------------------------------------------------
    // Body angle
    // ------------------------------------------------------------------

    #[test]
    fn turned_body_engages_rotation() {
        let mut session = GestureSession::new();
        let mut surface = RecordingSurface::new();

        // 45 degree shoulder line.
        let body = shoulders_body(
            1,
            0,
            Point3::new(-0.2, 0.0, 2.0),
            Point3::new(0.2, 0.0, 2.4),
        );
        session.process_frame(&[body], &mut surface).unwrap();

        assert_eq!(surface.commands().len(), 1);
        if let MapCommand::SetAngleSpeed { degrees } = &surface.commands()[0] {
            assert!((degrees - 45.0).abs() < 1e-3);
        } else {
            panic!("expected SetAngleSpeed, got {:?}", surface.commands()[0]);
        }
    }

    #[test]
    fn square_body_stops_rotation() {
        let mut session = GestureSession::new();
        let mut surface = RecordingSurface::new();

        let body = shoulders_body(
            1,
            0,
            Point3::new(-0.2, 0.0, 2.0),
            Point3::new(0.2, 0.0, 2.0),
        );
        session.process_frame(&[body], &mut surface).unwrap();

        assert_eq!(
            surface.commands(),
            &[MapCommand::SetAngleSpeed { degrees: 0.0 }]
        );
    }

    #[test]
    fn body_angles_average_across_bodies() {
        let mut session = GestureSession::new();
        let mut surface = RecordingSurface::new();

        // +45 and -45 degree bodies cancel out; below the threshold the
        // rotation is explicitly stopped.
        let a = shoulders_body(
            1,
            0,
            Point3::new(-0.2, 0.0, 2.0),
            Point3::new(0.2, 0.0, 2.4),
        );
        let b = shoulders_body(
            2,
            0,
            Point3::new(-0.2, 0.0, 2.4),
            Point3::new(0.2, 0.0, 2.0),
        );
        session.process_frame(&[a, b], &mut surface).unwrap();

        assert_eq!(
            surface.commands(),
            &[MapCommand::SetAngleSpeed { degrees: 0.0 }]
        );
    }

    #[test]
    fn no_shoulders_no_rotation_command() {
        let mut session = GestureSession::new();
        let mut surface = RecordingSurface::new();

        session
            .process_frame(&[hip_body(1, 0, 0.0)], &mut surface)
            .unwrap();
        assert!(surface.commands().is_empty());
    }

    // ------------------------------------------------------------------
    // Face angle
    // ------------------------------------------------------------------

    #[test]
    fn face_angles_average_within_range() {
        let mut session = GestureSession::new();
        let mut surface = RecordingSurface::new();

        let mut a = BodyObservation::new(1, at(0));
        a.face_angle = Some(10.0);
        let mut b = BodyObservation::new(2, at(0));
        b.face_angle = Some(30.0);
        session.process_frame(&[a, b], &mut surface).unwrap();

        assert_eq!(
            surface.commands(),
            &[MapCommand::SetFaceAngle { degrees: 20.0 }]
        );
    }

    #[test]
    fn out_of_range_face_angle_is_discarded() {
        let mut session = GestureSession::new();
        let mut surface = RecordingSurface::new();

        let mut a = BodyObservation::new(1, at(0));
        a.face_angle = Some(15.0);
        let mut b = BodyObservation::new(2, at(0));
        b.face_angle = Some(500.0); // tracker failure sentinel
        session.process_frame(&[a, b], &mut surface).unwrap();

        assert_eq!(
            surface.commands(),
            &[MapCommand::SetFaceAngle { degrees: 15.0 }]
        );
    }

    #[test]
    fn no_valid_face_angle_no_command() {
        let mut session = GestureSession::new();
        let mut surface = RecordingSurface::new();

        let mut a = BodyObservation::new(1, at(0));
        a.face_angle = Some(-120.0);
        session.process_frame(&[a], &mut surface).unwrap();
        assert!(surface.commands().is_empty());
    }

    // ------------------------------------------------------------------
    // End to end: hip bobbing walks
    // ------------------------------------------------------------------

    #[test]
    fn hip_bobbing_produces_a_walk() {
        let mut session = GestureSession::new();
        let mut surface = RecordingSurface::new();

        // Twelve frames of 0.03 m bobbing at 100 ms: six up/down signals,
        // crossing the accumulator threshold on the sixth.
        for i in 0..12_i64 {
            let y = if i % 2 == 0 { 0.0 } else { 0.03 };
            session
                .process_frame(&[hip_body(1, i * 100, y)], &mut surface)
                .unwrap();
        }

        let walks = surface.count_matching(|c| matches!(c, MapCommand::Walk));
        assert_eq!(walks, 1);
    }

    #[test]
    fn body_observation_roundtrip() {
        let body = full_body(9, 0);
        let json = serde_json::to_string(&body).unwrap();
        let back: BodyObservation = serde_json::from_str(&json).unwrap();
        assert_eq!(body, back);
    }
}
