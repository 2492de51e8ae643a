//! Body orientation from the shoulder line.

use gestmap_types::Point3;

/// Angle of the shoulder line in the horizontal (x, z) plane, in degrees.
///
/// 0° means the body squarely faces the sensor (both shoulders at equal
/// depth); a positive angle means the right shoulder is further from the
/// sensor than the left.
pub fn body_angle(shoulder_left: Point3, shoulder_right: Point3) -> f32 {
    let dz = shoulder_right.z - shoulder_left.z;
    let dx = shoulder_right.x - shoulder_left.x;
    dz.atan2(dx).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_shoulders_face_forward() {
        let angle = body_angle(Point3::new(-0.2, 0.0, 2.0), Point3::new(0.2, 0.0, 2.0));
        assert!(angle.abs() < f32::EPSILON);
    }

    #[test]
    fn right_shoulder_back_is_positive() {
        let angle = body_angle(Point3::new(-0.2, 0.0, 2.0), Point3::new(0.2, 0.0, 2.2));
        assert!(angle > 0.0);
    }

    #[test]
    fn left_shoulder_back_is_negative() {
        let angle = body_angle(Point3::new(-0.2, 0.0, 2.2), Point3::new(0.2, 0.0, 2.0));
        assert!(angle < 0.0);
    }

    #[test]
    fn forty_five_degree_turn() {
        // Equal x and z extents put the shoulder line at 45 degrees.
        let angle = body_angle(Point3::new(-0.2, 0.0, 2.0), Point3::new(0.2, 0.0, 2.4));
        assert!((angle - 45.0).abs() < 1e-3);
    }
}
