use glam::{Quat, Vec3};
use std::fmt::Debug;

/// Limits the direction of the segment leaving a chain joint.
///
/// `direction` is the proposed object-space segment direction and
/// `reference` the direction of the segment entering the joint (or the
/// segment's rest direction for the first joint of a chain). Returns a unit
/// direction.
pub trait Constraint: Send + Sync + Debug {
    fn apply(&self, direction: Vec3, reference: Vec3) -> Vec3;
    fn clone_box(&self) -> Box<dyn Constraint>;
}

impl Clone for Box<dyn Constraint> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Cone limit around the reference direction.
#[derive(Debug, Clone, Copy)]
pub struct BallSocketConstraint {
    pub max_angle: f32,
}

impl BallSocketConstraint {
    pub fn new(max_angle_degrees: f32) -> Self {
        Self {
            max_angle: max_angle_degrees.to_radians(),
        }
    }

    pub fn from_radians(max_angle: f32) -> Self {
        Self { max_angle }
    }
}

impl Constraint for BallSocketConstraint {
    fn apply(&self, direction: Vec3, reference: Vec3) -> Vec3 {
        let dir = direction.normalize_or_zero();
        let ref_dir = reference.normalize_or_zero();

        if ref_dir == Vec3::ZERO {
            return dir;
        }
        if dir == Vec3::ZERO {
            return ref_dir;
        }

        let angle = dir.angle_between(ref_dir);
        if angle <= self.max_angle {
            return dir;
        }

        // pull back onto the cone surface, in the plane of the two directions
        let t = self.max_angle / angle;
        Quat::from_rotation_arc(ref_dir, dir).slerp(Quat::IDENTITY, 1.0 - t) * ref_dir
    }

    fn clone_box(&self) -> Box<dyn Constraint> {
        Box::new(*self)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NoConstraint;

impl Constraint for NoConstraint {
    fn apply(&self, direction: Vec3, _reference: Vec3) -> Vec3 {
        direction.normalize_or_zero()
    }

    fn clone_box(&self) -> Box<dyn Constraint> {
        Box::new(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inside_cone_unchanged() {
        let c = BallSocketConstraint::new(45.0);
        let dir = Vec3::new(1.0, 2.0, 0.0);
        let out = c.apply(dir, Vec3::Y);
        assert!(out.abs_diff_eq(dir.normalize(), 1e-6));
    }

    #[test]
    fn test_outside_cone_clamped() {
        let c = BallSocketConstraint::new(30.0);
        let out = c.apply(Vec3::X, Vec3::Y);
        assert!((out.length() - 1.0).abs() < 1e-5);
        assert!((out.angle_between(Vec3::Y) - 30f32.to_radians()).abs() < 1e-4);
        // stays in the plane spanned by the inputs
        assert!(out.z.abs() < 1e-5);
        assert!(out.x > 0.0);
    }

    #[test]
    fn test_degenerate_inputs() {
        let c = BallSocketConstraint::new(10.0);
        assert_eq!(c.apply(Vec3::ZERO, Vec3::Y), Vec3::Y);
        assert_eq!(c.apply(Vec3::X * 3.0, Vec3::ZERO), Vec3::X);
        assert_eq!(NoConstraint.apply(Vec3::Z * 2.0, Vec3::Y), Vec3::Z);
    }
}
