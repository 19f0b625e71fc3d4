//! Math utilities module
//!
//! Provides convenient re-exports from glam and additional transform utilities.

mod transform;

pub use transform::Transform;

// Re-export commonly used glam types
pub use glam::{Mat4, Quat, Vec3, Vec4};

/// Ratio of `|det|` to the product of the linear column lengths at or below
/// which a matrix is treated as singular.
pub const SINGULAR_EPSILON: f32 = 1e-6;

/// Whether `m` can be inverted without producing non-finite values.
///
/// Meant for affine transforms. The determinant is measured against the
/// product of the basis column lengths, its largest possible magnitude, so
/// uniformly small scales still count as invertible while collapsed or
/// nearly parallel axes do not. Translation does not take part.
pub fn is_invertible(m: &Mat4) -> bool {
    let det = m.determinant();
    let bound = m.x_axis.truncate().length()
        * m.y_axis.truncate().length()
        * m.z_axis.truncate().length();
    det.is_finite() && det.abs() > SINGULAR_EPSILON * bound
}
