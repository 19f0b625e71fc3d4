//! Poses and pose groups
//!
//! A pose is one sample of local transforms for every node of a hierarchy.
//! Poses sharing a hierarchy are kept together in a [`PoseGroup`], which
//! also records the [`PoseFlags`] that limit what inverse kinematics may edit.

mod flags;
mod group;

pub use flags::PoseFlags;
pub use group::{Pose, PoseGroup};

pub(crate) use flags::select_axes;
