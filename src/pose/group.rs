use std::sync::Arc;

use super::flags::PoseFlags;
use crate::error::{InvalidArgument, Result};
use crate::hierarchy::Hierarchy;
use crate::math::Transform;

/// One complete set of local transforms, indexed like the hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    transforms: Vec<Transform>,
}

impl Pose {
    pub fn identity(num_nodes: usize) -> Self {
        Self {
            transforms: vec![Transform::IDENTITY; num_nodes],
        }
    }

    pub fn from_transforms(transforms: Vec<Transform>) -> Self {
        Self { transforms }
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Transform> {
        self.transforms.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Transform> {
        self.transforms.get_mut(index)
    }

    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }
}

/// Poses that share one hierarchy, plus the per-node channel flags.
#[derive(Debug, Clone)]
pub struct PoseGroup {
    hierarchy: Arc<Hierarchy>,
    poses: Vec<Pose>,
    flags: Vec<PoseFlags>,
}

impl PoseGroup {
    /// Creates `pose_count` identity poses.
    pub fn new(hierarchy: Arc<Hierarchy>, pose_count: usize) -> Self {
        let n = hierarchy.num_nodes();
        Self {
            poses: vec![Pose::identity(n); pose_count],
            flags: vec![PoseFlags::default(); n],
            hierarchy,
        }
    }

    pub fn hierarchy(&self) -> &Arc<Hierarchy> {
        &self.hierarchy
    }

    pub fn num_nodes(&self) -> usize {
        self.hierarchy.num_nodes()
    }

    pub fn pose_count(&self) -> usize {
        self.poses.len()
    }

    pub fn poses(&self) -> &[Pose] {
        &self.poses
    }

    pub fn pose(&self, index: usize) -> Result<&Pose> {
        let num_poses = self.poses.len();
        self.poses
            .get(index)
            .ok_or_else(|| InvalidArgument::PoseOutOfRange { index, num_poses }.into())
    }

    pub fn pose_mut(&mut self, index: usize) -> Result<&mut Pose> {
        let num_poses = self.poses.len();
        self.poses
            .get_mut(index)
            .ok_or_else(|| InvalidArgument::PoseOutOfRange { index, num_poses }.into())
    }

    /// Appends a pose; its length must match the hierarchy.
    pub fn push_pose(&mut self, pose: Pose) -> Result<usize> {
        let expected = self.num_nodes();
        if pose.len() != expected {
            return Err(InvalidArgument::PoseLength {
                expected,
                actual: pose.len(),
            }
            .into());
        }
        self.poses.push(pose);
        Ok(self.poses.len() - 1)
    }

    /// Local transform of `node` in `pose`.
    pub fn node_pose_mut(&mut self, pose: usize, node: usize) -> Result<&mut Transform> {
        let num_nodes = self.num_nodes();
        self.pose_mut(pose)?
            .get_mut(node)
            .ok_or_else(|| InvalidArgument::NodeOutOfRange { index: node, num_nodes }.into())
    }

    pub fn flags(&self) -> &[PoseFlags] {
        &self.flags
    }

    pub fn node_flags(&self, node: usize) -> PoseFlags {
        self.flags.get(node).copied().unwrap_or_default()
    }

    pub fn set_flags(&mut self, node: usize, flags: PoseFlags) -> Result<()> {
        let num_nodes = self.flags.len();
        let slot = self
            .flags
            .get_mut(node)
            .ok_or(InvalidArgument::NodeOutOfRange { index: node, num_nodes })?;
        *slot = flags;
        Ok(())
    }
}
