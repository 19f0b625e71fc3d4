//! Per-skeleton working set
//!
//! [`HierarchyState`] owns the local-space, object-space and target buffers
//! for one skeleton instance. Local space is written by pose application and
//! inverse kinematics, object space only by the forward solver.

use std::sync::Arc;

use glam::{Mat4, Vec3};

use crate::error::{InvalidArgument, Result};
use crate::hierarchy::Hierarchy;
use crate::pose::{PoseFlags, PoseGroup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateStatus {
    /// No pose group attached.
    Uninitialized,
    /// Buffers sized, nothing written or solved yet.
    Bound,
    /// Object space matches local space for every node.
    Solved,
    /// Local space changed since the last complete solve.
    Stale,
}

#[derive(Debug, Clone, Default)]
pub struct HierarchyState {
    group: Option<Arc<PoseGroup>>,
    local_space: Vec<Mat4>,
    object_space: Vec<Mat4>,
    object_target: Vec<Mat4>,
    // leading nodes whose object space is known to be current
    solved_prefix: usize,
    touched: bool,
}

impl HierarchyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(group: Arc<PoseGroup>) -> Self {
        let mut state = Self::new();
        state.bind(group);
        state
    }

    /// Attaches a pose group and resets every buffer to identity.
    pub fn bind(&mut self, group: Arc<PoseGroup>) {
        let n = group.num_nodes();
        self.local_space = vec![Mat4::IDENTITY; n];
        self.object_space = vec![Mat4::IDENTITY; n];
        self.object_target = vec![Mat4::IDENTITY; n];
        self.solved_prefix = 0;
        self.touched = false;
        self.group = Some(group);
        log::debug!("hierarchy state bound to {} nodes", n);
    }

    pub fn status(&self) -> StateStatus {
        match self.group {
            None => StateStatus::Uninitialized,
            Some(_) if self.solved_prefix == self.local_space.len() && self.touched => {
                StateStatus::Solved
            }
            Some(_) if self.touched => StateStatus::Stale,
            Some(_) => StateStatus::Bound,
        }
    }

    pub fn is_solved(&self) -> bool {
        self.status() == StateStatus::Solved
    }

    pub fn group(&self) -> Option<&Arc<PoseGroup>> {
        self.group.as_ref()
    }

    pub fn hierarchy(&self) -> Option<&Arc<Hierarchy>> {
        self.group.as_ref().map(|g| g.hierarchy())
    }

    pub(crate) fn bound_hierarchy(&self) -> Result<Arc<Hierarchy>> {
        self.hierarchy()
            .cloned()
            .ok_or_else(|| InvalidArgument::Unbound.into())
    }

    pub fn num_nodes(&self) -> usize {
        self.local_space.len()
    }

    pub fn local_space(&self) -> &[Mat4] {
        &self.local_space
    }

    /// Bulk access for pose samplers. Marks the whole state stale.
    pub fn local_space_mut(&mut self) -> &mut [Mat4] {
        self.invalidate_from(0);
        &mut self.local_space
    }

    pub fn set_local(&mut self, index: usize, transform: Mat4) -> Result<()> {
        self.check_node(index)?;
        self.local_space[index] = transform;
        self.invalidate_from(index);
        Ok(())
    }

    pub fn object_space(&self) -> &[Mat4] {
        &self.object_space
    }

    pub fn object_position(&self, index: usize) -> Option<Vec3> {
        self.object_space.get(index).map(|m| m.w_axis.truncate())
    }

    pub fn object_target(&self) -> &[Mat4] {
        &self.object_target
    }

    pub fn object_target_mut(&mut self) -> &mut [Mat4] {
        &mut self.object_target
    }

    pub fn set_target(&mut self, index: usize, transform: Mat4) -> Result<()> {
        self.check_node(index)?;
        self.object_target[index] = transform;
        Ok(())
    }

    /// Seeds the target buffer with the current object space.
    pub fn target_from_object_space(&mut self) {
        self.object_target.copy_from_slice(&self.object_space);
    }

    pub fn node_flags(&self, index: usize) -> PoseFlags {
        self.group
            .as_ref()
            .map_or_else(PoseFlags::default, |g| g.node_flags(index))
    }

    /// Copies pose `index` of the bound group into local space.
    pub fn apply_pose(&mut self, index: usize) -> Result<()> {
        let group = self.bound_group()?;
        let pose = group.pose(index)?;
        for (local, transform) in self.local_space.iter_mut().zip(pose.transforms()) {
            *local = transform.to_matrix();
        }
        self.invalidate_from(0);
        Ok(())
    }

    /// Interpolates poses `a` and `b` of the bound group into local space.
    pub fn blend_poses(&mut self, a: usize, b: usize, t: f32) -> Result<()> {
        let group = self.bound_group()?;
        let from = group.pose(a)?;
        let to = group.pose(b)?;
        for ((local, x), y) in self
            .local_space
            .iter_mut()
            .zip(from.transforms())
            .zip(to.transforms())
        {
            *local = x.lerp(y, t).to_matrix();
        }
        self.invalidate_from(0);
        Ok(())
    }

    fn bound_group(&self) -> Result<Arc<PoseGroup>> {
        self.group
            .clone()
            .ok_or_else(|| InvalidArgument::Unbound.into())
    }

    fn check_node(&self, index: usize) -> Result<()> {
        if self.group.is_none() {
            return Err(InvalidArgument::Unbound.into());
        }
        let num_nodes = self.local_space.len();
        if index >= num_nodes {
            return Err(InvalidArgument::NodeOutOfRange { index, num_nodes }.into());
        }
        Ok(())
    }

    pub(crate) fn split_buffers(&mut self) -> (&[Mat4], &mut [Mat4]) {
        (self.local_space.as_slice(), self.object_space.as_mut_slice())
    }

    /// Replaces the locals starting at `first`; later nodes become stale.
    pub(crate) fn write_locals(&mut self, first: usize, locals: &[Mat4]) {
        self.local_space[first..first + locals.len()].copy_from_slice(locals);
        self.invalidate_from(first);
    }

    /// Single local transform; nodes after `index` are treated as stale.
    pub(crate) fn local_at_mut(&mut self, index: usize) -> &mut Mat4 {
        self.invalidate_from(index);
        &mut self.local_space[index]
    }

    pub(crate) fn invalidate_from(&mut self, index: usize) {
        self.solved_prefix = self.solved_prefix.min(index);
        self.touched = true;
    }

    /// Records a forward pass over `[first, end)`.
    pub(crate) fn mark_solved(&mut self, first: usize, end: usize) {
        if first <= self.solved_prefix {
            self.solved_prefix = self.solved_prefix.max(end);
        }
        self.touched = true;
    }
}
