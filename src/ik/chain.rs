use super::constraint::Constraint;
use super::joint::ChainJoint;
use crate::error::{InvalidArgument, Result};
use crate::hierarchy::Hierarchy;

/// Joints from the chain root down to the end effector.
///
/// Each joint must be the direct child of the joint before it.
#[derive(Debug, Clone)]
pub struct IkChain {
    pub(crate) joints: Vec<ChainJoint>,
}

impl IkChain {
    pub fn builder() -> IkChainBuilder {
        IkChainBuilder::new()
    }

    /// Walks up from `end` until the chain holds `length` joints.
    pub fn from_end_node(hierarchy: &Hierarchy, end: usize, length: usize) -> Result<Self> {
        if length < 2 {
            return Err(InvalidArgument::ChainTooShort { length }.into());
        }
        let num_nodes = hierarchy.num_nodes();
        if end >= num_nodes {
            return Err(InvalidArgument::NodeOutOfRange {
                index: end,
                num_nodes,
            }
            .into());
        }

        let mut joints = Vec::with_capacity(length);
        let mut current = Some(end);
        while let Some(node) = current {
            joints.push(ChainJoint::new(node));
            if joints.len() == length {
                break;
            }
            current = hierarchy.parent_of(node);
        }
        if joints.len() < length {
            return Err(InvalidArgument::NotEnoughAncestors {
                end,
                length,
                available: joints.len(),
            }
            .into());
        }

        joints.reverse();
        Ok(Self { joints })
    }

    pub fn joints(&self) -> &[ChainJoint] {
        &self.joints
    }

    pub fn joints_mut(&mut self) -> &mut [ChainJoint] {
        &mut self.joints
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = usize> + '_ {
        self.joints.iter().map(|j| j.node)
    }

    pub fn end_effector(&self) -> Option<usize> {
        self.joints.last().map(|j| j.node)
    }

    pub fn base(&self) -> Option<usize> {
        self.joints.first().map(|j| j.node)
    }

    pub(crate) fn validate(&self, hierarchy: &Hierarchy) -> Result<()> {
        if self.joints.len() < 2 {
            return Err(InvalidArgument::ChainTooShort {
                length: self.joints.len(),
            }
            .into());
        }
        let num_nodes = hierarchy.num_nodes();
        if let Some(j) = self.joints.iter().find(|j| j.node >= num_nodes) {
            return Err(InvalidArgument::NodeOutOfRange {
                index: j.node,
                num_nodes,
            }
            .into());
        }
        for pair in self.joints.windows(2) {
            if hierarchy.parent_of(pair[1].node) != Some(pair[0].node) {
                return Err(InvalidArgument::ChainBroken { node: pair[1].node }.into());
            }
        }
        Ok(())
    }
}

pub struct IkChainBuilder {
    joints: Vec<ChainJoint>,
}

impl IkChainBuilder {
    pub fn new() -> Self {
        Self { joints: Vec::new() }
    }

    pub fn add_joint(mut self, node: usize) -> Self {
        self.joints.push(ChainJoint::new(node));
        self
    }

    pub fn add_joint_with_constraint<C: Constraint + 'static>(
        mut self,
        node: usize,
        constraint: C,
    ) -> Self {
        self.joints
            .push(ChainJoint::new(node).with_constraint(constraint));
        self
    }

    pub fn build(self) -> IkChain {
        IkChain {
            joints: self.joints,
        }
    }
}

impl Default for IkChainBuilder {
    fn default() -> Self {
        Self::new()
    }
}
