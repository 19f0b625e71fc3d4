use super::constraint::Constraint;
use glam::Vec3;

/// One hierarchy node taking part in an IK chain.
#[derive(Debug, Clone)]
pub struct ChainJoint {
    pub node: usize,
    pub constraint: Option<Box<dyn Constraint>>,
}

impl ChainJoint {
    pub fn new(node: usize) -> Self {
        Self {
            node,
            constraint: None,
        }
    }

    pub fn with_constraint<C: Constraint + 'static>(mut self, constraint: C) -> Self {
        self.constraint = Some(Box::new(constraint));
        self
    }

    pub fn set_constraint<C: Constraint + 'static>(&mut self, constraint: C) {
        self.constraint = Some(Box::new(constraint));
    }

    pub fn clear_constraint(&mut self) {
        self.constraint = None;
    }

    /// Unit direction for the outgoing segment; `Vec3::Y` if degenerate.
    pub fn apply_constraint(&self, direction: Vec3, reference: Vec3) -> Vec3 {
        let dir = match &self.constraint {
            Some(c) => c.apply(direction, reference),
            None => direction.normalize_or_zero(),
        };
        if dir == Vec3::ZERO {
            Vec3::Y
        } else {
            dir
        }
    }
}
