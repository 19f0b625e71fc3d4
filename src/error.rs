use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KinematicsError {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),

    #[error("invalid topology: {0}")]
    InvalidTopology(#[from] TopologyError),

    #[error("parent transform of node {node} (parent {parent}) is not invertible")]
    SingularParentTransform { node: usize, parent: usize },
}

/// Caller errors, always reported before anything is written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidArgument {
    #[error("hierarchy state is not bound to a pose group")]
    Unbound,

    #[error("first index {first_index} is not below node count {num_nodes}")]
    FirstIndexOutOfRange { first_index: usize, num_nodes: usize },

    #[error("node count must be positive")]
    EmptyRange,

    #[error("range {first_index}+{node_count} exceeds node count {num_nodes}")]
    RangeOverflow {
        first_index: usize,
        node_count: usize,
        num_nodes: usize,
    },

    #[error("node index {index} is out of range for {num_nodes} nodes")]
    NodeOutOfRange { index: usize, num_nodes: usize },

    #[error("no node named {name:?}")]
    UnknownNode { name: String },

    #[error("pose index {index} is out of range for {num_poses} poses")]
    PoseOutOfRange { index: usize, num_poses: usize },

    #[error("pose has {actual} node transforms, hierarchy has {expected}")]
    PoseLength { expected: usize, actual: usize },

    #[error("chain needs at least two joints, got {length}")]
    ChainTooShort { length: usize },

    #[error("node {end} has only {available} joints on its path to the root, chain asked for {length}")]
    NotEnoughAncestors {
        end: usize,
        length: usize,
        available: usize,
    },

    #[error("chain joint {node} is not the child of the previous joint")]
    ChainBroken { node: usize },
}

/// Reasons a hierarchy description is rejected at construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("hierarchy has no nodes")]
    Empty,

    #[error("node {node} has parent {parent}, parents must precede children")]
    ParentOutOfOrder { node: usize, parent: i64 },

    #[error("node {node} has out-of-range parent {parent}")]
    ParentOutOfRange { node: usize, parent: i64 },

    #[error("node name {name:?} is used more than once")]
    DuplicateName { name: String },
}

pub type Result<T> = std::result::Result<T, KinematicsError>;
