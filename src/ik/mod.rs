//! Inverse Kinematics module
//!
//! End-effector IK for chains of hierarchy nodes. Both solvers are layered on
//! the forward solver and on [`crate::kinematics::decompose`]; they leave the
//! hierarchy state solved.

pub mod ccd;
pub mod chain;
pub mod constraint;
pub mod joint;
pub mod solver;

pub use ccd::CcdSolver;
pub use chain::{IkChain, IkChainBuilder};
pub use constraint::{BallSocketConstraint, Constraint, NoConstraint};
pub use joint::ChainJoint;
pub use solver::{FabrikSolver, SolveResult, SolverConfig};
