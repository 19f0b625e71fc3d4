//! # skeletal-kinematics
//!
//! Hierarchy, forward kinematics and inverse kinematics core for skeletal
//! animation.
//!
//! ## Features
//! - Flat node hierarchies with parent indices, validated once at construction
//! - Pose groups with per-node channel flags
//! - Range-based forward and inverse solvers over a per-skeleton state
//! - End-effector IK (FABRIK and CCD) with joint constraints
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use glam::Vec3;
//! use skeletal_kinematics::ik::{FabrikSolver, IkChain, SolverConfig};
//! use skeletal_kinematics::{kinematics, presets, HierarchyState};
//!
//! # fn main() -> skeletal_kinematics::Result<()> {
//! let (hierarchy, group) = presets::humanoid()?;
//! let mut state = HierarchyState::with_group(Arc::new(group));
//! state.apply_pose(0)?;
//! kinematics::solve_forward(&mut state)?;
//!
//! let hand = hierarchy.require("hand_r")?;
//! let chain = IkChain::from_end_node(&hierarchy, hand, 4)?;
//! let result = FabrikSolver::solve(&mut state, &chain, Vec3::new(2.0, 1.0, 6.0), &SolverConfig::default())?;
//! println!("converged: {}, distance: {}", result.converged, result.final_distance);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod hierarchy;
pub mod ik;
pub mod kinematics;
pub mod math;
pub mod pose;
pub mod presets;
pub mod state;

pub use error::{InvalidArgument, KinematicsError, Result, TopologyError};
pub use hierarchy::{Hierarchy, HierarchyBuilder, HierarchyNode, NO_PARENT};
pub use ik::{BallSocketConstraint, CcdSolver, Constraint, FabrikSolver, IkChain, SolveResult, SolverConfig};
pub use kinematics::{decompose, solve_forward, solve_forward_partial, solve_inverse, solve_inverse_partial};
pub use math::Transform;
pub use pose::{Pose, PoseFlags, PoseGroup};
pub use state::{HierarchyState, StateStatus};
