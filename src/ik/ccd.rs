use super::chain::IkChain;
use super::solver::{SolveResult, SolverConfig};
use crate::error::{KinematicsError, Result};
use crate::kinematics::{decompose, solve_forward, solve_forward_partial, write_local};
use crate::state::HierarchyState;
use glam::{Mat4, Quat, Vec3};

/// Cyclic coordinate descent over a hierarchy state.
///
/// Visits joints from the one nearest the end effector back to the chain
/// root, turning each so the end effector swings toward the target. Every
/// step is written as a local transform and the affected tail of the
/// hierarchy is re-solved before the next joint is visited.
pub struct CcdSolver;

impl CcdSolver {
    pub fn solve(
        state: &mut HierarchyState,
        chain: &IkChain,
        target: Vec3,
        config: &SolverConfig,
    ) -> Result<SolveResult> {
        let hierarchy = state.bound_hierarchy()?;
        chain.validate(&hierarchy)?;
        solve_forward(state)?;

        let num_nodes = hierarchy.num_nodes();
        let joints = chain.joints();
        let end = joints[joints.len() - 1].node;
        let rest_direction = position(state, joints[1].node) - position(state, joints[0].node);

        let mut distance = (position(state, end) - target).length();
        let mut iterations = 0;

        while distance > config.tolerance && iterations < config.max_iterations {
            iterations += 1;

            for k in (0..joints.len() - 1).rev() {
                let node = joints[k].node;
                let joint_pos = position(state, node);
                let to_end = (position(state, end) - joint_pos).normalize_or_zero();
                let to_target = (target - joint_pos).normalize_or_zero();
                if to_end == Vec3::ZERO || to_target == Vec3::ZERO {
                    continue;
                }

                let angle = to_end.angle_between(to_target).min(config.limit_angle);
                let axis = to_end.cross(to_target);
                if angle < 1e-5 || axis.length_squared() < 1e-10 {
                    continue;
                }
                let mut rotation = Quat::from_axis_angle(axis.normalize(), angle);

                if joints[k].constraint.is_some() {
                    let segment = position(state, joints[k + 1].node) - joint_pos;
                    let reference = if k == 0 {
                        rest_direction
                    } else {
                        joint_pos - position(state, joints[k - 1].node)
                    };
                    let limited = joints[k].apply_constraint(rotation * segment, reference);
                    rotation = Quat::from_rotation_arc(segment.normalize_or_zero(), limited);
                }

                let frame = Mat4::from_translation(joint_pos)
                    * Mat4::from_quat(rotation)
                    * Mat4::from_translation(-joint_pos)
                    * state.object_space()[node];
                let local = match hierarchy.parent_of(node) {
                    None => frame,
                    Some(p) => decompose(frame, state.object_space()[p])
                        .ok_or(KinematicsError::SingularParentTransform { node, parent: p })?,
                };

                let flags = state.node_flags(node);
                write_local(state.local_at_mut(node), local, flags);
                // descendants all sit after `node`, and everything before it is current
                solve_forward_partial(state, node, num_nodes - node)?;
            }

            distance = (position(state, end) - target).length();
        }

        let result = SolveResult {
            converged: distance <= config.tolerance,
            iterations,
            final_distance: distance,
        };
        log::debug!("ccd: {:?}", result);
        Ok(result)
    }
}

fn position(state: &HierarchyState, node: usize) -> Vec3 {
    state.object_space()[node].w_axis.truncate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::Hierarchy;
    use crate::ik::BallSocketConstraint;
    use crate::pose::PoseGroup;
    use std::f32::consts::FRAC_PI_4;
    use std::sync::Arc;

    fn arm_state() -> (HierarchyState, IkChain) {
        let h = Arc::new(
            Hierarchy::from_parent_indices([("root", -1), ("shoulder", 0), ("elbow", 1), ("hand", 2)])
                .unwrap(),
        );
        let chain = IkChain::from_end_node(&h, 3, 3).unwrap();
        let mut state = HierarchyState::with_group(Arc::new(PoseGroup::new(h, 1)));
        state
            .set_local(0, Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0)))
            .unwrap();
        for i in 2..4 {
            state.set_local(i, Mat4::from_translation(Vec3::X)).unwrap();
        }
        (state, chain)
    }

    #[test]
    fn test_reaches_target() {
        let (mut state, chain) = arm_state();
        let target = Vec3::new(1.0, 2.2, 0.5);
        let config = SolverConfig::new(0.001).with_max_iterations(100);

        let result = CcdSolver::solve(&mut state, &chain, target, &config).unwrap();

        assert!(result.converged, "{:?}", result);
        assert!(state.object_position(3).unwrap().abs_diff_eq(target, 0.002));
        assert!(state.is_solved());
        // the base joint does not move
        assert!(state
            .object_position(1)
            .unwrap()
            .abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-5));
    }

    #[test]
    fn test_already_at_target() {
        let (mut state, chain) = arm_state();
        let target = Vec3::new(2.0, 1.0, 0.0);
        let before = state.local_space().to_vec();

        let result = CcdSolver::solve(&mut state, &chain, target, &SolverConfig::default()).unwrap();

        assert!(result.converged);
        assert_eq!(result.iterations, 0);
        assert_eq!(state.local_space(), &before[..]);
    }

    #[test]
    fn test_unreachable_points_at_target() {
        let (mut state, chain) = arm_state();
        let target = Vec3::new(0.0, 11.0, 0.0);
        let config = SolverConfig::default().with_max_iterations(20);

        let result = CcdSolver::solve(&mut state, &chain, target, &config).unwrap();

        assert!(!result.converged);
        assert!((result.final_distance - 8.0).abs() < 0.01);
    }

    #[test]
    fn test_limit_angle_bounds_each_step() {
        let (mut state, chain) = arm_state();
        let config = SolverConfig::default()
            .with_max_iterations(1)
            .with_limit_angle(FRAC_PI_4 / 10.0);

        let result = CcdSolver::solve(&mut state, &chain, Vec3::new(-1.0, 2.0, 0.0), &config).unwrap();

        assert!(!result.converged);
        assert_eq!(result.iterations, 1);
        let elbow = state.object_position(2).unwrap() - Vec3::new(0.0, 1.0, 0.0);
        assert!(elbow.angle_between(Vec3::X) <= FRAC_PI_4 / 10.0 + 1e-4);
    }

    #[test]
    fn test_constraint_respected() {
        let h = Arc::new(
            Hierarchy::from_parent_indices([("root", -1), ("a", 0), ("b", 1), ("c", 2)]).unwrap(),
        );
        let chain = IkChain::builder()
            .add_joint_with_constraint(1, BallSocketConstraint::new(30.0))
            .add_joint(2)
            .add_joint(3)
            .build();
        let mut state = HierarchyState::with_group(Arc::new(PoseGroup::new(h, 1)));
        for i in 2..4 {
            state.set_local(i, Mat4::from_translation(Vec3::X)).unwrap();
        }

        CcdSolver::solve(&mut state, &chain, Vec3::new(-1.0, 1.0, 0.0), &SolverConfig::default())
            .unwrap();

        let segment = state.object_position(2).unwrap() - state.object_position(1).unwrap();
        assert!(segment.angle_between(Vec3::X) <= 30f32.to_radians() + 1e-3);
    }
}
