use super::chain::IkChain;
use crate::error::{KinematicsError, Result};
use crate::kinematics::{decompose, solve_forward, write_local};
use crate::state::HierarchyState;
use glam::{Mat4, Quat, Vec3};
use std::f32::consts::PI;

#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    /// Distance between end effector and target counted as reached.
    pub tolerance: f32,
    pub max_iterations: u32,
    /// Largest rotation a single CCD step may apply, in radians. FABRIK
    /// moves positions rather than rotating joints and ignores it; use
    /// joint constraints to limit its bends.
    pub limit_angle: f32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.001,
            max_iterations: 10,
            limit_angle: PI,
        }
    }
}

impl SolverConfig {
    pub fn new(tolerance: f32) -> Self {
        Self {
            tolerance,
            ..Default::default()
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_limit_angle(mut self, limit_angle: f32) -> Self {
        self.limit_angle = limit_angle;
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SolveResult {
    pub converged: bool,
    pub iterations: u32,
    pub final_distance: f32,
}

/// FABRIK over a hierarchy state.
///
/// Joint positions are taken from a fresh forward solve, moved with forward
/// and backward reaching passes, then turned back into local transforms
/// through [`decompose`]. The state is left solved.
///
/// Reads `tolerance` and `max_iterations` from [`SolverConfig`];
/// `limit_angle` only applies to [`super::CcdSolver`].
pub struct FabrikSolver;

impl FabrikSolver {
    pub fn solve(
        state: &mut HierarchyState,
        chain: &IkChain,
        target: Vec3,
        config: &SolverConfig,
    ) -> Result<SolveResult> {
        let hierarchy = state.bound_hierarchy()?;
        chain.validate(&hierarchy)?;
        solve_forward(state)?;

        let rest: Vec<Vec3> = chain
            .nodes()
            .map(|n| state.object_space()[n].w_axis.truncate())
            .collect();
        let bone_lengths: Vec<f32> = rest.windows(2).map(|w| (w[1] - w[0]).length()).collect();
        let total_length: f32 = bone_lengths.iter().sum();

        let base = rest[0];
        let mut positions = rest.clone();
        let distance_to_target = (target - base).length();

        let iterations = if distance_to_target > total_length {
            log::warn!(
                "target {:?} is {:.3} beyond chain reach",
                target,
                distance_to_target - total_length
            );
            Self::stretch_towards_target(&mut positions, &bone_lengths, base, target);
            1
        } else {
            let mut used = config.max_iterations;
            for iteration in 0..config.max_iterations {
                Self::forward_pass(&mut positions, &bone_lengths, target);
                Self::backward_pass(chain, &mut positions, &rest, &bone_lengths, base);

                let end_effector = positions[positions.len() - 1];
                if (end_effector - target).length() <= config.tolerance {
                    used = iteration + 1;
                    break;
                }
            }
            used
        };

        Self::apply_positions(state, chain, &rest, &positions)?;
        solve_forward(state)?;

        let final_distance = chain
            .end_effector()
            .and_then(|n| state.object_position(n))
            .map_or(f32::MAX, |p| (p - target).length());
        let result = SolveResult {
            converged: final_distance <= config.tolerance,
            iterations,
            final_distance,
        };
        log::debug!("fabrik: {:?}", result);
        Ok(result)
    }

    fn forward_pass(positions: &mut [Vec3], bone_lengths: &[f32], target: Vec3) {
        let n = positions.len();

        positions[n - 1] = target;

        for i in (0..n - 1).rev() {
            let next_pos = positions[i + 1];
            let dir = positions[i] - next_pos;
            let len = dir.length();

            let direction = if len > 0.0001 { dir / len } else { Vec3::Y };

            positions[i] = next_pos + direction * bone_lengths[i];
        }
    }

    fn backward_pass(
        chain: &IkChain,
        positions: &mut [Vec3],
        rest: &[Vec3],
        bone_lengths: &[f32],
        base: Vec3,
    ) {
        positions[0] = base;

        for i in 1..positions.len() {
            let prev_pos = positions[i - 1];
            let reference = if i >= 2 {
                prev_pos - positions[i - 2]
            } else {
                rest[1] - rest[0]
            };

            let direction =
                chain.joints[i - 1].apply_constraint(positions[i] - prev_pos, reference);
            positions[i] = prev_pos + direction * bone_lengths[i - 1];
        }
    }

    fn stretch_towards_target(positions: &mut [Vec3], bone_lengths: &[f32], base: Vec3, target: Vec3) {
        let direction = (target - base).normalize_or_zero();

        if direction.length_squared() < 0.0001 {
            return;
        }

        positions[0] = base;

        for i in 1..positions.len() {
            positions[i] = positions[i - 1] + direction * bone_lengths[i - 1];
        }
    }

    /// Rotates every segment from its rest direction onto the solved one and
    /// writes the resulting local transforms. The end effector keeps its local
    /// transform and follows its parent.
    fn apply_positions(
        state: &mut HierarchyState,
        chain: &IkChain,
        rest: &[Vec3],
        positions: &[Vec3],
    ) -> Result<()> {
        let hierarchy = state.bound_hierarchy()?;
        let joints = &chain.joints[..chain.joints.len() - 1];

        let frames: Vec<Mat4> = joints
            .iter()
            .enumerate()
            .map(|(j, joint)| {
                let from = (rest[j + 1] - rest[j]).normalize_or_zero();
                let to = (positions[j + 1] - positions[j]).normalize_or_zero();
                let rotation = if from == Vec3::ZERO || to == Vec3::ZERO {
                    Quat::IDENTITY
                } else {
                    Quat::from_rotation_arc(from, to)
                };
                Mat4::from_translation(positions[j])
                    * Mat4::from_quat(rotation)
                    * Mat4::from_translation(-rest[j])
                    * state.object_space()[joint.node]
            })
            .collect();

        // children are placed under the frame their parent actually reaches
        let mut locals = Vec::with_capacity(frames.len());
        let mut reached: Vec<Mat4> = Vec::with_capacity(frames.len());
        for (j, joint) in joints.iter().enumerate() {
            let parent_frame = if j == 0 {
                hierarchy
                    .parent_of(joint.node)
                    .map(|p| (p, state.object_space()[p]))
            } else {
                Some((joints[j - 1].node, reached[j - 1]))
            };
            let mut local = state.local_space()[joint.node];
            let flags = state.node_flags(joint.node);
            let frame = match parent_frame {
                None => {
                    write_local(&mut local, frames[j], flags);
                    local
                }
                Some((p, frame)) => {
                    let next = decompose(frames[j], frame).ok_or(
                        KinematicsError::SingularParentTransform {
                            node: joint.node,
                            parent: p,
                        },
                    )?;
                    write_local(&mut local, next, flags);
                    frame * local
                }
            };
            locals.push(local);
            reached.push(frame);
        }

        for (joint, local) in joints.iter().zip(locals) {
            *state.local_at_mut(joint.node) = local;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::Hierarchy;
    use crate::ik::BallSocketConstraint;
    use crate::pose::{PoseFlags, PoseGroup};
    use std::sync::Arc;

    /// Straight arm along +X: base at the origin, three unit segments.
    fn arm_state(flags: Option<PoseFlags>) -> (HierarchyState, IkChain) {
        let h = Hierarchy::from_parent_indices([
            ("root", -1),
            ("shoulder", 0),
            ("elbow", 1),
            ("wrist", 2),
            ("hand", 3),
        ])
        .unwrap();
        let h = Arc::new(h);
        let chain = IkChain::from_end_node(&h, 4, 4).unwrap();
        let mut group = PoseGroup::new(h, 1);
        if let Some(f) = flags {
            group.set_flags(2, f).unwrap();
        }

        let mut state = HierarchyState::with_group(Arc::new(group));
        for i in 2..5 {
            state
                .set_local(i, Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)))
                .unwrap();
        }
        (state, chain)
    }

    #[test]
    fn test_reachable_target() {
        let (mut state, chain) = arm_state(None);
        let target = Vec3::new(1.5, 1.5, 0.0);
        let config = SolverConfig::new(0.001).with_max_iterations(50);

        let result = FabrikSolver::solve(&mut state, &chain, target, &config).unwrap();

        assert!(result.converged, "{:?}", result);
        assert!(state.is_solved());
        assert!(state.object_position(4).unwrap().abs_diff_eq(target, 0.01));
        assert!(state.object_position(1).unwrap().abs_diff_eq(Vec3::ZERO, 1e-5));
    }

    #[test]
    fn test_bone_lengths_preserved() {
        let (mut state, chain) = arm_state(None);
        FabrikSolver::solve(&mut state, &chain, Vec3::new(0.5, 2.0, 1.0), &SolverConfig::default())
            .unwrap();

        let nodes: Vec<usize> = chain.nodes().collect();
        for pair in nodes.windows(2) {
            let a = state.object_position(pair[0]).unwrap();
            let b = state.object_position(pair[1]).unwrap();
            assert!(((b - a).length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_unreachable_target_stretches() {
        let (mut state, chain) = arm_state(None);
        let target = Vec3::new(0.0, 10.0, 0.0);

        let result = FabrikSolver::solve(&mut state, &chain, target, &SolverConfig::default()).unwrap();

        assert!(!result.converged);
        assert_eq!(result.iterations, 1);
        assert!((result.final_distance - 7.0).abs() < 1e-4);
        assert!(state
            .object_position(4)
            .unwrap()
            .abs_diff_eq(Vec3::new(0.0, 3.0, 0.0), 1e-4));
    }

    #[test]
    fn test_constraint_limits_bend() {
        let h = Hierarchy::from_parent_indices([("root", -1), ("a", 0), ("b", 1), ("c", 2)]).unwrap();
        let h = Arc::new(h);
        let chain = IkChain::builder()
            .add_joint_with_constraint(1, BallSocketConstraint::new(20.0))
            .add_joint_with_constraint(2, BallSocketConstraint::new(20.0))
            .add_joint(3)
            .build();
        let mut state = HierarchyState::with_group(Arc::new(PoseGroup::new(h, 1)));
        for i in 2..4 {
            state.set_local(i, Mat4::from_translation(Vec3::X)).unwrap();
        }

        FabrikSolver::solve(&mut state, &chain, Vec3::new(0.0, 1.5, 0.0), &SolverConfig::default())
            .unwrap();

        let a = state.object_position(1).unwrap();
        let b = state.object_position(2).unwrap();
        let c = state.object_position(3).unwrap();
        assert!((b - a).angle_between(Vec3::X) <= 20f32.to_radians() + 1e-3);
        assert!((c - b).angle_between(b - a) <= 20f32.to_radians() + 1e-3);
    }

    #[test]
    fn test_locked_joint_keeps_local() {
        let (mut state, chain) = arm_state(Some(PoseFlags::empty()));
        let before = state.local_space()[2];

        FabrikSolver::solve(&mut state, &chain, Vec3::new(1.0, 1.0, 0.0), &SolverConfig::default())
            .unwrap();

        assert!(state.local_space()[2].abs_diff_eq(before, 1e-5));
        assert!(state.is_solved());
    }

    #[test]
    fn test_free_joint_follows_rotation_locked_parent() {
        let (mut state, chain) = arm_state(Some(PoseFlags::TRANSLATE));
        let target = Vec3::new(1.5, 1.5, 0.0);
        let config = SolverConfig::new(0.001).with_max_iterations(50);

        FabrikSolver::solve(&mut state, &chain, target, &config).unwrap();

        // the elbow keeps its rest rotation, the wrist below it still lands
        // where the passes put it
        assert!(state.local_space()[2].abs_diff_eq(Mat4::from_translation(Vec3::X), 1e-3));
        assert!(state.object_position(4).unwrap().abs_diff_eq(target, 0.01));
    }

    #[test]
    fn test_limit_angle_does_not_change_fabrik() {
        let target = Vec3::new(0.5, 2.0, 1.0);
        let (mut wide, chain) = arm_state(None);
        let (mut narrow, _) = arm_state(None);

        let a = FabrikSolver::solve(&mut wide, &chain, target, &SolverConfig::default()).unwrap();
        let config = SolverConfig::default().with_limit_angle(0.01);
        let b = FabrikSolver::solve(&mut narrow, &chain, target, &config).unwrap();

        assert_eq!(a.iterations, b.iterations);
        assert_eq!(wide.local_space(), narrow.local_space());
    }

    #[test]
    fn test_broken_chain_rejected_before_solving() {
        let (mut state, _) = arm_state(None);
        let chain = IkChain::builder().add_joint(1).add_joint(3).build();
        let result = FabrikSolver::solve(&mut state, &chain, Vec3::Y, &SolverConfig::default());
        assert!(matches!(result, Err(KinematicsError::InvalidArgument(_))));
    }
}
