use super::checked_range;
use crate::error::Result;
use crate::state::HierarchyState;

/// Solves every node of the hierarchy.
pub fn solve_forward(state: &mut HierarchyState) -> Result<()> {
    let num_nodes = state.bound_hierarchy()?.num_nodes();
    solve_forward_partial(state, 0, num_nodes)
}

/// Solves `[first_index, first_index + node_count)` in increasing index order.
///
/// Roots copy their local transform; every other node composes its parent's
/// object-space transform with its own local transform. No renormalization is
/// applied, so drift along deep chains is left as is.
pub fn solve_forward_partial(
    state: &mut HierarchyState,
    first_index: usize,
    node_count: usize,
) -> Result<()> {
    let range = checked_range(state, first_index, node_count)?;
    let hierarchy = state.bound_hierarchy()?;
    log::trace!("forward kinematics over {:?}", range);

    let (local, object) = state.split_buffers();
    for (i, node) in hierarchy.nodes()[range.clone()].iter().enumerate() {
        let i = range.start + i;
        object[i] = match node.parent {
            None => local[i],
            Some(p) => object[p] * local[i],
        };
    }

    state.mark_solved(range.start, range.end);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{InvalidArgument, KinematicsError};
    use crate::hierarchy::Hierarchy;
    use crate::math::Transform;
    use crate::pose::PoseGroup;
    use crate::state::StateStatus;
    use glam::{Mat4, Quat, Vec3};
    use std::sync::Arc;

    fn branching_state() -> HierarchyState {
        let h = Hierarchy::from_parent_indices([
            ("root", -1),
            ("spine", 0),
            ("arm_r", 1),
            ("hand_r", 2),
            ("arm_l", 1),
            ("hand_l", 4),
            ("leg", 0),
        ])
        .unwrap();
        let mut state = HierarchyState::with_group(Arc::new(PoseGroup::new(Arc::new(h), 1)));
        let locals = [
            Transform::new(Vec3::new(0.5, 1.0, -2.0), Quat::from_rotation_y(0.3), Vec3::ONE),
            Transform::from_translation(Vec3::new(0.0, 1.0, 0.0))
                .with_euler_degrees(10.0, 0.0, 25.0),
            Transform::from_translation(Vec3::new(1.0, 0.0, 0.0))
                .with_euler_degrees(0.0, 45.0, 0.0),
            Transform::from_translation(Vec3::new(0.8, 0.0, 0.0)).with_scale(Vec3::splat(1.5)),
            Transform::from_translation(Vec3::new(-1.0, 0.0, 0.0))
                .with_euler_degrees(0.0, -30.0, 5.0),
            Transform::from_translation(Vec3::new(-0.8, 0.0, 0.0)),
            Transform::from_translation(Vec3::new(0.0, -1.0, 0.0))
                .with_euler_degrees(-20.0, 0.0, 0.0),
        ];
        for (slot, t) in state.local_space_mut().iter_mut().zip(locals.iter()) {
            *slot = t.to_matrix();
        }
        state
    }

    #[test]
    fn test_three_node_chain_positions() {
        let h = Hierarchy::from_parent_indices([("root", -1), ("a", 0), ("b", 1)]).unwrap();
        let mut state = HierarchyState::with_group(Arc::new(PoseGroup::new(Arc::new(h), 1)));
        state.set_local(0, Mat4::from_translation(Vec3::ZERO)).unwrap();
        state.set_local(1, Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0))).unwrap();
        state.set_local(2, Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0))).unwrap();

        solve_forward(&mut state).unwrap();

        assert_eq!(state.object_position(0), Some(Vec3::ZERO));
        assert_eq!(state.object_position(1), Some(Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(state.object_position(2), Some(Vec3::new(2.0, 0.0, 0.0)));
        assert_eq!(state.status(), StateStatus::Solved);
    }

    #[test]
    fn test_root_is_copied_exactly() {
        let mut state = branching_state();
        solve_forward(&mut state).unwrap();
        assert_eq!(state.object_space()[0], state.local_space()[0]);
    }

    #[test]
    fn test_parent_composition() {
        let mut state = branching_state();
        solve_forward(&mut state).unwrap();

        let hierarchy = state.hierarchy().unwrap().clone();
        for (i, node) in hierarchy.nodes().iter().enumerate() {
            if let Some(p) = node.parent {
                let expected = state.object_space()[p] * state.local_space()[i];
                assert!(state.object_space()[i].abs_diff_eq(expected, 1e-5), "node {i}");
            }
        }
    }

    #[test]
    fn test_partial_ranges_match_full_solve() {
        let mut full = branching_state();
        solve_forward(&mut full).unwrap();

        let n = full.num_nodes();
        for k in 1..n {
            let mut split = branching_state();
            solve_forward_partial(&mut split, 0, k).unwrap();
            assert_eq!(split.status(), StateStatus::Stale);
            solve_forward_partial(&mut split, k, n - k).unwrap();
            assert_eq!(split.object_space(), full.object_space(), "split at {k}");
            assert_eq!(split.status(), StateStatus::Solved);
        }
    }

    #[test]
    fn test_root_depends_on_parent_sentinel_only() {
        // second root in the middle of the array is not composed with anything
        let h = Hierarchy::from_parent_indices([("a", -1), ("b", 0), ("c", -1), ("d", 2)]).unwrap();
        let mut state = HierarchyState::with_group(Arc::new(PoseGroup::new(Arc::new(h), 1)));
        for slot in state.local_space_mut() {
            *slot = Mat4::from_translation(Vec3::X);
        }
        solve_forward(&mut state).unwrap();
        assert_eq!(state.object_position(2), Some(Vec3::X));
        assert_eq!(state.object_position(3), Some(Vec3::new(2.0, 0.0, 0.0)));

        // node 0 is solved before 1 even when the range starts at 1
        solve_forward_partial(&mut state, 1, 1).unwrap();
        assert_eq!(state.object_position(1), Some(Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_invalid_ranges_leave_object_space_untouched() {
        let mut state = branching_state();
        let n = state.num_nodes();
        let before = state.object_space().to_vec();

        assert_eq!(
            solve_forward_partial(&mut state, n, 1),
            Err(KinematicsError::InvalidArgument(InvalidArgument::FirstIndexOutOfRange {
                first_index: n,
                num_nodes: n
            }))
        );
        assert_eq!(
            solve_forward_partial(&mut state, 0, 0),
            Err(KinematicsError::InvalidArgument(InvalidArgument::EmptyRange))
        );
        assert!(solve_forward_partial(&mut state, 3, n).is_err());
        assert_eq!(state.object_space(), &before[..]);
        assert_eq!(state.status(), StateStatus::Stale);
    }

    #[test]
    fn test_unbound_state() {
        let mut state = HierarchyState::new();
        assert_eq!(
            solve_forward(&mut state),
            Err(KinematicsError::InvalidArgument(InvalidArgument::Unbound))
        );
    }
}
