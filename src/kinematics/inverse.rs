use glam::{EulerRot, Mat4, Quat};

use super::checked_range;
use crate::error::{InvalidArgument, KinematicsError, Result};
use crate::math::{is_invertible, Transform};
use crate::pose::{select_axes, PoseFlags};
use crate::state::HierarchyState;

/// Local transform that places a node at `object` under a parent at
/// `parent_object`. `None` if the parent transform cannot be inverted.
pub fn decompose(object: Mat4, parent_object: Mat4) -> Option<Mat4> {
    is_invertible(&parent_object).then(|| parent_object.inverse() * object)
}

/// Recovers local transforms for every node from the state's target buffer.
pub fn solve_inverse(state: &mut HierarchyState) -> Result<()> {
    let num_nodes = state.bound_hierarchy()?.num_nodes();
    solve_inverse_partial(state, 0, num_nodes)
}

/// Recovers local transforms for `[first_index, first_index + node_count)`.
///
/// A parent inside the range contributes the frame its own new local
/// transform actually reaches, a parent before the range its current
/// object-space transform, so a forward solve over the same range reproduces
/// the targets of every node whose channels allow it. Channels missing from a
/// node's [`PoseFlags`] keep their previous local values.
pub fn solve_inverse_partial(
    state: &mut HierarchyState,
    first_index: usize,
    node_count: usize,
) -> Result<()> {
    let range = checked_range(state, first_index, node_count)?;
    let group = state.group().cloned().ok_or(InvalidArgument::Unbound)?;
    let hierarchy = group.hierarchy();
    log::trace!("inverse kinematics over {:?}", range);

    // nothing is written until every node in the range has a local
    let mut locals = Vec::with_capacity(range.len());
    let mut reached: Vec<Mat4> = Vec::with_capacity(range.len());
    for i in range.clone() {
        let mut local = state.local_space()[i];
        let target = state.object_target()[i];
        let frame = match hierarchy.nodes()[i].parent {
            None => {
                write_local(&mut local, target, group.node_flags(i));
                local
            }
            Some(p) => {
                let parent = if range.contains(&p) {
                    reached[p - range.start]
                } else {
                    state.object_space()[p]
                };
                let next = decompose(target, parent)
                    .ok_or(KinematicsError::SingularParentTransform { node: i, parent: p })?;
                write_local(&mut local, next, group.node_flags(i));
                parent * local
            }
        };
        locals.push(local);
        reached.push(frame);
    }

    state.write_locals(range.start, &locals);
    Ok(())
}

/// Stores `next` into `slot`, restricted to the channels in `flags`.
pub(crate) fn write_local(slot: &mut Mat4, next: Mat4, flags: PoseFlags) {
    if flags == PoseFlags::all() {
        *slot = next;
        return;
    }

    let prev = Transform::from_matrix(*slot);
    let wanted = Transform::from_matrix(next);

    let rotation = match flags.rotation_mask() {
        [true, true, true] => wanted.rotation,
        [false, false, false] => prev.rotation,
        mask => {
            let e = select_axes(mask, wanted.euler_angles(), prev.euler_angles());
            Quat::from_euler(EulerRot::XYZ, e.x, e.y, e.z)
        }
    };

    *slot = Transform::new(
        select_axes(flags.translation_mask(), wanted.translation, prev.translation),
        rotation,
        select_axes(flags.scale_mask(), wanted.scale, prev.scale),
    )
    .to_matrix();
}
