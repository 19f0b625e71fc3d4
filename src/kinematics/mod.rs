//! Forward and inverse kinematics over a [`HierarchyState`]
//!
//! Both directions work on a contiguous node range and share one precondition
//! contract: a bound hierarchy, `first_index < num_nodes`, a positive
//! `node_count`, and a range that ends inside the hierarchy. Preconditions are
//! checked before anything is written.
//!
//! Partial forward solves assume every ancestor of `first_index` is already
//! current. That is the caller's responsibility and is not verified here.

mod forward;
mod inverse;

pub use forward::{solve_forward, solve_forward_partial};
pub use inverse::{decompose, solve_inverse, solve_inverse_partial};

pub(crate) use inverse::write_local;

use std::ops::Range;

use crate::error::{InvalidArgument, Result};
use crate::state::HierarchyState;

fn checked_range(state: &HierarchyState, first_index: usize, node_count: usize) -> Result<Range<usize>> {
    let num_nodes = state.bound_hierarchy()?.num_nodes();
    if first_index >= num_nodes {
        return Err(InvalidArgument::FirstIndexOutOfRange {
            first_index,
            num_nodes,
        }
        .into());
    }
    if node_count == 0 {
        return Err(InvalidArgument::EmptyRange.into());
    }
    match first_index.checked_add(node_count) {
        Some(end) if end <= num_nodes => Ok(first_index..end),
        _ => Err(InvalidArgument::RangeOverflow {
            first_index,
            node_count,
            num_nodes,
        }
        .into()),
    }
}
