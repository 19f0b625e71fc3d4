//! Skeleton topology
//!
//! A [`Hierarchy`] is a flat array of named nodes where every node's parent
//! index is strictly smaller than its own. That ordering is validated once at
//! construction so the kinematics passes can walk the array front to back.

use std::collections::HashMap;

use crate::error::{InvalidArgument, Result, TopologyError};

/// Raw parent value marking a root node.
pub const NO_PARENT: i32 = -1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyNode {
    pub name: String,
    pub parent: Option<usize>,
}

impl HierarchyNode {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Parent in the raw `-1` sentinel form.
    pub fn parent_index(&self) -> i32 {
        self.parent.map_or(NO_PARENT, |p| p as i32)
    }
}

#[derive(Debug, Clone)]
pub struct Hierarchy {
    nodes: Vec<HierarchyNode>,
    lookup: HashMap<String, usize>,
}

impl Hierarchy {
    pub fn builder() -> HierarchyBuilder {
        HierarchyBuilder::new()
    }

    /// Builds a hierarchy from `(name, parent)` pairs using `-1` for roots.
    pub fn from_parent_indices<S: Into<String>>(
        nodes: impl IntoIterator<Item = (S, i32)>,
    ) -> Result<Self> {
        let raw: Vec<(String, i64)> = nodes
            .into_iter()
            .map(|(name, parent)| (name.into(), parent as i64))
            .collect();
        Self::validate(raw)
    }

    fn validate(raw: Vec<(String, i64)>) -> Result<Self> {
        if raw.is_empty() {
            return Err(TopologyError::Empty.into());
        }

        let count = raw.len() as i64;
        let mut nodes = Vec::with_capacity(raw.len());
        let mut lookup = HashMap::with_capacity(raw.len());

        for (index, (name, parent)) in raw.into_iter().enumerate() {
            let parent = match parent {
                p if p == NO_PARENT as i64 => None,
                p if p < 0 || p >= count => {
                    return Err(TopologyError::ParentOutOfRange {
                        node: index,
                        parent: p,
                    }
                    .into())
                }
                p if p >= index as i64 => {
                    return Err(TopologyError::ParentOutOfOrder {
                        node: index,
                        parent: p,
                    }
                    .into())
                }
                p => Some(p as usize),
            };

            if lookup.insert(name.clone(), index).is_some() {
                return Err(TopologyError::DuplicateName { name }.into());
            }
            nodes.push(HierarchyNode { name, parent });
        }

        log::debug!("built hierarchy with {} nodes", nodes.len());
        Ok(Self { nodes, lookup })
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[HierarchyNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&HierarchyNode> {
        self.nodes.get(index)
    }

    pub fn parent_of(&self, index: usize) -> Option<usize> {
        self.nodes.get(index).and_then(|n| n.parent)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    /// Like [`Hierarchy::index_of`], reporting a missing name as an error.
    pub fn require(&self, name: &str) -> Result<usize> {
        self.index_of(name).ok_or_else(|| {
            InvalidArgument::UnknownNode {
                name: name.to_string(),
            }
            .into()
        })
    }

    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_root())
            .map(|(i, _)| i)
    }

    /// Direct children of `index`. Children always sit after their parent.
    pub fn children(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .skip(index + 1)
            .filter(move |(_, n)| n.parent == Some(index))
            .map(|(i, _)| i)
    }

    pub fn is_ancestor(&self, ancestor: usize, node: usize) -> bool {
        let mut current = self.parent_of(node);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            // ancestors only get smaller
            if p < ancestor {
                return false;
            }
            current = self.parent_of(p);
        }
        false
    }

    /// Number of edges between `index` and its root; `None` if out of range.
    pub fn depth(&self, index: usize) -> Option<usize> {
        self.nodes.get(index)?;
        let mut depth = 0;
        let mut current = self.parent_of(index);
        while let Some(p) = current {
            depth += 1;
            current = self.parent_of(p);
        }
        Some(depth)
    }
}

pub struct HierarchyBuilder {
    nodes: Vec<(String, i64)>,
}

impl HierarchyBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Appends a node and returns its index, so joints can be chained:
    /// `let spine = builder.add_node("spine", Some(root));`
    pub fn add_node(&mut self, name: impl Into<String>, parent: Option<usize>) -> usize {
        let index = self.nodes.len();
        let parent = parent.map_or(NO_PARENT as i64, |p| i64::try_from(p).unwrap_or(i64::MAX));
        self.nodes.push((name.into(), parent));
        index
    }

    pub fn node(mut self, name: impl Into<String>, parent: Option<usize>) -> Self {
        self.add_node(name, parent);
        self
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn build(self) -> Result<Hierarchy> {
        Hierarchy::validate(self.nodes)
    }
}

impl Default for HierarchyBuilder {
    fn default() -> Self {
        Self::new()
    }
}
