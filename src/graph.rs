/*
 * gnomon
 * Copyright (C) 2026 Gnomon contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! The mapped graph (C4): a rooted tree over an integer key space, with a name-to-key alias
//! table and path queries between any two nodes via their lowest common ancestor.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::errors::GraphError;
use crate::NodeId;

/// Caps ancestor-chain walks; a real tree never nears this, so hitting it means a cycle slipped
/// into the graph (impossible through this module's own API, but cheap to guard against).
const MAX_DEPTH: usize = 64;

/// Which way an edge is traversed when walking a path: toward the root (inverse of the child's
/// own producer) or away from it (the child's producer applied directly).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// One hop of a `get_path` result: the child-side node of the edge, and which way it is crossed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PathStep {
    pub node: NodeId,
    pub direction: Direction,
}

/// A rooted tree keyed by [`NodeId`], storing an arbitrary payload per node (the axes or point
/// node record). Uses a `HashMap` arena rather than owning pointers, so parent links are plain
/// IDs and the tree can be built incrementally in any order permitted by the graph invariants.
pub struct MappedGraph<P> {
    payloads: HashMap<NodeId, P>,
    parents: HashMap<NodeId, NodeId>,
    names: HashMap<&'static str, NodeId>,
    root: Option<NodeId>,
}

impl<P> Default for MappedGraph<P> {
    fn default() -> Self {
        MappedGraph {
            payloads: HashMap::new(),
            parents: HashMap::new(),
            names: HashMap::new(),
            root: None,
        }
    }
}

impl<P> MappedGraph<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_vertex(&self, id: NodeId) -> bool {
        self.payloads.contains_key(&id)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Registers a node. `parent` is `None` for the graph's unique root (its own parent link is
    /// implicitly itself); `Some` otherwise, and the parent must already exist.
    pub fn add_vertex(&mut self, id: NodeId, name: &'static str, parent: Option<NodeId>, payload: P) -> Result<(), GraphError> {
        if self.has_vertex(id) {
            return Err(GraphError::DuplicateId { id });
        }
        if self.names.contains_key(name) {
            return Err(GraphError::DuplicateName { name });
        }
        if let Some(p) = parent {
            if !self.has_vertex(p) {
                return Err(GraphError::UnknownNode { id: p });
            }
        }
        debug!(target: "gnomon::graph", "registering node {id} ({name}) parent={parent:?}");
        self.payloads.insert(id, payload);
        self.parents.insert(id, parent.unwrap_or(id));
        self.names.insert(name, id);
        if parent.is_none() {
            self.root = Some(id);
        }
        Ok(())
    }

    /// Explicitly links an already-registered child to an already-registered parent. Provided
    /// for symmetry with the distilled design's separate `add_edge` operation; `add_vertex`
    /// already takes the parent inline, which is the path every node class registration uses.
    pub fn add_edge(&mut self, parent: NodeId, child: NodeId) -> Result<(), GraphError> {
        if !self.has_vertex(parent) {
            return Err(GraphError::UnknownNode { id: parent });
        }
        if !self.has_vertex(child) {
            return Err(GraphError::UnknownNode { id: child });
        }
        self.parents.insert(child, parent);
        Ok(())
    }

    pub fn get(&self, id: NodeId) -> Result<&P, GraphError> {
        self.payloads.get(&id).ok_or(GraphError::UnknownNode { id })
    }

    pub fn get_mut(&mut self, id: NodeId) -> Result<&mut P, GraphError> {
        self.payloads.get_mut(&id).ok_or(GraphError::UnknownNode { id })
    }

    /// Looks a node up by its registered name. On miss, `GraphError::UnknownNode` carries
    /// `NodeId::MIN` as a sentinel, since name lookups have no numeric id to report.
    pub fn id_by_name(&self, name: &str) -> Result<NodeId, GraphError> {
        self.names
            .get(name)
            .copied()
            .ok_or(GraphError::UnknownNode { id: NodeId::MIN })
    }

    pub fn parent_of(&self, id: NodeId) -> Result<NodeId, GraphError> {
        self.parents.get(&id).copied().ok_or(GraphError::UnknownNode { id })
    }

    /// `[id, parent(id), parent(parent(id)), ..., root]`.
    fn ancestors(&self, id: NodeId) -> Result<Vec<NodeId>, GraphError> {
        if !self.has_vertex(id) {
            return Err(GraphError::UnknownNode { id });
        }
        let mut chain = vec![id];
        let mut cur = id;
        loop {
            let parent = self.parent_of(cur)?;
            if parent == cur {
                break;
            }
            chain.push(parent);
            cur = parent;
            if chain.len() > MAX_DEPTH {
                return Err(GraphError::MaxDepthExceeded {
                    from: id,
                    to: parent,
                    max_depth: MAX_DEPTH,
                });
            }
        }
        Ok(chain)
    }

    /// The ordered path from `from` to `to`: all hops rising from `from` to their lowest common
    /// ancestor, then all hops descending from the ancestor to `to`.
    pub fn get_path(&self, from: NodeId, to: NodeId) -> Result<Vec<PathStep>, GraphError> {
        if from == to {
            return Ok(Vec::new());
        }
        let up_chain = self.ancestors(from)?;
        let down_chain = self.ancestors(to)?;

        let up_set: HashSet<NodeId> = up_chain.iter().copied().collect();
        let lca = down_chain
            .iter()
            .copied()
            .find(|n| up_set.contains(n))
            .ok_or(GraphError::Disjoint { from, to })?;

        let mut steps = Vec::new();
        for &node in &up_chain {
            if node == lca {
                break;
            }
            steps.push(PathStep { node, direction: Direction::Up });
        }
        let mut down_steps = Vec::new();
        for &node in &down_chain {
            if node == lca {
                break;
            }
            down_steps.push(PathStep { node, direction: Direction::Down });
        }
        down_steps.reverse();
        steps.extend(down_steps);
        Ok(steps)
    }
}
