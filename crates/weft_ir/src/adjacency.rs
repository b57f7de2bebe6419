//! Symmetric endpoint-to-endpoint connection relation.

use crate::ids::EndpointId;
use std::collections::{BTreeMap, BTreeSet};

/// An undirected graph over endpoints, stored as neighbor sets.
///
/// Every component owns one for the connections declared in its scope;
/// elaboration merges them into a single global graph. Inserting an edge
/// always records both directions, and removing an endpoint removes the
/// reverse edges from its neighbors, so `a ∈ neighbors(b)` iff
/// `b ∈ neighbors(a)` at all times.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Adjacency {
    edges: BTreeMap<EndpointId, BTreeSet<EndpointId>>,
}

impl Adjacency {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the edge `a`-`b`.
    pub fn insert(&mut self, a: EndpointId, b: EndpointId) {
        self.edges.entry(a).or_default().insert(b);
        self.edges.entry(b).or_default().insert(a);
    }

    /// Returns `true` if `ep` has at least one edge.
    pub fn has_edges(&self, ep: EndpointId) -> bool {
        self.edges.get(&ep).is_some_and(|n| !n.is_empty())
    }

    /// Returns `true` if the edge `a`-`b` exists.
    pub fn contains_edge(&self, a: EndpointId, b: EndpointId) -> bool {
        self.edges.get(&a).is_some_and(|n| n.contains(&b))
    }

    /// Iterates over the neighbors of `ep` in ID order.
    pub fn neighbors(&self, ep: EndpointId) -> impl Iterator<Item = EndpointId> + '_ {
        self.edges.get(&ep).into_iter().flatten().copied()
    }

    /// Iterates over endpoints that have at least one edge, in ID order.
    pub fn endpoints(&self) -> impl Iterator<Item = EndpointId> + '_ {
        self.edges
            .iter()
            .filter(|(_, n)| !n.is_empty())
            .map(|(ep, _)| *ep)
    }

    /// Unions `other` into this graph.
    pub fn merge(&mut self, other: &Adjacency) {
        for (ep, neighbors) in &other.edges {
            self.edges
                .entry(*ep)
                .or_default()
                .extend(neighbors.iter().copied());
        }
    }

    /// Deletes `ep` and every edge touching it.
    ///
    /// Returns the neighbors it was connected to.
    pub fn remove_endpoint(&mut self, ep: EndpointId) -> BTreeSet<EndpointId> {
        let neighbors = self.edges.remove(&ep).unwrap_or_default();
        for other in &neighbors {
            if let Some(set) = self.edges.get_mut(other) {
                set.remove(&ep);
            }
        }
        neighbors
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        // Self-loops are rejected at declaration time, so every edge is
        // stored exactly twice.
        self.edges.values().map(BTreeSet::len).sum::<usize>() / 2
    }

    /// Returns `true` if the graph has no edges.
    pub fn is_empty(&self) -> bool {
        self.edges.values().all(BTreeSet::is_empty)
    }
}
