//! Mutable elaboration state for one hierarchy root.
//!
//! [`ElaborationContext`] holds everything the passes share: which
//! components and endpoints are part of the design, the global adjacency
//! merged from every component's scoped connections, and the current net
//! list. It is owned by the [`Elaborator`](crate::Elaborator) and handed to
//! each pass by reference, so two hierarchies never share state.

use std::collections::BTreeSet;

use weft_ir::{Adjacency, ComponentId, EndpointId, Hierarchy};

use crate::nets::Net;

/// State built by elaboration and kept current by incremental mutations.
#[derive(Debug, Clone)]
pub struct ElaborationContext {
    /// The component elaboration started from.
    pub top: ComponentId,
    /// Every attached component under `top`, `top` included.
    pub components: BTreeSet<ComponentId>,
    /// Every endpoint declared in or derived from those components.
    pub endpoints: BTreeSet<EndpointId>,
    /// The union of all scoped adjacencies.
    pub adjacency: Adjacency,
    /// Resolved nets, in discovery order.
    pub nets: Vec<Net>,
}

impl ElaborationContext {
    /// Collects the sub-hierarchy rooted at `top` and merges its scoped
    /// connections into one graph. No nets are extracted yet.
    pub fn collect(hier: &Hierarchy, top: ComponentId) -> Self {
        let mut ctx = Self {
            top,
            components: BTreeSet::new(),
            endpoints: BTreeSet::new(),
            adjacency: Adjacency::new(),
            nets: Vec::new(),
        };
        ctx.register(hier, top);
        tracing::debug!(
            components = ctx.components.len(),
            endpoints = ctx.endpoints.len(),
            edges = ctx.adjacency.edge_count(),
            "collected hierarchy"
        );
        ctx
    }

    /// Adds the sub-hierarchy rooted at `root` to the bookkeeping and merges
    /// its scoped connections.
    ///
    /// Returns the endpoints that were not known before.
    pub fn register(&mut self, hier: &Hierarchy, root: ComponentId) -> BTreeSet<EndpointId> {
        for c in hier.subtree_components(root) {
            self.components.insert(c);
            self.adjacency.merge(&hier.component(c).adjacency);
        }
        hier.subtree_endpoints(root)
            .into_iter()
            .filter(|&ep| self.endpoints.insert(ep))
            .collect()
    }

    /// Picks up endpoints created after collection, such as constants for
    /// literal operands or views requested late.
    pub fn refresh_endpoints(&mut self, hier: &Hierarchy) -> BTreeSet<EndpointId> {
        hier.subtree_endpoints(self.top)
            .into_iter()
            .filter(|&ep| self.endpoints.insert(ep))
            .collect()
    }

    /// The union of the scoped adjacencies of every attached component
    /// under `top`, wherever their connections point.
    pub fn scoped_adjacency(hier: &Hierarchy, top: ComponentId) -> Adjacency {
        let mut adjacency = Adjacency::new();
        for c in hier.subtree_components(top) {
            adjacency.merge(&hier.component(c).adjacency);
        }
        adjacency
    }

    /// Every endpoint currently in some net.
    pub fn netted(&self) -> BTreeSet<EndpointId> {
        self.nets.iter().flat_map(|n| n.members.iter().copied()).collect()
    }
}
