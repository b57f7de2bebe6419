//! Components: the nodes of the hierarchy.

use crate::adjacency::Adjacency;
use crate::ids::{ComponentId, EndpointId};
use weft_common::Ident;

/// A behavioral block and the endpoints it writes.
///
/// Only the write set matters to elaboration; how the block computes the
/// values is someone else's concern.
#[derive(Debug, Clone)]
pub struct UpdateBlock {
    /// The block name, unique within its component.
    pub name: Ident,
    /// Endpoints the block assigns.
    pub writes: Vec<EndpointId>,
}

/// A node of the component tree.
#[derive(Debug, Clone)]
pub struct Component {
    /// Name within the parent's scope.
    pub name: Ident,
    /// The enclosing component; `None` only for the root.
    pub parent: Option<ComponentId>,
    /// Child components in declaration order.
    pub children: Vec<ComponentId>,
    /// Ports, wires and constants declared in this scope.
    pub endpoints: Vec<EndpointId>,
    /// Behavioral blocks declared in this scope.
    pub blocks: Vec<UpdateBlock>,
    /// Connections declared in this scope.
    pub adjacency: Adjacency,
    /// Cleared when the component's sub-hierarchy is removed.
    pub attached: bool,
}

impl Component {
    pub(crate) fn new(name: Ident, parent: Option<ComponentId>) -> Self {
        Self {
            name,
            parent,
            children: Vec::new(),
            endpoints: Vec::new(),
            blocks: Vec::new(),
            adjacency: Adjacency::new(),
            attached: true,
        }
    }

    /// Iterates over every endpoint written by this component's blocks.
    pub fn written(&self) -> impl Iterator<Item = EndpointId> + '_ {
        self.blocks.iter().flat_map(|b| b.writes.iter().copied())
    }
}
