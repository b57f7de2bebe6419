//! Signal endpoints and the derivation forest of field/slice views.

use crate::ids::{ComponentId, EndpointId, TypeId};
use weft_common::Ident;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of endpoint variants.
///
/// Every kind except [`Const`](EndpointKind::Const) is a "signal"; the
/// legality rules distinguish the port directions and wires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndpointKind {
    /// Input port: data flows into the declaring component.
    InPort,
    /// Output port: data flows out of the declaring component.
    OutPort,
    /// Internal wire, visible only in the declaring component's scope.
    Wire,
    /// A constant synthesized for a literal connection operand.
    Const,
}

impl EndpointKind {
    /// `true` for ports and wires, `false` for constants.
    pub fn is_signal(self) -> bool {
        !matches!(self, EndpointKind::Const)
    }

    /// Name used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            EndpointKind::InPort => "InPort",
            EndpointKind::OutPort => "OutPort",
            EndpointKind::Wire => "Wire",
            EndpointKind::Const => "Const",
        }
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a derived endpoint views its parent signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum View {
    /// A named field of a struct-typed signal.
    Field(Ident),
    /// Bits `lo..hi` (half-open) of the parent signal.
    Slice {
        /// First bit, inclusive.
        lo: u32,
        /// Last bit, exclusive.
        hi: u32,
    },
}

impl View {
    /// The bit range of a slice view.
    pub fn range(self) -> Option<(u32, u32)> {
        match self {
            View::Slice { lo, hi } => Some((lo, hi)),
            View::Field(_) => None,
        }
    }

    /// `true` if both views are slices whose bit ranges intersect.
    pub fn overlaps(self, other: View) -> bool {
        match (self.range(), other.range()) {
            (Some((a_lo, a_hi)), Some((b_lo, b_hi))) => a_lo < b_hi && b_lo < a_hi,
            _ => false,
        }
    }
}

/// What an endpoint belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    /// A port or wire declared by name in a component's scope.
    Scope {
        /// The declaring component.
        component: ComponentId,
        /// The declared name.
        name: Ident,
    },
    /// A constant hosted by the component whose scope supplies it.
    Literal {
        /// The hosting component.
        component: ComponentId,
        /// The literal value.
        value: i64,
    },
    /// A field or slice view of another endpoint.
    View {
        /// The endpoint being viewed.
        parent: EndpointId,
        /// Which part of it.
        view: View,
    },
}

/// A signal endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    /// Port direction, wire, or constant. Views inherit their parent's kind.
    pub kind: EndpointKind,
    /// The carried type.
    pub ty: TypeId,
    /// The declaring scope, literal host, or viewed parent.
    pub owner: Owner,
}

impl Endpoint {
    /// The endpoint this one is a view of, if any.
    pub fn parent(&self) -> Option<EndpointId> {
        match self.owner {
            Owner::View { parent, .. } => Some(parent),
            Owner::Scope { .. } | Owner::Literal { .. } => None,
        }
    }

    /// The view this endpoint takes of its parent, if any.
    pub fn view(&self) -> Option<View> {
        match self.owner {
            Owner::View { view, .. } => Some(view),
            Owner::Scope { .. } | Owner::Literal { .. } => None,
        }
    }
}
