//! The hierarchy model the connectivity engine elaborates.
//!
//! A [`Hierarchy`] is a tree of [`Component`]s. Each component declares
//! typed signal endpoints (input ports, output ports, wires), may synthesize
//! constants for literal connection operands, and records the connections
//! declared in its own scope in a scoped [`Adjacency`]. Struct fields and
//! bit-slices of a signal are separate endpoints linked back to the signal
//! they view, forming a derivation forest that is independent of the
//! component tree.

#![warn(missing_docs)]

pub mod adjacency;
pub mod arena;
pub mod component;
pub mod connect;
pub mod endpoint;
pub mod error;
pub mod hierarchy;
pub mod ids;
pub mod types;

pub use adjacency::Adjacency;
pub use component::{Component, UpdateBlock};
pub use connect::Operand;
pub use endpoint::{Endpoint, EndpointKind, Owner, View};
pub use error::{ConnectError, DeclError};
pub use hierarchy::{Detached, Hierarchy};
pub use ids::{ComponentId, EndpointId, TypeId};
pub use types::{Type, TypeDb};
