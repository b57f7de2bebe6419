//! Shared foundational types used across the weft connectivity engine.
//!
//! Provides interned identifiers for component and signal names, and the
//! error type used where a failure can only mean a bug.

#![warn(missing_docs)]

pub mod ident;
pub mod result;

pub use ident::{Ident, Interner};
pub use result::InternalError;
