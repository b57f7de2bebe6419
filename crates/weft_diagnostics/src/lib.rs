//! Structured diagnostics for elaboration results.
//!
//! A [`Diagnostic`] carries a severity, a stable [`DiagnosticCode`], the
//! dotted path of the endpoint or component it is about, secondary
//! [`Label`]s for the other parties involved, and free-form notes and help.
//! The [`DiagnosticSink`] accumulates them during a run, and
//! [`DiagnosticRenderer`] implementations turn them into terminal text or JSON.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod label;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use label::{Label, LabelStyle};
pub use renderer::{DiagnosticRenderer, JsonRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
