//! Elaboration errors and their diagnostic codes.
//!
//! Error codes `E300`--`E309` cover connectivity elaboration: malformed
//! connections, loops, writer conflicts, writer-less nets, illegal port
//! directions, and misuse of the elaborator's lifecycle.

use std::fmt;

use weft_common::InternalError;
use weft_diagnostics::{Category, Diagnostic, DiagnosticCode, Label};
use weft_ir::{ConnectError, DeclError};

/// Malformed connection request.
pub const E300: DiagnosticCode = DiagnosticCode::new(Category::Error, 300);

/// Connections form a loop of three or more endpoints.
pub const E301: DiagnosticCode = DiagnosticCode::new(Category::Error, 301);

/// More than one writer reaches a net.
pub const E302: DiagnosticCode = DiagnosticCode::new(Category::Error, 302);

/// One or more nets have no writer.
pub const E303: DiagnosticCode = DiagnosticCode::new(Category::Error, 303);

/// An edge violates the port direction rules.
pub const E304: DiagnosticCode = DiagnosticCode::new(Category::Error, 304);

/// Nets were queried before elaboration.
pub const E305: DiagnosticCode = DiagnosticCode::new(Category::Error, 305);

/// A declaration-time operation was used after elaboration.
pub const E306: DiagnosticCode = DiagnosticCode::new(Category::Error, 306);

/// A mutation named a component that does not exist.
pub const E307: DiagnosticCode = DiagnosticCode::new(Category::Error, 307);

/// Malformed component or signal declaration.
pub const E308: DiagnosticCode = DiagnosticCode::new(Category::Error, 308);

/// Broken engine invariant.
pub const E309: DiagnosticCode = DiagnosticCode::new(Category::Error, 309);

/// Which of the five port legality rules an edge broke.
///
/// The rule is picked by where the reader's host sits relative to the
/// writer's host; see [`crate::legality`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegalityRule {
    /// Both endpoints live in the same component.
    SameScope,
    /// The writer sits in a child of the reader's component.
    DeeperDriver,
    /// The reader sits in a child of the writer's component.
    ShallowerDriver,
    /// The two components are siblings.
    SiblingDriver,
    /// The components are further apart than any of the above.
    TooDistant,
}

impl LegalityRule {
    /// Rule number, 1 through 5.
    pub fn number(self) -> u8 {
        match self {
            LegalityRule::SameScope => 1,
            LegalityRule::DeeperDriver => 2,
            LegalityRule::ShallowerDriver => 3,
            LegalityRule::SiblingDriver => 4,
            LegalityRule::TooDistant => 5,
        }
    }

    /// Short description of the relationship between the two hosts.
    pub fn describe(self) -> &'static str {
        match self {
            LegalityRule::SameScope => "driver and drivee share a host component",
            LegalityRule::DeeperDriver => "the driver lies deeper than the drivee",
            LegalityRule::ShallowerDriver => "the driver lies shallower than the drivee",
            LegalityRule::SiblingDriver => "the driver is a sibling of the drivee",
            LegalityRule::TooDistant => "the host components are too far apart in the hierarchy",
        }
    }

    /// The general pattern that was broken.
    pub fn hint(self) -> &'static str {
        match self {
            LegalityRule::SameScope => "within one component only an OutPort or a Wire can be driven, e.g. InPort x.y cannot be driven by x.z",
            LegalityRule::DeeperDriver => "data leaves a child only through its OutPorts, into an OutPort or Wire of the parent, e.g. InPort x.y cannot be driven by x.z.a",
            LegalityRule::ShallowerDriver => "data enters a child only through its InPorts, e.g. OutPort/Wire x.y.z cannot be driven by x.a",
            LegalityRule::SiblingDriver => "between siblings an OutPort must drive an InPort, e.g. OutPort/Wire x.y.z cannot be driven by x.a.b",
            LegalityRule::TooDistant => "connect through the ports of the intermediate components instead",
        }
    }
}

impl fmt::Display for LegalityRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule {}: {}", self.number(), self.describe())
    }
}

/// Everything that can go wrong while elaborating or mutating a hierarchy.
///
/// Payloads carry rendered paths rather than IDs, so an error stays
/// readable after the hierarchy it came from has changed.
#[derive(Debug, thiserror::Error)]
pub enum ElabError {
    /// A component or signal declaration was rejected.
    #[error(transparent)]
    Declaration(#[from] DeclError),

    /// A connection request was rejected.
    #[error(transparent)]
    InvalidConnection(#[from] ConnectError),

    /// `endpoint` was reached twice through different edges.
    #[error("connections form a loop through `{endpoint}`")]
    ConnectionLoop {
        /// The endpoint at which the loop closed.
        endpoint: String,
    },

    /// Two writers reach the same net.
    #[error("two-writer conflict on `{endpoint}`{}: already driven by `{writer}`", written_elsewhere(.via))]
    MultiWriter {
        /// The net member or written endpoint where the conflict shows up.
        endpoint: String,
        /// The ancestor or overlapping slice through which `endpoint`
        /// became a writer, if it is not written directly.
        via: Option<String>,
        /// The writer found first.
        writer: String,
        /// All members of the net, or the conflicting block writes.
        members: Vec<String>,
    },

    /// Nets without any writer, all reported together.
    #[error("{} net(s) have no writer", .nets.len())]
    NoWriter {
        /// Members of each writer-less net.
        nets: Vec<Vec<String>>,
    },

    /// An edge breaks one of the port direction rules.
    #[error("{reader_kind} `{reader}` of `{reader_host}` cannot be driven by {writer_kind} `{writer}` of `{writer_host}` ({rule})")]
    SignalType {
        /// The rule that was broken.
        rule: LegalityRule,
        /// The driving endpoint.
        writer: String,
        /// Its kind.
        writer_kind: weft_ir::EndpointKind,
        /// Its host component.
        writer_host: String,
        /// The driven endpoint.
        reader: String,
        /// Its kind.
        reader_kind: weft_ir::EndpointKind,
        /// Its host component.
        reader_host: String,
    },

    /// Nets were requested before `elaborate` succeeded.
    #[error("the design has not been elaborated")]
    NotElaborated,

    /// A declaration-time call was made after elaboration.
    #[error("the design has already been elaborated; use `add_connection` to connect afterwards")]
    AlreadyElaborated,

    /// A mutation named a child that does not exist.
    #[error("`{parent}` has no child component `{name}`")]
    UnknownComponent {
        /// Path of the parent.
        parent: String,
        /// The requested name.
        name: String,
    },

    /// An engine invariant was broken.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

fn written_elsewhere(via: &Option<String>) -> String {
    match via {
        Some(via) => format!(" (as `{via}` is written somewhere else)"),
        None => String::new(),
    }
}

impl ElabError {
    /// The diagnostic code for this error.
    pub fn code(&self) -> DiagnosticCode {
        match self {
            ElabError::InvalidConnection(_) => E300,
            ElabError::ConnectionLoop { .. } => E301,
            ElabError::MultiWriter { .. } => E302,
            ElabError::NoWriter { .. } => E303,
            ElabError::SignalType { .. } => E304,
            ElabError::NotElaborated => E305,
            ElabError::AlreadyElaborated => E306,
            ElabError::UnknownComponent { .. } => E307,
            ElabError::Declaration(_) => E308,
            ElabError::Internal(_) => E309,
        }
    }

    /// Converts this error into a structured diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code(), self.to_string());
        match self {
            ElabError::ConnectionLoop { endpoint } => diag
                .with_subject(endpoint.as_str())
                .with_help("a net must be a tree; remove one of the connections on the loop"),
            ElabError::MultiWriter {
                endpoint,
                via,
                writer,
                members,
            } => {
                let mut diag = diag
                    .with_subject(endpoint.as_str())
                    .with_label(Label::secondary(writer.as_str(), "first writer"));
                if let Some(via) = via {
                    diag = diag.with_label(Label::secondary(via.as_str(), "written here"));
                }
                diag.with_note(format!("involved: {}", members.join(", ")))
            }
            ElabError::NoWriter { nets } => nets.iter().fold(diag, |diag, members| {
                diag.with_note(format!("net without writer: {}", members.join(", ")))
            }),
            ElabError::SignalType {
                rule,
                writer,
                writer_host,
                reader,
                reader_host,
                ..
            } => diag
                .with_subject(reader.as_str())
                .with_label(Label::secondary(writer.as_str(), "driven from here"))
                .with_note(format!("reader host `{reader_host}`, writer host `{writer_host}`"))
                .with_help(rule.hint()),
            ElabError::NotElaborated => diag.with_help("call `elaborate` first"),
            ElabError::UnknownComponent { parent, .. } => diag.with_subject(parent.as_str()),
            ElabError::Declaration(_)
            | ElabError::InvalidConnection(_)
            | ElabError::AlreadyElaborated
            | ElabError::Internal(_) => diag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_diagnostics::Severity;
    use weft_ir::EndpointKind;

    #[test]
    fn error_code_formats() {
        assert_eq!(format!("{E300}"), "E300");
        assert_eq!(format!("{E304}"), "E304");
        assert_eq!(format!("{E309}"), "E309");
    }

    #[test]
    fn rules_are_numbered() {
        let numbers: Vec<u8> = [
            LegalityRule::SameScope,
            LegalityRule::DeeperDriver,
            LegalityRule::ShallowerDriver,
            LegalityRule::SiblingDriver,
            LegalityRule::TooDistant,
        ]
        .into_iter()
        .map(LegalityRule::number)
        .collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
        assert!(LegalityRule::SiblingDriver.to_string().starts_with("rule 4"));
    }

    #[test]
    fn signal_type_diagnostic_carries_hint() {
        let err = ElabError::SignalType {
            rule: LegalityRule::SiblingDriver,
            writer: "top.b.i".into(),
            writer_kind: EndpointKind::InPort,
            writer_host: "top.b".into(),
            reader: "top.c.i".into(),
            reader_kind: EndpointKind::InPort,
            reader_host: "top.c".into(),
        };
        let diag = err.to_diagnostic();
        assert_eq!(diag.code, E304);
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.subject.as_deref(), Some("top.c.i"));
        assert_eq!(diag.help, vec![LegalityRule::SiblingDriver.hint().to_string()]);
        assert!(diag.message.contains("InPort `top.c.i` of `top.c`"));
    }

    #[test]
    fn no_writer_lists_every_net() {
        let err = ElabError::NoWriter {
            nets: vec![vec!["top.a".into(), "top.b".into()], vec!["top.c".into(), "top.d".into()]],
        };
        assert_eq!(err.to_string(), "2 net(s) have no writer");
        assert_eq!(err.to_diagnostic().notes.len(), 2);
    }

    #[test]
    fn multi_writer_message() {
        let err = ElabError::MultiWriter {
            endpoint: "top.x".into(),
            via: Some("top.y".into()),
            writer: "top.z".into(),
            members: vec!["top.x".into(), "top.y".into()],
        };
        assert_eq!(
            err.to_string(),
            "two-writer conflict on `top.x` (as `top.y` is written somewhere else): already driven by `top.z`"
        );
        assert_eq!(err.to_diagnostic().labels.len(), 2);
    }

    #[test]
    fn wrapped_errors_keep_their_message() {
        let err: ElabError = ConnectError::OddArgumentCount(5).into();
        assert_eq!(err.code(), E300);
        assert_eq!(err.to_string(), "odd number (5) of objects provided");
    }
}
