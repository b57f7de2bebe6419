//! Labels pointing at the other endpoints or components a diagnostic involves.

use serde::{Deserialize, Serialize};

/// Whether a label marks the main culprit or supporting context.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelStyle {
    /// The endpoint the diagnostic is about.
    Primary,
    /// Another endpoint or component that explains the problem.
    Secondary,
}

/// A dotted hierarchy path annotated with a short message.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Label {
    /// Dotted path of the endpoint or component, e.g. `top.a.out`.
    pub subject: String,
    /// The message shown next to the path.
    pub message: String,
    /// Primary or secondary.
    pub style: LabelStyle,
}

impl Label {
    /// Creates a primary label.
    pub fn primary(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            message: message.into(),
            style: LabelStyle::Primary,
        }
    }

    /// Creates a secondary label.
    pub fn secondary(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            message: message.into(),
            style: LabelStyle::Secondary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_label() {
        let label = Label::primary("top.b.in_", "driven here");
        assert_eq!(label.style, LabelStyle::Primary);
        assert_eq!(label.subject, "top.b.in_");
    }

    #[test]
    fn secondary_label() {
        let label = Label::secondary("top.a", "host of the writer");
        assert_eq!(label.style, LabelStyle::Secondary);
        assert_eq!(label.message, "host of the writer");
    }
}
