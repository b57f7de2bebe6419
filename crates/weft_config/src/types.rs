//! Configuration types deserialized from `weft.toml`.

use serde::Deserialize;

/// The top-level project configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    /// Project metadata and the design description to load.
    pub project: ProjectMeta,
    /// Which elaboration checks run.
    #[serde(default)]
    pub elaborate: ElaborateConfig,
    /// How diagnostics are reported.
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

/// Core project metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// The project version string.
    #[serde(default)]
    pub version: String,
    /// A brief description.
    #[serde(default)]
    pub description: String,
    /// Path of the design description, relative to the project directory.
    pub design: String,
}

/// Switches for the elaboration passes.
///
/// Net extraction and writer resolution always run; these flags cover the
/// checks layered on top of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ElaborateConfig {
    /// Run the port legality checker as the last step of elaboration.
    pub check_legality: bool,
    /// Reject conflicting writes made by different update blocks.
    pub check_block_writes: bool,
    /// Re-run the legality checker after every incremental mutation.
    pub recheck_after_mutation: bool,
}

impl Default for ElaborateConfig {
    fn default() -> Self {
        Self {
            check_legality: true,
            check_block_writes: true,
            recheck_after_mutation: false,
        }
    }
}

/// Diagnostic output settings.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Output format.
    pub format: ReportFormat,
}

/// Diagnostic output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Human-readable terminal output.
    #[default]
    Text,
    /// Machine-readable JSON.
    Json,
}
