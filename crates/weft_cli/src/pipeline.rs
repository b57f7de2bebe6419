//! Shared steps of the CLI commands: locating the project, loading its
//! configuration and design, elaborating, and rendering diagnostics.

use std::path::{Path, PathBuf};

use weft_config::{ProjectConfig, CONFIG_FILE_NAME};
use weft_diagnostics::{Diagnostic, DiagnosticRenderer, DiagnosticSink, JsonRenderer, TerminalRenderer};
use weft_elaborate::Elaborator;

use crate::design::{self, Design};
use crate::{GlobalArgs, ReportFormat};

/// Walks up from `start` looking for the nearest directory containing `weft.toml`.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE_NAME).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE_NAME} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the project directory from the global flags.
///
/// `--config` may name the configuration file or its directory. Without it
/// the search starts in the current directory.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match &global.config {
        Some(config_path) => {
            let p = PathBuf::from(config_path);
            if p.is_file() {
                Ok(p.parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from(".")))
            } else {
                Ok(p)
            }
        }
        None => find_project_root(&std::env::current_dir()?),
    }
}

/// A design after elaboration, with everything reported along the way.
pub struct Session {
    /// The project configuration.
    pub config: ProjectConfig,
    /// The elaborator, elaborated unless `sink` holds errors.
    pub elab: Elaborator,
    /// Connection and elaboration problems.
    pub sink: DiagnosticSink,
}

/// Loads the project's configuration and design, declares the design's
/// connections, and elaborates.
///
/// Unreadable or malformed files are returned as errors. Problems with
/// the design itself end up in the session's sink.
pub fn elaborate_project(global: &GlobalArgs) -> Result<Session, Box<dyn std::error::Error>> {
    let dir = resolve_project_root(global)?;
    let config = weft_config::load_config(&dir)?;

    if !global.quiet {
        eprintln!(
            "   Checking {} v{}",
            config.project.name, config.project.version
        );
    }

    let design_path = dir.join(&config.project.design);
    if global.verbose && !global.quiet {
        eprintln!("    Loading {}", design_path.display());
    }
    let design = design::load_design(&design_path)?;
    let sink = DiagnosticSink::new();
    let elab = elaborate(design, &config, &sink);
    Ok(Session { config, elab, sink })
}

/// Declares every connection and runs elaboration once all of them were
/// accepted.
pub fn elaborate(design: Design, config: &ProjectConfig, sink: &DiagnosticSink) -> Elaborator {
    let mut elab = Elaborator::with_config(design.hierarchy, config.elaborate);
    for conn in &design.connections {
        if let Err(e) = elab.connect(conn.scope, conn.a, conn.b) {
            sink.emit(e.to_diagnostic());
        }
    }
    if !sink.has_errors() {
        if let Err(e) = elab.elaborate() {
            sink.emit(e.to_diagnostic());
        }
    }
    elab
}

/// Writes diagnostics to stderr as text or to stdout as JSON.
pub fn render_diagnostics(diagnostics: &[Diagnostic], format: ReportFormat, color: bool) {
    match format {
        ReportFormat::Text => {
            let renderer = TerminalRenderer::new(color);
            for diag in diagnostics {
                eprintln!("{}", renderer.render(diag));
            }
        }
        ReportFormat::Json => print!("{}", JsonRenderer.render_all(diagnostics)),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;

    pub(crate) const CHAIN: &str = r#"
root = "top"

[[components]]
path = "top.a"

[[components]]
path = "top.b"

[[signals]]
path = "top.a.o"
kind = "out"
width = 8

[[signals]]
path = "top.b.i"
kind = "in"
width = 8

[[blocks]]
component = "top.a"
name = "up"
writes = ["top.a.o"]

[[connections]]
scope = "top"
a = "top.a.o"
b = "top.b.i"
"#;

    /// Writes `weft.toml` and `design.toml` into a fresh directory.
    pub(crate) fn project(design: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[project]\nname = \"chain\"\nversion = \"0.1.0\"\ndesign = \"design.toml\"\n",
        )
        .unwrap();
        fs::write(dir.path().join("design.toml"), design).unwrap();
        dir
    }

    pub(crate) fn global_for(dir: &Path) -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            config: Some(dir.to_string_lossy().into_owned()),
        }
    }

    #[test]
    fn finds_root_from_nested_directory() {
        let dir = project(CHAIN);
        let nested = dir.path().join("hw").join("rtl");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(find_project_root(&nested).unwrap(), dir.path());
    }

    #[test]
    fn missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_project_root(dir.path()).is_err());
    }

    #[test]
    fn config_flag_may_name_the_file() {
        let dir = project(CHAIN);
        let global = GlobalArgs {
            config: Some(dir.path().join(CONFIG_FILE_NAME).to_string_lossy().into_owned()),
            ..global_for(dir.path())
        };
        assert_eq!(resolve_project_root(&global).unwrap(), dir.path());
    }

    #[test]
    fn clean_project_elaborates() {
        let dir = project(CHAIN);
        let session = elaborate_project(&global_for(dir.path())).unwrap();
        assert!(!session.sink.has_errors());
        assert_eq!(session.elab.get_all_nets().unwrap().len(), 1);
        assert_eq!(session.config.project.name, "chain");
    }

    #[test]
    fn rejected_connection_skips_elaboration() {
        let design = CHAIN.replace("b = \"top.b.i\"", "b = \"top.a.o\"");
        let dir = project(&design);
        let session = elaborate_project(&global_for(dir.path())).unwrap();
        let diags = session.sink.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code.to_string(), "E300");
        assert!(!session.elab.is_elaborated());
    }
}
