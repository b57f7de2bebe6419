//! `weft check`: elaborate the project's design and report problems.

use crate::pipeline::{elaborate_project, render_diagnostics};
use crate::{CheckArgs, GlobalArgs, ReportFormat};

/// Runs the `weft check` command.
///
/// Returns exit code 0 if the design elaborates cleanly, 1 otherwise.
pub fn run(args: &CheckArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let session = elaborate_project(global)?;
    let format = args
        .format
        .unwrap_or_else(|| session.config.diagnostics.format.into());

    let diagnostics = session.sink.diagnostics();
    render_diagnostics(&diagnostics, format, global.color);

    if !global.quiet && format == ReportFormat::Text {
        let nets = session.elab.get_all_nets().map_or(0, <[_]>::len);
        eprintln!(
            "   Result: {} error(s), {} net(s)",
            session.sink.error_count(),
            nets
        );
    }

    Ok(i32::from(session.sink.has_errors()))
}
