//! `weft nets`: print every net of the elaborated design.

use serde::Serialize;
use weft_elaborate::Net;
use weft_ir::Hierarchy;

use crate::pipeline::{elaborate_project, render_diagnostics};
use crate::{GlobalArgs, NetsArgs, ReportFormat};

/// One net with its endpoints rendered as paths.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct NetReport {
    /// Path of the writer, if the net has one.
    pub writer: Option<String>,
    /// Paths of all members, in declaration order.
    pub members: Vec<String>,
}

impl NetReport {
    /// Renders `net` against the hierarchy it was elaborated from.
    pub fn new(hier: &Hierarchy, net: &Net) -> Self {
        Self {
            writer: net.writer.map(|w| hier.path(w)),
            members: net.member_paths(hier),
        }
    }
}

impl std::fmt::Display for NetReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let writer = self.writer.as_deref().unwrap_or("<no writer>");
        let readers: Vec<&str> = self
            .members
            .iter()
            .map(String::as_str)
            .filter(|m| Some(*m) != self.writer.as_deref())
            .collect();
        write!(f, "{writer} -> {}", readers.join(", "))
    }
}

/// Runs the `weft nets` command.
///
/// If elaboration fails the diagnostics are printed instead and the exit
/// code is 1.
pub fn run(args: &NetsArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let session = elaborate_project(global)?;
    if session.sink.has_errors() {
        let format = session.config.diagnostics.format.into();
        render_diagnostics(&session.sink.diagnostics(), format, global.color);
        return Ok(1);
    }

    let hier = session.elab.hierarchy();
    let reports: Vec<NetReport> = session
        .elab
        .get_all_nets()?
        .iter()
        .map(|net| NetReport::new(hier, net))
        .collect();

    match args.format {
        ReportFormat::Text => {
            for report in &reports {
                println!("{report}");
            }
        }
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }
    Ok(0)
}
