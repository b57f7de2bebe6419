//! Weft CLI: elaborate component hierarchies from the command line.
//!
//! Provides `weft check` to elaborate a project's design and report
//! connectivity problems, and `weft nets` to print the resolved nets.

#![warn(missing_docs)]

mod check;
mod design;
mod nets;
mod pipeline;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Weft: connectivity elaboration for component hierarchies.
#[derive(Parser, Debug)]
#[command(name = "weft", version, about = "Weft connectivity elaborator")]
pub struct Cli {
    /// Print only diagnostics and command output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log elaboration passes to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// When to color diagnostics.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// `weft.toml` to use, or the directory holding it.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// What to do with the design.
    #[command(subcommand)]
    pub command: Command,
}

/// `weft` subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Elaborate the design and report problems.
    Check(CheckArgs),
    /// Elaborate the design and print its nets.
    Nets(NetsArgs),
}

/// Arguments for the `weft check` subcommand.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Output format for diagnostics; defaults to the project setting.
    #[arg(short, long, value_enum)]
    pub format: Option<ReportFormat>,
}

/// Arguments for the `weft nets` subcommand.
#[derive(Parser, Debug)]
pub struct NetsArgs {
    /// Output format for the net list.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// `--color` values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Color when stderr is a terminal.
    Auto,
    /// Always color.
    Always,
    /// Plain text only.
    Never,
}

/// How diagnostics and net lists are printed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Text for people.
    Text,
    /// Pretty-printed JSON on stdout.
    Json,
}

impl From<weft_config::ReportFormat> for ReportFormat {
    fn from(format: weft_config::ReportFormat) -> Self {
        match format {
            weft_config::ReportFormat::Text => ReportFormat::Text,
            weft_config::ReportFormat::Json => ReportFormat::Json,
        }
    }
}

/// The global flags, resolved.
pub struct GlobalArgs {
    /// `--quiet`.
    pub quiet: bool,
    /// `--verbose`.
    pub verbose: bool,
    /// `--color`, with `auto` already decided.
    pub color: bool,
    /// `--config`.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        init_logging();
    }

    let color = match cli.color {
        ColorChoice::Auto => std::io::IsTerminal::is_terminal(&std::io::stderr()),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Check(ref args) => check::run(args, &global),
        Command::Nets(ref args) => nets::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Sends `debug` and above to stderr; `RUST_LOG` overrides the level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_check_default() {
        let cli = Cli::parse_from(["weft", "check"]);
        match cli.command {
            Command::Check(ref args) => assert!(args.format.is_none()),
            _ => panic!("expected Check command"),
        }
    }

    #[test]
    fn parse_check_json() {
        let cli = Cli::parse_from(["weft", "check", "--format", "json"]);
        match cli.command {
            Command::Check(ref args) => assert_eq!(args.format, Some(ReportFormat::Json)),
            _ => panic!("expected Check command"),
        }
    }

    #[test]
    fn parse_nets_default_is_text() {
        let cli = Cli::parse_from(["weft", "nets"]);
        match cli.command {
            Command::Nets(ref args) => assert_eq!(args.format, ReportFormat::Text),
            _ => panic!("expected Nets command"),
        }
    }

    #[test]
    fn parse_nets_short_format() {
        let cli = Cli::parse_from(["weft", "nets", "-f", "json"]);
        match cli.command {
            Command::Nets(ref args) => assert_eq!(args.format, ReportFormat::Json),
            _ => panic!("expected Nets command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["weft", "--quiet", "--color", "never", "check"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.color, ColorChoice::Never);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["weft", "nets", "--verbose", "--config", "hw/weft.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config.as_deref(), Some("hw/weft.toml"));
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(Cli::try_parse_from(["weft", "synth"]).is_err());
    }

    #[test]
    fn config_format_converts() {
        assert_eq!(ReportFormat::from(weft_config::ReportFormat::Json), ReportFormat::Json);
        assert_eq!(ReportFormat::from(weft_config::ReportFormat::Text), ReportFormat::Text);
    }
}
