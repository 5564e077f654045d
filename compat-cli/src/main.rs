//! compat CLI - backward-compatibility checks between two library revisions
//!
//! Compares two symbol-table snapshots and reports every change that can
//! break a consumer of the library.
//!
//! Exit codes: `0` no BC breaks, `1` BC breaks found, `2` invalid input.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod baseline;
mod commands;
mod config;
mod output;

use commands::check::{CheckOptions, CheckStatus};
use commands::*;
use config::CompatConfig;
use output::{OutputConfig, OutputFormat};

/// Detect backward-compatibility breaks between two revisions of a library.
#[derive(Parser)]
#[command(name = "compat")]
#[command(author, version)]
#[command(about = "Detect backward-compatibility breaks between two revisions of a library")]
#[command(propagate_version = true)]
#[command(after_help = "Examples:
  compat check v1.json v2.json               Report BC breaks
  compat check v1.json v2.json --format json Machine-readable report
  compat check old.json new.json --baseline known-breaks.txt

Exit codes: 0 = no BC breaks, 1 = BC breaks found, 2 = invalid input")]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format (overrides config default)
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Never truncate long messages in table output
    #[arg(long, global = true)]
    wide: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two snapshots and report BC breaks
    #[command(visible_alias = "c")]
    Check {
        /// Symbol table of the previous release
        old: PathBuf,

        /// Symbol table of the candidate release
        new: PathBuf,

        /// File of regular expressions, one per line, for accepted findings
        #[arg(short, long)]
        baseline: Option<PathBuf>,

        /// Worker threads (default: all cores)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Compact output (minified JSON, borderless table)
        #[arg(long)]
        compact: bool,
    },
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    // Load configuration from .compatrc.toml
    let config = CompatConfig::load(std::path::Path::new("."));

    // Resolve output format: CLI flag > config default > Table
    let format = cli.format.unwrap_or_else(|| {
        config
            .default_format()
            .and_then(|f| f.parse().ok())
            .unwrap_or(OutputFormat::Table)
    });

    let mut output_config = OutputConfig::auto_detect_with_color_override(format, config.use_color());
    if cli.no_color {
        output_config = output_config.without_colors();
    }
    if cli.wide {
        output_config = output_config.without_truncation();
    }
    colored::control::set_override(output_config.use_colors());

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Check {
            old,
            new,
            baseline,
            threads,
            compact,
        } => {
            let options = CheckOptions {
                old,
                new,
                baseline,
                threads,
            };
            let output_config = if compact {
                output_config.compact()
            } else {
                output_config
            };

            let status = check::run(options, &config, output_config)?;
            Ok(match status {
                CheckStatus::Clean => ExitCode::SUCCESS,
                CheckStatus::Breaking => ExitCode::from(1),
            })
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_check() {
        let cli = Cli::parse_from([
            "compat", "check", "a.json", "b.json", "--baseline", "known.txt", "-j", "2", "--format",
            "json",
        ]);
        assert_eq!(cli.format, Some(OutputFormat::Json));
        match cli.command {
            Some(Commands::Check {
                old,
                baseline,
                threads,
                ..
            }) => {
                assert_eq!(old, PathBuf::from("a.json"));
                assert_eq!(baseline, Some(PathBuf::from("known.txt")));
                assert_eq!(threads, Some(2));
            }
            _ => panic!("expected check command"),
        }
    }
}
