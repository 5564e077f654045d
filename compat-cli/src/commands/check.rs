//! Check command - Compare two snapshots and report BC breaks
//!
//! Loads the old and new symbol tables, runs the comparison, drops findings
//! covered by the baseline and renders what is left.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use colored::Colorize;
use compat_core::{ChangeSummary, Changes, Comparator, Snapshot};
use serde::Serialize;

use crate::baseline::Baseline;
use crate::config::CompatConfig;
use crate::output::{
    GithubOutput, MarkdownOutput, Output, OutputConfig, Outputter, TableOutput,
};

/// Inputs of a single `compat check` run.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub old: PathBuf,
    pub new: PathBuf,
    pub baseline: Option<PathBuf>,
    pub threads: Option<usize>,
}

/// How a finished check should be reflected in the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// No BC breaks left after the baseline.
    Clean,
    /// At least one BC break remains.
    Breaking,
}

/// Result of a check run
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub old: String,
    pub new: String,
    pub summary: ChangeSummary,
    pub suppressed: usize,
    pub duration_ms: u64,
    pub changes: Changes,
}

impl CheckReport {
    pub fn status(&self) -> CheckStatus {
        if self.changes.has_bc_breaks() {
            CheckStatus::Breaking
        } else {
            CheckStatus::Clean
        }
    }

    fn suppressed_note(&self) -> Option<String> {
        match self.suppressed {
            0 => None,
            1 => Some("1 finding suppressed by baseline".to_string()),
            n => Some(format!("{} findings suppressed by baseline", n)),
        }
    }
}

impl Outputter for CheckReport {
    fn to_table(&self, config: &OutputConfig) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{} {} -> {}\n\n",
            "COMPAT:".cyan().bold(),
            self.old.yellow(),
            self.new.green()
        ));
        output.push_str(&TableOutput::format_changes(self.changes.as_slice(), config));
        output.push_str("\n\n");

        let summary = self.summary.text();
        if self.summary.bc_breaks > 0 {
            output.push_str(&format!("{} {}", "BREAKING:".red().bold(), summary));
        } else {
            output.push_str(&format!("{} {}", "OK:".green().bold(), summary));
        }
        output.push_str(&format!(" ({}ms)", self.duration_ms).dimmed().to_string());

        if let Some(note) = self.suppressed_note() {
            output.push_str(&format!("\n{}", note.dimmed()));
        }
        output
    }

    fn to_markdown(&self, _config: &OutputConfig) -> String {
        let mut output = format!(
            "### Backward compatibility: `{}` vs `{}`\n\n**{}**\n\n",
            self.old,
            self.new,
            self.summary.text()
        );
        output.push_str(&MarkdownOutput::format_changes(self.changes.as_slice()));
        if let Some(note) = self.suppressed_note() {
            output.push_str(&format!("\n\n_{}_", note));
        }
        output
    }

    fn to_github(&self, _config: &OutputConfig) -> String {
        GithubOutput::format_changes(self.changes.as_slice())
    }
}

fn load_snapshot(path: &Path, which: &str) -> anyhow::Result<Snapshot> {
    Snapshot::load(path).with_context(|| format!("Failed to load {} snapshot", which))
}

/// Build the effective baseline from configuration and the optional file.
fn load_baseline(options: &CheckOptions, config: &CompatConfig) -> anyhow::Result<Baseline> {
    let mut baseline = Baseline::from_patterns(config.baseline_patterns())
        .context("Invalid [baseline] section in configuration")?;

    if let Some(path) = &options.baseline {
        baseline = baseline.extend(Baseline::from_file(path)?);
    }
    tracing::debug!(patterns = baseline.len(), "baseline loaded");
    Ok(baseline)
}

/// Compare both snapshots and build the report without printing it.
pub fn execute(options: &CheckOptions, config: &CompatConfig) -> anyhow::Result<CheckReport> {
    let start = Instant::now();

    let baseline = load_baseline(options, config)?;
    let old = load_snapshot(&options.old, "old")?;
    let new = load_snapshot(&options.new, "new")?;

    let threads = options.threads.or(config.threads());
    let changes = Comparator::new().with_threads(threads).compare(&old, &new);
    let (changes, suppressed) = baseline.apply(changes);

    let summary: ChangeSummary = changes.iter().collect();
    tracing::info!(summary = %summary.text(), suppressed, "check finished");

    Ok(CheckReport {
        old: old.label().to_string(),
        new: new.label().to_string(),
        summary,
        suppressed,
        duration_ms: start.elapsed().as_millis() as u64,
        changes,
    })
}

/// Run the check command
pub fn run(
    options: CheckOptions,
    config: &CompatConfig,
    output_config: OutputConfig,
) -> anyhow::Result<CheckStatus> {
    let report = execute(&options, config)?;
    let status = report.status();
    Output::with_config(report, output_config).render()?;
    Ok(status)
}
