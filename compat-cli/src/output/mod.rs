//! Output formatting module for the compat CLI
//!
//! Provides unified output formatting with support for multiple formats:
//! table (human-readable), json (machine-readable), markdown (review
//! comments) and github (workflow annotations).
//!
//! Automatically detects TTY context to adjust colors and truncation behavior.

use clap::ValueEnum;
use serde::Serialize;
use std::io::IsTerminal;
use std::str::FromStr;

mod github;
mod json;
mod markdown;
mod table;

pub use self::github::GithubOutput;
pub use self::json::JsonOutput;
pub use self::markdown::MarkdownOutput;
pub use self::table::TableOutput;

/// Output format for CLI results
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format (default)
    #[default]
    Table,
    /// JSON format for machine consumption
    Json,
    /// Markdown, e.g. for pull request comments
    Markdown,
    /// GitHub Actions workflow annotations
    Github,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "github" => Ok(OutputFormat::Github),
            _ => Err(format!("Unknown output format: '{}'", s)),
        }
    }
}

/// Configuration for output rendering
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// The output format to use
    pub format: OutputFormat,
    /// Disable colored output
    pub no_color: bool,
    /// Disable truncation of long values
    pub no_truncate: bool,
    /// Override terminal width (None = auto-detect)
    pub width: Option<usize>,
    /// Compact mode (less whitespace)
    pub compact: bool,
}

impl OutputConfig {
    /// Create a new OutputConfig with the specified format
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            no_color: false,
            no_truncate: false,
            width: None,
            compact: false,
        }
    }

    /// Create an OutputConfig with automatic TTY detection and optional color override.
    ///
    /// When output is not a TTY (piped or redirected):
    /// - Colors are disabled (unless `color_override` is `Some(true)`)
    /// - Truncation is disabled
    pub fn auto_detect_with_color_override(
        format: OutputFormat,
        color_override: Option<bool>,
    ) -> Self {
        let is_tty = std::io::stdout().is_terminal();
        let use_color = color_override.unwrap_or(is_tty);
        Self {
            format,
            no_color: !use_color,
            no_truncate: !is_tty,
            width: None,
            compact: false,
        }
    }

    /// Get the effective terminal width
    pub fn effective_width(&self) -> usize {
        self.width.unwrap_or_else(terminal_width)
    }

    /// Check if colors should be used
    pub fn use_colors(&self) -> bool {
        !self.no_color
    }

    /// Check if truncation should be applied
    pub fn should_truncate(&self) -> bool {
        !self.no_truncate
    }

    /// Builder: disable colors
    pub fn without_colors(mut self) -> Self {
        self.no_color = true;
        self
    }

    /// Builder: disable truncation
    pub fn without_truncation(mut self) -> Self {
        self.no_truncate = true;
        self
    }

    /// Builder: enable compact mode
    pub fn compact(mut self) -> Self {
        self.compact = true;
        self
    }
}

/// Types that can be rendered in every supported format.
pub trait Outputter: Serialize + Sized {
    /// Render as table format
    fn to_table(&self, config: &OutputConfig) -> String;

    /// Render as JSON format
    fn to_json(&self, config: &OutputConfig) -> String {
        JsonOutput::format(self, config)
    }

    /// Render as Markdown. Falls back to the table rendering without colors.
    fn to_markdown(&self, config: &OutputConfig) -> String {
        self.to_table(config)
    }

    /// Render as GitHub workflow commands. Falls back to the table rendering.
    fn to_github(&self, config: &OutputConfig) -> String {
        self.to_table(config)
    }

    /// Render using the format specified in config
    fn render(&self, config: &OutputConfig) -> String {
        match config.format {
            OutputFormat::Table => self.to_table(config),
            OutputFormat::Json => self.to_json(config),
            OutputFormat::Markdown => self.to_markdown(config),
            OutputFormat::Github => self.to_github(config),
        }
    }

    /// Render and print to stdout
    fn output(&self, config: &OutputConfig) {
        println!("{}", self.render(config));
    }
}

/// Result wrapper for formatted output with automatic format selection
pub struct Output<T> {
    data: T,
    config: OutputConfig,
}

impl<T: Outputter> Output<T> {
    /// Create a new output wrapper with full config
    pub fn with_config(data: T, config: OutputConfig) -> Self {
        Self { data, config }
    }

    /// Render the output to stdout
    pub fn render(&self) -> anyhow::Result<()> {
        self.data.output(&self.config);
        Ok(())
    }
}

/// Truncate a string to a maximum width with ellipsis
pub fn truncate(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else if max_width <= 3 {
        s.chars().take(max_width).collect()
    } else {
        let truncated: String = s.chars().take(max_width - 3).collect();
        format!("{}...", truncated)
    }
}

/// Get terminal width, defaulting to 80 if unavailable
pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_exact_length() {
        assert_eq!(truncate("hello", 5), "hello");
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("md".parse::<OutputFormat>(), Ok(OutputFormat::Markdown));
        assert_eq!("github".parse::<OutputFormat>(), Ok(OutputFormat::Github));
        assert!("csv".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_color_override() {
        let forced = OutputConfig::auto_detect_with_color_override(OutputFormat::Table, Some(true));
        assert!(forced.use_colors());

        let disabled =
            OutputConfig::auto_detect_with_color_override(OutputFormat::Table, Some(false));
        assert!(!disabled.use_colors());
    }

    #[test]
    fn test_output_config_builder() {
        let mut config = OutputConfig::new(OutputFormat::Json)
            .without_colors()
            .without_truncation()
            .compact();
        config.width = Some(120);

        assert_eq!(config.format, OutputFormat::Json);
        assert!(config.no_color);
        assert!(config.no_truncate);
        assert_eq!(config.effective_width(), 120);
        assert!(config.compact);
    }
}
