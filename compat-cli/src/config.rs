//! compat configuration loading from `.compatrc.toml`.
//!
//! Configuration is optional: every setting has a default, and command-line
//! flags override whatever the file says.
//!
//! # Example Configuration
//!
//! ```toml
//! [output]
//! format = "markdown"
//! color = false
//!
//! [baseline]
//! ignore = [
//!     '^\[BC\] REMOVED: Method Legacy#.* was removed$',
//!     "^\\[BC\\] SKIPPED: ",
//!     "became internal$",
//! ]
//!
//! [analysis]
//! threads = 4
//! ```

use serde::Deserialize;
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".compatrc.toml";

/// Root configuration structure loaded from `.compatrc.toml`.
#[derive(Debug, Deserialize, Default)]
pub struct CompatConfig {
    /// Output formatting preferences.
    #[serde(default)]
    pub output: OutputSettings,

    /// Known findings to suppress.
    #[serde(default)]
    pub baseline: BaselineSettings,

    /// Comparison engine tuning.
    #[serde(default)]
    pub analysis: AnalysisSettings,
}

/// Output formatting preferences.
///
/// Distinct from the runtime `OutputConfig` in the output module, which
/// handles the actual rendering.
#[derive(Debug, Deserialize, Default)]
pub struct OutputSettings {
    /// Default report format.
    ///
    /// Valid values: `table`, `json`, `markdown`, `github`
    #[serde(default)]
    pub format: Option<String>,

    /// Whether to use colored output. Auto-detected from the TTY when unset.
    #[serde(default)]
    pub color: Option<bool>,
}

/// Baseline of accepted findings.
#[derive(Debug, Deserialize, Default)]
pub struct BaselineSettings {
    /// Regular expressions matched against finding messages. A finding whose
    /// message matches any of them is dropped before the exit code is decided.
    #[serde(default)]
    pub ignore: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct AnalysisSettings {
    /// Worker threads for the comparison; unset uses all cores.
    #[serde(default)]
    pub threads: Option<usize>,
}

impl CompatConfig {
    /// Load configuration from `.compatrc.toml` in the given directory.
    ///
    /// Missing files yield defaults. Unreadable or malformed files are logged
    /// as warnings and also yield defaults.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse {}: {}", CONFIG_FILE, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", CONFIG_FILE, e);
                }
            }
        }
        Self::default()
    }

    /// Get the default output format, if configured.
    pub fn default_format(&self) -> Option<&str> {
        self.output.format.as_deref()
    }

    /// Configured color preference, or `None` to auto-detect.
    pub fn use_color(&self) -> Option<bool> {
        self.output.color
    }

    pub fn baseline_patterns(&self) -> &[String] {
        &self.baseline.ignore
    }

    pub fn threads(&self) -> Option<usize> {
        self.analysis.threads
    }
}
