//! Baseline of accepted findings.
//!
//! A baseline is a list of regular expressions. Any finding whose rendered
//! form (for example `[BC] REMOVED: Class Foo has been deleted`) matches one
//! of them is considered known and is dropped from the report before the
//! exit code is decided. Patterns come from the `[baseline]`
//! section of `.compatrc.toml` and from an optional baseline file with one
//! pattern per line (`#` starts a comment line).

use std::path::{Path, PathBuf};

use compat_core::Changes;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BaselineError {
    #[error("invalid baseline pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to read baseline file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Default)]
pub struct Baseline {
    patterns: Vec<Regex>,
}

impl Baseline {
    pub fn from_patterns<I, S>(patterns: I) -> Result<Self, BaselineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let pattern = p.as_ref();
                Regex::new(pattern).map_err(|source| BaselineError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    /// Read one pattern per non-blank, non-comment line.
    pub fn from_file(path: &Path) -> Result<Self, BaselineError> {
        let content = std::fs::read_to_string(path).map_err(|source| BaselineError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_patterns(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    /// Combine two baselines.
    pub fn extend(mut self, other: Baseline) -> Self {
        self.patterns.extend(other.patterns);
        self
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Test a rendered finding against every pattern.
    pub fn matches(&self, rendered: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(rendered))
    }

    /// Drop known findings. Returns the remaining changes and how many were
    /// suppressed.
    pub fn apply(&self, changes: Changes) -> (Changes, usize) {
        if self.is_empty() {
            return (changes, 0);
        }

        let before = changes.len();
        let kept = changes.retain(|change| !self.matches(&change.to_string()));
        let suppressed = before - kept.len();
        if suppressed > 0 {
            tracing::debug!(suppressed, "baseline suppressed findings");
        }
        (kept, suppressed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compat_core::Change;
    use tempfile::TempDir;

    fn sample() -> Changes {
        Changes::of([
            Change::removed("Method Thing#methodGone() was removed", true),
            Change::removed("Class ClassGone has been deleted", true),
            Change::changed("Function f() became internal", true),
            Change::changed("Flag f() changed", false),
        ])
    }

    #[test]
    fn test_empty_baseline_keeps_everything() {
        let (kept, suppressed) = Baseline::default().apply(sample());
        assert_eq!(kept.len(), 4);
        assert_eq!(suppressed, 0);
    }

    #[test]
    fn test_patterns_suppress_matching_findings() {
        let baseline =
            Baseline::from_patterns([r"^\[BC\] REMOVED: Class ClassGone", "became internal$"]).unwrap();
        let (kept, suppressed) = baseline.apply(sample());

        assert_eq!(suppressed, 2);
        let messages: Vec<&str> = kept.iter().map(|c| c.message()).collect();
        assert_eq!(
            messages,
            vec!["Method Thing#methodGone() was removed", "Flag f() changed"]
        );
    }

    #[test]
    fn test_patterns_see_kind_and_break_tag() {
        let mut changes = sample();
        changes.push(Change::skipped("Could not analyze Foo: x"));

        let skipped_only = Baseline::from_patterns([r"^\[BC\] SKIPPED:"]).unwrap();
        let (kept, suppressed) = skipped_only.apply(changes.clone());
        assert_eq!(suppressed, 1);
        assert_eq!(kept.len(), 4);

        let non_breaking = Baseline::from_patterns([r"^[A-Z]+: "]).unwrap();
        let (kept, suppressed) = non_breaking.apply(changes);
        assert_eq!(suppressed, 1);
        assert!(kept.has_bc_breaks());
        assert!(kept.iter().all(|c| c.is_bc_break()));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let err = Baseline::from_patterns(["(unclosed"]).unwrap_err();
        assert!(matches!(err, BaselineError::InvalidPattern { .. }));
        assert!(err.to_string().contains("(unclosed"));
    }

    #[test]
    fn test_from_file_skips_comments_and_blanks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("baseline.txt");
        std::fs::write(&path, "# accepted for 2.0\n\nmethodGone\n  ClassGone  \n").unwrap();

        let baseline = Baseline::from_file(&path).unwrap();
        assert_eq!(baseline.len(), 2);
        assert!(baseline.matches("[BC] REMOVED: Class ClassGone has been deleted"));
        assert!(!baseline.matches("[BC] CHANGED: Function f() became internal"));
    }

    #[test]
    fn test_from_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Baseline::from_file(&dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, BaselineError::Io { .. }));
    }

    #[test]
    fn test_extend() {
        let a = Baseline::from_patterns(["a"]).unwrap();
        let b = Baseline::from_patterns(["b", "c"]).unwrap();
        assert_eq!(a.extend(b).len(), 3);
    }
}
