//! Table output formatting using the `tabled` crate

use super::{truncate, OutputConfig};
use compat_core::types::SourceLocation;
use compat_core::Change;
use tabled::{
    builder::Builder,
    settings::{object::Columns, style::Style, Modify, Width},
};

const LOCATION_WIDTH: usize = 30;

/// Table output formatter
pub struct TableOutput;

impl TableOutput {
    /// One row per finding: break marker, kind, message and location.
    pub fn format_changes(changes: &[Change], config: &OutputConfig) -> String {
        if changes.is_empty() {
            return "(no changes)".to_string();
        }

        let mut builder = Builder::default();
        builder.push_record(["BC", "Kind", "Message", "Location"]);
        for change in changes {
            builder.push_record([
                (if change.is_bc_break() { "yes" } else { "no" }).to_string(),
                change.kind().as_str().to_string(),
                change.message().to_string(),
                change
                    .location()
                    .map(|l| {
                        let location = format_location(l);
                        if config.should_truncate() {
                            truncate(&location, LOCATION_WIDTH)
                        } else {
                            location
                        }
                    })
                    .unwrap_or_default(),
            ]);
        }

        let mut table = builder.build();
        if config.compact {
            table.with(Style::blank());
        } else {
            table.with(Style::rounded());
        }

        if config.should_truncate() {
            // Message column gets whatever the fixed columns and borders leave.
            let fixed = 3 + 7 + LOCATION_WIDTH + 13;
            let message_width = config.effective_width().saturating_sub(fixed).max(20);
            table.with(Modify::new(Columns::single(2)).with(Width::wrap(message_width)));
        }

        table.to_string()
    }
}

/// `file:line:column`, omitting the parts that are unknown.
pub fn format_location(location: &SourceLocation) -> String {
    match (location.line, location.column) {
        (Some(line), Some(column)) => format!("{}:{}:{}", location.file, line, column),
        (Some(line), None) => format!("{}:{}", location.file, line),
        _ => location.file.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;

    fn config() -> OutputConfig {
        OutputConfig::new(OutputFormat::Table).without_truncation()
    }

    #[test]
    fn test_format_location() {
        assert_eq!(
            format_location(&SourceLocation::new("a.php", Some(3), Some(7))),
            "a.php:3:7"
        );
        assert_eq!(format_location(&SourceLocation::new("a.php", Some(3), None)), "a.php:3");
        assert_eq!(format_location(&SourceLocation::new("a.php", None, None)), "a.php");
    }

    #[test]
    fn test_empty_changes() {
        assert_eq!(TableOutput::format_changes(&[], &config()), "(no changes)");
    }

    #[test]
    fn test_rows() {
        let location = SourceLocation::new("src/Thing.php", Some(12), None);
        let changes = vec![
            Change::removed("Method Thing#methodGone() was removed", true)
                .with_location(Some(&location)),
            Change::removed("Flag removed", false),
        ];
        let output = TableOutput::format_changes(&changes, &config());

        assert!(output.contains("Message"));
        assert!(output.contains("Method Thing#methodGone() was removed"));
        assert!(output.contains("src/Thing.php:12"));
        assert!(output.contains("removed"));
        assert!(output.contains("no"));
    }
}
