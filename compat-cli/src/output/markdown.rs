//! Markdown output, suitable for pull request comments.

use super::table::format_location;
use compat_core::Change;

pub struct MarkdownOutput;

impl MarkdownOutput {
    pub fn format_changes(changes: &[Change]) -> String {
        if changes.is_empty() {
            return "_No changes._".to_string();
        }

        let mut output = String::from("| BC | Kind | Message | Location |\n|:--:|------|---------|----------|\n");
        for change in changes {
            let location = change
                .location()
                .map(|l| format!("`{}`", format_location(l)))
                .unwrap_or_default();
            output.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                if change.is_bc_break() { ":x:" } else { "" },
                change.kind().as_str(),
                escape(change.message()),
                location
            ));
        }
        output
    }
}

/// Escape characters that would break a table cell.
fn escape(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(MarkdownOutput::format_changes(&[]), "_No changes._");
    }

    #[test]
    fn test_rows_and_escaping() {
        let changes = vec![
            Change::changed("Type of property C#p changed from int|null to int", true),
            Change::removed("Flag removed", false),
        ];
        let output = MarkdownOutput::format_changes(&changes);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[2],
            "| :x: | changed | Type of property C#p changed from int\\|null to int |  |"
        );
        assert_eq!(lines[3], "|  | removed | Flag removed |  |");
    }
}
