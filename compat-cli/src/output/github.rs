//! GitHub Actions workflow commands.
//!
//! BC breaks become `::error` annotations, everything else `::notice`, so the
//! findings show up inline on the pull request diff.

use compat_core::Change;

pub struct GithubOutput;

impl GithubOutput {
    pub fn format_changes(changes: &[Change]) -> String {
        changes
            .iter()
            .map(Self::format_change)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_change(change: &Change) -> String {
        let level = if change.is_bc_break() { "error" } else { "notice" };

        let mut properties = Vec::new();
        if let Some(location) = change.location() {
            properties.push(format!("file={}", escape_property(&location.file)));
            if let Some(line) = location.line {
                properties.push(format!("line={}", line));
            }
            if let Some(column) = location.column {
                properties.push(format!("col={}", column));
            }
        }
        properties.push(format!("title={}", change.kind().tag()));

        format!(
            "::{} {}::{}",
            level,
            properties.join(","),
            escape_data(change.message())
        )
    }
}

fn escape_data(text: &str) -> String {
    text.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(text: &str) -> String {
    escape_data(text).replace(':', "%3A").replace(',', "%2C")
}

#[cfg(test)]
mod tests {
    use super::*;
    use compat_core::types::SourceLocation;

    #[test]
    fn test_error_with_location() {
        let location = SourceLocation::new("src/Thing.php", Some(4), Some(2));
        let change = Change::removed("Method Thing#gone() was removed", true)
            .with_location(Some(&location));

        assert_eq!(
            GithubOutput::format_changes(&[change]),
            "::error file=src/Thing.php,line=4,col=2,title=REMOVED::Method Thing#gone() was removed"
        );
    }

    #[test]
    fn test_notice_without_location() {
        let change = Change::removed("Parameter names of f() are no longer fixed", false);
        assert_eq!(
            GithubOutput::format_changes(&[change]),
            "::notice title=REMOVED::Parameter names of f() are no longer fixed"
        );
    }

    #[test]
    fn test_escaping() {
        assert_eq!(escape_data("100%\ndone"), "100%25%0Adone");
        assert_eq!(escape_property("C:\\a,b"), "C%3A\\a%2Cb");
    }
}
