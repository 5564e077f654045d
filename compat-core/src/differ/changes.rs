//! Change records and their merge algebra.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::SourceLocation;

/// Kind of a finding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    Changed,
    /// The symbol could not be analyzed.
    Skipped,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
            ChangeKind::Changed => "changed",
            ChangeKind::Skipped => "skipped",
        }
    }

    /// Uppercase tag used by text renderers.
    pub fn tag(&self) -> &'static str {
        match self {
            ChangeKind::Added => "ADDED",
            ChangeKind::Removed => "REMOVED",
            ChangeKind::Changed => "CHANGED",
            ChangeKind::Skipped => "SKIPPED",
        }
    }
}

/// A single finding. Immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    kind: ChangeKind,
    message: String,
    is_bc_break: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<SourceLocation>,
}

impl Change {
    fn new(kind: ChangeKind, message: impl Into<String>, is_bc_break: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            is_bc_break,
            location: None,
        }
    }

    pub fn added(message: impl Into<String>, is_bc_break: bool) -> Self {
        Self::new(ChangeKind::Added, message, is_bc_break)
    }

    pub fn removed(message: impl Into<String>, is_bc_break: bool) -> Self {
        Self::new(ChangeKind::Removed, message, is_bc_break)
    }

    pub fn changed(message: impl Into<String>, is_bc_break: bool) -> Self {
        Self::new(ChangeKind::Changed, message, is_bc_break)
    }

    /// A symbol that could not be analyzed is always treated as a break.
    pub fn skipped(message: impl Into<String>) -> Self {
        Self::new(ChangeKind::Skipped, message, true)
    }

    /// Same change, pointing at `location`.
    pub fn with_location(mut self, location: Option<&SourceLocation>) -> Self {
        self.location = location.cloned();
        self
    }

    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_bc_break(&self) -> bool {
        self.is_bc_break
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_bc_break {
            f.write_str("[BC] ")?;
        }
        write!(f, "{}: {}", self.kind.tag(), self.message)
    }
}

/// Ordered sequence of findings, in discovery order.
///
/// Never deduplicated or sorted: consumers rely on the order matching rule
/// application order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Changes(Vec<Change>);

impl Changes {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn of(changes: impl IntoIterator<Item = Change>) -> Self {
        Self(changes.into_iter().collect())
    }

    /// Concatenate, keeping `self` first.
    pub fn merge(mut self, mut other: Changes) -> Self {
        if self.0.is_empty() {
            return other;
        }
        self.0.append(&mut other.0);
        self
    }

    pub fn push(&mut self, change: Change) {
        self.0.push(change);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Change> {
        self.0.iter()
    }

    pub fn has_bc_breaks(&self) -> bool {
        self.0.iter().any(Change::is_bc_break)
    }

    /// Keep only changes matching `keep`, preserving order.
    pub fn retain(mut self, keep: impl FnMut(&Change) -> bool) -> Self {
        self.0.retain(keep);
        self
    }

    pub fn as_slice(&self) -> &[Change] {
        &self.0
    }
}

impl From<Change> for Changes {
    fn from(change: Change) -> Self {
        Self(vec![change])
    }
}

impl FromIterator<Change> for Changes {
    fn from_iter<I: IntoIterator<Item = Change>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Change> for Changes {
    fn extend<I: IntoIterator<Item = Change>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for Changes {
    type Item = Change;
    type IntoIter = std::vec::IntoIter<Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Changes {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Counts per change kind for a finished comparison.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub added: u32,
    pub removed: u32,
    pub changed: u32,
    pub skipped: u32,
    pub bc_breaks: u32,
}

impl ChangeSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, change: &Change) {
        match change.kind() {
            ChangeKind::Added => self.added += 1,
            ChangeKind::Removed => self.removed += 1,
            ChangeKind::Changed => self.changed += 1,
            ChangeKind::Skipped => self.skipped += 1,
        }
        if change.is_bc_break() {
            self.bc_breaks += 1;
        }
    }

    pub fn total(&self) -> u32 {
        self.added + self.removed + self.changed + self.skipped
    }

    /// Generate human-readable summary string.
    pub fn text(&self) -> String {
        if self.total() == 0 {
            return "No changes".to_string();
        }

        let mut parts = Vec::new();
        for (count, label) in [
            (self.added, "added"),
            (self.removed, "removed"),
            (self.changed, "changed"),
            (self.skipped, "skipped"),
        ] {
            if count > 0 {
                parts.push(format!("{} {}", count, label));
            }
        }

        format!("{} ({} BC breaks)", parts.join(", "), self.bc_breaks)
    }
}

impl<'a> FromIterator<&'a Change> for ChangeSummary {
    fn from_iter<I: IntoIterator<Item = &'a Change>>(iter: I) -> Self {
        let mut summary = Self::new();
        for change in iter {
            summary.record(change);
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_kind_as_str() {
        assert_eq!(ChangeKind::Added.as_str(), "added");
        assert_eq!(ChangeKind::Removed.as_str(), "removed");
        assert_eq!(ChangeKind::Changed.as_str(), "changed");
        assert_eq!(ChangeKind::Skipped.as_str(), "skipped");
    }

    #[test]
    fn test_skipped_is_always_breaking() {
        let change = Change::skipped("could not analyze Foo");
        assert_eq!(change.kind(), ChangeKind::Skipped);
        assert!(change.is_bc_break());
    }

    #[test]
    fn test_change_with_location() {
        let loc = SourceLocation::new("src/Foo.php", Some(3), None);
        let change = Change::changed("Foo became final", true).with_location(Some(&loc));
        assert_eq!(change.location(), Some(&loc));
        assert_eq!(change.to_string(), "[BC] CHANGED: Foo became final");
    }

    #[test]
    fn test_merge_preserves_order() {
        let a = Changes::of([Change::added("a", false), Change::removed("b", true)]);
        let b = Changes::of([Change::changed("c", true)]);

        let merged = a.merge(b);
        let messages: Vec<&str> = merged.iter().map(Change::message).collect();
        assert_eq!(messages, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_merge_identity() {
        let a = Changes::of([Change::added("a", false)]);
        assert_eq!(Changes::empty().merge(a.clone()), a);
        assert_eq!(a.clone().merge(Changes::empty()), a);
    }

    #[test]
    fn test_merge_does_not_deduplicate() {
        let change = Change::changed("same", true);
        let merged = Changes::from(change.clone()).merge(Changes::from(change));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_has_bc_breaks() {
        assert!(!Changes::empty().has_bc_breaks());
        assert!(!Changes::of([Change::added("a", false)]).has_bc_breaks());
        assert!(Changes::of([Change::added("a", false), Change::skipped("b")]).has_bc_breaks());
    }

    #[test]
    fn test_summary_record() {
        let changes = Changes::of([
            Change::added("a", false),
            Change::removed("b", true),
            Change::skipped("c"),
        ]);
        let summary: ChangeSummary = changes.iter().collect();

        assert_eq!(summary.added, 1);
        assert_eq!(summary.removed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.bc_breaks, 2);
        assert_eq!(summary.text(), "1 added, 1 removed, 1 skipped (2 BC breaks)");
    }

    #[test]
    fn test_summary_text_no_changes() {
        assert_eq!(ChangeSummary::default().text(), "No changes");
    }

    #[test]
    fn test_changes_serialize_as_list() {
        let changes = Changes::of([Change::removed("Class Foo has been deleted", true)]);
        let json = serde_json::to_value(&changes).unwrap();
        assert_eq!(json[0]["kind"], "removed");
        assert_eq!(json[0]["is_bc_break"], true);
    }
}
