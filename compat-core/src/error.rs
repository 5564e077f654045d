//! Error types for compat-core.

use thiserror::Error;

/// Result type alias for snapshot loading.
pub type Result<T> = std::result::Result<T, SnapshotError>;

/// A rule could not evaluate a symbol pair.
///
/// Analysis faults never abort a comparison: the nearest isolation boundary
/// turns them into a skipped finding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// A type names a class-like the snapshot does not declare.
    #[error("class-like {name} is not declared in snapshot {snapshot}")]
    UnknownClass {
        /// Qualified name that failed to resolve.
        name: String,
        /// Label of the snapshot that was searched.
        snapshot: String,
    },

    /// A value could not be compared because it was never evaluated.
    #[error("expression `{expression}` cannot be evaluated")]
    UnevaluableExpression {
        /// The expression as written.
        expression: String,
    },
}

/// A snapshot could not be built; fatal to the run.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// IO error reading a symbol table.
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Symbol table is not valid JSON or does not match the schema.
    #[error("invalid symbol table: {0}")]
    Json(#[from] serde_json::Error),

    /// Two top-level symbols share a qualified name.
    #[error("{kind} {name} is declared more than once")]
    DuplicateSymbol {
        /// "class-like" or "function".
        kind: &'static str,
        /// The duplicated name.
        name: String,
    },

    /// A class-like is its own ancestor.
    #[error("inheritance cycle involving {name}")]
    InheritanceCycle {
        /// One class-like on the cycle.
        name: String,
    },
}

/// A declared type could not be parsed from its textual form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid type declaration `{input}`: {reason}")]
pub struct TypeParseError {
    /// The text that was parsed.
    pub input: String,
    /// Why it was rejected.
    pub reason: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AnalysisError::UnknownClass {
            name: "Foo".to_string(),
            snapshot: "new".to_string(),
        };
        assert!(err.to_string().contains("Foo"));
        assert!(err.to_string().contains("new"));

        let err = SnapshotError::DuplicateSymbol {
            kind: "function",
            name: "helper".to_string(),
        };
        assert_eq!(err.to_string(), "function helper is declared more than once");
    }
}
