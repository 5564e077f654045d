//! Atomic compatibility rules.
//!
//! A rule inspects one old/new descriptor pair of the same kind and reports
//! zero or more [`Change`]s. Rules are independent of each other; the
//! [`combinators`](super::combinators) module composes them into policies.
//!
//! Every rule is a plain function or closure wrapped with [`rule`]:
//!
//! ```
//! use compat_core::differ::{rule, BoxedRule, Change, Changes};
//! use compat_core::types::ClassLike;
//!
//! let became_final: BoxedRule<ClassLike> = rule(|_scope, old: &ClassLike, new: &ClassLike| {
//!     if !old.is_final && new.is_final {
//!         return Ok(Changes::from(Change::changed(format!("{} became final", new.name), true)));
//!     }
//!     Ok(Changes::empty())
//! });
//! # let _ = became_final;
//! ```
//!
//! [`Change`]: super::changes::Change

pub mod class;
pub mod function;
pub mod member;
pub mod method;

use std::marker::PhantomData;

use crate::differ::changes::Changes;
use crate::error::AnalysisError;
use crate::snapshot::Snapshot;

/// Outcome of a single rule invocation.
pub type RuleResult = Result<Changes, AnalysisError>;

/// The two snapshots a descriptor pair was read from.
#[derive(Clone, Copy, Debug)]
pub struct Scope<'a> {
    pub old: &'a Snapshot,
    pub new: &'a Snapshot,
}

impl<'a> Scope<'a> {
    pub fn new(old: &'a Snapshot, new: &'a Snapshot) -> Self {
        Self { old, new }
    }
}

/// A compatibility check over one descriptor kind.
pub trait Rule<T: ?Sized>: Send + Sync {
    fn check(&self, scope: Scope<'_>, old: &T, new: &T) -> RuleResult;
}

pub type BoxedRule<T> = Box<dyn Rule<T>>;

impl<T: ?Sized> Rule<T> for BoxedRule<T> {
    fn check(&self, scope: Scope<'_>, old: &T, new: &T) -> RuleResult {
        (**self).check(scope, old, new)
    }
}

struct FnRule<F, T: ?Sized> {
    f: F,
    _descriptor: PhantomData<fn(&T)>,
}

impl<F, T> Rule<T> for FnRule<F, T>
where
    T: ?Sized,
    F: Fn(Scope<'_>, &T, &T) -> RuleResult + Send + Sync,
{
    fn check(&self, scope: Scope<'_>, old: &T, new: &T) -> RuleResult {
        (self.f)(scope, old, new)
    }
}

/// Box a function or closure as a rule.
pub fn rule<T, F>(f: F) -> BoxedRule<T>
where
    T: ?Sized + 'static,
    F: Fn(Scope<'_>, &T, &T) -> RuleResult + Send + Sync + 'static,
{
    Box::new(FnRule {
        f,
        _descriptor: PhantomData,
    })
}

/// Uppercase the first letter of a message noun.
pub(crate) fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::Scope;
    use crate::snapshot::Snapshot;

    /// Parse a pair of snapshots from JSON symbol tables.
    pub fn snapshots(old: &str, new: &str) -> (Snapshot, Snapshot) {
        (
            Snapshot::from_json_str("old", old).unwrap(),
            Snapshot::from_json_str("new", new).unwrap(),
        )
    }

    pub fn empty() -> Snapshot {
        Snapshot::from_json_str("empty", "{}").unwrap()
    }

    pub fn scope<'a>(old: &'a Snapshot, new: &'a Snapshot) -> Scope<'a> {
        Scope::new(old, new)
    }

    /// Messages of a rule result, in order.
    pub fn messages(result: super::RuleResult) -> Vec<String> {
        result
            .unwrap()
            .iter()
            .map(|c| c.message().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::differ::changes::Change;
    use crate::types::ClassLike;

    #[test]
    fn test_closure_rule() {
        let snapshot = fixtures::empty();
        let scope = fixtures::scope(&snapshot, &snapshot);
        let renamed = rule(|_scope, old: &ClassLike, new: &ClassLike| {
            if old.name == new.name {
                Ok(Changes::empty())
            } else {
                Ok(Change::changed("renamed", false).into())
            }
        });

        let a = ClassLike::default();
        let mut b = ClassLike::default();
        assert!(renamed.check(scope, &a, &b).unwrap().is_empty());
        b.name = "B".to_string();
        assert_eq!(renamed.check(scope, &a, &b).unwrap().len(), 1);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("method"), "Method");
        assert_eq!(capitalize(""), "");
    }
}
