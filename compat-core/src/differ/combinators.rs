//! Generic wrappers that gate, compose, pair and isolate rules.
//!
//! Every combinator takes boxed rules and returns a boxed rule, so policies
//! read as short pipelines:
//!
//! ```
//! use compat_core::differ::combinators::{all, exclude_if, isolate};
//! use compat_core::differ::rules::member::{scope_changed, visibility_reduced};
//! use compat_core::types::{Member, Property};
//!
//! let property_rules = isolate(exclude_if(
//!     |p: &Property| p.is_internal(),
//!     all(vec![visibility_reduced(), scope_changed()]),
//! ));
//! # let _ = property_rules;
//! ```

use crate::differ::changes::{Change, Changes};
use crate::differ::rules::{rule, BoxedRule, Rule, RuleResult};
use crate::error::AnalysisError;
use crate::types::{ClassConstant, ClassKind, ClassLike, FunctionLike, Property, Symbol};

/// Run every rule and concatenate their changes in order.
///
/// A failing rule does not stop its siblings and does not discard what they
/// found. The first failure becomes one skipped change for `old`, placed where
/// that rule's changes would have been; later failures are only logged.
pub fn all<T: Symbol + ?Sized + 'static>(rules: Vec<BoxedRule<T>>) -> BoxedRule<T> {
    rule(move |scope, old: &T, new: &T| {
        let mut changes = Changes::empty();
        let mut faulted = false;

        for r in &rules {
            match r.check(scope, old, new) {
                Ok(found) => changes = changes.merge(found),
                Err(err) if faulted => {
                    tracing::debug!(symbol = %old.display_name(), error = %err, "further analysis failure");
                }
                Err(err) => {
                    faulted = true;
                    changes.push(skipped(old, &err));
                }
            }
        }

        Ok(changes)
    })
}

/// Run `inner` only when `predicate` holds for the old descriptor.
pub fn only_if<T, P>(predicate: P, inner: BoxedRule<T>) -> BoxedRule<T>
where
    T: ?Sized + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    rule(move |scope, old: &T, new: &T| {
        if predicate(old) {
            inner.check(scope, old, new)
        } else {
            Ok(Changes::empty())
        }
    })
}

/// Skip `inner` when `predicate` holds for the old descriptor.
pub fn exclude_if<T, P>(predicate: P, inner: BoxedRule<T>) -> BoxedRule<T>
where
    T: ?Sized + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    only_if(move |old: &T| !predicate(old), inner)
}

/// Skip `inner` when `predicate` holds for either descriptor.
pub fn exclude_if_either<T, P>(predicate: P, inner: BoxedRule<T>) -> BoxedRule<T>
where
    T: ?Sized + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    rule(move |scope, old: &T, new: &T| {
        if predicate(old) || predicate(new) {
            Ok(Changes::empty())
        } else {
            inner.check(scope, old, new)
        }
    })
}

/// Turn an analysis failure into a single skipped change naming the symbol.
pub fn isolate<T>(inner: BoxedRule<T>) -> BoxedRule<T>
where
    T: Symbol + 'static,
{
    rule(move |scope, old: &T, new: &T| match inner.check(scope, old, new) {
        Ok(changes) => Ok(changes),
        Err(err) => Ok(skipped(old, &err).into()),
    })
}

/// The change reported for a symbol that could not be analyzed.
pub(crate) fn skipped<T: Symbol + ?Sized>(symbol: &T, err: &AnalysisError) -> Change {
    let name = symbol.display_name();
    tracing::warn!(symbol = %name, error = %err, "skipping analysis");
    Change::skipped(format!("Could not analyze {}: {}", name, err)).with_location(symbol.location())
}

/// Run a class rule on pairs where both sides are of `kind`.
///
/// Interfaces and mixins share most member rules with classes; this lets a
/// policy reuse them without duplicating the rule definitions.
pub fn reuse_class_rules_for(kind: ClassKind, inner: BoxedRule<ClassLike>) -> BoxedRule<ClassLike> {
    rule(move |scope, old: &ClassLike, new: &ClassLike| {
        if old.kind == kind && new.kind == kind {
            inner.check(scope, old, new)
        } else {
            Ok(Changes::empty())
        }
    })
}

/// Lift a member rule to a class rule over members present on both sides.
///
/// Members are visited in the old class's declaration order. A member whose
/// analysis fails is reported as skipped without affecting the others.
fn each_shared<M, F>(
    lookup: F,
    members: fn(&ClassLike) -> &[M],
    inner: BoxedRule<M>,
) -> BoxedRule<ClassLike>
where
    M: Symbol + 'static,
    F: for<'a> Fn(&'a ClassLike, &M) -> Option<&'a M> + Send + Sync + 'static,
{
    rule(move |scope, old: &ClassLike, new: &ClassLike| {
        let mut changes = Changes::empty();
        for old_member in members(old) {
            if let Some(new_member) = lookup(new, old_member) {
                let found = inner
                    .check(scope, old_member, new_member)
                    .unwrap_or_else(|err| skipped(old_member, &err).into());
                changes = changes.merge(found);
            }
        }
        Ok(changes)
    })
}

pub fn each_shared_constant(inner: BoxedRule<ClassConstant>) -> BoxedRule<ClassLike> {
    each_shared(
        |class, member: &ClassConstant| class.constant(&member.name),
        |class| class.constants.as_slice(),
        inner,
    )
}

pub fn each_shared_property(inner: BoxedRule<Property>) -> BoxedRule<ClassLike> {
    each_shared(
        |class, member: &Property| class.property(&member.name),
        |class| class.properties.as_slice(),
        inner,
    )
}

/// Methods are paired case-insensitively.
pub fn each_shared_method(inner: BoxedRule<FunctionLike>) -> BoxedRule<ClassLike> {
    each_shared(
        |class, member: &FunctionLike| class.method(&member.name),
        |class| class.methods.as_slice(),
        inner,
    )
}
