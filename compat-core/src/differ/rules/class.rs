//! Rules over whole class-likes: kind, modifiers, ancestry and member removal.

use crate::differ::changes::{Change, Changes};
use crate::types::{ClassKind, ClassLike, Member, Symbol};

use super::{capitalize, rule, BoxedRule, RuleResult, Scope};

/// One rule per kind transition, e.g. class to interface.
///
/// Each reports only when the old side has kind `from` and the new side has
/// kind `to`, so applying all of them to a pair of equal kinds is a no-op.
pub fn kind_changed(from: ClassKind, to: ClassKind) -> BoxedRule<ClassLike> {
    rule(move |_scope, old: &ClassLike, new: &ClassLike| {
        if old.kind != from || new.kind != to {
            return Ok(Changes::empty());
        }

        let mut message = format!("{} {} became {}", from.label(), old.name, to.with_article());
        if to == ClassKind::Mixin {
            message.push_str(" and can no longer be used polymorphically");
        } else if from == ClassKind::Mixin {
            message.push_str(" and can now be used polymorphically");
        }

        Ok(Change::changed(message, true)
            .with_location(new.location())
            .into())
    })
}

/// All six kind transitions.
pub fn kind_change_rules() -> Vec<BoxedRule<ClassLike>> {
    use ClassKind::*;

    [
        (Class, Interface),
        (Class, Mixin),
        (Interface, Class),
        (Interface, Mixin),
        (Mixin, Class),
        (Mixin, Interface),
    ]
    .into_iter()
    .map(|(from, to)| kind_changed(from, to))
    .collect()
}

pub fn ancestor_removed(_scope: Scope<'_>, old: &ClassLike, new: &ClassLike) -> RuleResult {
    let removed: Vec<&str> = old
        .ancestors()
        .difference(new.ancestors())
        .map(String::as_str)
        .collect();

    if removed.is_empty() {
        return Ok(Changes::empty());
    }

    let message = format!(
        "These ancestors of {} {} have been removed: [{}]",
        old.kind,
        old.name,
        removed.join(", ")
    );
    Ok(Change::removed(message, true)
        .with_location(new.location())
        .into())
}

pub fn class_became_final(_scope: Scope<'_>, old: &ClassLike, new: &ClassLike) -> RuleResult {
    if old.is_final || !new.is_final {
        return Ok(Changes::empty());
    }

    Ok(Change::changed(format!("Class {} became final", old.name), true)
        .with_location(new.location())
        .into())
}

pub fn class_became_abstract(_scope: Scope<'_>, old: &ClassLike, new: &ClassLike) -> RuleResult {
    if old.is_abstract || !new.is_abstract {
        return Ok(Changes::empty());
    }

    Ok(Change::changed(format!("Class {} became abstract", old.name), true)
        .with_location(new.location())
        .into())
}

pub fn class_became_internal(_scope: Scope<'_>, old: &ClassLike, new: &ClassLike) -> RuleResult {
    if old.is_internal || !new.is_internal {
        return Ok(Changes::empty());
    }

    let message = format!("{} {} became internal", old.kind.label(), old.name);
    Ok(Change::changed(message, true)
        .with_location(new.location())
        .into())
}

/// Members a consumer can reach on `class`: public ones, plus protected ones
/// when the class can be extended.
fn is_exposed<M: Member>(class: &ClassLike, member: &M) -> bool {
    member.is_public() || (member.is_protected() && class.is_open())
}

/// One `Removed` per exposed old member without an accessible counterpart.
///
/// Members already marked internal are not part of the supported surface.
fn removed_members<'a, M, I>(
    old: &ClassLike,
    old_members: I,
    still_accessible: impl Fn(&str) -> bool,
) -> Changes
where
    M: Member + 'a,
    I: Iterator<Item = &'a M>,
{
    old_members
        .filter(|member| {
            is_exposed(old, *member) && !member.is_internal() && !still_accessible(member.name())
        })
        .map(|member| {
            let message = format!(
                "{} {} was removed",
                capitalize(member.noun()),
                member.display_name()
            );
            Change::removed(message, true).with_location(member.location())
        })
        .collect()
}

pub fn constant_removed(_scope: Scope<'_>, old: &ClassLike, new: &ClassLike) -> RuleResult {
    Ok(removed_members(old, old.constants.iter(), |name| {
        new.accessible_constants().any(|c| c.name == name)
    }))
}

pub fn property_removed(_scope: Scope<'_>, old: &ClassLike, new: &ClassLike) -> RuleResult {
    Ok(removed_members(old, old.properties.iter(), |name| {
        new.accessible_properties().any(|p| p.name == name)
    }))
}

/// Method names match case-insensitively.
pub fn method_removed(_scope: Scope<'_>, old: &ClassLike, new: &ClassLike) -> RuleResult {
    Ok(removed_members(old, old.methods.iter(), |name| {
        new.accessible_methods()
            .any(|m| m.name.eq_ignore_ascii_case(name))
    }))
}

/// Every method a new interface declares must now be implemented.
pub fn interface_method_added(
    _scope: Scope<'_>,
    old: &ClassLike,
    new: &ClassLike,
) -> RuleResult {
    Ok(new
        .methods
        .iter()
        .filter(|method| old.method(&method.name).is_none())
        .map(|method| {
            let message = format!(
                "Method {}() was added to interface {}",
                method.name, new.name
            );
            Change::added(message, true).with_location(method.location())
        })
        .collect())
}
