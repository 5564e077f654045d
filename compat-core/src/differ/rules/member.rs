//! Rules shared by constants, properties and methods, plus the
//! constant- and property-specific value and type checks.

use crate::differ::changes::{Change, Changes};
use crate::types::{display_type, ClassConstant, Member, Property, Symbol};

use super::{capitalize, rule, BoxedRule, RuleResult, Scope};

fn member_label<M: Member>(member: &M) -> String {
    format!("{} {}", capitalize(member.noun()), member.display_name())
}

/// Narrowed visibility, e.g. public to protected.
pub fn visibility_reduced<M: Member + 'static>() -> BoxedRule<M> {
    rule(|_scope, old: &M, new: &M| {
        if old.visibility() >= new.visibility() {
            return Ok(Changes::empty());
        }

        let message = format!(
            "{} visibility reduced from {} to {}",
            member_label(old),
            old.visibility(),
            new.visibility()
        );
        Ok(Change::changed(message, true)
            .with_location(new.location())
            .into())
    })
}

/// Static and instance members are called differently, so either direction breaks.
pub fn scope_changed<M: Member + 'static>() -> BoxedRule<M> {
    rule(|_scope, old: &M, new: &M| {
        if old.is_static() == new.is_static() {
            return Ok(Changes::empty());
        }

        let describe = |is_static: bool| if is_static { "static" } else { "instance" };
        let message = format!(
            "{} changed scope from {} to {}",
            member_label(old),
            describe(old.is_static()),
            describe(new.is_static())
        );
        Ok(Change::changed(message, true)
            .with_location(new.location())
            .into())
    })
}

pub fn member_became_internal<M: Member + 'static>() -> BoxedRule<M> {
    rule(|_scope, old: &M, new: &M| {
        if old.is_internal() || !new.is_internal() {
            return Ok(Changes::empty());
        }

        let message = format!("{} became internal", member_label(old));
        Ok(Change::changed(message, true)
            .with_location(new.location())
            .into())
    })
}

pub fn constant_value_changed(
    _scope: Scope<'_>,
    old: &ClassConstant,
    new: &ClassConstant,
) -> RuleResult {
    if old.value.is_identical(&new.value)? {
        return Ok(Changes::empty());
    }

    let message = format!(
        "Value of constant {} changed from {} to {}",
        old.display_name(),
        old.value,
        new.value
    );
    Ok(Change::changed(message, true)
        .with_location(new.location())
        .into())
}

/// Reports a changed, added or removed default value.
pub fn property_default_value_changed(
    _scope: Scope<'_>,
    old: &Property,
    new: &Property,
) -> RuleResult {
    let message = match (&old.default, &new.default) {
        (None, None) => return Ok(Changes::empty()),
        (Some(a), Some(b)) => {
            if a.is_identical(b)? {
                return Ok(Changes::empty());
            }
            format!(
                "Property {} changed default value from {} to {}",
                old.display_name(),
                a,
                b
            )
        }
        (None, Some(b)) => format!(
            "Property {} gained a default value of {}",
            old.display_name(),
            b
        ),
        (Some(a), None) => format!(
            "Property {} lost its default value of {}",
            old.display_name(),
            a
        ),
    };

    Ok(Change::changed(message, true)
        .with_location(new.location())
        .into())
}

/// Properties are read and written, so any change of declared type breaks.
pub fn property_type_changed(_scope: Scope<'_>, old: &Property, new: &Property) -> RuleResult {
    if old.declared_type == new.declared_type {
        return Ok(Changes::empty());
    }

    let message = format!(
        "Type of property {} changed from {} to {}",
        old.display_name(),
        display_type(old.declared_type.as_ref()),
        display_type(new.declared_type.as_ref())
    );
    Ok(Change::changed(message, true)
        .with_location(new.location())
        .into())
}

/// Text comparison of documented types, when neither side declares one.
///
/// Union members are compared as a set, ignoring whitespace and order.
pub fn property_documented_type_changed(
    _scope: Scope<'_>,
    old: &Property,
    new: &Property,
) -> RuleResult {
    if old.declared_type.is_some() || new.declared_type.is_some() {
        return Ok(Changes::empty());
    }
    let (Some(old_doc), Some(new_doc)) = (&old.documented_type, &new.documented_type) else {
        return Ok(Changes::empty());
    };
    if normalize_documented_type(old_doc) == normalize_documented_type(new_doc) {
        return Ok(Changes::empty());
    }

    let message = format!(
        "Documented type of property {} changed from {} to {}",
        old.display_name(),
        old_doc.trim(),
        new_doc.trim()
    );
    Ok(Change::changed(message, true)
        .with_location(new.location())
        .into())
}

fn normalize_documented_type(text: &str) -> Vec<String> {
    let mut parts: Vec<String> = text
        .split('|')
        .map(|part| part.split_whitespace().collect::<String>())
        .filter(|part| !part.is_empty())
        .collect();
    parts.sort();
    parts.dedup();
    parts
}
