//! Method modifiers that only matter to subclasses.

use crate::differ::changes::{Change, Changes};
use crate::types::{FunctionLike, Symbol};

use super::{RuleResult, Scope};

pub fn method_became_final(_scope: Scope<'_>, old: &FunctionLike, new: &FunctionLike) -> RuleResult {
    if old.is_final || !new.is_final {
        return Ok(Changes::empty());
    }

    let message = format!("Method {} became final", old.display_name());
    Ok(Change::changed(message, true)
        .with_location(new.location())
        .into())
}

/// Concrete to abstract. The reverse direction is not reported.
pub fn method_concreteness_changed(
    _scope: Scope<'_>,
    old: &FunctionLike,
    new: &FunctionLike,
) -> RuleResult {
    if old.is_abstract || !new.is_abstract {
        return Ok(Changes::empty());
    }

    let message = format!("Method {} became abstract", old.display_name());
    Ok(Change::changed(message, true)
        .with_location(new.location())
        .into())
}
