//! Signature rules shared by free functions and methods.
//!
//! Parameters are paired by position. Positions present on only one side are
//! handled by [`required_parameter_amount_increased`] and
//! [`parameter_removed`].

use crate::differ::changes::{Change, Changes};
use crate::differ::variance::{is_contravariant, is_covariant, ScopedType};
use crate::types::{display_type, FunctionLike, Parameter, Symbol};

use super::{RuleResult, Scope};

/// "Function foo()" or "Method Foo#bar()".
fn label(function: &FunctionLike) -> String {
    let noun = if function.is_method() { "Method" } else { "Function" };
    format!("{} {}", noun, function.display_name())
}

/// Parameters at positions present on both sides, in order.
fn shared_parameters<'a>(
    old: &'a FunctionLike,
    new: &'a FunctionLike,
) -> impl Iterator<Item = (&'a Parameter, &'a Parameter)> {
    old.parameters.iter().zip(&new.parameters)
}

fn by_reference(flag: bool) -> &'static str {
    if flag {
        "by-reference"
    } else {
        "by-value"
    }
}

pub fn required_parameter_amount_increased(
    _scope: Scope<'_>,
    old: &FunctionLike,
    new: &FunctionLike,
) -> RuleResult {
    let before = old.required_parameter_count();
    let after = new.required_parameter_count();
    if after <= before {
        return Ok(Changes::empty());
    }

    let message = format!(
        "The number of required arguments for {} increased from {} to {}",
        old.display_name(),
        before,
        after
    );
    Ok(Change::changed(message, true)
        .with_location(new.location())
        .into())
}

pub fn parameter_by_reference_changed(
    _scope: Scope<'_>,
    old: &FunctionLike,
    new: &FunctionLike,
) -> RuleResult {
    Ok(shared_parameters(old, new)
        .filter(|(a, b)| a.is_by_reference != b.is_by_reference)
        .map(|(a, b)| {
            let message = format!(
                "The parameter ${} of {} changed from {} to {}",
                a.name,
                old.display_name(),
                by_reference(a.is_by_reference),
                by_reference(b.is_by_reference)
            );
            Change::changed(message, true).with_location(new.location())
        })
        .collect())
}

pub fn return_by_reference_changed(
    _scope: Scope<'_>,
    old: &FunctionLike,
    new: &FunctionLike,
) -> RuleResult {
    if old.returns_by_reference == new.returns_by_reference {
        return Ok(Changes::empty());
    }

    let message = format!(
        "The return value of {} changed from {} to {}",
        old.display_name(),
        by_reference(old.returns_by_reference),
        by_reference(new.returns_by_reference)
    );
    Ok(Change::changed(message, true)
        .with_location(new.location())
        .into())
}

/// Every shared parameter must accept at least what it accepted before.
pub fn parameter_type_contravariance_changed(
    scope: Scope<'_>,
    old: &FunctionLike,
    new: &FunctionLike,
) -> RuleResult {
    let mut changes = Changes::empty();
    for (a, b) in shared_parameters(old, new) {
        let compatible = is_contravariant(
            ScopedType::new(a.declared_type.as_ref(), scope.old),
            ScopedType::new(b.declared_type.as_ref(), scope.new),
        )?;
        if compatible {
            continue;
        }

        let message = format!(
            "The parameter ${} of {} changed from {} to a non-contravariant {}",
            a.name,
            old.display_name(),
            display_type(a.declared_type.as_ref()),
            display_type(b.declared_type.as_ref())
        );
        changes.push(Change::changed(message, true).with_location(new.location()));
    }
    Ok(changes)
}

/// Strict variant for signatures that overriding code must repeat exactly.
pub fn parameter_type_changed(
    _scope: Scope<'_>,
    old: &FunctionLike,
    new: &FunctionLike,
) -> RuleResult {
    Ok(shared_parameters(old, new)
        .filter(|(a, b)| a.declared_type != b.declared_type)
        .map(|(a, b)| {
            let message = format!(
                "The parameter ${} of {} changed from {} to {}",
                a.name,
                old.display_name(),
                display_type(a.declared_type.as_ref()),
                display_type(b.declared_type.as_ref())
            );
            Change::changed(message, true).with_location(new.location())
        })
        .collect())
}

pub fn return_type_covariance_changed(
    scope: Scope<'_>,
    old: &FunctionLike,
    new: &FunctionLike,
) -> RuleResult {
    let compatible = is_covariant(
        ScopedType::new(old.return_type.as_ref(), scope.old),
        ScopedType::new(new.return_type.as_ref(), scope.new),
    )?;
    if compatible {
        return Ok(Changes::empty());
    }

    let message = format!(
        "The return type of {} changed from {} to the non-covariant {}",
        old.display_name(),
        display_type(old.return_type.as_ref()),
        display_type(new.return_type.as_ref())
    );
    Ok(Change::changed(message, true)
        .with_location(new.location())
        .into())
}

pub fn return_type_changed(
    _scope: Scope<'_>,
    old: &FunctionLike,
    new: &FunctionLike,
) -> RuleResult {
    if old.return_type == new.return_type {
        return Ok(Changes::empty());
    }

    let message = format!(
        "The return type of {} changed from {} to {}",
        old.display_name(),
        display_type(old.return_type.as_ref()),
        display_type(new.return_type.as_ref())
    );
    Ok(Change::changed(message, true)
        .with_location(new.location())
        .into())
}

/// Renamed parameters break callers passing arguments by name.
///
/// Functions marked "no named arguments" on either side are exempt; adding
/// the marker is itself a break, removing it is not.
pub fn parameter_name_changed(
    _scope: Scope<'_>,
    old: &FunctionLike,
    new: &FunctionLike,
) -> RuleResult {
    match (old.no_named_arguments, new.no_named_arguments) {
        (false, true) => {
            let message = format!(
                "The no-named-arguments marker was added to {}",
                old.display_name()
            );
            return Ok(Change::added(message, true)
                .with_location(new.location())
                .into());
        }
        (true, false) => {
            let message = format!(
                "The no-named-arguments marker was removed from {}",
                old.display_name()
            );
            return Ok(Change::removed(message, false)
                .with_location(new.location())
                .into());
        }
        (true, true) => return Ok(Changes::empty()),
        (false, false) => {}
    }

    Ok(shared_parameters(old, new)
        .filter(|(a, b)| a.name != b.name)
        .map(|(a, b)| {
            let message = format!(
                "Parameter {} of {} changed name from {} to {}",
                a.position,
                old.display_name(),
                a.name,
                b.name
            );
            Change::changed(message, true).with_location(new.location())
        })
        .collect())
}

/// Only defaults declared on both sides are compared.
pub fn parameter_default_value_changed(
    _scope: Scope<'_>,
    old: &FunctionLike,
    new: &FunctionLike,
) -> RuleResult {
    let mut changes = Changes::empty();
    for (a, b) in shared_parameters(old, new) {
        let (Some(before), Some(after)) = (&a.default, &b.default) else {
            continue;
        };
        if before.is_identical(after)? {
            continue;
        }

        let message = format!(
            "Default parameter value for parameter ${} of {} changed from {} to {}",
            a.name,
            old.display_name(),
            before,
            after
        );
        changes.push(Change::changed(message, true).with_location(new.location()));
    }
    Ok(changes)
}

/// Trailing parameters dropped from a signature that can be overridden.
///
/// An override written against the old signature still declares them.
pub fn parameter_removed(_scope: Scope<'_>, old: &FunctionLike, new: &FunctionLike) -> RuleResult {
    Ok(old
        .parameters
        .iter()
        .skip(new.parameters.len())
        .map(|parameter| {
            let message = format!(
                "The parameter ${} of {} was removed",
                parameter.name,
                old.display_name()
            );
            Change::removed(message, true).with_location(new.location())
        })
        .collect())
}

pub fn function_became_internal(
    _scope: Scope<'_>,
    old: &FunctionLike,
    new: &FunctionLike,
) -> RuleResult {
    if old.is_internal || !new.is_internal {
        return Ok(Changes::empty());
    }

    let message = format!("{} became internal", label(old));
    Ok(Change::changed(message, true)
        .with_location(new.location())
        .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::differ::changes::ChangeKind;
    use crate::differ::rules::fixtures::{empty, messages, scope, snapshots};
    use crate::error::AnalysisError;
    use crate::types::{Scalar, TypeDecl, Value};
    use serde_json::json;

    fn function(params: Vec<Parameter>) -> FunctionLike {
        let mut function = FunctionLike::new("f");
        function.parameters = params;
        for (position, parameter) in function.parameters.iter_mut().enumerate() {
            parameter.position = position;
        }
        function
    }

    fn param(name: &str) -> Parameter {
        Parameter::new(name)
    }

    fn optional(name: &str) -> Parameter {
        Parameter {
            default: Some(json!(null).into()),
            ..param(name)
        }
    }

    fn variadic(name: &str) -> Parameter {
        Parameter {
            is_variadic: true,
            ..param(name)
        }
    }

    fn typed(name: &str, ty: &str) -> Parameter {
        Parameter {
            declared_type: Some(ty.parse().unwrap()),
            ..param(name)
        }
    }

    #[test]
    fn test_required_parameter_amount_increased() {
        let snapshot = empty();
        let scope = scope(&snapshot, &snapshot);
        let one = function(vec![param("a")]);
        let two = function(vec![param("a"), param("b")]);

        assert_eq!(
            messages(required_parameter_amount_increased(scope, &one, &two)),
            vec!["The number of required arguments for f() increased from 1 to 2"]
        );
    }

    #[test]
    fn test_required_parameter_count_monotonicity() {
        let snapshot = empty();
        let scope = scope(&snapshot, &snapshot);
        let shapes = vec![
            function(vec![]),
            function(vec![param("a")]),
            function(vec![optional("a")]),
            function(vec![param("a"), optional("b")]),
            function(vec![optional("a"), param("b")]),
            function(vec![param("a"), variadic("rest")]),
            function(vec![param("a"), param("b"), param("c")]),
        ];

        for old in &shapes {
            for new in &shapes {
                let found = required_parameter_amount_increased(scope, old, new)
                    .unwrap()
                    .len();
                let expected =
                    usize::from(new.required_parameter_count() > old.required_parameter_count());
                assert_eq!(found, expected);
            }
        }
    }

    #[test]
    fn test_by_reference_changes() {
        let snapshot = empty();
        let scope = scope(&snapshot, &snapshot);
        let old = function(vec![param("a")]);
        let mut new = old.clone();
        new.parameters[0].is_by_reference = true;
        new.returns_by_reference = true;

        assert_eq!(
            messages(parameter_by_reference_changed(scope, &old, &new)),
            vec!["The parameter $a of f() changed from by-value to by-reference"]
        );
        assert_eq!(
            messages(return_by_reference_changed(scope, &old, &new)),
            vec!["The return value of f() changed from by-value to by-reference"]
        );
    }

    #[test]
    fn test_parameter_type_contravariance() {
        let (old_snapshot, new_snapshot) = snapshots(
            r#"{ "classes": [ { "name": "A" }, { "name": "B", "extends": ["A"] } ] }"#,
            r#"{ "classes": [ { "name": "A" }, { "name": "B", "extends": ["A"] } ] }"#,
        );
        let scope = scope(&old_snapshot, &new_snapshot);

        let old = function(vec![typed("x", "B"), typed("y", "int")]);
        let widened = function(vec![typed("x", "A"), typed("y", "?int")]);
        let narrowed = function(vec![typed("x", "B"), typed("y", "string")]);

        assert!(parameter_type_contravariance_changed(scope, &old, &widened)
            .unwrap()
            .is_empty());
        assert_eq!(
            messages(parameter_type_contravariance_changed(scope, &old, &narrowed)),
            vec!["The parameter $y of f() changed from int to a non-contravariant string"]
        );

        // Strict comparison reports the widening too.
        assert_eq!(parameter_type_changed(scope, &old, &widened).unwrap().len(), 2);
    }

    #[test]
    fn test_parameter_type_unknown_class_is_a_fault() {
        let snapshot = empty();
        let old = function(vec![typed("x", "Missing")]);
        let new = function(vec![typed("x", "Other")]);

        let err = parameter_type_contravariance_changed(scope(&snapshot, &snapshot), &old, &new)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::UnknownClass { .. }));
    }

    #[test]
    fn test_return_type_rules() {
        let snapshot = empty();
        let scope = scope(&snapshot, &snapshot);
        let mut old = function(vec![]);
        old.return_type = Some(TypeDecl::scalar(Scalar::Iterable));
        let mut array = old.clone();
        array.return_type = Some(TypeDecl::scalar(Scalar::Array));
        let mut nullable = old.clone();
        nullable.return_type = Some(TypeDecl::scalar(Scalar::Iterable).nullable());

        assert!(return_type_covariance_changed(scope, &old, &array)
            .unwrap()
            .is_empty());
        assert_eq!(
            messages(return_type_covariance_changed(scope, &old, &nullable)),
            vec!["The return type of f() changed from iterable to the non-covariant ?iterable"]
        );
        assert_eq!(
            messages(return_type_changed(scope, &old, &array)),
            vec!["The return type of f() changed from iterable to array"]
        );
    }

    #[test]
    fn test_parameter_name_changed() {
        let snapshot = empty();
        let scope = scope(&snapshot, &snapshot);
        let old = function(vec![param("a"), param("b")]);
        let renamed = function(vec![param("a"), param("c")]);

        assert_eq!(
            messages(parameter_name_changed(scope, &old, &renamed)),
            vec!["Parameter 1 of f() changed name from b to c"]
        );

        let mut marked = renamed.clone();
        marked.no_named_arguments = true;
        let changes = parameter_name_changed(scope, &old, &marked).unwrap();
        let change = changes.iter().next().unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(change.kind(), ChangeKind::Added);
        assert!(change.is_bc_break());

        let changes = parameter_name_changed(scope, &marked, &old).unwrap();
        let change = changes.iter().next().unwrap();
        assert_eq!(change.kind(), ChangeKind::Removed);
        assert!(!change.is_bc_break());

        assert!(parameter_name_changed(scope, &marked, &marked).unwrap().is_empty());
    }

    #[test]
    fn test_parameter_default_value_changed() {
        let snapshot = empty();
        let scope = scope(&snapshot, &snapshot);
        let with_default = |value: serde_json::Value| {
            function(vec![Parameter {
                default: Some(value.into()),
                ..param("a")
            }])
        };

        assert_eq!(
            messages(parameter_default_value_changed(
                scope,
                &with_default(json!("x")),
                &with_default(json!("y"))
            )),
            vec![r#"Default parameter value for parameter $a of f() changed from "x" to "y""#]
        );
        // Adding or dropping a default is governed by the required count.
        assert!(parameter_default_value_changed(scope, &function(vec![param("a")]), &with_default(json!(1)))
            .unwrap()
            .is_empty());

        let mut unevaluable = with_default(json!(1));
        unevaluable.parameters[0].default = Some(Value::Expression("PHP_INT_MAX".to_string()));
        assert!(parameter_default_value_changed(scope, &with_default(json!(1)), &unevaluable).is_err());
    }

    #[test]
    fn test_parameter_removed() {
        let snapshot = empty();
        let scope = scope(&snapshot, &snapshot);
        let old = function(vec![param("a"), param("something")]);
        let new = function(vec![param("a")]);

        let changes = parameter_removed(scope, &old, &new).unwrap();
        assert_eq!(changes.len(), 1);
        let change = changes.iter().next().unwrap();
        assert_eq!(change.kind(), ChangeKind::Removed);
        assert_eq!(change.message(), "The parameter $something of f() was removed");
        assert!(parameter_removed(scope, &new, &old).unwrap().is_empty());
    }

    #[test]
    fn test_function_became_internal() {
        let snapshot = empty();
        let scope = scope(&snapshot, &snapshot);
        let old = function(vec![]);
        let mut new = old.clone();
        new.is_internal = true;

        assert_eq!(
            messages(function_became_internal(scope, &old, &new)),
            vec!["Function f() became internal"]
        );
        new.declaring_class = Some("C".to_string());
        let mut old_method = old.clone();
        old_method.declaring_class = Some("C".to_string());
        assert_eq!(
            messages(function_became_internal(scope, &old_method, &new)),
            vec!["Method C#f() became internal"]
        );
    }
}
