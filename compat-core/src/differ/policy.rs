//! The standard rule set for each symbol kind.
//!
//! Classes check public members always and protected members only while the
//! class can be extended. Methods a consumer may override must keep their
//! exact signature; everything else is checked by type variance.
//! Interfaces and mixins reuse the class member rules.

use crate::differ::changes::Changes;
use crate::differ::combinators::{
    all, each_shared_constant, each_shared_method, each_shared_property, exclude_if,
    exclude_if_either, only_if, reuse_class_rules_for, skipped,
};
use crate::differ::rules::class::{
    ancestor_removed, class_became_abstract, class_became_final, class_became_internal,
    constant_removed, interface_method_added, kind_change_rules, method_removed, property_removed,
};
use crate::differ::rules::function::{
    function_became_internal, parameter_by_reference_changed, parameter_default_value_changed,
    parameter_name_changed, parameter_removed, parameter_type_changed,
    parameter_type_contravariance_changed, required_parameter_amount_increased,
    return_by_reference_changed, return_type_changed, return_type_covariance_changed,
};
use crate::differ::rules::member::{
    constant_value_changed, member_became_internal, property_default_value_changed,
    property_documented_type_changed, property_type_changed, scope_changed, visibility_reduced,
};
use crate::differ::rules::method::{method_became_final, method_concreteness_changed};
use crate::differ::rules::{rule, BoxedRule, Rule, Scope};
use crate::types::{ClassConstant, ClassKind, ClassLike, FunctionLike, Member, Property};

/// Composed rules for top-level symbols.
pub struct Policies {
    class_like: BoxedRule<ClassLike>,
    function: BoxedRule<FunctionLike>,
}

impl Policies {
    pub fn new(class_like: BoxedRule<ClassLike>, function: BoxedRule<FunctionLike>) -> Self {
        Self {
            class_like,
            function,
        }
    }

    pub fn standard() -> Self {
        Self::new(class_like_policy(), function_policy())
    }

    /// Check a class-like pair. Analysis failures become a skipped change.
    pub fn check_class_like(&self, scope: Scope<'_>, old: &ClassLike, new: &ClassLike) -> Changes {
        self.class_like
            .check(scope, old, new)
            .unwrap_or_else(|err| skipped(old, &err).into())
    }

    /// Check a free function pair. Analysis failures become a skipped change.
    pub fn check_function(
        &self,
        scope: Scope<'_>,
        old: &FunctionLike,
        new: &FunctionLike,
    ) -> Changes {
        self.function
            .check(scope, old, new)
            .unwrap_or_else(|err| skipped(old, &err).into())
    }
}

impl Default for Policies {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for Policies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Policies").finish_non_exhaustive()
    }
}

/// Public members, and protected ones when the owning class is open.
fn exposed<M: Member + 'static>(open: bool) -> impl Fn(&M) -> bool + Send + Sync + 'static {
    move |member: &M| member.is_public() || (open && member.is_protected())
}

/// Parameter and return types checked by variance.
fn variance_rules() -> BoxedRule<FunctionLike> {
    all(vec![
        rule(parameter_type_contravariance_changed),
        rule(return_type_covariance_changed),
    ])
}

/// Signatures an override has to repeat exactly.
fn strict_signature_rules() -> BoxedRule<FunctionLike> {
    all(vec![
        rule(parameter_type_changed),
        rule(return_type_changed),
        rule(parameter_removed),
    ])
}

/// By-reference, default, naming and arity rules common to every callable.
fn call_site_rules() -> Vec<BoxedRule<FunctionLike>> {
    vec![
        rule(parameter_by_reference_changed),
        rule(return_by_reference_changed),
        rule(parameter_default_value_changed),
        rule(parameter_name_changed),
        rule(required_parameter_amount_increased),
        rule(function_became_internal),
    ]
}

fn function_policy() -> BoxedRule<FunctionLike> {
    let mut rules = vec![variance_rules()];
    rules.extend(call_site_rules());

    exclude_if(|f: &FunctionLike| f.is_internal, all(rules))
}

fn method_rules(overridable: bool) -> BoxedRule<FunctionLike> {
    let mut rules: Vec<BoxedRule<FunctionLike>> = vec![visibility_reduced(), scope_changed()];
    if overridable {
        rules.push(exclude_if(|m: &FunctionLike| m.is_final, strict_signature_rules()));
        rules.push(only_if(|m: &FunctionLike| m.is_final, variance_rules()));
        rules.push(rule(method_became_final));
        rules.push(rule(method_concreteness_changed));
    } else {
        rules.push(variance_rules());
    }
    rules.extend(call_site_rules());

    exclude_if(|m: &FunctionLike| m.is_internal, all(rules))
}

fn constant_rules() -> BoxedRule<ClassConstant> {
    exclude_if(
        |c: &ClassConstant| c.is_internal,
        all(vec![visibility_reduced(), rule(constant_value_changed)]),
    )
}

fn property_rules() -> BoxedRule<Property> {
    exclude_if(
        |p: &Property| p.is_internal,
        all(vec![
            visibility_reduced(),
            scope_changed(),
            member_became_internal(),
            rule(property_default_value_changed),
            rule(property_type_changed),
            rule(property_documented_type_changed),
        ]),
    )
}

/// Member removal and per-member rules for a class-like that is `open` or not.
fn member_rules(open: bool) -> BoxedRule<ClassLike> {
    all(vec![
        rule(constant_removed),
        rule(property_removed),
        rule(method_removed),
        each_shared_constant(only_if(exposed::<ClassConstant>(open), constant_rules())),
        each_shared_property(only_if(exposed::<Property>(open), property_rules())),
        each_shared_method(only_if(exposed::<FunctionLike>(open), method_rules(open))),
    ])
}

fn class_policy() -> BoxedRule<ClassLike> {
    all(vec![
        rule(class_became_final),
        rule(class_became_abstract),
        rule(class_became_internal),
        rule(ancestor_removed),
        only_if(ClassLike::is_open, member_rules(true)),
        exclude_if(ClassLike::is_open, member_rules(false)),
    ])
}

fn interface_policy() -> BoxedRule<ClassLike> {
    all(vec![
        rule(class_became_internal),
        rule(ancestor_removed),
        rule(interface_method_added),
        member_rules(true),
    ])
}

fn mixin_policy() -> BoxedRule<ClassLike> {
    all(vec![rule(class_became_internal), member_rules(true)])
}

fn class_like_policy() -> BoxedRule<ClassLike> {
    let same_kind = all(vec![
        reuse_class_rules_for(ClassKind::Class, class_policy()),
        reuse_class_rules_for(ClassKind::Interface, interface_policy()),
        reuse_class_rules_for(ClassKind::Mixin, mixin_policy()),
    ]);

    // A kind change is reported even for anonymous or internal symbols.
    all(vec![
        all(kind_change_rules()),
        exclude_if(
            |c: &ClassLike| c.is_internal,
            exclude_if_either(|c: &ClassLike| c.is_anonymous, same_kind),
        ),
    ])
}
