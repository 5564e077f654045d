//! Descriptor model for symbols read from one snapshot.
//!
//! These types are a read-only structural view of a library's public surface:
//! class-likes (classes, interfaces, mixins), free functions and methods,
//! their parameters, properties and constants, and the declared types that
//! appear in signatures. Descriptors are produced once by a [`Snapshot`] and
//! never mutated afterwards.
//!
//! [`Snapshot`]: crate::snapshot::Snapshot

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{AnalysisError, TypeParseError};

/// Where a symbol was declared.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: Option<u32>, column: Option<u32>) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file)?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
            if let Some(column) = self.column {
                write!(f, ":{}", column)?;
            }
        }
        Ok(())
    }
}

/// Member visibility, ordered from widest to narrowest.
///
/// The derived ordering is the compatibility order: `Public < Protected < Private`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }

    /// Public and protected members are reachable by consumers.
    pub fn is_accessible(&self) -> bool {
        !matches!(self, Visibility::Private)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a class-like declaration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Mixin,
}

impl ClassKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassKind::Class => "class",
            ClassKind::Interface => "interface",
            ClassKind::Mixin => "mixin",
        }
    }

    /// Capitalized form used at the start of messages.
    pub fn label(&self) -> &'static str {
        match self {
            ClassKind::Class => "Class",
            ClassKind::Interface => "Interface",
            ClassKind::Mixin => "Mixin",
        }
    }

    /// Indefinite article + kind, e.g. "an interface".
    pub fn with_article(&self) -> &'static str {
        match self {
            ClassKind::Class => "a class",
            ClassKind::Interface => "an interface",
            ClassKind::Mixin => "a mixin",
        }
    }
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Built-in, non-class types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scalar {
    Int,
    Float,
    String,
    Bool,
    Array,
    Callable,
    Object,
    Iterable,
}

impl Scalar {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scalar::Int => "int",
            Scalar::Float => "float",
            Scalar::String => "string",
            Scalar::Bool => "bool",
            Scalar::Array => "array",
            Scalar::Callable => "callable",
            Scalar::Object => "object",
            Scalar::Iterable => "iterable",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        let scalar = match name.to_ascii_lowercase().as_str() {
            "int" => Scalar::Int,
            "float" => Scalar::Float,
            "string" => Scalar::String,
            "bool" => Scalar::Bool,
            "array" => Scalar::Array,
            "callable" => Scalar::Callable,
            "object" => Scalar::Object,
            "iterable" => Scalar::Iterable,
            _ => return None,
        };
        Some(scalar)
    }
}

/// The base of a declared type, without nullability.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeName {
    Void,
    Scalar(Scalar),
    /// Reference to a class-like by qualified name.
    Class(String),
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeName::Void => f.write_str("void"),
            TypeName::Scalar(scalar) => f.write_str(scalar.as_str()),
            TypeName::Class(name) => f.write_str(name),
        }
    }
}

/// A single declared type such as `int`, `?Foo` or `void`.
///
/// An undeclared type is represented by `Option::<TypeDecl>::None` wherever
/// a type may appear. Serialized as its textual form.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeDecl {
    name: TypeName,
    nullable: bool,
}

impl TypeDecl {
    pub fn new(name: TypeName, nullable: bool) -> Self {
        Self { name, nullable }
    }

    pub fn scalar(scalar: Scalar) -> Self {
        Self::new(TypeName::Scalar(scalar), false)
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(TypeName::Class(name.into()), false)
    }

    pub fn void() -> Self {
        Self::new(TypeName::Void, false)
    }

    /// Same base type, nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn name(&self) -> &TypeName {
        &self.name
    }

    pub fn allows_null(&self) -> bool {
        self.nullable
    }

    pub fn is_void(&self) -> bool {
        matches!(self.name, TypeName::Void)
    }

    pub fn class_name(&self) -> Option<&str> {
        match &self.name {
            TypeName::Class(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for TypeDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            f.write_str("?")?;
        }
        write!(f, "{}", self.name)
    }
}

impl FromStr for TypeDecl {
    type Err = TypeParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let err = |reason| TypeParseError {
            input: input.to_string(),
            reason,
        };

        let trimmed = input.trim();
        let (nullable, base) = match trimmed.strip_prefix('?') {
            Some(rest) => (true, rest.trim()),
            None => (false, trimmed),
        };

        if base.is_empty() {
            return Err(err("empty type name"));
        }
        if base.chars().any(|c| c.is_whitespace() || c == '?' || c == '|') {
            return Err(err("only single, non-union types are supported"));
        }

        let name = if base.eq_ignore_ascii_case("void") {
            if nullable {
                return Err(err("void cannot be nullable"));
            }
            TypeName::Void
        } else if let Some(scalar) = Scalar::from_name(base) {
            TypeName::Scalar(scalar)
        } else {
            TypeName::Class(base.to_string())
        };

        Ok(Self { name, nullable })
    }
}

impl TryFrom<String> for TypeDecl {
    type Error = TypeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TypeDecl> for String {
    fn from(value: TypeDecl) -> Self {
        value.to_string()
    }
}

/// Formats an optional declared type, `no type` when undeclared.
pub fn display_type(ty: Option<&TypeDecl>) -> String {
    match ty {
        Some(ty) => ty.to_string(),
        None => "no type".to_string(),
    }
}

/// A constant value or default value as recorded by the snapshot provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    /// Fully evaluated value.
    Evaluated(serde_json::Value),
    /// Expression the provider could not evaluate, kept verbatim.
    Expression(String),
}

impl Value {
    /// Identity comparison after evaluation.
    ///
    /// Evaluated values compare strictly (`1` and `1.0` differ). Verbatim
    /// identical expressions are considered identical; any other comparison
    /// involving an unevaluated expression is an analysis fault.
    pub fn is_identical(&self, other: &Value) -> Result<bool, AnalysisError> {
        match (self, other) {
            (Value::Evaluated(a), Value::Evaluated(b)) => Ok(a == b),
            (Value::Expression(a), Value::Expression(b)) if a == b => Ok(true),
            (Value::Expression(expression), _) | (_, Value::Expression(expression)) => {
                Err(AnalysisError::UnevaluableExpression {
                    expression: expression.clone(),
                })
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Evaluated(value) => write!(f, "{}", value),
            Value::Expression(expression) => f.write_str(expression),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Value::Evaluated(value)
    }
}

/// Anything that can be named in a finding.
pub trait Symbol {
    /// Human-readable name used in messages, e.g. `Foo#bar()`.
    fn display_name(&self) -> String;

    fn location(&self) -> Option<&SourceLocation>;
}

/// Shape shared by constants, properties and methods.
pub trait Member: Symbol {
    fn name(&self) -> &str;
    fn visibility(&self) -> Visibility;
    fn is_static(&self) -> bool;
    fn is_internal(&self) -> bool;
    /// Lowercase noun used in messages ("constant", "property", "method").
    fn noun(&self) -> &'static str;

    fn is_public(&self) -> bool {
        self.visibility() == Visibility::Public
    }

    fn is_protected(&self) -> bool {
        self.visibility() == Visibility::Protected
    }
}

/// A function or method parameter.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub declared_type: Option<TypeDecl>,
    #[serde(default)]
    pub is_by_reference: bool,
    #[serde(default)]
    pub is_variadic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// 0-based position, assigned by the snapshot.
    #[serde(skip)]
    pub position: usize,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// A caller has to supply this argument.
    pub fn is_required(&self) -> bool {
        !self.is_variadic && self.default.is_none()
    }
}

/// A free function or a method.
///
/// Method-only attributes (`visibility`, `is_static`, `is_abstract`,
/// `is_final`) keep their defaults on free functions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionLike {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<TypeDecl>,
    #[serde(default)]
    pub returns_by_reference: bool,
    #[serde(default)]
    pub no_named_arguments: bool,
    #[serde(default)]
    pub is_internal: bool,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_final: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    /// Owning class-like for methods, assigned by the snapshot.
    #[serde(skip)]
    pub declaring_class: Option<String>,
}

impl FunctionLike {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn is_method(&self) -> bool {
        self.declaring_class.is_some()
    }

    /// Number of leading arguments every call site must supply.
    ///
    /// Optional parameters before a required one still count, since the
    /// caller cannot skip them positionally.
    pub fn required_parameter_count(&self) -> usize {
        self.parameters
            .iter()
            .rposition(Parameter::is_required)
            .map_or(0, |last| last + 1)
    }
}

impl Symbol for FunctionLike {
    fn display_name(&self) -> String {
        match &self.declaring_class {
            Some(class) => format!("{}#{}()", class, self.name),
            None => format!("{}()", self.name),
        }
    }

    fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }
}

impl Member for FunctionLike {
    fn name(&self) -> &str {
        &self.name
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn is_static(&self) -> bool {
        self.is_static
    }

    fn is_internal(&self) -> bool {
        self.is_internal
    }

    fn noun(&self) -> &'static str {
        "method"
    }
}

/// A class property.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_internal: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub declared_type: Option<TypeDecl>,
    /// Type written in documentation only; compared as text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documented_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    #[serde(skip)]
    pub declaring_class: String,
}

impl Property {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl Symbol for Property {
    fn display_name(&self) -> String {
        format!("{}#{}", self.declaring_class, self.name)
    }

    fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }
}

impl Member for Property {
    fn name(&self) -> &str {
        &self.name
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn is_static(&self) -> bool {
        self.is_static
    }

    fn is_internal(&self) -> bool {
        self.is_internal
    }

    fn noun(&self) -> &'static str {
        "property"
    }
}

/// A class constant. Constants are always static.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassConstant {
    pub name: String,
    pub value: Value,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub is_internal: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    #[serde(skip)]
    pub declaring_class: String,
}

impl ClassConstant {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            visibility: Visibility::Public,
            is_internal: false,
            location: None,
            declaring_class: String::new(),
        }
    }
}

impl Symbol for ClassConstant {
    fn display_name(&self) -> String {
        format!("{}::{}", self.declaring_class, self.name)
    }

    fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }
}

impl Member for ClassConstant {
    fn name(&self) -> &str {
        &self.name
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn is_static(&self) -> bool {
        true
    }

    fn is_internal(&self) -> bool {
        self.is_internal
    }

    fn noun(&self) -> &'static str {
        "constant"
    }
}

/// A class, interface or mixin.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassLike {
    pub name: String,
    #[serde(default)]
    pub kind: ClassKind,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_final: bool,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default)]
    pub is_internal: bool,
    /// Direct superclass (classes) or extended interfaces (interfaces).
    #[serde(default)]
    pub extends: Vec<String>,
    /// Directly implemented interfaces.
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub constants: Vec<ClassConstant>,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub methods: Vec<FunctionLike>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    /// Transitive closure of `extends` and `implements`, computed by the snapshot.
    #[serde(skip)]
    pub(crate) ancestors: BTreeSet<String>,
}

impl ClassLike {
    pub fn new(name: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Default::default()
        }
    }

    /// Every direct and transitive superclass and interface name.
    pub fn ancestors(&self) -> &BTreeSet<String> {
        &self.ancestors
    }

    /// `self` is, or descends from, the class-like named `name`.
    pub fn is_a(&self, name: &str) -> bool {
        self.name == name || self.ancestors.contains(name)
    }

    /// Not final, so consumers may extend it.
    pub fn is_open(&self) -> bool {
        !self.is_final
    }

    pub fn constant(&self, name: &str) -> Option<&ClassConstant> {
        self.constants.iter().find(|c| c.name == name)
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Method lookup is case-insensitive.
    pub fn method(&self, name: &str) -> Option<&FunctionLike> {
        self.methods
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    pub fn accessible_constants(&self) -> impl Iterator<Item = &ClassConstant> {
        self.constants.iter().filter(|c| c.visibility.is_accessible())
    }

    pub fn accessible_properties(&self) -> impl Iterator<Item = &Property> {
        self.properties
            .iter()
            .filter(|p| p.visibility.is_accessible())
    }

    pub fn accessible_methods(&self) -> impl Iterator<Item = &FunctionLike> {
        self.methods.iter().filter(|m| m.visibility.is_accessible())
    }
}

impl Symbol for ClassLike {
    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn param(name: &str) -> Parameter {
        Parameter::new(name)
    }

    fn optional(name: &str) -> Parameter {
        Parameter {
            default: Some(Value::Evaluated(json!(null))),
            ..Parameter::new(name)
        }
    }

    #[test]
    fn test_visibility_order() {
        assert!(Visibility::Public < Visibility::Protected);
        assert!(Visibility::Protected < Visibility::Private);
        assert!(Visibility::Protected.is_accessible());
        assert!(!Visibility::Private.is_accessible());
    }

    #[test]
    fn test_type_decl_parse() {
        let ty: TypeDecl = "?int".parse().unwrap();
        assert!(ty.allows_null());
        assert_eq!(ty.name(), &TypeName::Scalar(Scalar::Int));
        assert_eq!(ty.to_string(), "?int");

        let ty: TypeDecl = "Foo\\Bar".parse().unwrap();
        assert_eq!(ty.class_name(), Some("Foo\\Bar"));

        let ty: TypeDecl = "VOID".parse().unwrap();
        assert!(ty.is_void());
    }

    #[test]
    fn test_type_decl_rejects_invalid() {
        assert!("".parse::<TypeDecl>().is_err());
        assert!("?".parse::<TypeDecl>().is_err());
        assert!("?void".parse::<TypeDecl>().is_err());
        assert!("int|string".parse::<TypeDecl>().is_err());
    }

    #[test]
    fn test_type_decl_serde_as_string() {
        let ty: TypeDecl = serde_json::from_value(json!("?Foo")).unwrap();
        assert_eq!(ty, TypeDecl::class("Foo").nullable());
        assert_eq!(serde_json::to_value(&ty).unwrap(), json!("?Foo"));
    }

    #[test]
    fn test_value_identity() {
        let one = Value::Evaluated(json!(1));
        let one_float = Value::Evaluated(json!(1.0));
        assert!(one.is_identical(&one.clone()).unwrap());
        assert!(!one.is_identical(&one_float).unwrap());

        let expr = Value::Expression("self::A * 2".to_string());
        assert!(expr.is_identical(&expr.clone()).unwrap());
        assert!(matches!(
            expr.is_identical(&one),
            Err(AnalysisError::UnevaluableExpression { .. })
        ));
    }

    #[test]
    fn test_required_parameter_count() {
        let mut func = FunctionLike::new("f");
        assert_eq!(func.required_parameter_count(), 0);

        func.parameters = vec![param("a"), optional("b")];
        assert_eq!(func.required_parameter_count(), 1);

        func.parameters = vec![optional("a"), param("b")];
        assert_eq!(func.required_parameter_count(), 2);

        let mut rest = param("rest");
        rest.is_variadic = true;
        func.parameters = vec![param("a"), rest];
        assert_eq!(func.required_parameter_count(), 1);
    }

    #[test]
    fn test_method_lookup_is_case_insensitive() {
        let mut class = ClassLike::new("Foo", ClassKind::Class);
        class.methods.push(FunctionLike::new("doThing"));
        class.constants.push(ClassConstant::new("BAR", json!(1)));

        assert!(class.method("DOTHING").is_some());
        assert!(class.constant("BAR").is_some());
        assert!(class.constant("bar").is_none());
    }

    #[test]
    fn test_accessible_members_exclude_private() {
        let mut class = ClassLike::new("Foo", ClassKind::Class);
        let mut hidden = FunctionLike::new("hidden");
        hidden.visibility = Visibility::Private;
        let mut guarded = Property::new("guarded");
        guarded.visibility = Visibility::Protected;
        class.methods.extend([FunctionLike::new("run"), hidden]);
        class.properties.push(guarded);

        let methods: Vec<&str> = class.accessible_methods().map(|m| m.name.as_str()).collect();
        assert_eq!(methods, vec!["run"]);
        assert_eq!(class.accessible_properties().count(), 1);
        assert_eq!(class.accessible_constants().count(), 0);
    }

    #[test]
    fn test_display_names() {
        let mut method = FunctionLike::new("run");
        assert_eq!(method.display_name(), "run()");
        method.declaring_class = Some("Job".to_string());
        assert_eq!(method.display_name(), "Job#run()");

        let mut constant = ClassConstant::new("MAX", json!(3));
        constant.declaring_class = "Job".to_string();
        assert_eq!(constant.display_name(), "Job::MAX");
    }

    #[test]
    fn test_class_like_deserialize_defaults() {
        let class: ClassLike = serde_json::from_value(json!({
            "name": "Foo",
            "kind": "interface",
        }))
        .unwrap();
        assert_eq!(class.kind, ClassKind::Interface);
        assert!(class.methods.is_empty());
        assert!(class.ancestors().is_empty());
    }

    #[test]
    fn test_source_location_display() {
        let loc = SourceLocation::new("src/Foo.php", Some(12), Some(4));
        assert_eq!(loc.to_string(), "src/Foo.php:12:4");
        assert_eq!(SourceLocation::new("a", None, Some(3)).to_string(), "a");
    }
}
