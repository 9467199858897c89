//! Types used to describe a GraphQL schema.

use std::fmt;

use arcstr::ArcStr;

use crate::{
    ast::{InputValue, Type},
    executor::{ResolverContext, ResolvedValue, FieldResult, ValuesStream},
    value::Value,
};

/// Whether an item is deprecated, with context.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum DeprecationStatus {
    /// The field/variant is not deprecated.
    Current,
    /// The field/variant is deprecated, with an optional reason.
    Deprecated(Option<ArcStr>),
}

impl DeprecationStatus {
    /// If this deprecation status indicates the item is deprecated.
    pub fn is_deprecated(&self) -> bool {
        match self {
            Self::Current => false,
            Self::Deprecated(_) => true,
        }
    }

    /// An optional reason for the deprecation, or none if `Current`.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Current => None,
            Self::Deprecated(rsn) => rsn.as_deref(),
        }
    }
}

/// Shortcut for a field resolver function.
pub type ResolverFn =
    Box<dyn for<'a> Fn(ResolverContext<'a>) -> FieldResult<ResolvedValue<'a>> + Send + Sync>;

/// Shortcut for a subscription source-stream resolver function.
pub type SubscriberFn =
    Box<dyn for<'a> Fn(ResolverContext<'a>) -> FieldResult<ValuesStream<'a>> + Send + Sync>;

/// Shortcut for an object type-membership predicate.
pub type IsTypeOfFn = Box<dyn Fn(&Value) -> bool + Send + Sync>;

/// Shortcut for an abstract-type discriminator function, returning the
/// name of the concrete object type a value belongs to.
pub type ResolveTypeFn = Box<dyn Fn(&Value) -> Option<ArcStr> + Send + Sync>;

/// Shortcut for a scalar literal/value parsing function.
pub type ScalarParseFn = fn(&InputValue) -> Result<InputValue, String>;

/// Shortcut for a scalar serialization function.
pub type ScalarSerializeFn = fn(&Value) -> Result<Value, String>;

/// Scalar type metadata.
pub struct ScalarMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    pub(crate) parse_literal_fn: ScalarParseFn,
    pub(crate) parse_value_fn: ScalarParseFn,
    pub(crate) serialize_fn: ScalarSerializeFn,
}

/// Object type metadata.
pub struct ObjectMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub fields: Vec<Field>,
    #[doc(hidden)]
    pub interface_names: Vec<ArcStr>,
    pub(crate) is_type_of: Option<IsTypeOfFn>,
}

/// Enum type metadata.
pub struct EnumMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub values: Vec<EnumValue>,
}

/// Interface type metadata.
pub struct InterfaceMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub fields: Vec<Field>,
    pub(crate) resolve_type: Option<ResolveTypeFn>,
}

/// Union type metadata.
pub struct UnionMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub of_type_names: Vec<ArcStr>,
    pub(crate) resolve_type: Option<ResolveTypeFn>,
}

/// Input object metadata.
pub struct InputObjectMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub input_fields: Vec<Argument>,
}

/// Generic type metadata.
pub enum MetaType {
    #[doc(hidden)]
    Scalar(ScalarMeta),
    #[doc(hidden)]
    Object(ObjectMeta),
    #[doc(hidden)]
    Enum(EnumMeta),
    #[doc(hidden)]
    Interface(InterfaceMeta),
    #[doc(hidden)]
    Union(UnionMeta),
    #[doc(hidden)]
    InputObject(InputObjectMeta),
}

impl PartialEq for MetaType {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

/// Metadata for a field.
pub struct Field {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub arguments: Option<Vec<Argument>>,
    #[doc(hidden)]
    pub field_type: Type<ArcStr>,
    #[doc(hidden)]
    pub deprecation_status: DeprecationStatus,
    pub(crate) resolver: Option<ResolverFn>,
    pub(crate) subscriber: Option<SubscriberFn>,
}

impl Field {
    /// Builds a new [`Field`] with the specified `name` and return type.
    pub fn new(name: impl AsRef<str>, field_type: Type<ArcStr>) -> Self {
        Self {
            name: ArcStr::from(name.as_ref()),
            description: None,
            arguments: None,
            field_type,
            deprecation_status: DeprecationStatus::Current,
            resolver: None,
            subscriber: None,
        }
    }

    /// Sets the `description` of this [`Field`].
    #[must_use]
    pub fn description(mut self, description: impl AsRef<str>) -> Self {
        self.description = Some(ArcStr::from(description.as_ref()));
        self
    }

    /// Adds an `argument` to this [`Field`].
    #[must_use]
    pub fn argument(mut self, argument: Argument) -> Self {
        self.arguments.get_or_insert_with(Vec::new).push(argument);
        self
    }

    /// Marks this [`Field`] as deprecated with an optional `reason`.
    #[must_use]
    pub fn deprecated(mut self, reason: Option<&str>) -> Self {
        self.deprecation_status = DeprecationStatus::Deprecated(reason.map(ArcStr::from));
        self
    }

    /// Attaches a resolver function to this [`Field`].
    ///
    /// Fields without one fall back to the per-request field resolver,
    /// or to the default property resolver.
    #[must_use]
    pub fn resolver<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(ResolverContext<'a>) -> FieldResult<ResolvedValue<'a>>
            + Send
            + Sync
            + 'static,
    {
        self.resolver = Some(Box::new(f));
        self
    }

    /// Attaches a subscription source-stream resolver to this [`Field`].
    #[must_use]
    pub fn subscriber<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(ResolverContext<'a>) -> FieldResult<ValuesStream<'a>>
            + Send
            + Sync
            + 'static,
    {
        self.subscriber = Some(Box::new(f));
        self
    }

    /// Looks up a declared argument by `name`.
    pub fn argument_by_name(&self, name: &str) -> Option<&Argument> {
        self.arguments
            .as_ref()
            .and_then(|args| args.iter().find(|a| a.name == name))
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("arguments", &self.arguments)
            .finish_non_exhaustive()
    }
}

/// Metadata for an argument to a field, or an input object field.
#[derive(Clone, Debug)]
pub struct Argument {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub arg_type: Type<ArcStr>,
    #[doc(hidden)]
    pub default_value: Option<InputValue>,
}

impl Argument {
    /// Builds a new [`Argument`] with the specified `name` and type.
    pub fn new(name: impl AsRef<str>, arg_type: Type<ArcStr>) -> Self {
        Self {
            name: ArcStr::from(name.as_ref()),
            description: None,
            arg_type,
            default_value: None,
        }
    }

    /// Sets the `description` of this [`Argument`].
    #[must_use]
    pub fn description(mut self, description: impl AsRef<str>) -> Self {
        self.description = Some(ArcStr::from(description.as_ref()));
        self
    }

    /// Sets the default value of this [`Argument`].
    #[must_use]
    pub fn default_value(mut self, default: InputValue) -> Self {
        self.default_value = Some(default);
        self
    }
}

/// Metadata for a single value in an enum.
#[derive(Clone, Debug)]
pub struct EnumValue {
    /// The name of the enum value.
    ///
    /// This is the string literal representation of the enum in
    /// responses.
    pub name: ArcStr,
    /// The optional description of the enum value.
    pub description: Option<ArcStr>,
    /// Whether the value is deprecated or not, with an optional reason.
    pub deprecation_status: DeprecationStatus,
}

impl EnumValue {
    /// Builds a new [`EnumValue`] with the provided `name`.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: ArcStr::from(name.as_ref()),
            description: None,
            deprecation_status: DeprecationStatus::Current,
        }
    }
}

impl MetaType {
    /// Access the name of the type.
    pub fn name(&self) -> &str {
        match self {
            Self::Scalar(ScalarMeta { name, .. })
            | Self::Object(ObjectMeta { name, .. })
            | Self::Enum(EnumMeta { name, .. })
            | Self::Interface(InterfaceMeta { name, .. })
            | Self::Union(UnionMeta { name, .. })
            | Self::InputObject(InputObjectMeta { name, .. }) => name,
        }
    }

    /// Access the description of the type, if any.
    pub fn description(&self) -> Option<&ArcStr> {
        match self {
            Self::Scalar(ScalarMeta { description, .. })
            | Self::Object(ObjectMeta { description, .. })
            | Self::Enum(EnumMeta { description, .. })
            | Self::Interface(InterfaceMeta { description, .. })
            | Self::Union(UnionMeta { description, .. })
            | Self::InputObject(InputObjectMeta { description, .. }) => description.as_ref(),
        }
    }

    /// Access a field's metadata given its name.
    ///
    /// Only objects and interfaces have fields. This method always
    /// returns `None` for other types.
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        match self {
            Self::Object(ObjectMeta { fields, .. })
            | Self::Interface(InterfaceMeta { fields, .. }) => {
                fields.iter().find(|f| f.name == name)
            }
            _ => None,
        }
    }

    /// Access the declared fields of this type, if it has any.
    pub fn fields(&self) -> Option<&[Field]> {
        match self {
            Self::Object(ObjectMeta { fields, .. })
            | Self::Interface(InterfaceMeta { fields, .. }) => Some(fields),
            _ => None,
        }
    }

    /// Access an input field's metadata given its name.
    ///
    /// Only input objects have input fields. This method always returns
    /// `None` for other types.
    pub fn input_field_by_name(&self, name: &str) -> Option<&Argument> {
        match self {
            Self::InputObject(InputObjectMeta { input_fields, .. }) => {
                input_fields.iter().find(|f| f.name == name)
            }
            _ => None,
        }
    }

    /// Access an enum value's metadata given its name.
    pub fn enum_value_by_name(&self, name: &str) -> Option<&EnumValue> {
        match self {
            Self::Enum(EnumMeta { values, .. }) => values.iter().find(|v| v.name == name),
            _ => None,
        }
    }

    /// Returns true if the type is a composite type.
    ///
    /// Objects, interfaces, and unions are composite.
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Object(_) | Self::Interface(_) | Self::Union(_))
    }

    /// Returns true if the type can occur in leaf positions in queries.
    ///
    /// Only enums and scalars are leaf types.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Enum(_) | Self::Scalar(_))
    }

    /// Returns true if the type is abstract.
    ///
    /// Only interfaces and unions are abstract types.
    pub fn is_abstract(&self) -> bool {
        matches!(self, Self::Interface(_) | Self::Union(_))
    }

    /// Returns true if the type can be used in input positions, e.g.
    /// arguments or variables.
    ///
    /// Only scalars, enums, and input objects are input types.
    pub fn is_input(&self) -> bool {
        matches!(self, Self::Scalar(_) | Self::Enum(_) | Self::InputObject(_))
    }

    /// Returns true if the type is built-in to GraphQL.
    pub fn is_builtin(&self) -> bool {
        let name = self.name();
        name.starts_with("__")
            || name == "Boolean"
            || name == "String"
            || name == "Int"
            || name == "Float"
            || name == "ID"
    }
}

impl fmt::Debug for MetaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Scalar(..) => "Scalar",
            Self::Object(..) => "Object",
            Self::Enum(..) => "Enum",
            Self::Interface(..) => "Interface",
            Self::Union(..) => "Union",
            Self::InputObject(..) => "InputObject",
        };
        write!(f, "MetaType::{kind}({:?})", self.name())
    }
}

impl ScalarMeta {
    /// Builds a new [`ScalarMeta`] type with the specified `name` and
    /// coercion functions.
    pub fn new(
        name: impl AsRef<str>,
        parse_literal: ScalarParseFn,
        parse_value: ScalarParseFn,
        serialize: ScalarSerializeFn,
    ) -> Self {
        Self {
            name: ArcStr::from(name.as_ref()),
            description: None,
            parse_literal_fn: parse_literal,
            parse_value_fn: parse_value,
            serialize_fn: serialize,
        }
    }

    /// Sets the `description` of this [`ScalarMeta`] type.
    #[must_use]
    pub fn description(mut self, description: impl AsRef<str>) -> Self {
        self.description = Some(ArcStr::from(description.as_ref()));
        self
    }

    /// Wraps this [`ScalarMeta`] type into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::Scalar(self)
    }
}

impl ObjectMeta {
    /// Builds a new [`ObjectMeta`] type with the specified `name` and
    /// `fields`.
    pub fn new(name: impl AsRef<str>, fields: Vec<Field>) -> Self {
        Self {
            name: ArcStr::from(name.as_ref()),
            description: None,
            fields,
            interface_names: vec![],
            is_type_of: None,
        }
    }

    /// Sets the `description` of this [`ObjectMeta`] type.
    #[must_use]
    pub fn description(mut self, description: impl AsRef<str>) -> Self {
        self.description = Some(ArcStr::from(description.as_ref()));
        self
    }

    /// Sets the interfaces this [`ObjectMeta`] type implements.
    #[must_use]
    pub fn interfaces(mut self, names: &[&str]) -> Self {
        self.interface_names = names.iter().map(|n| ArcStr::from(*n)).collect();
        self
    }

    /// Attaches a type-membership predicate used when this object is a
    /// possible type of an abstract type.
    #[must_use]
    pub fn is_type_of<F: Fn(&Value) -> bool + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.is_type_of = Some(Box::new(f));
        self
    }

    /// Wraps this [`ObjectMeta`] type into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::Object(self)
    }
}

impl EnumMeta {
    /// Builds a new [`EnumMeta`] type with the specified `name` and
    /// `values`.
    pub fn new(name: impl AsRef<str>, values: Vec<EnumValue>) -> Self {
        Self {
            name: ArcStr::from(name.as_ref()),
            description: None,
            values,
        }
    }

    /// Sets the `description` of this [`EnumMeta`] type.
    #[must_use]
    pub fn description(mut self, description: impl AsRef<str>) -> Self {
        self.description = Some(ArcStr::from(description.as_ref()));
        self
    }

    /// Wraps this [`EnumMeta`] type into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::Enum(self)
    }
}

impl InterfaceMeta {
    /// Builds a new [`InterfaceMeta`] type with the specified `name` and
    /// `fields`.
    pub fn new(name: impl AsRef<str>, fields: Vec<Field>) -> Self {
        Self {
            name: ArcStr::from(name.as_ref()),
            description: None,
            fields,
            resolve_type: None,
        }
    }

    /// Sets the `description` of this [`InterfaceMeta`] type.
    #[must_use]
    pub fn description(mut self, description: impl AsRef<str>) -> Self {
        self.description = Some(ArcStr::from(description.as_ref()));
        self
    }

    /// Attaches a discriminator resolving the concrete object type of a
    /// value.
    #[must_use]
    pub fn resolve_type<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Option<ArcStr> + Send + Sync + 'static,
    {
        self.resolve_type = Some(Box::new(f));
        self
    }

    /// Wraps this [`InterfaceMeta`] type into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::Interface(self)
    }
}

impl UnionMeta {
    /// Builds a new [`UnionMeta`] type with the specified `name` and
    /// member type names.
    pub fn new(name: impl AsRef<str>, of_type_names: &[&str]) -> Self {
        Self {
            name: ArcStr::from(name.as_ref()),
            description: None,
            of_type_names: of_type_names.iter().map(|n| ArcStr::from(*n)).collect(),
            resolve_type: None,
        }
    }

    /// Sets the `description` of this [`UnionMeta`] type.
    #[must_use]
    pub fn description(mut self, description: impl AsRef<str>) -> Self {
        self.description = Some(ArcStr::from(description.as_ref()));
        self
    }

    /// Attaches a discriminator resolving the concrete object type of a
    /// value.
    #[must_use]
    pub fn resolve_type<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Option<ArcStr> + Send + Sync + 'static,
    {
        self.resolve_type = Some(Box::new(f));
        self
    }

    /// Wraps this [`UnionMeta`] type into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::Union(self)
    }
}

impl InputObjectMeta {
    /// Builds a new [`InputObjectMeta`] type with the specified `name`
    /// and `input_fields`.
    pub fn new(name: impl AsRef<str>, input_fields: Vec<Argument>) -> Self {
        Self {
            name: ArcStr::from(name.as_ref()),
            description: None,
            input_fields,
        }
    }

    /// Sets the `description` of this [`InputObjectMeta`] type.
    #[must_use]
    pub fn description(mut self, description: impl AsRef<str>) -> Self {
        self.description = Some(ArcStr::from(description.as_ref()));
        self
    }

    /// Wraps this [`InputObjectMeta`] type into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::InputObject(self)
    }
}
