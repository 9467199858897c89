//! The runtime schema registry consumed by validation and execution.

use std::fmt;

use arcstr::ArcStr;
use fnv::FnvHashMap;

use crate::{
    ast::{InputValue, OperationType, Type},
    schema::meta::{
        Argument, EnumMeta, Field, InputObjectMeta, InterfaceMeta, MetaType, ObjectMeta,
        ScalarMeta, UnionMeta,
    },
    value::Value,
};

/// Metadata for a schema.
///
/// Holds the full registry of named types, the root operation types, and
/// the declared directives. Construction panics on structural programmer
/// errors (missing or non-object root types, duplicate type names);
/// everything downstream reports recoverable errors instead.
pub struct SchemaType {
    types: FnvHashMap<ArcStr, MetaType>,
    query_type_name: ArcStr,
    mutation_type_name: Option<ArcStr>,
    subscription_type_name: Option<ArcStr>,
    directives: FnvHashMap<ArcStr, DirectiveType>,
    typename_field: Field,
}

/// A directive declared by a schema.
pub struct DirectiveType {
    pub name: ArcStr,
    pub description: Option<ArcStr>,
    pub locations: Vec<DirectiveLocation>,
    pub arguments: Vec<Argument>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DirectiveLocation {
    Query,
    Mutation,
    Subscription,
    Field,
    FragmentDefinition,
    FragmentSpread,
    InlineFragment,
    VariableDefinition,
    FieldDefinition,
    EnumValue,
}

impl fmt::Display for DirectiveLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
            Self::Field => "field",
            Self::FragmentDefinition => "fragment definition",
            Self::FragmentSpread => "fragment spread",
            Self::InlineFragment => "inline fragment",
            Self::VariableDefinition => "variable definition",
            Self::FieldDefinition => "field definition",
            Self::EnumValue => "enum value",
        })
    }
}

impl SchemaType {
    /// Constructs a new schema from the given type registry and root
    /// operation type names.
    ///
    /// Builtin scalars (`Int`, `Float`, `String`, `Boolean`, `ID`) and
    /// the `skip`/`include`/`deprecated` directives are registered
    /// automatically.
    ///
    /// # Panics
    ///
    /// Panics if a type name is registered twice, if a named root type is
    /// missing from the registry, or if a root type is not an object
    /// type. These are programmer errors: such a schema must not be
    /// constructed at all.
    pub fn new(
        types: Vec<MetaType>,
        query_type: &str,
        mutation_type: Option<&str>,
        subscription_type: Option<&str>,
    ) -> Self {
        let mut registry = FnvHashMap::default();
        for t in builtin_scalars() {
            registry.insert(ArcStr::from(t.name()), t);
        }
        for t in types {
            let name = ArcStr::from(t.name());
            if registry.insert(name.clone(), t).is_some() && !is_builtin_name(&name) {
                panic!("Type {name:?} is registered twice");
            }
        }

        for (kind, type_name) in [
            ("query", Some(query_type)),
            ("mutation", mutation_type),
            ("subscription", subscription_type),
        ]
        .into_iter()
        .filter_map(|(kind, name)| name.map(|n| (kind, n)))
        {
            match registry.get(type_name) {
                Some(MetaType::Object(..)) => {}
                Some(_) => panic!("The {kind} root type {type_name:?} is not an object type"),
                None => panic!("The {kind} root type {type_name:?} does not exist in the schema"),
            }
        }

        let mut directives = FnvHashMap::default();
        for d in [
            DirectiveType::new_skip(),
            DirectiveType::new_include(),
            DirectiveType::new_deprecated(),
        ] {
            directives.insert(d.name.clone(), d);
        }

        Self {
            types: registry,
            query_type_name: ArcStr::from(query_type),
            mutation_type_name: mutation_type.map(ArcStr::from),
            subscription_type_name: subscription_type.map(ArcStr::from),
            directives,
            typename_field: Field::new("__typename", Type::NonNullNamed(arcstr::literal!("String"))),
        }
    }

    /// Registers an additional directive on this schema.
    pub fn add_directive(&mut self, directive: DirectiveType) {
        self.directives.insert(directive.name.clone(), directive);
    }

    /// Looks up a named type in the registry.
    pub fn concrete_type_by_name(&self, name: &str) -> Option<&MetaType> {
        self.types.get(name)
    }

    /// All registered types, in unspecified order.
    pub fn concrete_type_list(&self) -> impl Iterator<Item = &MetaType> {
        self.types.values()
    }

    /// The query root type.
    pub fn concrete_query_type(&self) -> &MetaType {
        self.types
            .get(&self.query_type_name)
            .expect("query type exists in schema")
    }

    /// The mutation root type, if the schema supports mutations.
    pub fn concrete_mutation_type(&self) -> Option<&MetaType> {
        self.mutation_type_name.as_ref().map(|name| {
            self.concrete_type_by_name(name)
                .expect("mutation type exists in schema")
        })
    }

    /// The subscription root type, if the schema supports subscriptions.
    pub fn concrete_subscription_type(&self) -> Option<&MetaType> {
        self.subscription_type_name.as_ref().map(|name| {
            self.concrete_type_by_name(name)
                .expect("subscription type exists in schema")
        })
    }

    /// The root type serving the provided operation kind, if any.
    pub fn root_type_for(&self, op: OperationType) -> Option<&MetaType> {
        match op {
            OperationType::Query => Some(self.concrete_query_type()),
            OperationType::Mutation => self.concrete_mutation_type(),
            OperationType::Subscription => self.concrete_subscription_type(),
        }
    }

    /// All declared directives, in unspecified order.
    pub fn directive_list(&self) -> impl Iterator<Item = &DirectiveType> {
        self.directives.values()
    }

    /// Looks up a declared directive by name.
    pub fn directive_by_name(&self, name: &str) -> Option<&DirectiveType> {
        self.directives.get(name)
    }

    /// Looks up a field on a parent type, resolving the `__typename`
    /// meta-field on any composite parent.
    pub fn lookup_field<'a>(&'a self, parent: &'a MetaType, name: &str) -> Option<&'a Field> {
        if name == "__typename" && parent.is_composite() {
            return Some(&self.typename_field);
        }
        parent.field_by_name(name)
    }

    /// Whether two composite types can both apply to some object.
    pub fn type_overlap(&self, t1: &MetaType, t2: &MetaType) -> bool {
        if std::ptr::eq(t1, t2) {
            return true;
        }

        match (t1.is_abstract(), t2.is_abstract()) {
            (true, true) => self
                .possible_types(t1)
                .iter()
                .any(|t| self.is_possible_type(t2, t)),
            (true, false) => self.is_possible_type(t1, t2),
            (false, true) => self.is_possible_type(t2, t1),
            (false, false) => false,
        }
    }

    /// The concrete object types an abstract type can resolve to.
    ///
    /// # Panics
    ///
    /// Panics if called on a non-abstract type.
    pub fn possible_types(&self, t: &MetaType) -> Vec<&MetaType> {
        match t {
            MetaType::Union(UnionMeta { of_type_names, .. }) => of_type_names
                .iter()
                .filter_map(|t| self.concrete_type_by_name(t))
                .collect(),
            MetaType::Interface(InterfaceMeta { name, .. }) => self
                .concrete_type_list()
                .filter(|t| match t {
                    MetaType::Object(ObjectMeta {
                        interface_names, ..
                    }) => interface_names.iter().any(|iname| iname == name),
                    _ => false,
                })
                .collect(),
            _ => panic!("Can't retrieve possible types from non-abstract meta type"),
        }
    }

    /// Whether `possible_type` is a member of the `abstract_type`.
    pub fn is_possible_type(&self, abstract_type: &MetaType, possible_type: &MetaType) -> bool {
        self.possible_types(abstract_type)
            .into_iter()
            .any(|t| std::ptr::eq(t, possible_type))
    }

    /// Whether values of the named `sub_type` are always valid where the
    /// named `super_type` is expected.
    pub fn is_named_subtype(&self, sub_type_name: &str, super_type_name: &str) -> bool {
        if sub_type_name == super_type_name {
            true
        } else if let (Some(sub_type), Some(super_type)) = (
            self.concrete_type_by_name(sub_type_name),
            self.concrete_type_by_name(super_type_name),
        ) {
            super_type.is_abstract() && self.is_possible_type(super_type, sub_type)
        } else {
            false
        }
    }

    /// Whether values of `sub_type` are always valid where `super_type`
    /// is expected, honoring list and non-`null` modifiers.
    pub fn is_subtype<N1, N2>(&self, sub_type: &Type<N1>, super_type: &Type<N2>) -> bool
    where
        N1: AsRef<str>,
        N2: AsRef<str>,
    {
        use crate::ast::Type::{List, Named, NonNullList, NonNullNamed};

        match (super_type, sub_type) {
            (NonNullNamed(super_name), NonNullNamed(sub_name))
            | (Named(super_name), Named(sub_name))
            | (Named(super_name), NonNullNamed(sub_name)) => {
                self.is_named_subtype(sub_name.as_ref(), super_name.as_ref())
            }
            (NonNullList(super_inner), NonNullList(sub_inner))
            | (List(super_inner), List(sub_inner))
            | (List(super_inner), NonNullList(sub_inner)) => {
                self.is_subtype(sub_inner, super_inner)
            }
            _ => false,
        }
    }
}

impl DirectiveType {
    /// Builds a new directive with the given name, allowed locations, and
    /// arguments.
    pub fn new(name: &str, locations: &[DirectiveLocation], arguments: Vec<Argument>) -> Self {
        Self {
            name: ArcStr::from(name),
            description: None,
            locations: locations.to_vec(),
            arguments,
        }
    }

    fn new_skip() -> Self {
        Self::new(
            "skip",
            &[
                DirectiveLocation::Field,
                DirectiveLocation::FragmentSpread,
                DirectiveLocation::InlineFragment,
            ],
            vec![Argument::new(
                "if",
                Type::NonNullNamed(arcstr::literal!("Boolean")),
            )],
        )
    }

    fn new_include() -> Self {
        Self::new(
            "include",
            &[
                DirectiveLocation::Field,
                DirectiveLocation::FragmentSpread,
                DirectiveLocation::InlineFragment,
            ],
            vec![Argument::new(
                "if",
                Type::NonNullNamed(arcstr::literal!("Boolean")),
            )],
        )
    }

    fn new_deprecated() -> Self {
        Self::new(
            "deprecated",
            &[
                DirectiveLocation::FieldDefinition,
                DirectiveLocation::EnumValue,
            ],
            vec![Argument::new(
                "reason",
                Type::Named(arcstr::literal!("String")),
            )],
        )
    }

    /// Sets the `description` of this directive.
    #[must_use]
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(ArcStr::from(description));
        self
    }
}

fn is_builtin_name(name: &str) -> bool {
    matches!(name, "Int" | "Float" | "String" | "Boolean" | "ID")
}

fn builtin_scalars() -> Vec<MetaType> {
    vec![
        ScalarMeta::new("Int", parse_int, parse_int, serialize_int).into_meta(),
        ScalarMeta::new("Float", parse_float, parse_float, serialize_float).into_meta(),
        ScalarMeta::new("String", parse_string, parse_string, serialize_string).into_meta(),
        ScalarMeta::new("Boolean", parse_boolean, parse_boolean, serialize_boolean).into_meta(),
        ScalarMeta::new("ID", parse_id, parse_id, serialize_id).into_meta(),
    ]
}

fn parse_int(v: &InputValue) -> Result<InputValue, String> {
    match v {
        InputValue::Int(..) => Ok(v.clone()),
        _ => Err(format!("Int cannot represent non-integer value: {v}")),
    }
}

fn parse_float(v: &InputValue) -> Result<InputValue, String> {
    match v {
        InputValue::Int(i) => Ok(InputValue::Float(f64::from(*i))),
        InputValue::Float(..) => Ok(v.clone()),
        _ => Err(format!("Float cannot represent non-numeric value: {v}")),
    }
}

fn parse_string(v: &InputValue) -> Result<InputValue, String> {
    match v {
        InputValue::String(..) => Ok(v.clone()),
        _ => Err(format!("String cannot represent a non-string value: {v}")),
    }
}

fn parse_boolean(v: &InputValue) -> Result<InputValue, String> {
    match v {
        InputValue::Boolean(..) => Ok(v.clone()),
        _ => Err(format!("Boolean cannot represent a non-boolean value: {v}")),
    }
}

fn parse_id(v: &InputValue) -> Result<InputValue, String> {
    match v {
        InputValue::String(..) => Ok(v.clone()),
        InputValue::Int(i) => Ok(InputValue::String(i.to_string())),
        _ => Err(format!("ID cannot represent value: {v}")),
    }
}

fn serialize_int(v: &Value) -> Result<Value, String> {
    v.as_int_value()
        .map(Value::Int)
        .ok_or_else(|| format!("Int cannot represent non-integer value: {v}"))
}

fn serialize_float(v: &Value) -> Result<Value, String> {
    v.as_float_value()
        .map(Value::Float)
        .ok_or_else(|| format!("Float cannot represent non-numeric value: {v}"))
}

fn serialize_string(v: &Value) -> Result<Value, String> {
    v.as_string_value()
        .map(Value::from)
        .ok_or_else(|| format!("String cannot represent a non-string value: {v}"))
}

fn serialize_boolean(v: &Value) -> Result<Value, String> {
    v.as_boolean_value()
        .map(Value::Boolean)
        .ok_or_else(|| format!("Boolean cannot represent a non-boolean value: {v}"))
}

fn serialize_id(v: &Value) -> Result<Value, String> {
    match v {
        Value::String(s) => Ok(Value::from(s.as_str())),
        Value::Int(i) => Ok(Value::String(i.to_string())),
        _ => Err(format!("ID cannot represent value: {v}")),
    }
}
