//! The crate's document AST.
//!
//! Documents are produced by the [`translate`](crate::translate) adapter
//! from externally parsed sources, or built programmatically. Names in a
//! document borrow from the source text; schema metadata reuses the same
//! [`Type`] literal with owned [`ArcStr`] names.

use std::{fmt, slice, vec};

use arcstr::ArcStr;
use indexmap::IndexMap;

use crate::{executor::Variables, span::Spanning};

/// Type literal in a syntax tree or a schema definition.
///
/// Carries no semantic information and might refer to types that don't
/// exist. A non-`null` modifier can only wrap a named or a list type, so
/// `NonNull` directly inside `NonNull` is unrepresentable.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Type<N = ArcStr> {
    /// A nullable named type, e.g. `String`.
    Named(N),
    /// A nullable list type, e.g. `[String]`.
    ///
    /// The list itself is what's nullable, the contained type might be
    /// non-`null`.
    List(Box<Type<N>>),
    /// A non-`null` named type, e.g. `String!`.
    NonNullNamed(N),
    /// A non-`null` list type, e.g. `[String]!`.
    NonNullList(Box<Type<N>>),
}

impl<N: AsRef<str>> Type<N> {
    /// Returns the name of this type, if it is a named type.
    ///
    /// Lists will return [`None`].
    pub fn name(&self) -> Option<&str> {
        match self {
            Type::Named(n) | Type::NonNullNamed(n) => Some(n.as_ref()),
            Type::List(..) | Type::NonNullList(..) => None,
        }
    }

    /// Returns the innermost name of this type by unpacking lists.
    ///
    /// All type literals contain exactly one name.
    pub fn innermost_name(&self) -> &str {
        match self {
            Type::Named(n) | Type::NonNullNamed(n) => n.as_ref(),
            Type::List(l) | Type::NonNullList(l) => l.innermost_name(),
        }
    }

    /// Indicates whether this type can only represent non-`null` values.
    pub fn is_non_null(&self) -> bool {
        matches!(self, Type::NonNullNamed(..) | Type::NonNullList(..))
    }

    /// Returns the item type of this type, if it is a list.
    pub fn list_contents(&self) -> Option<&Type<N>> {
        match self {
            Type::List(l) | Type::NonNullList(l) => Some(l),
            Type::Named(..) | Type::NonNullNamed(..) => None,
        }
    }
}

impl<N: Clone> Type<N> {
    /// Strips the topmost non-`null` modifier, returning the `null`able
    /// rendition of this type.
    pub fn into_nullable(self) -> Self {
        match self {
            Type::NonNullNamed(n) => Type::Named(n),
            Type::NonNullList(l) => Type::List(l),
            t => t,
        }
    }
}

impl Type<&str> {
    /// Clones this borrowed type literal into one with owned names.
    pub fn to_arc(&self) -> Type<ArcStr> {
        match self {
            Type::Named(n) => Type::Named(ArcStr::from(*n)),
            Type::NonNullNamed(n) => Type::NonNullNamed(ArcStr::from(*n)),
            Type::List(l) => Type::List(Box::new(l.to_arc())),
            Type::NonNullList(l) => Type::NonNullList(Box::new(l.to_arc())),
        }
    }
}

impl<N: AsRef<str>> fmt::Display for Type<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Named(n) => write!(f, "{}", n.as_ref()),
            Type::NonNullNamed(n) => write!(f, "{}!", n.as_ref()),
            Type::List(t) => write!(f, "[{t}]"),
            Type::NonNullList(t) => write!(f, "[{t}]!"),
        }
    }
}

/// A JSON-like value that can be passed into the query execution, either
/// out-of-band, or in-band as default variable values. These are _not_
/// constant and might contain variables.
///
/// Lists and objects variants are _spanned_, i.e. they contain a
/// reference to their position in the source file, if available.
#[derive(Clone, Debug, PartialEq)]
pub enum InputValue {
    /// An explicit `null` literal.
    Null,
    /// An integer literal.
    Int(i32),
    /// A floating point literal.
    Float(f64),
    /// A string literal.
    String(String),
    /// A boolean literal.
    Boolean(bool),
    /// An enum value literal, e.g. `SIT`.
    Enum(String),
    /// A variable reference, e.g. `$name`.
    Variable(String),
    /// A list literal.
    List(Vec<Spanning<InputValue>>),
    /// An input object literal.
    Object(Vec<(Spanning<String>, Spanning<InputValue>)>),
}

impl InputValue {
    /// Construct a `null` value.
    pub fn null() -> Self {
        Self::Null
    }

    /// Construct an enum value.
    pub fn enum_value<T: AsRef<str>>(s: T) -> Self {
        Self::Enum(s.as_ref().into())
    }

    /// Construct a variable value.
    pub fn variable<T: AsRef<str>>(v: T) -> Self {
        Self::Variable(v.as_ref().into())
    }

    /// Construct a [`Spanning::unlocated`] list.
    pub fn list(l: Vec<Self>) -> Self {
        Self::List(l.into_iter().map(Spanning::unlocated).collect())
    }

    /// Construct a located list.
    pub fn parsed_list(l: Vec<Spanning<Self>>) -> Self {
        Self::List(l)
    }

    /// Construct a [`Spanning::unlocated`] object.
    pub fn object<K: AsRef<str>>(o: Vec<(K, Self)>) -> Self {
        Self::Object(
            o.into_iter()
                .map(|(k, v)| {
                    (
                        Spanning::unlocated(k.as_ref().into()),
                        Spanning::unlocated(v),
                    )
                })
                .collect(),
        )
    }

    /// Construct a located object.
    pub fn parsed_object(o: Vec<(Spanning<String>, Spanning<Self>)>) -> Self {
        Self::Object(o)
    }

    /// Resolves all variables of this [`InputValue`] to their actual
    /// `values`.
    ///
    /// If a variable is not present in the `values`:
    /// - Returns [`None`] in case this is an [`InputValue::Variable`].
    /// - Skips the field in case of an [`InputValue::Object`] field.
    /// - Replaces with an [`InputValue::Null`] in case of an
    ///   [`InputValue::List`] element.
    #[must_use]
    pub fn into_const(self, values: &Variables) -> Option<Self> {
        match self {
            Self::Variable(v) => values.get(&v).cloned(),
            Self::List(l) => Some(Self::List(
                l.into_iter()
                    .map(|s| s.map(|v| v.into_const(values).unwrap_or_else(Self::null)))
                    .collect(),
            )),
            Self::Object(o) => Some(Self::Object(
                o.into_iter()
                    .filter_map(|(sk, sv)| sv.and_then(|v| v.into_const(values)).map(|sv| (sk, sv)))
                    .collect(),
            )),
            v => Some(v),
        }
    }

    /// Does the value represent a `null`?
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Does the value represent a variable?
    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }

    /// View the underlying enum value, if present.
    pub fn as_enum_value(&self) -> Option<&str> {
        match self {
            Self::Enum(e) => Some(e.as_str()),
            _ => None,
        }
    }

    /// View the underlying string value, if present.
    pub fn as_string_value(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// View the underlying boolean value, if present.
    pub fn as_boolean_value(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Converts this [`InputValue`] to a map of object field references,
    /// if it is an object value.
    pub fn to_object_value(&self) -> Option<IndexMap<&str, &Self>> {
        match self {
            Self::Object(o) => Some(
                o.iter()
                    .map(|(sk, sv)| (sk.item.as_str(), &sv.item))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Converts this [`InputValue`] to a list of value references, if it
    /// is a list value.
    pub fn to_list_value(&self) -> Option<Vec<&Self>> {
        match self {
            Self::List(l) => Some(l.iter().map(|s| &s.item).collect()),
            _ => None,
        }
    }

    /// Recursively finds all variables.
    pub fn referenced_variables(&self) -> Vec<&str> {
        match self {
            Self::Variable(name) => vec![name.as_str()],
            Self::List(l) => l
                .iter()
                .flat_map(|v| v.item.referenced_variables())
                .collect(),
            Self::Object(o) => o
                .iter()
                .flat_map(|(_, v)| v.item.referenced_variables())
                .collect(),
            _ => vec![],
        }
    }

    /// Compares equality with another [`InputValue`] ignoring any source
    /// position information.
    pub fn unlocated_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Int(i1), Self::Int(i2)) => i1 == i2,
            (Self::Float(f1), Self::Float(f2)) => f1 == f2,
            (Self::Boolean(b1), Self::Boolean(b2)) => b1 == b2,
            (Self::String(s1), Self::String(s2))
            | (Self::Enum(s1), Self::Enum(s2))
            | (Self::Variable(s1), Self::Variable(s2)) => s1 == s2,
            (Self::List(l1), Self::List(l2)) => {
                l1.len() == l2.len()
                    && l1
                        .iter()
                        .zip(l2.iter())
                        .all(|(v1, v2)| v1.item.unlocated_eq(&v2.item))
            }
            (Self::Object(o1), Self::Object(o2)) => {
                o1.len() == o2.len()
                    && o1.iter().all(|(sk1, sv1)| {
                        o2.iter().any(|(sk2, sv2)| {
                            sk1.item == sk2.item && sv1.item.unlocated_eq(&sv2.item)
                        })
                    })
            }
            _ => false,
        }
    }
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Enum(v) => write!(f, "{v}"),
            Self::Variable(v) => write!(f, "${v}"),
            Self::List(v) => {
                write!(f, "[")?;
                for (i, spanning) in v.iter().enumerate() {
                    spanning.item.fmt(f)?;
                    if i < v.len() - 1 {
                        write!(f, ", ")?;
                    }
                }
                write!(f, "]")
            }
            Self::Object(o) => {
                write!(f, "{{")?;
                for (i, (k, v)) in o.iter().enumerate() {
                    write!(f, "{}: ", k.item)?;
                    v.item.fmt(f)?;
                    if i < o.len() - 1 {
                        write!(f, ", ")?;
                    }
                }
                write!(f, "}}")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VariableDefinition<'a> {
    pub var_type: Spanning<Type<&'a str>>,
    pub default_value: Option<Spanning<InputValue>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Arguments<'a> {
    pub items: Vec<(Spanning<&'a str>, Spanning<InputValue>)>,
}

impl<'a> Arguments<'a> {
    pub fn into_iter(self) -> vec::IntoIter<(Spanning<&'a str>, Spanning<InputValue>)> {
        self.items.into_iter()
    }

    pub fn iter(&self) -> slice::Iter<'_, (Spanning<&'a str>, Spanning<InputValue>)> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Spanning<InputValue>> {
        self.items
            .iter()
            .find(|&(k, _)| k.item == key)
            .map(|(_, v)| v)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VariableDefinitions<'a> {
    pub items: Vec<(Spanning<&'a str>, VariableDefinition<'a>)>,
}

impl<'a> VariableDefinitions<'a> {
    pub fn iter(&self) -> slice::Iter<'_, (Spanning<&'a str>, VariableDefinition<'a>)> {
        self.items.iter()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Field<'a> {
    pub alias: Option<Spanning<&'a str>>,
    pub name: Spanning<&'a str>,
    pub arguments: Option<Spanning<Arguments<'a>>>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
    pub selection_set: Option<Vec<Selection<'a>>>,
}

impl<'a> Field<'a> {
    /// The key this field is written under in the response mapping: its
    /// alias if present, its name otherwise.
    pub fn response_key(&self) -> &'a str {
        self.alias.map_or(self.name.item, |a| a.item)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FragmentSpread<'a> {
    pub name: Spanning<&'a str>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InlineFragment<'a> {
    pub type_condition: Option<Spanning<&'a str>>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
    pub selection_set: Vec<Selection<'a>>,
}

/// Entry in a GraphQL selection set.
///
/// This enum represents one of the three variants of a selection that
/// exists in GraphQL: a field, a fragment spread, or an inline fragment.
/// Each of the variants references their location in the query source.
///
/// ```text
/// {
///   field(withArg: 123) { subField }
///   ...fragmentSpread
///   ...on User {
///     inlineFragmentField
///   }
/// }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Selection<'a> {
    Field(Spanning<Field<'a>>),
    FragmentSpread(Spanning<FragmentSpread<'a>>),
    InlineFragment(Spanning<InlineFragment<'a>>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Directive<'a> {
    pub name: Spanning<&'a str>,
    pub arguments: Option<Spanning<Arguments<'a>>>,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => write!(f, "query"),
            Self::Mutation => write!(f, "mutation"),
            Self::Subscription => write!(f, "subscription"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Operation<'a> {
    pub operation_type: OperationType,
    pub name: Option<Spanning<&'a str>>,
    pub variable_definitions: Option<Spanning<VariableDefinitions<'a>>>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
    pub selection_set: Vec<Selection<'a>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Fragment<'a> {
    pub name: Spanning<&'a str>,
    pub type_condition: Spanning<&'a str>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
    pub selection_set: Vec<Selection<'a>>,
}

/// A type-system definition appearing in a document.
///
/// The executor ignores these; only the validator cares, to reject them
/// from executable documents. A `None` name stands for a schema
/// definition or extension.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeSystemDefinition<'a> {
    pub name: Option<Spanning<&'a str>>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Definition<'a> {
    Operation(Spanning<Operation<'a>>),
    Fragment(Spanning<Fragment<'a>>),
    TypeSystem(Spanning<TypeSystemDefinition<'a>>),
}

pub type Document<'a> = [Definition<'a>];
pub type OwnedDocument<'a> = Vec<Definition<'a>>;
