//! Resolve the document to values.

use std::{
    any::Any,
    collections::{HashMap, HashSet},
    fmt::{self, Display},
    sync::{Arc, RwLock},
};

use arcstr::ArcStr;
use fnv::FnvHashMap;
use futures::future::{self, BoxFuture, FutureExt as _};
use futures::stream::BoxStream;
use indexmap::IndexMap;

use crate::{
    GraphQLError,
    ast::{
        Definition, Document, Field as AstField, Fragment, InputValue, Operation, OperationType,
        Selection, Type,
    },
    coercion::{coerce_argument_values, coerce_variable_values},
    directives::is_excluded,
    schema::{
        meta::{Field as FieldMeta, MetaType, ResolverFn},
        model::SchemaType,
    },
    span::{SourcePosition, Spanning},
    value::{Object, Value},
};

pub use self::subscriptions::{ResponseStream, SubscriptionResult, subscribe};

mod subscriptions;

/// The map of variables used for substitution during query execution.
pub type Variables = HashMap<String, InputValue>;

/// Coerced argument values for a field or a directive, in declaration
/// order.
pub type Arguments = IndexMap<String, InputValue>;

/// The result of resolving the value of a field.
pub type FieldResult<T> = Result<T, FieldError>;

/// Boxed [`futures::Stream`] yielding the source payload values of a
/// subscription field.
pub type ValuesStream<'a> = BoxStream<'a, FieldResult<Value>>;

/// A request-level override of the abstract-type discriminator, applied
/// when an abstract type carries no `resolve_type` of its own.
pub type TypeResolverFn =
    Box<dyn Fn(&Value, &MetaType, &SchemaType) -> Option<ArcStr> + Send + Sync>;

/// A value produced by a field resolver: either an immediately available
/// [`Value`], or a deferred computation.
///
/// An all-synchronous query never touches the [`Deferred`] arm, and never
/// allocates a future.
///
/// [`Deferred`]: ResolvedValue::Deferred
pub enum ResolvedValue<'a> {
    /// The value is available synchronously.
    Ready(Value),
    /// The value will be produced by the contained future.
    Deferred(BoxFuture<'a, FieldResult<Value>>),
}

impl<'a> ResolvedValue<'a> {
    /// Wraps an immediately available value.
    pub fn ready(value: impl Into<Value>) -> Self {
        Self::Ready(value.into())
    }

    /// Wraps a deferred computation.
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = FieldResult<Value>> + Send + 'a,
    {
        Self::Deferred(future.boxed())
    }
}

/// Error type for errors that occur during field resolution.
///
/// Field errors are represented by a human-readable error message and an
/// optional [`Value`] structure containing additional information.
///
/// They can be converted to from any type that implements
/// [`std::fmt::Display`], which makes error chaining with the `?`
/// operator a breeze.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldError {
    message: String,
    extensions: Value,
}

impl<T: Display> From<T> for FieldError {
    fn from(e: T) -> Self {
        Self {
            message: e.to_string(),
            extensions: Value::Null,
        }
    }
}

impl FieldError {
    /// Construct a new [`FieldError`] with additional data.
    ///
    /// The `extensions` parameter will be added to the `"extensions"`
    /// field of the error object in the response. If the argument is
    /// [`Value::Null`], then no extra data will be included.
    #[must_use]
    pub fn new<T: Display>(e: T, extensions: Value) -> Self {
        Self {
            message: e.to_string(),
            extensions,
        }
    }

    /// Returns the `"message"` field of this [`FieldError`].
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the `"extensions"` field of this [`FieldError`].
    ///
    /// If there is no `"extensions"`, then [`Value::Null`] will be
    /// returned.
    #[must_use]
    pub fn extensions(&self) -> &Value {
        &self.extensions
    }
}

/// A segment of a response path: either a response key, or a list index.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(s) => write!(f, "{s}"),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

/// A persistent linked list of response-path segments.
///
/// Cloning is cheap: parents are shared through [`Arc`].
#[derive(Clone, Debug)]
pub enum FieldPath<'a> {
    Root,
    Field(&'a str, Arc<FieldPath<'a>>),
    Index(usize, Arc<FieldPath<'a>>),
}

impl FieldPath<'_> {
    /// Flattens this path into an ordered sequence of segments, root
    /// first.
    pub fn to_segments(&self) -> Vec<PathSegment> {
        let mut acc = match self {
            Self::Root => Vec::new(),
            Self::Field(_, parent) | Self::Index(_, parent) => parent.to_segments(),
        };
        match self {
            Self::Root => {}
            Self::Field(name, _) => acc.push(PathSegment::Field((*name).into())),
            Self::Index(idx, _) => acc.push(PathSegment::Index(*idx)),
        }
        acc
    }
}

/// Error type for errors that occur during query execution.
///
/// All execution errors contain the source position in the query of the
/// field that failed to resolve, and the response path to it.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionError {
    location: SourcePosition,
    path: Vec<PathSegment>,
    error: FieldError,
}

impl ExecutionError {
    #[doc(hidden)]
    pub fn new(location: SourcePosition, path: Vec<PathSegment>, error: FieldError) -> Self {
        Self {
            location,
            path,
            error,
        }
    }

    /// Construct a new execution error occurring at the beginning of the
    /// query.
    pub fn at_origin(error: FieldError) -> Self {
        Self::new(SourcePosition::new_origin(), vec![], error)
    }

    /// The error message.
    pub fn error(&self) -> &FieldError {
        &self.error
    }

    /// The source location.
    pub fn location(&self) -> SourcePosition {
        self.location
    }

    /// The response path.
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }
}

/// The result of executing one operation: the response tree plus the
/// field errors collected along the way.
///
/// `data` is `None` when execution failed before any field ran (variable
/// coercion, missing root type), and `Some(Value::Null)` when a non-null
/// failure propagated through the root.
#[derive(Debug, PartialEq)]
pub struct Response {
    pub data: Option<Value>,
    pub errors: Vec<ExecutionError>,
}

/// Everything needed to execute one operation against a schema.
pub struct ExecutionParams<'a> {
    pub(crate) schema: &'a SchemaType,
    pub(crate) document: &'a Document<'a>,
    pub(crate) operation_name: Option<&'a str>,
    pub(crate) root_value: Value,
    pub(crate) context_value: Box<dyn Any + Send + Sync>,
    pub(crate) variable_values: Variables,
    pub(crate) field_resolver: Option<ResolverFn>,
    pub(crate) type_resolver: Option<TypeResolverFn>,
}

impl<'a> ExecutionParams<'a> {
    /// Starts building execution parameters for the given schema and
    /// document.
    pub fn new(schema: &'a SchemaType, document: &'a Document<'a>) -> Self {
        Self {
            schema,
            document,
            operation_name: None,
            root_value: Value::Null,
            context_value: Box::new(()),
            variable_values: Variables::new(),
            field_resolver: None,
            type_resolver: None,
        }
    }

    /// Selects the operation to execute by name.
    #[must_use]
    pub fn operation_name(mut self, name: &'a str) -> Self {
        self.operation_name = Some(name);
        self
    }

    /// Sets the root value the root selection set executes against.
    #[must_use]
    pub fn root_value(mut self, root: Value) -> Self {
        self.root_value = root;
        self
    }

    /// Sets the request-scoped context value handed to every resolver.
    #[must_use]
    pub fn context_value(mut self, context: impl Any + Send + Sync) -> Self {
        self.context_value = Box::new(context);
        self
    }

    /// Sets the (uncoerced) variable values for the operation.
    #[must_use]
    pub fn variables(mut self, variables: Variables) -> Self {
        self.variable_values = variables;
        self
    }

    /// Overrides the fallback resolver used for fields without one.
    #[must_use]
    pub fn field_resolver<F>(mut self, f: F) -> Self
    where
        F: for<'r> Fn(ResolverContext<'r>) -> FieldResult<ResolvedValue<'r>>
            + Send
            + Sync
            + 'static,
    {
        self.field_resolver = Some(Box::new(f));
        self
    }

    /// Overrides the fallback abstract-type discriminator.
    #[must_use]
    pub fn type_resolver<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &MetaType, &SchemaType) -> Option<ArcStr> + Send + Sync + 'static,
    {
        self.type_resolver = Some(Box::new(f));
        self
    }
}

/// Static information about the field being resolved.
pub struct ResolveInfo<'a> {
    pub field_name: &'a str,
    pub field_node: &'a Spanning<AstField<'a>>,
    pub return_type: &'a Type<ArcStr>,
    pub parent_type_name: &'a str,
    pub path: FieldPath<'a>,
    pub schema: &'a SchemaType,
    pub fragments: Arc<FnvHashMap<&'a str, &'a Spanning<Fragment<'a>>>>,
    pub root_value: Arc<Value>,
    pub operation: &'a Spanning<Operation<'a>>,
    pub variable_values: Arc<Variables>,
}

/// Everything a field resolver receives: the parent source value, the
/// coerced arguments, the request context, and the resolve info.
pub struct ResolverContext<'a> {
    pub source: Arc<Value>,
    pub args: Arguments,
    pub context: &'a (dyn Any + Send + Sync),
    pub info: ResolveInfo<'a>,
}

/// The default field resolver: reads the property named after the field
/// off the source object, `null` when the source is not an object or
/// carries no such property.
pub fn default_field_resolver<'a>(ctx: ResolverContext<'a>) -> FieldResult<ResolvedValue<'a>> {
    let value = ctx
        .source
        .as_object_value()
        .and_then(|o| o.get_field_value(ctx.info.field_name))
        .cloned()
        .unwrap_or(Value::Null);
    Ok(ResolvedValue::Ready(value))
}

/// The default abstract-type discriminator: a `__typename` string
/// property wins, otherwise the first possible type whose `is_type_of`
/// accepts the value.
pub fn default_type_resolver(
    value: &Value,
    abstract_type: &MetaType,
    schema: &SchemaType,
) -> Option<ArcStr> {
    if let Some(name) = value
        .as_object_value()
        .and_then(|o| o.get_field_value("__typename"))
        .and_then(Value::as_string_value)
    {
        return Some(ArcStr::from(name));
    }

    schema
        .possible_types(abstract_type)
        .into_iter()
        .find_map(|t| match t {
            MetaType::Object(o) => o
                .is_type_of
                .as_ref()
                .filter(|f| f(value))
                .map(|_| o.name.clone()),
            _ => None,
        })
}

/// Marker for a field error that has already been recorded and now
/// `null`-propagates towards the nearest nullable ancestor.
pub(crate) struct Propagated;

/// A completed response value, either available synchronously or pending
/// asynchronous resolution.
pub(crate) enum Completed<'e> {
    Ready(Value),
    Deferred(BoxFuture<'e, Result<Value, Propagated>>),
}

#[derive(Clone, Copy)]
pub(crate) struct ExecutionContext<'e> {
    pub(crate) schema: &'e SchemaType,
    pub(crate) fragments: &'e Arc<FnvHashMap<&'e str, &'e Spanning<Fragment<'e>>>>,
    pub(crate) operation: &'e Spanning<Operation<'e>>,
    pub(crate) variables: &'e Arc<Variables>,
    pub(crate) root_value: &'e Arc<Value>,
    pub(crate) context_value: &'e (dyn Any + Send + Sync),
    pub(crate) field_resolver: Option<&'e ResolverFn>,
    pub(crate) type_resolver: Option<&'e TypeResolverFn>,
    pub(crate) errors: &'e RwLock<Vec<ExecutionError>>,
}

impl<'e> ExecutionContext<'e> {
    fn push_error(&self, error: FieldError, location: SourcePosition, path: &FieldPath<'e>) {
        self.errors
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(ExecutionError::new(location, path.to_segments(), error));
    }

    fn into_errors(errors: RwLock<Vec<ExecutionError>>) -> Vec<ExecutionError> {
        errors.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

/// Executes an operation of the provided document against the schema,
/// resolving fields concurrently wherever the operation kind allows it.
///
/// Pre-execution failures that callers must fix (an unknown or ambiguous
/// operation name) surface as [`GraphQLError`]s; failures tied to the
/// request data (variable coercion, missing root type) come back as a
/// [`Response`] without `data`.
pub async fn execute<'a>(params: &'a ExecutionParams<'a>) -> Result<Response, GraphQLError> {
    let operation = get_operation(params.document, params.operation_name)?;

    let fragments = Arc::new(fragment_index(params.document));
    let variables = match coerce_variable_values(
        params.schema,
        &operation.item.variable_definitions,
        &params.variable_values,
    ) {
        Ok(v) => Arc::new(v),
        Err(errors) => {
            return Ok(Response { data: None, errors });
        }
    };

    let op_type = operation.item.operation_type;
    let Some(root_type) = params.schema.root_type_for(op_type) else {
        return Ok(missing_root_type_response(op_type, operation));
    };

    let errors = RwLock::new(Vec::new());
    let root = Arc::new(params.root_value.clone());
    let ctx = ExecutionContext {
        schema: params.schema,
        fragments: &fragments,
        operation,
        variables: &variables,
        root_value: &root,
        context_value: &*params.context_value,
        field_resolver: params.field_resolver.as_ref(),
        type_resolver: params.type_resolver.as_ref(),
        errors: &errors,
    };

    let mut grouped = IndexMap::new();
    collect_fields(
        ctx.schema,
        &fragments,
        &variables,
        root_type,
        &operation.item.selection_set,
        &mut grouped,
        &mut HashSet::new(),
    );

    let serial = op_type == OperationType::Mutation;
    let data = match execute_fields(ctx, root_type, root.clone(), FieldPath::Root, grouped, serial)
    {
        Ok(Completed::Ready(v)) => v,
        Ok(Completed::Deferred(f)) => f.await.unwrap_or(Value::Null),
        Err(Propagated) => Value::Null,
    };

    Ok(Response {
        data: Some(data),
        errors: ExecutionContext::into_errors(errors),
    })
}

/// Executes an operation like [`execute`], but fails with
/// [`GraphQLError::NotSynchronous`] as soon as any field resolution
/// suspends.
pub fn execute_sync(params: &ExecutionParams<'_>) -> Result<Response, GraphQLError> {
    let operation = get_operation(params.document, params.operation_name)?;

    let fragments = Arc::new(fragment_index(params.document));
    let variables = match coerce_variable_values(
        params.schema,
        &operation.item.variable_definitions,
        &params.variable_values,
    ) {
        Ok(v) => Arc::new(v),
        Err(errors) => {
            return Ok(Response { data: None, errors });
        }
    };

    let op_type = operation.item.operation_type;
    let Some(root_type) = params.schema.root_type_for(op_type) else {
        return Ok(missing_root_type_response(op_type, operation));
    };

    let errors = RwLock::new(Vec::new());
    let root = Arc::new(params.root_value.clone());
    let ctx = ExecutionContext {
        schema: params.schema,
        fragments: &fragments,
        operation,
        variables: &variables,
        root_value: &root,
        context_value: &*params.context_value,
        field_resolver: params.field_resolver.as_ref(),
        type_resolver: params.type_resolver.as_ref(),
        errors: &errors,
    };

    let mut grouped = IndexMap::new();
    collect_fields(
        ctx.schema,
        &fragments,
        &variables,
        root_type,
        &operation.item.selection_set,
        &mut grouped,
        &mut HashSet::new(),
    );

    let serial = op_type == OperationType::Mutation;
    let data = match execute_fields(ctx, root_type, root.clone(), FieldPath::Root, grouped, serial)
    {
        Ok(Completed::Ready(v)) => v,
        Ok(Completed::Deferred(..)) => return Err(GraphQLError::NotSynchronous),
        Err(Propagated) => Value::Null,
    };

    Ok(Response {
        data: Some(data),
        errors: ExecutionContext::into_errors(errors),
    })
}

pub(crate) fn get_operation<'a, 'd>(
    document: &'a Document<'d>,
    operation_name: Option<&str>,
) -> Result<&'a Spanning<Operation<'d>>, GraphQLError> {
    let mut operations = document.iter().filter_map(|d| match d {
        Definition::Operation(op) => Some(op),
        _ => None,
    });

    match operation_name {
        Some(name) => operations
            .find(|op| op.item.name.is_some_and(|n| n.item == name))
            .ok_or_else(|| GraphQLError::UnknownOperationName(name.into())),
        None => {
            let first = operations.next().ok_or(GraphQLError::NoOperationProvided)?;
            if operations.next().is_some() {
                Err(GraphQLError::MultipleOperationsProvided)
            } else {
                Ok(first)
            }
        }
    }
}

pub(crate) fn fragment_index<'a, 'd>(
    document: &'a Document<'d>,
) -> FnvHashMap<&'a str, &'a Spanning<Fragment<'d>>> {
    document
        .iter()
        .filter_map(|d| match d {
            Definition::Fragment(f) => Some((f.item.name.item, f)),
            _ => None,
        })
        .collect()
}

pub(crate) fn missing_root_type_response(
    op_type: OperationType,
    operation: &Spanning<Operation<'_>>,
) -> Response {
    Response {
        data: None,
        errors: vec![ExecutionError::new(
            operation.start(),
            vec![],
            format!("Schema is not configured to execute {op_type} operation.").into(),
        )],
    }
}

/// Collects the fields of a selection set into `grouped`, keyed by
/// response key, resolving fragments and `@skip`/`@include` along the
/// way.
pub(crate) fn collect_fields<'e>(
    schema: &'e SchemaType,
    fragments: &FnvHashMap<&'e str, &'e Spanning<Fragment<'e>>>,
    variables: &Variables,
    parent: &'e MetaType,
    selection_set: &'e [Selection<'e>],
    grouped: &mut IndexMap<&'e str, Vec<&'e Spanning<AstField<'e>>>>,
    visited_fragments: &mut HashSet<&'e str>,
) {
    for selection in selection_set {
        match selection {
            Selection::Field(f) => {
                if is_excluded(&f.item.directives, schema, variables) {
                    continue;
                }
                grouped
                    .entry(f.item.response_key())
                    .or_default()
                    .push(f);
            }
            Selection::InlineFragment(frag) => {
                if is_excluded(&frag.item.directives, schema, variables) {
                    continue;
                }
                if let Some(cond) = &frag.item.type_condition
                    && !fragment_condition_matches(schema, cond.item, parent)
                {
                    continue;
                }
                collect_fields(
                    schema,
                    fragments,
                    variables,
                    parent,
                    &frag.item.selection_set,
                    grouped,
                    visited_fragments,
                );
            }
            Selection::FragmentSpread(spread) => {
                if is_excluded(&spread.item.directives, schema, variables) {
                    continue;
                }
                if !visited_fragments.insert(spread.item.name.item) {
                    continue;
                }
                let Some(fragment) = fragments.get(spread.item.name.item) else {
                    continue;
                };
                if !fragment_condition_matches(schema, fragment.item.type_condition.item, parent) {
                    continue;
                }
                collect_fields(
                    schema,
                    fragments,
                    variables,
                    parent,
                    &fragment.item.selection_set,
                    grouped,
                    visited_fragments,
                );
            }
        }
    }
}

fn fragment_condition_matches(schema: &SchemaType, condition: &str, parent: &MetaType) -> bool {
    match schema.concrete_type_by_name(condition) {
        Some(cond_type) if std::ptr::eq(cond_type, parent) => true,
        Some(cond_type) if cond_type.is_abstract() => schema.is_possible_type(cond_type, parent),
        _ => false,
    }
}

pub(crate) fn execute_fields<'e>(
    ctx: ExecutionContext<'e>,
    parent: &'e MetaType,
    source: Arc<Value>,
    path: FieldPath<'e>,
    grouped: IndexMap<&'e str, Vec<&'e Spanning<AstField<'e>>>>,
    serial: bool,
) -> Result<Completed<'e>, Propagated> {
    if serial {
        execute_fields_serial(ctx, parent, source, path, grouped)
    } else {
        execute_fields_parallel(ctx, parent, source, path, grouped)
    }
}

enum FieldSlot {
    Done(Value),
    Pending(usize),
}

fn execute_fields_parallel<'e>(
    ctx: ExecutionContext<'e>,
    parent: &'e MetaType,
    source: Arc<Value>,
    path: FieldPath<'e>,
    grouped: IndexMap<&'e str, Vec<&'e Spanning<AstField<'e>>>>,
) -> Result<Completed<'e>, Propagated> {
    let mut keys = Vec::with_capacity(grouped.len());
    let mut slots = Vec::with_capacity(grouped.len());
    let mut futures = Vec::new();

    for (response_key, nodes) in grouped {
        let Some(resolved) = resolve_field(ctx, parent, &source, &path, response_key, nodes) else {
            continue;
        };
        keys.push(response_key);
        match resolved? {
            Completed::Ready(v) => slots.push(FieldSlot::Done(v)),
            Completed::Deferred(f) => {
                slots.push(FieldSlot::Pending(futures.len()));
                futures.push(f);
            }
        }
    }

    if futures.is_empty() {
        let mut object = Object::with_capacity(keys.len());
        for (key, slot) in keys.into_iter().zip(slots) {
            if let FieldSlot::Done(v) = slot {
                object.add_field(key, v);
            }
        }
        return Ok(Completed::Ready(Value::Object(object)));
    }

    Ok(Completed::Deferred(
        async move {
            let mut results: Vec<Option<Result<Value, Propagated>>> = future::join_all(futures)
                .await
                .into_iter()
                .map(Some)
                .collect();

            let mut object = Object::with_capacity(keys.len());
            for (key, slot) in keys.into_iter().zip(slots) {
                match slot {
                    FieldSlot::Done(v) => {
                        object.add_field(key, v);
                    }
                    FieldSlot::Pending(i) => {
                        let v = results[i].take().expect("pending slot resolved once")?;
                        object.add_field(key, v);
                    }
                }
            }
            Ok(Value::Object(object))
        }
        .boxed(),
    ))
}

fn execute_fields_serial<'e>(
    ctx: ExecutionContext<'e>,
    parent: &'e MetaType,
    source: Arc<Value>,
    path: FieldPath<'e>,
    grouped: IndexMap<&'e str, Vec<&'e Spanning<AstField<'e>>>>,
) -> Result<Completed<'e>, Propagated> {
    let mut object = Object::with_capacity(grouped.len());
    let mut iter = grouped.into_iter();

    while let Some((response_key, nodes)) = iter.next() {
        let Some(resolved) = resolve_field(ctx, parent, &source, &path, response_key, nodes) else {
            continue;
        };
        match resolved? {
            Completed::Ready(v) => {
                object.add_field(response_key, v);
            }
            Completed::Deferred(f) => {
                return Ok(Completed::Deferred(
                    async move {
                        object.add_field(response_key, f.await?);
                        for (response_key, nodes) in iter {
                            let Some(resolved) =
                                resolve_field(ctx, parent, &source, &path, response_key, nodes)
                            else {
                                continue;
                            };
                            match resolved? {
                                Completed::Ready(v) => {
                                    object.add_field(response_key, v);
                                }
                                Completed::Deferred(f) => {
                                    object.add_field(response_key, f.await?);
                                }
                            }
                        }
                        Ok(Value::Object(object))
                    }
                    .boxed(),
                ));
            }
        }
    }

    Ok(Completed::Ready(Value::Object(object)))
}

/// Resolves one response key of an object. `None` means the field is not
/// defined on the parent type and its key is omitted from the result
/// mapping.
fn resolve_field<'e>(
    ctx: ExecutionContext<'e>,
    parent: &'e MetaType,
    source: &Arc<Value>,
    path: &FieldPath<'e>,
    response_key: &'e str,
    nodes: Vec<&'e Spanning<AstField<'e>>>,
) -> Option<Result<Completed<'e>, Propagated>> {
    let node = *nodes.first()?;
    let field_name = node.item.name.item;

    if field_name == "__typename" {
        return Some(Ok(Completed::Ready(Value::scalar(parent.name()))));
    }

    let field_def = parent.field_by_name(field_name)?;
    let field_path = FieldPath::Field(response_key, Arc::new(path.clone()));

    let args = match coerce_argument_values(
        ctx.schema,
        field_def.arguments.as_deref(),
        &node.item.arguments,
        ctx.variables,
    ) {
        Ok(args) => args,
        Err(message) => {
            return Some(fail_field(
                ctx,
                &field_def.field_type,
                message.into(),
                node.start(),
                field_path,
            ));
        }
    };

    let resolver_ctx = ResolverContext {
        source: source.clone(),
        args,
        context: ctx.context_value,
        info: ResolveInfo {
            field_name,
            field_node: node,
            return_type: &field_def.field_type,
            parent_type_name: parent.name(),
            path: field_path.clone(),
            schema: ctx.schema,
            fragments: ctx.fragments.clone(),
            root_value: ctx.root_value.clone(),
            operation: ctx.operation,
            variable_values: ctx.variables.clone(),
        },
    };

    let resolved = match (&field_def.resolver, ctx.field_resolver) {
        (Some(r), _) => r(resolver_ctx),
        (None, Some(r)) => r(resolver_ctx),
        (None, None) => default_field_resolver(resolver_ctx),
    };

    Some(complete_resolved(
        ctx,
        field_def,
        parent.name(),
        nodes,
        field_path,
        resolved,
    ))
}

/// Records a field error and decides between a `null` result and
/// propagation, based on the field type's nullability.
fn fail_field<'e>(
    ctx: ExecutionContext<'e>,
    field_type: &Type<ArcStr>,
    error: FieldError,
    location: SourcePosition,
    path: FieldPath<'e>,
) -> Result<Completed<'e>, Propagated> {
    ctx.push_error(error, location, &path);
    if field_type.is_non_null() {
        Err(Propagated)
    } else {
        Ok(Completed::Ready(Value::Null))
    }
}

fn complete_resolved<'e>(
    ctx: ExecutionContext<'e>,
    field_def: &'e FieldMeta,
    parent_name: &'e str,
    nodes: Vec<&'e Spanning<AstField<'e>>>,
    path: FieldPath<'e>,
    resolved: FieldResult<ResolvedValue<'e>>,
) -> Result<Completed<'e>, Propagated> {
    let node = nodes[0];
    match resolved {
        Ok(ResolvedValue::Ready(v)) => {
            complete_value(ctx, &field_def.field_type, parent_name, nodes, path, v)
        }
        Ok(ResolvedValue::Deferred(f)) => {
            let ty = &field_def.field_type;
            Ok(Completed::Deferred(
                async move {
                    match f.await {
                        Ok(v) => {
                            match complete_value(ctx, ty, parent_name, nodes, path, v)? {
                                Completed::Ready(v) => Ok(v),
                                Completed::Deferred(f) => f.await,
                            }
                        }
                        Err(e) => {
                            ctx.push_error(e, node.start(), &path);
                            if ty.is_non_null() {
                                Err(Propagated)
                            } else {
                                Ok(Value::Null)
                            }
                        }
                    }
                }
                .boxed(),
            ))
        }
        Err(e) => fail_field(ctx, &field_def.field_type, e, node.start(), path),
    }
}

/// Completes a resolved value against its declared return type,
/// recursing through lists and selection sets.
fn complete_value<'e>(
    ctx: ExecutionContext<'e>,
    return_type: &'e Type<ArcStr>,
    parent_name: &'e str,
    nodes: Vec<&'e Spanning<AstField<'e>>>,
    path: FieldPath<'e>,
    value: Value,
) -> Result<Completed<'e>, Propagated> {
    let node = nodes[0];
    let non_null = return_type.is_non_null();

    if value.is_null() {
        if non_null {
            ctx.push_error(
                format!(
                    "Cannot return null for non-nullable field {parent_name}.{}.",
                    node.item.name.item,
                )
                .into(),
                node.start(),
                &path,
            );
            return Err(Propagated);
        }
        return Ok(Completed::Ready(Value::Null));
    }

    let completed = complete_present_value(ctx, return_type, parent_name, nodes, &path, value);
    if non_null {
        completed
    } else {
        // A failure below this point null-propagates no further than
        // here.
        match completed {
            Err(Propagated) => Ok(Completed::Ready(Value::Null)),
            Ok(Completed::Deferred(f)) => Ok(Completed::Deferred(
                async move { Ok(f.await.unwrap_or(Value::Null)) }.boxed(),
            )),
            ok => ok,
        }
    }
}

fn complete_present_value<'e>(
    ctx: ExecutionContext<'e>,
    return_type: &'e Type<ArcStr>,
    parent_name: &'e str,
    nodes: Vec<&'e Spanning<AstField<'e>>>,
    path: &FieldPath<'e>,
    value: Value,
) -> Result<Completed<'e>, Propagated> {
    let node = nodes[0];

    if let Some(inner) = return_type.list_contents() {
        return complete_list_value(ctx, inner, parent_name, nodes, path, value);
    }

    let type_name = return_type.innermost_name();
    let Some(meta) = ctx.schema.concrete_type_by_name(type_name) else {
        ctx.push_error(
            format!("Cannot complete value of unknown type \"{type_name}\".").into(),
            node.start(),
            path,
        );
        return Err(Propagated);
    };

    match meta {
        MetaType::Scalar(s) => match (s.serialize_fn)(&value) {
            Ok(v) => Ok(Completed::Ready(v)),
            Err(message) => {
                ctx.push_error(message.into(), node.start(), path);
                Err(Propagated)
            }
        },
        MetaType::Enum(..) => match &value {
            Value::String(s) if meta.enum_value_by_name(s).is_some() => {
                Ok(Completed::Ready(value.clone()))
            }
            _ => {
                ctx.push_error(
                    format!("Enum \"{type_name}\" cannot represent value: {value}.").into(),
                    node.start(),
                    path,
                );
                Err(Propagated)
            }
        },
        MetaType::Object(..) => complete_object_value(ctx, meta, nodes, path, value),
        MetaType::Interface(..) | MetaType::Union(..) => {
            complete_abstract_value(ctx, meta, parent_name, nodes, path, value)
        }
        MetaType::InputObject(..) => {
            ctx.push_error(
                format!("Field of input type \"{type_name}\" cannot be resolved.").into(),
                node.start(),
                path,
            );
            Err(Propagated)
        }
    }
}

fn complete_list_value<'e>(
    ctx: ExecutionContext<'e>,
    item_type: &'e Type<ArcStr>,
    parent_name: &'e str,
    nodes: Vec<&'e Spanning<AstField<'e>>>,
    path: &FieldPath<'e>,
    value: Value,
) -> Result<Completed<'e>, Propagated> {
    let node = nodes[0];
    let Value::List(items) = value else {
        ctx.push_error(
            format!(
                "Expected a list, but did not find one for field {parent_name}.{}.",
                node.item.name.item,
            )
            .into(),
            node.start(),
            path,
        );
        return Err(Propagated);
    };

    let mut slots = Vec::with_capacity(items.len());
    let mut futures = Vec::new();
    for (index, item) in items.into_iter().enumerate() {
        let item_path = FieldPath::Index(index, Arc::new(path.clone()));
        match complete_value(ctx, item_type, parent_name, nodes.clone(), item_path, item)? {
            Completed::Ready(v) => slots.push(FieldSlot::Done(v)),
            Completed::Deferred(f) => {
                slots.push(FieldSlot::Pending(futures.len()));
                futures.push(f);
            }
        }
    }

    if futures.is_empty() {
        let list = slots
            .into_iter()
            .map(|slot| match slot {
                FieldSlot::Done(v) => v,
                FieldSlot::Pending(..) => Value::Null,
            })
            .collect();
        return Ok(Completed::Ready(Value::List(list)));
    }

    Ok(Completed::Deferred(
        async move {
            let mut results: Vec<Option<Result<Value, Propagated>>> = future::join_all(futures)
                .await
                .into_iter()
                .map(Some)
                .collect();

            let mut list = Vec::with_capacity(slots.len());
            for slot in slots {
                match slot {
                    FieldSlot::Done(v) => list.push(v),
                    FieldSlot::Pending(i) => {
                        list.push(results[i].take().expect("pending slot resolved once")?)
                    }
                }
            }
            Ok(Value::List(list))
        }
        .boxed(),
    ))
}

fn complete_abstract_value<'e>(
    ctx: ExecutionContext<'e>,
    abstract_meta: &'e MetaType,
    parent_name: &'e str,
    nodes: Vec<&'e Spanning<AstField<'e>>>,
    path: &FieldPath<'e>,
    value: Value,
) -> Result<Completed<'e>, Propagated> {
    let node = nodes[0];
    let abstract_name = abstract_meta.name();

    let own_resolver = match abstract_meta {
        MetaType::Interface(i) => i.resolve_type.as_ref(),
        MetaType::Union(u) => u.resolve_type.as_ref(),
        _ => None,
    };

    let resolved_name = match own_resolver {
        Some(f) => f(&value),
        None => match ctx.type_resolver {
            Some(f) => f(&value, abstract_meta, ctx.schema),
            None => default_type_resolver(&value, abstract_meta, ctx.schema),
        },
    };

    let Some(concrete_name) = resolved_name else {
        ctx.push_error(
            format!(
                "Abstract type \"{abstract_name}\" must resolve to an Object type at runtime \
                 for field {parent_name}.{}.",
                node.item.name.item,
            )
            .into(),
            node.start(),
            path,
        );
        return Err(Propagated);
    };

    let concrete = match ctx.schema.concrete_type_by_name(&concrete_name) {
        Some(t)
            if matches!(t, MetaType::Object(..))
                && ctx.schema.is_possible_type(abstract_meta, t) =>
        {
            Some(t)
        }
        _ => None,
    };
    let Some(concrete) = concrete else {
        ctx.push_error(
            format!(
                "Runtime Object type \"{concrete_name}\" is not a possible type \
                 for \"{abstract_name}\".",
            )
            .into(),
            node.start(),
            path,
        );
        return Err(Propagated);
    };

    complete_object_value(ctx, concrete, nodes, path, value)
}

fn complete_object_value<'e>(
    ctx: ExecutionContext<'e>,
    object_meta: &'e MetaType,
    nodes: Vec<&'e Spanning<AstField<'e>>>,
    path: &FieldPath<'e>,
    value: Value,
) -> Result<Completed<'e>, Propagated> {
    let node = nodes[0];

    if let MetaType::Object(o) = object_meta
        && let Some(is_type_of) = &o.is_type_of
        && !is_type_of(&value)
    {
        ctx.push_error(
            format!("Expected value of type \"{}\" but received: {value}.", o.name).into(),
            node.start(),
            path,
        );
        return Err(Propagated);
    }

    let mut grouped = IndexMap::new();
    let mut visited = HashSet::new();
    for n in &nodes {
        if let Some(selection_set) = &n.item.selection_set {
            collect_fields(
                ctx.schema,
                ctx.fragments,
                ctx.variables,
                object_meta,
                selection_set,
                &mut grouped,
                &mut visited,
            );
        }
    }

    execute_fields(
        ctx,
        object_meta,
        Arc::new(value),
        path.clone(),
        grouped,
        false,
    )
}
