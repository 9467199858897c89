//! Subscription operations: resolving the source stream and mapping it
//! to a stream of execution results.

use std::{
    any::Any,
    collections::HashSet,
    pin::Pin,
    sync::{Arc, RwLock},
    task::{Context, Poll},
};

use fnv::FnvHashMap;
use futures::{
    FutureExt as _, Stream,
    future::BoxFuture,
};
use indexmap::IndexMap;

use crate::{
    GraphQLError,
    ast::{Fragment, Operation, OperationType},
    coercion::coerce_argument_values,
    executor::{
        Completed, ExecutionContext, ExecutionError, ExecutionParams, FieldPath, PathSegment,
        Propagated, ResolveInfo, ResolverContext, Response, ValuesStream, Variables,
        collect_fields, execute_fields, fragment_index, get_operation, missing_root_type_response,
    },
    schema::{
        meta::{MetaType, ResolverFn},
        model::SchemaType,
    },
    span::{SourcePosition, Spanning},
    value::Value,
};

use super::TypeResolverFn;

/// The outcome of [`subscribe`]: either a stream of responses, or a
/// single response describing a failure that happened before the source
/// stream could be resolved.
pub enum SubscriptionResult<'a> {
    /// One [`Response`] per source-stream payload.
    Stream(ResponseStream<'a>),
    /// Pre-execution failure (variable coercion, missing subscription
    /// root, source-stream resolution).
    Failed(Response),
}

/// Resolves a subscription operation to its source stream and maps it to
/// a stream of per-payload execution results.
///
/// Dropping the returned stream drops the source stream, releasing its
/// resources exactly once regardless of how far the consumer got.
pub fn subscribe<'a>(
    params: &'a ExecutionParams<'a>,
) -> Result<SubscriptionResult<'a>, GraphQLError> {
    let operation = get_operation(params.document, params.operation_name)?;
    if operation.item.operation_type != OperationType::Subscription {
        return Err(GraphQLError::NotSubscription(
            operation.item.operation_type,
        ));
    }

    let fragments = Arc::new(fragment_index(params.document));
    let variables = match crate::coercion::coerce_variable_values(
        params.schema,
        &operation.item.variable_definitions,
        &params.variable_values,
    ) {
        Ok(v) => Arc::new(v),
        Err(errors) => {
            return Ok(SubscriptionResult::Failed(Response { data: None, errors }));
        }
    };

    let Some(sub_type) = params.schema.concrete_subscription_type() else {
        return Ok(SubscriptionResult::Failed(missing_root_type_response(
            OperationType::Subscription,
            operation,
        )));
    };

    let mut grouped = IndexMap::new();
    collect_fields(
        params.schema,
        &fragments,
        &variables,
        sub_type,
        &operation.item.selection_set,
        &mut grouped,
        &mut HashSet::new(),
    );
    let Some((response_key, nodes)) = grouped.into_iter().next() else {
        return Ok(SubscriptionResult::Failed(located_failure(
            operation.start(),
            vec![],
            "Subscription operations must have exactly one root field.".into(),
        )));
    };

    let node = nodes[0];
    let field_name = node.item.name.item;
    let root_path = vec![PathSegment::Field(response_key.into())];

    let Some(field_def) = sub_type.field_by_name(field_name) else {
        return Ok(SubscriptionResult::Failed(located_failure(
            node.start(),
            root_path,
            format!("The subscription field \"{field_name}\" is not defined."),
        )));
    };

    let args = match coerce_argument_values(
        params.schema,
        field_def.arguments.as_deref(),
        &node.item.arguments,
        &variables,
    ) {
        Ok(args) => args,
        Err(message) => {
            return Ok(SubscriptionResult::Failed(located_failure(
                node.start(),
                root_path,
                message,
            )));
        }
    };

    // Source streams cannot come out of a plain property read, so the
    // subscriber hook is required here.
    let Some(subscriber) = &field_def.subscriber else {
        return Ok(SubscriptionResult::Failed(located_failure(
            node.start(),
            root_path,
            format!("Subscription field \"{field_name}\" does not define a subscriber."),
        )));
    };

    let root = Arc::new(params.root_value.clone());
    let resolver_ctx = ResolverContext {
        source: root.clone(),
        args,
        context: &*params.context_value,
        info: ResolveInfo {
            field_name,
            field_node: node,
            return_type: &field_def.field_type,
            parent_type_name: sub_type.name(),
            path: FieldPath::Field(response_key, Arc::new(FieldPath::Root)),
            schema: params.schema,
            fragments: fragments.clone(),
            root_value: root,
            operation,
            variable_values: variables.clone(),
        },
    };

    let source = match subscriber(resolver_ctx) {
        Ok(stream) => stream,
        Err(e) => {
            return Ok(SubscriptionResult::Failed(Response {
                data: None,
                errors: vec![ExecutionError::new(node.start(), root_path, e)],
            }));
        }
    };

    Ok(SubscriptionResult::Stream(ResponseStream {
        source,
        parts: Arc::new(SubscriptionParts {
            schema: params.schema,
            operation,
            fragments,
            variables,
            sub_type,
            context_value: &*params.context_value,
            field_resolver: params.field_resolver.as_ref(),
            type_resolver: params.type_resolver.as_ref(),
            root_location: node.start(),
            root_path: vec![PathSegment::Field(response_key.into())],
        }),
        executing: None,
    }))
}

struct SubscriptionParts<'a> {
    schema: &'a SchemaType,
    operation: &'a Spanning<Operation<'a>>,
    fragments: Arc<FnvHashMap<&'a str, &'a Spanning<Fragment<'a>>>>,
    variables: Arc<Variables>,
    sub_type: &'a MetaType,
    context_value: &'a (dyn Any + Send + Sync),
    field_resolver: Option<&'a ResolverFn>,
    type_resolver: Option<&'a TypeResolverFn>,
    root_location: SourcePosition,
    root_path: Vec<PathSegment>,
}

/// A stream of [`Response`]s, one per source-stream payload.
///
/// Each payload is executed against the subscription root type with the
/// payload as the root value. The source stream is owned by this stream
/// and dropped with it.
pub struct ResponseStream<'a> {
    source: ValuesStream<'a>,
    parts: Arc<SubscriptionParts<'a>>,
    executing: Option<BoxFuture<'a, Response>>,
}

impl Stream for ResponseStream<'_> {
    type Item = Response;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if let Some(fut) = &mut this.executing {
                match fut.as_mut().poll(cx) {
                    Poll::Ready(response) => {
                        this.executing = None;
                        return Poll::Ready(Some(response));
                    }
                    Poll::Pending => return Poll::Pending,
                }
            }

            match Pin::new(&mut this.source).poll_next(cx) {
                Poll::Ready(Some(Ok(payload))) => {
                    this.executing = Some(execute_source_event(this.parts.clone(), payload));
                }
                Poll::Ready(Some(Err(e))) => {
                    let parts = &this.parts;
                    return Poll::Ready(Some(Response {
                        data: None,
                        errors: vec![ExecutionError::new(
                            parts.root_location,
                            parts.root_path.clone(),
                            e,
                        )],
                    }));
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

fn execute_source_event<'a>(
    parts: Arc<SubscriptionParts<'a>>,
    payload: Value,
) -> BoxFuture<'a, Response> {
    async move {
        let errors = RwLock::new(Vec::new());
        let root = Arc::new(payload);
        let ctx = ExecutionContext {
            schema: parts.schema,
            fragments: &parts.fragments,
            operation: parts.operation,
            variables: &parts.variables,
            root_value: &root,
            context_value: parts.context_value,
            field_resolver: parts.field_resolver,
            type_resolver: parts.type_resolver,
            errors: &errors,
        };

        let mut grouped = IndexMap::new();
        collect_fields(
            parts.schema,
            &parts.fragments,
            &parts.variables,
            parts.sub_type,
            &parts.operation.item.selection_set,
            &mut grouped,
            &mut HashSet::new(),
        );

        let data = match execute_fields(
            ctx,
            parts.sub_type,
            root.clone(),
            FieldPath::Root,
            grouped,
            false,
        ) {
            Ok(Completed::Ready(v)) => v,
            Ok(Completed::Deferred(f)) => f.await.unwrap_or(Value::Null),
            Err(Propagated) => Value::Null,
        };

        Response {
            data: Some(data),
            errors: ExecutionContext::into_errors(errors),
        }
    }
    .boxed()
}

fn located_failure(
    location: SourcePosition,
    path: Vec<PathSegment>,
    message: String,
) -> Response {
    Response {
        data: None,
        errors: vec![ExecutionError::new(location, path, message.into())],
    }
}
