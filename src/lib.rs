//! GraphQL query validation and execution engine.
//!
//! This crate is the execution and validation core of a GraphQL server:
//! given a runtime [schema](schema::model::SchemaType) and a parsed
//! [document](ast::Document), it validates the document against the
//! canonical rule suite and executes operations against resolver
//! closures, producing a response tree plus located field errors.
//! Subscription operations resolve to a [`futures::Stream`] of
//! responses, one per source-stream payload.
//!
//! Source text parsing is delegated to the `graphql-parser` crate and
//! adapted by the [`translate`] module; schema construction from SDL and
//! introspection metadata are likewise out of scope.

#![deny(unsafe_code)]

use derive_more::with_trait::Display;

#[doc(hidden)]
pub mod ast;
mod coercion;
mod directives;
pub mod executor;
#[cfg(test)]
mod executor_tests;
mod integrations;
pub mod schema;
mod span;
mod translate;
mod type_info;
mod util;
pub mod validation;
pub mod value;

pub use crate::{
    coercion::{coerce_argument_values, coerce_input_value, coerce_variable_values, value_from_ast},
    directives::{get_directive_values, is_excluded},
    executor::{
        ExecutionError, ExecutionParams, FieldError, FieldResult, PathSegment, ResolvedValue,
        ResolverContext, Response, ResponseStream, SubscriptionResult, Variables,
        default_field_resolver, default_type_resolver, execute, execute_sync, subscribe,
    },
    span::{SourcePosition, Span, Spanning},
    translate::parse_document,
    type_info::TypeInfo,
    validation::{RuleError, ValidationOptions, validate, validate_with, validate_with_options},
    value::{Object, Value},
};

/// An error that prevented an operation from starting at all.
///
/// These are caller mistakes to fix, not request data to retry:
/// recoverable conditions surface as located errors inside a
/// [`Response`] instead.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum GraphQLError {
    /// The source text could not be parsed into a document.
    #[display("{_0}")]
    ParseError(String),

    /// The document contains no operation to execute.
    #[display("Must provide an operation.")]
    NoOperationProvided,

    /// No operation name was given, but the document contains several
    /// operations.
    #[display("Must provide operation name if query contains multiple operations.")]
    MultipleOperationsProvided,

    /// The requested operation name matches no operation in the
    /// document.
    #[display("Unknown operation named \"{_0}\".")]
    UnknownOperationName(String),

    /// [`subscribe`] was called with a non-subscription operation.
    #[display("Expected \"subscription\", found \"{_0}\" operation.")]
    NotSubscription(ast::OperationType),

    /// [`execute_sync`] encountered a resolver that suspended.
    #[display("Execution failed to complete synchronously.")]
    NotSynchronous,
}

impl std::error::Error for GraphQLError {}
