//! Extraction of directive argument values, and the `@skip`/`@include`
//! selection filter built on top of it.

use crate::{
    ast::{Directive, InputValue},
    coercion::coerce_argument_values,
    executor::{Arguments, Variables},
    schema::model::{DirectiveType, SchemaType},
    span::Spanning,
};

/// Returns the coerced argument values of the given directive on a node,
/// or `None` when the node does not carry the directive.
pub fn get_directive_values(
    directive_def: &DirectiveType,
    directives: &Option<Vec<Spanning<Directive<'_>>>>,
    schema: &SchemaType,
    variables: &Variables,
) -> Result<Option<Arguments>, String> {
    let Some(directives) = directives else {
        return Ok(None);
    };
    let Some(usage) = directives
        .iter()
        .find(|d| d.item.name.item == directive_def.name)
    else {
        return Ok(None);
    };

    coerce_argument_values(
        schema,
        Some(directive_def.arguments.as_slice()),
        &usage.item.arguments,
        variables,
    )
    .map(Some)
}

/// Whether a selection carrying these directives is excluded from
/// execution.
///
/// `@skip(if: true)` wins over everything; `@include(if: false)` also
/// excludes. A selection is included iff neither condition triggers.
pub fn is_excluded(
    directives: &Option<Vec<Spanning<Directive<'_>>>>,
    schema: &SchemaType,
    variables: &Variables,
) -> bool {
    let condition = |name: &str| -> Option<bool> {
        let def = schema.directive_by_name(name)?;
        get_directive_values(def, directives, schema, variables)
            .ok()
            .flatten()
            .and_then(|args| args.get("if").and_then(InputValue::as_boolean_value))
    };

    if condition("skip") == Some(true) {
        return true;
    }
    condition("include") == Some(false)
}
