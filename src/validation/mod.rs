//! Query validation related methods and data structures.

mod context;
mod multi_visitor;
mod rules;
mod traits;
mod visitor;

#[cfg(test)]
mod test_harness;

use crate::{ast::Document, schema::model::SchemaType};

pub use self::{
    context::{DEFAULT_MAX_ERRORS, DefinitionScope, RuleError, ValidatorContext, VariableUsage},
    multi_visitor::{MultiVisitorCons, MultiVisitorNil},
    rules::visit_all_rules,
    traits::Visitor,
    visitor::visit,
};

#[cfg(test)]
pub(crate) use self::test_harness::{
    expect_fails_fn, expect_fails_rule, expect_fails_rule_on, expect_passes_fn,
    expect_passes_rule, test_schema,
};

/// Options for a validation run.
#[derive(Clone, Copy, Debug)]
pub struct ValidationOptions {
    /// Maximum number of errors before the walk aborts with a terminal
    /// "too many errors" entry.
    pub max_errors: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            max_errors: DEFAULT_MAX_ERRORS,
        }
    }
}

/// Validates the document against the schema with the full rule set,
/// returning all violations.
pub fn validate<'a>(schema: &'a SchemaType, document: &'a Document<'a>) -> Vec<RuleError> {
    validate_with_options(schema, document, ValidationOptions::default())
}

/// Validates like [`validate`], with explicit [`ValidationOptions`].
pub fn validate_with_options<'a>(
    schema: &'a SchemaType,
    document: &'a Document<'a>,
    options: ValidationOptions,
) -> Vec<RuleError> {
    let mut ctx = ValidatorContext::with_max_errors(schema, document, options.max_errors);
    visit_all_rules(&mut ctx, document);
    ctx.into_errors()
}

/// Validates the document against a caller-composed visitor (e.g. a
/// subset of rules, or additional custom rules chained through
/// [`MultiVisitorNil::with`]).
pub fn validate_with<'a, V: Visitor<'a>>(
    schema: &'a SchemaType,
    document: &'a Document<'a>,
    visitor: &mut V,
) -> Vec<RuleError> {
    let mut ctx = ValidatorContext::new(schema, document);
    visit(visitor, &mut ctx, document);
    ctx.into_errors()
}
