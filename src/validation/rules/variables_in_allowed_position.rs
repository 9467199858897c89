use fnv::FnvHashMap;

use crate::{
    ast::{InputValue, Operation, Type, VariableDefinition},
    span::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct VariablesInAllowedPosition;

pub fn factory() -> VariablesInAllowedPosition {
    VariablesInAllowedPosition
}

impl<'a> Visitor<'a> for VariablesInAllowedPosition {
    fn exit_operation_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        op: &'a Spanning<Operation<'a>>,
    ) {
        let definitions: FnvHashMap<&str, &(Spanning<&str>, VariableDefinition<'_>)> = op
            .item
            .variable_definitions
            .as_ref()
            .map(|defs| {
                defs.item
                    .iter()
                    .map(|entry| (entry.0.item, entry))
                    .collect()
            })
            .unwrap_or_default();

        for usage in ctx.recursive_variable_usages(op) {
            let Some((var_name, var_def)) = definitions.get(usage.node.item).map(|e| (&e.0, &e.1))
            else {
                continue;
            };
            let Some(location_type) = &usage.input_type else {
                continue;
            };

            let var_type = var_def.var_type.item.to_arc();
            if !allowed_variable_usage(
                ctx,
                &var_type,
                var_def.default_value.as_ref().map(|d| &d.item),
                location_type,
                usage.default_value.as_ref(),
            ) {
                ctx.report_error(
                    &error_message(
                        usage.node.item,
                        &var_def.var_type.item.to_string(),
                        &location_type.to_string(),
                    ),
                    &[var_name.start(), usage.node.start()],
                );
            }
        }
    }
}

/// A nullable variable may flow into a non-null position when either
/// side provides a usable default value.
fn allowed_variable_usage(
    ctx: &ValidatorContext<'_>,
    var_type: &Type,
    var_default: Option<&InputValue>,
    location_type: &Type,
    location_default: Option<&InputValue>,
) -> bool {
    if location_type.is_non_null() && !var_type.is_non_null() {
        let has_location_default = location_default.is_some_and(|d| !d.is_null());
        let has_var_default = var_default.is_some_and(|d| !d.is_null());
        if !has_location_default && !has_var_default {
            return false;
        }
        return ctx
            .schema
            .is_subtype(var_type, &location_type.clone().into_nullable());
    }
    ctx.schema.is_subtype(var_type, location_type)
}

fn error_message(var_name: &str, var_type: &str, expected_type: &str) -> String {
    format!(
        "Variable \"${var_name}\" of type \"{var_type}\" used in position expecting \
         type \"{expected_type}\".",
    )
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::validation::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn boolean_into_boolean() {
        expect_passes_rule(
            factory,
            r#"
          query Query($booleanArg: Boolean) {
            complicatedArgs { booleanArgField(booleanArg: $booleanArg) }
          }
        "#,
        );
    }

    #[test]
    fn boolean_into_boolean_within_fragment() {
        expect_passes_rule(
            factory,
            r#"
          fragment booleanArgFrag on ComplicatedArgs {
            booleanArgField(booleanArg: $booleanArg)
          }
          query Query($booleanArg: Boolean) {
            complicatedArgs { ...booleanArgFrag }
          }
        "#,
        );
    }

    #[test]
    fn non_null_boolean_into_boolean() {
        expect_passes_rule(
            factory,
            r#"
          query Query($nonNullBooleanArg: Boolean!) {
            complicatedArgs { booleanArgField(booleanArg: $nonNullBooleanArg) }
          }
        "#,
        );
    }

    #[test]
    fn string_list_into_string_list() {
        expect_passes_rule(
            factory,
            r#"
          query Query($stringListVar: [String]) {
            complicatedArgs { stringListArgField(stringListArg: $stringListVar) }
          }
        "#,
        );
    }

    #[test]
    fn boolean_with_default_into_non_null() {
        expect_passes_rule(
            factory,
            r#"
          query Query($booleanArg: Boolean = true) {
            complicatedArgs { nonNullBooleanArgField(nonNullBooleanArg: $booleanArg) }
          }
        "#,
        );
    }

    #[test]
    fn int_into_non_null_int() {
        expect_fails_rule(
            factory,
            r#"
          query Query($intArg: Int) {
            complicatedArgs { nonNullIntArgField(nonNullIntArg: $intArg) }
          }
        "#,
            &[&error_message("intArg", "Int", "Int!")],
        );
    }

    #[test]
    fn string_into_boolean() {
        expect_fails_rule(
            factory,
            r#"
          query Query($stringVar: String) {
            complicatedArgs { booleanArgField(booleanArg: $stringVar) }
          }
        "#,
            &[&error_message("stringVar", "String", "Boolean")],
        );
    }

    #[test]
    fn string_into_string_list() {
        expect_fails_rule(
            factory,
            r#"
          query Query($stringVar: String) {
            complicatedArgs { stringListArgField(stringListArg: $stringVar) }
          }
        "#,
            &[&error_message("stringVar", "String", "[String]")],
        );
    }
}
