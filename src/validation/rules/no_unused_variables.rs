use std::collections::HashSet;

use crate::{
    ast::Operation,
    span::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct NoUnusedVariables;

pub fn factory() -> NoUnusedVariables {
    NoUnusedVariables
}

impl<'a> Visitor<'a> for NoUnusedVariables {
    fn exit_operation_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        op: &'a Spanning<Operation<'a>>,
    ) {
        let Some(defs) = &op.item.variable_definitions else {
            return;
        };

        let used: HashSet<&str> = ctx
            .recursive_variable_usages(op)
            .iter()
            .map(|usage| usage.node.item)
            .collect();

        for (var_name, _) in defs.item.iter() {
            if !used.contains(var_name.item) {
                ctx.report_error(
                    &error_message(var_name.item, op.item.name.map(|n| n.item)),
                    &[var_name.start()],
                );
            }
        }
    }
}

fn error_message(var_name: &str, op_name: Option<&str>) -> String {
    match op_name {
        Some(op_name) => {
            format!("Variable \"${var_name}\" is never used in operation \"{op_name}\".")
        }
        None => format!("Variable \"${var_name}\" is never used."),
    }
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::validation::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn all_variables_used() {
        expect_passes_rule(
            factory,
            r#"
          query ($a: Int, $b: Int) {
            complicatedArgs { multipleReqs(req1: $a, req2: $b) }
          }
        "#,
        );
    }

    #[test]
    fn variable_used_in_fragment() {
        expect_passes_rule(
            factory,
            r#"
          query Foo($atOtherHomes: Boolean) { dog { ...isHousetrained } }
          fragment isHousetrained on Dog { isHousetrained(atOtherHomes: $atOtherHomes) }
        "#,
        );
    }

    #[test]
    fn unused_variable() {
        expect_fails_rule(
            factory,
            r#"
          query Foo($a: Int, $b: Int, $c: Int) {
            complicatedArgs { multipleReqs(req1: $a, req2: $b) }
          }
        "#,
            &[&error_message("c", Some("Foo"))],
        );
    }

    #[test]
    fn variable_not_used_by_unreferenced_fragment() {
        expect_fails_rule(
            factory,
            r#"
          query Foo($b: Boolean) { dog { name } }
          fragment isHousetrained on Dog { isHousetrained(atOtherHomes: $b) }
        "#,
            &[&error_message("b", Some("Foo"))],
        );
    }
}
