use std::collections::HashSet;

use crate::{
    ast::Operation,
    span::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct NoUndefinedVariables;

pub fn factory() -> NoUndefinedVariables {
    NoUndefinedVariables
}

impl<'a> Visitor<'a> for NoUndefinedVariables {
    fn exit_operation_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        op: &'a Spanning<Operation<'a>>,
    ) {
        let defined: HashSet<&str> = op
            .item
            .variable_definitions
            .as_ref()
            .map(|defs| defs.item.iter().map(|(name, _)| name.item).collect())
            .unwrap_or_default();

        let mut reported = HashSet::new();
        for usage in ctx.recursive_variable_usages(op) {
            let var_name = usage.node.item;
            if !defined.contains(var_name) && reported.insert(var_name) {
                ctx.report_error(
                    &error_message(var_name, op.item.name.map(|n| n.item)),
                    &[usage.node.start(), op.start()],
                );
            }
        }
    }
}

fn error_message(var_name: &str, op_name: Option<&str>) -> String {
    match op_name {
        Some(op_name) => {
            format!("Variable \"${var_name}\" is not defined by operation \"{op_name}\".")
        }
        None => format!("Variable \"${var_name}\" is not defined."),
    }
}
