use crate::{
    ast::VariableDefinition,
    span::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct VariablesAreInputTypes;

pub fn factory() -> VariablesAreInputTypes {
    VariablesAreInputTypes
}

impl<'a> Visitor<'a> for VariablesAreInputTypes {
    fn enter_variable_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        (var_name, var_def): &'a (Spanning<&'a str>, VariableDefinition<'a>),
    ) {
        if ctx
            .schema
            .concrete_type_by_name(var_def.var_type.item.innermost_name())
            .is_some_and(|t| !t.is_input())
        {
            ctx.report_error(
                &error_message(var_name.item, &var_def.var_type.item.to_string()),
                &[var_def.var_type.start()],
            );
        }
    }
}

fn error_message(var_name: &str, type_name: &str) -> String {
    format!("Variable \"${var_name}\" cannot be non-input type \"{type_name}\".")
}
