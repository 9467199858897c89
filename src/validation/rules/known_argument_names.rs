use crate::{
    ast::InputValue,
    span::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct KnownArgumentNames;

pub fn factory() -> KnownArgumentNames {
    KnownArgumentNames
}

impl<'a> Visitor<'a> for KnownArgumentNames {
    fn enter_argument(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        (arg_name, _): &'a (Spanning<&'a str>, Spanning<InputValue>),
    ) {
        if ctx.current_argument().is_some() {
            return;
        }

        if let Some(directive) = ctx.current_directive() {
            ctx.report_error(
                &directive_error_message(arg_name.item, &directive.name),
                &[arg_name.start()],
            );
        } else if let (Some(field_def), Some(parent)) =
            (ctx.current_field_def(), ctx.parent_type())
        {
            ctx.report_error(
                &field_error_message(arg_name.item, &field_def.name, parent.name()),
                &[arg_name.start()],
            );
        }
    }
}

fn field_error_message(arg_name: &str, field_name: &str, type_name: &str) -> String {
    format!("Unknown argument \"{arg_name}\" on field \"{type_name}.{field_name}\".")
}

fn directive_error_message(arg_name: &str, directive_name: &str) -> String {
    format!("Unknown argument \"{arg_name}\" on directive \"@{directive_name}\".")
}
