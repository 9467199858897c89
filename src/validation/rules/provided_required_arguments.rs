use crate::{
    ast::{Directive, Field},
    span::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct ProvidedRequiredArguments;

pub fn factory() -> ProvidedRequiredArguments {
    ProvidedRequiredArguments
}

impl<'a> Visitor<'a> for ProvidedRequiredArguments {
    fn exit_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<Field<'a>>) {
        let Some(field_def) = ctx.current_field_def() else {
            return;
        };
        let Some(arg_defs) = &field_def.arguments else {
            return;
        };

        for arg_def in arg_defs {
            if arg_def.arg_type.is_non_null()
                && arg_def.default_value.is_none()
                && field
                    .item
                    .arguments
                    .as_ref()
                    .and_then(|args| args.item.get(&arg_def.name))
                    .is_none()
            {
                ctx.report_error(
                    &field_error_message(
                        field.item.name.item,
                        &arg_def.name,
                        &arg_def.arg_type.to_string(),
                    ),
                    &[field.start()],
                );
            }
        }
    }

    fn exit_directive(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        directive: &'a Spanning<Directive<'a>>,
    ) {
        let Some(directive_def) = ctx.current_directive() else {
            return;
        };

        for arg_def in &directive_def.arguments {
            if arg_def.arg_type.is_non_null()
                && arg_def.default_value.is_none()
                && directive
                    .item
                    .arguments
                    .as_ref()
                    .and_then(|args| args.item.get(&arg_def.name))
                    .is_none()
            {
                ctx.report_error(
                    &directive_error_message(
                        directive.item.name.item,
                        &arg_def.name,
                        &arg_def.arg_type.to_string(),
                    ),
                    &[directive.start()],
                );
            }
        }
    }
}

fn field_error_message(field_name: &str, arg_name: &str, type_name: &str) -> String {
    format!(
        "Field \"{field_name}\" argument \"{arg_name}\" of type \"{type_name}\" \
         is required, but it was not provided.",
    )
}

fn directive_error_message(directive_name: &str, arg_name: &str, type_name: &str) -> String {
    format!(
        "Directive \"@{directive_name}\" argument \"{arg_name}\" of type \"{type_name}\" \
         is required, but it was not provided.",
    )
}
