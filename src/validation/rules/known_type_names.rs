use crate::{
    ast::{Fragment, InlineFragment, VariableDefinition},
    span::{SourcePosition, Spanning},
    validation::{ValidatorContext, Visitor},
};

pub struct KnownTypeNames;

pub fn factory() -> KnownTypeNames {
    KnownTypeNames
}

impl<'a> Visitor<'a> for KnownTypeNames {
    fn enter_inline_fragment(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        fragment: &'a Spanning<InlineFragment<'a>>,
    ) {
        if let Some(cond) = &fragment.item.type_condition {
            validate_type(ctx, cond.item, cond.start());
        }
    }

    fn enter_fragment_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        fragment: &'a Spanning<Fragment<'a>>,
    ) {
        let cond = &fragment.item.type_condition;
        validate_type(ctx, cond.item, cond.start());
    }

    fn enter_variable_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        (_, def): &'a (Spanning<&'a str>, VariableDefinition<'a>),
    ) {
        validate_type(
            ctx,
            def.var_type.item.innermost_name(),
            def.var_type.start(),
        );
    }
}

fn validate_type(ctx: &mut ValidatorContext<'_>, type_name: &str, location: SourcePosition) {
    if ctx.schema.concrete_type_by_name(type_name).is_none() {
        ctx.report_error(&error_message(type_name), &[location]);
    }
}

fn error_message(type_name: &str) -> String {
    format!("Unknown type \"{type_name}\".")
}
