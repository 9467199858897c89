use crate::{
    ast::{Fragment, InlineFragment},
    span::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct FragmentsOnCompositeTypes;

pub fn factory() -> FragmentsOnCompositeTypes {
    FragmentsOnCompositeTypes
}

impl<'a> Visitor<'a> for FragmentsOnCompositeTypes {
    fn enter_fragment_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        f: &'a Spanning<Fragment<'a>>,
    ) {
        let cond = &f.item.type_condition;
        if ctx
            .schema
            .concrete_type_by_name(cond.item)
            .is_some_and(|t| !t.is_composite())
        {
            ctx.report_error(
                &error_message(Some(f.item.name.item), cond.item),
                &[cond.start()],
            );
        }
    }

    fn enter_inline_fragment(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        f: &'a Spanning<InlineFragment<'a>>,
    ) {
        let Some(cond) = &f.item.type_condition else {
            return;
        };
        if ctx
            .schema
            .concrete_type_by_name(cond.item)
            .is_some_and(|t| !t.is_composite())
        {
            ctx.report_error(&error_message(None, cond.item), &[cond.start()]);
        }
    }
}

fn error_message(fragment_name: Option<&str>, on_type: &str) -> String {
    match fragment_name {
        Some(name) => {
            format!("Fragment \"{name}\" cannot condition on non composite type \"{on_type}\".")
        }
        None => format!("Fragment cannot condition on non composite type \"{on_type}\"."),
    }
}
