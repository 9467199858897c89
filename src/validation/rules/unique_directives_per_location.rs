use std::collections::HashSet;

use crate::{
    ast::{Directive, Field, Fragment, FragmentSpread, InlineFragment, Operation},
    span::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct UniqueDirectivesPerLocation;

pub fn factory() -> UniqueDirectivesPerLocation {
    UniqueDirectivesPerLocation
}

fn check_duplicates<'a>(
    ctx: &mut ValidatorContext<'a>,
    directives: &'a Option<Vec<Spanning<Directive<'a>>>>,
) {
    let Some(directives) = directives else { return };
    let mut seen = HashSet::new();
    for directive in directives {
        let name = directive.item.name.item;
        if !seen.insert(name) {
            ctx.report_error(&error_message(name), &[directive.start()]);
        }
    }
}

impl<'a> Visitor<'a> for UniqueDirectivesPerLocation {
    fn enter_operation_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        op: &'a Spanning<Operation<'a>>,
    ) {
        check_duplicates(ctx, &op.item.directives);
    }

    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<Field<'a>>) {
        check_duplicates(ctx, &field.item.directives);
    }

    fn enter_fragment_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        f: &'a Spanning<Fragment<'a>>,
    ) {
        check_duplicates(ctx, &f.item.directives);
    }

    fn enter_fragment_spread(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        spread: &'a Spanning<FragmentSpread<'a>>,
    ) {
        check_duplicates(ctx, &spread.item.directives);
    }

    fn enter_inline_fragment(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        f: &'a Spanning<InlineFragment<'a>>,
    ) {
        check_duplicates(ctx, &f.item.directives);
    }
}

fn error_message(directive_name: &str) -> String {
    format!("The directive \"@{directive_name}\" can only be used once at this location.")
}
