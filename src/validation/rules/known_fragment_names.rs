use crate::{
    ast::FragmentSpread,
    span::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct KnownFragmentNames;

pub fn factory() -> KnownFragmentNames {
    KnownFragmentNames
}

impl<'a> Visitor<'a> for KnownFragmentNames {
    fn enter_fragment_spread(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        spread: &'a Spanning<FragmentSpread<'a>>,
    ) {
        if !ctx.is_known_fragment(spread.item.name.item) {
            ctx.report_error(
                &error_message(spread.item.name.item),
                &[spread.item.name.start()],
            );
        }
    }
}

fn error_message(fragment_name: &str) -> String {
    format!("Unknown fragment \"{fragment_name}\".")
}
