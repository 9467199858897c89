use crate::{
    ast::{FragmentSpread, InlineFragment},
    span::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct PossibleFragmentSpreads;

pub fn factory() -> PossibleFragmentSpreads {
    PossibleFragmentSpreads
}

impl<'a> Visitor<'a> for PossibleFragmentSpreads {
    fn enter_inline_fragment(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        fragment: &'a Spanning<InlineFragment<'a>>,
    ) {
        let (Some(frag_type), Some(parent_type)) = (ctx.current_type(), ctx.parent_type()) else {
            return;
        };
        if frag_type.is_composite()
            && parent_type.is_composite()
            && !ctx.schema.type_overlap(frag_type, parent_type)
        {
            ctx.report_error(
                &inline_error_message(parent_type.name(), frag_type.name()),
                &[fragment.start()],
            );
        }
    }

    fn enter_fragment_spread(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        spread: &'a Spanning<FragmentSpread<'a>>,
    ) {
        let Some(fragment) = ctx.fragment_by_name(spread.item.name.item) else {
            return;
        };
        let (Some(frag_type), Some(parent_type)) = (
            ctx.schema
                .concrete_type_by_name(fragment.item.type_condition.item),
            ctx.parent_type(),
        ) else {
            return;
        };
        if frag_type.is_composite()
            && parent_type.is_composite()
            && !ctx.schema.type_overlap(frag_type, parent_type)
        {
            ctx.report_error(
                &spread_error_message(
                    spread.item.name.item,
                    parent_type.name(),
                    frag_type.name(),
                ),
                &[spread.start()],
            );
        }
    }
}

fn inline_error_message(parent_type: &str, frag_type: &str) -> String {
    format!(
        "Fragment cannot be spread here as objects of type \"{parent_type}\" \
         can never be of type \"{frag_type}\".",
    )
}

fn spread_error_message(fragment_name: &str, parent_type: &str, frag_type: &str) -> String {
    format!(
        "Fragment \"{fragment_name}\" cannot be spread here as objects of type \
         \"{parent_type}\" can never be of type \"{frag_type}\".",
    )
}

#[cfg(test)]
mod tests {
    use super::{factory, inline_error_message, spread_error_message};

    use crate::validation::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn same_object() {
        expect_passes_rule(
            factory,
            "fragment objectWithinObject on Dog { ...dogFragment } \
             fragment dogFragment on Dog { barkVolume }",
        );
    }

    #[test]
    fn object_into_implemented_interface() {
        expect_passes_rule(
            factory,
            "fragment objectWithinInterface on Pet { ...dogFragment } \
             fragment dogFragment on Dog { barkVolume }",
        );
    }

    #[test]
    fn object_into_containing_union() {
        expect_passes_rule(
            factory,
            "fragment objectWithinUnion on CatOrDog { ...dogFragment } \
             fragment dogFragment on Dog { barkVolume }",
        );
    }

    #[test]
    fn interface_into_implementing_object() {
        expect_passes_rule(
            factory,
            "fragment interfaceWithinObject on Dog { ...petFragment } \
             fragment petFragment on Pet { name }",
        );
    }

    #[test]
    fn different_object_into_object() {
        expect_fails_rule(
            factory,
            "fragment invalidObjectWithinObject on Cat { ...dogFragment } \
             fragment dogFragment on Dog { barkVolume }",
            &[&spread_error_message("dogFragment", "Cat", "Dog")],
        );
    }

    #[test]
    fn different_object_into_object_inline() {
        expect_fails_rule(
            factory,
            "fragment invalidObjectWithinObjectAnon on Cat { ... on Dog { barkVolume } }",
            &[&inline_error_message("Cat", "Dog")],
        );
    }

    #[test]
    fn unions_without_overlap() {
        expect_fails_rule(
            factory,
            "fragment invalidUnionWithinUnion on CatOrDog { ...humanOrAlienFragment } \
             fragment humanOrAlienFragment on HumanOrAlien { __typename }",
            &[&spread_error_message("humanOrAlienFragment", "CatOrDog", "HumanOrAlien")],
        );
    }
}
