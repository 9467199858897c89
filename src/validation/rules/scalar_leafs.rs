use crate::{
    ast::Field,
    span::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct ScalarLeafs;

pub fn factory() -> ScalarLeafs {
    ScalarLeafs
}

impl<'a> Visitor<'a> for ScalarLeafs {
    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<Field<'a>>) {
        let (Some(meta), Some(literal)) = (ctx.current_type(), ctx.current_type_literal()) else {
            return;
        };
        let field_name = field.item.name.item;
        let type_name = literal.to_string();

        if meta.is_leaf() {
            if field.item.selection_set.is_some() {
                ctx.report_error(
                    &no_subselection_allowed_message(field_name, &type_name),
                    &[field.start()],
                );
            }
        } else if field.item.selection_set.is_none() {
            ctx.report_error(
                &required_subselection_message(field_name, &type_name),
                &[field.start()],
            );
        }
    }
}

fn no_subselection_allowed_message(field_name: &str, type_name: &str) -> String {
    format!(
        "Field \"{field_name}\" must not have a selection since type \"{type_name}\" \
         has no subfields.",
    )
}

fn required_subselection_message(field_name: &str, type_name: &str) -> String {
    format!(
        "Field \"{field_name}\" of type \"{type_name}\" must have a selection of subfields. \
         Did you mean \"{field_name} {{ ... }}\"?",
    )
}

#[cfg(test)]
mod tests {
    use super::{factory, no_subselection_allowed_message, required_subselection_message};

    use crate::validation::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn valid_scalar_selections() {
        expect_passes_rule(factory, "fragment scalarSelection on Dog { barks }");
    }

    #[test]
    fn object_without_subselection() {
        expect_fails_rule(
            factory,
            "query directQueryOnObjectWithoutSubFields { human(id: 1) }",
            &[&required_subselection_message("human", "Human")],
        );
    }

    #[test]
    fn interface_without_subselection() {
        expect_fails_rule(
            factory,
            "{ pet }",
            &[&required_subselection_message("pet", "Pet")],
        );
    }

    #[test]
    fn scalar_with_subselection() {
        expect_fails_rule(
            factory,
            "fragment scalarSelectionsNotAllowedOnBoolean on Dog { barks { sinceWhen } }",
            &[&no_subselection_allowed_message("barks", "Boolean")],
        );
    }

    #[test]
    fn enum_with_subselection() {
        expect_fails_rule(
            factory,
            "{ cat { furColor { inHexDec } } }",
            &[&no_subselection_allowed_message("furColor", "FurColor")],
        );
    }
}
