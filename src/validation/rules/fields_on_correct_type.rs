use crate::{
    ast::Field,
    span::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct FieldsOnCorrectType;

pub fn factory() -> FieldsOnCorrectType {
    FieldsOnCorrectType
}

impl<'a> Visitor<'a> for FieldsOnCorrectType {
    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<Field<'a>>) {
        let Some(parent) = ctx.parent_type() else {
            return;
        };
        if ctx.current_field_def().is_none() {
            ctx.report_error(
                &error_message(field.item.name.item, parent.name()),
                &[field.start()],
            );
        }
    }
}

fn error_message(field_name: &str, type_name: &str) -> String {
    format!("Cannot query field \"{field_name}\" on type \"{type_name}\".")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::validation::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn object_field_selection() {
        expect_passes_rule(
            factory,
            r#"
          fragment objectFieldSelection on Dog { __typename name }
        "#,
        );
    }

    #[test]
    fn interface_and_typename_selections() {
        expect_passes_rule(
            factory,
            r#"
          fragment interfaceFieldSelection on Pet { __typename name }
          fragment typenameOnUnion on CatOrDog { __typename }
        "#,
        );
    }

    #[test]
    fn unknown_field_on_object() {
        expect_fails_rule(
            factory,
            "fragment fieldNotDefined on Dog { meowVolume }",
            &[&error_message("meowVolume", "Dog")],
        );
    }

    #[test]
    fn fields_under_unknown_parents_are_not_reported() {
        // The leaf type yields no composite parent, so only `ScalarLeafs`
        // has something to say about the inner selection.
        expect_passes_rule(
            factory,
            r#"
          fragment deepFieldNotDefined on Dog { barks { deeperUnknownField } }
        "#,
        );
    }

    #[test]
    fn field_on_union() {
        expect_fails_rule(
            factory,
            "fragment directFieldSelectionOnUnion on CatOrDog { name }",
            &[&error_message("name", "CatOrDog")],
        );
    }
}
