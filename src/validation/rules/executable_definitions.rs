use crate::{
    ast::TypeSystemDefinition,
    span::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct ExecutableDefinitions;

pub fn factory() -> ExecutableDefinitions {
    ExecutableDefinitions
}

impl<'a> Visitor<'a> for ExecutableDefinitions {
    fn enter_type_system_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        def: &'a Spanning<TypeSystemDefinition<'a>>,
    ) {
        let name = def
            .item
            .name
            .map_or_else(|| "schema".into(), |n| format!("\"{}\"", n.item));
        ctx.report_error(&error_message(&name), &[def.start()]);
    }
}

fn error_message(def_name: &str) -> String {
    format!("The {def_name} definition is not executable.")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::{
        ast::{Definition, TypeSystemDefinition},
        span::Spanning,
        validation::{expect_fails_rule_on, expect_passes_rule},
    };

    #[test]
    fn only_operations_and_fragments() {
        expect_passes_rule(
            factory,
            r#"
          query Foo {
            dog { name }
          }
          fragment Frag on Dog {
            name
          }
        "#,
        );
    }

    #[test]
    fn rejects_type_system_definitions() {
        let mut doc = crate::parse_document("query Foo { dog { name } }").unwrap();
        doc.push(Definition::TypeSystem(Spanning::unlocated(
            TypeSystemDefinition {
                name: Some(Spanning::unlocated("Cow")),
            },
        )));
        doc.push(Definition::TypeSystem(Spanning::unlocated(
            TypeSystemDefinition { name: None },
        )));

        expect_fails_rule_on(
            factory,
            doc,
            &[&error_message("\"Cow\""), &error_message("schema")],
        );
    }
}
