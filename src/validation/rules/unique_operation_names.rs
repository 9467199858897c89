use fnv::FnvHashMap;

use crate::{
    ast::Operation,
    span::{SourcePosition, Spanning},
    validation::{ValidatorContext, Visitor},
};

pub struct UniqueOperationNames<'a> {
    names: FnvHashMap<&'a str, SourcePosition>,
}

pub fn factory<'a>() -> UniqueOperationNames<'a> {
    UniqueOperationNames {
        names: FnvHashMap::default(),
    }
}

impl<'a> Visitor<'a> for UniqueOperationNames<'a> {
    fn enter_operation_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        op: &'a Spanning<Operation<'a>>,
    ) {
        let Some(name) = &op.item.name else { return };
        if self.names.insert(name.item, name.start()).is_some() {
            ctx.report_error(&error_message(name.item), &[name.start()]);
        }
    }
}

fn error_message(op_name: &str) -> String {
    format!("There can be only one operation named \"{op_name}\".")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::validation::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn unique_names() {
        expect_passes_rule(
            factory,
            r#"
          query Foo { dog { name } }
          query Bar { dog { name } }
        "#,
        );
    }

    #[test]
    fn duplicate_names() {
        expect_fails_rule(
            factory,
            r#"
          query Foo { dog { name } }
          query Foo { cat { name } }
        "#,
            &[&error_message("Foo")],
        );
    }

    #[test]
    fn duplicate_across_operation_types() {
        expect_fails_rule(
            factory,
            r#"
          query Foo { dog { name } }
          mutation Foo { testInput }
        "#,
            &[&error_message("Foo")],
        );
    }
}
