use std::collections::HashSet;

use crate::{
    ast::{Operation, VariableDefinition},
    span::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct UniqueVariableNames<'a> {
    names: HashSet<&'a str>,
}

pub fn factory<'a>() -> UniqueVariableNames<'a> {
    UniqueVariableNames {
        names: HashSet::new(),
    }
}

impl<'a> Visitor<'a> for UniqueVariableNames<'a> {
    fn enter_operation_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<Operation<'a>>,
    ) {
        self.names.clear();
    }

    fn enter_variable_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        (var_name, _): &'a (Spanning<&'a str>, VariableDefinition<'a>),
    ) {
        if !self.names.insert(var_name.item) {
            ctx.report_error(&error_message(var_name.item), &[var_name.start()]);
        }
    }
}

fn error_message(var_name: &str) -> String {
    format!("There can be only one variable named \"${var_name}\".")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::validation::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn unique_variable_names() {
        expect_passes_rule(
            factory,
            r#"
          query A($x: Int, $y: String) { dog { name } }
          query B($x: String, $y: Int) { dog { name } }
        "#,
        );
    }

    #[test]
    fn duplicate_variable_names() {
        expect_fails_rule(
            factory,
            r#"
          query A($x: Int, $x: Int, $x: String) { dog { name } }
        "#,
            &[&error_message("x"), &error_message("x")],
        );
    }
}
