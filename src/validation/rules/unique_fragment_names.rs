use fnv::FnvHashMap;

use crate::{
    ast::Fragment,
    span::{SourcePosition, Spanning},
    validation::{ValidatorContext, Visitor},
};

pub struct UniqueFragmentNames<'a> {
    names: FnvHashMap<&'a str, SourcePosition>,
}

pub fn factory<'a>() -> UniqueFragmentNames<'a> {
    UniqueFragmentNames {
        names: FnvHashMap::default(),
    }
}

impl<'a> Visitor<'a> for UniqueFragmentNames<'a> {
    fn enter_fragment_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        f: &'a Spanning<Fragment<'a>>,
    ) {
        let name = &f.item.name;
        if self.names.insert(name.item, name.start()).is_some() {
            ctx.report_error(&error_message(name.item), &[name.start()]);
        }
    }
}

fn error_message(fragment_name: &str) -> String {
    format!("There can be only one fragment named \"{fragment_name}\".")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::validation::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn distinct_fragment_names() {
        expect_passes_rule(
            factory,
            r#"
          { dog { ...fragA ...fragB } }
          fragment fragA on Dog { name }
          fragment fragB on Dog { nickname }
        "#,
        );
    }

    #[test]
    fn duplicate_fragment_names() {
        expect_fails_rule(
            factory,
            r#"
          { dog { ...fragA } }
          fragment fragA on Dog { name }
          fragment fragA on Dog { nickname }
        "#,
            &[&error_message("fragA")],
        );
    }
}
