use std::collections::HashSet;

use crate::{
    ast::{Definition, Document, Fragment, Operation},
    span::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct NoUnusedFragments<'a> {
    operations: Vec<&'a Spanning<Operation<'a>>>,
    fragments: Vec<&'a Spanning<Fragment<'a>>>,
}

pub fn factory<'a>() -> NoUnusedFragments<'a> {
    NoUnusedFragments {
        operations: Vec::new(),
        fragments: Vec::new(),
    }
}

impl<'a> Visitor<'a> for NoUnusedFragments<'a> {
    fn enter_operation_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        op: &'a Spanning<Operation<'a>>,
    ) {
        self.operations.push(op);
    }

    fn enter_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        f: &'a Spanning<Fragment<'a>>,
    ) {
        self.fragments.push(f);
    }

    fn exit_document(&mut self, ctx: &mut ValidatorContext<'a>, _: &'a Document<'a>) {
        let mut used: HashSet<&str> = HashSet::new();
        for &op in &self.operations {
            for fragment in ctx.recursively_referenced_fragments(op).iter() {
                used.insert(fragment.item.name.item);
            }
        }

        for fragment in &self.fragments {
            let name = fragment.item.name.item;
            if !used.contains(name) {
                ctx.report_error(&error_message(name), &[fragment.start()]);
            }
        }
    }
}

fn error_message(fragment_name: &str) -> String {
    format!("Fragment \"{fragment_name}\" is never used.")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::validation::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn all_fragments_used() {
        expect_passes_rule(
            factory,
            r#"
          { human(id: 4) { ...HumanFields1 ... on Human { ...HumanFields2 } } }
          fragment HumanFields1 on Human { name ...HumanFields3 }
          fragment HumanFields2 on Human { name }
          fragment HumanFields3 on Human { name }
        "#,
        );
    }

    #[test]
    fn unused_fragments() {
        expect_fails_rule(
            factory,
            r#"
          { human(id: 4) { ...HumanFields1 } }
          fragment HumanFields1 on Human { name }
          fragment Unused1 on Human { name }
          fragment Unused2 on Human { name }
        "#,
            &[&error_message("Unused1"), &error_message("Unused2")],
        );
    }

    #[test]
    fn fragment_used_only_by_unused_fragment() {
        expect_fails_rule(
            factory,
            r#"
          { human(id: 4) { name } }
          fragment Unused on Human { ...DeeplyUnused }
          fragment DeeplyUnused on Human { name }
        "#,
            &[&error_message("Unused"), &error_message("DeeplyUnused")],
        );
    }
}
