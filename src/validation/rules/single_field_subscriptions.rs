use std::collections::HashSet;

use crate::{
    ast::{Operation, OperationType, Selection},
    span::{SourcePosition, Spanning},
    validation::{ValidatorContext, Visitor},
};

pub struct SingleFieldSubscriptions;

pub fn factory() -> SingleFieldSubscriptions {
    SingleFieldSubscriptions
}

impl<'a> Visitor<'a> for SingleFieldSubscriptions {
    fn enter_operation_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        op: &'a Spanning<Operation<'a>>,
    ) {
        if op.item.operation_type != OperationType::Subscription {
            return;
        }

        let mut keys: Vec<(&str, SourcePosition)> = Vec::new();
        let mut visited = HashSet::new();
        collect_root_keys(ctx, &op.item.selection_set, &mut keys, &mut visited);

        let Some((first_key, _)) = keys.first().copied() else {
            return;
        };
        let extra: Vec<SourcePosition> = keys
            .iter()
            .filter(|(key, _)| *key != first_key)
            .map(|(_, pos)| *pos)
            .collect();
        if !extra.is_empty() {
            ctx.report_error(&error_message(op.item.name.map(|n| n.item)), &extra);
        }
    }
}

fn collect_root_keys<'a>(
    ctx: &mut ValidatorContext<'a>,
    selection_set: &'a [Selection<'a>],
    keys: &mut Vec<(&'a str, SourcePosition)>,
    visited: &mut HashSet<&'a str>,
) {
    for selection in selection_set {
        match selection {
            Selection::Field(f) => keys.push((f.item.response_key(), f.start())),
            Selection::InlineFragment(frag) => {
                collect_root_keys(ctx, &frag.item.selection_set, keys, visited);
            }
            Selection::FragmentSpread(spread) => {
                let name = spread.item.name.item;
                if visited.insert(name)
                    && let Some(fragment) = ctx.fragment_by_name(name)
                {
                    collect_root_keys(ctx, &fragment.item.selection_set, keys, visited);
                }
            }
        }
    }
}

fn error_message(op_name: Option<&str>) -> String {
    match op_name {
        Some(name) => format!("Subscription \"{name}\" must select only one top level field."),
        None => "Anonymous Subscription must select only one top level field.".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::validation::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn single_root_field() {
        expect_passes_rule(
            factory,
            "subscription ImportantEmails { importantEmails }",
        );
    }

    #[test]
    fn single_root_field_via_fragment() {
        expect_passes_rule(
            factory,
            r#"
          subscription ImportantEmails { ...newMessageFields }
          fragment newMessageFields on SubscriptionRoot { importantEmails }
        "#,
        );
    }

    #[test]
    fn multiple_root_fields() {
        expect_fails_rule(
            factory,
            "subscription ImportantEmails { importantEmails notImportantEmails }",
            &[&error_message(Some("ImportantEmails"))],
        );
    }

    #[test]
    fn multiple_root_fields_anonymous() {
        expect_fails_rule(
            factory,
            "subscription { importantEmails notImportantEmails }",
            &[&error_message(None)],
        );
    }

    #[test]
    fn multiple_root_fields_via_fragment() {
        expect_fails_rule(
            factory,
            r#"
          subscription ImportantEmails { ...newMessageFields }
          fragment newMessageFields on SubscriptionRoot {
            importantEmails
            notImportantEmails
          }
        "#,
            &[&error_message(Some("ImportantEmails"))],
        );
    }
}
