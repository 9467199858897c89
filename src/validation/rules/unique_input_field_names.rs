use std::collections::HashSet;

use crate::{
    ast::InputValue,
    span::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct UniqueInputFieldNames {
    known_name_stack: Vec<HashSet<String>>,
}

pub fn factory() -> UniqueInputFieldNames {
    UniqueInputFieldNames {
        known_name_stack: Vec::new(),
    }
}

impl<'a> Visitor<'a> for UniqueInputFieldNames {
    fn enter_object_value(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: Spanning<&'a Vec<(Spanning<String>, Spanning<InputValue>)>>,
    ) {
        self.known_name_stack.push(HashSet::new());
    }

    fn exit_object_value(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: Spanning<&'a Vec<(Spanning<String>, Spanning<InputValue>)>>,
    ) {
        self.known_name_stack.pop();
    }

    fn enter_object_field(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        (field_name, _): &'a (Spanning<String>, Spanning<InputValue>),
    ) {
        if let Some(known_names) = self.known_name_stack.last_mut()
            && !known_names.insert(field_name.item.clone())
        {
            ctx.report_error(&error_message(&field_name.item), &[field_name.start()]);
        }
    }
}

fn error_message(field_name: &str) -> String {
    format!("There can be only one input field named \"{field_name}\".")
}
