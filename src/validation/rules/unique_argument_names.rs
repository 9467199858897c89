use std::collections::HashSet;

use crate::{
    ast::{Directive, Field, InputValue},
    span::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct UniqueArgumentNames<'a> {
    known_names: HashSet<&'a str>,
}

pub fn factory<'a>() -> UniqueArgumentNames<'a> {
    UniqueArgumentNames {
        known_names: HashSet::new(),
    }
}

impl<'a> Visitor<'a> for UniqueArgumentNames<'a> {
    fn enter_field(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<Field<'a>>) {
        self.known_names.clear();
    }

    fn enter_directive(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<Directive<'a>>) {
        self.known_names.clear();
    }

    fn enter_argument(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        (arg_name, _): &'a (Spanning<&'a str>, Spanning<InputValue>),
    ) {
        if !self.known_names.insert(arg_name.item) {
            ctx.report_error(&error_message(arg_name.item), &[arg_name.start()]);
        }
    }
}

fn error_message(arg_name: &str) -> String {
    format!("There can be only one argument named \"{arg_name}\".")
}
