use crate::{
    ast::{Directive, Field, Fragment, FragmentSpread, InlineFragment, Operation, OperationType},
    schema::model::DirectiveLocation,
    span::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct KnownDirectives {
    location_stack: Vec<DirectiveLocation>,
}

pub fn factory() -> KnownDirectives {
    KnownDirectives {
        location_stack: Vec::new(),
    }
}

impl<'a> Visitor<'a> for KnownDirectives {
    fn enter_operation_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        op: &'a Spanning<Operation<'a>>,
    ) {
        self.location_stack.push(match op.item.operation_type {
            OperationType::Query => DirectiveLocation::Query,
            OperationType::Mutation => DirectiveLocation::Mutation,
            OperationType::Subscription => DirectiveLocation::Subscription,
        });
    }

    fn exit_operation_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<Operation<'a>>,
    ) {
        self.location_stack.pop();
    }

    fn enter_field(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<Field<'a>>) {
        self.location_stack.push(DirectiveLocation::Field);
    }

    fn exit_field(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<Field<'a>>) {
        self.location_stack.pop();
    }

    fn enter_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<Fragment<'a>>,
    ) {
        self.location_stack
            .push(DirectiveLocation::FragmentDefinition);
    }

    fn exit_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<Fragment<'a>>,
    ) {
        self.location_stack.pop();
    }

    fn enter_fragment_spread(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<FragmentSpread<'a>>,
    ) {
        self.location_stack.push(DirectiveLocation::FragmentSpread);
    }

    fn exit_fragment_spread(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<FragmentSpread<'a>>,
    ) {
        self.location_stack.pop();
    }

    fn enter_inline_fragment(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<InlineFragment<'a>>,
    ) {
        self.location_stack.push(DirectiveLocation::InlineFragment);
    }

    fn exit_inline_fragment(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<InlineFragment<'a>>,
    ) {
        self.location_stack.pop();
    }

    fn enter_directive(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        directive: &'a Spanning<Directive<'a>>,
    ) {
        let directive_name = directive.item.name.item;

        let Some(directive_type) = ctx.schema.directive_by_name(directive_name) else {
            ctx.report_error(&unknown_error_message(directive_name), &[directive.start()]);
            return;
        };

        if let Some(current_location) = self.location_stack.last()
            && !directive_type.locations.contains(current_location)
        {
            ctx.report_error(
                &misplaced_error_message(directive_name, current_location),
                &[directive.start()],
            );
        }
    }
}

fn unknown_error_message(directive_name: &str) -> String {
    format!("Unknown directive \"@{directive_name}\".")
}

fn misplaced_error_message(directive_name: &str, location: &DirectiveLocation) -> String {
    format!("Directive \"@{directive_name}\" may not be used on {location}.")
}
