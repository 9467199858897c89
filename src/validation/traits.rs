use crate::{
    ast::{
        Directive, Document, Field, Fragment, FragmentSpread, InlineFragment, InputValue,
        Operation, Selection, TypeSystemDefinition, VariableDefinition,
    },
    span::Spanning,
    validation::ValidatorContext,
};

#[doc(hidden)]
pub trait Visitor<'a> {
    fn enter_document(&mut self, _: &mut ValidatorContext<'a>, _: &'a Document<'a>) {}
    fn exit_document(&mut self, _: &mut ValidatorContext<'a>, _: &'a Document<'a>) {}

    fn enter_operation_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<Operation<'a>>,
    ) {
    }
    fn exit_operation_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<Operation<'a>>,
    ) {
    }

    fn enter_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<Fragment<'a>>,
    ) {
    }
    fn exit_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<Fragment<'a>>,
    ) {
    }

    fn enter_type_system_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<TypeSystemDefinition<'a>>,
    ) {
    }
    fn exit_type_system_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<TypeSystemDefinition<'a>>,
    ) {
    }

    fn enter_variable_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a (Spanning<&'a str>, VariableDefinition<'a>),
    ) {
    }
    fn exit_variable_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a (Spanning<&'a str>, VariableDefinition<'a>),
    ) {
    }

    fn enter_directive(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<Directive<'a>>) {}
    fn exit_directive(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<Directive<'a>>) {}

    fn enter_argument(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a (Spanning<&'a str>, Spanning<InputValue>),
    ) {
    }
    fn exit_argument(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a (Spanning<&'a str>, Spanning<InputValue>),
    ) {
    }

    fn enter_selection_set(&mut self, _: &mut ValidatorContext<'a>, _: &'a [Selection<'a>]) {}
    fn exit_selection_set(&mut self, _: &mut ValidatorContext<'a>, _: &'a [Selection<'a>]) {}

    fn enter_field(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<Field<'a>>) {}
    fn exit_field(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<Field<'a>>) {}

    fn enter_fragment_spread(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<FragmentSpread<'a>>,
    ) {
    }
    fn exit_fragment_spread(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<FragmentSpread<'a>>,
    ) {
    }

    fn enter_inline_fragment(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<InlineFragment<'a>>,
    ) {
    }
    fn exit_inline_fragment(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<InlineFragment<'a>>,
    ) {
    }

    fn enter_null_value(&mut self, _: &mut ValidatorContext<'a>, _: Spanning<()>) {}
    fn exit_null_value(&mut self, _: &mut ValidatorContext<'a>, _: Spanning<()>) {}

    fn enter_int_value(&mut self, _: &mut ValidatorContext<'a>, _: Spanning<i32>) {}
    fn exit_int_value(&mut self, _: &mut ValidatorContext<'a>, _: Spanning<i32>) {}

    fn enter_float_value(&mut self, _: &mut ValidatorContext<'a>, _: Spanning<f64>) {}
    fn exit_float_value(&mut self, _: &mut ValidatorContext<'a>, _: Spanning<f64>) {}

    fn enter_string_value(&mut self, _: &mut ValidatorContext<'a>, _: Spanning<&'a String>) {}
    fn exit_string_value(&mut self, _: &mut ValidatorContext<'a>, _: Spanning<&'a String>) {}

    fn enter_boolean_value(&mut self, _: &mut ValidatorContext<'a>, _: Spanning<bool>) {}
    fn exit_boolean_value(&mut self, _: &mut ValidatorContext<'a>, _: Spanning<bool>) {}

    fn enter_enum_value(&mut self, _: &mut ValidatorContext<'a>, _: Spanning<&'a String>) {}
    fn exit_enum_value(&mut self, _: &mut ValidatorContext<'a>, _: Spanning<&'a String>) {}

    fn enter_variable_value(&mut self, _: &mut ValidatorContext<'a>, _: Spanning<&'a String>) {}
    fn exit_variable_value(&mut self, _: &mut ValidatorContext<'a>, _: Spanning<&'a String>) {}

    fn enter_list_value(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: Spanning<&'a Vec<Spanning<InputValue>>>,
    ) {
    }
    fn exit_list_value(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: Spanning<&'a Vec<Spanning<InputValue>>>,
    ) {
    }

    fn enter_object_value(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: Spanning<&'a Vec<(Spanning<String>, Spanning<InputValue>)>>,
    ) {
    }
    fn exit_object_value(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: Spanning<&'a Vec<(Spanning<String>, Spanning<InputValue>)>>,
    ) {
    }

    fn enter_object_field(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a (Spanning<String>, Spanning<InputValue>),
    ) {
    }
    fn exit_object_field(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a (Spanning<String>, Spanning<InputValue>),
    ) {
    }
}
