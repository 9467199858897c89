//! Definitions of the validation rules.

mod executable_definitions;
mod fields_on_correct_type;
mod fragments_on_composite_types;
mod known_argument_names;
mod known_directives;
mod known_fragment_names;
mod known_type_names;
mod lone_anonymous_operation;
mod no_fragment_cycles;
mod no_undefined_variables;
mod no_unused_fragments;
mod no_unused_variables;
mod overlapping_fields_can_be_merged;
mod possible_fragment_spreads;
mod provided_required_arguments;
mod scalar_leafs;
mod single_field_subscriptions;
mod unique_argument_names;
mod unique_directives_per_location;
mod unique_fragment_names;
mod unique_input_field_names;
mod unique_operation_names;
mod unique_variable_names;
mod values_of_correct_type;
mod variables_are_input_types;
mod variables_in_allowed_position;

use crate::{
    ast::Document,
    validation::{MultiVisitorNil, ValidatorContext, visit},
};

#[doc(hidden)]
pub fn visit_all_rules<'a>(ctx: &mut ValidatorContext<'a>, doc: &'a Document<'a>) {
    // Rules recursing through fragment spreads assume the fragment graph
    // is acyclic and structurally sound, so they only run once the
    // structural rules found nothing. This is cheaper than making every
    // single rule defend against cycles on its own.
    let mut stage1 = MultiVisitorNil
        .with(self::executable_definitions::factory())
        .with(self::fields_on_correct_type::factory())
        .with(self::fragments_on_composite_types::factory())
        .with(self::known_argument_names::factory())
        .with(self::known_directives::factory())
        .with(self::known_fragment_names::factory())
        .with(self::known_type_names::factory())
        .with(self::lone_anonymous_operation::factory())
        .with(self::no_fragment_cycles::factory())
        .with(self::no_undefined_variables::factory())
        .with(self::no_unused_fragments::factory())
        .with(self::no_unused_variables::factory())
        .with(self::possible_fragment_spreads::factory())
        .with(self::provided_required_arguments::factory())
        .with(self::scalar_leafs::factory())
        .with(self::single_field_subscriptions::factory())
        .with(self::unique_argument_names::factory())
        .with(self::unique_directives_per_location::factory())
        .with(self::unique_fragment_names::factory())
        .with(self::unique_input_field_names::factory())
        .with(self::unique_operation_names::factory())
        .with(self::unique_variable_names::factory())
        .with(self::values_of_correct_type::factory())
        .with(self::variables_are_input_types::factory())
        .with(self::variables_in_allowed_position::factory());
    visit(&mut stage1, ctx, doc);
    if ctx.has_errors() {
        return;
    }

    let mut stage2 = MultiVisitorNil.with(self::overlapping_fields_can_be_merged::factory());
    visit(&mut stage2, ctx, doc);
}
