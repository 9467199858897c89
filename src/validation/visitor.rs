//! The document walker driving validation rules.
//!
//! The walk dispatches typed enter/exit callbacks to the visitor and
//! keeps the context's [`TypeInfo`](crate::type_info::TypeInfo) in sync:
//! the type transitions happen before the visitor's `enter_*` and after
//! its `exit_*`, so rules always observe the semantic context of the
//! node they are handed.

use crate::{
    ast::{
        Arguments, Definition, Directive, Document, Field, FragmentSpread, InlineFragment,
        InputValue, Selection, VariableDefinitions,
    },
    span::Spanning,
    validation::{ValidatorContext, Visitor},
};

#[doc(hidden)]
pub fn visit<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut ValidatorContext<'a>,
    document: &'a Document<'a>,
) {
    v.enter_document(ctx, document);
    for def in document {
        if ctx.is_aborted() {
            break;
        }
        visit_definition(v, ctx, def);
    }
    v.exit_document(ctx, document);
}

fn visit_definition<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut ValidatorContext<'a>,
    def: &'a Definition<'a>,
) {
    match def {
        Definition::Operation(op) => {
            ctx.type_info.enter_operation(&op.item);
            v.enter_operation_definition(ctx, op);

            visit_variable_definitions(v, ctx, &op.item.variable_definitions);
            visit_directives(v, ctx, &op.item.directives);
            visit_selection_set(v, ctx, &op.item.selection_set);

            v.exit_operation_definition(ctx, op);
            ctx.type_info.leave_operation();
        }
        Definition::Fragment(f) => {
            ctx.type_info.enter_fragment(Some(f.item.type_condition.item));
            v.enter_fragment_definition(ctx, f);

            visit_directives(v, ctx, &f.item.directives);
            visit_selection_set(v, ctx, &f.item.selection_set);

            v.exit_fragment_definition(ctx, f);
            ctx.type_info.leave_fragment();
        }
        Definition::TypeSystem(t) => {
            v.enter_type_system_definition(ctx, t);
            v.exit_type_system_definition(ctx, t);
        }
    }
}

fn visit_variable_definitions<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut ValidatorContext<'a>,
    defs: &'a Option<Spanning<VariableDefinitions<'a>>>,
) {
    let Some(defs) = defs else { return };
    for def in defs.item.iter() {
        ctx.type_info.enter_variable_definition(&def.1.var_type.item);
        v.enter_variable_definition(ctx, def);

        if let Some(default_value) = &def.1.default_value {
            visit_input_value(v, ctx, default_value);
        }

        v.exit_variable_definition(ctx, def);
        ctx.type_info.leave_variable_definition();
    }
}

fn visit_directives<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut ValidatorContext<'a>,
    directives: &'a Option<Vec<Spanning<Directive<'a>>>>,
) {
    let Some(directives) = directives else { return };
    for directive in directives {
        ctx.type_info.enter_directive(directive.item.name.item);
        v.enter_directive(ctx, directive);

        visit_arguments(v, ctx, &directive.item.arguments);

        v.exit_directive(ctx, directive);
        ctx.type_info.leave_directive();
    }
}

fn visit_arguments<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut ValidatorContext<'a>,
    arguments: &'a Option<Spanning<Arguments<'a>>>,
) {
    let Some(arguments) = arguments else { return };
    for argument in arguments.item.iter() {
        ctx.type_info.enter_argument(argument.0.item);
        v.enter_argument(ctx, argument);

        visit_input_value(v, ctx, &argument.1);

        v.exit_argument(ctx, argument);
        ctx.type_info.leave_argument();
    }
}

fn visit_selection_set<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut ValidatorContext<'a>,
    selection_set: &'a [Selection<'a>],
) {
    ctx.type_info.enter_selection_set();
    v.enter_selection_set(ctx, selection_set);

    for selection in selection_set {
        if ctx.is_aborted() {
            break;
        }
        visit_selection(v, ctx, selection);
    }

    v.exit_selection_set(ctx, selection_set);
    ctx.type_info.leave_selection_set();
}

fn visit_selection<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut ValidatorContext<'a>,
    selection: &'a Selection<'a>,
) {
    match selection {
        Selection::Field(field) => visit_field(v, ctx, field),
        Selection::FragmentSpread(spread) => visit_fragment_spread(v, ctx, spread),
        Selection::InlineFragment(fragment) => visit_inline_fragment(v, ctx, fragment),
    }
}

fn visit_field<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut ValidatorContext<'a>,
    field: &'a Spanning<Field<'a>>,
) {
    ctx.type_info.enter_field(&field.item);
    v.enter_field(ctx, field);

    visit_arguments(v, ctx, &field.item.arguments);
    visit_directives(v, ctx, &field.item.directives);

    if let Some(selection_set) = &field.item.selection_set {
        visit_selection_set(v, ctx, selection_set);
    }

    v.exit_field(ctx, field);
    ctx.type_info.leave_field();
}

fn visit_fragment_spread<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut ValidatorContext<'a>,
    spread: &'a Spanning<FragmentSpread<'a>>,
) {
    v.enter_fragment_spread(ctx, spread);

    visit_directives(v, ctx, &spread.item.directives);

    v.exit_fragment_spread(ctx, spread);
}

fn visit_inline_fragment<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut ValidatorContext<'a>,
    fragment: &'a Spanning<InlineFragment<'a>>,
) {
    ctx.type_info
        .enter_fragment(fragment.item.type_condition.map(|tc| tc.item));
    v.enter_inline_fragment(ctx, fragment);

    visit_directives(v, ctx, &fragment.item.directives);
    visit_selection_set(v, ctx, &fragment.item.selection_set);

    v.exit_inline_fragment(ctx, fragment);
    ctx.type_info.leave_fragment();
}

fn visit_input_value<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut ValidatorContext<'a>,
    input_value: &'a Spanning<InputValue>,
) {
    let span = input_value.span;

    match &input_value.item {
        InputValue::Null => {
            v.enter_null_value(ctx, Spanning::new(span, ()));
            v.exit_null_value(ctx, Spanning::new(span, ()));
        }
        InputValue::Int(i) => {
            v.enter_int_value(ctx, Spanning::new(span, *i));
            v.exit_int_value(ctx, Spanning::new(span, *i));
        }
        InputValue::Float(f) => {
            v.enter_float_value(ctx, Spanning::new(span, *f));
            v.exit_float_value(ctx, Spanning::new(span, *f));
        }
        InputValue::String(s) => {
            v.enter_string_value(ctx, Spanning::new(span, s));
            v.exit_string_value(ctx, Spanning::new(span, s));
        }
        InputValue::Boolean(b) => {
            v.enter_boolean_value(ctx, Spanning::new(span, *b));
            v.exit_boolean_value(ctx, Spanning::new(span, *b));
        }
        InputValue::Enum(e) => {
            ctx.type_info.enter_enum_value(e);
            v.enter_enum_value(ctx, Spanning::new(span, e));
            v.exit_enum_value(ctx, Spanning::new(span, e));
            ctx.type_info.leave_enum_value();
        }
        InputValue::Variable(var) => {
            v.enter_variable_value(ctx, Spanning::new(span, var));
            v.exit_variable_value(ctx, Spanning::new(span, var));
        }
        InputValue::List(items) => {
            ctx.type_info.enter_list_value();
            v.enter_list_value(ctx, Spanning::new(span, items));
            for item in items {
                visit_input_value(v, ctx, item);
            }
            v.exit_list_value(ctx, Spanning::new(span, items));
            ctx.type_info.leave_list_value();
        }
        InputValue::Object(fields) => {
            v.enter_object_value(ctx, Spanning::new(span, fields));
            for field in fields {
                ctx.type_info.enter_object_field(&field.0.item);
                v.enter_object_field(ctx, field);
                visit_input_value(v, ctx, &field.1);
                v.exit_object_field(ctx, field);
                ctx.type_info.leave_object_field();
            }
            v.exit_object_value(ctx, Spanning::new(span, fields));
        }
    }
}
