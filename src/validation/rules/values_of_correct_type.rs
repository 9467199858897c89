use arcstr::ArcStr;

use crate::{
    ast::{InputValue, Type},
    schema::meta::MetaType,
    span::{SourcePosition, Spanning},
    util::{did_you_mean, suggestion_list},
    validation::{ValidatorContext, Visitor},
};

pub struct ValuesOfCorrectType;

pub fn factory() -> ValuesOfCorrectType {
    ValuesOfCorrectType
}

impl<'a> Visitor<'a> for ValuesOfCorrectType {
    fn enter_null_value(&mut self, ctx: &mut ValidatorContext<'a>, value: Spanning<()>) {
        if let Some(ty) = ctx.current_input_type_literal()
            && ty.is_non_null()
        {
            let message = type_mismatch_message(&ty.to_string(), "null");
            ctx.report_error(&message, &[value.start()]);
        }
    }

    fn enter_int_value(&mut self, ctx: &mut ValidatorContext<'a>, value: Spanning<i32>) {
        check_leaf_value(ctx, &InputValue::Int(value.item), value.start());
    }

    fn enter_float_value(&mut self, ctx: &mut ValidatorContext<'a>, value: Spanning<f64>) {
        check_leaf_value(ctx, &InputValue::Float(value.item), value.start());
    }

    fn enter_string_value(&mut self, ctx: &mut ValidatorContext<'a>, value: Spanning<&'a String>) {
        check_leaf_value(ctx, &InputValue::String(value.item.clone()), value.start());
    }

    fn enter_boolean_value(&mut self, ctx: &mut ValidatorContext<'a>, value: Spanning<bool>) {
        check_leaf_value(ctx, &InputValue::Boolean(value.item), value.start());
    }

    fn enter_enum_value(&mut self, ctx: &mut ValidatorContext<'a>, value: Spanning<&'a String>) {
        let Some(meta) = ctx.current_input_type() else {
            return;
        };
        match meta {
            MetaType::Enum(..) => {
                if ctx.current_enum_value().is_none() {
                    let message = enum_value_message(value.item, meta.name());
                    ctx.report_error(&message, &[value.start()]);
                }
            }
            MetaType::Scalar(..) => {
                check_leaf_value(ctx, &InputValue::Enum(value.item.clone()), value.start());
            }
            _ => {}
        }
    }

    fn enter_list_value(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        value: Spanning<&'a Vec<Spanning<InputValue>>>,
    ) {
        // The item type sits on top of the input stack here; the list's
        // own type is one level up. A list literal against a non-list
        // leaf type is checked as a whole value.
        let Some(ty) = ctx.parent_input_type_literal() else {
            return;
        };
        if ty.clone().into_nullable().list_contents().is_some() {
            return;
        }
        let literal = InputValue::parsed_list(value.item.clone());
        let message = match leaf_parse_failure(ctx, ty, &literal) {
            Some(message) => message,
            None => return,
        };
        ctx.report_error(&message, &[value.start()]);
    }

    fn enter_object_value(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        value: Spanning<&'a Vec<(Spanning<String>, Spanning<InputValue>)>>,
    ) {
        let Some(meta) = ctx.current_input_type() else {
            return;
        };
        let MetaType::InputObject(io) = meta else {
            let message = type_mismatch_message(
                meta.name(),
                &InputValue::parsed_object(value.item.clone()).to_string(),
            );
            ctx.report_error(&message, &[value.start()]);
            return;
        };

        for field in &io.input_fields {
            if field.arg_type.is_non_null()
                && field.default_value.is_none()
                && !value.item.iter().any(|(name, _)| name.item == field.name)
            {
                ctx.report_error(
                    &required_field_message(meta.name(), &field.name, &field.arg_type.to_string()),
                    &[value.start()],
                );
            }
        }
    }

    fn enter_object_field(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        (field_name, _): &'a (Spanning<String>, Spanning<InputValue>),
    ) {
        // The walker has already pushed the field's type; an unknown
        // field pushes `None`.
        if ctx.current_input_type_literal().is_some() {
            return;
        }
        let Some(parent) = parent_input_object(ctx) else {
            return;
        };
        let suggestions = suggestion_list(
            &field_name.item,
            parent
                .input_fields()
                .iter()
                .map(|f| f.name.as_str()),
        );
        ctx.report_error(
            &unknown_field_message(&field_name.item, parent.name(), &suggestions),
            &[field_name.start()],
        );
    }
}

fn parent_input_object<'a>(ctx: &ValidatorContext<'a>) -> Option<InputObjectView<'a>> {
    // While inside an object field, the object's own type sits one level
    // up the input stack.
    let parent = ctx.parent_input_type_literal()?;
    let meta = ctx.schema.concrete_type_by_name(parent.innermost_name())?;
    match meta {
        MetaType::InputObject(io) => Some(InputObjectView {
            name: meta.name(),
            fields: &io.input_fields,
        }),
        _ => None,
    }
}

struct InputObjectView<'a> {
    name: &'a str,
    fields: &'a [crate::schema::meta::Argument],
}

impl<'a> InputObjectView<'a> {
    fn name(&self) -> &'a str {
        self.name
    }

    fn input_fields(&self) -> &'a [crate::schema::meta::Argument] {
        self.fields
    }
}

fn check_leaf_value(ctx: &mut ValidatorContext<'_>, value: &InputValue, pos: SourcePosition) {
    let Some(ty) = ctx.current_input_type_literal() else {
        return;
    };
    let ty = ty.clone();
    if let Some(message) = leaf_parse_failure(ctx, &ty, value) {
        ctx.report_error(&message, &[pos]);
    }
}

/// Checks a literal against the named leaf type behind `ty`, returning
/// the error message on mismatch.
fn leaf_parse_failure(
    ctx: &ValidatorContext<'_>,
    ty: &Type<ArcStr>,
    value: &InputValue,
) -> Option<String> {
    let type_name = ty.innermost_name();
    let meta = ctx.schema.concrete_type_by_name(type_name)?;
    match meta {
        MetaType::Scalar(s) => (s.parse_literal_fn)(value).err(),
        MetaType::Enum(..) => match value.as_enum_value() {
            Some(name) if meta.enum_value_by_name(name).is_some() => None,
            _ => Some(enum_value_message(&value.to_string(), type_name)),
        },
        MetaType::InputObject(..) => {
            Some(type_mismatch_message(type_name, &value.to_string()))
        }
        _ => None,
    }
}

fn type_mismatch_message(type_name: &str, value: &str) -> String {
    format!("Expected value of type \"{type_name}\", found {value}.")
}

fn enum_value_message(value: &str, type_name: &str) -> String {
    format!("Value \"{value}\" does not exist in \"{type_name}\" enum.")
}

fn required_field_message(type_name: &str, field_name: &str, field_type: &str) -> String {
    format!(
        "Field \"{type_name}.{field_name}\" of required type \"{field_type}\" \
         was not provided.",
    )
}

fn unknown_field_message(field_name: &str, type_name: &str, suggestions: &[String]) -> String {
    format!(
        "Field \"{field_name}\" is not defined by type \"{type_name}\".{}",
        did_you_mean(suggestions),
    )
}

#[cfg(test)]
mod tests {
    use super::{
        enum_value_message, factory, required_field_message, type_mismatch_message,
        unknown_field_message,
    };

    use crate::validation::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn good_scalar_and_enum_values() {
        expect_passes_rule(
            factory,
            r#"
          {
            complicatedArgs {
              intArgField(intArg: 2)
              stringArgField(stringArg: "foo")
              booleanArgField(booleanArg: true)
              floatArgField(floatArg: 1.1)
              enumArgField(enumArg: BROWN)
              idArgField(idArg: 1)
            }
          }
        "#,
        );
    }

    #[test]
    fn int_into_float_and_id() {
        expect_passes_rule(
            factory,
            r#"
          {
            complicatedArgs {
              floatArgField(floatArg: 1)
              idArgField(idArg: "someIdString")
            }
          }
        "#,
        );
    }

    #[test]
    fn single_value_into_list() {
        expect_passes_rule(
            factory,
            "{ complicatedArgs { stringListArgField(stringListArg: \"one\") } }",
        );
    }

    #[test]
    fn good_list_value() {
        expect_passes_rule(
            factory,
            "{ complicatedArgs { stringListArgField(stringListArg: [\"one\", null, \"two\"]) } }",
        );
    }

    #[test]
    fn good_input_object_value() {
        expect_passes_rule(
            factory,
            r#"
          {
            complicatedArgs {
              complexArgField(complexArg: { requiredField: true, intField: 4 })
            }
          }
        "#,
        );
    }

    #[test]
    fn string_into_int() {
        expect_fails_rule(
            factory,
            "{ complicatedArgs { intArgField(intArg: \"3\") } }",
            &["Int cannot represent non-integer value: \"3\""],
        );
    }

    #[test]
    fn boolean_into_string() {
        expect_fails_rule(
            factory,
            "{ complicatedArgs { stringArgField(stringArg: true) } }",
            &["String cannot represent a non-string value: true"],
        );
    }

    #[test]
    fn unknown_enum_value() {
        expect_fails_rule(
            factory,
            "{ complicatedArgs { enumArgField(enumArg: PURPLE) } }",
            &[&enum_value_message("PURPLE", "FurColor")],
        );
    }

    #[test]
    fn string_into_enum() {
        expect_fails_rule(
            factory,
            "{ complicatedArgs { enumArgField(enumArg: \"BROWN\") } }",
            &[&enum_value_message("\"BROWN\"", "FurColor")],
        );
    }

    #[test]
    fn incorrect_item_type_in_list() {
        expect_fails_rule(
            factory,
            "{ complicatedArgs { stringListArgField(stringListArg: [\"one\", 2]) } }",
            &["String cannot represent a non-string value: 2"],
        );
    }

    #[test]
    fn null_into_non_null() {
        expect_fails_rule(
            factory,
            "{ complicatedArgs { nonNullIntArgField(nonNullIntArg: null) } }",
            &[&type_mismatch_message("Int!", "null")],
        );
    }

    #[test]
    fn missing_required_input_object_field() {
        expect_fails_rule(
            factory,
            "{ complicatedArgs { complexArgField(complexArg: { intField: 4 }) } }",
            &[&required_field_message("ComplexInput", "requiredField", "Boolean!")],
        );
    }

    #[test]
    fn unknown_input_object_field_with_suggestion() {
        expect_fails_rule(
            factory,
            "{ complicatedArgs { complexArgField(complexArg: { requiredField: true, requiredfield: false }) } }",
            &[&unknown_field_message(
                "requiredfield",
                "ComplexInput",
                &["requiredField".into()],
            )],
        );
    }
}
