//! Coercion of input literals, runtime values, variables, and arguments
//! against schema types.

use arcstr::ArcStr;

use crate::{
    ast::{InputValue, Type, VariableDefinitions},
    executor::{Arguments, ExecutionError, PathSegment, Variables},
    schema::{meta::MetaType, model::SchemaType},
    span::Spanning,
    util::{did_you_mean, suggestion_list},
};

/// Coerces a literal AST value against an input type, substituting the
/// provided variable values.
///
/// Returns `None` when the literal has no valid value of the type
/// ("undefined"), which callers report at their own granularity. A
/// non-list value coerces to a one-element list.
pub fn value_from_ast(
    node: &Spanning<InputValue>,
    ty: &Type<ArcStr>,
    variables: Option<&Variables>,
    schema: &SchemaType,
) -> Option<InputValue> {
    if let InputValue::Variable(name) = &node.item {
        let variables = variables?;
        return match variables.get(name) {
            None => {
                if ty.is_non_null() {
                    None
                } else {
                    Some(InputValue::Null)
                }
            }
            Some(value) => {
                if value.is_null() && ty.is_non_null() {
                    None
                } else {
                    Some(value.clone())
                }
            }
        };
    }

    if ty.is_non_null() {
        if node.item.is_null() {
            return None;
        }
        return value_from_ast(node, &ty.clone().into_nullable(), variables, schema);
    }

    if node.item.is_null() {
        return Some(InputValue::Null);
    }

    if let Some(item_type) = ty.list_contents() {
        return match &node.item {
            InputValue::List(items) => {
                let mut coerced = Vec::with_capacity(items.len());
                for item in items {
                    if is_missing_variable(item, variables) {
                        if item_type.is_non_null() {
                            return None;
                        }
                        coerced.push(Spanning::new(item.span, InputValue::Null));
                    } else {
                        coerced.push(Spanning::new(
                            item.span,
                            value_from_ast(item, item_type, variables, schema)?,
                        ));
                    }
                }
                Some(InputValue::List(coerced))
            }
            // A single non-list value coerces to a one-element list.
            _ => Some(InputValue::List(vec![Spanning::new(
                node.span,
                value_from_ast(node, item_type, variables, schema)?,
            )])),
        };
    }

    let type_name = ty.innermost_name();
    let meta = schema.concrete_type_by_name(type_name)?;
    match meta {
        MetaType::InputObject(io) => {
            let InputValue::Object(provided) = &node.item else {
                return None;
            };

            let mut coerced = Vec::with_capacity(io.input_fields.len());
            for field in &io.input_fields {
                let entry = provided.iter().find(|(k, _)| k.item == field.name);
                match entry {
                    Some((key, value)) if !is_missing_variable(value, variables) => {
                        coerced.push((
                            key.clone(),
                            Spanning::new(
                                value.span,
                                value_from_ast(value, &field.arg_type, variables, schema)?,
                            ),
                        ));
                    }
                    _ => {
                        if let Some(default) = &field.default_value {
                            coerced.push((
                                Spanning::unlocated(field.name.to_string()),
                                Spanning::unlocated(default.clone()),
                            ));
                        } else if field.arg_type.is_non_null() {
                            return None;
                        }
                    }
                }
            }

            // Unknown input fields have no valid coercion.
            for (key, _) in provided {
                if io.input_fields.iter().all(|f| f.name != key.item) {
                    return None;
                }
            }

            Some(InputValue::Object(coerced))
        }
        MetaType::Enum(..) => match node.item.as_enum_value() {
            Some(name) if meta.enum_value_by_name(name).is_some() => Some(node.item.clone()),
            _ => None,
        },
        MetaType::Scalar(s) => {
            let value = match variables {
                Some(vars) => node.item.clone().into_const(vars)?,
                None => node.item.clone(),
            };
            (s.parse_literal_fn)(&value).ok()
        }
        _ => None,
    }
}

fn is_missing_variable(node: &Spanning<InputValue>, variables: Option<&Variables>) -> bool {
    match &node.item {
        InputValue::Variable(name) => !variables.is_some_and(|vars| vars.contains_key(name)),
        _ => false,
    }
}

/// Coerces a runtime value (no variables inside) against an input type.
///
/// Every leaf failure invokes `on_error` with the response path to the
/// offending value; the overall result is `None` whenever any error was
/// reported.
pub fn coerce_input_value(
    value: &InputValue,
    ty: &Type<ArcStr>,
    schema: &SchemaType,
    path: &mut Vec<PathSegment>,
    on_error: &mut dyn FnMut(&[PathSegment], &InputValue, String),
) -> Option<InputValue> {
    if ty.is_non_null() {
        if value.is_null() {
            on_error(
                path,
                value,
                format!("Expected non-nullable type \"{ty}\" not to be null."),
            );
            return None;
        }
        return coerce_input_value(value, &ty.clone().into_nullable(), schema, path, on_error);
    }

    if value.is_null() {
        return Some(InputValue::Null);
    }

    if let Some(item_type) = ty.list_contents() {
        return match value {
            InputValue::List(items) => {
                let mut coerced = Vec::with_capacity(items.len());
                let mut failed = false;
                for (index, item) in items.iter().enumerate() {
                    path.push(PathSegment::Index(index));
                    match coerce_input_value(&item.item, item_type, schema, path, on_error) {
                        Some(v) => coerced.push(Spanning::new(item.span, v)),
                        None => failed = true,
                    }
                    path.pop();
                }
                (!failed).then_some(InputValue::List(coerced))
            }
            // A single non-list value coerces to a one-element list.
            _ => Some(InputValue::List(vec![Spanning::unlocated(
                coerce_input_value(value, item_type, schema, path, on_error)?,
            )])),
        };
    }

    let type_name = ty.innermost_name();
    let Some(meta) = schema.concrete_type_by_name(type_name) else {
        on_error(path, value, format!("Unknown input type \"{type_name}\"."));
        return None;
    };

    match meta {
        MetaType::InputObject(io) => {
            let Some(provided) = value.to_object_value() else {
                on_error(
                    path,
                    value,
                    format!("Expected type \"{type_name}\" to be an object."),
                );
                return None;
            };

            let mut coerced = Vec::with_capacity(io.input_fields.len());
            let mut failed = false;
            for field in &io.input_fields {
                match provided.get(field.name.as_str()) {
                    Some(field_value) => {
                        path.push(PathSegment::Field(field.name.to_string()));
                        match coerce_input_value(field_value, &field.arg_type, schema, path, on_error)
                        {
                            Some(v) => coerced.push((
                                Spanning::unlocated(field.name.to_string()),
                                Spanning::unlocated(v),
                            )),
                            None => failed = true,
                        }
                        path.pop();
                    }
                    None => {
                        if let Some(default) = &field.default_value {
                            coerced.push((
                                Spanning::unlocated(field.name.to_string()),
                                Spanning::unlocated(default.clone()),
                            ));
                        } else if field.arg_type.is_non_null() {
                            failed = true;
                            on_error(
                                path,
                                value,
                                format!(
                                    "Field \"{}\" of required type \"{}\" was not provided.",
                                    field.name, field.arg_type,
                                ),
                            );
                        }
                    }
                }
            }

            for key in provided.keys() {
                if io.input_fields.iter().all(|f| f.name != *key) {
                    failed = true;
                    let suggestions = suggestion_list(
                        key,
                        io.input_fields.iter().map(|f| f.name.as_str()),
                    );
                    on_error(
                        path,
                        value,
                        format!(
                            "Field \"{key}\" is not defined by type \"{type_name}\".{}",
                            did_you_mean(&suggestions),
                        ),
                    );
                }
            }

            (!failed).then_some(InputValue::Object(coerced))
        }
        MetaType::Enum(..) => {
            let name = value
                .as_enum_value()
                .or_else(|| value.as_string_value());
            match name {
                Some(name) if meta.enum_value_by_name(name).is_some() => {
                    Some(InputValue::Enum(name.into()))
                }
                _ => {
                    on_error(
                        path,
                        value,
                        format!("Value {value} does not exist in \"{type_name}\" enum."),
                    );
                    None
                }
            }
        }
        MetaType::Scalar(s) => match (s.parse_value_fn)(value) {
            Ok(v) => Some(v),
            Err(message) => {
                on_error(path, value, message);
                None
            }
        },
        _ => {
            on_error(
                path,
                value,
                format!("Type \"{type_name}\" cannot be used as an input type."),
            );
            None
        }
    }
}

/// Coerces the operation's variable values against their declared types.
///
/// All failures are collected; any failure fails the whole operation
/// before field execution.
pub fn coerce_variable_values(
    schema: &SchemaType,
    variable_definitions: &Option<Spanning<VariableDefinitions<'_>>>,
    inputs: &Variables,
) -> Result<Variables, Vec<ExecutionError>> {
    let mut coerced = Variables::new();
    let mut errors = Vec::new();

    let Some(definitions) = variable_definitions else {
        return Ok(coerced);
    };

    for (name, definition) in definitions.item.iter() {
        let var_name = name.item;
        let var_type = definition.var_type.item.to_arc();
        let printed_type = &definition.var_type.item;

        let is_input_type = schema
            .concrete_type_by_name(var_type.innermost_name())
            .is_some_and(MetaType::is_input);
        if !is_input_type {
            errors.push(ExecutionError::new(
                definition.var_type.start(),
                vec![],
                format!(
                    "Variable \"${var_name}\" expected value of type \"{printed_type}\" \
                     which cannot be used as an input type.",
                )
                .into(),
            ));
            continue;
        }

        let Some(value) = inputs.get(var_name) else {
            if let Some(default) = &definition.default_value {
                match value_from_ast(default, &var_type, None, schema) {
                    Some(v) => {
                        coerced.insert(var_name.into(), v);
                    }
                    None => errors.push(ExecutionError::new(
                        default.start(),
                        vec![],
                        format!(
                            "Variable \"${var_name}\" got invalid default value {}.",
                            default.item,
                        )
                        .into(),
                    )),
                }
            } else if var_type.is_non_null() {
                errors.push(ExecutionError::new(
                    name.start(),
                    vec![],
                    format!(
                        "Variable \"${var_name}\" of required type \"{printed_type}\" \
                         was not provided.",
                    )
                    .into(),
                ));
            }
            continue;
        };

        if value.is_null() && var_type.is_non_null() {
            errors.push(ExecutionError::new(
                name.start(),
                vec![],
                format!(
                    "Variable \"${var_name}\" of non-null type \"{printed_type}\" \
                     must not be null.",
                )
                .into(),
            ));
            continue;
        }

        let mut path = Vec::new();
        let mut on_error = |err_path: &[PathSegment], invalid: &InputValue, message: String| {
            let message = if err_path.is_empty() {
                format!("Variable \"${var_name}\" got invalid value {invalid}; {message}")
            } else {
                format!(
                    "Variable \"${var_name}\" got invalid value {invalid} \
                     at \"{var_name}{}\"; {message}",
                    print_path(err_path),
                )
            };
            errors.push(ExecutionError::new(name.start(), vec![], message.into()));
        };

        if let Some(v) = coerce_input_value(value, &var_type, schema, &mut path, &mut on_error) {
            coerced.insert(var_name.into(), v);
        }
    }

    if errors.is_empty() {
        Ok(coerced)
    } else {
        Err(errors)
    }
}

fn print_path(path: &[PathSegment]) -> String {
    path.iter()
        .map(|segment| match segment {
            PathSegment::Field(f) => format!(".{f}"),
            PathSegment::Index(i) => format!("[{i}]"),
        })
        .collect()
}

/// Coerces a field's or a directive's argument literals against the
/// declared argument definitions, applying defaults and substituting
/// variables.
pub fn coerce_argument_values(
    schema: &SchemaType,
    arg_defs: Option<&[crate::schema::meta::Argument]>,
    ast_arguments: &Option<Spanning<crate::ast::Arguments<'_>>>,
    variables: &Variables,
) -> Result<Arguments, String> {
    let mut coerced = Arguments::new();
    let Some(defs) = arg_defs else {
        return Ok(coerced);
    };

    for def in defs {
        let arg_name = def.name.as_str();
        let arg_type = &def.arg_type;
        let node = ast_arguments.as_ref().and_then(|args| args.item.get(arg_name));

        let Some(node) = node else {
            if let Some(default) = &def.default_value {
                coerced.insert(arg_name.into(), default.clone());
            } else if arg_type.is_non_null() {
                return Err(format!(
                    "Argument \"{arg_name}\" of required type \"{arg_type}\" \
                     was not provided.",
                ));
            }
            continue;
        };

        if let InputValue::Variable(var_name) = &node.item {
            match variables.get(var_name) {
                None => {
                    if let Some(default) = &def.default_value {
                        coerced.insert(arg_name.into(), default.clone());
                    } else if arg_type.is_non_null() {
                        return Err(format!(
                            "Argument \"{arg_name}\" of required type \"{arg_type}\" was \
                             provided the variable \"${var_name}\" which was not provided \
                             a runtime value.",
                        ));
                    }
                    continue;
                }
                Some(value) => {
                    if value.is_null() && arg_type.is_non_null() {
                        return Err(format!(
                            "Argument \"{arg_name}\" of non-null type \"{arg_type}\" \
                             must not be null.",
                        ));
                    }
                    coerced.insert(arg_name.into(), value.clone());
                    continue;
                }
            }
        }

        match value_from_ast(node, arg_type, Some(variables), schema) {
            Some(v) => {
                coerced.insert(arg_name.into(), v);
            }
            None => {
                return Err(format!(
                    "Argument \"{arg_name}\" has invalid value {}.",
                    node.item,
                ));
            }
        }
    }

    Ok(coerced)
}
