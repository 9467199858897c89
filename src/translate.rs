//! Adapter from externally parsed `graphql_parser` query documents into
//! the crate's AST.
//!
//! Lexing and parsing are not this crate's business; the `graphql-parser`
//! crate produces the syntax tree and this module reshapes it, borrowing
//! all names from the source text. `graphql-parser` carries positions on
//! nodes but not on value literals, so value spans fall back to the
//! position of the nearest enclosing node.

use graphql_parser::{Pos, query as gp};

use crate::{
    GraphQLError,
    ast::{
        Arguments, Definition, Directive, Field, Fragment, FragmentSpread, InlineFragment,
        InputValue, Operation, OperationType, OwnedDocument, Selection, Type, VariableDefinition,
        VariableDefinitions,
    },
    span::{SourcePosition, Span, Spanning},
};

/// Parses a GraphQL source text into the crate's document AST.
pub fn parse_document(source: &str) -> Result<OwnedDocument<'_>, GraphQLError> {
    let doc = gp::parse_query::<&str>(source)
        .map_err(|e| GraphQLError::ParseError(e.to_string()))?;

    Ok(doc
        .definitions
        .iter()
        .map(|def| match def {
            gp::Definition::Operation(op) => Definition::Operation(translate_operation(op)),
            gp::Definition::Fragment(frag) => Definition::Fragment(translate_fragment(frag)),
        })
        .collect())
}

fn position(pos: Pos) -> SourcePosition {
    // `graphql_parser` positions are one-based.
    SourcePosition::new(pos.line.saturating_sub(1), pos.column.saturating_sub(1))
}

fn span_at(pos: Pos) -> Span {
    Span::zero_width(position(pos))
}

fn translate_operation<'a>(
    op: &gp::OperationDefinition<'a, &'a str>,
) -> Spanning<Operation<'a>> {
    match op {
        gp::OperationDefinition::SelectionSet(ss) => Spanning::new(
            Span::new(position(ss.span.0), position(ss.span.1)),
            Operation {
                operation_type: OperationType::Query,
                name: None,
                variable_definitions: None,
                directives: None,
                selection_set: translate_selection_set(ss),
            },
        ),
        gp::OperationDefinition::Query(q) => translate_operation_parts(
            OperationType::Query,
            q.position,
            q.name,
            &q.variable_definitions,
            &q.directives,
            &q.selection_set,
        ),
        gp::OperationDefinition::Mutation(m) => translate_operation_parts(
            OperationType::Mutation,
            m.position,
            m.name,
            &m.variable_definitions,
            &m.directives,
            &m.selection_set,
        ),
        gp::OperationDefinition::Subscription(s) => translate_operation_parts(
            OperationType::Subscription,
            s.position,
            s.name,
            &s.variable_definitions,
            &s.directives,
            &s.selection_set,
        ),
    }
}

fn translate_operation_parts<'a>(
    operation_type: OperationType,
    pos: Pos,
    name: Option<&'a str>,
    variable_definitions: &[gp::VariableDefinition<'a, &'a str>],
    directives: &[gp::Directive<'a, &'a str>],
    selection_set: &gp::SelectionSet<'a, &'a str>,
) -> Spanning<Operation<'a>> {
    Spanning::new(
        span_at(pos),
        Operation {
            operation_type,
            name: name.map(|n| Spanning::new(span_at(pos), n)),
            variable_definitions: translate_variable_definitions(variable_definitions),
            directives: translate_directives(directives),
            selection_set: translate_selection_set(selection_set),
        },
    )
}

fn translate_variable_definitions<'a>(
    defs: &[gp::VariableDefinition<'a, &'a str>],
) -> Option<Spanning<VariableDefinitions<'a>>> {
    if defs.is_empty() {
        return None;
    }

    let items = defs
        .iter()
        .map(|def| {
            (
                Spanning::new(span_at(def.position), def.name),
                VariableDefinition {
                    var_type: Spanning::new(span_at(def.position), translate_type(&def.var_type)),
                    default_value: def
                        .default_value
                        .as_ref()
                        .map(|v| translate_value(v, def.position)),
                },
            )
        })
        .collect();

    Some(Spanning::new(
        span_at(defs[0].position),
        VariableDefinitions { items },
    ))
}

fn translate_type<'a>(ty: &gp::Type<'a, &'a str>) -> Type<&'a str> {
    match ty {
        gp::Type::NamedType(name) => Type::Named(name),
        gp::Type::ListType(inner) => Type::List(Box::new(translate_type(inner))),
        gp::Type::NonNullType(inner) => match translate_type(inner) {
            Type::Named(name) => Type::NonNullNamed(name),
            Type::List(inner) => Type::NonNullList(inner),
            non_null => non_null,
        },
    }
}

fn translate_selection_set<'a>(ss: &gp::SelectionSet<'a, &'a str>) -> Vec<Selection<'a>> {
    ss.items.iter().map(translate_selection).collect()
}

fn translate_selection<'a>(selection: &gp::Selection<'a, &'a str>) -> Selection<'a> {
    match selection {
        gp::Selection::Field(f) => Selection::Field(Spanning::new(
            span_at(f.position),
            Field {
                alias: f.alias.map(|a| Spanning::new(span_at(f.position), a)),
                name: Spanning::new(span_at(f.position), f.name),
                arguments: translate_arguments(&f.arguments, f.position),
                directives: translate_directives(&f.directives),
                selection_set: (!f.selection_set.items.is_empty())
                    .then(|| translate_selection_set(&f.selection_set)),
            },
        )),
        gp::Selection::FragmentSpread(s) => Selection::FragmentSpread(Spanning::new(
            span_at(s.position),
            FragmentSpread {
                name: Spanning::new(span_at(s.position), s.fragment_name),
                directives: translate_directives(&s.directives),
            },
        )),
        gp::Selection::InlineFragment(f) => Selection::InlineFragment(Spanning::new(
            span_at(f.position),
            InlineFragment {
                type_condition: f.type_condition.as_ref().map(|tc| {
                    let gp::TypeCondition::On(name) = tc;
                    Spanning::new(span_at(f.position), *name)
                }),
                directives: translate_directives(&f.directives),
                selection_set: translate_selection_set(&f.selection_set),
            },
        )),
    }
}

fn translate_fragment<'a>(frag: &gp::FragmentDefinition<'a, &'a str>) -> Spanning<Fragment<'a>> {
    let gp::TypeCondition::On(type_condition) = &frag.type_condition;
    Spanning::new(
        span_at(frag.position),
        Fragment {
            name: Spanning::new(span_at(frag.position), frag.name),
            type_condition: Spanning::new(span_at(frag.position), type_condition),
            directives: translate_directives(&frag.directives),
            selection_set: translate_selection_set(&frag.selection_set),
        },
    )
}

fn translate_directives<'a>(
    directives: &[gp::Directive<'a, &'a str>],
) -> Option<Vec<Spanning<Directive<'a>>>> {
    if directives.is_empty() {
        return None;
    }

    Some(
        directives
            .iter()
            .map(|d| {
                Spanning::new(
                    span_at(d.position),
                    Directive {
                        name: Spanning::new(span_at(d.position), d.name),
                        arguments: translate_arguments(&d.arguments, d.position),
                    },
                )
            })
            .collect(),
    )
}

fn translate_arguments<'a>(
    arguments: &[(&'a str, gp::Value<'a, &'a str>)],
    pos: Pos,
) -> Option<Spanning<Arguments<'a>>> {
    if arguments.is_empty() {
        return None;
    }

    Some(Spanning::new(
        span_at(pos),
        Arguments {
            items: arguments
                .iter()
                .map(|(name, value)| {
                    (Spanning::new(span_at(pos), *name), translate_value(value, pos))
                })
                .collect(),
        },
    ))
}

fn translate_value<'a>(value: &gp::Value<'a, &'a str>, pos: Pos) -> Spanning<InputValue> {
    let item = match value {
        gp::Value::Variable(name) => InputValue::Variable((*name).into()),
        gp::Value::Int(n) => match n.as_i64().and_then(|i| i32::try_from(i).ok()) {
            Some(i) => InputValue::Int(i),
            None => InputValue::Float(n.as_i64().map_or(f64::NAN, |i| i as f64)),
        },
        gp::Value::Float(f) => InputValue::Float(*f),
        gp::Value::String(s) => InputValue::String(s.clone()),
        gp::Value::Boolean(b) => InputValue::Boolean(*b),
        gp::Value::Null => InputValue::Null,
        gp::Value::Enum(name) => InputValue::Enum((*name).into()),
        gp::Value::List(items) => {
            InputValue::List(items.iter().map(|v| translate_value(v, pos)).collect())
        }
        gp::Value::Object(fields) => InputValue::Object(
            fields
                .iter()
                .map(|(k, v)| {
                    (
                        Spanning::new(span_at(pos), (*k).into()),
                        translate_value(v, pos),
                    )
                })
                .collect(),
        ),
    };
    Spanning::new(span_at(pos), item)
}

#[cfg(test)]
mod tests {
    use crate::ast::{Definition, InputValue, OperationType, Selection, Type};

    use super::parse_document;

    #[test]
    fn parses_operations_and_fragments() {
        let doc = parse_document(
            r#"
            query Foo($id: ID!, $limit: Int = 10) {
              user(id: $id) @include(if: true) {
                name
                ...friends
              }
            }
            fragment friends on User {
              friends(first: $limit) { name }
            }
            "#,
        )
        .unwrap();

        assert_eq!(doc.len(), 2);

        let Definition::Operation(op) = &doc[0] else {
            panic!("expected an operation");
        };
        assert_eq!(op.item.operation_type, OperationType::Query);
        assert_eq!(op.item.name.unwrap().item, "Foo");

        let var_defs = op.item.variable_definitions.as_ref().unwrap();
        let (id_name, id_def) = &var_defs.item.items[0];
        assert_eq!(id_name.item, "id");
        assert_eq!(id_def.var_type.item, Type::NonNullNamed("ID"));
        let (_, limit_def) = &var_defs.item.items[1];
        assert_eq!(
            limit_def.default_value.as_ref().unwrap().item,
            InputValue::Int(10),
        );

        let Selection::Field(user) = &op.item.selection_set[0] else {
            panic!("expected a field");
        };
        assert_eq!(user.item.name.item, "user");
        assert_eq!(
            user.item.arguments.as_ref().unwrap().item.get("id").unwrap().item,
            InputValue::variable("id"),
        );
        assert_eq!(
            user.item.directives.as_ref().unwrap()[0].item.name.item,
            "include",
        );

        let Definition::Fragment(frag) = &doc[1] else {
            panic!("expected a fragment");
        };
        assert_eq!(frag.item.name.item, "friends");
        assert_eq!(frag.item.type_condition.item, "User");
    }

    #[test]
    fn reports_syntax_errors() {
        assert!(parse_document("query {").is_err());
    }

    #[test]
    fn bare_selection_set_is_a_query() {
        let doc = parse_document("{ hello }").unwrap();
        let Definition::Operation(op) = &doc[0] else {
            panic!("expected an operation");
        };
        assert_eq!(op.item.operation_type, OperationType::Query);
        assert!(op.item.name.is_none());
    }
}
