use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{
    GraphQLError,
    executor::{ExecutionParams, execute, execute_sync},
    translate::parse_document,
    value::Value,
};

use super::{InvocationLog, object, schema, test_schema};

fn to_json(response: &crate::executor::Response) -> serde_json::Value {
    serde_json::to_value(response).expect("response serializes")
}

#[test]
fn hello_world() {
    let schema = schema();
    let doc = parse_document("{ hello }").unwrap();
    let response = execute_sync(&ExecutionParams::new(&schema, &doc)).unwrap();

    assert_eq!(to_json(&response), json!({"data": {"hello": "world"}}));
}

#[test]
fn aliases_preserve_response_order() {
    let schema = schema();
    let doc = parse_document("{ a: hello b: hello }").unwrap();
    let response = execute_sync(&ExecutionParams::new(&schema, &doc)).unwrap();

    assert_eq!(response.errors, vec![]);
    let data = response.data.unwrap();
    let keys: Vec<&String> = data
        .as_object_value()
        .unwrap()
        .iter()
        .map(|(k, _)| k)
        .collect();
    assert_eq!(keys, ["a", "b"]);
}

#[test]
fn non_null_field_resolving_to_null_nulls_data() {
    let schema = schema();
    let doc = parse_document("{ x }").unwrap();
    let params = ExecutionParams::new(&schema, &doc).root_value(object(vec![("x", Value::Null)]));
    let response = execute_sync(&params).unwrap();

    assert_eq!(
        to_json(&response),
        json!({
            "data": null,
            "errors": [{
                "message": "Cannot return null for non-nullable field Query.x.",
                "locations": [{"line": 1, "column": 3}],
                "path": ["x"],
            }],
        }),
    );
}

#[test]
fn default_resolver_reads_root_properties() {
    let schema = schema();
    let doc = parse_document("{ x }").unwrap();
    let params =
        ExecutionParams::new(&schema, &doc).root_value(object(vec![("x", Value::from("root x"))]));
    let response = execute_sync(&params).unwrap();

    assert_eq!(to_json(&response), json!({"data": {"x": "root x"}}));
}

#[test]
fn nested_objects_and_lists() {
    let schema = schema();
    let doc = parse_document("{ person { name friends { name } } numbers }").unwrap();
    let response = execute_sync(&ExecutionParams::new(&schema, &doc)).unwrap();

    assert_eq!(
        to_json(&response),
        json!({
            "data": {
                "person": {
                    "name": "Alice",
                    "friends": [{"name": "Bob"}, {"name": "Eve"}],
                },
                "numbers": [1, 2, 3],
            },
        }),
    );
}

#[test]
fn typename_resolves_on_any_composite() {
    let schema = schema();
    let doc = parse_document("{ __typename person { __typename } pet { __typename } }").unwrap();
    let response = execute_sync(&ExecutionParams::new(&schema, &doc)).unwrap();

    assert_eq!(
        to_json(&response),
        json!({
            "data": {
                "__typename": "Query",
                "person": {"__typename": "Person"},
                "pet": {"__typename": "Cat"},
            },
        }),
    );
}

#[test]
fn unknown_fields_are_omitted_from_the_result() {
    let schema = schema();
    let doc = parse_document("{ hello doesNotExist }").unwrap();
    let response = execute_sync(&ExecutionParams::new(&schema, &doc)).unwrap();

    assert_eq!(to_json(&response), json!({"data": {"hello": "world"}}));
}

#[test]
fn abstract_types_resolve_through_is_type_of() {
    let schema = schema();
    let doc = parse_document(
        "{ cat: pet(meows: true) { ... on Cat { meows } } \
           dog: pet(meows: false) { ... on Dog { barks } } }",
    )
    .unwrap();
    let response = execute_sync(&ExecutionParams::new(&schema, &doc)).unwrap();

    assert_eq!(
        to_json(&response),
        json!({
            "data": {
                "cat": {"meows": true},
                "dog": {"barks": true},
            },
        }),
    );
}

#[test]
fn enum_values_serialize_by_name() {
    let schema = schema();
    let doc = parse_document("{ episode }").unwrap();
    let response = execute_sync(&ExecutionParams::new(&schema, &doc)).unwrap();

    assert_eq!(to_json(&response), json!({"data": {"episode": "EMPIRE"}}));
}

#[test]
fn resolver_errors_are_located_and_nullable_fields_nulled() {
    let schema = schema();
    let doc = parse_document("{ hello failing }").unwrap();
    let response = execute_sync(&ExecutionParams::new(&schema, &doc)).unwrap();

    assert_eq!(
        to_json(&response),
        json!({
            "data": {"hello": "world", "failing": null},
            "errors": [{
                "message": "resolver blew up",
                "locations": [{"line": 1, "column": 9}],
                "path": ["failing"],
            }],
        }),
    );
}

#[test]
fn null_propagates_to_nearest_nullable_ancestor() {
    let schema = schema();
    let doc = parse_document("{ hello inner { required } }").unwrap();
    let response = execute_sync(&ExecutionParams::new(&schema, &doc)).unwrap();

    // Exactly one error at the failure site; `inner` absorbs the null.
    assert_eq!(
        to_json(&response),
        json!({
            "data": {"hello": "world", "inner": null},
            "errors": [{
                "message": "Cannot return null for non-nullable field Inner.required.",
                "locations": [{"line": 1, "column": 17}],
                "path": ["inner", "required"],
            }],
        }),
    );
}

#[test]
fn execute_sync_rejects_deferred_resolvers() {
    let schema = schema();
    let doc = parse_document("{ asyncHello }").unwrap();
    let result = execute_sync(&ExecutionParams::new(&schema, &doc));

    assert_eq!(result.unwrap_err(), GraphQLError::NotSynchronous);
}

#[tokio::test]
async fn deferred_resolvers_complete_asynchronously() {
    let schema = schema();
    let doc = parse_document("{ asyncHello hello }").unwrap();
    let response = execute(&ExecutionParams::new(&schema, &doc)).await.unwrap();

    assert_eq!(
        to_json(&response),
        json!({"data": {"asyncHello": "world", "hello": "world"}}),
    );
}

#[tokio::test]
async fn mutations_run_serially() {
    let log = InvocationLog::default();
    let schema = test_schema(log.clone());
    let doc = parse_document("mutation { a b }").unwrap();
    let response = execute(&ExecutionParams::new(&schema, &doc)).await.unwrap();

    assert_eq!(to_json(&response), json!({"data": {"a": "a", "b": "b"}}));
    // `b` must not start until `a`'s future settled, despite `a`
    // sleeping first.
    assert_eq!(*log.lock().unwrap(), ["a", "b"]);
}

#[test]
fn unknown_operation_name_is_a_caller_error() {
    let schema = schema();
    let doc = parse_document("query Foo { hello }").unwrap();
    let result = execute_sync(&ExecutionParams::new(&schema, &doc).operation_name("Bar"));

    assert_eq!(
        result.unwrap_err(),
        GraphQLError::UnknownOperationName("Bar".into()),
    );
}

#[test]
fn anonymous_selection_requires_single_operation() {
    let schema = schema();
    let doc = parse_document("query A { hello } query B { hello }").unwrap();
    let result = execute_sync(&ExecutionParams::new(&schema, &doc));

    let error = result.unwrap_err();
    assert_eq!(error, GraphQLError::MultipleOperationsProvided);
    assert_eq!(
        error.to_string(),
        "Must provide operation name if query contains multiple operations.",
    );
}

#[test]
fn missing_root_type_fails_before_execution() {
    let schema = crate::schema::model::SchemaType::new(
        vec![
            crate::schema::meta::ObjectMeta::new(
                "Query",
                vec![crate::schema::meta::Field::new(
                    "hello",
                    crate::ast::Type::Named(arcstr::literal!("String")),
                )],
            )
            .into_meta(),
        ],
        "Query",
        None,
        None,
    );
    let doc = parse_document("mutation { doIt }").unwrap();
    let response = execute_sync(&ExecutionParams::new(&schema, &doc)).unwrap();

    assert_eq!(
        to_json(&response),
        json!({
            "errors": [{
                "message": "Schema is not configured to execute mutation operation.",
                "locations": [{"line": 1, "column": 1}],
            }],
        }),
    );
}
