use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{
    ast::InputValue,
    executor::{ExecutionParams, Variables, execute_sync},
    translate::parse_document,
};

use super::schema;

fn vars(value: serde_json::Value) -> Variables {
    serde_json::from_value::<Variables>(value).expect("variables deserialize")
}

fn to_json(response: &crate::executor::Response) -> serde_json::Value {
    serde_json::to_value(response).expect("response serializes")
}

#[test]
fn coerced_variables_flow_into_arguments() {
    let schema = schema();
    let doc = parse_document("query ($arg: [String]) { echoList(arg: $arg) }").unwrap();
    let params = ExecutionParams::new(&schema, &doc)
        .variables(vars(json!({"arg": ["one", "two"]})));
    let response = execute_sync(&params).unwrap();

    assert_eq!(
        to_json(&response),
        json!({"data": {"echoList": "[\"one\", \"two\"]"}}),
    );
}

#[test]
fn single_value_coerces_to_one_element_list() {
    let schema = schema();
    let doc = parse_document("query ($arg: [String]) { echoList(arg: $arg) }").unwrap();
    let params =
        ExecutionParams::new(&schema, &doc).variables(vars(json!({"arg": "one"})));
    let response = execute_sync(&params).unwrap();

    assert_eq!(
        to_json(&response),
        json!({"data": {"echoList": "[\"one\"]"}}),
    );
}

#[test]
fn single_literal_coerces_to_one_element_list() {
    let schema = schema();
    let doc = parse_document(r#"{ echoList(arg: "one") }"#).unwrap();
    let response = execute_sync(&ExecutionParams::new(&schema, &doc)).unwrap();

    assert_eq!(
        to_json(&response),
        json!({"data": {"echoList": "[\"one\"]"}}),
    );
}

#[test]
fn input_objects_apply_field_defaults() {
    let schema = schema();
    let doc =
        parse_document("query ($point: PointInput) { echoPoint(point: $point) }").unwrap();
    let params = ExecutionParams::new(&schema, &doc)
        .variables(vars(json!({"point": {"x": 1, "y": 2}})));
    let response = execute_sync(&params).unwrap();

    assert_eq!(
        to_json(&response),
        json!({"data": {"echoPoint": "{x: 1, y: 2, label: \"origin\"}"}}),
    );
}

#[test]
fn argument_defaults_apply_when_variable_is_absent() {
    let schema = schema();
    let doc =
        parse_document("query ($episode: Episode) { echoEpisode(episode: $episode) }").unwrap();
    let response = execute_sync(&ExecutionParams::new(&schema, &doc)).unwrap();

    assert_eq!(to_json(&response), json!({"data": {"echoEpisode": "JEDI"}}));
}

#[test]
fn variable_defaults_apply_when_input_is_absent() {
    let schema = schema();
    let doc = parse_document(
        r#"query ($arg: [String] = ["fallback"]) { echoList(arg: $arg) }"#,
    )
    .unwrap();
    let response = execute_sync(&ExecutionParams::new(&schema, &doc)).unwrap();

    assert_eq!(
        to_json(&response),
        json!({"data": {"echoList": "[\"fallback\"]"}}),
    );
}

#[test]
fn missing_required_variable_fails_before_execution() {
    let schema = schema();
    let doc = parse_document("query ($arg: [String]!) { echoList(arg: $arg) }").unwrap();
    let response = execute_sync(&ExecutionParams::new(&schema, &doc)).unwrap();

    assert_eq!(response.data, None);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        response.errors[0].error().message(),
        "Variable \"$arg\" of required type \"[String]!\" was not provided.",
    );
}

#[test]
fn invalid_variable_values_report_paths() {
    let schema = schema();
    let doc =
        parse_document("query ($point: PointInput) { echoPoint(point: $point) }").unwrap();
    let params = ExecutionParams::new(&schema, &doc)
        .variables(vars(json!({"point": {"x": 1, "y": "nope"}})));
    let response = execute_sync(&params).unwrap();

    assert_eq!(response.data, None);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        response.errors[0].error().message(),
        "Variable \"$point\" got invalid value \"nope\" at \"point.y\"; \
         Int cannot represent non-integer value: \"nope\"",
    );
}

#[test]
fn unknown_input_fields_suggest_alternatives() {
    let schema = schema();
    let doc =
        parse_document("query ($point: PointInput) { echoPoint(point: $point) }").unwrap();
    let params = ExecutionParams::new(&schema, &doc)
        .variables(vars(json!({"point": {"x": 1, "y": 2, "lable": "typo"}})));
    let response = execute_sync(&params).unwrap();

    assert_eq!(response.data, None);
    assert_eq!(response.errors.len(), 1);
    assert!(
        response.errors[0]
            .error()
            .message()
            .ends_with("Did you mean \"label\"?"),
        "unexpected message: {}",
        response.errors[0].error().message(),
    );
}

#[test]
fn null_for_required_variable_fails() {
    let schema = schema();
    let doc = parse_document("query ($arg: [String]!) { echoList(arg: $arg) }").unwrap();
    let params = ExecutionParams::new(&schema, &doc)
        .variables(Variables::from([("arg".into(), InputValue::Null)]));
    let response = execute_sync(&params).unwrap();

    assert_eq!(response.data, None);
    assert_eq!(
        response.errors[0].error().message(),
        "Variable \"$arg\" of non-null type \"[String]!\" must not be null.",
    );
}
