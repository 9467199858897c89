use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{
    executor::{ExecutionParams, Variables, execute_sync},
    translate::parse_document,
};

use super::schema;

fn run(query: &str) -> serde_json::Value {
    let schema = schema();
    let doc = parse_document(query).unwrap();
    let response = execute_sync(&ExecutionParams::new(&schema, &doc)).unwrap();
    serde_json::to_value(&response).expect("response serializes")
}

#[test]
fn skip_false_includes_field() {
    assert_eq!(
        run("{ hello @skip(if: false) }"),
        json!({"data": {"hello": "world"}}),
    );
}

#[test]
fn skip_true_omits_field() {
    assert_eq!(run("{ hello @skip(if: true) }"), json!({"data": {}}));
}

#[test]
fn include_true_includes_field() {
    assert_eq!(
        run("{ hello @include(if: true) }"),
        json!({"data": {"hello": "world"}}),
    );
}

#[test]
fn include_false_omits_field() {
    assert_eq!(run("{ hello @include(if: false) }"), json!({"data": {}}));
}

#[test]
fn skip_wins_over_include() {
    assert_eq!(
        run("{ hello @skip(if: true) @include(if: true) }"),
        json!({"data": {}}),
    );
}

#[test]
fn skip_false_and_include_true_includes() {
    assert_eq!(
        run("{ hello @skip(if: false) @include(if: true) }"),
        json!({"data": {"hello": "world"}}),
    );
}

#[test]
fn directives_apply_to_fragment_spreads() {
    assert_eq!(
        run("{ ...helloFields @skip(if: true) } fragment helloFields on Query { hello }"),
        json!({"data": {}}),
    );
}

#[test]
fn directives_apply_to_inline_fragments() {
    assert_eq!(
        run("{ ... on Query @include(if: false) { hello } }"),
        json!({"data": {}}),
    );
}

#[test]
fn skip_condition_reads_variables() {
    let schema = schema();
    let doc = parse_document("query ($skip: Boolean!) { hello @skip(if: $skip) }").unwrap();
    let variables: Variables =
        serde_json::from_value(json!({"skip": true})).expect("variables deserialize");
    let response =
        execute_sync(&ExecutionParams::new(&schema, &doc).variables(variables)).unwrap();

    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({"data": {}}),
    );
}
