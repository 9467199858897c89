//! The fixture schema and assertion helpers shared by the rule tests.
//!
//! Test documents are leaked into `'static` so the borrow lifetimes of
//! schema, document, and context line up without ceremony; the harness
//! only ever runs under `cargo test`.

use std::sync::LazyLock;

use arcstr::ArcStr;

use crate::{
    ast::{Document, InputValue, OwnedDocument, Type},
    schema::{
        meta::{
            Argument, EnumMeta, EnumValue, Field, InputObjectMeta, InterfaceMeta, MetaType,
            ObjectMeta, UnionMeta,
        },
        model::SchemaType,
    },
    translate::parse_document,
    validation::{MultiVisitorNil, ValidatorContext, Visitor, visit},
};

fn named(name: &str) -> Type<ArcStr> {
    Type::Named(ArcStr::from(name))
}

fn non_null(name: &str) -> Type<ArcStr> {
    Type::NonNullNamed(ArcStr::from(name))
}

fn list_of(inner: Type<ArcStr>) -> Type<ArcStr> {
    Type::List(Box::new(inner))
}

fn name_field() -> Field {
    Field::new("name", named("String")).argument(Argument::new("surname", named("Boolean")))
}

fn build_test_schema() -> SchemaType {
    let types = vec![
        InterfaceMeta::new("Being", vec![name_field()]).into_meta(),
        InterfaceMeta::new("Pet", vec![name_field()]).into_meta(),
        InterfaceMeta::new("Canine", vec![name_field()]).into_meta(),
        InterfaceMeta::new("Intelligent", vec![Field::new("iq", named("Int"))]).into_meta(),
        EnumMeta::new(
            "DogCommand",
            vec![
                EnumValue::new("SIT"),
                EnumValue::new("HEEL"),
                EnumValue::new("DOWN"),
            ],
        )
        .into_meta(),
        EnumMeta::new(
            "FurColor",
            vec![
                EnumValue::new("BROWN"),
                EnumValue::new("BLACK"),
                EnumValue::new("TAN"),
                EnumValue::new("SPOTTED"),
            ],
        )
        .into_meta(),
        ObjectMeta::new(
            "Dog",
            vec![
                name_field(),
                Field::new("nickname", named("String")),
                Field::new("barkVolume", named("Int")),
                Field::new("barks", named("Boolean")),
                Field::new("doesKnowCommand", named("Boolean"))
                    .argument(Argument::new("dogCommand", named("DogCommand"))),
                Field::new("isHousetrained", named("Boolean")).argument(
                    Argument::new("atOtherHomes", named("Boolean"))
                        .default_value(InputValue::Boolean(true)),
                ),
                Field::new("isAtLocation", named("Boolean"))
                    .argument(Argument::new("x", named("Int")))
                    .argument(Argument::new("y", named("Int"))),
            ],
        )
        .interfaces(&["Being", "Pet", "Canine"])
        .into_meta(),
        ObjectMeta::new(
            "Cat",
            vec![
                name_field(),
                Field::new("nickname", named("String")),
                Field::new("meows", named("Boolean")),
                Field::new("meowVolume", named("Int")),
                Field::new("furColor", named("FurColor")),
            ],
        )
        .interfaces(&["Being", "Pet"])
        .into_meta(),
        UnionMeta::new("CatOrDog", &["Cat", "Dog"]).into_meta(),
        ObjectMeta::new(
            "Human",
            vec![
                name_field(),
                Field::new("pets", list_of(named("Pet"))),
                Field::new("relatives", list_of(named("Human"))),
                Field::new("iq", named("Int")),
            ],
        )
        .interfaces(&["Being", "Intelligent"])
        .into_meta(),
        ObjectMeta::new(
            "Alien",
            vec![
                name_field(),
                Field::new("iq", named("Int")),
                Field::new("numEyes", named("Int")),
            ],
        )
        .interfaces(&["Being", "Intelligent"])
        .into_meta(),
        UnionMeta::new("DogOrHuman", &["Dog", "Human"]).into_meta(),
        UnionMeta::new("HumanOrAlien", &["Human", "Alien"]).into_meta(),
        InputObjectMeta::new(
            "ComplexInput",
            vec![
                Argument::new("requiredField", non_null("Boolean")),
                Argument::new("intField", named("Int")),
                Argument::new("stringField", named("String")),
                Argument::new("booleanField", named("Boolean")),
                Argument::new("stringListField", list_of(named("String"))),
            ],
        )
        .into_meta(),
        ObjectMeta::new(
            "ComplicatedArgs",
            vec![
                Field::new("intArgField", named("String"))
                    .argument(Argument::new("intArg", named("Int"))),
                Field::new("nonNullIntArgField", named("String"))
                    .argument(Argument::new("nonNullIntArg", non_null("Int"))),
                Field::new("nonNullBooleanArgField", named("String"))
                    .argument(Argument::new("nonNullBooleanArg", non_null("Boolean"))),
                Field::new("stringArgField", named("String"))
                    .argument(Argument::new("stringArg", named("String"))),
                Field::new("booleanArgField", named("String"))
                    .argument(Argument::new("booleanArg", named("Boolean"))),
                Field::new("enumArgField", named("String"))
                    .argument(Argument::new("enumArg", named("FurColor"))),
                Field::new("floatArgField", named("String"))
                    .argument(Argument::new("floatArg", named("Float"))),
                Field::new("idArgField", named("String"))
                    .argument(Argument::new("idArg", named("ID"))),
                Field::new("stringListArgField", named("String"))
                    .argument(Argument::new("stringListArg", list_of(named("String")))),
                Field::new("complexArgField", named("String"))
                    .argument(Argument::new("complexArg", named("ComplexInput"))),
                Field::new("multipleReqs", named("String"))
                    .argument(Argument::new("req1", non_null("Int")))
                    .argument(Argument::new("req2", non_null("Int"))),
                Field::new("multipleOpts", named("String"))
                    .argument(Argument::new("opt1", named("Int")).default_value(InputValue::Int(0)))
                    .argument(Argument::new("opt2", named("Int")).default_value(InputValue::Int(0))),
            ],
        )
        .into_meta(),
        ObjectMeta::new(
            "QueryRoot",
            vec![
                Field::new("human", named("Human")).argument(Argument::new("id", named("ID"))),
                Field::new("alien", named("Alien")),
                Field::new("dog", named("Dog")),
                Field::new("cat", named("Cat")),
                Field::new("pet", named("Pet")),
                Field::new("being", named("Being")),
                Field::new("intelligent", named("Intelligent")),
                Field::new("catOrDog", named("CatOrDog")),
                Field::new("dogOrHuman", named("DogOrHuman")),
                Field::new("humanOrAlien", named("HumanOrAlien")),
                Field::new("complicatedArgs", named("ComplicatedArgs")),
            ],
        )
        .into_meta(),
        ObjectMeta::new(
            "MutationRoot",
            vec![
                Field::new("testInput", named("String")),
            ],
        )
        .into_meta(),
        ObjectMeta::new(
            "SubscriptionRoot",
            vec![
                Field::new("importantEmails", list_of(named("String"))),
                Field::new("notImportantEmails", list_of(named("String"))),
            ],
        )
        .into_meta(),
    ];

    SchemaType::new(
        types,
        "QueryRoot",
        Some("MutationRoot"),
        Some("SubscriptionRoot"),
    )
}

pub(crate) fn test_schema() -> &'static SchemaType {
    static SCHEMA: LazyLock<SchemaType> = LazyLock::new(build_test_schema);
    &SCHEMA
}

fn leak_document(doc: OwnedDocument<'static>) -> &'static Document<'static> {
    Box::leak(doc.into_boxed_slice())
}

fn parse_test_document(q: &'static str) -> &'static Document<'static> {
    leak_document(parse_document(q).expect("failed to parse test document"))
}

fn run_rule<V, F>(factory: F, document: &'static Document<'static>) -> Vec<String>
where
    V: Visitor<'static> + 'static,
    F: Fn() -> V,
{
    let mut ctx = ValidatorContext::new(test_schema(), document);
    let mut visitor = MultiVisitorNil.with(factory());
    visit(&mut visitor, &mut ctx, document);
    ctx.into_errors()
        .into_iter()
        .map(|e| e.message().to_owned())
        .collect()
}

pub(crate) fn expect_passes_rule<V, F>(factory: F, q: &'static str)
where
    V: Visitor<'static> + 'static,
    F: Fn() -> V,
{
    let errors = run_rule(factory, parse_test_document(q));
    assert!(
        errors.is_empty(),
        "expected no validation errors, but got:\n{errors:#?}\nfor query:\n{q}",
    );
}

pub(crate) fn expect_fails_rule<V, F, M>(factory: F, q: &'static str, expected: &[M])
where
    V: Visitor<'static> + 'static,
    F: Fn() -> V,
    M: AsRef<str>,
{
    let errors = run_rule(factory, parse_test_document(q));
    assert_messages(&errors, expected, q);
}

pub(crate) fn expect_fails_rule_on<V, F, M>(factory: F, doc: OwnedDocument<'static>, expected: &[M])
where
    V: Visitor<'static> + 'static,
    F: Fn() -> V,
    M: AsRef<str>,
{
    let errors = run_rule(factory, leak_document(doc));
    assert_messages(&errors, expected, "<programmatic document>");
}

pub(crate) fn expect_passes_fn(
    f: fn(&mut ValidatorContext<'static>, &'static Document<'static>),
    q: &'static str,
) {
    let document = parse_test_document(q);
    let mut ctx = ValidatorContext::new(test_schema(), document);
    f(&mut ctx, document);
    let errors = ctx.into_errors();
    assert!(
        errors.is_empty(),
        "expected no validation errors, but got:\n{errors:#?}\nfor query:\n{q}",
    );
}

pub(crate) fn expect_fails_fn<M: AsRef<str>>(
    f: fn(&mut ValidatorContext<'static>, &'static Document<'static>),
    q: &'static str,
    expected: &[M],
) {
    let document = parse_test_document(q);
    let mut ctx = ValidatorContext::new(test_schema(), document);
    f(&mut ctx, document);
    let errors: Vec<String> = ctx
        .into_errors()
        .into_iter()
        .map(|e| e.message().to_owned())
        .collect();
    assert_messages(&errors, expected, q);
}

fn assert_messages<M: AsRef<str>>(actual: &[String], expected: &[M], q: &str) {
    let mut actual: Vec<&str> = actual.iter().map(String::as_str).collect();
    let mut expected: Vec<&str> = expected.iter().map(AsRef::as_ref).collect();
    actual.sort_unstable();
    expected.sort_unstable();
    assert!(
        !expected.is_empty(),
        "expect_fails called with no expected errors",
    );
    assert_eq!(
        actual, expected,
        "validation errors did not match for query:\n{q}",
    );
}
