//! End-to-end tests for the execution engine.

mod directives;
mod executor;
mod subscriptions;
mod variables;

use std::sync::{Arc, Mutex};

use arcstr::ArcStr;

use crate::{
    ast::{InputValue, Type},
    executor::ResolvedValue,
    schema::{
        meta::{
            Argument, EnumMeta, EnumValue, Field, InputObjectMeta, InterfaceMeta, ObjectMeta,
            UnionMeta,
        },
        model::SchemaType,
    },
    value::{Object, Value},
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

fn object(fields: Vec<(&str, Value)>) -> Value {
    Value::Object(fields.into_iter().collect::<Object>())
}

/// The mutation resolvers append their field name here so tests can
/// observe invocation order.
type InvocationLog = Arc<Mutex<Vec<&'static str>>>;

fn test_schema(log: InvocationLog) -> SchemaType {
    let log_a = log.clone();
    let log_b = log;

    let types = vec![
        InterfaceMeta::new("Named", vec![Field::new("name", named("String"))]).into_meta(),
        ObjectMeta::new(
            "Person",
            vec![
                Field::new("name", named("String")),
                Field::new("friends", list_of(named("Person"))),
            ],
        )
        .interfaces(&["Named"])
        .into_meta(),
        ObjectMeta::new("Cat", vec![Field::new("meows", named("Boolean"))])
            .is_type_of(|v| {
                v.as_object_value()
                    .is_some_and(|o| o.contains_field("meows"))
            })
            .into_meta(),
        ObjectMeta::new("Dog", vec![Field::new("barks", named("Boolean"))])
            .is_type_of(|v| {
                v.as_object_value()
                    .is_some_and(|o| o.contains_field("barks"))
            })
            .into_meta(),
        UnionMeta::new("CatOrDog", &["Cat", "Dog"]).into_meta(),
        EnumMeta::new(
            "Episode",
            vec![
                EnumValue::new("NEWHOPE"),
                EnumValue::new("EMPIRE"),
                EnumValue::new("JEDI"),
            ],
        )
        .into_meta(),
        InputObjectMeta::new(
            "PointInput",
            vec![
                Argument::new("x", non_null("Int")),
                Argument::new("y", non_null("Int")),
                Argument::new("label", named("String"))
                    .default_value(InputValue::String("origin".into())),
            ],
        )
        .into_meta(),
        ObjectMeta::new(
            "Inner",
            vec![Field::new("required", non_null("String"))],
        )
        .into_meta(),
        ObjectMeta::new(
            "Query",
            vec![
                Field::new("hello", named("String"))
                    .resolver(|_| Ok(ResolvedValue::ready("world"))),
                Field::new("asyncHello", named("String")).resolver(|_| {
                    Ok(ResolvedValue::deferred(async {
                        Ok(Value::from("world"))
                    }))
                }),
                Field::new("x", non_null("String")),
                Field::new("person", named("Person")).resolver(|_| {
                    Ok(ResolvedValue::ready(object(vec![
                        ("name", Value::from("Alice")),
                        (
                            "friends",
                            Value::List(vec![
                                object(vec![("name", Value::from("Bob"))]),
                                object(vec![("name", Value::from("Eve"))]),
                            ]),
                        ),
                    ])))
                }),
                Field::new("numbers", list_of(non_null("Int")))
                    .resolver(|_| {
                        Ok(ResolvedValue::ready(Value::List(vec![
                            Value::Int(1),
                            Value::Int(2),
                            Value::Int(3),
                        ])))
                    }),
                Field::new("asyncNumbers", list_of(named("Int"))).resolver(|_| {
                    Ok(ResolvedValue::ready(Value::List(vec![
                        Value::Int(4),
                        Value::Int(5),
                    ])))
                }),
                Field::new("pet", named("CatOrDog")).resolver(|ctx| {
                    let meows = ctx
                        .args
                        .get("meows")
                        .and_then(InputValue::as_boolean_value)
                        .unwrap_or(true);
                    Ok(ResolvedValue::ready(if meows {
                        object(vec![("meows", Value::Boolean(true))])
                    } else {
                        object(vec![("barks", Value::Boolean(true))])
                    }))
                })
                .argument(Argument::new("meows", named("Boolean"))),
                Field::new("episode", named("Episode"))
                    .resolver(|_| Ok(ResolvedValue::ready("EMPIRE"))),
                Field::new("failing", named("String"))
                    .resolver(|_| Err("resolver blew up".into())),
                Field::new("failingRequired", non_null("String"))
                    .resolver(|_| Err("required resolver blew up".into())),
                Field::new("inner", named("Inner")).resolver(|_| {
                    Ok(ResolvedValue::ready(object(vec![(
                        "required",
                        Value::Null,
                    )])))
                }),
                Field::new("echoList", named("String"))
                    .argument(Argument::new("arg", list_of(named("String"))))
                    .resolver(|ctx| {
                        let arg = ctx.args.get("arg").map(ToString::to_string);
                        Ok(ResolvedValue::ready(Value::from(
                            arg.unwrap_or_else(|| "absent".into()),
                        )))
                    }),
                Field::new("echoPoint", named("String"))
                    .argument(Argument::new("point", named("PointInput")))
                    .resolver(|ctx| {
                        let point = ctx.args.get("point").map(ToString::to_string);
                        Ok(ResolvedValue::ready(Value::from(
                            point.unwrap_or_else(|| "absent".into()),
                        )))
                    }),
                Field::new("echoEpisode", named("String"))
                    .argument(
                        Argument::new("episode", named("Episode"))
                            .default_value(InputValue::enum_value("JEDI")),
                    )
                    .resolver(|ctx| {
                        let episode = ctx.args.get("episode").map(ToString::to_string);
                        Ok(ResolvedValue::ready(Value::from(
                            episode.unwrap_or_else(|| "absent".into()),
                        )))
                    }),
            ],
        )
        .into_meta(),
        ObjectMeta::new(
            "Mutation",
            vec![
                Field::new("a", named("String")).resolver(move |_| {
                    let log = log_a.clone();
                    Ok(ResolvedValue::deferred(async move {
                        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                        log.lock().unwrap().push("a");
                        Ok(Value::from("a"))
                    }))
                }),
                Field::new("b", named("String")).resolver(move |_| {
                    log_b.lock().unwrap().push("b");
                    Ok(ResolvedValue::ready("b"))
                }),
            ],
        )
        .into_meta(),
        ObjectMeta::new(
            "Subscription",
            vec![Field::new("count", named("Int")).resolver(default_count_resolver)],
        )
        .into_meta(),
    ];

    SchemaType::new(types, "Query", Some("Mutation"), Some("Subscription"))
}

fn default_count_resolver<'a>(
    ctx: crate::executor::ResolverContext<'a>,
) -> crate::executor::FieldResult<ResolvedValue<'a>> {
    // Each subscription payload arrives as the root value.
    let value = ctx
        .source
        .as_object_value()
        .and_then(|o| o.get_field_value("count"))
        .cloned()
        .unwrap_or_else(|| (*ctx.source).clone());
    Ok(ResolvedValue::Ready(value))
}

fn schema() -> SchemaType {
    test_schema(InvocationLog::default())
}
