use std::{
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    task::{Context, Poll},
};

use futures::{Stream, StreamExt as _, stream};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{
    GraphQLError,
    executor::{
        ExecutionParams, FieldResult, ResolvedValue, SubscriptionResult, subscribe,
    },
    schema::{
        meta::{Field, ObjectMeta},
        model::SchemaType,
    },
    translate::parse_document,
    value::Value,
};

use super::named;

/// A source stream that counts how many times it has been dropped, so
/// tests can assert the abrupt-close law: exactly once, no matter how
/// far the consumer got.
struct CountedSource {
    inner: stream::Iter<std::vec::IntoIter<FieldResult<Value>>>,
    drops: Arc<AtomicUsize>,
}

impl Stream for CountedSource {
    type Item = FieldResult<Value>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

impl Drop for CountedSource {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

fn subscription_schema(drops: Arc<AtomicUsize>, items: Vec<FieldResult<Value>>) -> SchemaType {
    let types = vec![
        ObjectMeta::new(
            "Query",
            vec![Field::new("hello", named("String"))
                .resolver(|_| Ok(ResolvedValue::ready("world")))],
        )
        .into_meta(),
        ObjectMeta::new(
            "Subscription",
            vec![
                Field::new("count", named("Int"))
                    .resolver(|ctx| {
                        Ok(ResolvedValue::Ready((*ctx.source).clone()))
                    })
                    .subscriber(move |_| {
                        Ok(Box::pin(CountedSource {
                            inner: stream::iter(items.clone()),
                            drops: drops.clone(),
                        }))
                    }),
            ],
        )
        .into_meta(),
    ];

    SchemaType::new(types, "Query", None, Some("Subscription"))
}

fn count_payloads(values: &[i32]) -> Vec<FieldResult<Value>> {
    values.iter().map(|i| Ok(Value::Int(*i))).collect()
}

#[tokio::test]
async fn maps_source_payloads_in_order() {
    let drops = Arc::new(AtomicUsize::new(0));
    let schema = subscription_schema(drops.clone(), count_payloads(&[1, 2, 3]));
    let doc = parse_document("subscription { count }").unwrap();
    let params = ExecutionParams::new(&schema, &doc);

    let SubscriptionResult::Stream(mut responses) = subscribe(&params).unwrap() else {
        panic!("expected a stream");
    };

    for expected in [1, 2, 3] {
        let response = responses.next().await.expect("stream has a payload");
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"data": {"count": expected}}),
        );
    }
    assert!(responses.next().await.is_none());

    drop(responses);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn dropping_the_consumer_closes_the_source_exactly_once() {
    let drops = Arc::new(AtomicUsize::new(0));
    let schema = subscription_schema(drops.clone(), count_payloads(&[1, 2, 3]));
    let doc = parse_document("subscription { count }").unwrap();
    let params = ExecutionParams::new(&schema, &doc);

    let SubscriptionResult::Stream(mut responses) = subscribe(&params).unwrap() else {
        panic!("expected a stream");
    };

    let first = responses.next().await.expect("stream has a payload");
    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        json!({"data": {"count": 1}}),
    );
    assert_eq!(drops.load(Ordering::SeqCst), 0);

    drop(responses);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn source_errors_become_error_responses() {
    let drops = Arc::new(AtomicUsize::new(0));
    let schema = subscription_schema(
        drops.clone(),
        vec![Ok(Value::Int(1)), Err("source failed".into())],
    );
    let doc = parse_document("subscription { count }").unwrap();
    let params = ExecutionParams::new(&schema, &doc);

    let SubscriptionResult::Stream(mut responses) = subscribe(&params).unwrap() else {
        panic!("expected a stream");
    };

    let first = responses.next().await.unwrap();
    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        json!({"data": {"count": 1}}),
    );

    let second = responses.next().await.unwrap();
    assert_eq!(second.data, None);
    assert_eq!(second.errors.len(), 1);
    assert_eq!(second.errors[0].error().message(), "source failed");
}

#[tokio::test]
async fn rejects_non_subscription_operations() {
    let drops = Arc::new(AtomicUsize::new(0));
    let schema = subscription_schema(drops, count_payloads(&[1]));
    let doc = parse_document("{ hello }").unwrap();
    let params = ExecutionParams::new(&schema, &doc);

    match subscribe(&params) {
        Err(GraphQLError::NotSubscription(..)) => {}
        _ => panic!("expected a NotSubscription error"),
    }
}

#[tokio::test]
async fn missing_subscriber_is_a_pre_execution_failure() {
    let schema = super::schema();
    let doc = parse_document("subscription { count }").unwrap();
    let params = ExecutionParams::new(&schema, &doc);

    let SubscriptionResult::Failed(response) = subscribe(&params).unwrap() else {
        panic!("expected a pre-execution failure");
    };
    assert_eq!(response.data, None);
    assert_eq!(
        response.errors[0].error().message(),
        "Subscription field \"count\" does not define a subscriber.",
    );
}
