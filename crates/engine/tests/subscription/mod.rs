use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use engine::{subscription_fn, GraphqlError, Request, Response, Schema};
use futures::{stream, StreamExt};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::{build, builder};

const SDL: &str = r#"
    type Query {
        noop: Int
    }

    type Subscription {
        counter(from: Int = 0): Int
        ticks: Tick
        endless: Int
        silent: Int
        heartbeat: Int!
    }

    type Tick {
        count: Int!
    }
"#;

/// Flags the event source as released once dropped.
struct ReleaseGuard(Arc<AtomicBool>);

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

fn schema(released: Arc<AtomicBool>) -> Schema {
    build(
        builder(SDL)
            .subscription(
                "Subscription.counter",
                subscription_fn(|ctx| async move {
                    let from = ctx.argument("from").and_then(Value::as_i64).unwrap_or_default();
                    Ok(stream::iter((from..from + 3).map(|count| Ok::<_, GraphqlError>(json!(count)))))
                }),
            )
            .subscription(
                "Subscription.ticks",
                subscription_fn(|_| async {
                    Ok(stream::iter(vec![
                        Ok(json!({ "count": 1 })),
                        Err(GraphqlError::field("connection lost")),
                        Ok(json!({ "count": null })),
                    ]))
                }),
            )
            .subscription(
                "Subscription.heartbeat",
                subscription_fn(|_| async {
                    Ok(stream::iter(vec![Err(GraphqlError::field("heart stopped")), Ok(json!(60))]))
                }),
            )
            .subscription(
                "Subscription.endless",
                subscription_fn(move |_| {
                    let guard = ReleaseGuard(released.clone());
                    async move {
                        Ok(stream::unfold((guard, 0), |(guard, count)| async move {
                            Some((Ok::<_, GraphqlError>(json!(count)), (guard, count + 1)))
                        }))
                    }
                }),
            ),
    )
}

async fn collect(schema: &Schema, request: impl Into<Request>) -> Vec<Value> {
    schema
        .subscribe(request)
        .map(|response: Response| response.to_json())
        .collect()
        .await
}

#[tokio::test]
async fn failing_events_of_non_null_fields_null_the_data() {
    let schema = schema(Arc::default());

    let responses = collect(&schema, "subscription { heartbeat }").await;

    assert_eq!(
        responses,
        vec![
            json!({
                "data": null,
                "errors": [{
                    "message": "heart stopped",
                    "locations": [{ "line": 1, "column": 16 }],
                    "path": ["heartbeat"],
                    "extensions": { "code": "FIELD_ERROR" },
                }],
            }),
            json!({ "data": { "heartbeat": 60 } }),
        ]
    );
}

#[tokio::test]
async fn one_response_per_event() {
    let schema = schema(Arc::default());

    let responses = collect(&schema, "subscription { counter(from: 5) }").await;

    assert_eq!(
        responses,
        vec![
            json!({ "data": { "counter": 5 } }),
            json!({ "data": { "counter": 6 } }),
            json!({ "data": { "counter": 7 } }),
        ]
    );
}

#[tokio::test]
async fn failing_events_do_not_end_the_stream() {
    let schema = schema(Arc::default());

    let responses = collect(&schema, "subscription { ticks { count } }").await;

    insta::assert_json_snapshot!(responses, @r###"
    [
      {
        "data": {
          "ticks": {
            "count": 1
          }
        }
      },
      {
        "data": {
          "ticks": null
        },
        "errors": [
          {
            "message": "connection lost",
            "locations": [
              {
                "line": 1,
                "column": 16
              }
            ],
            "path": [
              "ticks"
            ],
            "extensions": {
              "code": "FIELD_ERROR"
            }
          }
        ]
      },
      {
        "data": {
          "ticks": null
        },
        "errors": [
          {
            "message": "Cannot return null for non-nullable field Tick.count.",
            "locations": [
              {
                "line": 1,
                "column": 24
              }
            ],
            "path": [
              "ticks",
              "count"
            ],
            "extensions": {
              "code": "FIELD_ERROR"
            }
          }
        ]
      }
    ]
    "###);
}

#[tokio::test]
async fn dropping_the_stream_releases_the_source() {
    let released = Arc::new(AtomicBool::new(false));
    let schema = schema(released.clone());

    let responses = schema
        .subscribe("subscription { endless }")
        .take(2)
        .map(|response| response.data)
        .collect::<Vec<_>>()
        .await;

    assert_eq!(responses, vec![json!({ "endless": 0 }), json!({ "endless": 1 })]);
    assert!(released.load(Ordering::SeqCst));
}

#[tokio::test]
async fn fields_without_event_source() {
    let schema = schema(Arc::default());

    let responses = collect(&schema, "subscription { silent }").await;

    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["data"], Value::Null);
    assert_eq!(
        responses[0]["errors"][0]["message"],
        r#"Subscription field "Subscription.silent" has no event source."#
    );
}

#[tokio::test]
async fn request_errors_produce_a_single_response() {
    let schema = schema(Arc::default());

    let responses = collect(&schema, "subscription { counter unknown }").await;

    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["data"], Value::Null);
    assert_eq!(responses[0]["errors"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn queries_are_executed_once() {
    let schema = schema(Arc::default());

    let responses = collect(&schema, Request::new("{ noop }").root_value(json!({ "noop": 42 }))).await;

    assert_eq!(responses, vec![json!({ "data": { "noop": 42 } })]);
}

#[tokio::test]
async fn subscriptions_are_refused_by_execute() {
    let schema = schema(Arc::default());

    let response = schema.execute("subscription { counter }").await;

    assert_eq!(response.data, Value::Null);
    assert_eq!(
        response.errors[0].message,
        "Subscription operations must be run through a subscription stream."
    );
}
