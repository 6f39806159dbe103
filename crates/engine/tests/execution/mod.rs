//! Field execution, null propagation and list completion.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use engine::{resolver_fn, GraphqlError, Request, Settings};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::{build, builder};

const CHAIN_SDL: &str = r#"
    type Query {
        a: A!
        broken: String!
        optional: String
    }

    type A {
        b: B
    }

    type B {
        c: String!
        d: Int
    }
"#;

fn chain_root() -> Value {
    json!({ "a": { "b": { "c": null, "d": 1 } } })
}

#[tokio::test]
async fn null_bubbles_to_the_closest_nullable_ancestor() {
    let schema = build(builder(CHAIN_SDL));

    let response = schema
        .execute(Request::new("{ a { b { c d } } }").root_value(chain_root()))
        .await;

    insta::assert_json_snapshot!(response.to_json(), @r###"
    {
      "data": {
        "a": {
          "b": null
        }
      },
      "errors": [
        {
          "message": "Cannot return null for non-nullable field B.c.",
          "locations": [
            {
              "line": 1,
              "column": 11
            }
          ],
          "path": [
            "a",
            "b",
            "c"
          ],
          "extensions": {
            "code": "FIELD_ERROR"
          }
        }
      ]
    }
    "###);
}

#[tokio::test]
async fn failing_non_null_root_field_nulls_the_data() {
    let schema = build(
        builder(CHAIN_SDL).resolver(
            "Query.broken",
            resolver_fn(|_| async { Err(GraphqlError::field("boom")) }),
        ),
    );

    let response = schema
        .execute(Request::new("{ optional broken }").root_value(json!({ "optional": "here" })))
        .await;

    insta::assert_json_snapshot!(response.to_json(), @r###"
    {
      "data": null,
      "errors": [
        {
          "message": "boom",
          "locations": [
            {
              "line": 1,
              "column": 12
            }
          ],
          "path": [
            "broken"
          ],
          "extensions": {
            "code": "FIELD_ERROR"
          }
        }
      ]
    }
    "###);
}

#[tokio::test]
async fn resolver_errors_do_not_abort_siblings() {
    let schema = build(
        builder(CHAIN_SDL)
            .resolver(
                "Query.optional",
                resolver_fn(|_| async { Err(GraphqlError::field("unavailable")) }),
            )
            .resolver("Query.broken", resolver_fn(|_| async { Ok(json!("fine")) })),
    );

    let response = schema.execute("{ optional broken }").await;

    assert_eq!(response.data, json!({ "optional": null, "broken": "fine" }));
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].message, "unavailable");
}

const PETS_SDL: &str = r#"
    type Query {
        pets: [Pet!]!
        search: [SearchResult]
    }

    interface Pet {
        name: String!
    }

    type Dog implements Pet {
        name: String!
        barks: Boolean
    }

    type Cat implements Pet {
        name: String!
        meows: Boolean
    }

    type Human {
        name: String!
    }

    union SearchResult = Dog | Human
"#;

#[tokio::test]
async fn abstract_types_resolve_through_typename() {
    let schema = build(builder(PETS_SDL).resolver(
        "Query.pets",
        resolver_fn(|_| async {
            Ok(json!([
                { "__typename": "Dog", "name": "Rex", "barks": true },
                { "__typename": "Cat", "name": "Tom", "meows": false },
            ]))
        }),
    ));

    let response = schema
        .execute("{ pets { __typename name ... on Dog { barks } ... on Cat { meows } } }")
        .await;

    insta::assert_json_snapshot!(response.to_json(), @r###"
    {
      "data": {
        "pets": [
          {
            "__typename": "Dog",
            "name": "Rex",
            "barks": true
          },
          {
            "__typename": "Cat",
            "name": "Tom",
            "meows": false
          }
        ]
      }
    }
    "###);
}

#[tokio::test]
async fn registered_type_resolvers_replace_the_discriminator() {
    let schema = build(
        builder(PETS_SDL)
            .resolver(
                "Query.search",
                resolver_fn(|_| async { Ok(json!([{ "name": "Rex", "barks": true }, { "name": "Ann" }])) }),
            )
            .type_resolver("SearchResult", |value: &Value, _: &engine::TypeResolverContext<'_>| {
                Some(if value.get("barks").is_some() { "Dog" } else { "Human" }.to_string())
            }),
    );

    let response = schema.execute("{ search { __typename ... on Dog { name } } }").await;

    assert!(response.is_ok(), "{:?}", response.errors);
    assert_eq!(
        response.data,
        json!({ "search": [{ "__typename": "Dog", "name": "Rex" }, { "__typename": "Human" }] })
    );
}

#[tokio::test]
async fn impossible_runtime_types_are_field_errors() {
    let schema = build(builder(PETS_SDL).resolver(
        "Query.search",
        resolver_fn(|_| async { Ok(json!([{ "__typename": "Cat", "name": "Tom" }])) }),
    ));

    let response = schema.execute("{ search { __typename } }").await;

    assert_eq!(response.data, json!({ "search": [null] }));
    assert_eq!(
        response.errors[0].message,
        r#"Runtime Object type "Cat" is not a possible type for "SearchResult"."#
    );
    assert_eq!(response.errors[0].path.as_ref().map(ToString::to_string).as_deref(), Some("search[0]"));
}

#[tokio::test]
async fn non_list_values_for_list_fields() {
    let schema = build(builder(PETS_SDL).resolver(
        "Query.search",
        resolver_fn(|_| async { Ok(json!({ "__typename": "Human", "name": "Ann" })) }),
    ));

    let response = schema.execute("{ search { __typename } }").await;

    assert_eq!(response.data, json!({ "search": null }));
    assert_eq!(
        response.errors[0].message,
        r#"Expected Iterable, but did not find one for field "Query.search"."#
    );
}

#[tokio::test]
async fn mutations_run_their_root_fields_in_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sdl = r#"
        type Query { noop: Int }
        type Mutation {
            slow: Int
            fast: Int
        }
    "#;

    let slow_log = log.clone();
    let fast_log = log.clone();
    let schema = build(
        builder(sdl)
            .resolver(
                "Mutation.slow",
                resolver_fn(move |_| {
                    let log = slow_log.clone();
                    async move {
                        tokio::time::sleep(Duration::from_millis(30)).await;
                        log.lock().unwrap().push("slow");
                        Ok(json!(1))
                    }
                }),
            )
            .resolver(
                "Mutation.fast",
                resolver_fn(move |_| {
                    let log = fast_log.clone();
                    async move {
                        log.lock().unwrap().push("fast");
                        Ok(json!(2))
                    }
                }),
            ),
    );

    let response = schema.execute("mutation { slow fast }").await;

    assert_eq!(response.data, json!({ "slow": 1, "fast": 2 }));
    assert_eq!(*log.lock().unwrap(), vec!["slow", "fast"]);
}

const ITEMS_SDL: &str = r#"
    type Query {
        items: [Item!]!
    }

    type Item {
        id: Int!
        value: Int!
    }
"#;

/// Items complete after a delay decreasing with their position.
fn items_schema(concurrent: bool, completions: Arc<Mutex<Vec<u64>>>) -> engine::Schema {
    let settings = Settings {
        concurrent_list_items: concurrent,
        ..Settings::default()
    };

    build(
        builder(ITEMS_SDL)
            .settings(settings)
            .resolver(
                "Query.items",
                resolver_fn(|_| async { Ok(json!([{ "id": 0 }, { "id": 1 }, { "id": 2 }])) }),
            )
            .resolver(
                "Item.value",
                resolver_fn(move |ctx| {
                    let completions = completions.clone();
                    async move {
                        let id = ctx.parent["id"].as_u64().unwrap_or_default();
                        tokio::time::sleep(Duration::from_millis(10 * (3 - id))).await;
                        completions.lock().unwrap().push(id);
                        Ok(json!(id * 10))
                    }
                }),
            ),
    )
}

#[tokio::test]
async fn sequential_lists_complete_in_input_order() {
    let completions = Arc::new(Mutex::new(Vec::new()));
    let schema = items_schema(false, completions.clone());

    let response = schema.execute("{ items { id value } }").await;

    assert_eq!(*completions.lock().unwrap(), vec![0, 1, 2]);
    assert_eq!(
        response.data,
        json!({ "items": [{ "id": 0, "value": 0 }, { "id": 1, "value": 10 }, { "id": 2, "value": 20 }] })
    );
}

#[tokio::test]
async fn concurrent_lists_keep_input_order_in_the_response() {
    let completions = Arc::new(Mutex::new(Vec::new()));
    let schema = items_schema(true, completions.clone());

    let response = schema.execute("{ items { id value } }").await;

    assert_eq!(*completions.lock().unwrap(), vec![2, 1, 0]);
    assert_eq!(
        response.data,
        json!({ "items": [{ "id": 0, "value": 0 }, { "id": 1, "value": 10 }, { "id": 2, "value": 20 }] })
    );
}

#[tokio::test]
async fn per_field_list_concurrency_overrides_the_settings() {
    let completions = Arc::new(Mutex::new(Vec::new()));
    let settings = Settings {
        concurrent_list_items: true,
        ..Settings::default()
    };
    let recorded = completions.clone();
    let schema = build(
        builder(ITEMS_SDL)
            .settings(settings)
            .list_concurrency("Query.items", false)
            .resolver(
                "Query.items",
                resolver_fn(|_| async { Ok(json!([{ "id": 0 }, { "id": 1 }])) }),
            )
            .resolver(
                "Item.value",
                resolver_fn(move |ctx| {
                    let completions = recorded.clone();
                    async move {
                        let id = ctx.parent["id"].as_u64().unwrap_or_default();
                        tokio::time::sleep(Duration::from_millis(10 * (2 - id))).await;
                        completions.lock().unwrap().push(id);
                        Ok(json!(id))
                    }
                }),
            ),
    );

    let response = schema.execute("{ items { value } }").await;

    assert!(response.is_ok());
    assert_eq!(*completions.lock().unwrap(), vec![0, 1]);
}

#[tokio::test]
async fn request_data_reaches_resolvers() {
    struct Viewer(&'static str);

    let schema = build(builder("type Query { me: String }").resolver(
        "Query.me",
        resolver_fn(|ctx| async move { Ok(json!(ctx.data::<Viewer>().map(|viewer| viewer.0))) }),
    ));

    let response = schema.execute(Request::new("{ me }").data(Viewer("ada"))).await;

    assert_eq!(response.data, json!({ "me": "ada" }));
}

#[tokio::test]
async fn operation_selection() {
    let schema = build(builder("type Query { a: Int b: Int }"));
    let root = json!({ "a": 1, "b": 2 });
    let document = "query A { a } query B { b }";

    let response = schema
        .execute(Request::new(document).operation_name("B").root_value(root.clone()))
        .await;
    assert_eq!(response.data, json!({ "b": 2 }));

    let response = schema.execute(Request::new(document).root_value(root.clone())).await;
    assert_eq!(response.data, Value::Null);
    assert_eq!(
        response.errors[0].message,
        "Must provide operation name if query contains multiple operations."
    );

    let response = schema
        .execute(Request::new(document).operation_name("C").root_value(root))
        .await;
    assert_eq!(response.errors[0].message, r#"Unknown operation named "C"."#);
}

#[tokio::test]
async fn conflicting_fields_under_one_response_key() {
    let schema = build(builder("type Query { a: Int b: Int }"));

    let response = schema
        .execute(Request::new("{ x: a x: b }").root_value(json!({ "a": 1, "b": 2 })))
        .await;

    assert_eq!(response.data, json!({ "x": null }));
    assert_eq!(
        response.errors[0].message,
        r#"Fields "x" conflict because "a" and "b" are different fields."#
    );
}

#[tokio::test]
async fn errors_go_through_the_error_coercer() {
    let schema = build(
        builder(CHAIN_SDL)
            .resolver(
                "Query.optional",
                resolver_fn(|_| async { Err(GraphqlError::field("database password is hunter2")) }),
            )
            .error_coercer(|error: GraphqlError, _: &engine::ContextData| GraphqlError {
                message: "redacted".into(),
                ..error
            }),
    );

    let response = schema.execute("{ optional }").await;

    assert_eq!(response.errors[0].message, "redacted");
    assert_eq!(response.errors[0].path.as_ref().map(ToString::to_string).as_deref(), Some("optional"));
}
