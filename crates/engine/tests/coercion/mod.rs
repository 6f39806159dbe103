//! Argument and variable coercion as seen from a request.

use engine::{resolver_fn, ErrorCode, Location, Request, Settings};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, Value};

use crate::{build, builder};

const SDL: &str = r#"
    type Query {
        sum(values: [Int!]): Int
        page(limit: Int = 3): String
        strict(limit: Int! = 3): String
        required(limit: Int!): String
        sport(kind: Sport): Sport
        search(filter: Filter): String
    }

    enum Sport {
        FOOTBALL
        CURLING
    }

    input Filter {
        term: String!
        limit: Int = 10
    }
"#;

fn schema() -> engine::Schema {
    let describe = |name: &'static str| {
        resolver_fn(move |ctx| async move {
            Ok(json!(ctx
                .argument(name)
                .map_or_else(|| "absent".to_string(), ToString::to_string)))
        })
    };

    build(
        builder(SDL)
            .resolver(
                "Query.sum",
                resolver_fn(|ctx| async move {
                    let values = ctx.argument("values").and_then(|values| values.as_array().cloned());
                    Ok(json!(values.map(|values| values.iter().filter_map(|v| v.as_i64()).sum::<i64>())))
                }),
            )
            .resolver("Query.page", describe("limit"))
            .resolver("Query.strict", describe("limit"))
            .resolver("Query.required", describe("limit"))
            .resolver("Query.search", describe("filter"))
            .resolver(
                "Query.sport",
                resolver_fn(|ctx| async move { Ok(ctx.argument("kind").cloned().unwrap_or_default()) }),
            ),
    )
}

#[tokio::test]
async fn one_error_for_a_null_list_item() {
    let response = schema().execute("{ sum(values: [10, null]) }").await;

    assert_eq!(response.data, json!({ "sum": null }));
    assert_eq!(response.errors.len(), 1);

    let error = &response.errors[0];
    assert!(error.message.starts_with(r#"Argument "values" has invalid value"#), "{}", error.message);
    assert!(
        error
            .message
            .ends_with(r#"In element #1: Value of non-null type "Int!" must not be null."#),
        "{}",
        error.message
    );
    assert_eq!(error.locations, vec![Location::new(1, 15)]);
    assert_eq!(error.code, ErrorCode::FieldError);
}

#[tokio::test]
async fn single_values_are_coerced_into_lists() {
    let response = schema().execute("{ sum(values: 7) }").await;
    assert_eq!(response.data, json!({ "sum": 7 }));
}

#[rstest]
#[case::absent("{ page }", "3")]
#[case::explicit_null("{ page(limit: null) }", "null")]
#[case::given("{ page(limit: 5) }", "5")]
#[case::non_null_default("{ strict }", "3")]
#[tokio::test]
async fn defaults_only_apply_to_absent_arguments(#[case] query: &str, #[case] expected: &str) {
    let response = schema().execute(query).await;

    assert!(response.is_ok(), "{:?}", response.errors);
    let value = response.data.as_object().and_then(|data| data.values().next().cloned());
    assert_eq!(value, Some(json!(expected)));
}

#[tokio::test]
async fn explicit_null_for_non_null_argument_with_default() {
    let response = schema().execute("{ strict(limit: null) }").await;

    assert_eq!(response.data, json!({ "strict": null }));
    insta::assert_snapshot!(
        &*response.errors[0].message,
        @r###"Argument "limit" has invalid value null; Value of non-null type "Int!" must not be null."###
    );
}

#[tokio::test]
async fn missing_required_argument() {
    let response = schema().execute("{ required }").await;

    assert_eq!(response.data, Value::Null);
    assert_eq!(response.errors[0].code, ErrorCode::OperationValidationError);
    assert_eq!(
        response.errors[0].message,
        r#"Field "Query.required" argument "limit" of type "Int!" is required, but it was not provided."#
    );
}

#[rstest]
#[case::declared("{ sport(kind: CURLING) }", json!({ "sport": "CURLING" }))]
#[case::unknown("{ sport(kind: TENNIS) }", json!({ "sport": null }))]
#[case::string_literal(r#"{ sport(kind: "CURLING") }"#, json!({ "sport": null }))]
#[tokio::test]
async fn enum_literals(#[case] query: &str, #[case] expected: Value) {
    let response = schema().execute(query).await;
    assert_eq!(response.data, expected);
}

#[tokio::test]
async fn input_object_fields_get_their_defaults() {
    let response = schema().execute(r#"{ search(filter: { term: "rust" }) }"#).await;

    assert_eq!(response.data, json!({ "search": r#"{"term":"rust","limit":10}"# }));
}

#[tokio::test]
async fn variables_are_coerced_before_execution() {
    let query = "query ($filter: Filter, $limit: Int) { search(filter: $filter) page(limit: $limit) }";

    let response = schema()
        .execute(Request::new(query).variables(json!({ "filter": { "term": "graphql" } })))
        .await;
    assert_eq!(
        response.data,
        json!({ "search": r#"{"term":"graphql","limit":10}"#, "page": "3" })
    );

    let response = schema()
        .execute(Request::new(query).variables(json!({ "filter": { "limit": 1 } })))
        .await;
    assert_eq!(response.data, Value::Null);
    assert_eq!(response.errors[0].code, ErrorCode::VariableError);
    assert!(
        response.errors[0].message.starts_with(r#"Variable "$filter" got invalid value"#),
        "{}",
        response.errors[0].message
    );
}

#[tokio::test]
async fn missing_required_variable() {
    let query = "query ($limit: Int!) { required(limit: $limit) }";

    let response = schema().execute(query).await;

    assert_eq!(response.data, Value::Null);
    assert_eq!(
        response.errors[0].message,
        r#"Variable "$limit" of required type "Int!" was not provided."#
    );
}

#[tokio::test]
async fn deeply_nested_input_is_rejected_before_execution() {
    let settings = Settings {
        max_input_depth: 4,
        ..Settings::default()
    };
    let schema = build(builder(SDL).settings(settings));

    let response = schema.execute("{ sum(values: [[[[[[1]]]]]]) }").await;

    assert_eq!(response.data, Value::Null);
    assert_eq!(response.errors[0].code, ErrorCode::InputDepthExceeded);
}
