//! Directive implementations bound through the schema builder.

use engine::{
    resolver_fn, ArgumentNext, DirectiveContext, DirectiveImplementation, FieldNext, GraphqlError, GraphqlResult,
    InputValueDefinition, Request, ResolveInfo, Response, Schema, SchemaNext, ValueNext,
};
use serde_json::{json, Map, Value};

use crate::{build, builder};

/// Maps the string produced by the rest of the chain.
struct Casing(fn(&str) -> String);

#[async_trait::async_trait]
impl DirectiveImplementation for Casing {
    async fn on_field_execution(
        &self,
        _: &Map<String, Value>,
        next: FieldNext<'_>,
        parent: &Value,
        arguments: &Map<String, Value>,
        _: &ResolveInfo<'_>,
    ) -> GraphqlResult<Value> {
        let value = next.run(parent, arguments).await?;
        Ok(match value.as_str() {
            Some(text) => Value::String((self.0)(text)),
            None => value,
        })
    }
}

/// Every root field resolves to "Sport".
fn casing_schema(sdl: &str, fields: &[&str]) -> Schema {
    let schema = builder(sdl)
        .directive("lowercase", Casing(str::to_lowercase))
        .directive("uppercase", Casing(str::to_uppercase));

    build(fields.iter().fold(schema, |schema, field| {
        schema.resolver(format!("Query.{field}"), resolver_fn(|_| async { Ok(json!("Sport")) }))
    }))
}

#[tokio::test]
async fn last_declared_directive_wraps_the_others() {
    let schema = casing_schema(
        r#"
        directive @lowercase on FIELD_DEFINITION
        directive @uppercase on FIELD_DEFINITION

        type Query {
            sport: String @lowercase @uppercase
            reversed: String @uppercase @lowercase
        }
        "#,
        &["sport", "reversed"],
    );

    let response = schema.execute("{ sport reversed }").await;

    assert_eq!(response.data, json!({ "sport": "SPORT", "reversed": "sport" }));
}

#[tokio::test]
async fn document_directives_run_outside_definition_ones() {
    let schema = casing_schema(
        r#"
        directive @lowercase on FIELD | FIELD_DEFINITION
        directive @uppercase on FIELD | FIELD_DEFINITION

        type Query {
            sport: String @uppercase
        }
        "#,
        &["sport"],
    );

    let response = schema
        .execute("{ plain: sport lowered: sport @lowercase both: sport @lowercase @uppercase }")
        .await;

    assert_eq!(
        response.data,
        json!({ "plain": "SPORT", "lowered": "sport", "both": "SPORT" })
    );
}

/// Leaves the argument out, whatever its value.
struct Omit;

#[async_trait::async_trait]
impl DirectiveImplementation for Omit {
    async fn on_argument_execution(
        &self,
        _: &Map<String, Value>,
        _: ArgumentNext<'_>,
        _: &InputValueDefinition,
        _: &ResolveInfo<'_>,
    ) -> GraphqlResult<Option<Value>> {
        Ok(None)
    }
}

/// Trims strings once they are coerced.
struct Trim;

#[async_trait::async_trait]
impl DirectiveImplementation for Trim {
    async fn on_post_input_coercion(
        &self,
        _: &Map<String, Value>,
        next: ValueNext<'_>,
        value: Value,
        _: &DirectiveContext<'_>,
    ) -> GraphqlResult<Value> {
        let value = match value {
            Value::String(text) => Value::String(text.trim().to_string()),
            other => other,
        };
        next.run(value).await
    }
}

/// Replaces any value by its `with` argument on the way out.
struct Redact;

#[async_trait::async_trait]
impl DirectiveImplementation for Redact {
    async fn on_pre_output_coercion(
        &self,
        arguments: &Map<String, Value>,
        next: ValueNext<'_>,
        value: Value,
        _: &DirectiveContext<'_>,
    ) -> GraphqlResult<Value> {
        if value.is_null() {
            return next.run(value).await;
        }
        next.run(arguments.get("with").cloned().unwrap_or_default()).await
    }
}

const ARGUMENTS_SDL: &str = r#"
    directive @drop on ARGUMENT_DEFINITION
    directive @trim on ARGUMENT_DEFINITION | INPUT_FIELD_DEFINITION
    directive @redact(with: String = "***") on FIELD_DEFINITION | OBJECT

    type Query {
        limited(limit: Int! @drop): String
        greet(name: String @trim): String
        search(filter: Filter): String
        password: String @redact
        hidden: String @redact(with: "hidden")
    }

    input Filter {
        term: String @trim
    }
"#;

fn arguments_schema() -> Schema {
    let describe = |name: &'static str| {
        resolver_fn(move |ctx| async move {
            Ok(json!(ctx
                .argument(name)
                .map_or_else(|| "absent".to_string(), ToString::to_string)))
        })
    };

    build(
        builder(ARGUMENTS_SDL)
            .directive("drop", Omit)
            .directive("trim", Trim)
            .directive("redact", Redact)
            .resolver("Query.limited", describe("limit"))
            .resolver("Query.greet", describe("name"))
            .resolver("Query.search", describe("filter"))
            .resolver("Query.password", resolver_fn(|_| async { Ok(json!("hunter2")) }))
            .resolver("Query.hidden", resolver_fn(|_| async { Ok(json!("value")) })),
    )
}

#[tokio::test]
async fn argument_directives_may_remove_required_arguments() {
    let response = arguments_schema().execute("{ limited(limit: 10) }").await;

    assert!(response.is_ok(), "{:?}", response.errors);
    assert_eq!(response.data, json!({ "limited": "absent" }));
}

#[tokio::test]
async fn post_input_coercion_on_arguments_and_input_fields() {
    let response = arguments_schema()
        .execute(r#"{ greet(name: "  ada ") search(filter: { term: " rust  " }) }"#)
        .await;

    assert_eq!(
        response.data,
        json!({ "greet": r#""ada""#, "search": r#"{"term":"rust"}"# })
    );
}

#[tokio::test]
async fn pre_output_coercion_uses_bound_arguments() {
    let response = arguments_schema().execute("{ password hidden }").await;

    assert_eq!(response.data, json!({ "password": "***", "hidden": "hidden" }));
}

/// Fails every field it is put on.
struct Forbidden;

#[async_trait::async_trait]
impl DirectiveImplementation for Forbidden {
    async fn on_field_execution(
        &self,
        _: &Map<String, Value>,
        _: FieldNext<'_>,
        _: &Value,
        _: &Map<String, Value>,
        info: &ResolveInfo<'_>,
    ) -> GraphqlResult<Value> {
        Err(GraphqlError::field(format!("{} is forbidden", info.field.name)))
    }
}

#[tokio::test]
async fn directive_failures_are_field_errors() {
    let schema = build(
        builder(
            r#"
            directive @forbidden on FIELD_DEFINITION
            type Query {
                open: Int
                closed: Int @forbidden
            }
            "#,
        )
        .directive("forbidden", Forbidden),
    );

    let response = schema
        .execute(Request::new("{ open closed }").root_value(json!({ "open": 1, "closed": 2 })))
        .await;

    assert_eq!(response.data, json!({ "open": 1, "closed": null }));
    insta::assert_json_snapshot!(response.errors, @r###"
    [
      {
        "message": "closed is forbidden",
        "locations": [
          {
            "line": 1,
            "column": 8
          }
        ],
        "path": [
          "closed"
        ],
        "extensions": {
          "code": "FIELD_ERROR"
        }
      }
    ]
    "###);
}

/// Tags every response with the name of its operation.
struct Stamp;

#[async_trait::async_trait]
impl DirectiveImplementation for Stamp {
    async fn on_schema_execution(&self, arguments: &Map<String, Value>, next: SchemaNext<'_>) -> Response {
        let operation = next.operation_name().map(str::to_string);
        let key = arguments.get("key").and_then(Value::as_str).unwrap_or("operation").to_string();
        next.run().await.with_extension(key, json!(operation))
    }
}

#[tokio::test]
async fn schema_directives_wrap_the_whole_operation() {
    let schema = build(
        builder(
            r#"
            directive @stamp(key: String) on SCHEMA
            schema @stamp(key: "op") { query: Query }
            type Query { hello: String }
            "#,
        )
        .directive("stamp", Stamp),
    );

    let response = schema
        .execute(Request::new("query Greeting { hello }").root_value(json!({ "hello": "world" })))
        .await;

    insta::assert_json_snapshot!(response.to_json(), @r###"
    {
      "data": {
        "hello": "world"
      },
      "extensions": {
        "op": "Greeting"
      }
    }
    "###);
}

#[tokio::test]
async fn directives_without_implementation_are_inert() {
    let schema = build(builder(
        r#"
        directive @note(text: String) on FIELD_DEFINITION
        type Query { hello: String @note(text: "just metadata") }
        "#,
    ));

    let response = schema
        .execute(Request::new("{ hello }").root_value(json!({ "hello": "world" })))
        .await;

    assert_eq!(response.data, json!({ "hello": "world" }));
}
