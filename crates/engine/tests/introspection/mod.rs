use engine::{
    resolver_fn, DirectiveContext, DirectiveImplementation, GraphqlResult, Request, Settings, ValueNext,
};
use serde_json::{json, Map, Value};

use crate::{build, builder};

/// Rewrites the serialized enum value `from` into `to`.
struct Rename;

#[async_trait::async_trait]
impl DirectiveImplementation for Rename {
    async fn on_pre_output_coercion(
        &self,
        arguments: &Map<String, Value>,
        next: ValueNext<'_>,
        value: Value,
        _: &DirectiveContext<'_>,
    ) -> GraphqlResult<Value> {
        let value = next.run(value).await?;
        if arguments.get("from") == Some(&value) {
            return Ok(arguments.get("to").cloned().unwrap_or(value));
        }
        Ok(value)
    }
}

#[tokio::test]
async fn extended_enums_keep_declaration_order() {
    let schema = build(
        builder(
            r#"
            directive @rename(from: String!, to: String!) on ENUM

            type Query {
                sports: [Sport!]!
            }

            enum Sport {
                SOCCER
                BASKETBALL
            }

            extend enum Sport @rename(from: "SOCCER", to: "FOOTBALL") {
                CURLING
            }
            "#,
        )
        .directive("rename", Rename)
        .resolver("Query.sports", resolver_fn(|_| async { Ok(json!(["SOCCER", "CURLING"])) })),
    );

    let response = schema
        .execute(r#"{ sports __type(name: "Sport") { kind name enumValues { name } } }"#)
        .await;

    insta::assert_json_snapshot!(response.to_json(), @r###"
    {
      "data": {
        "sports": [
          "FOOTBALL",
          "CURLING"
        ],
        "__type": {
          "kind": "ENUM",
          "name": "Sport",
          "enumValues": [
            {
              "name": "SOCCER"
            },
            {
              "name": "BASKETBALL"
            },
            {
              "name": "CURLING"
            }
          ]
        }
      }
    }
    "###);
}

const SDL: &str = r#"
    "The entry point."
    type Query {
        pets(first: Int = 10): [Pet!]!
        legacy: Int @deprecated(reason: "Use pets.")
        internal: Int @nonIntrospectable
        secret: Secret @nonIntrospectable
    }

    interface Named {
        name: String!
    }

    type Pet implements Named {
        name: String!
    }

    type Secret @nonIntrospectable {
        code: String
    }
"#;

#[tokio::test]
async fn wrapped_types_and_arguments() {
    let schema = build(builder(SDL));

    let response = schema
        .execute(
            r#"{
                __type(name: "Query") {
                    description
                    fields {
                        name
                        args { name defaultValue type { name } }
                        type { kind name ofType { kind name ofType { kind name ofType { kind name } } } }
                    }
                }
            }"#,
        )
        .await;

    insta::assert_json_snapshot!(response.to_json(), @r###"
    {
      "data": {
        "__type": {
          "description": "The entry point.",
          "fields": [
            {
              "name": "pets",
              "args": [
                {
                  "name": "first",
                  "defaultValue": "10",
                  "type": {
                    "name": "Int"
                  }
                }
              ],
              "type": {
                "kind": "NON_NULL",
                "name": null,
                "ofType": {
                  "kind": "LIST",
                  "name": null,
                  "ofType": {
                    "kind": "NON_NULL",
                    "name": null,
                    "ofType": {
                      "kind": "OBJECT",
                      "name": "Pet"
                    }
                  }
                }
              }
            }
          ]
        }
      }
    }
    "###);
}

#[tokio::test]
async fn deprecated_fields_are_opt_in() {
    let schema = build(builder(SDL));

    let response = schema
        .execute(
            r#"{
                __type(name: "Query") {
                    fields(includeDeprecated: true) { name isDeprecated deprecationReason }
                }
            }"#,
        )
        .await;

    assert_eq!(
        response.data,
        json!({
            "__type": {
                "fields": [
                    { "name": "pets", "isDeprecated": false, "deprecationReason": null },
                    { "name": "legacy", "isDeprecated": true, "deprecationReason": "Use pets." },
                ]
            }
        })
    );
}

#[tokio::test]
async fn hidden_elements_are_not_listed() {
    let schema = build(builder(SDL));

    let response = schema
        .execute(r#"{ secret: __type(name: "Secret") { name } __schema { types { name } } }"#)
        .await;

    assert_eq!(response.data["secret"], Value::Null);
    let names = response.data["__schema"]["types"]
        .as_array()
        .map(|types| types.iter().filter_map(|ty| ty["name"].as_str()).collect::<Vec<_>>())
        .unwrap_or_default();
    assert!(names.contains(&"Pet"));
    assert!(names.contains(&"__Schema"));
    assert!(!names.contains(&"Secret"));
}

#[tokio::test]
async fn interfaces_and_possible_types() {
    let schema = build(builder(SDL));

    let response = schema
        .execute(
            r#"{
                pet: __type(name: "Pet") { interfaces { name } }
                named: __type(name: "Named") { kind possibleTypes { name } }
            }"#,
        )
        .await;

    assert_eq!(
        response.data,
        json!({
            "pet": { "interfaces": [{ "name": "Named" }] },
            "named": { "kind": "INTERFACE", "possibleTypes": [{ "name": "Pet" }] },
        })
    );
}

#[tokio::test]
async fn root_types_and_typename() {
    let schema = build(builder(SDL));

    let response = schema
        .execute(Request::new(
            "{ __typename __schema { queryType { name } mutationType { name } subscriptionType { name } } }",
        ))
        .await;

    assert_eq!(
        response.data,
        json!({
            "__typename": "Query",
            "__schema": { "queryType": { "name": "Query" }, "mutationType": null, "subscriptionType": null },
        })
    );
}

#[tokio::test]
async fn introspection_can_be_disabled() {
    let settings = Settings {
        introspection: false,
        ..Settings::default()
    };
    let schema = build(builder(SDL).settings(settings));

    let response = schema.execute("{ __schema { queryType { name } } }").await;

    assert_eq!(response.data, Value::Null);
    assert_eq!(
        response.errors[0].message,
        r#"Cannot query field "__schema" on type "Query"."#
    );
}

#[tokio::test]
async fn directives_report_whether_they_repeat() {
    let schema = build(builder(
        r#"
        "Labels a field; may be used \"repeatable\" times."
        directive @label(name: String) repeatable on FIELD_DEFINITION
        directive @audit on FIELD_DEFINITION

        type Query {
            a: Int @label(name: "x") @label(name: "y") @audit
        }
        "#,
    ));

    let response = schema.execute("{ __schema { directives { name isRepeatable } } }").await;

    let repeatable = response.data["__schema"]["directives"]
        .as_array()
        .into_iter()
        .flatten()
        .map(|directive| (directive["name"].clone(), directive["isRepeatable"].clone()))
        .collect::<Vec<_>>();

    for (name, expected) in [
        ("skip", false),
        ("include", false),
        ("deprecated", false),
        ("label", true),
        ("audit", false),
    ] {
        assert!(
            repeatable.contains(&(json!(name), json!(expected))),
            "{name}: {repeatable:?}"
        );
    }
}
