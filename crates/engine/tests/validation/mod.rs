use engine::{ErrorCode, Location, Request};
use serde_json::{json, Value};

use crate::{build, builder};

const SDL: &str = r#"
    type Query {
        dog: Dog
        dogs(first: Int!): [Dog]
    }

    type Dog {
        name: String
        owner: Human
    }

    type Human {
        name: String
    }
"#;

const INVALID: &str = "query Walk($unused: Int) { dog { name nickname owner } ...Missing }";

#[test]
fn every_rule_reports_its_violations() {
    let schema = build(builder(SDL));

    let mut messages = schema
        .validate(INVALID)
        .into_iter()
        .map(|error| error.message.into_owned())
        .collect::<Vec<_>>();
    messages.sort();

    insta::assert_debug_snapshot!(messages, @r###"
    [
        "Cannot query field \"nickname\" on type \"Dog\".",
        "Field \"owner\" of type \"Human\" must have a selection of subfields. Did you mean \"owner { ... }\"?",
        "Unknown fragment \"Missing\".",
        "Variable \"$unused\" is never used in operation \"Walk\".",
    ]
    "###);
}

#[test]
fn validation_is_deterministic() {
    let schema = build(builder(SDL));

    assert_eq!(schema.validate(INVALID), schema.validate(INVALID));
}

#[test]
fn violations_are_tagged_with_their_rule() {
    let schema = build(builder(SDL));

    let errors = schema.validate("{ dogs { name } }");

    insta::assert_json_snapshot!(errors, @r###"
    [
      {
        "message": "Field \"Query.dogs\" argument \"first\" of type \"Int!\" is required, but it was not provided.",
        "locations": [
          {
            "line": 1,
            "column": 3
          }
        ],
        "extensions": {
          "rule": "ProvidedRequiredArguments",
          "spec": "June 2018",
          "tag": "5.4.2.1",
          "code": "OPERATION_VALIDATION_ERROR"
        }
      }
    ]
    "###);
}

#[test]
fn parser_level_violations() {
    let schema = build(builder(SDL));

    let errors = schema.validate("query A { dog { name } } query A { dogs(first: 1) { name } }");

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, r#"There can be only one operation named "A"."#);
    assert_eq!(errors[0].extension("rule"), Some(&json!("UniqueOperationNames")));
}

#[test]
fn only_repeatable_directives_may_repeat() {
    let schema = build(builder(&format!("directive @trace(label: String) repeatable on FIELD\n{SDL}")));

    let errors = schema.validate(r#"{ dog @skip(if: false) @skip(if: true) @trace(label: "a") @trace { name } }"#);

    assert_eq!(errors.len(), 1, "{errors:#?}");
    assert_eq!(
        errors[0].message,
        r#"The directive "@skip" can only be used once at this location."#
    );
    assert_eq!(errors[0].extension("rule"), Some(&json!("UniqueDirectivesPerLocation")));
    assert_eq!(
        errors[0].locations,
        [Location { line: 1, column: 7 }, Location { line: 1, column: 24 }]
    );
}

#[test]
fn valid_documents_have_no_violations() {
    let schema = build(builder(SDL));

    let errors = schema.validate(
        r#"
        query Dogs($first: Int!, $withOwner: Boolean = false) {
            dogs(first: $first) {
                ...DogFields
                owner @include(if: $withOwner) { name }
            }
        }

        fragment DogFields on Dog {
            name
        }
        "#,
    );

    assert!(errors.is_empty(), "{errors:#?}");
}

#[tokio::test]
async fn invalid_requests_are_not_executed() {
    let schema = build(builder(SDL));

    let response = schema
        .execute(Request::new("{ dog { nickname } }").root_value(json!({ "dog": { "name": "Rex" } })))
        .await;

    assert_eq!(response.data, Value::Null);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].code, ErrorCode::OperationValidationError);
}

#[tokio::test]
async fn syntax_errors() {
    let schema = build(builder(SDL));

    let response = schema.execute("{ dog { name }").await;

    assert_eq!(response.data, Value::Null);
    assert_eq!(response.errors[0].code, ErrorCode::OperationParsingError);
}
