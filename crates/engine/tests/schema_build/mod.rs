use engine::{resolver_fn, Schema, SchemaError};
use serde_json::json;

#[test]
fn every_problem_is_reported_at_once() {
    let result = Schema::builder()
        .sdl(
            r#"
            type Query {
                pet: Pet
                owner: Owner
            }

            interface Named {
                name: String!
            }

            type Pet implements Named {
                nickname: String
            }

            extend type Missing {
                id: ID
            }
            "#,
        )
        .resolver("Query.unknown", resolver_fn(|_| async { Ok(json!(null)) }))
        .finish();

    let Err(errors) = result else {
        panic!("the schema should be rejected");
    };

    let mut messages = errors.into_iter().map(|error| error.to_string()).collect::<Vec<_>>();
    messages.sort();

    insta::assert_snapshot!(messages.join("\n"), @r###"
    Cannot extend type "Missing" because it is not defined.
    Cannot register a resolver for "Query.unknown": no such field.
    Interface field "Named.name" expected but "Pet" does not provide it.
    Unknown type "Owner" referenced by "Query.owner".
    "###);
}

#[test]
fn documents_are_merged_in_order() {
    let schema = Schema::builder()
        .sdl("type Query { a: Int }")
        .sdl("extend type Query { b: Int }")
        .sdl("extend type Query @deprecatedType { c: Int } directive @deprecatedType on OBJECT")
        .finish();

    let schema = match schema {
        Ok(schema) => schema,
        Err(errors) => panic!("{errors}"),
    };
    let fields = schema
        .object("Query")
        .map(|query| query.fields.keys().cloned().collect::<Vec<_>>())
        .unwrap_or_default();

    assert_eq!(fields[..3], ["a", "b", "c"]);
}

#[test]
fn wrong_kind_extensions() {
    let result = Schema::builder()
        .sdl("type Query { a: Int } enum Color { RED } extend type Color { b: Int }")
        .finish();

    let Err(errors) = result else {
        panic!("the schema should be rejected");
    };
    assert!(matches!(errors.errors(), [SchemaError::ExtensionKindMismatch { .. }]), "{errors}");
}
