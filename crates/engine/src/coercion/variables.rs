use async_graphql_parser::{types::VariableDefinition, Positioned};
use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::input::{InputCoercer, InputSource};
use crate::{
    schema::{TypeDefinition, TypeRef},
    ErrorCode, GraphqlError,
};

/// Coerces the raw variable values of a request against the operation's variable definitions.
///
/// Variables that are neither provided nor defaulted are left out of the result, which is how
/// an absent argument is told apart from a `null` one later on.
pub(crate) fn coerce_variables(
    types: &IndexMap<String, TypeDefinition>,
    definitions: &[Positioned<VariableDefinition>],
    raw: &Map<String, Value>,
) -> Result<Map<String, Value>, Vec<GraphqlError>> {
    let mut variables = Map::new();
    let mut errors = Vec::new();

    for definition in definitions {
        let name = definition.node.name.node.as_str();
        let ty = TypeRef::from(&definition.node.var_type.node);

        let result = match raw.get(name) {
            Some(value) => InputCoercer::new(types).coerce(&ty, Some(InputSource::Json(value))),
            None => match &definition.node.default_value {
                Some(default) => InputCoercer::new(types).coerce(&ty, Some(InputSource::Const(&default.node))),
                None => InputCoercer::new(types).coerce(&ty, None),
            },
        };

        match result {
            Ok(Some(value)) => {
                variables.insert(name.to_string(), value);
            }
            Ok(None) => {}
            Err(failures) => {
                for failure in failures {
                    let message = if failure.is_missing_at_root() {
                        format!("Variable \"${name}\" of required type \"{ty}\" was not provided.")
                    } else {
                        let received = raw
                            .get(name)
                            .map(Value::to_string)
                            .or_else(|| definition.node.default_value.as_ref().map(|value| value.node.to_string()))
                            .unwrap_or_else(|| "null".to_string());
                        format!("Variable \"${name}\" got invalid value {received}; {failure}")
                    };

                    errors.push(GraphqlError::new(message, ErrorCode::VariableError).with_location(definition.pos));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(variables)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::{json, Map, Value};

    use super::coerce_variables;
    use crate::Schema;

    fn run(query: &str, raw: Value) -> Result<Value, Vec<String>> {
        let schema = Schema::builder()
            .sdl(
                r#"
                input Point { x: Int!, y: Int! }
                type Query { distance(from: Point, to: Point): Float }
                "#,
            )
            .finish()
            .unwrap();

        let document = async_graphql_parser::parse_query(query).unwrap();
        let Some((_, operation)) = document.operations.iter().next() else {
            unreachable!()
        };
        let raw = match raw {
            Value::Object(raw) => raw,
            _ => Map::new(),
        };

        coerce_variables(&schema.types, &operation.node.variable_definitions, &raw)
            .map(Value::Object)
            .map_err(|errors| errors.into_iter().map(|error| error.message.into_owned()).collect())
    }

    #[test]
    fn defaults_apply_only_to_absent_variables() {
        let query = "query ($limit: Int = 3, $other: Int = 4) { __typename }";
        assert_eq!(run(query, json!({"other": null})), Ok(json!({"limit": 3, "other": null})));
    }

    #[test]
    fn absent_nullable_variables_stay_absent() {
        assert_eq!(run("query ($limit: Int) { __typename }", json!({})), Ok(json!({})));
    }

    #[test]
    fn errors_mention_the_variable() {
        let errors = run(
            "query ($from: Point!, $to: Point!, $n: [Int!]) { __typename }",
            json!({"from": {"x": 1}, "n": [1, "two"]}),
        )
        .unwrap_err();

        insta::assert_debug_snapshot!(errors, @r###"
        [
            "Variable \"$from\" got invalid value {\"x\":1}; In field \"y\": Value of required type \"Int!\" was not provided.",
            "Variable \"$to\" of required type \"Point!\" was not provided.",
            "Variable \"$n\" got invalid value [1,\"two\"]; In element #1: Expected value of type \"Int\", found \"two\"; Int cannot represent non-integer value: \"two\"",
        ]
        "###);
    }
}
