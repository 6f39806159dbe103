use async_graphql_parser::{
    types::{ExecutableDocument, Selection, SelectionSet},
    Pos, Positioned,
};
use async_graphql_value::{ConstValue, Value};
use serde_json::Value as JsonValue;

use crate::{ErrorCode, GraphqlError};

enum Nested<'a> {
    Literal(&'a Value),
    Const(&'a ConstValue),
    Json(&'a JsonValue),
}

/// Nesting depth of a value, computed with an explicit stack. Scalars have a depth of 1.
fn depth(root: Nested<'_>) -> usize {
    let mut deepest = 0;
    let mut stack = vec![(root, 1)];

    while let Some((value, level)) = stack.pop() {
        deepest = deepest.max(level);
        match value {
            Nested::Literal(Value::List(items)) => {
                stack.extend(items.iter().map(|item| (Nested::Literal(item), level + 1)))
            }
            Nested::Literal(Value::Object(fields)) => {
                stack.extend(fields.values().map(|field| (Nested::Literal(field), level + 1)))
            }
            Nested::Const(ConstValue::List(items)) => {
                stack.extend(items.iter().map(|item| (Nested::Const(item), level + 1)))
            }
            Nested::Const(ConstValue::Object(fields)) => {
                stack.extend(fields.values().map(|field| (Nested::Const(field), level + 1)))
            }
            Nested::Json(JsonValue::Array(items)) => {
                stack.extend(items.iter().map(|item| (Nested::Json(item), level + 1)))
            }
            Nested::Json(JsonValue::Object(fields)) => {
                stack.extend(fields.values().map(|field| (Nested::Json(field), level + 1)))
            }
            _ => {}
        }
    }

    deepest
}

/// Rejects documents and variables nested deeper than `max_depth`, before any coercion recurses
/// into them.
pub(crate) fn check_input_depth(
    document: &ExecutableDocument,
    variables: &serde_json::Map<String, JsonValue>,
    max_depth: usize,
) -> Result<(), GraphqlError> {
    let exceeded = |pos: Option<Pos>| {
        let error = GraphqlError::new(
            format!("Input value is nested deeper than the allowed {max_depth} levels."),
            ErrorCode::InputDepthExceeded,
        );
        match pos {
            Some(pos) => error.with_location(pos),
            None => error,
        }
    };

    for (name, value) in variables {
        if depth(Nested::Json(value)) > max_depth {
            return Err(exceeded(None).with_extension("variable", name.clone()));
        }
    }

    let mut selection_sets: Vec<&Positioned<SelectionSet>> = Vec::new();
    for (_, operation) in document.operations.iter() {
        for definition in &operation.node.variable_definitions {
            if let Some(default) = &definition.node.default_value {
                if depth(Nested::Const(&default.node)) > max_depth {
                    return Err(exceeded(Some(default.pos)));
                }
            }
        }
        check_directives(&operation.node.directives, max_depth).map_err(|pos| exceeded(Some(pos)))?;
        selection_sets.push(&operation.node.selection_set);
    }
    for fragment in document.fragments.values() {
        check_directives(&fragment.node.directives, max_depth).map_err(|pos| exceeded(Some(pos)))?;
        selection_sets.push(&fragment.node.selection_set);
    }

    while let Some(selection_set) = selection_sets.pop() {
        for selection in &selection_set.node.items {
            match &selection.node {
                Selection::Field(field) => {
                    for (_, value) in &field.node.arguments {
                        if depth(Nested::Literal(&value.node)) > max_depth {
                            return Err(exceeded(Some(value.pos)));
                        }
                    }
                    check_directives(&field.node.directives, max_depth).map_err(|pos| exceeded(Some(pos)))?;
                    selection_sets.push(&field.node.selection_set);
                }
                Selection::FragmentSpread(spread) => {
                    check_directives(&spread.node.directives, max_depth).map_err(|pos| exceeded(Some(pos)))?;
                }
                Selection::InlineFragment(fragment) => {
                    check_directives(&fragment.node.directives, max_depth).map_err(|pos| exceeded(Some(pos)))?;
                    selection_sets.push(&fragment.node.selection_set);
                }
            }
        }
    }

    Ok(())
}

fn check_directives(
    directives: &[Positioned<async_graphql_parser::types::Directive>],
    max_depth: usize,
) -> Result<(), Pos> {
    for directive in directives {
        for (_, value) in &directive.node.arguments {
            if depth(Nested::Literal(&value.node)) > max_depth {
                return Err(value.pos);
            }
        }
    }
    Ok(())
}
