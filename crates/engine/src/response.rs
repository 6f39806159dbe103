use serde_json::{Map, Value};

use crate::GraphqlError;

/// The result of an operation.
///
/// `data` is `null` when the request failed before execution or when a non-null root field
/// failed.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct Response {
    pub data: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphqlError>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub extensions: Map<String, Value>,
}

impl Response {
    pub fn new(data: Value) -> Self {
        Response {
            data,
            ..Default::default()
        }
    }

    pub fn from_errors(errors: impl IntoIterator<Item = GraphqlError>) -> Self {
        Response {
            data: Value::Null,
            errors: errors.into_iter().collect(),
            extensions: Map::new(),
        }
    }

    #[must_use]
    pub fn with_errors(mut self, errors: impl IntoIterator<Item = GraphqlError>) -> Self {
        self.errors.extend(errors);
        self
    }

    #[must_use]
    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
