use std::any::Any;

use serde_json::{Map, Value};

use crate::ContextData;

/// An operation to run against a [`crate::Schema`].
#[derive(Debug, Clone)]
pub struct Request {
    pub(crate) query: String,
    pub(crate) operation_name: Option<String>,
    pub(crate) variables: Map<String, Value>,
    pub(crate) data: ContextData,
    pub(crate) root_value: Value,
}

impl Request {
    pub fn new(query: impl Into<String>) -> Self {
        Request {
            query: query.into(),
            operation_name: None,
            variables: Map::new(),
            data: ContextData::default(),
            root_value: Value::Object(Map::new()),
        }
    }

    /// Selects the operation to run, required when the document declares more than one.
    #[must_use]
    pub fn operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Variable values, as a JSON object.
    #[must_use]
    pub fn variables(mut self, variables: Value) -> Self {
        match variables {
            Value::Object(variables) => self.variables = variables,
            Value::Null => self.variables = Map::new(),
            other => tracing::warn!("ignoring non-object variables: {other}"),
        }
        self
    }

    /// Attaches request-scoped data, retrieved by resolvers and directives through its type.
    #[must_use]
    pub fn data<T: Any + Send + Sync>(mut self, data: T) -> Self {
        self.data.insert(data);
        self
    }

    /// The parent value of the root fields.
    #[must_use]
    pub fn root_value(mut self, root_value: Value) -> Self {
        self.root_value = root_value;
        self
    }
}

impl From<&str> for Request {
    fn from(query: &str) -> Self {
        Request::new(query)
    }
}

impl From<String> for Request {
    fn from(query: String) -> Self {
        Request::new(query)
    }
}
