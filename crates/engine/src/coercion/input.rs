use std::convert::Infallible;

use async_graphql_value::{ConstValue, Value};
use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue};

use super::error::{InputErrorKind, InputPathSegment, InputValueError};
use crate::schema::{InputValueDefinition, TypeDefinition, TypeRef};

/// Where an input value comes from.
#[derive(Clone, Copy)]
pub(crate) enum InputSource<'a> {
    /// A document literal, possibly referencing variables.
    Literal(&'a Value),
    /// A constant literal: default values and directive arguments in SDL.
    Const(&'a ConstValue),
    /// A raw JSON value, typically a variable before coercion.
    Json(&'a JsonValue),
    /// A variable value that was already coerced against its declared type.
    Coerced(&'a JsonValue),
}

impl<'a> InputSource<'a> {
    fn is_null(&self) -> bool {
        matches!(
            self,
            InputSource::Literal(Value::Null)
                | InputSource::Const(ConstValue::Null)
                | InputSource::Json(JsonValue::Null)
                | InputSource::Coerced(JsonValue::Null)
        )
    }

    fn as_list(&self) -> Option<Vec<InputSource<'a>>> {
        match *self {
            InputSource::Literal(Value::List(items)) => Some(items.iter().map(InputSource::Literal).collect()),
            InputSource::Const(ConstValue::List(items)) => Some(items.iter().map(InputSource::Const).collect()),
            InputSource::Json(JsonValue::Array(items)) => Some(items.iter().map(InputSource::Json).collect()),
            InputSource::Coerced(JsonValue::Array(items)) => Some(items.iter().map(InputSource::Coerced).collect()),
            _ => None,
        }
    }

    fn as_object(&self) -> Option<Vec<(&'a str, InputSource<'a>)>> {
        match *self {
            InputSource::Literal(Value::Object(fields)) => Some(
                fields
                    .iter()
                    .map(|(name, value)| (name.as_str(), InputSource::Literal(value)))
                    .collect(),
            ),
            InputSource::Const(ConstValue::Object(fields)) => Some(
                fields
                    .iter()
                    .map(|(name, value)| (name.as_str(), InputSource::Const(value)))
                    .collect(),
            ),
            InputSource::Json(JsonValue::Object(fields)) => Some(
                fields
                    .iter()
                    .map(|(name, value)| (name.as_str(), InputSource::Json(value)))
                    .collect(),
            ),
            InputSource::Coerced(JsonValue::Object(fields)) => Some(
                fields
                    .iter()
                    .map(|(name, value)| (name.as_str(), InputSource::Coerced(value)))
                    .collect(),
            ),
            _ => None,
        }
    }

    fn enum_name(&self) -> Option<&'a str> {
        match *self {
            InputSource::Literal(Value::Enum(name)) | InputSource::Const(ConstValue::Enum(name)) => {
                Some(name.as_str())
            }
            InputSource::Json(JsonValue::String(name)) => Some(name.as_str()),
            _ => None,
        }
    }

    fn describe(&self) -> String {
        match self {
            InputSource::Literal(value) => value.to_string(),
            InputSource::Const(value) => value.to_string(),
            InputSource::Json(value) | InputSource::Coerced(value) => value.to_string(),
        }
    }
}

/// Converts literals and variable values into internal values, driven by the type graph.
///
/// Every failure is collected with its position inside the value; coercion of siblings goes
/// on after a failure.
pub(crate) struct InputCoercer<'a> {
    types: &'a IndexMap<String, TypeDefinition>,
    variables: Option<&'a Map<String, JsonValue>>,
    path: Vec<InputPathSegment>,
    errors: Vec<InputValueError>,
}

impl<'a> InputCoercer<'a> {
    pub fn new(types: &'a IndexMap<String, TypeDefinition>) -> Self {
        InputCoercer {
            types,
            variables: None,
            path: Vec::new(),
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_variables(mut self, variables: &'a Map<String, JsonValue>) -> Self {
        self.variables = Some(variables);
        self
    }

    /// Coerces a value against a bare type. `None` as a source means absent, and is returned
    /// as `None` when the type allows it.
    pub fn coerce(
        mut self,
        ty: &TypeRef,
        source: Option<InputSource<'a>>,
    ) -> Result<Option<JsonValue>, Vec<InputValueError>> {
        let value = match source.and_then(|source| self.resolve(source)) {
            Some(source) => Some(self.coerce_present(ty, source)),
            None => {
                if ty.is_non_null() {
                    self.error(InputErrorKind::MissingRequired {
                        expected: ty.to_string(),
                    });
                }
                None
            }
        };

        self.finish(value)
    }

    /// Coerces an argument or an input field: an absent source falls back to the default
    /// literal. An explicit `null` never does.
    pub fn coerce_input_value(
        mut self,
        definition: &'a InputValueDefinition,
        source: Option<InputSource<'a>>,
    ) -> Result<Option<JsonValue>, Vec<InputValueError>> {
        let value = self.coerce_with_default(definition, source);
        self.finish(value)
    }

    fn finish(self, value: Option<JsonValue>) -> Result<Option<JsonValue>, Vec<InputValueError>> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }

    fn coerce_with_default(
        &mut self,
        definition: &'a InputValueDefinition,
        source: Option<InputSource<'a>>,
    ) -> Option<JsonValue> {
        match source.and_then(|source| self.resolve(source)) {
            Some(source) => Some(self.coerce_present(&definition.ty, source)),
            None => match &definition.default_value {
                Some(default) => Some(self.coerce_present(&definition.ty, InputSource::Const(default))),
                None if definition.ty.is_non_null() => {
                    self.error(InputErrorKind::MissingRequired {
                        expected: definition.ty.to_string(),
                    });
                    None
                }
                None => None,
            },
        }
    }

    /// Replaces a variable reference by its value. Unknown variables are absent.
    fn resolve(&self, source: InputSource<'a>) -> Option<InputSource<'a>> {
        match source {
            InputSource::Literal(Value::Variable(name)) => self
                .variables
                .and_then(|variables| variables.get(name.as_str()))
                .map(InputSource::Coerced),
            other => Some(other),
        }
    }

    fn coerce_present(&mut self, ty: &TypeRef, source: InputSource<'a>) -> JsonValue {
        if source.is_null() {
            if ty.is_non_null() {
                self.error(InputErrorKind::UnexpectedNull {
                    expected: ty.to_string(),
                });
            }
            return JsonValue::Null;
        }

        match ty {
            TypeRef::NonNull(inner) => self.coerce_present(inner, source),
            TypeRef::List(item_type) => match source.as_list() {
                Some(items) => {
                    let mut values = Vec::with_capacity(items.len());
                    for (index, item) in items.into_iter().enumerate() {
                        self.path.push(InputPathSegment::Index(index));
                        let value = match self.resolve(item) {
                            Some(item) => self.coerce_present(item_type, item),
                            // An unset variable inside a list is a null item.
                            None => self.coerce_present(item_type, InputSource::Json(&JsonValue::Null)),
                        };
                        self.path.pop();
                        values.push(value);
                    }
                    JsonValue::Array(values)
                }
                None => JsonValue::Array(vec![self.coerce_present(item_type, source)]),
            },
            TypeRef::Named(name) => self.coerce_named(name, source),
        }
    }

    fn coerce_named(&mut self, name: &str, source: InputSource<'a>) -> JsonValue {
        if let InputSource::Coerced(value) = source {
            return value.clone();
        }

        let types = self.types;
        let Some(definition) = types.get(name) else {
            self.error(InputErrorKind::NotAnInputType(name.to_string()));
            return JsonValue::Null;
        };

        match definition {
            TypeDefinition::Scalar(scalar) => {
                let result = match source {
                    InputSource::Json(value) => scalar.implementation.coerce_input(value),
                    InputSource::Const(value) => scalar.implementation.parse_literal(value),
                    InputSource::Literal(value) => scalar.implementation.parse_literal(&self.to_const(value)),
                    InputSource::Coerced(value) => Ok(value.clone()),
                };

                result.unwrap_or_else(|reason| {
                    self.error(InputErrorKind::CannotRepresent {
                        expected: name.to_string(),
                        found: source.describe(),
                        reason,
                    });
                    JsonValue::Null
                })
            }
            TypeDefinition::Enum(enum_type) => match source.enum_name() {
                Some(value) if enum_type.values.contains_key(value) => JsonValue::String(value.to_string()),
                _ => {
                    self.error(InputErrorKind::UnknownEnumValue {
                        expected: name.to_string(),
                        found: source.describe(),
                    });
                    JsonValue::Null
                }
            },
            TypeDefinition::InputObject(input_object) => {
                let Some(entries) = source.as_object() else {
                    self.error(InputErrorKind::NotAnInputObject {
                        expected: name.to_string(),
                        found: source.describe(),
                    });
                    return JsonValue::Null;
                };

                for (field, _) in &entries {
                    if !input_object.fields.contains_key(*field) {
                        self.error(InputErrorKind::UnknownField {
                            expected: name.to_string(),
                            field: field.to_string(),
                        });
                    }
                }

                let mut object = Map::new();
                for field in input_object.fields.values() {
                    let entry = entries
                        .iter()
                        .find_map(|(key, value)| (*key == field.name).then_some(*value));

                    self.path.push(InputPathSegment::Field(field.name.clone()));
                    if let Some(value) = self.coerce_with_default(field, entry) {
                        object.insert(field.name.clone(), value);
                    }
                    self.path.pop();
                }

                JsonValue::Object(object)
            }
            TypeDefinition::Object(_) | TypeDefinition::Interface(_) | TypeDefinition::Union(_) => {
                self.error(InputErrorKind::NotAnInputType(name.to_string()));
                JsonValue::Null
            }
        }
    }

    /// Inlines variables so that a scalar only ever parses constants.
    fn to_const(&self, value: &Value) -> ConstValue {
        let result = value.clone().into_const_with(|name| {
            Ok::<_, Infallible>(
                self.variables
                    .and_then(|variables| variables.get(name.as_str()))
                    .and_then(|value| ConstValue::from_json(value.clone()).ok())
                    .unwrap_or(ConstValue::Null),
            )
        });

        match result {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    fn error(&mut self, kind: InputErrorKind) {
        self.errors.push(InputValueError {
            path: self.path.clone(),
            kind,
        });
    }
}
