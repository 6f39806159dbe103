//! `__schema`, `__type` and the `__*` introspection types.
//!
//! `__Type` values are handles, `{"__ref": "[Foo!]"}`, resolved lazily so that the type graph
//! may be cyclic. Every other introspection object is materialized as JSON and read by the
//! default resolver, except for the arguments filtered by `includeDeprecated`.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use crate::{
    directive::IntrospectionElement,
    schema::{
        DirectiveDefinition, DirectiveUsage, FieldDefinition, InputValueDefinition, TypeDefinition, TypeRef,
    },
    GraphqlResult, ResolveInfo, Resolver, Schema,
};

const TYPE_REF: &str = "__ref";
const ARGS: &str = "__args";

pub(crate) fn install_resolvers(types: &mut IndexMap<String, TypeDefinition>) {
    let resolver: Arc<dyn Resolver> = Arc::new(Introspection);

    for (type_name, definition) in types.iter_mut() {
        let TypeDefinition::Object(object) = definition else {
            continue;
        };

        for field in object.fields.values_mut() {
            let computed = match type_name.as_str() {
                "__Schema" | "__Type" => true,
                "__Field" | "__Directive" => field.name == "args",
                _ => false,
            };
            if computed {
                field.resolver = Some(resolver.clone());
            }
        }
    }
}

/// `__schema` and `__type`, added to the query root.
pub(crate) fn meta_fields() -> [FieldDefinition; 2] {
    let resolver: Arc<dyn Resolver> = Arc::new(Introspection);

    let mut schema = FieldDefinition::new("__schema", TypeRef::non_null(TypeRef::named("__Schema")));
    schema.resolver = Some(resolver.clone());
    schema.is_meta = true;

    let mut ty = FieldDefinition::new("__type", TypeRef::named("__Type"));
    ty.arguments.insert(
        "name".to_string(),
        InputValueDefinition::new("name", TypeRef::non_null(TypeRef::named("String"))),
    );
    ty.resolver = Some(resolver);
    ty.is_meta = true;

    [schema, ty]
}

fn is_visible(usages: &[DirectiveUsage], element: IntrospectionElement<'_>) -> bool {
    usages.iter().all(|usage| {
        usage
            .implementation
            .as_ref()
            .map_or(true, |implementation| implementation.on_introspection(&usage.arguments, element))
    })
}

fn type_handle(ty: impl std::fmt::Display) -> Value {
    json!({ TYPE_REF: ty.to_string() })
}

fn include_deprecated(arguments: &Map<String, Value>) -> bool {
    arguments
        .get("includeDeprecated")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn deprecation(usages: &[DirectiveUsage]) -> (bool, Value) {
    match crate::schema::deprecation_reason(usages) {
        Some(reason) => (true, reason.map_or(Value::Null, |reason| Value::String(reason.to_string()))),
        None => (false, Value::Null),
    }
}

struct Introspection;

#[async_trait::async_trait]
impl Resolver for Introspection {
    async fn resolve(
        &self,
        parent: &Value,
        arguments: &Map<String, Value>,
        info: &ResolveInfo<'_>,
    ) -> GraphqlResult<Value> {
        let schema = info.schema;
        let field = info.field.name.as_str();

        let value = match (info.parent_type, field) {
            (_, "__schema") => json!({}),
            (_, "__type") => arguments
                .get("name")
                .and_then(Value::as_str)
                .and_then(|name| schema.type_definition(name))
                .filter(|definition| is_visible(definition.directives(), IntrospectionElement::Type(definition)))
                .map_or(Value::Null, |definition| type_handle(definition.name())),
            ("__Schema", _) => schema_field(schema, field),
            ("__Type", _) => {
                let Some(ty) = parent.get(TYPE_REF).and_then(Value::as_str).and_then(TypeRef::parse) else {
                    return Ok(Value::Null);
                };
                type_field(schema, &ty, field, include_deprecated(arguments))
            }
            (_, "args") => {
                let include_deprecated = include_deprecated(arguments);
                let args = parent.get(ARGS).and_then(Value::as_array).cloned().unwrap_or_default();
                Value::Array(
                    args.into_iter()
                        .filter(|arg| include_deprecated || arg.get("isDeprecated") != Some(&Value::Bool(true)))
                        .collect(),
                )
            }
            _ => parent.get(field).cloned().unwrap_or(Value::Null),
        };

        Ok(value)
    }
}

fn schema_field(schema: &Schema, field: &str) -> Value {
    match field {
        "types" => Value::Array(
            schema
                .types()
                .filter(|definition| is_visible(definition.directives(), IntrospectionElement::Type(definition)))
                .map(|definition| type_handle(definition.name()))
                .collect(),
        ),
        "queryType" => type_handle(schema.query_type()),
        "mutationType" => schema.mutation_type().map_or(Value::Null, type_handle),
        "subscriptionType" => schema.subscription_type().map_or(Value::Null, type_handle),
        "directives" => Value::Array(schema.directives().map(directive_object).collect()),
        _ => Value::Null,
    }
}

fn type_field(schema: &Schema, ty: &TypeRef, field: &str, include_deprecated: bool) -> Value {
    let definition = match ty {
        TypeRef::NonNull(inner) | TypeRef::List(inner) => {
            return match field {
                "kind" => Value::String(if ty.is_non_null() { "NON_NULL" } else { "LIST" }.to_string()),
                "ofType" => type_handle(inner),
                _ => Value::Null,
            };
        }
        TypeRef::Named(name) => match schema.type_definition(name) {
            Some(definition) => definition,
            None => return Value::Null,
        },
    };

    match (field, definition) {
        ("kind", _) => Value::String(definition.kind().to_string()),
        ("name", _) => Value::String(definition.name().to_string()),
        ("description", _) => definition.description().map_or(Value::Null, |description| description.into()),
        ("specifiedByURL", TypeDefinition::Scalar(scalar)) => scalar.specified_by_url().map_or(Value::Null, Into::into),
        ("fields", TypeDefinition::Object(_) | TypeDefinition::Interface(_)) => Value::Array(
            definition
                .fields()
                .into_iter()
                .flat_map(|fields| fields.values())
                .filter(|field| !field.is_meta)
                .filter(|field| include_deprecated || field.deprecation_reason().is_none())
                .filter(|field| {
                    is_visible(
                        &field.directives,
                        IntrospectionElement::Field {
                            parent_type: definition.name(),
                            field,
                        },
                    )
                })
                .map(field_object)
                .collect(),
        ),
        ("interfaces", TypeDefinition::Object(object)) => interface_handles(schema, &object.interfaces),
        ("interfaces", TypeDefinition::Interface(interface)) => interface_handles(schema, &interface.interfaces),
        ("possibleTypes", TypeDefinition::Interface(_) | TypeDefinition::Union(_)) => Value::Array(
            schema
                .possible_types(definition.name())
                .into_iter()
                .filter_map(|name| schema.type_definition(name))
                .filter(|object| is_visible(object.directives(), IntrospectionElement::Type(object)))
                .map(|object| type_handle(object.name()))
                .collect(),
        ),
        ("enumValues", TypeDefinition::Enum(enum_type)) => Value::Array(
            enum_type
                .values
                .values()
                .filter(|value| is_visible(&value.directives, IntrospectionElement::EnumValue(value)))
                .filter_map(|value| {
                    let (is_deprecated, deprecation_reason) = deprecation(&value.directives);
                    (include_deprecated || !is_deprecated).then(|| {
                        json!({
                            "name": value.name,
                            "description": value.description,
                            "isDeprecated": is_deprecated,
                            "deprecationReason": deprecation_reason,
                        })
                    })
                })
                .collect(),
        ),
        ("inputFields", TypeDefinition::InputObject(input_object)) => Value::Array(
            input_values(&input_object.fields)
                .into_iter()
                .filter(|value| include_deprecated || value["isDeprecated"] != Value::Bool(true))
                .collect(),
        ),
        _ => Value::Null,
    }
}

fn interface_handles(schema: &Schema, interfaces: &[String]) -> Value {
    Value::Array(
        interfaces
            .iter()
            .filter_map(|name| schema.type_definition(name))
            .filter(|interface| is_visible(interface.directives(), IntrospectionElement::Type(interface)))
            .map(|interface| type_handle(interface.name()))
            .collect(),
    )
}

fn field_object(field: &FieldDefinition) -> Value {
    let (is_deprecated, deprecation_reason) = deprecation(&field.directives);
    json!({
        "name": field.name,
        "description": field.description,
        ARGS: input_values(&field.arguments),
        "type": type_handle(&field.ty),
        "isDeprecated": is_deprecated,
        "deprecationReason": deprecation_reason,
    })
}

/// Visible input values, deprecated ones included.
fn input_values(values: &IndexMap<String, InputValueDefinition>) -> Vec<Value> {
    values
        .values()
        .filter(|value| is_visible(&value.directives, IntrospectionElement::InputValue(value)))
        .map(|value| {
            let (is_deprecated, deprecation_reason) = deprecation(&value.directives);
            json!({
                "name": value.name,
                "description": value.description,
                "type": type_handle(&value.ty),
                "defaultValue": value.default_value.as_ref().map(ToString::to_string),
                "isDeprecated": is_deprecated,
                "deprecationReason": deprecation_reason,
            })
        })
        .collect()
}

fn directive_object(directive: &DirectiveDefinition) -> Value {
    json!({
        "name": directive.name,
        "description": directive.description,
        "locations": directive.locations.iter().map(ToString::to_string).collect::<Vec<_>>(),
        ARGS: input_values(&directive.arguments),
        "isRepeatable": directive.is_repeatable,
    })
}
