use std::borrow::Cow;

use async_graphql_parser::{
    types::{Field, SelectionSet},
    Pos, Positioned,
};
use futures::{future::BoxFuture, FutureExt};
use futures_util::future::join_all;
use serde_json::{Map, Value};

use super::{Executor, Failure, Propagated};
use crate::{
    coercion::{InputCoercer, InputSource, InputValueError},
    directive::{ArgumentNext, FieldNext, Terminal, ValueHook, ValueNext},
    resolver::{DefaultResolver, EventResolver},
    schema::{DirectiveUsage, FieldDefinition, InputValueDefinition, ObjectType, TypeDefinition, TypeRef},
    ErrorPath, GraphqlError, GraphqlResult, ResolveInfo, Resolver,
};

/// The field being completed, with every occurrence merged under its response key.
pub(super) struct FieldContext<'a, 'f> {
    pub parent_type: &'a str,
    pub definition: &'a FieldDefinition,
    pub fields: &'f [&'a Positioned<Field>],
    pub location: Pos,
}

impl<'a> Executor<'a> {
    pub(super) async fn execute_selection_set(
        &self,
        object: &'a ObjectType,
        selection_sets: &[&'a Positioned<SelectionSet>],
        parent: &Value,
        path: &ErrorPath,
        serial: bool,
    ) -> Result<Value, Propagated> {
        let grouped = self.collector().collect(object, selection_sets);
        let mut data = Map::new();

        if serial {
            for (key, fields) in &grouped {
                let value = self.execute_field(object, key, fields, parent, path).await?;
                data.insert(key.to_string(), value);
            }
        } else {
            let results = join_all(
                grouped
                    .iter()
                    .map(|(key, fields)| self.execute_field(object, key, fields, parent, path)),
            )
            .await;

            for (key, result) in grouped.keys().zip(results) {
                data.insert(key.to_string(), result?);
            }
        }

        Ok(Value::Object(data))
    }

    async fn execute_field(
        &self,
        object: &'a ObjectType,
        response_key: &'a str,
        fields: &[&'a Positioned<Field>],
        parent: &Value,
        path: &ErrorPath,
    ) -> Result<Value, Propagated> {
        let Some(first) = fields.first() else {
            return Ok(Value::Null);
        };
        let name = first.node.name.node.as_str();
        let path = path.child(response_key);

        if name == "__typename" {
            return Ok(Value::String(object.name.clone()));
        }

        let Some(definition) = object.fields.get(name) else {
            self.record(
                GraphqlError::field(format!("Cannot query field \"{name}\" on type \"{}\".", object.name))
                    .with_location(first.pos)
                    .with_path(path),
            );
            return Ok(Value::Null);
        };

        let field = FieldContext {
            parent_type: &object.name,
            definition,
            fields,
            location: first.pos,
        };
        let info = ResolveInfo {
            schema: self.schema,
            parent_type: &object.name,
            field: definition,
            path: &path,
            data: &self.prepared.data,
            variables: &self.prepared.variables,
            response_key,
            location: first.pos.into(),
        };

        if let Some(error) = self.event_failure.as_ref().filter(|_| path.len() == 1) {
            return self.settle(&field, &definition.ty, Err(Failure::from(error.clone())), &path);
        }

        tracing::trace!("resolving {}.{name} at {path}", object.name);

        match self.resolve_field(&field, parent, &info).await {
            Ok(value) => self.complete_value(&field, &definition.ty, value, path.clone()).await,
            Err(error) => self.settle(&field, &definition.ty, Err(Failure::from(error)), &path),
        }
    }

    /// Runs the field execution chain, then the output hooks of the field definition.
    async fn resolve_field(
        &self,
        field: &FieldContext<'a, '_>,
        parent: &Value,
        info: &ResolveInfo<'_>,
    ) -> GraphqlResult<Value> {
        let Some(first) = field.fields.first() else {
            return Ok(Value::Null);
        };
        check_mergeable(info.response_key, field.fields)?;

        let definition = field.definition;
        let arguments = self.coerce_arguments(definition, first, info).await?;

        let document_directives = self.document_directives(first)?;
        let chain = if document_directives.is_empty() {
            Cow::Borrowed(definition.directives.as_slice())
        } else {
            Cow::Owned(
                definition
                    .directives
                    .iter()
                    .cloned()
                    .chain(document_directives)
                    .collect::<Vec<_>>(),
            )
        };

        let resolver: &dyn Resolver = match &definition.resolver {
            Some(resolver) => resolver.as_ref(),
            None if self.event_root && info.path.len() == 1 => &EventResolver,
            None => &DefaultResolver,
        };

        let value = FieldNext {
            chain: &chain,
            resolver,
            info,
        }
        .run(parent, &arguments)
        .await?;

        ValueNext::new(
            &definition.directives,
            ValueHook::PreOutputCoercion,
            Terminal::Identity,
            &self.directive_ctx,
        )
        .run(value)
        .await
    }

    /// Coerces the arguments of a field, then runs their post-coercion and execution hooks.
    pub(crate) async fn coerce_arguments(
        &self,
        definition: &FieldDefinition,
        field: &Positioned<Field>,
        info: &ResolveInfo<'_>,
    ) -> GraphqlResult<Map<String, Value>> {
        let mut arguments = Map::new();

        for argument in definition.arguments.values() {
            let literal = field.node.get_argument(&argument.name);
            let coerced = InputCoercer::new(&self.schema.types)
                .with_variables(&self.prepared.variables)
                .coerce_input_value(argument, literal.map(|literal| InputSource::Literal(&literal.node)))
                .map_err(|failures| argument_error(argument, literal, failures, field.pos))?;

            let value = match coerced {
                Some(value) => self.post_input_argument(argument, value).await.map(Some),
                None => Ok(None),
            };

            let value = ArgumentNext {
                chain: &argument.directives,
                argument,
                info,
                value: &value,
            }
            .run()
            .await?;

            if let Some(value) = value {
                arguments.insert(argument.name.clone(), value);
            }
        }

        Ok(arguments)
    }

    async fn post_input_argument(&self, argument: &InputValueDefinition, value: Value) -> GraphqlResult<Value> {
        let value = self.apply_post_input(&argument.ty, value).await?;
        ValueNext::new(
            &argument.directives,
            ValueHook::PostInputCoercion,
            Terminal::Identity,
            &self.directive_ctx,
        )
        .run(value)
        .await
    }

    /// Runs `on_post_input_coercion` hooks bottom-up over a structurally coerced value: input
    /// fields first, then their input object, and for every named type its own usages.
    fn apply_post_input<'b>(&'b self, ty: &'b TypeRef, value: Value) -> BoxFuture<'b, GraphqlResult<Value>> {
        async move {
            if value.is_null() {
                return Ok(value);
            }

            let name = match ty {
                TypeRef::NonNull(inner) => return self.apply_post_input(inner, value).await,
                TypeRef::List(inner) => {
                    let Value::Array(items) = value else {
                        return self.apply_post_input(inner, value).await;
                    };
                    let mut coerced = Vec::with_capacity(items.len());
                    for item in items {
                        coerced.push(self.apply_post_input(inner, item).await?);
                    }
                    return Ok(Value::Array(coerced));
                }
                TypeRef::Named(name) => name,
            };

            let ctx = &self.directive_ctx;
            match self.schema.type_definition(name) {
                Some(TypeDefinition::InputObject(input_object)) => {
                    let Value::Object(mut fields) = value else {
                        return Ok(value);
                    };

                    for (name, slot) in fields.iter_mut() {
                        let Some(field) = input_object.fields.get(name.as_str()) else {
                            continue;
                        };
                        let value = self.apply_post_input(&field.ty, std::mem::take(slot)).await?;
                        *slot = ValueNext::new(&field.directives, ValueHook::PostInputCoercion, Terminal::Identity, ctx)
                            .run(value)
                            .await?;
                    }

                    ValueNext::new(
                        &input_object.directives,
                        ValueHook::PostInputCoercion,
                        Terminal::Identity,
                        ctx,
                    )
                    .run(Value::Object(fields))
                    .await
                }
                Some(TypeDefinition::Enum(enum_type)) => {
                    let terminal = Terminal::Enum {
                        ty: enum_type,
                        serialize: false,
                    };
                    ValueNext::new(&enum_type.directives, ValueHook::PostInputCoercion, terminal, ctx)
                        .run(value)
                        .await
                }
                Some(TypeDefinition::Scalar(scalar)) => {
                    ValueNext::new(&scalar.directives, ValueHook::PostInputCoercion, Terminal::Identity, ctx)
                        .run(value)
                        .await
                }
                _ => Ok(value),
            }
        }
        .boxed()
    }

    /// Directives written on the field in the document, bound to their implementation.
    fn document_directives(&self, field: &Positioned<Field>) -> GraphqlResult<Vec<DirectiveUsage>> {
        let mut usages = Vec::new();

        for directive in &field.node.directives {
            let name = directive.node.name.node.as_str();
            let Some(definition) = self.schema.directive(name) else {
                continue;
            };
            let Some(implementation) = &definition.implementation else {
                continue;
            };

            let mut arguments = Map::new();
            for argument in definition.arguments.values() {
                let literal = directive.node.get_argument(&argument.name);
                let coerced = InputCoercer::new(&self.schema.types)
                    .with_variables(&self.prepared.variables)
                    .coerce_input_value(argument, literal.map(|literal| InputSource::Literal(&literal.node)))
                    .map_err(|failures| {
                        argument_error(argument, literal, failures, directive.pos)
                            .with_extension("directive", name.to_string())
                    })?;

                if let Some(value) = coerced {
                    arguments.insert(argument.name.clone(), value);
                }
            }

            usages.push(DirectiveUsage::bound(name, arguments, implementation.clone()));
        }

        Ok(usages)
    }
}

fn argument_error(
    argument: &InputValueDefinition,
    literal: Option<&Positioned<async_graphql_value::Value>>,
    failures: Vec<InputValueError>,
    field_pos: Pos,
) -> GraphqlError {
    let name = &argument.name;
    let message = match (failures.first(), literal) {
        (Some(failure), _) if failure.is_missing_at_root() => {
            format!("Argument \"{name}\" of required type \"{}\" was not provided.", argument.ty)
        }
        (Some(failure), Some(literal)) => format!("Argument \"{name}\" has invalid value {}; {failure}", literal.node),
        (Some(failure), None) => format!("Argument \"{name}\" has invalid value; {failure}"),
        (None, _) => format!("Argument \"{name}\" has invalid value."),
    };

    GraphqlError::field(message).with_location(literal.map_or(field_pos, |literal| literal.pos))
}

/// Occurrences merged under one response key must describe the same field call.
fn check_mergeable(response_key: &str, fields: &[&Positioned<Field>]) -> GraphqlResult<()> {
    let Some((first, others)) = fields.split_first() else {
        return Ok(());
    };

    let sorted_arguments = |field: &Positioned<Field>| {
        let mut arguments = field
            .node
            .arguments
            .iter()
            .map(|(name, value)| (name.node.as_str().to_string(), value.node.clone()))
            .collect::<Vec<_>>();
        arguments.sort_by(|left, right| left.0.cmp(&right.0));
        arguments
    };
    let expected = sorted_arguments(first);

    for other in others {
        if other.node.name.node != first.node.name.node {
            return Err(GraphqlError::field(format!(
                "Fields \"{response_key}\" conflict because \"{}\" and \"{}\" are different fields.",
                first.node.name.node, other.node.name.node
            ))
            .with_locations([first.pos, other.pos]));
        }

        if sorted_arguments(other) != expected {
            return Err(GraphqlError::field(format!(
                "Fields \"{response_key}\" conflict because they have differing arguments."
            ))
            .with_locations([first.pos, other.pos]));
        }
    }

    Ok(())
}
