use futures::{future::BoxFuture, stream, FutureExt, StreamExt};
use serde_json::Value;

use super::{field::FieldContext, Executor, Failure, Propagated};
use crate::{
    directive::{Terminal, ValueHook, ValueNext},
    schema::{ObjectType, TypeDefinition, TypeRef},
    ErrorPath, GraphqlError, TypeResolver, TypeResolverContext,
};

impl<'a> Executor<'a> {
    /// Completes a resolved value against its declared type. `Err(Propagated)` means the
    /// value was non-null and failed, so the enclosing value must become `null` as well.
    pub(super) fn complete_value<'f>(
        &'f self,
        field: &'f FieldContext<'a, 'f>,
        ty: &'a TypeRef,
        value: Value,
        path: ErrorPath,
    ) -> BoxFuture<'f, Result<Value, Propagated>> {
        async move {
            let result = self.complete_nullable(field, ty.nullable(), value, &path).await;
            self.settle(field, ty, result, &path)
        }
        .boxed()
    }

    /// Records the failures of a position and decides whether its `null` has to bubble up.
    pub(super) fn settle(
        &self,
        field: &FieldContext<'a, '_>,
        ty: &TypeRef,
        result: Result<Value, Failure>,
        path: &ErrorPath,
    ) -> Result<Value, Propagated> {
        let locate = |error: GraphqlError| {
            let error = error.with_path_if_missing(path);
            if error.locations.is_empty() {
                error.with_location(field.location)
            } else {
                error
            }
        };

        let errors = match result {
            Ok(Value::Null) if ty.is_non_null() => vec![GraphqlError::field(format!(
                "Cannot return null for non-nullable field {}.{}.",
                field.parent_type, field.definition.name
            ))],
            Ok(value) => return Ok(value),
            Err(Failure::Errors(errors)) => errors,
            Err(Failure::Propagated) => Vec::new(),
        };

        for error in errors {
            self.record(locate(error));
        }

        if ty.is_non_null() {
            Err(Propagated)
        } else {
            Ok(Value::Null)
        }
    }

    async fn complete_nullable(
        &self,
        field: &FieldContext<'a, '_>,
        ty: &'a TypeRef,
        value: Value,
        path: &ErrorPath,
    ) -> Result<Value, Failure> {
        if value.is_null() {
            return Ok(Value::Null);
        }

        match ty {
            TypeRef::List(item) => self.complete_list(field, item, value, path).await,
            TypeRef::Named(name) => self.complete_named(field, name, value, path).await,
            // Callers strip the outer non-null marker.
            TypeRef::NonNull(_) => Err(GraphqlError::internal_server_error().into()),
        }
    }

    async fn complete_list(
        &self,
        field: &FieldContext<'a, '_>,
        item_ty: &'a TypeRef,
        value: Value,
        path: &ErrorPath,
    ) -> Result<Value, Failure> {
        let Value::Array(items) = value else {
            return Err(GraphqlError::field(format!(
                "Expected Iterable, but did not find one for field \"{}.{}\".",
                field.parent_type, field.definition.name
            ))
            .into());
        };

        let settings = self.schema.settings();
        let concurrent = field
            .definition
            .concurrent_list_items
            .unwrap_or(settings.concurrent_list_items);

        let completions = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| self.complete_value(field, item_ty, item, path.child(index)));

        let results: Vec<_> = if concurrent {
            stream::iter(completions)
                .buffered(settings.max_concurrency.max(1))
                .collect()
                .await
        } else {
            let mut results = Vec::new();
            for completion in completions {
                results.push(completion.await);
            }
            results
        };

        results
            .into_iter()
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
            .map_err(|Propagated| Failure::Propagated)
    }

    async fn complete_named(
        &self,
        field: &FieldContext<'a, '_>,
        name: &str,
        value: Value,
        path: &ErrorPath,
    ) -> Result<Value, Failure> {
        let schema = self.schema;
        let Some(definition) = schema.type_definition(name) else {
            tracing::warn!("type {name} disappeared from the schema");
            return Err(GraphqlError::internal_server_error().into());
        };
        let ctx = &self.directive_ctx;

        match definition {
            TypeDefinition::Scalar(scalar) => Ok(ValueNext::new(
                &scalar.directives,
                ValueHook::PreOutputCoercion,
                Terminal::Scalar(scalar),
                ctx,
            )
            .run(value)
            .await?),
            TypeDefinition::Enum(enum_type) => {
                let terminal = Terminal::Enum {
                    ty: enum_type,
                    serialize: true,
                };
                Ok(ValueNext::new(&enum_type.directives, ValueHook::PreOutputCoercion, terminal, ctx)
                    .run(value)
                    .await?)
            }
            TypeDefinition::Object(object) => self.complete_object(field, object, value, path).await,
            TypeDefinition::Interface(interface) => {
                let value = ValueNext::new(&interface.directives, ValueHook::PreOutputCoercion, Terminal::Identity, ctx)
                    .run(value)
                    .await?;
                let object = self.resolve_abstract(field, &interface.name, interface.type_resolver.as_ref(), &value)?;
                self.complete_object(field, object, value, path).await
            }
            TypeDefinition::Union(union) => {
                let value = ValueNext::new(&union.directives, ValueHook::PreOutputCoercion, Terminal::Identity, ctx)
                    .run(value)
                    .await?;
                let object = self.resolve_abstract(field, &union.name, union.type_resolver.as_ref(), &value)?;
                self.complete_object(field, object, value, path).await
            }
            TypeDefinition::InputObject(_) => Err(GraphqlError::internal_server_error().into()),
        }
    }

    async fn complete_object(
        &self,
        field: &FieldContext<'a, '_>,
        object: &'a ObjectType,
        value: Value,
        path: &ErrorPath,
    ) -> Result<Value, Failure> {
        let value = ValueNext::new(
            &object.directives,
            ValueHook::PreOutputCoercion,
            Terminal::Identity,
            &self.directive_ctx,
        )
        .run(value)
        .await?;

        if value.is_null() {
            return Ok(Value::Null);
        }

        let selection_sets = field
            .fields
            .iter()
            .map(|field| &field.node.selection_set)
            .collect::<Vec<_>>();

        self.execute_selection_set(object, &selection_sets, &value, path, false)
            .await
            .map_err(|Propagated| Failure::Propagated)
    }

    fn resolve_abstract(
        &self,
        field: &FieldContext<'a, '_>,
        abstract_type: &str,
        type_resolver: &dyn TypeResolver,
        value: &Value,
    ) -> Result<&'a ObjectType, GraphqlError> {
        let schema = self.schema;
        let ctx = TypeResolverContext {
            schema,
            abstract_type,
            data: &self.prepared.data,
        };

        let Some(runtime_type) = type_resolver.resolve_type(value, &ctx) else {
            return Err(GraphqlError::field(format!(
                "Abstract type \"{abstract_type}\" must resolve to an Object type at runtime for field \"{}.{}\". \
                 Either the value has a \"__typename\" field or a type resolver must be registered.",
                field.parent_type, field.definition.name
            )));
        };

        match schema.object(&runtime_type) {
            Some(object) if schema.is_possible_type(abstract_type, &runtime_type) => Ok(object),
            _ => Err(GraphqlError::field(format!(
                "Runtime Object type \"{runtime_type}\" is not a possible type for \"{abstract_type}\"."
            ))),
        }
    }
}
