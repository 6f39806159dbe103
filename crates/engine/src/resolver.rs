//! Resolver contracts: how field values, subscription event streams and the runtime types of
//! abstract values are produced.

use std::{future::Future, marker::PhantomData};

use futures::{stream::BoxStream, Stream, StreamExt};
use serde_json::{Map, Value};

use crate::{ContextData, ErrorPath, FieldDefinition, GraphqlResult, Location, Schema};

/// Everything known about the field being resolved.
pub struct ResolveInfo<'a> {
    pub schema: &'a Schema,
    pub parent_type: &'a str,
    pub field: &'a FieldDefinition,
    pub path: &'a ErrorPath,
    pub data: &'a ContextData,
    pub variables: &'a Map<String, Value>,
    /// Alias or field name, the key under which the value lands in the response.
    pub response_key: &'a str,
    pub location: Location,
}

/// Produces the value of a field, from its parent value and coerced arguments.
#[async_trait::async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(&self, parent: &Value, arguments: &Map<String, Value>, info: &ResolveInfo<'_>)
        -> GraphqlResult<Value>;
}

/// Produces the event stream of a subscription root field.
#[async_trait::async_trait]
pub trait SubscriptionResolver: Send + Sync {
    async fn subscribe(
        &self,
        parent: &Value,
        arguments: &Map<String, Value>,
        info: &ResolveInfo<'_>,
    ) -> GraphqlResult<BoxStream<'static, GraphqlResult<Value>>>;
}

/// Owned view of a resolver call, handed to closures registered with [`resolver_fn`] and
/// [`subscription_fn`].
#[derive(Debug, Clone)]
pub struct ResolverContext {
    pub parent: Value,
    pub arguments: Map<String, Value>,
    pub path: ErrorPath,
    pub parent_type: String,
    pub field_name: String,
    data: ContextData,
}

impl ResolverContext {
    fn new(parent: &Value, arguments: &Map<String, Value>, info: &ResolveInfo<'_>) -> Self {
        ResolverContext {
            parent: parent.clone(),
            arguments: arguments.clone(),
            path: info.path.clone(),
            parent_type: info.parent_type.to_string(),
            field_name: info.field.name.clone(),
            data: info.data.clone(),
        }
    }

    pub fn data<T: std::any::Any + Send + Sync>(&self) -> Option<&T> {
        self.data.get::<T>()
    }

    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name)
    }
}

pub struct FnResolver<F, Fut> {
    function: F,
    _future: PhantomData<fn() -> Fut>,
}

/// Wraps an async closure into a [`Resolver`].
pub fn resolver_fn<F, Fut>(function: F) -> FnResolver<F, Fut>
where
    F: Fn(ResolverContext) -> Fut + Send + Sync,
    Fut: Future<Output = GraphqlResult<Value>> + Send,
{
    FnResolver {
        function,
        _future: PhantomData,
    }
}

#[async_trait::async_trait]
impl<F, Fut> Resolver for FnResolver<F, Fut>
where
    F: Fn(ResolverContext) -> Fut + Send + Sync,
    Fut: Future<Output = GraphqlResult<Value>> + Send,
{
    async fn resolve(
        &self,
        parent: &Value,
        arguments: &Map<String, Value>,
        info: &ResolveInfo<'_>,
    ) -> GraphqlResult<Value> {
        (self.function)(ResolverContext::new(parent, arguments, info)).await
    }
}

pub struct FnSubscription<F, Fut> {
    function: F,
    _future: PhantomData<fn() -> Fut>,
}

/// Wraps an async closure returning a stream into a [`SubscriptionResolver`].
pub fn subscription_fn<F, Fut, S>(function: F) -> FnSubscription<F, Fut>
where
    F: Fn(ResolverContext) -> Fut + Send + Sync,
    Fut: Future<Output = GraphqlResult<S>> + Send,
    S: Stream<Item = GraphqlResult<Value>> + Send + 'static,
{
    FnSubscription {
        function,
        _future: PhantomData,
    }
}

#[async_trait::async_trait]
impl<F, Fut, S> SubscriptionResolver for FnSubscription<F, Fut>
where
    F: Fn(ResolverContext) -> Fut + Send + Sync,
    Fut: Future<Output = GraphqlResult<S>> + Send,
    S: Stream<Item = GraphqlResult<Value>> + Send + 'static,
{
    async fn subscribe(
        &self,
        parent: &Value,
        arguments: &Map<String, Value>,
        info: &ResolveInfo<'_>,
    ) -> GraphqlResult<BoxStream<'static, GraphqlResult<Value>>> {
        let stream = (self.function)(ResolverContext::new(parent, arguments, info)).await?;
        Ok(stream.boxed())
    }
}

/// Reads the field from the parent object, `null` when absent.
pub(crate) struct DefaultResolver;

#[async_trait::async_trait]
impl Resolver for DefaultResolver {
    async fn resolve(&self, parent: &Value, _: &Map<String, Value>, info: &ResolveInfo<'_>) -> GraphqlResult<Value> {
        Ok(parent.get(info.field.name.as_str()).cloned().unwrap_or(Value::Null))
    }
}

/// Subscription root fields without a resolver evaluate to the event itself.
pub(crate) struct EventResolver;

#[async_trait::async_trait]
impl Resolver for EventResolver {
    async fn resolve(&self, parent: &Value, _: &Map<String, Value>, _: &ResolveInfo<'_>) -> GraphqlResult<Value> {
        Ok(parent.clone())
    }
}

pub struct TypeResolverContext<'a> {
    pub schema: &'a Schema,
    pub abstract_type: &'a str,
    pub data: &'a ContextData,
}

/// Determines the concrete object type of a value returned for an interface or union.
pub trait TypeResolver: Send + Sync {
    fn resolve_type(&self, value: &Value, ctx: &TypeResolverContext<'_>) -> Option<String>;
}

impl<F> TypeResolver for F
where
    F: Fn(&Value, &TypeResolverContext<'_>) -> Option<String> + Send + Sync,
{
    fn resolve_type(&self, value: &Value, ctx: &TypeResolverContext<'_>) -> Option<String> {
        self(value, ctx)
    }
}

/// Reads the `__typename` key of the value. Used when no type resolver was registered.
pub struct TypenameDiscriminator;

impl TypeResolver for TypenameDiscriminator {
    fn resolve_type(&self, value: &Value, _: &TypeResolverContext<'_>) -> Option<String> {
        value.get("__typename").and_then(Value::as_str).map(str::to_string)
    }
}
