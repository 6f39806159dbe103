//! Directive implementations and the hooks they can intercept.
//!
//! Every hook receives the arguments of the usage it was bound to and a `next` continuation
//! running the rest of the chain. Chains are the directive usages of one element in
//! declaration order, the last declared one running outermost. A hook may call `next`,
//! replace its input or output, or fail without calling it at all.

mod builtins;
mod next;

use futures::stream::BoxStream;
use serde_json::{Map, Value};

pub(crate) use builtins::NonIntrospectable;
pub(crate) use next::{OperationRunner, Terminal, ValueHook};
pub use next::{ArgumentNext, FieldNext, SchemaNext, SubscriptionNext, ValueNext};

use crate::{
    schema::{EnumValue, FieldDefinition, InputValueDefinition, TypeDefinition},
    ContextData, GraphqlResult, ResolveInfo, Response, Schema,
};

/// Shared state visible to value coercion hooks.
pub struct DirectiveContext<'a> {
    pub schema: &'a Schema,
    pub data: &'a ContextData,
}

/// A schema element about to be listed by introspection.
#[derive(Clone, Copy)]
pub enum IntrospectionElement<'a> {
    Type(&'a TypeDefinition),
    Field {
        parent_type: &'a str,
        field: &'a FieldDefinition,
    },
    InputValue(&'a InputValueDefinition),
    EnumValue(&'a EnumValue),
}

impl IntrospectionElement<'_> {
    pub fn name(&self) -> &str {
        match self {
            IntrospectionElement::Type(ty) => ty.name(),
            IntrospectionElement::Field { field, .. } => &field.name,
            IntrospectionElement::InputValue(value) => &value.name,
            IntrospectionElement::EnumValue(value) => &value.name,
        }
    }
}

/// Behavior bound to a directive name with [`crate::SchemaBuilder::directive`].
///
/// Every hook defaults to handing over to `next` unchanged.
#[async_trait::async_trait]
pub trait DirectiveImplementation: Send + Sync {
    /// Wraps the resolution of a field. Runs for usages on the field definition and for the
    /// directives written on the field in the query document, the latter outermost.
    async fn on_field_execution(
        &self,
        arguments: &Map<String, Value>,
        next: FieldNext<'_>,
        parent: &Value,
        field_arguments: &Map<String, Value>,
        info: &ResolveInfo<'_>,
    ) -> GraphqlResult<Value> {
        let _ = (arguments, info);
        next.run(parent, field_arguments).await
    }

    /// Wraps the final value of an argument. `Ok(None)` leaves the argument out of the map
    /// handed to the resolver.
    async fn on_argument_execution(
        &self,
        arguments: &Map<String, Value>,
        next: ArgumentNext<'_>,
        argument: &InputValueDefinition,
        info: &ResolveInfo<'_>,
    ) -> GraphqlResult<Option<Value>> {
        let _ = (arguments, argument, info);
        next.run().await
    }

    /// Runs on an input value once it has been structurally coerced.
    async fn on_post_input_coercion(
        &self,
        arguments: &Map<String, Value>,
        next: ValueNext<'_>,
        value: Value,
        ctx: &DirectiveContext<'_>,
    ) -> GraphqlResult<Value> {
        let _ = (arguments, ctx);
        next.run(value).await
    }

    /// Runs on a resolved value before it is serialized.
    async fn on_pre_output_coercion(
        &self,
        arguments: &Map<String, Value>,
        next: ValueNext<'_>,
        value: Value,
        ctx: &DirectiveContext<'_>,
    ) -> GraphqlResult<Value> {
        let _ = (arguments, ctx);
        next.run(value).await
    }

    /// Whether the element shows up in introspection results.
    fn on_introspection(&self, arguments: &Map<String, Value>, element: IntrospectionElement<'_>) -> bool {
        let _ = (arguments, element);
        true
    }

    /// Wraps a whole query or mutation. Bound through usages on the `schema` definition.
    async fn on_schema_execution(&self, arguments: &Map<String, Value>, next: SchemaNext<'_>) -> Response {
        let _ = arguments;
        next.run().await
    }

    /// Wraps the response stream of a subscription. Bound through usages on the `schema`
    /// definition.
    fn on_schema_subscription(
        &self,
        arguments: &Map<String, Value>,
        next: SubscriptionNext,
    ) -> BoxStream<'static, Response> {
        let _ = arguments;
        next.run()
    }
}
