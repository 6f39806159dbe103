use std::sync::Arc;

use futures::{future::BoxFuture, stream::BoxStream, FutureExt};
use serde_json::{Map, Value};

use super::{DirectiveContext, DirectiveImplementation};
use crate::{
    schema::{DirectiveUsage, EnumType, InputValueDefinition, ScalarType},
    ContextData, GraphqlError, GraphqlResult, ResolveInfo, Resolver, Response,
};

type Outermost<'a> = (&'a DirectiveUsage, &'a Arc<dyn DirectiveImplementation>, &'a [DirectiveUsage]);

/// Splits off the outermost usage that has an implementation.
fn split_outermost(mut chain: &[DirectiveUsage]) -> Option<Outermost<'_>> {
    while let Some((usage, rest)) = chain.split_last() {
        if let Some(implementation) = &usage.implementation {
            return Some((usage, implementation, rest));
        }
        chain = rest;
    }
    None
}

/// Rest of a field execution chain, ending with the field resolver.
#[derive(Clone, Copy)]
pub struct FieldNext<'a> {
    pub(crate) chain: &'a [DirectiveUsage],
    pub(crate) resolver: &'a dyn Resolver,
    pub(crate) info: &'a ResolveInfo<'a>,
}

impl<'a> FieldNext<'a> {
    pub async fn run(self, parent: &Value, arguments: &Map<String, Value>) -> GraphqlResult<Value> {
        match split_outermost(self.chain) {
            Some((usage, implementation, rest)) => {
                let next = FieldNext { chain: rest, ..self };
                implementation
                    .on_field_execution(&usage.arguments, next, parent, arguments, self.info)
                    .await
            }
            None => self.resolver.resolve(parent, arguments, self.info).await,
        }
    }
}

/// Rest of an argument chain, ending with the coerced argument value.
#[derive(Clone, Copy)]
pub struct ArgumentNext<'a> {
    pub(crate) chain: &'a [DirectiveUsage],
    pub(crate) argument: &'a InputValueDefinition,
    pub(crate) info: &'a ResolveInfo<'a>,
    pub(crate) value: &'a GraphqlResult<Option<Value>>,
}

impl<'a> ArgumentNext<'a> {
    pub async fn run(self) -> GraphqlResult<Option<Value>> {
        match split_outermost(self.chain) {
            Some((usage, implementation, rest)) => {
                let next = ArgumentNext { chain: rest, ..self };
                implementation
                    .on_argument_execution(&usage.arguments, next, self.argument, self.info)
                    .await
            }
            None => self.value.clone(),
        }
    }
}

/// What a value chain does once every directive ran.
#[derive(Clone, Copy)]
pub(crate) enum Terminal<'a> {
    Identity,
    /// Output coercion of a scalar.
    Scalar(&'a ScalarType),
    /// Runs the chain of the enum value matching the value. Serializing also rejects values
    /// the enum doesn't declare.
    Enum { ty: &'a EnumType, serialize: bool },
}

#[derive(Clone, Copy)]
pub(crate) enum ValueHook {
    PostInputCoercion,
    PreOutputCoercion,
}

/// Rest of an input or output value chain.
#[derive(Clone, Copy)]
pub struct ValueNext<'a> {
    pub(crate) chain: &'a [DirectiveUsage],
    pub(crate) hook: ValueHook,
    pub(crate) terminal: Terminal<'a>,
    pub(crate) ctx: &'a DirectiveContext<'a>,
}

impl<'a> ValueNext<'a> {
    pub(crate) fn new(
        chain: &'a [DirectiveUsage],
        hook: ValueHook,
        terminal: Terminal<'a>,
        ctx: &'a DirectiveContext<'a>,
    ) -> Self {
        ValueNext {
            chain,
            hook,
            terminal,
            ctx,
        }
    }

    pub fn run(self, value: Value) -> BoxFuture<'a, GraphqlResult<Value>> {
        async move {
            let Some((usage, implementation, rest)) = split_outermost(self.chain) else {
                return self.terminal(value).await;
            };

            let next = ValueNext { chain: rest, ..self };
            match self.hook {
                ValueHook::PostInputCoercion => {
                    implementation
                        .on_post_input_coercion(&usage.arguments, next, value, self.ctx)
                        .await
                }
                ValueHook::PreOutputCoercion => {
                    implementation
                        .on_pre_output_coercion(&usage.arguments, next, value, self.ctx)
                        .await
                }
            }
        }
        .boxed()
    }

    async fn terminal(self, value: Value) -> GraphqlResult<Value> {
        match self.terminal {
            Terminal::Identity => Ok(value),
            Terminal::Scalar(scalar) => {
                if value.is_null() {
                    return Ok(value);
                }
                scalar
                    .implementation
                    .coerce_output(&value)
                    .map_err(GraphqlError::field)
            }
            Terminal::Enum { ty, serialize } => {
                let Some(enum_value) = value.as_str().and_then(|name| ty.values.get(name)) else {
                    if serialize && !value.is_null() {
                        return Err(GraphqlError::field(format!(
                            "Enum \"{}\" cannot represent value: {value}",
                            ty.name
                        )));
                    }
                    return Ok(value);
                };

                ValueNext {
                    chain: &enum_value.directives,
                    terminal: Terminal::Identity,
                    ..self
                }
                .run(value)
                .await
            }
        }
    }
}

/// The operation behind a [`SchemaNext`] chain.
#[async_trait::async_trait]
pub(crate) trait OperationRunner: Send + Sync {
    fn operation_name(&self) -> Option<&str>;

    fn data(&self) -> &ContextData;

    async fn run(&self) -> Response;
}

/// Rest of a schema execution chain, ending with the execution of the operation.
#[derive(Clone, Copy)]
pub struct SchemaNext<'a> {
    pub(crate) chain: &'a [DirectiveUsage],
    pub(crate) runner: &'a dyn OperationRunner,
}

impl<'a> SchemaNext<'a> {
    pub fn operation_name(&self) -> Option<&str> {
        self.runner.operation_name()
    }

    pub fn data(&self) -> &ContextData {
        self.runner.data()
    }

    pub async fn run(self) -> Response {
        match split_outermost(self.chain) {
            Some((usage, implementation, rest)) => {
                let next = SchemaNext { chain: rest, ..self };
                implementation.on_schema_execution(&usage.arguments, next).await
            }
            None => self.runner.run().await,
        }
    }
}

/// Rest of a subscription chain, ending with the stream of responses.
pub struct SubscriptionNext {
    pub(crate) chain: Vec<DirectiveUsage>,
    pub(crate) source: BoxStream<'static, Response>,
}

impl SubscriptionNext {
    pub fn run(mut self) -> BoxStream<'static, Response> {
        while let Some(usage) = self.chain.pop() {
            if let Some(implementation) = usage.implementation.clone() {
                return implementation.on_schema_subscription(&usage.arguments, self);
            }
        }
        self.source
    }
}
