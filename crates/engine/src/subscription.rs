use std::sync::Arc;

use async_graphql_parser::types::OperationType;
use futures::{
    stream::{self, BoxStream},
    StreamExt,
};
use serde_json::Value;
use tracing::Instrument;

use crate::{
    directive::SubscriptionNext,
    execution::{Executor, PreparedOperation},
    ErrorPath, GraphqlError, GraphqlResult, Request, ResolveInfo, Response, Schema,
};

type EventStream = BoxStream<'static, GraphqlResult<Value>>;

impl Schema {
    /// Runs a subscription, producing one response per event of its root field.
    ///
    /// Request-level failures produce a single error response, and so do queries and
    /// mutations, which are executed once. The stream is lazy: nothing happens until it is
    /// polled, and dropping it drops the underlying event source.
    pub fn subscribe(&self, request: impl Into<Request>) -> BoxStream<'static, Response> {
        let request = request.into();
        let data = request.data.clone();

        let source = stream::once(create_source(self.clone(), request)).flatten().boxed();
        let responses = SubscriptionNext {
            chain: self.schema_directives.clone(),
            source,
        }
        .run();

        let schema = self.clone();
        responses
            .map(move |response| schema.coerce_errors(response, &data))
            .boxed()
    }
}

async fn create_source(schema: Schema, request: Request) -> BoxStream<'static, Response> {
    let prepared = match PreparedOperation::prepare(&schema, request) {
        Ok(prepared) => prepared,
        Err(errors) => return single(Response::from_errors(errors)),
    };

    if prepared.operation_type != OperationType::Subscription {
        let response = schema.execute_prepared(&prepared).await;
        return single(response);
    }

    let span = tracing::info_span!(
        "subscribe",
        operation.name = prepared.operation_name.as_ref().map(|name| name.as_str()),
    );

    let events = match subscribe_root(&schema, &prepared).instrument(span).await {
        Ok(events) => events,
        Err(error) => return single(Response::from_errors([error])),
    };

    let prepared = Arc::new(prepared);
    events
        .then(move |event| {
            let schema = schema.clone();
            let prepared = Arc::clone(&prepared);
            async move {
                let executor = Executor::new(&schema, &prepared);
                match event {
                    Ok(event) => executor.run(&event).await,
                    Err(error) => {
                        tracing::debug!("subscription event source failed: {error}");
                        executor.with_event_failure(error).run(&Value::Null).await
                    }
                }
            }
        })
        .boxed()
}

/// Opens the event stream of the single root field of a subscription.
async fn subscribe_root(schema: &Schema, prepared: &PreparedOperation) -> GraphqlResult<EventStream> {
    let executor = Executor::new(schema, prepared);

    let (Some(operation), Some(root)) = (prepared.operation(), schema.object(&prepared.root_type)) else {
        return Err(GraphqlError::internal_server_error());
    };

    let grouped = executor.collector().collect(root, &[&operation.node.selection_set]);
    let Some((response_key, field)) = grouped
        .iter()
        .next()
        .and_then(|(key, fields)| Some((*key, *fields.first()?)))
    else {
        return Err(GraphqlError::field("A subscription must select one top level field.")
            .with_location(operation.pos));
    };

    let name = field.node.name.node.as_str();
    let path = ErrorPath::from(response_key);

    let Some(definition) = root.fields.get(name) else {
        return Err(
            GraphqlError::field(format!("Cannot query field \"{name}\" on type \"{}\".", root.name))
                .with_location(field.pos)
                .with_path(path),
        );
    };

    let Some(subscription) = &definition.subscription else {
        return Err(GraphqlError::field(format!(
            "Subscription field \"{}.{name}\" has no event source.",
            root.name
        ))
        .with_location(field.pos)
        .with_path(path));
    };

    let info = ResolveInfo {
        schema,
        parent_type: &root.name,
        field: definition,
        path: &path,
        data: &prepared.data,
        variables: &prepared.variables,
        response_key,
        location: field.pos.into(),
    };

    let arguments = executor.coerce_arguments(definition, field, &info).await?;
    let events = subscription
        .subscribe(&prepared.root_value, &arguments, &info)
        .await
        .map_err(|error| {
            let error = error.with_path_if_missing(&path);
            if error.locations.is_empty() {
                error.with_location(field.pos)
            } else {
                error
            }
        })?;

    Ok(events)
}

fn single(response: Response) -> BoxStream<'static, Response> {
    stream::once(async move { response }).boxed()
}
