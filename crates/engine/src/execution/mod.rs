//! Operation preparation and execution.
//!
//! A request goes through parsing, validation, operation selection and variable coercion,
//! any of which fails the whole request. The selected operation is then executed field by
//! field; field failures are recorded and turned into `null`s that bubble up to the nearest
//! nullable position.

mod collect;
mod complete;
mod field;

use std::sync::{Mutex, PoisonError};

use async_graphql_parser::{
    parse_query,
    types::{DocumentOperations, ExecutableDocument, OperationDefinition, OperationType},
    Positioned,
};
use async_graphql_value::Name;
use serde_json::{Map, Value};
use tracing::Instrument;

pub(crate) use collect::FieldCollector;

use crate::{
    coercion::{check_input_depth, coerce_variables},
    directive::{DirectiveContext, OperationRunner, SchemaNext},
    validation, ContextData, ErrorCode, ErrorPath, GraphqlError, Request, Response, Schema,
};

/// A request that passed every request-level check and is ready to run.
pub(crate) struct PreparedOperation {
    pub document: ExecutableDocument,
    pub operation_name: Option<Name>,
    pub operation_type: OperationType,
    pub root_type: String,
    pub variables: Map<String, Value>,
    pub data: ContextData,
    pub root_value: Value,
}

impl PreparedOperation {
    pub fn prepare(schema: &Schema, request: Request) -> Result<Self, Vec<GraphqlError>> {
        let document = parse_query(&request.query).map_err(|error| {
            vec![validation::parser_violation(&error).unwrap_or_else(|| {
                GraphqlError::new(error.to_string(), ErrorCode::OperationParsingError)
                    .with_locations(error.positions())
            })]
        })?;

        let violations = validation::check_rules(schema, &document, Some(&request.query));
        if !violations.is_empty() {
            return Err(violations);
        }

        let (operation_name, operation) = select_operation(&document, request.operation_name.as_deref())?;
        let operation_type = operation.node.ty;

        check_input_depth(&document, &request.variables, schema.settings().max_input_depth)
            .map_err(|error| vec![error])?;

        let Some(root_type) = schema.root_type_name(operation_type) else {
            return Err(vec![GraphqlError::new(
                format!("Schema is not configured to execute {operation_type} operations."),
                ErrorCode::OperationSelectionError,
            )
            .with_location(operation.pos)]);
        };
        let root_type = root_type.to_string();

        let variables = coerce_variables(&schema.types, &operation.node.variable_definitions, &request.variables)?;

        Ok(PreparedOperation {
            document,
            operation_name,
            operation_type,
            root_type,
            variables,
            data: request.data,
            root_value: request.root_value,
        })
    }

    pub fn operation(&self) -> Option<&Positioned<OperationDefinition>> {
        match (&self.document.operations, &self.operation_name) {
            (DocumentOperations::Single(operation), _) => Some(operation),
            (DocumentOperations::Multiple(operations), Some(name)) => operations.get(name),
            (DocumentOperations::Multiple(_), None) => None,
        }
    }
}

fn select_operation<'d>(
    document: &'d ExecutableDocument,
    operation_name: Option<&str>,
) -> Result<(Option<Name>, &'d Positioned<OperationDefinition>), Vec<GraphqlError>> {
    let selected = match (&document.operations, operation_name) {
        (DocumentOperations::Single(operation), None) => Some((None, operation)),
        (DocumentOperations::Multiple(operations), None) if operations.len() == 1 => operations
            .iter()
            .next()
            .map(|(name, operation)| (Some(name.clone()), operation)),
        (DocumentOperations::Multiple(_), None) => {
            return Err(vec![GraphqlError::new(
                "Must provide operation name if query contains multiple operations.",
                ErrorCode::OperationSelectionError,
            )]);
        }
        // A lone anonymous operation never matches a name.
        (DocumentOperations::Single(_), Some(_)) => None,
        (DocumentOperations::Multiple(operations), Some(name)) => operations
            .get_key_value(name)
            .map(|(name, operation)| (Some(name.clone()), operation)),
    };

    selected.ok_or_else(|| {
        vec![GraphqlError::new(
            format!("Unknown operation named \"{}\".", operation_name.unwrap_or_default()),
            ErrorCode::OperationSelectionError,
        )]
    })
}

/// Marks a `null` that must replace the enclosing value, its error being already recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Propagated;

/// Why a value could not be completed.
pub(crate) enum Failure {
    /// Errors not yet recorded. The value becomes `null`.
    Errors(Vec<GraphqlError>),
    /// A non-null descendant failed.
    Propagated,
}

impl From<GraphqlError> for Failure {
    fn from(error: GraphqlError) -> Self {
        Failure::Errors(vec![error])
    }
}

/// Per-request execution state.
pub(crate) struct Executor<'a> {
    pub schema: &'a Schema,
    pub prepared: &'a PreparedOperation,
    pub directive_ctx: DirectiveContext<'a>,
    /// Root fields without resolver evaluate to the parent value, used for subscription events.
    pub event_root: bool,
    /// Failure of the subscription event being executed, raised by its root field.
    event_failure: Option<GraphqlError>,
    errors: Mutex<Vec<GraphqlError>>,
}

impl<'a> Executor<'a> {
    pub fn new(schema: &'a Schema, prepared: &'a PreparedOperation) -> Self {
        Executor {
            schema,
            prepared,
            directive_ctx: DirectiveContext {
                schema,
                data: &prepared.data,
            },
            event_root: prepared.operation_type == OperationType::Subscription,
            event_failure: None,
            errors: Mutex::new(Vec::new()),
        }
    }

    /// Executes a failed subscription event: its root field fails with `error`.
    pub fn with_event_failure(mut self, error: GraphqlError) -> Self {
        self.event_failure = Some(error);
        self
    }

    pub fn record(&self, error: GraphqlError) {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(error);
    }

    pub fn collector(&self) -> FieldCollector<'a, 'a> {
        FieldCollector {
            schema: self.schema,
            document: &self.prepared.document,
            variables: &self.prepared.variables,
        }
    }

    /// Executes the root selection set against `parent`.
    pub async fn run(self, parent: &Value) -> Response {
        let result = match (self.prepared.operation(), self.schema.object(&self.prepared.root_type)) {
            (Some(operation), Some(root)) => {
                let serial = self.prepared.operation_type == OperationType::Mutation;
                let selection_sets = [&operation.node.selection_set];
                self.execute_selection_set(root, &selection_sets, parent, &ErrorPath::default(), serial)
                    .await
            }
            _ => {
                self.record(GraphqlError::internal_server_error());
                Err(Propagated)
            }
        };

        let errors = self.errors.into_inner().unwrap_or_else(PoisonError::into_inner);
        Response::new(result.unwrap_or(Value::Null)).with_errors(errors)
    }
}

struct OperationExecution<'a> {
    schema: &'a Schema,
    prepared: &'a PreparedOperation,
}

#[async_trait::async_trait]
impl OperationRunner for OperationExecution<'_> {
    fn operation_name(&self) -> Option<&str> {
        self.prepared.operation_name.as_ref().map(Name::as_str)
    }

    fn data(&self) -> &ContextData {
        &self.prepared.data
    }

    async fn run(&self) -> Response {
        Executor::new(self.schema, self.prepared)
            .run(&self.prepared.root_value)
            .await
    }
}

impl Schema {
    /// Runs a query or a mutation. Subscriptions go through [`Schema::subscribe`].
    pub async fn execute(&self, request: impl Into<Request>) -> Response {
        let request = request.into();
        let data = request.data.clone();

        let response = match PreparedOperation::prepare(self, request) {
            Ok(prepared) if prepared.operation_type == OperationType::Subscription => Response::from_errors([
                GraphqlError::new(
                    "Subscription operations must be run through a subscription stream.",
                    ErrorCode::OperationSelectionError,
                ),
            ]),
            Ok(prepared) => self.execute_prepared(&prepared).await,
            Err(errors) => {
                tracing::debug!("request rejected with {} error(s)", errors.len());
                Response::from_errors(errors)
            }
        };

        self.coerce_errors(response, &data)
    }

    /// Runs a prepared query or mutation through the schema directives.
    pub(crate) async fn execute_prepared(&self, prepared: &PreparedOperation) -> Response {
        let span = tracing::info_span!(
            "execute",
            operation.name = prepared.operation_name.as_ref().map(Name::as_str),
            operation.kind = %prepared.operation_type,
        );

        let runner = OperationExecution { schema: self, prepared };
        SchemaNext {
            chain: &self.schema_directives,
            runner: &runner,
        }
        .run()
        .instrument(span)
        .await
    }

    /// Checks a document against the validation rules, without executing it.
    pub fn validate(&self, query: &str) -> Vec<GraphqlError> {
        match parse_query(query) {
            Ok(document) => validation::check_rules(self, &document, Some(query)),
            Err(error) => vec![validation::parser_violation(&error).unwrap_or_else(|| {
                GraphqlError::new(error.to_string(), ErrorCode::OperationParsingError).with_locations(error.positions())
            })],
        }
    }

    pub(crate) fn coerce_errors(&self, mut response: Response, data: &ContextData) -> Response {
        response.errors = response
            .errors
            .into_iter()
            .map(|error| self.error_coercer.coerce(error, data))
            .collect();
        response
    }
}
