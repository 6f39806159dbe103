use crate::{ContextData, GraphqlError};

/// Last stop of every error before it reaches a response.
///
/// Lets an embedder redact messages or attach extensions without touching the engine.
pub trait ErrorCoercer: Send + Sync {
    fn coerce(&self, error: GraphqlError, data: &ContextData) -> GraphqlError;
}

impl<F> ErrorCoercer for F
where
    F: Fn(GraphqlError, &ContextData) -> GraphqlError + Send + Sync,
{
    fn coerce(&self, error: GraphqlError, data: &ContextData) -> GraphqlError {
        self(error, data)
    }
}

pub(crate) struct IdentityErrorCoercer;

impl ErrorCoercer for IdentityErrorCoercer {
    fn coerce(&self, error: GraphqlError, _data: &ContextData) -> GraphqlError {
        error
    }
}
