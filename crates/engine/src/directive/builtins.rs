use serde_json::{Map, Value};

use super::{DirectiveImplementation, IntrospectionElement};

/// `@nonIntrospectable`
pub(crate) struct NonIntrospectable;

#[async_trait::async_trait]
impl DirectiveImplementation for NonIntrospectable {
    fn on_introspection(&self, _: &Map<String, Value>, element: IntrospectionElement<'_>) -> bool {
        tracing::trace!("hiding {} from introspection", element.name());
        false
    }
}
