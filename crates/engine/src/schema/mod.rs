mod builder;
mod builtins;
mod error;
mod type_ref;
mod types;

use std::{collections::HashMap, ops::Deref, sync::Arc};

use async_graphql_parser::types::OperationType;
use indexmap::IndexMap;

pub use builder::SchemaBuilder;
pub use error::{SchemaError, SchemaErrors};
pub use type_ref::TypeRef;
pub use types::*;

use crate::{error_coercer::ErrorCoercer, Settings};

/// A built schema. Cheap to clone, immutable, and shareable across threads.
#[derive(Clone)]
pub struct Schema(Arc<SchemaInner>);

pub struct SchemaInner {
    pub(crate) types: IndexMap<String, TypeDefinition>,
    pub(crate) directives: IndexMap<String, DirectiveDefinition>,
    pub(crate) query_type: String,
    pub(crate) mutation_type: Option<String>,
    pub(crate) subscription_type: Option<String>,
    /// Directives of the `schema` definition, wrapping whole operations.
    pub(crate) schema_directives: Vec<DirectiveUsage>,
    /// Object types behind every interface and union, in declaration order.
    pub(crate) possible_types: HashMap<String, Vec<String>>,
    pub(crate) settings: Settings,
    pub(crate) error_coercer: Arc<dyn ErrorCoercer>,
}

impl Deref for Schema {
    type Target = SchemaInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }
}

impl SchemaInner {
    pub fn types(&self) -> impl Iterator<Item = &TypeDefinition> + '_ {
        self.types.values()
    }

    pub fn type_definition(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    pub fn object(&self, name: &str) -> Option<&ObjectType> {
        match self.types.get(name) {
            Some(TypeDefinition::Object(object)) => Some(object),
            _ => None,
        }
    }

    pub fn directives(&self) -> impl Iterator<Item = &DirectiveDefinition> + '_ {
        self.directives.values()
    }

    pub fn directive(&self, name: &str) -> Option<&DirectiveDefinition> {
        self.directives.get(name)
    }

    pub fn query_type(&self) -> &str {
        &self.query_type
    }

    pub fn mutation_type(&self) -> Option<&str> {
        self.mutation_type.as_deref()
    }

    pub fn subscription_type(&self) -> Option<&str> {
        self.subscription_type.as_deref()
    }

    pub fn root_type_name(&self, operation: OperationType) -> Option<&str> {
        match operation {
            OperationType::Query => Some(&self.query_type),
            OperationType::Mutation => self.mutation_type.as_deref(),
            OperationType::Subscription => self.subscription_type.as_deref(),
        }
    }

    pub fn root_type(&self, operation: OperationType) -> Option<&ObjectType> {
        self.root_type_name(operation).and_then(|name| self.object(name))
    }

    /// Object types an interface or union may resolve to. An object type is its own single
    /// possible type.
    pub fn possible_types<'a>(&'a self, name: &'a str) -> Vec<&'a str> {
        match self.possible_types.get(name) {
            Some(types) => types.iter().map(String::as_str).collect(),
            None if self.object(name).is_some() => vec![name],
            None => Vec::new(),
        }
    }

    pub fn is_possible_type(&self, abstract_type: &str, object: &str) -> bool {
        abstract_type == object
            || self
                .possible_types
                .get(abstract_type)
                .is_some_and(|types| types.iter().any(|ty| ty == object))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
