use std::sync::Arc;

use async_graphql_value::{ConstValue, Name};
use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::TypeRef;
use crate::{
    directive::DirectiveImplementation,
    resolver::{Resolver, SubscriptionResolver, TypeResolver},
    scalars::ScalarImplementation,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DirectiveLocation {
    Query,
    Mutation,
    Subscription,
    Field,
    FragmentDefinition,
    FragmentSpread,
    InlineFragment,
    VariableDefinition,
    Schema,
    Scalar,
    Object,
    FieldDefinition,
    ArgumentDefinition,
    Interface,
    Union,
    Enum,
    EnumValue,
    InputObject,
    InputFieldDefinition,
}

impl From<async_graphql_parser::types::DirectiveLocation> for DirectiveLocation {
    fn from(location: async_graphql_parser::types::DirectiveLocation) -> Self {
        use async_graphql_parser::types::DirectiveLocation as Ast;

        match location {
            Ast::Query => DirectiveLocation::Query,
            Ast::Mutation => DirectiveLocation::Mutation,
            Ast::Subscription => DirectiveLocation::Subscription,
            Ast::Field => DirectiveLocation::Field,
            Ast::FragmentDefinition => DirectiveLocation::FragmentDefinition,
            Ast::FragmentSpread => DirectiveLocation::FragmentSpread,
            Ast::InlineFragment => DirectiveLocation::InlineFragment,
            Ast::VariableDefinition => DirectiveLocation::VariableDefinition,
            Ast::Schema => DirectiveLocation::Schema,
            Ast::Scalar => DirectiveLocation::Scalar,
            Ast::Object => DirectiveLocation::Object,
            Ast::FieldDefinition => DirectiveLocation::FieldDefinition,
            Ast::ArgumentDefinition => DirectiveLocation::ArgumentDefinition,
            Ast::Interface => DirectiveLocation::Interface,
            Ast::Union => DirectiveLocation::Union,
            Ast::Enum => DirectiveLocation::Enum,
            Ast::EnumValue => DirectiveLocation::EnumValue,
            Ast::InputObject => DirectiveLocation::InputObject,
            Ast::InputFieldDefinition => DirectiveLocation::InputFieldDefinition,
        }
    }
}

/// A directive attached to a schema element, with its arguments already coerced.
#[derive(Clone)]
pub struct DirectiveUsage {
    pub name: String,
    pub arguments: Map<String, Value>,
    pub(crate) raw_arguments: Vec<(Name, ConstValue)>,
    pub(crate) implementation: Option<Arc<dyn DirectiveImplementation>>,
}

impl DirectiveUsage {
    pub(crate) fn new(name: impl Into<String>, raw_arguments: Vec<(Name, ConstValue)>) -> Self {
        DirectiveUsage {
            name: name.into(),
            arguments: Map::new(),
            raw_arguments,
            implementation: None,
        }
    }

    pub(crate) fn bound(
        name: impl Into<String>,
        arguments: Map<String, Value>,
        implementation: Arc<dyn DirectiveImplementation>,
    ) -> Self {
        DirectiveUsage {
            name: name.into(),
            arguments,
            raw_arguments: Vec::new(),
            implementation: Some(implementation),
        }
    }
}

impl std::fmt::Debug for DirectiveUsage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectiveUsage")
            .field("name", &self.name)
            .field("arguments", &self.arguments)
            .field("implemented", &self.implementation.is_some())
            .finish()
    }
}

/// `Some(reason)` when a `@deprecated` usage is present.
pub(crate) fn deprecation_reason(directives: &[DirectiveUsage]) -> Option<Option<&str>> {
    directives
        .iter()
        .find(|directive| directive.name == "deprecated")
        .map(|directive| directive.arguments.get("reason").and_then(Value::as_str))
}

#[derive(Clone)]
pub enum TypeDefinition {
    Scalar(ScalarType),
    Enum(EnumType),
    Object(ObjectType),
    Interface(InterfaceType),
    Union(UnionType),
    InputObject(InputObjectType),
}

impl TypeDefinition {
    pub fn name(&self) -> &str {
        match self {
            TypeDefinition::Scalar(ty) => &ty.name,
            TypeDefinition::Enum(ty) => &ty.name,
            TypeDefinition::Object(ty) => &ty.name,
            TypeDefinition::Interface(ty) => &ty.name,
            TypeDefinition::Union(ty) => &ty.name,
            TypeDefinition::InputObject(ty) => &ty.name,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            TypeDefinition::Scalar(ty) => ty.description.as_deref(),
            TypeDefinition::Enum(ty) => ty.description.as_deref(),
            TypeDefinition::Object(ty) => ty.description.as_deref(),
            TypeDefinition::Interface(ty) => ty.description.as_deref(),
            TypeDefinition::Union(ty) => ty.description.as_deref(),
            TypeDefinition::InputObject(ty) => ty.description.as_deref(),
        }
    }

    pub fn directives(&self) -> &[DirectiveUsage] {
        match self {
            TypeDefinition::Scalar(ty) => &ty.directives,
            TypeDefinition::Enum(ty) => &ty.directives,
            TypeDefinition::Object(ty) => &ty.directives,
            TypeDefinition::Interface(ty) => &ty.directives,
            TypeDefinition::Union(ty) => &ty.directives,
            TypeDefinition::InputObject(ty) => &ty.directives,
        }
    }

    pub(crate) fn directives_mut(&mut self) -> &mut Vec<DirectiveUsage> {
        match self {
            TypeDefinition::Scalar(ty) => &mut ty.directives,
            TypeDefinition::Enum(ty) => &mut ty.directives,
            TypeDefinition::Object(ty) => &mut ty.directives,
            TypeDefinition::Interface(ty) => &mut ty.directives,
            TypeDefinition::Union(ty) => &mut ty.directives,
            TypeDefinition::InputObject(ty) => &mut ty.directives,
        }
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            TypeDefinition::Scalar(_) => TypeKind::Scalar,
            TypeDefinition::Enum(_) => TypeKind::Enum,
            TypeDefinition::Object(_) => TypeKind::Object,
            TypeDefinition::Interface(_) => TypeKind::Interface,
            TypeDefinition::Union(_) => TypeKind::Union,
            TypeDefinition::InputObject(_) => TypeKind::InputObject,
        }
    }

    pub(crate) fn location(&self) -> DirectiveLocation {
        match self {
            TypeDefinition::Scalar(_) => DirectiveLocation::Scalar,
            TypeDefinition::Enum(_) => DirectiveLocation::Enum,
            TypeDefinition::Object(_) => DirectiveLocation::Object,
            TypeDefinition::Interface(_) => DirectiveLocation::Interface,
            TypeDefinition::Union(_) => DirectiveLocation::Union,
            TypeDefinition::InputObject(_) => DirectiveLocation::InputObject,
        }
    }

    /// Fields of object and interface types.
    pub fn fields(&self) -> Option<&IndexMap<String, FieldDefinition>> {
        match self {
            TypeDefinition::Object(ty) => Some(&ty.fields),
            TypeDefinition::Interface(ty) => Some(&ty.fields),
            _ => None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields().and_then(|fields| fields.get(name))
    }

    pub fn is_input_type(&self) -> bool {
        matches!(
            self,
            TypeDefinition::Scalar(_) | TypeDefinition::Enum(_) | TypeDefinition::InputObject(_)
        )
    }

    pub fn is_output_type(&self) -> bool {
        !matches!(self, TypeDefinition::InputObject(_))
    }

    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            TypeDefinition::Object(_) | TypeDefinition::Interface(_) | TypeDefinition::Union(_)
        )
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self, TypeDefinition::Interface(_) | TypeDefinition::Union(_))
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TypeDefinition::Scalar(_) | TypeDefinition::Enum(_))
    }
}

#[derive(Clone)]
pub struct ScalarType {
    pub name: String,
    pub description: Option<String>,
    pub directives: Vec<DirectiveUsage>,
    pub(crate) implementation: Arc<dyn ScalarImplementation>,
}

impl ScalarType {
    pub fn specified_by_url(&self) -> Option<&str> {
        self.directives
            .iter()
            .find(|directive| directive.name == "specifiedBy")
            .and_then(|directive| directive.arguments.get("url"))
            .and_then(Value::as_str)
    }
}

#[derive(Clone)]
pub struct EnumType {
    pub name: String,
    pub description: Option<String>,
    pub directives: Vec<DirectiveUsage>,
    pub values: IndexMap<String, EnumValue>,
}

#[derive(Clone)]
pub struct EnumValue {
    pub name: String,
    pub description: Option<String>,
    pub directives: Vec<DirectiveUsage>,
}

#[derive(Clone)]
pub struct ObjectType {
    pub name: String,
    pub description: Option<String>,
    pub directives: Vec<DirectiveUsage>,
    pub fields: IndexMap<String, FieldDefinition>,
    pub interfaces: Vec<String>,
}

#[derive(Clone)]
pub struct InterfaceType {
    pub name: String,
    pub description: Option<String>,
    pub directives: Vec<DirectiveUsage>,
    pub fields: IndexMap<String, FieldDefinition>,
    pub interfaces: Vec<String>,
    pub(crate) type_resolver: Arc<dyn TypeResolver>,
}

#[derive(Clone)]
pub struct UnionType {
    pub name: String,
    pub description: Option<String>,
    pub directives: Vec<DirectiveUsage>,
    pub members: Vec<String>,
    pub(crate) type_resolver: Arc<dyn TypeResolver>,
}

#[derive(Clone)]
pub struct InputObjectType {
    pub name: String,
    pub description: Option<String>,
    pub directives: Vec<DirectiveUsage>,
    pub fields: IndexMap<String, InputValueDefinition>,
}

#[derive(Clone)]
pub struct FieldDefinition {
    pub name: String,
    pub description: Option<String>,
    pub arguments: IndexMap<String, InputValueDefinition>,
    pub ty: TypeRef,
    pub directives: Vec<DirectiveUsage>,
    pub(crate) resolver: Option<Arc<dyn Resolver>>,
    pub(crate) subscription: Option<Arc<dyn SubscriptionResolver>>,
    pub(crate) concurrent_list_items: Option<bool>,
    /// `__schema` and `__type`, never listed by introspection.
    pub(crate) is_meta: bool,
}

impl FieldDefinition {
    pub(crate) fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        FieldDefinition {
            name: name.into(),
            description: None,
            arguments: IndexMap::new(),
            ty,
            directives: Vec::new(),
            resolver: None,
            subscription: None,
            concurrent_list_items: None,
            is_meta: false,
        }
    }

    pub fn deprecation_reason(&self) -> Option<Option<&str>> {
        deprecation_reason(&self.directives)
    }
}

/// An argument of a field or directive, or a field of an input object.
#[derive(Clone)]
pub struct InputValueDefinition {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeRef,
    /// Kept as a literal and coerced each time it is used.
    pub default_value: Option<ConstValue>,
    pub directives: Vec<DirectiveUsage>,
}

impl InputValueDefinition {
    pub(crate) fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        InputValueDefinition {
            name: name.into(),
            description: None,
            ty,
            default_value: None,
            directives: Vec::new(),
        }
    }

    pub fn is_required(&self) -> bool {
        self.ty.is_non_null() && self.default_value.is_none()
    }
}

#[derive(Clone)]
pub struct DirectiveDefinition {
    pub name: String,
    pub description: Option<String>,
    pub arguments: IndexMap<String, InputValueDefinition>,
    pub locations: Vec<DirectiveLocation>,
    pub is_repeatable: bool,
    pub(crate) implementation: Option<Arc<dyn DirectiveImplementation>>,
}
