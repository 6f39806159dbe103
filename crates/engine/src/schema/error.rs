use itertools::Itertools;

use super::{DirectiveLocation, TypeKind};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("Failed to parse SDL: {0}")]
    Parse(String),
    #[error("Names starting with \"__\" are reserved: \"{0}\".")]
    ReservedName(String),
    #[error("Type \"{0}\" is defined more than once.")]
    DuplicateType(String),
    #[error("Directive \"@{0}\" is defined more than once.")]
    DuplicateDirectiveDefinition(String),
    #[error("Field \"{type_name}.{field}\" is defined more than once.")]
    DuplicateField { type_name: String, field: String },
    #[error("Enum value \"{enum_name}.{value}\" is defined more than once.")]
    DuplicateEnumValue { enum_name: String, value: String },
    #[error("Argument \"{argument}\" of \"{owner}\" is defined more than once.")]
    DuplicateArgument { owner: String, argument: String },
    #[error("Union \"{union_name}\" includes \"{member}\" more than once.")]
    DuplicateUnionMember { union_name: String, member: String },
    #[error("Type \"{type_name}\" implements interface \"{interface}\" more than once.")]
    DuplicateInterface { type_name: String, interface: String },
    #[error("Cannot extend type \"{0}\" because it is not defined.")]
    ExtendUndefinedType(String),
    #[error("Cannot extend type \"{type_name}\": it is {actual} but the extension is {extension}.")]
    ExtensionKindMismatch {
        type_name: String,
        actual: TypeKind,
        extension: TypeKind,
    },
    #[error("The schema definition is provided more than once.")]
    DuplicateSchemaDefinition,
    #[error("The {0} root operation type is defined more than once.")]
    DuplicateRootOperation(&'static str),
    #[error("Unknown type \"{type_name}\" referenced by \"{element}\".")]
    UnknownType { type_name: String, element: String },
    #[error("The type of \"{element}\" must be an output type but got \"{type_name}\".")]
    NotAnOutputType { element: String, type_name: String },
    #[error("The type of \"{element}\" must be an input type but got \"{type_name}\".")]
    NotAnInputType { element: String, type_name: String },
    #[error("Union \"{union_name}\" can only include object types, it cannot include \"{member}\".")]
    InvalidUnionMember { union_name: String, member: String },
    #[error("Type \"{type_name}\" cannot implement \"{interface}\" because it is not an interface.")]
    NotAnInterface { type_name: String, interface: String },
    #[error("Interface field \"{interface}.{field}\" expected but \"{type_name}\" does not provide it.")]
    MissingInterfaceField {
        type_name: String,
        interface: String,
        field: String,
    },
    #[error(
        "Interface field \"{interface}.{field}\" expects type \"{expected}\" but \"{type_name}.{field}\" is type \"{actual}\"."
    )]
    InvalidInterfaceFieldType {
        type_name: String,
        interface: String,
        field: String,
        expected: String,
        actual: String,
    },
    #[error(
        "Interface field argument \"{interface}.{field}({argument}:)\" expected but \"{type_name}.{field}\" does not provide it."
    )]
    MissingInterfaceFieldArgument {
        type_name: String,
        interface: String,
        field: String,
        argument: String,
    },
    #[error("Type \"{type_name}\" must implement \"{transitive}\" because it is implemented by \"{interface}\".")]
    MissingTransitiveInterface {
        type_name: String,
        interface: String,
        transitive: String,
    },
    #[error("The query root type must be provided.")]
    MissingQueryType,
    #[error("The {operation} root type must be an object type, it cannot be \"{type_name}\".")]
    RootTypeNotObject { operation: &'static str, type_name: String },
    #[error("Unknown directive \"@{directive}\" on \"{element}\".")]
    UnknownDirective { directive: String, element: String },
    #[error("Directive \"@{directive}\" may not be used on {location} (\"{element}\").")]
    MisplacedDirective {
        directive: String,
        location: DirectiveLocation,
        element: String,
    },
    #[error("The directive \"@{directive}\" can only be used once on \"{element}\".")]
    RepeatedDirective { directive: String, element: String },
    #[error("Invalid argument for directive \"@{directive}\" on \"{element}\": {message}")]
    InvalidDirectiveArgument {
        directive: String,
        element: String,
        message: String,
    },
    #[error("Invalid default value for \"{element}\": {message}")]
    InvalidDefaultValue { element: String, message: String },
    #[error("Scalar \"{0}\" has no registered implementation.")]
    MissingScalarImplementation(String),
    #[error("Cannot register a resolver for \"{0}\": no such field.")]
    UnknownResolverTarget(String),
    #[error("Cannot register a subscription resolver for \"{0}\": it is not a field of the subscription root.")]
    InvalidSubscriptionTarget(String),
    #[error("Cannot register a type resolver for \"{0}\": it is not an interface or a union.")]
    InvalidTypeResolverTarget(String),
    #[error("Cannot register an implementation for directive \"@{0}\": it is not defined.")]
    UnknownDirectiveImplementation(String),
    #[error("Cannot register an implementation for scalar \"{0}\": it is not defined.")]
    UnknownScalarImplementation(String),
}

/// Every problem found while building a schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", .0.iter().join("\n"))]
pub struct SchemaErrors(pub Vec<SchemaError>);

impl SchemaErrors {
    pub fn errors(&self) -> &[SchemaError] {
        &self.0
    }

    pub fn contains(&self, error: &SchemaError) -> bool {
        self.0.contains(error)
    }
}

impl IntoIterator for SchemaErrors {
    type Item = SchemaError;
    type IntoIter = std::vec::IntoIter<SchemaError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
