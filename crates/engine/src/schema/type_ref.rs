use std::fmt;

use async_graphql_parser::types::{BaseType, Type};

/// A reference to a named type, possibly wrapped in lists and non-null markers.
///
/// `NonNull` never directly wraps another `NonNull`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn list(of: TypeRef) -> Self {
        TypeRef::List(Box::new(of))
    }

    pub fn non_null(of: TypeRef) -> Self {
        match of {
            TypeRef::NonNull(_) => of,
            other => TypeRef::NonNull(Box::new(other)),
        }
    }

    /// Parses the textual form, e.g. `[Int!]!`.
    pub fn parse(source: &str) -> Option<Self> {
        Type::new(source).map(|ty| TypeRef::from(&ty))
    }

    /// The innermost named type.
    pub fn named_type(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.named_type(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }

    /// Strips the outer non-null marker, if any.
    pub fn nullable(&self) -> &TypeRef {
        match self {
            TypeRef::NonNull(inner) => inner,
            other => other,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self.nullable(), TypeRef::List(_))
    }
}

impl From<&Type> for TypeRef {
    fn from(ty: &Type) -> Self {
        let base = match &ty.base {
            BaseType::Named(name) => TypeRef::Named(name.to_string()),
            BaseType::List(inner) => TypeRef::List(Box::new(TypeRef::from(inner.as_ref()))),
        };

        if ty.nullable {
            base
        } else {
            TypeRef::non_null(base)
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => f.write_str(name),
            TypeRef::List(inner) => write!(f, "[{inner}]"),
            TypeRef::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}
