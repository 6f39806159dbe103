use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum InputPathSegment {
    Index(usize),
    Field(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum InputErrorKind {
    #[error("Value of required type \"{expected}\" was not provided.")]
    MissingRequired { expected: String },
    #[error("Value of non-null type \"{expected}\" must not be null.")]
    UnexpectedNull { expected: String },
    #[error("Expected value of type \"{expected}\", found {found}; {reason}")]
    CannotRepresent {
        expected: String,
        found: String,
        reason: String,
    },
    #[error("Expected value of type \"{expected}\", found {found}.")]
    UnknownEnumValue { expected: String, found: String },
    #[error("Expected value of type \"{expected}\" to be an object, found {found}.")]
    NotAnInputObject { expected: String, found: String },
    #[error("Field \"{field}\" is not defined by type \"{expected}\".")]
    UnknownField { expected: String, field: String },
    #[error("Type \"{0}\" is not an input type.")]
    NotAnInputType(String),
}

/// A coercion failure, located inside the coerced value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InputValueError {
    pub path: Vec<InputPathSegment>,
    pub kind: InputErrorKind,
}

impl InputValueError {
    /// A missing value at the very top, e.g. an omitted required argument.
    pub fn is_missing_at_root(&self) -> bool {
        self.path.is_empty() && matches!(self.kind, InputErrorKind::MissingRequired { .. })
    }
}

impl fmt::Display for InputValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.path {
            match segment {
                InputPathSegment::Index(index) => write!(f, "In element #{index}: ")?,
                InputPathSegment::Field(name) => write!(f, "In field \"{name}\": ")?,
            }
        }
        fmt::Display::fmt(&self.kind, f)
    }
}
