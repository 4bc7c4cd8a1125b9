use std::fmt;

/// Error kind for field-level mapping failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Source leaf kind differs from the declared destination kind and no adapter is registered.
    IncompatibleType,
    /// A type adapter rejected its input or failed to convert it.
    Adapter,
    /// The named field does not exist on the type.
    UnknownField,
    /// The field exists but cannot be accessed the requested way.
    FieldKind,
    /// A configured adapter name is not registered.
    UnknownAdapter,
    /// A destination instance could not be constructed.
    Construction,
}

/// Field error: returned by all `Mappable` accessors and type adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub kind: ErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn incompatible_type(
        field: &str,
        expected: impl fmt::Display,
        found: impl fmt::Display,
    ) -> Self {
        Self {
            kind: ErrorKind::IncompatibleType,
            message: format!("field '{field}' is declared as {expected} but value is {found}"),
        }
    }

    pub fn adapter(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Adapter, message: msg.into() }
    }

    pub fn unknown_field(type_name: &str, field: &str) -> Self {
        Self {
            kind: ErrorKind::UnknownField,
            message: format!("type '{type_name}' has no field '{field}'"),
        }
    }

    pub fn field_kind(type_name: &str, field: &str, expected: &str) -> Self {
        Self {
            kind: ErrorKind::FieldKind,
            message: format!("field '{field}' of '{type_name}' is not {expected}"),
        }
    }

    pub fn unknown_adapter(name: &str) -> Self {
        Self {
            kind: ErrorKind::UnknownAdapter,
            message: format!("no type adapter registered as '{name}'"),
        }
    }

    pub fn construction(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Construction, message: msg.into() }
    }

    /// Add context to the error, keeping the ErrorKind.
    ///
    /// Produces: `"context: message"`.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{ctx}: {}", self.message),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for FieldError {}

// ---------------------------------------------------------------------------
// From impls: conversion failures inside adapters → FieldError::Adapter
// ---------------------------------------------------------------------------

impl From<uuid::Error> for FieldError {
    fn from(e: uuid::Error) -> Self {
        Self::adapter(e.to_string())
    }
}

impl From<std::num::ParseIntError> for FieldError {
    fn from(e: std::num::ParseIntError) -> Self {
        Self::adapter(e.to_string())
    }
}

impl From<chrono::ParseError> for FieldError {
    fn from(e: chrono::ParseError) -> Self {
        Self::adapter(e.to_string())
    }
}
