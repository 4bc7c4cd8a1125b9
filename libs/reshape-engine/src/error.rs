use reshape_api::error::{ErrorKind, FieldError};

/// Message carried by every mapping failure, whatever the cause.
pub const GEN_ERROR_MESSAGE: &str = "error occurred while mapping entity";

/// The single error surfaced by `Mapper::map` and `Mapper::map_entry`.
///
/// Callers distinguish failures only through `cause()`.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct MappingError {
    message: String,
    #[source]
    cause: FieldError,
}

impl MappingError {
    pub fn new(cause: FieldError) -> Self {
        Self {
            message: GEN_ERROR_MESSAGE.to_string(),
            cause,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> &FieldError {
        &self.cause
    }

    pub fn kind(&self) -> ErrorKind {
        self.cause.kind
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Invalid(String),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("io error: {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Add context to the error.
    ///
    /// For `Invalid`, context is prepended to the message; other variants are kept.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            ConfigError::Invalid(msg) => ConfigError::Invalid(format!("{ctx}: {msg}")),
            other => other,
        }
    }
}
