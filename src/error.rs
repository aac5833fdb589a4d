//! Error types for ldap-pager
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//! Wire-level failures of the paged results control live in
//! [`DecodeError`](crate::control::DecodeError) and are wrapped by [`Error::Decode`].

use crate::control::DecodeError;
use thiserror::Error;

/// The main error type for ldap-pager
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Page size must be greater than zero")]
    InvalidPageSize,

    #[error("Undefined variable in config: {variable}")]
    UndefinedVariable { variable: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Control Errors
    // ============================================================================
    #[error("Failed to decode paged results control: {0}")]
    Decode(#[from] DecodeError),

    #[error("Failed to bind oid <{oid}>: a decoder is already registered")]
    Registration { oid: String },

    // ============================================================================
    // Directory Errors
    // ============================================================================
    #[error("Connection failed: {message}")]
    Connection { message: String },

    #[error("Search failed: {message}")]
    Search { message: String },

    #[error("Failed to convert entry <{dn}>: {message}")]
    EntryConversion { dn: String, message: String },

    // ============================================================================
    // Sequencing Errors
    // ============================================================================
    #[error("Paging sequence error: {message}")]
    Sequence { message: String },

    #[error("Server kept returning cookies after {max_pages} pages")]
    PageLimit { max_pages: u32 },

    #[error("Paged search was cancelled")]
    Cancelled,

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Output error: {message}")]
    Output { message: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an undefined variable error
    pub fn undefined_var(variable: impl Into<String>) -> Self {
        Self::UndefinedVariable {
            variable: variable.into(),
        }
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a search error
    pub fn search(message: impl Into<String>) -> Self {
        Self::Search {
            message: message.into(),
        }
    }

    /// Create an entry conversion error
    pub fn entry_conversion(dn: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EntryConversion {
            dn: dn.into(),
            message: message.into(),
        }
    }

    /// Create a sequencing error
    pub fn sequence(message: impl Into<String>) -> Self {
        Self::Sequence {
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Check if this error happened before any page could be fetched
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection { .. })
    }

    /// Check if this error came from the paged results wire format
    pub fn is_decode_error(&self) -> bool {
        matches!(self, Error::Decode(_))
    }
}

/// Result type alias for ldap-pager
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }
}
