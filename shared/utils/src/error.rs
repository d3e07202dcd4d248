use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum StockboardError {
    #[error("Source unreadable: {source_name} - {message}")]
    SourceUnreadable { source_name: String, message: String },

    #[error("Unsupported format: {filename}")]
    UnsupportedFormat { filename: String },

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl StockboardError {
    pub fn source_unreadable(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceUnreadable {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn unsupported_format(filename: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            filename: filename.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Load-level failures: the whole source could not be turned into rows.
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            Self::SourceUnreadable { .. } | Self::UnsupportedFormat { .. }
        )
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SourceUnreadable { .. } => "SOURCE_UNREADABLE",
            Self::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Internal { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::SourceUnreadable { .. } => 422,
            Self::UnsupportedFormat { .. } => 415,
            Self::Validation { .. } => 400,
            Self::Configuration { .. } => 500,
            Self::NotFound { .. } => 404,
            Self::Internal { .. } => 500,
        }
    }
}

pub type StockboardResult<T> = Result<T, StockboardError>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl From<StockboardError> for ErrorResponse {
    fn from(error: StockboardError) -> Self {
        Self {
            error: error.error_code().to_string(),
            code: error.error_code().to_string(),
            message: error.to_string(),
            details: None,
        }
    }
}

// Conversion from common error types
impl From<csv::Error> for StockboardError {
    fn from(error: csv::Error) -> Self {
        Self::source_unreadable("csv", error.to_string())
    }
}

impl From<std::io::Error> for StockboardError {
    fn from(error: std::io::Error) -> Self {
        Self::source_unreadable("io", error.to_string())
    }
}

impl From<serde_json::Error> for StockboardError {
    fn from(error: serde_json::Error) -> Self {
        Self::validation("JSON", error.to_string())
    }
}

impl From<config::ConfigError> for StockboardError {
    fn from(error: config::ConfigError) -> Self {
        Self::configuration(error.to_string())
    }
}
