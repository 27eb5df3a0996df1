//! Typed error handling for the catalog resolver
//!
//! Resolver failures are always returned as structured errors, never as a
//! partial page. Each category knows its HTTP status and a stable error code
//! that clients match on.
//!
//! # Error Categories
//!
//! - [`WindowError`]: page/limit out of range (`INVALID_WINDOW`)
//! - [`FilterError`]: a predicate the store cannot parse or apply (`INVALID_FILTER`)
//! - [`StorageError`]: store backend failures
//! - [`ValidationError`]: product input validation
//! - [`ConfigError`]: configuration parsing and validation
//!
//! # Example
//!
//! ```rust,ignore
//! match resolver.paginate(&filter, &sort, window).await {
//!     Ok(page) => render(page),
//!     Err(CatalogError::InvalidWindow(e)) => eprintln!("bad window: {}", e),
//!     Err(CatalogError::InvalidFilter(_)) => show_search_failed(),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The main error type for catalog operations
#[derive(Debug)]
pub enum CatalogError {
    /// Page window out of range
    InvalidWindow(WindowError),

    /// Filter predicate could not be parsed or applied
    InvalidFilter(FilterError),

    /// Storage backend errors
    Storage(StorageError),

    /// Product input validation errors
    Validation(ValidationError),

    /// Configuration errors
    Config(ConfigError),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::InvalidWindow(e) => write!(f, "{}", e),
            CatalogError::InvalidFilter(e) => write!(f, "{}", e),
            CatalogError::Storage(e) => write!(f, "{}", e),
            CatalogError::Validation(e) => write!(f, "{}", e),
            CatalogError::Config(e) => write!(f, "{}", e),
            CatalogError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::InvalidWindow(e) => Some(e),
            CatalogError::InvalidFilter(e) => Some(e),
            CatalogError::Storage(e) => Some(e),
            CatalogError::Validation(e) => Some(e),
            CatalogError::Config(e) => Some(e),
            CatalogError::Internal(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl CatalogError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::InvalidWindow(_) => StatusCode::BAD_REQUEST,
            CatalogError::InvalidFilter(_) => StatusCode::BAD_REQUEST,
            CatalogError::Storage(e) => e.status_code(),
            CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
            CatalogError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CatalogError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            CatalogError::InvalidWindow(_) => "INVALID_WINDOW",
            CatalogError::InvalidFilter(_) => "INVALID_FILTER",
            CatalogError::Storage(e) => e.error_code(),
            CatalogError::Validation(_) => "VALIDATION_ERROR",
            CatalogError::Config(_) => "CONFIG_ERROR",
            CatalogError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            CatalogError::InvalidWindow(WindowError::InvalidPage { page }) => {
                Some(serde_json::json!({ "page": page }))
            }
            CatalogError::InvalidWindow(WindowError::InvalidLimit { limit }) => {
                Some(serde_json::json!({ "limit": limit }))
            }
            CatalogError::InvalidWindow(WindowError::LimitTooLarge { limit, max }) => {
                Some(serde_json::json!({ "limit": limit, "max": max }))
            }
            CatalogError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        } else {
            tracing::debug!(code = self.error_code(), error = %self, "request rejected");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Window Errors
// =============================================================================

/// Errors describing an out-of-range page window
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    /// Page number below 1
    InvalidPage { page: i64 },

    /// Limit below 1
    InvalidLimit { limit: i64 },

    /// Limit above the configured maximum
    LimitTooLarge { limit: i64, max: i64 },

    /// `(page - 1) * limit` does not fit in an offset
    Overflow { page: i64, limit: i64 },
}

impl fmt::Display for WindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowError::InvalidPage { page } => {
                write!(f, "Invalid page {}: pages start at 1", page)
            }
            WindowError::InvalidLimit { limit } => {
                write!(f, "Invalid limit {}: limit must be at least 1", limit)
            }
            WindowError::LimitTooLarge { limit, max } => {
                write!(f, "Invalid limit {}: limit must not exceed {}", limit, max)
            }
            WindowError::Overflow { page, limit } => {
                write!(f, "Page {} with limit {} is out of range", page, limit)
            }
        }
    }
}

impl std::error::Error for WindowError {}

impl From<WindowError> for CatalogError {
    fn from(err: WindowError) -> Self {
        CatalogError::InvalidWindow(err)
    }
}

// =============================================================================
// Filter Errors
// =============================================================================

/// Errors raised when a filter predicate cannot be parsed or applied
#[derive(Debug, Clone, PartialEq)]
pub enum FilterError {
    /// The serialized query is not valid JSON or has the wrong shape
    Malformed { message: String },

    /// An operator the store does not support
    UnsupportedOperator { operator: String },

    /// A field name the store refuses (empty, or an operator name)
    InvalidField { field: String, message: String },

    /// Equality against NaN or infinity
    NonFiniteValue { field: String },

    /// Both a typed filter and a legacy query string were sent
    Ambiguous,
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::Malformed { message } => write!(f, "Malformed filter: {}", message),
            FilterError::UnsupportedOperator { operator } => {
                write!(f, "Unsupported filter operator '{}'", operator)
            }
            FilterError::InvalidField { field, message } => {
                write!(f, "Invalid filter field '{}': {}", field, message)
            }
            FilterError::NonFiniteValue { field } => {
                write!(f, "Filter value for '{}' must be a finite number", field)
            }
            FilterError::Ambiguous => {
                write!(f, "Request carries both a filter and a query string")
            }
        }
    }
}

impl std::error::Error for FilterError {}

impl From<FilterError> for CatalogError {
    fn from(err: FilterError) -> Self {
        CatalogError::InvalidFilter(err)
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug)]
pub enum StorageError {
    /// Query execution error
    QueryError { backend: String, message: String },

    /// Backend not available
    Unavailable { backend: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::QueryError { backend, message } => {
                write!(f, "{} query error: {}", backend, message)
            }
            StorageError::Unavailable { backend } => {
                write!(f, "Storage backend '{}' is unavailable", backend)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl StorageError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            StorageError::QueryError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            StorageError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::QueryError { .. } => "STORAGE_ERROR",
            StorageError::Unavailable { .. } => "STORAGE_UNAVAILABLE",
        }
    }
}

impl From<StorageError> for CatalogError {
    fn from(err: StorageError) -> Self {
        CatalogError::Storage(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to product input validation
#[derive(Debug)]
pub enum ValidationError {
    /// One or more field violations
    FieldErrors(Vec<FieldViolation>),

    /// Invalid JSON format
    InvalidJson { message: String },

    /// Query string could not be decoded
    InvalidQuery { message: String },
}

/// A single field validation failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldErrors(errors) => {
                let msgs: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                write!(f, "Validation errors: {}", msgs.join(", "))
            }
            ValidationError::InvalidJson { message } => {
                write!(f, "Invalid JSON: {}", message)
            }
            ValidationError::InvalidQuery { message } => {
                write!(f, "Invalid query string: {}", message)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for CatalogError {
    fn from(err: ValidationError) -> Self {
        CatalogError::Validation(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse configuration file
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// Configuration file not found
    FileNotFound { path: String },

    /// IO error while reading configuration
    IoError { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::InvalidValue {
                field,
                value,
                message,
            } => {
                write!(
                    f,
                    "Invalid value '{}' for field '{}': {}",
                    value, field, message
                )
            }
            ConfigError::FileNotFound { path } => {
                write!(f, "Configuration file not found: {}", path)
            }
            ConfigError::IoError { message } => {
                write!(f, "IO error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for CatalogError {
    fn from(err: ConfigError) -> Self {
        CatalogError::Config(err)
    }
}

// =============================================================================
// Standard Library Conversions
// =============================================================================

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for CatalogError {
    fn from(err: serde_yaml::Error) -> Self {
        CatalogError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::Config(ConfigError::IoError {
            message: err.to_string(),
        })
    }
}

/// Convert from anyhow::Error, keeping filter errors typed
impl From<anyhow::Error> for CatalogError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<FilterError>() {
            Ok(filter_err) => CatalogError::InvalidFilter(filter_err),
            Err(err) => CatalogError::Internal(err.to_string()),
        }
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

// =============================================================================
// Tests
// =============================================================================
