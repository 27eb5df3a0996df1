//! Errors surfaced by the browse client

use crate::core::error::{CatalogError, ErrorResponse};
use std::time::Duration;
use thiserror::Error;

/// A failed cache operation
///
/// On any of these the cache keeps its last consistent state: rows are never
/// left half-appended.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// Page or page size out of range
    #[error("invalid page window: {0}")]
    InvalidWindow(String),

    /// The resolver could not apply the filter ("search failed")
    #[error("search failed: {0}")]
    InvalidFilter(String),

    /// Network or server failure
    #[error("transport error: {message}")]
    Transport { message: String, retryable: bool },

    /// No response within the fetch timeout
    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),

    /// The page cannot be shown until the first batch arrives
    #[error("page {page} is not loaded and no fetch is pending")]
    NotLoaded { page: usize },
}

impl CacheError {
    pub fn transport(message: impl Into<String>, retryable: bool) -> Self {
        CacheError::Transport {
            message: message.into(),
            retryable,
        }
    }

    /// Whether `retry()` may succeed without changing the request
    pub fn is_retryable(&self) -> bool {
        match self {
            CacheError::Transport { retryable, .. } => *retryable,
            CacheError::Timeout(_) => true,
            _ => false,
        }
    }

    /// Errors caused by the request itself rather than the transport
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            CacheError::InvalidWindow(_) | CacheError::InvalidFilter(_)
        )
    }

    /// Map a server error body by its error code
    pub fn from_response(response: ErrorResponse, server_error: bool) -> Self {
        match response.code.as_str() {
            "INVALID_WINDOW" => CacheError::InvalidWindow(response.message),
            "INVALID_FILTER" => CacheError::InvalidFilter(response.message),
            _ => CacheError::transport(
                format!("{}: {}", response.code, response.message),
                server_error,
            ),
        }
    }
}

impl From<CatalogError> for CacheError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::InvalidWindow(e) => CacheError::InvalidWindow(e.to_string()),
            CatalogError::InvalidFilter(e) => CacheError::InvalidFilter(e.to_string()),
            CatalogError::Storage(e) => CacheError::transport(e.to_string(), true),
            other => CacheError::transport(other.to_string(), false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{FilterError, StorageError, WindowError};

    #[test]
    fn test_rejections_are_not_retryable() {
        let err = CacheError::from(CatalogError::InvalidWindow(WindowError::InvalidPage {
            page: 0,
        }));
        assert!(err.is_rejection());
        assert!(!err.is_retryable());

        let err = CacheError::from(CatalogError::InvalidFilter(FilterError::Ambiguous));
        assert!(matches!(err, CacheError::InvalidFilter(_)));
    }

    #[test]
    fn test_storage_failures_are_retryable() {
        let err = CacheError::from(CatalogError::Storage(StorageError::Unavailable {
            backend: "mongodb".to_string(),
        }));
        assert!(err.is_retryable());
        assert!(CacheError::Timeout(Duration::from_secs(1)).is_retryable());
    }

    #[test]
    fn test_from_response_maps_codes() {
        let response = ErrorResponse {
            code: "INVALID_FILTER".to_string(),
            message: "bad".to_string(),
            details: None,
        };
        assert_eq!(
            CacheError::from_response(response, false),
            CacheError::InvalidFilter("bad".to_string())
        );

        let response = ErrorResponse {
            code: "STORAGE_ERROR".to_string(),
            message: "down".to_string(),
            details: None,
        };
        assert!(CacheError::from_response(response, true).is_retryable());
    }
}
