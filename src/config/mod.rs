//! Configuration loading and management

use crate::core::error::{CatalogResult, ConfigError};
use crate::core::row::Product;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind, e.g. "127.0.0.1:3000"
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Pagination resolver settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Column used when the requested sort column is unknown
    pub default_sort_column: String,

    /// Columns requests may sort by; others fall back to the default
    pub sortable_columns: Vec<String>,

    /// Largest `limit` a single request may ask for
    pub max_limit: i64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_sort_column: Product::DEFAULT_SORT_COLUMN.to_string(),
            sortable_columns: Product::SORTABLE_COLUMNS
                .iter()
                .map(|column| column.to_string())
                .collect(),
            max_limit: 500,
        }
    }
}

/// Fields searched by free-text input
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Matched by case-insensitive substring
    pub text_fields: Vec<String>,

    /// Matched by exact equality when the input is a number
    pub numeric_fields: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            text_fields: vec!["title".to_string(), "type".to_string()],
            numeric_fields: vec!["price".to_string(), "discount".to_string()],
        }
    }
}

/// Browse client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the catalog server
    pub base_url: String,

    /// Rows per visible page
    pub page_size: usize,

    /// Visible pages fetched per round-trip
    pub batch_factor: usize,

    /// Fetch timeout in milliseconds
    pub fetch_timeout_ms: u64,

    /// Largest batch requested in one round-trip; must fit `resolver.max_limit`
    pub max_batch_rows: usize,
}

impl ClientConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            page_size: 5,
            batch_factor: 5,
            fetch_timeout_ms: 10_000,
            max_batch_rows: 500,
        }
    }
}

/// Complete configuration for the catalog browse pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub client: ClientConfig,
}

impl CatalogConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> CatalogResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.to_string(),
            },
            _ => ConfigError::IoError {
                message: e.to_string(),
            },
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.to_string()),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> CatalogResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Create the default configuration
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Check value ranges, reporting the first problem
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.problems().into_iter().next() {
            Some(problem) => Err(problem),
            None => Ok(()),
        }
    }

    /// Every configuration problem found
    pub fn problems(&self) -> Vec<ConfigError> {
        let mut problems = Vec::new();
        let mut invalid = |field: &str, value: String, message: &str| {
            problems.push(ConfigError::InvalidValue {
                field: field.to_string(),
                value,
                message: message.to_string(),
            })
        };

        if !Product::SORTABLE_COLUMNS.contains(&self.resolver.default_sort_column.as_str()) {
            invalid(
                "resolver.default_sort_column",
                self.resolver.default_sort_column.clone(),
                "must be a sortable column",
            );
        }
        for column in &self.resolver.sortable_columns {
            if !Product::SORTABLE_COLUMNS.contains(&column.as_str()) {
                invalid(
                    "resolver.sortable_columns",
                    column.clone(),
                    "not a product column",
                );
            }
        }
        if self.resolver.max_limit < 1 {
            invalid(
                "resolver.max_limit",
                self.resolver.max_limit.to_string(),
                "must be at least 1",
            );
        }
        if self.search.text_fields.is_empty() && self.search.numeric_fields.is_empty() {
            invalid("search", "[]".to_string(), "at least one field must be searchable");
        }
        if self.client.page_size < 1 {
            invalid(
                "client.page_size",
                self.client.page_size.to_string(),
                "must be at least 1",
            );
        }
        if self.client.batch_factor < 1 {
            invalid(
                "client.batch_factor",
                self.client.batch_factor.to_string(),
                "must be at least 1",
            );
        }
        if self.client.fetch_timeout_ms == 0 {
            invalid("client.fetch_timeout_ms", "0".to_string(), "must be positive");
        }
        if self.client.max_batch_rows < 1 {
            invalid("client.max_batch_rows", "0".to_string(), "must be at least 1");
        }
        if self.client.max_batch_rows as i64 > self.resolver.max_limit {
            invalid(
                "client.max_batch_rows",
                self.client.max_batch_rows.to_string(),
                "exceeds resolver.max_limit",
            );
        }
        if self.client.page_size > self.client.max_batch_rows {
            invalid(
                "client.page_size",
                self.client.page_size.to_string(),
                "exceeds client.max_batch_rows",
            );
        }

        problems
    }
}
