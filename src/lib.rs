//! # Catalog Browse
//!
//! Offset pagination over a product catalog, served over HTTP, and a client
//! side fetch-ahead cache that pages through it without refetching rows.
//!
//! ## Features
//!
//! - **Pagination Resolver**: count and windowed find issued concurrently,
//!   with `previous`/`next` hints and a deterministic fallback sort
//! - **Typed Filters**: `NoFilter | Predicate` on the wire, legacy
//!   Mongo-style query strings still accepted
//! - **Fetch-Ahead Cache**: batches of `page_size * batch_factor` rows,
//!   generation tokens that drop stale responses, single in-flight fetch
//! - **Pluggable Stores**: in-memory and MongoDB backends
//! - **Configuration-Based**: YAML configuration for server, resolver,
//!   search fields and client sizing
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use catalog::prelude::*;
//!
//! let store = InMemoryCatalogStore::with_products(seed_products());
//! let resolver = PaginationResolver::new(Arc::new(store));
//!
//! let cache = FetchAheadCache::new(
//!     Arc::new(LocalPageFetcher::new(resolver)),
//!     CacheSettings::default(),
//! );
//! cache.initialize(5).await?;
//! cache.search("portal").await?;
//! cache.on_page_change(2).await?;
//! let visible = cache.page_rows().await;
//! ```

pub mod client;
pub mod config;
pub mod core;
pub mod resolver;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        CatalogError, CatalogResult, CatalogStore, Clause, FieldValue, FieldViolation, Filter,
        FilterPredicate, PageRequest, PageResult, PageWindow, Product, SortDirection, SortSpec,
        validation::validate_product,
    };

    // === Resolver ===
    pub use crate::resolver::PaginationResolver;

    // === Client ===
    #[cfg(feature = "client")]
    pub use crate::client::HttpPageFetcher;
    pub use crate::client::{
        CacheError, CacheSettings, CacheSnapshot, FetchAheadCache, FetchOutcome,
        FilterTranslator, LocalPageFetcher, PageFetcher,
    };

    // === Storage ===
    #[cfg(feature = "in-memory")]
    pub use crate::storage::InMemoryCatalogStore;
    #[cfg(feature = "mongodb_backend")]
    pub use crate::storage::MongoCatalogStore;

    // === Config ===
    pub use crate::config::{CatalogConfig, ClientConfig, ResolverConfig, SearchConfig};

    // === Server ===
    pub use crate::server::ServerBuilder;

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use std::sync::Arc;
}
