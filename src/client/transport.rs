//! Transports the fetch-ahead cache uses to reach the resolver

use super::error::CacheError;
use crate::core::query::{PageRequest, PageResult};
use crate::core::row::Product;
use crate::resolver::PaginationResolver;
use async_trait::async_trait;

/// One pagination round-trip
///
/// Implementations report request problems as
/// [`CacheError::InvalidWindow`] / [`CacheError::InvalidFilter`] and
/// everything else as a transport error.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, request: PageRequest) -> Result<PageResult<Product>, CacheError>;
}

/// In-process fetcher calling a resolver directly
#[derive(Clone)]
pub struct LocalPageFetcher {
    resolver: PaginationResolver,
}

impl LocalPageFetcher {
    pub fn new(resolver: PaginationResolver) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl PageFetcher for LocalPageFetcher {
    async fn fetch(&self, request: PageRequest) -> Result<PageResult<Product>, CacheError> {
        self.resolver
            .resolve(&request)
            .await
            .map_err(CacheError::from)
    }
}
