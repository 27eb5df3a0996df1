//! Store trait the pagination resolver reads from

use crate::core::filter::Filter;
use crate::core::query::SortSpec;
use crate::core::row::Product;
use anyhow::Result;
use async_trait::async_trait;

/// A queryable product collection
///
/// Implementations execute filter predicates, sorting and skip/limit
/// windows. The resolver treats the collection as read-only and issues
/// `count` and `find` as two independent reads, so they need not observe the
/// same snapshot.
///
/// A predicate the backend cannot apply should be reported by returning a
/// [`FilterError`](crate::core::error::FilterError) wrapped in
/// `anyhow::Error`; the resolver maps it to `InvalidFilter`.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Number of rows matching `filter`
    async fn count(&self, filter: &Filter) -> Result<u64>;

    /// Rows matching `filter`, ordered by `sort` (ties broken by
    /// `productId`), skipping `skip` rows and returning at most `limit`
    async fn find(
        &self,
        filter: &Filter,
        sort: &SortSpec,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Product>>;

    /// Columns this store can sort by
    fn sortable_columns(&self) -> &[&'static str] {
        Product::SORTABLE_COLUMNS
    }

    /// Backend name used in error messages and logs
    fn backend_name(&self) -> &'static str;
}
