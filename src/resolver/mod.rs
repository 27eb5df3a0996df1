//! Pagination resolver
//!
//! Turns a filter, a sort and a page window into a [`PageResult`] by issuing
//! a count and a windowed find against a [`CatalogStore`].
//!
//! # Consistency
//!
//! The count and the find are two independent reads executed concurrently.
//! Under concurrent writes to the collection `total` and `items` may come
//! from slightly different states of the collection. This is accepted:
//! no lock or snapshot is taken to align them.

use crate::config::ResolverConfig;
use crate::core::error::{CatalogError, CatalogResult, FilterError, StorageError};
use crate::core::filter::Filter;
use crate::core::query::{PageRequest, PageResult, PageWindow, SortSpec};
use crate::core::row::Product;
use crate::core::store::CatalogStore;
use std::sync::Arc;

/// Computes pages over a catalog store
///
/// Holds no per-request state; one resolver serves every request.
#[derive(Clone)]
pub struct PaginationResolver {
    store: Arc<dyn CatalogStore>,
    config: ResolverConfig,
}

impl PaginationResolver {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self::with_config(store, ResolverConfig::default())
    }

    pub fn with_config(store: Arc<dyn CatalogStore>, config: ResolverConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn CatalogStore> {
        &self.store
    }

    /// Resolve a wire request, merging its typed and legacy filter forms
    pub async fn resolve(&self, request: &PageRequest) -> CatalogResult<PageResult<Product>> {
        let filter = request.resolved_filter()?;
        self.paginate(&filter, &request.sort(), request.window())
            .await
    }

    /// Compute one page.
    ///
    /// Fails with `InvalidWindow` when `page < 1`, `limit < 1` or `limit`
    /// exceeds the configured maximum, and with `InvalidFilter` when the
    /// filter cannot be applied. An unknown sort column falls back to the
    /// default column.
    pub async fn paginate(
        &self,
        filter: &Filter,
        sort: &SortSpec,
        window: PageWindow,
    ) -> CatalogResult<PageResult<Product>> {
        let skip = window.skip_within(self.config.max_limit)?;
        filter.validate()?;

        let sort = self.effective_sort(sort);
        let limit = window.limit as u64;

        let (total, items) = tokio::try_join!(
            self.store.count(filter),
            self.store.find(filter, &sort, skip, limit),
        )
        .map_err(|e| self.store_error(e))?;

        tracing::debug!(
            page = window.page,
            limit = window.limit,
            skip,
            total,
            returned = items.len(),
            sort_column = %sort.column,
            sort_order = sort.direction.as_str(),
            "resolved page"
        );

        Ok(PageResult::assemble(items, total, window, skip))
    }

    /// The sort actually applied: unknown columns become the default column,
    /// keeping the requested direction
    pub fn effective_sort(&self, sort: &SortSpec) -> SortSpec {
        if self.is_sortable(&sort.column) {
            return sort.clone();
        }

        tracing::debug!(
            requested = %sort.column,
            fallback = %self.config.default_sort_column,
            "unknown sort column, using default"
        );
        SortSpec::new(self.config.default_sort_column.clone(), sort.direction)
    }

    fn is_sortable(&self, column: &str) -> bool {
        self.config.sortable_columns.iter().any(|c| c == column)
            && self.store.sortable_columns().contains(&column)
    }

    fn store_error(&self, err: anyhow::Error) -> CatalogError {
        match err.downcast::<FilterError>() {
            Ok(filter_err) => {
                tracing::debug!(error = %filter_err, "store rejected filter");
                CatalogError::InvalidFilter(filter_err)
            }
            Err(err) => {
                tracing::warn!(backend = self.store.backend_name(), error = %err, "store read failed");
                CatalogError::Storage(StorageError::QueryError {
                    backend: self.store.backend_name().to_string(),
                    message: err.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::WindowError;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Store returning fixed rows and recording the sort it was asked for
    struct FixedStore {
        rows: Vec<Product>,
        last_sort: Mutex<Option<SortSpec>>,
        fail: Option<&'static str>,
    }

    impl FixedStore {
        fn with_rows(n: i64) -> Self {
            Self {
                rows: (1..=n)
                    .map(|id| Product::new(id, format!("Game {}", id), "game", id as f64, 0))
                    .collect(),
                last_sort: Mutex::new(None),
                fail: None,
            }
        }
    }

    #[async_trait]
    impl CatalogStore for FixedStore {
        async fn count(&self, _filter: &Filter) -> Result<u64> {
            Ok(self.rows.len() as u64)
        }

        async fn find(
            &self,
            _filter: &Filter,
            sort: &SortSpec,
            skip: u64,
            limit: u64,
        ) -> Result<Vec<Product>> {
            match self.fail {
                Some("filter") => return Err(FilterError::Malformed {
                    message: "bad regex".to_string(),
                }
                .into()),
                Some(other) => anyhow::bail!("{} is down", other),
                None => {}
            }
            *self.last_sort.lock().unwrap() = Some(sort.clone());
            Ok(self
                .rows
                .iter()
                .skip(skip as usize)
                .take(limit as usize)
                .cloned()
                .collect())
        }

        fn backend_name(&self) -> &'static str {
            "fixed"
        }
    }

    fn resolver(store: FixedStore) -> (PaginationResolver, Arc<FixedStore>) {
        let store = Arc::new(store);
        (PaginationResolver::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_pages_over_twelve_rows() {
        let (resolver, _) = resolver(FixedStore::with_rows(12));
        let sort = SortSpec::default();

        let first = resolver
            .paginate(&Filter::NoFilter, &sort, PageWindow::new(1, 5))
            .await
            .unwrap();
        assert_eq!(first.items.len(), 5);
        assert_eq!(first.total, 12);
        assert_eq!(first.previous, None);
        assert_eq!(first.next, Some(PageWindow::new(2, 5)));

        let third = resolver
            .paginate(&Filter::NoFilter, &sort, PageWindow::new(3, 5))
            .await
            .unwrap();
        assert_eq!(third.items.len(), 2);
        assert_eq!(third.previous, Some(PageWindow::new(2, 5)));
        assert_eq!(third.next, None);
    }

    #[tokio::test]
    async fn test_page_past_the_end_is_empty() {
        let (resolver, _) = resolver(FixedStore::with_rows(12));

        let page = resolver
            .paginate(&Filter::NoFilter, &SortSpec::default(), PageWindow::new(9, 5))
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 12);
        assert_eq!(page.next, None);
        assert_eq!(page.previous, Some(PageWindow::new(8, 5)));
    }

    #[tokio::test]
    async fn test_rejects_invalid_window() {
        let (resolver, _) = resolver(FixedStore::with_rows(3));

        let err = resolver
            .paginate(&Filter::NoFilter, &SortSpec::default(), PageWindow::new(0, 5))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::InvalidWindow(WindowError::InvalidPage { page: 0 })
        ));

        let err = resolver
            .paginate(&Filter::NoFilter, &SortSpec::default(), PageWindow::new(1, 501))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_WINDOW");
    }

    #[tokio::test]
    async fn test_unknown_sort_column_falls_back() {
        let (resolver, store) = resolver(FixedStore::with_rows(3));

        resolver
            .paginate(
                &Filter::NoFilter,
                &SortSpec::desc("publisher"),
                PageWindow::new(1, 5),
            )
            .await
            .unwrap();

        let applied = store.last_sort.lock().unwrap().clone();
        assert_eq!(applied, Some(SortSpec::desc("productId")));
    }

    #[tokio::test]
    async fn test_store_filter_error_is_invalid_filter() {
        let (resolver, _) = resolver(FixedStore {
            fail: Some("filter"),
            ..FixedStore::with_rows(3)
        });

        let err = resolver
            .paginate(&Filter::NoFilter, &SortSpec::default(), PageWindow::new(1, 5))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidFilter(_)));
    }

    #[tokio::test]
    async fn test_store_failure_is_storage_error() {
        let (resolver, _) = resolver(FixedStore {
            fail: Some("replica"),
            ..FixedStore::with_rows(3)
        });

        let err = resolver
            .paginate(&Filter::NoFilter, &SortSpec::default(), PageWindow::new(1, 5))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "STORAGE_ERROR");
        assert!(err.to_string().contains("replica is down"));
    }

    #[tokio::test]
    async fn test_resolve_rejects_ambiguous_filter() {
        use crate::core::filter::Clause;

        let (resolver, _) = resolver(FixedStore::with_rows(3));
        let mut request = PageRequest::new(
            PageWindow::new(1, 5),
            &SortSpec::default(),
            Filter::any_of(vec![Clause::contains("title", "game")]),
        );
        request.query = Some(r#"{"$or":[{"price":{"$eq":1}}]}"#.to_string());

        let err = resolver.resolve(&request).await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidFilter(FilterError::Ambiguous)));
    }
}
