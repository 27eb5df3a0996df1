//! Fetch-ahead cache for browsing a catalog page by page
//!
//! The cache accumulates rows in batches of `page_size * batch_factor` and
//! serves visible pages as slices of that buffer. Only when the operator
//! pages past the loaded rows does it ask the resolver for the next batch.
//!
//! # Resets and generations
//!
//! Changing the sort, the filter or the page size is a full reset: the
//! generation counter is bumped, the buffer is emptied and the first batch
//! is fetched again. Every fetch remembers the generation it was started
//! under; a response that completes after a newer reset is dropped.
//!
//! # Loading
//!
//! At most one fetch per generation is in flight. Page changes that would
//! need another fetch while one is pending return [`FetchOutcome::InFlight`].
//! A fetch that exceeds the timeout clears `loading` and reports a retryable
//! [`CacheError::Timeout`]; the generation is kept so [`FetchAheadCache::retry`]
//! resumes where it stopped.
//!
//! # Failed resets
//!
//! When the first batch of a reset fails, the previous parameters and rows
//! are put back. A retryable failure remembers the attempted parameters for
//! [`FetchAheadCache::retry`]. The generation bumped by the reset is not
//! rolled back, so restored rows are never mistaken for an older response.
//!
//! Batches are capped at `max_batch` rows (but never fewer than one page) so
//! large page sizes stay within the server's limit.

use super::error::CacheError;
use super::transport::PageFetcher;
use super::translator::FilterTranslator;
use crate::config::ClientConfig;
use crate::core::filter::Filter;
use crate::core::query::{PageRequest, PageResult, PageWindow, SortSpec};
use crate::core::row::Product;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Sizing and timeout settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub page_size: usize,
    pub batch_factor: usize,
    pub fetch_timeout: Duration,
    /// Upper bound on rows per request
    pub max_batch: usize,
}

impl CacheSettings {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            page_size: config.page_size,
            batch_factor: config.batch_factor,
            fetch_timeout: config.fetch_timeout(),
            max_batch: config.max_batch_rows,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}

/// What a cache operation did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was served from loaded rows
    Cached,

    /// A batch was fetched and `appended` rows were added
    Fetched { appended: usize },

    /// Everything is loaded; the display page was clamped to the last page
    Exhausted,

    /// A fetch for this generation is already pending
    InFlight,

    /// The response arrived after a reset and was dropped
    Discarded,

    /// Nothing to do
    Idle,
}

/// Parameters every row in the buffer was fetched under
#[derive(Debug, Clone, PartialEq)]
pub struct BrowseParams {
    pub sort: SortSpec,
    pub filter: Filter,
    pub page_size: usize,
}

/// Read-only view of the cache state
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSnapshot {
    pub rows: Vec<Product>,
    pub total_loaded: usize,
    pub total: Option<u64>,
    pub display_page: usize,
    pub page_size: usize,
    pub generation: u64,
    pub loading: bool,
    pub last_error: Option<CacheError>,
    pub sort: SortSpec,
    pub filter: Filter,
}

#[derive(Debug, Clone, PartialEq)]
enum PendingFetch {
    /// First batch under these parameters
    Initial { params: BrowseParams },
    Append { target_page: usize },
}

/// State to return to when the first batch of a reset fails
#[derive(Debug, Clone)]
struct Restore {
    params: BrowseParams,
    rows: Vec<Product>,
    total: Option<u64>,
    display_page: usize,
}

#[derive(Debug)]
struct CacheState {
    params: BrowseParams,
    rows: Vec<Product>,
    total: Option<u64>,
    display_page: usize,
    generation: u64,
    loading: bool,
    last_error: Option<CacheError>,
    retry: Option<PendingFetch>,
    restore: Option<Restore>,
}

impl CacheState {
    fn batch_limit(&self, settings: &CacheSettings) -> usize {
        self.params
            .page_size
            .saturating_mul(settings.batch_factor)
            .min(settings.max_batch)
            .max(self.params.page_size)
    }

    fn loaded_pages(&self) -> usize {
        self.rows.len().div_ceil(self.params.page_size).max(1)
    }

    fn capture(&self) -> Restore {
        Restore {
            params: self.params.clone(),
            rows: self.rows.clone(),
            total: self.total,
            display_page: self.display_page,
        }
    }

    fn apply(&mut self, restore: Restore) {
        self.params = restore.params;
        self.rows = restore.rows;
        self.total = restore.total;
        self.display_page = restore.display_page;
    }

    /// Empty the buffer under `params` and build the first-batch request
    fn begin_initial(
        &mut self,
        params: BrowseParams,
        restore: Restore,
        settings: &CacheSettings,
    ) -> PageRequest {
        self.params = params;
        self.rows.clear();
        self.total = None;
        self.display_page = 1;
        self.loading = true;
        self.last_error = None;
        self.retry = None;
        self.restore = Some(restore);

        let limit = self.batch_limit(settings);
        self.request(1, limit)
    }

    fn request(&self, page: usize, limit: usize) -> PageRequest {
        PageRequest::new(
            PageWindow::new(page as i64, limit as i64),
            &self.params.sort,
            self.params.filter.clone(),
        )
    }
}

/// Client-side page buffer over a [`PageFetcher`]
///
/// Cloning shares the same buffer.
#[derive(Clone)]
pub struct FetchAheadCache {
    state: Arc<Mutex<CacheState>>,
    fetcher: Arc<dyn PageFetcher>,
    translator: FilterTranslator,
    settings: CacheSettings,
}

impl FetchAheadCache {
    pub fn new(fetcher: Arc<dyn PageFetcher>, settings: CacheSettings) -> Self {
        let state = CacheState {
            params: BrowseParams {
                sort: SortSpec::default(),
                filter: Filter::NoFilter,
                page_size: settings.page_size,
            },
            rows: Vec::new(),
            total: None,
            display_page: 1,
            generation: 0,
            loading: false,
            last_error: None,
            retry: None,
            restore: None,
        };

        Self {
            state: Arc::new(Mutex::new(state)),
            fetcher,
            translator: FilterTranslator::default(),
            settings,
        }
    }

    /// Use a custom search field mapping for [`search`](Self::search)
    pub fn with_translator(mut self, translator: FilterTranslator) -> Self {
        self.translator = translator;
        self
    }

    pub fn settings(&self) -> CacheSettings {
        self.settings
    }

    /// Start a browse session with `page_size` rows per page
    pub async fn initialize(&self, page_size: usize) -> Result<FetchOutcome, CacheError> {
        self.set_page_size(page_size).await
    }

    pub async fn set_sort(&self, sort: SortSpec) -> Result<FetchOutcome, CacheError> {
        self.reset(|params| params.sort = sort).await
    }

    pub async fn set_filter(&self, filter: Filter) -> Result<FetchOutcome, CacheError> {
        self.reset(|params| params.filter = filter).await
    }

    /// Translate search text and apply it; blank text clears the filter
    pub async fn search(&self, text: &str) -> Result<FetchOutcome, CacheError> {
        let filter = self.translator.translate(text);
        self.set_filter(filter).await
    }

    pub async fn set_page_size(&self, page_size: usize) -> Result<FetchOutcome, CacheError> {
        if page_size == 0 {
            return Err(CacheError::InvalidWindow(
                "page size must be at least 1".to_string(),
            ));
        }
        self.reset(|params| params.page_size = page_size).await
    }

    /// Show `new_page`, fetching the next batch when it is not loaded yet
    pub async fn on_page_change(&self, new_page: usize) -> Result<FetchOutcome, CacheError> {
        if new_page == 0 {
            return Err(CacheError::InvalidWindow(
                "page must be at least 1".to_string(),
            ));
        }

        let (generation, request, offset) = {
            let mut state = self.state.lock().await;

            if new_page.saturating_mul(state.params.page_size) <= state.rows.len() {
                state.display_page = new_page;
                return Ok(FetchOutcome::Cached);
            }

            let Some(total) = state.total else {
                if state.loading {
                    return Ok(FetchOutcome::InFlight);
                }
                return Err(CacheError::NotLoaded { page: new_page });
            };

            if state.rows.len() as u64 >= total {
                let clamped = new_page.min(state.loaded_pages());
                state.display_page = clamped;
                return Ok(if clamped == new_page {
                    FetchOutcome::Cached
                } else {
                    FetchOutcome::Exhausted
                });
            }

            if state.loading {
                return Ok(FetchOutcome::InFlight);
            }

            let batch_limit = state.batch_limit(&self.settings);
            let loaded = state.rows.len();
            let batch_page = loaded / batch_limit + 1;

            state.loading = true;
            state.last_error = None;
            state.retry = None;

            tracing::debug!(
                generation = state.generation,
                page = batch_page,
                limit = batch_limit,
                loaded,
                target_page = new_page,
                "fetching next batch"
            );

            (
                state.generation,
                state.request(batch_page, batch_limit),
                loaded % batch_limit,
            )
        };

        let result = self.fetch(request).await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            tracing::debug!(
                generation,
                current = state.generation,
                "discarding stale batch"
            );
            return Ok(FetchOutcome::Discarded);
        }
        state.loading = false;

        match result {
            Ok(page) => {
                let before = state.rows.len();
                state.rows.extend(page.items.into_iter().skip(offset));
                let appended = state.rows.len() - before;

                let loaded = state.rows.len() as u64;
                state.total = Some(if appended == 0 {
                    loaded
                } else {
                    page.total.max(loaded)
                });
                state.display_page = new_page.min(state.loaded_pages());

                tracing::debug!(
                    generation,
                    appended,
                    total_loaded = state.rows.len(),
                    total = page.total,
                    "appended batch"
                );
                Ok(FetchOutcome::Fetched { appended })
            }
            Err(err) => {
                tracing::warn!(generation, error = %err, "batch fetch failed");
                if err.is_retryable() {
                    state.retry = Some(PendingFetch::Append {
                        target_page: new_page,
                    });
                }
                state.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Re-issue the last failed fetch under the current generation
    pub async fn retry(&self) -> Result<FetchOutcome, CacheError> {
        let (generation, request) = {
            let mut state = self.state.lock().await;
            if state.loading {
                return Ok(FetchOutcome::InFlight);
            }

            let params = match state.retry.take() {
                None => return Ok(FetchOutcome::Idle),
                Some(PendingFetch::Append { target_page }) => {
                    drop(state);
                    return self.on_page_change(target_page).await;
                }
                Some(PendingFetch::Initial { params }) => params,
            };

            let restore = state.capture();
            let request = state.begin_initial(params, restore, &self.settings);

            tracing::debug!(generation = state.generation, "retrying first batch");
            (state.generation, request)
        };

        self.complete_initial(generation, request).await
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> CacheSnapshot {
        let state = self.state.lock().await;
        CacheSnapshot {
            rows: state.rows.clone(),
            total_loaded: state.rows.len(),
            total: state.total,
            display_page: state.display_page,
            page_size: state.params.page_size,
            generation: state.generation,
            loading: state.loading,
            last_error: state.last_error.clone(),
            sort: state.params.sort.clone(),
            filter: state.params.filter.clone(),
        }
    }

    /// Rows of the display page
    pub async fn page_rows(&self) -> Vec<Product> {
        let state = self.state.lock().await;
        let size = state.params.page_size;
        let start = (state.display_page - 1).saturating_mul(size);
        let end = start.saturating_add(size).min(state.rows.len());

        state
            .rows
            .get(start..end)
            .map(<[Product]>::to_vec)
            .unwrap_or_default()
    }

    /// Number of pages the operator can reach, from `total` once known
    pub async fn page_count(&self) -> usize {
        let state = self.state.lock().await;
        let rows = match state.total {
            Some(total) => usize::try_from(total).unwrap_or(usize::MAX),
            None => state.rows.len(),
        };
        rows.div_ceil(state.params.page_size)
    }

    async fn reset(
        &self,
        update: impl FnOnce(&mut BrowseParams),
    ) -> Result<FetchOutcome, CacheError> {
        let (generation, request) = {
            let mut state = self.state.lock().await;

            let restore = state.restore.take().unwrap_or_else(|| state.capture());
            let mut params = state.params.clone();
            update(&mut params);

            state.generation += 1;
            let request = state.begin_initial(params, restore, &self.settings);

            tracing::debug!(
                generation = state.generation,
                page_size = state.params.page_size,
                limit = request.limit,
                sort_column = %state.params.sort.column,
                filtered = state.params.filter.is_active(),
                "cache reset"
            );

            (state.generation, request)
        };

        self.complete_initial(generation, request).await
    }

    async fn complete_initial(
        &self,
        generation: u64,
        request: PageRequest,
    ) -> Result<FetchOutcome, CacheError> {
        let limit = request.limit.max(0) as usize;
        let result = self.fetch(request).await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            tracing::debug!(
                generation,
                current = state.generation,
                "discarding stale first batch"
            );
            return Ok(FetchOutcome::Discarded);
        }
        state.loading = false;

        match result {
            Ok(PageResult { mut items, total, .. }) => {
                items.truncate(limit);
                let appended = items.len();
                state.rows = items;
                state.total = Some(total.max(appended as u64));
                state.restore = None;

                tracing::debug!(generation, appended, total, "loaded first batch");
                Ok(FetchOutcome::Fetched { appended })
            }
            Err(err) => {
                tracing::warn!(
                    generation,
                    error = %err,
                    retryable = err.is_retryable(),
                    "first batch failed, restoring previous view"
                );
                let attempted = state.params.clone();
                if let Some(restore) = state.restore.take() {
                    state.apply(restore);
                }
                if err.is_retryable() {
                    state.retry = Some(PendingFetch::Initial { params: attempted });
                }
                state.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    async fn fetch(&self, request: PageRequest) -> Result<PageResult<Product>, CacheError> {
        let timeout = self.settings.fetch_timeout;
        match tokio::time::timeout(timeout, self.fetcher.fetch(request)).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::Timeout(timeout)),
        }
    }
}
