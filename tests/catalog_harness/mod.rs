//! Shared test harness for catalog stores, the resolver and the browse cache
//!
//! Provides product fixtures, a `ScriptedFetcher` whose responses can be
//! held, failed or hung per call, and the `catalog_store_tests!` macro that
//! checks a `CatalogStore` implementation against the store contract.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod catalog_harness;
//! use catalog_harness::*;
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod store_contract;

use async_trait::async_trait;
use catalog::client::{CacheError, CacheSettings, FetchAheadCache, LocalPageFetcher, PageFetcher};
use catalog::core::query::{PageRequest, PageResult};
use catalog::core::row::Product;
use catalog::resolver::PaginationResolver;
use catalog::storage::InMemoryCatalogStore;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Twelve products with mixed types, prices and discounts.
///
/// - id 4 costs exactly 42
/// - id 9 has "42" in its title
/// - ids 2, 5 and 11 are DLC
pub fn sample_catalog() -> Vec<Product> {
    vec![
        Product::new(1, "Portal", "game", 9.99, 0),
        Product::new(2, "Portal 2 Soundtrack", "dlc", 4.99, 0),
        Product::new(3, "Half-Life 2", "game", 19.99, 50),
        Product::new(4, "Hades", "game", 42.0, 0),
        Product::new(5, "Hades Artbook", "dlc", 2.99, 10),
        Product::new(6, "Celeste", "game", 19.99, 0),
        Product::new(7, "Stardew Valley", "game", 14.99, 20),
        Product::new(8, "Factorio", "game", 35.0, 0),
        Product::new(9, "Area 42", "game", 7.5, 0),
        Product::new(10, "Outer Wilds", "game", 24.99, 30),
        Product::new(11, "Outer Wilds: Echoes", "dlc", 9.99, 0),
        Product::new(12, "Baba Is You", "game", 14.99, 0),
    ]
}

/// `n` products with ids `1..=n`, prices rising with the id
pub fn numbered_catalog(n: i64) -> Vec<Product> {
    (1..=n)
        .map(|id| Product::new(id, format!("Item {:03}", id), "game", id as f64, 0))
        .collect()
}

pub fn ids(rows: &[Product]) -> Vec<i64> {
    rows.iter().map(|p| p.product_id).collect()
}

pub fn in_memory_resolver(products: Vec<Product>) -> PaginationResolver {
    PaginationResolver::new(Arc::new(InMemoryCatalogStore::with_products(products)))
}

/// Cache settings matching the default browse table: 5 rows, 5 pages a batch
pub fn table_settings() -> CacheSettings {
    CacheSettings {
        page_size: 5,
        batch_factor: 5,
        fetch_timeout: Duration::from_secs(5),
        max_batch: 500,
    }
}

// ---------------------------------------------------------------------------
// ScriptedFetcher
// ---------------------------------------------------------------------------

/// What the next fetch does
pub enum Script {
    /// Answer from the resolver immediately
    Pass,
    /// Signal `started`, wait for `release`, then answer from the resolver
    Hold {
        started: oneshot::Sender<()>,
        release: oneshot::Receiver<()>,
    },
    /// Fail with this error
    Fail(CacheError),
    /// Never answer
    Hang,
}

/// Fetcher over an in-memory resolver with per-call scripting
///
/// Calls without a queued script pass straight through.
pub struct ScriptedFetcher {
    inner: LocalPageFetcher,
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<PageRequest>>,
    calls: AtomicUsize,
}

/// Handles for a held fetch
pub struct HeldFetch {
    pub started: oneshot::Receiver<()>,
    pub release: oneshot::Sender<()>,
}

impl HeldFetch {
    /// Wait until the held fetch has been issued
    pub async fn started(&mut self) {
        (&mut self.started)
            .await
            .expect("held fetch dropped before starting");
    }

    pub fn release(self) {
        let _ = self.release.send(());
    }
}

impl ScriptedFetcher {
    pub fn new(products: Vec<Product>) -> Arc<Self> {
        Arc::new(Self {
            inner: LocalPageFetcher::new(in_memory_resolver(products)),
            scripts: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn push(&self, script: Script) {
        self.scripts.lock().unwrap().push_back(script);
    }

    /// Queue a held response
    pub fn hold_next(&self) -> HeldFetch {
        let (started_tx, started_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        self.push(Script::Hold {
            started: started_tx,
            release: release_rx,
        });
        HeldFetch {
            started: started_rx,
            release: release_tx,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, request: PageRequest) -> Result<PageResult<Product>, CacheError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        let script = self.scripts.lock().unwrap().pop_front().unwrap_or(Script::Pass);

        match script {
            Script::Pass => {}
            Script::Hold { started, release } => {
                let _ = started.send(());
                let _ = release.await;
            }
            Script::Fail(err) => return Err(err),
            Script::Hang => std::future::pending::<()>().await,
        }

        self.inner.fetch(request).await
    }
}

/// Cache over a scripted fetcher with table settings
pub fn scripted_cache(products: Vec<Product>) -> (FetchAheadCache, Arc<ScriptedFetcher>) {
    scripted_cache_with(products, table_settings())
}

pub fn scripted_cache_with(
    products: Vec<Product>,
    settings: CacheSettings,
) -> (FetchAheadCache, Arc<ScriptedFetcher>) {
    let fetcher = ScriptedFetcher::new(products);
    let cache = FetchAheadCache::new(fetcher.clone(), settings);
    (cache, fetcher)
}
