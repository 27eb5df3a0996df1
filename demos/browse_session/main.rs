//! Browse Session Example
//!
//! Walks a catalog with the fetch-ahead cache the way a browse table would:
//! page forward, change the sort, search, then clear the search.
//!
//! Without arguments the cache talks to an in-process resolver. Pass a base
//! URL (e.g. `http://127.0.0.1:3000`) to browse a running `catalog_server`.

#[path = "../shared/seed.rs"]
mod seed;

use catalog::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("catalog=debug")),
        )
        .init();

    let config = CatalogConfig::default_config();
    let fetcher: Arc<dyn PageFetcher> = match std::env::args().nth(1) {
        Some(base_url) => {
            tracing::info!(%base_url, "browsing remote catalog");
            Arc::new(HttpPageFetcher::with_timeout(
                &base_url,
                config.client.fetch_timeout(),
            )?)
        }
        None => {
            let store = InMemoryCatalogStore::with_products(seed::demo_catalog());
            let resolver = PaginationResolver::with_config(Arc::new(store), config.resolver.clone());
            Arc::new(LocalPageFetcher::new(resolver))
        }
    };

    let cache = FetchAheadCache::new(fetcher, CacheSettings::from_config(&config.client))
        .with_translator(FilterTranslator::from_config(&config.search));

    cache.initialize(config.client.page_size).await?;
    show(&cache, "first page").await;

    for page in [2, 5, 6, 8] {
        let outcome = cache.on_page_change(page).await?;
        show(&cache, &format!("page {} ({:?})", page, outcome)).await;
    }

    cache.set_sort(SortSpec::desc("price")).await?;
    show(&cache, "sorted by price desc").await;

    cache.search("hades").await?;
    show(&cache, "search 'hades'").await;

    cache.search("").await?;
    show(&cache, "search cleared").await;

    Ok(())
}

async fn show(cache: &FetchAheadCache, label: &str) {
    let snapshot = cache.snapshot().await;
    println!(
        "\n== {} | page {}/{} | {} of {:?} rows loaded | generation {}",
        label,
        snapshot.display_page,
        cache.page_count().await,
        snapshot.total_loaded,
        snapshot.total,
        snapshot.generation,
    );
    for product in cache.page_rows().await {
        println!(
            "  #{:<3} {:<32} {:<5} {:>7.2} -{}%",
            product.product_id, product.title, product.kind, product.price, product.discount
        );
    }
}
