//! Catalog Server Example
//!
//! Serves a demo catalog from the in-memory store:
//! - `GET  /products/page?page=1&limit=5&sortColumn=price&sortOrder=desc`
//! - `POST /products/page` with a JSON `PageRequest`
//! - `POST /products/validate` with a product payload
//!
//! Pass a YAML config path as the first argument to override the defaults.

#[path = "../shared/seed.rs"]
mod seed;

use catalog::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("catalog=debug,tower_http=info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => CatalogConfig::from_yaml_file(&path)?,
        None => CatalogConfig::default_config(),
    };

    let products = seed::demo_catalog();
    tracing::info!(products = products.len(), bind = %config.server.bind, "starting catalog server");

    println!("\n🌐 Catalog server on http://{}", config.server.bind);
    println!("    GET    /products/page      - Page through products");
    println!("    POST   /products/page      - Page with a typed filter");
    println!("    POST   /products/validate  - Validate a product payload");
    println!("    GET    /health             - Health check\n");

    ServerBuilder::new()
        .with_store(InMemoryCatalogStore::with_products(products))
        .with_config(config)
        .serve_configured()
        .await
}
