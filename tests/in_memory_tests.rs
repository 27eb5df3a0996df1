//! Integration tests for InMemoryCatalogStore using the catalog test harness.
//!
//! This file invokes `catalog_store_tests!` to validate that
//! InMemoryCatalogStore fully conforms to the CatalogStore contract.

#[macro_use]
mod catalog_harness;

use catalog::core::row::Product;
use catalog::storage::InMemoryCatalogStore;
use catalog_harness::*;

async fn seeded_in_memory_store(products: Vec<Product>) -> InMemoryCatalogStore {
    InMemoryCatalogStore::with_products(products)
}

catalog_store_tests!(seeded_in_memory_store);
