//! In-memory implementation of CatalogStore for testing and development

use crate::core::field::FieldValue;
use crate::core::filter::Filter;
use crate::core::query::{SortDirection, SortSpec};
use crate::core::row::Product;
use crate::core::store::CatalogStore;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::sync::{Arc, RwLock};

/// In-memory catalog store
///
/// Useful for testing and development. Uses RwLock for thread-safe access.
/// Rows keep insertion order; queries sort a filtered copy.
#[derive(Clone, Default)]
pub struct InMemoryCatalogStore {
    products: Arc<RwLock<Vec<Product>>>,
}

impl InMemoryCatalogStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with `products`
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let store = Self::new();
        if let Ok(mut rows) = store.products.write() {
            for product in products {
                upsert_into(&mut rows, product);
            }
        }
        store
    }

    /// Insert a product, replacing any row with the same `productId`
    pub fn upsert(&self, product: Product) -> Result<()> {
        let mut rows = self
            .products
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        upsert_into(&mut rows, product);
        Ok(())
    }

    /// Remove a product by id, returning whether it existed
    pub fn remove(&self, product_id: i64) -> Result<bool> {
        let mut rows = self
            .products
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let before = rows.len();
        rows.retain(|p| p.product_id != product_id);
        Ok(rows.len() != before)
    }

    /// All products in insertion order
    pub fn list(&self) -> Result<Vec<Product>> {
        let rows = self
            .products
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(rows.clone())
    }

    pub fn len(&self) -> usize {
        self.products.read().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn upsert_into(rows: &mut Vec<Product>, product: Product) {
    match rows.iter_mut().find(|p| p.product_id == product.product_id) {
        Some(existing) => *existing = product,
        None => rows.push(product),
    }
}

/// Order by `sort`, then by ascending `productId`
fn compare_rows(a: &Product, b: &Product, sort: &SortSpec) -> Ordering {
    let key = |p: &Product| p.field(&sort.column).unwrap_or(FieldValue::Null);
    let primary = key(a).compare(&key(b));
    let primary = match sort.direction {
        SortDirection::Asc => primary,
        SortDirection::Desc => primary.reverse(),
    };
    primary.then(a.product_id.cmp(&b.product_id))
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn count(&self, filter: &Filter) -> Result<u64> {
        let matcher = filter.compile()?;
        let rows = self
            .products
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(rows.iter().filter(|p| matcher.matches(p)).count() as u64)
    }

    async fn find(
        &self,
        filter: &Filter,
        sort: &SortSpec,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Product>> {
        let matcher = filter.compile()?;
        let mut matched: Vec<Product> = {
            let rows = self
                .products
                .read()
                .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
            rows.iter().filter(|p| matcher.matches(p)).cloned().collect()
        };

        matched.sort_by(|a, b| compare_rows(a, b, sort));

        Ok(matched
            .into_iter()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "in-memory"
    }
}
