//! MongoDB storage backend using the official MongoDB async driver.
//!
//! # Feature flag
//!
//! This module is gated behind the `mongodb_backend` feature flag:
//! ```toml
//! [dependencies]
//! catalog-browse = { version = "0.1", features = ["mongodb_backend"] }
//! ```
//!
//! # Storage model
//!
//! Products live in one collection (default `products`). Documents use the
//! canonical camelCase field names; `productId` is mirrored into `_id` on
//! write and `_id` is dropped on read.
//!
//! Filters are lowered through their Mongo-style query document, so substring
//! needles become `$regex` patterns escaped exactly once with `$options: "i"`.

use crate::core::filter::Filter;
use crate::core::query::{SortDirection, SortSpec};
use crate::core::row::Product;
use crate::core::store::CatalogStore;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::{Collection, Database};

/// Default collection name
pub const PRODUCTS_COLLECTION: &str = "products";

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Lower a filter to a BSON query document
fn filter_to_document(filter: &Filter) -> Result<Document> {
    filter.validate()?;

    match mongodb::bson::to_bson(&filter.to_query_value())
        .map_err(|e| anyhow!("Failed to convert filter to BSON: {}", e))?
    {
        Bson::Document(d) => Ok(d),
        _ => Err(anyhow!("Expected BSON document, got non-object")),
    }
}

/// Sort document with a `productId` tie-break
fn sort_document(sort: &SortSpec) -> Document {
    let direction = match sort.direction {
        SortDirection::Asc => 1,
        SortDirection::Desc => -1,
    };

    let mut sort_doc = Document::new();
    sort_doc.insert(sort.column.clone(), direction);
    if sort.column != Product::DEFAULT_SORT_COLUMN {
        sort_doc.insert(Product::DEFAULT_SORT_COLUMN, 1);
    }
    sort_doc
}

/// Convert a product into a document keyed by its id
fn product_to_document(product: &Product) -> Result<Document> {
    let mut doc = mongodb::bson::to_document(product)
        .map_err(|e| anyhow!("Failed to serialize product: {}", e))?;
    doc.insert("_id", product.product_id);
    Ok(doc)
}

/// Convert a stored document back into a product
fn document_to_product(mut doc: Document) -> Result<Product> {
    doc.remove("_id");
    let json = Bson::Document(doc).into_relaxed_extjson();
    serde_json::from_value(json)
        .map_err(|e| anyhow!("Failed to deserialize product from document: {}", e))
}

// ---------------------------------------------------------------------------
// MongoCatalogStore
// ---------------------------------------------------------------------------

/// Catalog store backed by a MongoDB collection.
///
/// # Example
///
/// ```rust,ignore
/// use mongodb::Client;
/// use catalog::storage::MongoCatalogStore;
///
/// let client = Client::with_uri_str("mongodb://localhost:27017").await?;
/// let store = MongoCatalogStore::new(client.database("shop"));
/// ```
#[derive(Clone, Debug)]
pub struct MongoCatalogStore {
    database: Database,
    collection_name: String,
}

impl MongoCatalogStore {
    /// Create a store over the `products` collection
    pub fn new(database: Database) -> Self {
        Self::with_collection(database, PRODUCTS_COLLECTION)
    }

    /// Create a store over a named collection
    pub fn with_collection(database: Database, collection_name: impl Into<String>) -> Self {
        Self {
            database,
            collection_name: collection_name.into(),
        }
    }

    /// Get a reference to the underlying database.
    pub fn database(&self) -> &Database {
        &self.database
    }

    fn collection(&self) -> Collection<Document> {
        self.database.collection(&self.collection_name)
    }

    /// Insert or replace a product by `productId`
    pub async fn upsert(&self, product: &Product) -> Result<()> {
        let doc = product_to_document(product)?;

        self.collection()
            .replace_one(doc! { "_id": product.product_id }, doc)
            .upsert(true)
            .await
            .map_err(|e| anyhow!("Failed to upsert product: {}", e))?;

        Ok(())
    }

    /// Insert many products, replacing existing ids
    pub async fn upsert_many(&self, products: &[Product]) -> Result<()> {
        for product in products {
            self.upsert(product).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for MongoCatalogStore {
    async fn count(&self, filter: &Filter) -> Result<u64> {
        let query = filter_to_document(filter)?;

        self.collection()
            .count_documents(query)
            .await
            .map_err(|e| anyhow!("Failed to count products: {}", e))
    }

    async fn find(
        &self,
        filter: &Filter,
        sort: &SortSpec,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Product>> {
        let query = filter_to_document(filter)?;
        let limit = i64::try_from(limit).map_err(|_| anyhow!("Limit out of range: {}", limit))?;

        let cursor = self
            .collection()
            .find(query)
            .sort(sort_document(sort))
            .skip(skip)
            .limit(limit)
            .await
            .map_err(|e| anyhow!("Failed to find products: {}", e))?;

        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| anyhow!("Failed to collect products: {}", e))?;

        docs.into_iter().map(document_to_product).collect()
    }

    fn backend_name(&self) -> &'static str {
        "mongodb"
    }
}
