//! The canonical catalog row shared by the resolver and the browse cache

use crate::core::field::FieldValue;
use serde::{Deserialize, Serialize};

/// A product row as stored in the catalog and shown in the browse table.
///
/// Serialization is always camelCase. Older payloads named the title
/// `name` and used snake_case keys; those are accepted on input only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Numeric primary key, the default sort column
    #[serde(alias = "product_id")]
    pub product_id: i64,

    #[serde(alias = "name")]
    pub title: String,

    /// Product type (game, dlc, bundle, ...)
    #[serde(rename = "type")]
    pub kind: String,

    pub price: f64,

    /// Discount in percent
    #[serde(default)]
    pub discount: i64,

    #[serde(
        default,
        alias = "header_image",
        skip_serializing_if = "Option::is_none"
    )]
    pub header_image: Option<String>,
}

impl Product {
    /// Column used when no valid sort column is requested
    pub const DEFAULT_SORT_COLUMN: &'static str = "productId";

    /// Columns a catalog listing may be sorted by
    pub const SORTABLE_COLUMNS: &'static [&'static str] =
        &["productId", "title", "type", "price", "discount"];

    pub fn new(
        product_id: i64,
        title: impl Into<String>,
        kind: impl Into<String>,
        price: f64,
        discount: i64,
    ) -> Self {
        Self {
            product_id,
            title: title.into(),
            kind: kind.into(),
            price,
            discount,
            header_image: None,
        }
    }

    pub fn with_header_image(mut self, url: impl Into<String>) -> Self {
        self.header_image = Some(url.into());
        self
    }

    /// Read a field by its wire name.
    ///
    /// Legacy snake_case names and `name` for the title resolve to the same
    /// fields. Unknown names return `None`.
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "productId" | "product_id" => FieldValue::Integer(self.product_id),
            "title" | "name" => FieldValue::String(self.title.clone()),
            "type" => FieldValue::String(self.kind.clone()),
            "price" => FieldValue::Float(self.price),
            "discount" => FieldValue::Integer(self.discount),
            "headerImage" | "header_image" => self.header_image.clone().into(),
            _ => return None,
        };
        Some(value)
    }
}
