//! Core module containing the catalog domain types and traits

pub mod error;
pub mod field;
pub mod filter;
pub mod query;
pub mod row;
pub mod store;
pub mod validation;

pub use error::{
    CatalogError, CatalogResult, ConfigError, ErrorResponse, FieldViolation, FilterError,
    StorageError, ValidationError, WindowError,
};
pub use field::FieldValue;
pub use filter::{Clause, Filter, FilterMatcher, FilterPredicate};
pub use query::{PageQueryParams, PageRequest, PageResult, PageWindow, SortDirection, SortSpec};
pub use row::Product;
pub use store::CatalogStore;
