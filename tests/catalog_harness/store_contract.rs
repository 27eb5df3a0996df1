//! Macro-generated test suite for `CatalogStore` contract validation.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod catalog_harness;
//!
//! use catalog_harness::*;
//!
//! async fn seeded(products: Vec<Product>) -> InMemoryCatalogStore {
//!     InMemoryCatalogStore::with_products(products)
//! }
//!
//! catalog_store_tests!(seeded);
//! ```
//!
//! # Generated Tests
//!
//! - `test_count_all` / `test_count_filtered`
//! - `test_find_default_order` / `test_find_descending_with_tie_break`
//! - `test_find_window` / `test_find_past_end`
//! - `test_contains_is_case_insensitive_and_literal`
//! - `test_numeric_equality`
//! - `test_rejects_operator_field_names`
//! - `test_count_and_find_run_concurrently`

/// Generate a `CatalogStore` conformance test suite.
///
/// `$seed` must be an async function taking `Vec<Product>` and returning a
/// store holding exactly those products. It is called once per test.
#[macro_export]
macro_rules! catalog_store_tests {
    ($seed:expr) => {
        mod catalog_store_contract_tests {
            use super::*;
            use catalog::core::error::FilterError;
            use catalog::core::filter::{Clause, Filter};
            use catalog::core::query::SortSpec;
            use catalog::core::row::Product;
            use catalog::core::store::CatalogStore;

            // ==================================================================
            // Count
            // ==================================================================

            #[tokio::test]
            async fn test_count_all() {
                let store = $seed(sample_catalog()).await;
                assert_eq!(store.count(&Filter::NoFilter).await.unwrap(), 12);
            }

            #[tokio::test]
            async fn test_count_filtered() {
                let store = $seed(sample_catalog()).await;
                let filter = Filter::any_of(vec![Clause::contains("type", "dlc")]);
                assert_eq!(store.count(&filter).await.unwrap(), 3);
            }

            // ==================================================================
            // Find: ordering and windows
            // ==================================================================

            #[tokio::test]
            async fn test_find_default_order() {
                let store = $seed(sample_catalog()).await;
                let rows = store
                    .find(&Filter::NoFilter, &SortSpec::default(), 0, 5)
                    .await
                    .unwrap();
                assert_eq!(ids(&rows), vec![1, 2, 3, 4, 5]);
            }

            #[tokio::test]
            async fn test_find_descending_with_tie_break() {
                let store = $seed(sample_catalog()).await;
                let rows = store
                    .find(&Filter::NoFilter, &SortSpec::desc("price"), 0, 5)
                    .await
                    .unwrap();
                // 19.99 is shared by ids 3 and 6
                assert_eq!(ids(&rows), vec![4, 8, 10, 3, 6]);
            }

            #[tokio::test]
            async fn test_find_window() {
                let store = $seed(sample_catalog()).await;
                let rows = store
                    .find(&Filter::NoFilter, &SortSpec::default(), 10, 5)
                    .await
                    .unwrap();
                assert_eq!(ids(&rows), vec![11, 12]);
            }

            #[tokio::test]
            async fn test_find_past_end() {
                let store = $seed(sample_catalog()).await;
                let rows = store
                    .find(&Filter::NoFilter, &SortSpec::default(), 40, 5)
                    .await
                    .unwrap();
                assert!(rows.is_empty());
            }

            // ==================================================================
            // Predicates
            // ==================================================================

            #[tokio::test]
            async fn test_contains_is_case_insensitive_and_literal() {
                let mut products = sample_catalog();
                products.push(Product::new(13, "C++ Primer (2nd ed.)", "book", 30.0, 0));
                let store = $seed(products).await;

                let filter = Filter::any_of(vec![Clause::contains("title", "HADES")]);
                let rows = store
                    .find(&filter, &SortSpec::default(), 0, 10)
                    .await
                    .unwrap();
                assert_eq!(ids(&rows), vec![4, 5]);

                let filter = Filter::any_of(vec![Clause::contains("title", "c++ primer (2")]);
                assert_eq!(store.count(&filter).await.unwrap(), 1);

                let filter = Filter::any_of(vec![Clause::contains("title", "a.e")]);
                assert_eq!(store.count(&filter).await.unwrap(), 0);
            }

            #[tokio::test]
            async fn test_numeric_equality() {
                let store = $seed(sample_catalog()).await;
                let filter = Filter::any_of(vec![
                    Clause::contains("title", "42"),
                    Clause::equals("price", 42.0),
                ]);

                let rows = store
                    .find(&filter, &SortSpec::default(), 0, 10)
                    .await
                    .unwrap();
                assert_eq!(ids(&rows), vec![4, 9]);
                assert_eq!(store.count(&filter).await.unwrap(), 2);
            }

            #[tokio::test]
            async fn test_rejects_operator_field_names() {
                let store = $seed(sample_catalog()).await;
                let filter = Filter::any_of(vec![Clause::contains("$where", "1")]);

                let err = store.count(&filter).await.unwrap_err();
                assert!(err.downcast_ref::<FilterError>().is_some());
            }

            // ==================================================================
            // Concurrency
            // ==================================================================

            #[tokio::test]
            async fn test_count_and_find_run_concurrently() {
                let store = $seed(sample_catalog()).await;
                let filter = Filter::any_of(vec![Clause::contains("title", "portal")]);
                let sort = SortSpec::default();

                let (total, rows) =
                    tokio::try_join!(store.count(&filter), store.find(&filter, &sort, 0, 1))
                        .unwrap();
                assert_eq!(total, 2);
                assert_eq!(ids(&rows), vec![1]);
            }
        }
    };
}
