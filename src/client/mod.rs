//! Browse client: search translation, transports and the fetch-ahead cache

pub mod cache;
pub mod error;
#[cfg(feature = "client")]
pub mod http;
pub mod translator;
pub mod transport;

pub use cache::{BrowseParams, CacheSettings, CacheSnapshot, FetchAheadCache, FetchOutcome};
pub use error::CacheError;
#[cfg(feature = "client")]
pub use http::HttpPageFetcher;
pub use translator::FilterTranslator;
pub use transport::{LocalPageFetcher, PageFetcher};
