//! Server module exposing the pagination resolver over HTTP
//!
//! `ServerBuilder` wires a catalog store into:
//! - Health check routes
//! - `GET`/`POST /products/page` pagination routes
//! - `POST /products/validate` for product payload checks

pub mod builder;
pub mod handlers;
pub mod router;

pub use builder::ServerBuilder;
pub use handlers::AppState;
