//! HTTP handlers for catalog pagination
//!
//! Handlers hold no per-request state beyond the shared resolver; every
//! request is resolved independently.

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::{Value, json};

use crate::core::error::{CatalogError, ValidationError};
use crate::core::query::{PageQueryParams, PageRequest, PageResult};
use crate::core::row::Product;
use crate::core::validation::validate_product;
use crate::resolver::PaginationResolver;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub resolver: PaginationResolver,
}

/// Health check endpoint handler
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "catalog-browse"
    }))
}

/// `GET /products/page`: window, sort and legacy `query` string from the URL
pub async fn get_page(
    State(state): State<AppState>,
    params: Result<Query<PageQueryParams>, QueryRejection>,
) -> Result<Json<PageResult<Product>>, CatalogError> {
    let Query(params) = params.map_err(|rejection| ValidationError::InvalidQuery {
        message: rejection.body_text(),
    })?;

    let request = PageRequest::from(params);
    resolve(&state, &request).await
}

/// `POST /products/page`: a JSON `PageRequest` with a typed filter
pub async fn post_page(
    State(state): State<AppState>,
    payload: Result<Json<PageRequest>, JsonRejection>,
) -> Result<Json<PageResult<Product>>, CatalogError> {
    let Json(request) = payload.map_err(|rejection| ValidationError::InvalidJson {
        message: rejection.body_text(),
    })?;

    resolve(&state, &request).await
}

async fn resolve(
    state: &AppState,
    request: &PageRequest,
) -> Result<Json<PageResult<Product>>, CatalogError> {
    tracing::info!(
        page = request.page,
        limit = request.limit,
        sort_column = %request.sort_column,
        sort_order = request.sort_order.as_str(),
        "paginate request"
    );

    let page = state.resolver.resolve(request).await?;
    Ok(Json(page))
}

/// `POST /products/validate`: check a product payload
///
/// Returns 204 when the payload is valid, otherwise 400 with every field
/// violation.
pub async fn validate(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, CatalogError> {
    let Json(payload) = payload.map_err(|rejection| ValidationError::InvalidJson {
        message: rejection.body_text(),
    })?;

    let violations = validate_product(&payload, Utc::now());
    if violations.is_empty() {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ValidationError::FieldErrors(violations).into())
    }
}
