use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use dealfinder_core::Deal;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct SearchQuery {
    pub product: Option<String>,
}

/// `GET /api/search?product=...`: every source's deals, cheapest first.
///
/// The product is validated before any source is contacted. It is handed to
/// the sources as given; each source encodes it for its own search URL.
pub(super) async fn search_deals(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<Deal>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    let product = query
        .product
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| {
            ApiError::InvalidRequest("query parameter 'product' is required".to_string())
        })?;

    tracing::info!(request_id = %req_id.0, product = %product, "searching deals");

    let aggregator = Arc::clone(&state.aggregator);
    let deals = tokio::spawn(async move { aggregator.aggregate(&product).await })
        .await
        .map_err(|e| {
            tracing::error!(request_id = %req_id.0, error = %e, "deal aggregation task failed");
            ApiError::Internal("failed to fetch deals".to_string())
        })?;

    tracing::debug!(request_id = %req_id.0, deals = deals.len(), "search complete");
    Ok(Json(deals))
}
