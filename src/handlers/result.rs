// src/handlers/result.rs

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};

use crate::{
    error::AppError,
    models::{
        pagination::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, ListParams, ListResponse, Pagination},
        result::PopulatedResult,
    },
    store::ResultStore,
};

/// Parses a 1-based pagination value, falling back to `default` when absent.
fn parse_positive(raw: Option<&str>, default: u64) -> Result<u64, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value
            .parse::<u64>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| AppError::ParamsInvalid("params_invalid".to_string())),
    }
}

/// Lists exam results, newest first, with pagination metadata.
///
/// Staff only (enforced by the route's middleware). Every failure, including a
/// malformed query string, is reported in the body with `success: false`.
pub async fn list_results(
    State(store): State<ResultStore>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ListResponse<PopulatedResult>>, AppError> {
    let Query(params) = params.map_err(|e| {
        tracing::debug!("Rejected list query: {}", e.body_text());
        AppError::ParamsInvalid("params_invalid".to_string())
    })?;

    let page = parse_positive(params.page.as_deref(), DEFAULT_PAGE)?;
    let page_size = parse_positive(params.page_size.as_deref(), DEFAULT_PAGE_SIZE)?;

    let total_items = store.get_count().await?;
    let pagination = Pagination::new(total_items, page, page_size);

    let data = store.get_list(page, page_size).await?;

    tracing::debug!("Listed {} results (page {} of {})", data.len(), page, pagination.total_pages);

    Ok(Json(ListResponse::new(data, pagination)))
}
