//! API route handlers

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{debug, error};

use crate::analyzers::{Summary, SummaryStatistics};
use crate::error::ProcessingError;
use crate::models::Observation;
use crate::processors::{OutlierOutcome, OutlierQuery};
use crate::query::{Pagination, RangeFilter};
use crate::server::AppState;

type Params = Query<HashMap<String, String>>;

/// Store or processing failure surfaced as `500 {"error": ...}`
pub struct ApiError(ProcessingError);

impl From<ProcessingError> for ApiError {
    fn from(err: ProcessingError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct ObservationsResponse {
    pub count: usize,
    pub items: Vec<Observation>,
}

#[derive(Debug, Serialize)]
pub struct OutliersResponse {
    pub count: usize,
    pub total: usize,
    pub items: Vec<Observation>,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn observations(
    State(state): State<AppState>,
    Query(params): Params,
) -> Result<Json<ObservationsResponse>, ApiError> {
    let predicate = RangeFilter::from_params(&params).to_predicate();
    let page = Pagination::from_params(&params);
    debug!(
        filter = %predicate.to_document(),
        limit = page.limit(),
        skip = page.skip(),
        "observations"
    );

    let count = state.store.count(&predicate)?;
    let items = state.store.find(&predicate, page)?;

    Ok(Json(ObservationsResponse { count, items }))
}

pub async fn stats(
    State(state): State<AppState>,
    Query(params): Params,
) -> Result<Json<Value>, ApiError> {
    let predicate = RangeFilter::from_params(&params).to_predicate();
    let observations = state.store.find_all(&predicate)?;

    let body = match SummaryStatistics::new().summarize(&observations) {
        Summary::NoData => json!({ "message": "no data" }),
        Summary::Fields(fields) => serde_json::to_value(fields).map_err(ProcessingError::from)?,
    };
    Ok(Json(body))
}

pub async fn outliers(
    State(state): State<AppState>,
    Query(params): Params,
) -> Result<Json<Value>, ApiError> {
    let query = OutlierQuery::from_params(&params);
    let predicate = RangeFilter::from_params(&params).to_predicate();
    let observations = state.store.find_all(&predicate)?;

    let body = match query.run(observations) {
        OutlierOutcome::Flagged { items, total } => serde_json::to_value(OutliersResponse {
            count: items.len(),
            total,
            items,
        })
        .map_err(ProcessingError::from)?,
        OutlierOutcome::UnknownField(field) => json!({
            "items": [],
            "warning": format!("field '{}' not found", field),
        }),
    };
    Ok(Json(body))
}
