use std::{sync::Arc, time::Instant};

use axum::{
    Json,
    extract::{self, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    aggregation::split_csv,
    query_port::{OlapError, Query},
    result_model::AggregationResponse,
};

use super::{
    AppState,
    models::{AggregateParams, ErrorResponse, HealthResponse, QueryRequest},
};

/// `OlapError` rendered as `{"error": kind, "message": text}`
#[derive(Debug)]
pub struct ApiError(pub OlapError);

impl From<OlapError> for ApiError {
    fn from(err: OlapError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.0.kind().to_string(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        service: "cubegate".to_string(),
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn aggregate_handler(
    State(app_state): State<Arc<AppState>>,
    extract::Query(params): extract::Query<AggregateParams>,
) -> Result<Json<AggregationResponse>, ApiError> {
    let start_time = Instant::now();

    if split_csv(params.dimensions.as_deref()).is_empty()
        && split_csv(params.measures.as_deref()).is_empty()
    {
        return Err(OlapError::invalid_argument(
            "At least one dimension or measure is required",
        )
        .into());
    }

    let response = app_state
        .aggregation
        .aggregate(
            params.dimensions.as_deref(),
            params.measures.as_deref(),
            params.filters.as_deref(),
        )
        .await?;

    log::info!(
        "Aggregation returned {} rows in {:.3}ms",
        response.len(),
        start_time.elapsed().as_secs_f64() * 1000.0
    );
    Ok(Json(response))
}

pub async fn query_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<AggregationResponse>, ApiError> {
    let start_time = Instant::now();

    let query = Query::parse(
        payload.statement,
        &payload.query_type,
        payload.parameters.as_ref(),
    )?;
    let response = app_state.router.execute_query(&query).await?;

    log::info!(
        "{} query returned {} rows in {:.3}ms",
        query.query_type(),
        response.len(),
        start_time.elapsed().as_secs_f64() * 1000.0
    );
    Ok(Json(response))
}
