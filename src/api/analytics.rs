use axum::Json;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::result::Result;

use crate::analytics::trend::TrendMetric;
use crate::config::Config;
use crate::error::AnalyticsError;
use crate::services::analytics::AnalyticsService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub analytics_service: AnalyticsService,
}

#[derive(Deserialize)]
pub struct PeriodQuery {
    pub period: Option<String>,
}

#[derive(Deserialize)]
pub struct TrendQuery {
    pub metric: Option<String>,
    pub period: Option<String>,
    pub exercise_id: Option<String>,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub session_count: usize,
}

const DEFAULT_LOOKBACK: &str = "3m";
const DEFAULT_COMPARISON: &str = "month";

fn authenticate_request(headers: &HeaderMap, state: &AppState) -> Result<(), StatusCode> {
    let auth_header = match headers.get(AUTHORIZATION) {
        Some(header) => header,
        None => return Err(StatusCode::UNAUTHORIZED),
    };

    let auth_str = match auth_header.to_str() {
        Ok(s) => s,
        Err(_) => return Err(StatusCode::UNAUTHORIZED),
    };

    let token = match auth_str.strip_prefix("Bearer ") {
        Some(token) => token,
        None => return Err(StatusCode::UNAUTHORIZED),
    };

    if token != state.config.api_token {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(())
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn period_or<'a>(query: &'a PeriodQuery, default: &'a str) -> &'a str {
    query.period.as_deref().unwrap_or(default)
}

fn respond<T: Serialize>(result: Result<T, AnalyticsError>) -> Response {
    match result {
        Ok(report) => Json(report).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn training_load_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PeriodQuery>,
) -> Response {
    if let Err(response) = authenticate_request(&headers, &state) {
        return response.into_response();
    }

    let period = period_or(&query, DEFAULT_LOOKBACK);
    respond(state.analytics_service.training_load(period, today()).await)
}

pub async fn trend_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<TrendQuery>,
) -> Response {
    if let Err(response) = authenticate_request(&headers, &state) {
        return response.into_response();
    }

    let metric = match query.metric.as_deref().map(str::parse::<TrendMetric>) {
        Some(Ok(metric)) => metric,
        Some(Err(e)) => return e.into_response(),
        None => return AnalyticsError::invalid_input("metric is required").into_response(),
    };

    let period = query.period.as_deref().unwrap_or(DEFAULT_LOOKBACK);
    respond(
        state
            .analytics_service
            .trend(metric, period, query.exercise_id.as_deref(), today())
            .await,
    )
}

pub async fn recovery_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PeriodQuery>,
) -> Response {
    if let Err(response) = authenticate_request(&headers, &state) {
        return response.into_response();
    }

    let period = period_or(&query, "1m");
    respond(state.analytics_service.recovery(period, today()).await)
}

pub async fn radar_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(exercise_id): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> Response {
    if let Err(response) = authenticate_request(&headers, &state) {
        return response.into_response();
    }

    let period = period_or(&query, "6m");
    respond(
        state
            .analytics_service
            .radar(&exercise_id, period, today())
            .await,
    )
}

pub async fn balance_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PeriodQuery>,
) -> Response {
    if let Err(response) = authenticate_request(&headers, &state) {
        return response.into_response();
    }

    let period = period_or(&query, "1m");
    respond(state.analytics_service.balance(period, today()).await)
}

pub async fn comparison_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PeriodQuery>,
) -> Response {
    if let Err(response) = authenticate_request(&headers, &state) {
        return response.into_response();
    }

    let period = period_or(&query, DEFAULT_COMPARISON);
    respond(state.analytics_service.comparison(period, today()).await)
}

pub async fn refresh_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(response) = authenticate_request(&headers, &state) {
        return response.into_response();
    }

    tracing::info!("history.refresh_requested");
    respond(
        state
            .analytics_service
            .refresh_history()
            .await
            .map(|session_count| RefreshResponse { session_count }),
    )
}
