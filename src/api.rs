//! REST API router for order submission and ledger queries.
//!
//! Used by the binary and by integration tests. Create state with
//! [`create_app_state`] and build the router with [`create_router`].

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use crate::compliance::ComplianceGate;
use crate::engine::MatchingEngine;
use crate::error::EngineError;
use crate::ledger::{today, LedgerQuery};
use crate::store::MarketStore;
use crate::types::OrderRequest;

/// Shared app state: one engine (and through it, one ledger) per process.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<MatchingEngine>,
}

/// Builds shared app state over the given store and compliance gate.
pub fn create_app_state(store: Arc<dyn MarketStore>, gate: Arc<dyn ComplianceGate>) -> AppState {
    AppState {
        engine: Arc::new(MatchingEngine::new(store, gate)),
    }
}

/// Builds the REST router. Returns `Router<()>` for `axum::serve`.
pub fn create_router(state: AppState) -> Router<()> {
    Router::new()
        .route("/health", get(health))
        .route("/api/orders", post(submit_order))
        .route("/api/ledger", get(get_ledger))
        .route("/api/ledger/user/{user_id}", get(get_user_trades))
        .route("/api/ledger/instrument/{instrument}", get(get_instrument_trades))
        .route("/api/ledger/today", get(get_today_trades))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn submit_order(
    State(state): State<AppState>,
    Json(request): Json<OrderRequest>,
) -> Response {
    match state.engine.process_order(request.into()) {
        Ok(trades) => (StatusCode::OK, Json(trades)).into_response(),
        Err(err) => error_response(err),
    }
}

/// Optional ledger filters as query parameters.
#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct LedgerParams {
    user_id: Option<String>,
    instrument: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    min_amount: Option<rust_decimal::Decimal>,
    max_amount: Option<rust_decimal::Decimal>,
}

impl From<LedgerParams> for LedgerQuery {
    fn from(params: LedgerParams) -> Self {
        LedgerQuery {
            user_id: params.user_id,
            instrument: params.instrument,
            start_day: params.start_date,
            end_day: params.end_date,
            min_amount: params.min_amount,
            max_amount: params.max_amount,
        }
    }
}

async fn get_ledger(
    State(state): State<AppState>,
    Query(params): Query<LedgerParams>,
) -> Response {
    run_query(&state, params.into())
}

async fn get_user_trades(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Response {
    run_query(
        &state,
        LedgerQuery {
            user_id: Some(user_id),
            ..Default::default()
        },
    )
}

async fn get_instrument_trades(
    State(state): State<AppState>,
    Path(instrument): Path<String>,
) -> Response {
    run_query(
        &state,
        LedgerQuery {
            instrument: Some(instrument),
            ..Default::default()
        },
    )
}

async fn get_today_trades(State(state): State<AppState>) -> Response {
    let day = today();
    run_query(
        &state,
        LedgerQuery {
            start_day: Some(day.clone()),
            end_day: Some(day),
            ..Default::default()
        },
    )
}

fn run_query(state: &AppState, query: LedgerQuery) -> Response {
    match state.engine.ledger().query(&query) {
        Ok(trades) => (StatusCode::OK, Json(trades)).into_response(),
        Err(err) => error_response(err.into()),
    }
}

fn error_response(err: EngineError) -> Response {
    let status = match &err {
        EngineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        EngineError::ComplianceRejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::MalformedRecord { .. } | EngineError::InternalEncodeError { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (
        status,
        Json(serde_json::json!({ "error": err.to_string() })),
    )
        .into_response()
}
