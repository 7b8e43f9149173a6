//! HTTP Handlers

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Serialize;

use fwitit_core::{
    Account, FetchOutcome, MarketError, Position, RecommendationState, TradeAction, TradeReceipt, TradeRequest,
};

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub market: String,
    pub market_connected: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    fn new(err: &MarketError) -> (StatusCode, Self) {
        let (status, code) = match err {
            MarketError::InvalidOrder(_) => (StatusCode::BAD_REQUEST, "INVALID_ORDER"),
            MarketError::Unreachable(_) => (StatusCode::SERVICE_UNAVAILABLE, "MARKET_UNREACHABLE"),
            MarketError::Status { .. } => (StatusCode::BAD_GATEWAY, "MARKET_ERROR"),
            MarketError::Decode(_) => (StatusCode::BAD_GATEWAY, "MARKET_BAD_RESPONSE"),
            MarketError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
        };

        (
            status,
            Self {
                error: err.user_message(),
                code: code.into(),
            },
        )
    }

    fn from_market(err: &MarketError) -> (StatusCode, Json<Self>) {
        let (status, body) = Self::new(err);
        (status, Json(body))
    }

    fn no_position(symbol: &str) -> (StatusCode, Json<Self>) {
        (
            StatusCode::NOT_FOUND,
            Json(Self {
                error: format!("No open position in {symbol}"),
                code: "NO_POSITION".into(),
            }),
        )
    }
}

/// Provider state as seen by the app
#[derive(Debug, Serialize)]
pub struct StateResponse {
    /// idle | loading | ready | failed
    pub status: &'static str,

    /// Card to display: the current outcome, or the last one while loading/failed
    pub outcome: Option<FetchOutcome>,

    /// Side the swipe UI should offer for the card
    pub suggested_action: Option<TradeAction>,

    /// Set when the last fetch failed and was not masked
    pub error: Option<ErrorResponse>,
}

impl From<&RecommendationState> for StateResponse {
    fn from(state: &RecommendationState) -> Self {
        let outcome = state.last_outcome().cloned();
        let suggested_action = outcome
            .as_ref()
            .and_then(|o| TradeAction::suggested_for(o.recommendation.recommendation_label));
        let error = match state {
            RecommendationState::Failed { error, .. } => Some(ErrorResponse::new(error).1),
            _ => None,
        };

        Self {
            status: state.name(),
            outcome,
            suggested_action,
            error,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        market: state.market.name().to_string(),
        market_connected: state.market.health_check().await,
    })
}

/// Fetch a fresh recommendation and return the resulting state
pub async fn refresh_recommendation(State(state): State<AppState>) -> Json<StateResponse> {
    let status = state.store.refresh(&state.fetcher).await;
    tracing::debug!("Refresh finished: {:?}", status);

    Json(StateResponse::from(&state.store.snapshot()))
}

/// Current state without fetching
pub async fn current_state(State(state): State<AppState>) -> Json<StateResponse> {
    Json(StateResponse::from(&state.store.snapshot()))
}

/// Forward a user-confirmed order
pub async fn execute_trade(
    State(state): State<AppState>,
    payload: Result<Json<TradeRequest>, JsonRejection>,
) -> Result<Json<TradeReceipt>, (StatusCode, Json<ErrorResponse>)> {
    let Json(payload) = payload.map_err(|rejection| {
        tracing::debug!("Rejected order body: {}", rejection);
        ErrorResponse::from_market(&MarketError::InvalidOrder(rejection.body_text()))
    })?;

    let request = TradeRequest::new(&payload.symbol, payload.action, payload.quantity)
        .map_err(|e| ErrorResponse::from_market(&e))?;

    let receipt = state.executor.execute_trade(&request).await.map_err(|e| {
        tracing::error!("Trade error: {}", e);
        ErrorResponse::from_market(&e)
    })?;

    Ok(Json(receipt))
}

/// Position held in one symbol
pub async fn get_position(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Position>, (StatusCode, Json<ErrorResponse>)> {
    match state.executor.get_position(&symbol).await {
        Ok(Some(position)) => Ok(Json(position)),
        Ok(None) => Err(ErrorResponse::no_position(&symbol.trim().to_uppercase())),
        Err(e) => {
            tracing::error!("Position lookup error: {}", e);
            Err(ErrorResponse::from_market(&e))
        }
    }
}

/// Account summary
pub async fn get_account(
    State(state): State<AppState>,
) -> Result<Json<Account>, (StatusCode, Json<ErrorResponse>)> {
    let account = state.executor.get_account().await.map_err(|e| {
        tracing::error!("Account lookup error: {}", e);
        ErrorResponse::from_market(&e)
    })?;

    Ok(Json(account))
}
