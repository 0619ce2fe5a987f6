//! Badge API Endpoints
//!
//! Read surface for the leaderboard, account stats and badge rendering, plus
//! the governance endpoints for thresholds, the global counter and the fee.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::error::BadgeError;
use crate::ledger::Direction;
use crate::render::{self, BadgeDescriptor};
use crate::service::{ActionOutcome, ActivityService, UserStats};
use crate::tiers::ThresholdTable;

/// API state for badge endpoints
#[derive(Clone)]
pub struct BadgeApiState {
    pub service: Arc<ActivityService>,
    pub admin_api_key: Option<String>,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

fn error_response(err: BadgeError) -> (StatusCode, String) {
    let status = match err {
        BadgeError::CapacityMisconfigured
        | BadgeError::InvalidTier(_)
        | BadgeError::NonMonotonicThresholds { .. }
        | BadgeError::InvalidThresholdCount(_) => StatusCode::BAD_REQUEST,
        BadgeError::DuplicateIssuance { .. } | BadgeError::CounterUnderflow => StatusCode::CONFLICT,
        BadgeError::Unauthorized => StatusCode::FORBIDDEN,
        BadgeError::Snapshot(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}

impl BadgeApiState {
    fn authorize(&self, provided: &str) -> Result<(), BadgeError> {
        match self.admin_api_key {
            Some(ref key) if key == provided => Ok(()),
            Some(_) => {
                warn!("Admin request rejected: invalid API key");
                Err(BadgeError::Unauthorized)
            }
            None => {
                warn!("Admin request rejected: no admin API key configured");
                Err(BadgeError::Unauthorized)
            }
        }
    }
}

// Request/response types

#[derive(Debug, Deserialize)]
pub struct RecordActionRequest {
    pub account: String,
    pub direction: Direction,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub capacity: usize,
    pub entries: Vec<LeaderboardRow>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardRow {
    /// 1-based
    pub rank: usize,
    pub account: String,
    pub score: u64,
}

#[derive(Debug, Deserialize)]
pub struct RenderQuery {
    pub increments: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ThresholdsResponse {
    pub thresholds: Vec<u64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateThresholdsRequest {
    pub thresholds: Vec<u64>,
    pub admin_api_key: String,
}

#[derive(Debug, Serialize)]
pub struct CounterResponse {
    pub value: u64,
}

#[derive(Debug, Deserialize)]
pub struct ResetCounterRequest {
    pub value: u64,
    pub admin_api_key: String,
}

#[derive(Debug, Serialize)]
pub struct FeeResponse {
    pub fee: u64,
}

#[derive(Debug, Deserialize)]
pub struct SetFeeRequest {
    pub fee: u64,
    pub admin_api_key: String,
}

// Endpoints

/// POST /actions - Record one account action
pub async fn record_action(
    State(state): State<BadgeApiState>,
    Json(payload): Json<RecordActionRequest>,
) -> ApiResult<ActionOutcome> {
    let account = payload.account.trim();
    if account.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Account cannot be empty".to_string()));
    }

    state
        .service
        .record_action(account, payload.direction)
        .await
        .map(Json)
        .map_err(error_response)
}

/// GET /leaderboard - Ranked accounts, highest first
pub async fn get_leaderboard(State(state): State<BadgeApiState>) -> Json<LeaderboardResponse> {
    let entries = state
        .service
        .get_leaderboard()
        .await
        .into_iter()
        .enumerate()
        .map(|(i, e)| LeaderboardRow {
            rank: i + 1,
            account: e.account,
            score: e.score,
        })
        .collect();

    Json(LeaderboardResponse {
        capacity: state.service.capacity().await,
        entries,
    })
}

/// GET /users/:account - Account stats
pub async fn get_user_stats(
    State(state): State<BadgeApiState>,
    Path(account): Path<String>,
) -> Json<UserStats> {
    Json(state.service.get_user_stats(&account).await)
}

/// GET /users/:account/badge - Badge for the account's current tier
pub async fn get_account_badge(
    State(state): State<BadgeApiState>,
    Path(account): Path<String>,
) -> Json<BadgeDescriptor> {
    Json(state.service.render_account_badge(&account).await)
}

/// GET /badges/:tier - Render a badge for any tier level
pub async fn render_badge(
    Path(tier): Path<u8>,
    Query(query): Query<RenderQuery>,
) -> ApiResult<BadgeDescriptor> {
    render::render_level(tier, query.increments.unwrap_or(0))
        .map(Json)
        .map_err(error_response)
}

/// GET /thresholds - Current tier thresholds
pub async fn get_thresholds(State(state): State<BadgeApiState>) -> Json<ThresholdsResponse> {
    Json(ThresholdsResponse {
        thresholds: state.service.thresholds().await.values().to_vec(),
    })
}

/// PUT /thresholds - Replace tier thresholds (governance only)
pub async fn update_thresholds(
    State(state): State<BadgeApiState>,
    Json(payload): Json<UpdateThresholdsRequest>,
) -> ApiResult<ThresholdsResponse> {
    state
        .authorize(&payload.admin_api_key)
        .map_err(error_response)?;

    let table = ThresholdTable::from_slice(&payload.thresholds).map_err(error_response)?;
    state
        .service
        .set_thresholds(table)
        .await
        .map_err(error_response)?;

    Ok(Json(ThresholdsResponse {
        thresholds: table.values().to_vec(),
    }))
}

/// GET /counter - Global counter value
pub async fn get_counter(State(state): State<BadgeApiState>) -> Json<CounterResponse> {
    Json(CounterResponse {
        value: state.service.counter().await,
    })
}

/// POST /counter/reset - Reset the global counter (governance only)
pub async fn reset_counter(
    State(state): State<BadgeApiState>,
    Json(payload): Json<ResetCounterRequest>,
) -> ApiResult<CounterResponse> {
    state
        .authorize(&payload.admin_api_key)
        .map_err(error_response)?;

    state
        .service
        .reset_counter(payload.value)
        .await
        .map_err(error_response)?;
    Ok(Json(CounterResponse {
        value: payload.value,
    }))
}

/// GET /fee - Current action fee
pub async fn get_fee(State(state): State<BadgeApiState>) -> Json<FeeResponse> {
    Json(FeeResponse {
        fee: state.service.fee().await,
    })
}

/// PUT /fee - Set the action fee (governance only)
pub async fn set_fee(
    State(state): State<BadgeApiState>,
    Json(payload): Json<SetFeeRequest>,
) -> ApiResult<FeeResponse> {
    state
        .authorize(&payload.admin_api_key)
        .map_err(error_response)?;

    state
        .service
        .set_fee(payload.fee)
        .await
        .map_err(error_response)?;
    Ok(Json(FeeResponse { fee: payload.fee }))
}

/// Create the badge API router
pub fn create_badge_router(state: BadgeApiState) -> Router {
    Router::new()
        .route("/actions", post(record_action))
        .route("/leaderboard", get(get_leaderboard))
        .route("/users/{account}", get(get_user_stats))
        .route("/users/{account}/badge", get(get_account_badge))
        .route("/badges/{tier}", get(render_badge))
        .route("/thresholds", get(get_thresholds).put(update_thresholds))
        .route("/counter", get(get_counter))
        .route("/counter/reset", post(reset_counter))
        .route("/fee", get(get_fee).put(set_fee))
        .with_state(state)
}
