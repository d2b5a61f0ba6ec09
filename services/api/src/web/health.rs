//! services/api/src/web/health.rs
//!
//! Store-aware health check.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use tokio::time::{timeout, Duration};
use tracing::warn;
use utoipa::ToSchema;

use crate::web::state::AppState;

const HEALTH_DB_TIMEOUT_SECONDS: u64 = 2;

#[derive(Serialize, ToSchema)]
pub struct Health {
    /// `ok` or `unavailable`.
    pub status: String,
}

/// GET /health - Report whether the store is reachable
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Store is reachable", body = Health),
        (status = 503, description = "Store is unreachable", body = Health)
    ),
    tag = "health"
)]
pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let ping = timeout(
        Duration::from_secs(HEALTH_DB_TIMEOUT_SECONDS),
        state.db.ping(),
    )
    .await;

    let healthy = match ping {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            warn!("Store ping failed: {}", e);
            false
        }
        Err(_) => {
            warn!("Store ping timed out after {}s", HEALTH_DB_TIMEOUT_SECONDS);
            false
        }
    };

    if healthy {
        (StatusCode::OK, Json(Health { status: "ok".to_string() }))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(Health {
                status: "unavailable".to_string(),
            }),
        )
    }
}
