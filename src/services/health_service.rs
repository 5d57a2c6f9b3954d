//! Health check service.

use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Respond with the backend health and the current game phase, logging
/// storage connectivity issues along the way.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.require_quiz_store().await {
        Ok(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, "quiz store health check failed");
            }
        }
        Err(_) => warn!("quiz store unavailable (degraded mode)"),
    }

    let phase = (&state.phase().await).into();

    if state.is_degraded().await {
        HealthResponse::degraded(phase)
    } else {
        HealthResponse::ok(phase)
    }
}
