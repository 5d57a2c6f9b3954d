//! Health endpoint payload.

use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::phase::VisibleGamePhase;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Current phase of the hosted game, if any.
    pub phase: VisibleGamePhase,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok(phase: VisibleGamePhase) -> Self {
        Self {
            status: "ok".to_string(),
            phase,
        }
    }

    /// Create a health response indicating the system is in degraded mode.
    pub fn degraded(phase: VisibleGamePhase) -> Self {
        Self {
            status: "degraded".to_string(),
            phase,
        }
    }
}
