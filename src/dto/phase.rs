//! Serialized view of the game phase.

use serde::Serialize;
use utoipa::ToSchema;

use crate::state::state_machine::GamePhase;

/// Publicly visible game phase exposed to clients (REST/SSE).
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibleGamePhase {
    /// No game is hosted.
    Idle,
    /// Players are joining.
    Lobby,
    /// A question is live.
    Playing,
    /// Results for the current question are out.
    Reveal,
    /// Final rankings have been sent.
    GameOver,
}

impl From<&GamePhase> for VisibleGamePhase {
    fn from(value: &GamePhase) -> Self {
        match value {
            GamePhase::Idle => VisibleGamePhase::Idle,
            GamePhase::Lobby => VisibleGamePhase::Lobby,
            GamePhase::Playing => VisibleGamePhase::Playing,
            GamePhase::Reveal => VisibleGamePhase::Reveal,
            GamePhase::GameOver => VisibleGamePhase::GameOver,
        }
    }
}
