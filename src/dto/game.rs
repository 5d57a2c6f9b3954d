//! Live-game projections exposed to the host dashboard and the SSE stream.

use serde::Serialize;
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::{format_system_time, phase::VisibleGamePhase},
    state::game::{GameSession, Player},
};

/// Public projection of a player exposed to REST/SSE clients.
#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    /// Opaque channel identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Emoji avatar.
    pub avatar: String,
    /// Cosmetic theme tag.
    pub theme: String,
    /// Cumulative score.
    pub score: u32,
    /// Consecutive-correct counter.
    pub streak: u32,
    /// Coin balance.
    pub coins: u32,
}

impl From<&Player> for PlayerSummary {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id,
            name: player.name.clone(),
            avatar: player.avatar.clone(),
            theme: player.theme.clone(),
            score: player.score,
            streak: player.streak,
            coins: player.coins,
        }
    }
}

/// One row of a leaderboard as shown on the host screen.
#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// 1-based rank. Equal scores keep distinct sequential ranks in roster
    /// join order.
    pub rank: u32,
    /// Player channel identifier.
    pub player_id: Uuid,
    /// Display name.
    pub name: String,
    /// Score backing the rank.
    pub score: u32,
}

/// Summary returned once a game has been created or queried.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    /// Shareable join code.
    pub join_code: String,
    /// Current phase.
    pub phase: VisibleGamePhase,
    /// Title of the quiz being played.
    pub quiz_title: String,
    /// Total number of questions.
    pub total_questions: u32,
    /// 1-based index of the active question, if a round ran.
    pub current_question: Option<u32>,
    /// Seconds left on the countdown.
    pub time_left: u64,
    /// Registered players in join order.
    pub players: Vec<PlayerSummary>,
    /// Session creation timestamp, RFC 3339.
    pub created_at: String,
}

impl GameSummary {
    /// Build a summary from the live session and its phase.
    pub fn from_session(session: &GameSession, phase: VisibleGamePhase) -> Self {
        Self {
            join_code: session.join_code.clone(),
            phase,
            quiz_title: session.quiz.title.clone(),
            total_questions: session.quiz.questions.len() as u32,
            current_question: session.current_question_index.map(|index| index as u32 + 1),
            time_left: session.time_left_secs,
            players: session.roster.values().map(Into::into).collect(),
            created_at: format_system_time(session.created_at),
        }
    }
}
