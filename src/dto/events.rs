//! Payloads carried on the presentation SSE stream.

use serde::Serialize;
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::{
    game::{LeaderboardEntry, PlayerSummary},
    phase::VisibleGamePhase,
    quiz::QuestionDetail,
    wire::RoundStats,
};

#[derive(Clone, Debug)]
/// Dispatched payload carried across the SSE channel.
pub struct ServerEvent {
    /// Optional SSE event name.
    pub event: Option<String>,
    /// Serialized JSON data field.
    pub data: String,
}

impl ServerEvent {
    /// Build an event from a plain string payload.
    pub fn new<E>(event: E, data: String) -> Self
    where
        E: Into<Option<String>>,
    {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Event emitted when a player registers (or re-registers).
pub struct PlayerJoinedEvent {
    /// The registered player.
    pub player: PlayerSummary,
    /// Roster size after the registration.
    pub player_count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
/// Event emitted when the host removes a player.
pub struct PlayerKickedEvent {
    /// Channel identifier of the removed player.
    pub player_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
/// Event emitted whenever a vote is recorded, so the host screen can show
/// who already answered without learning the answers.
pub struct VoteReceivedEvent {
    /// Channel identifier of the voter.
    pub player_id: Uuid,
    /// Number of votes recorded for the active round.
    pub vote_count: usize,
    /// Roster size, for an "n of m answered" display.
    pub player_count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
/// Event emitted once per second while a round is live.
pub struct TimerTickEvent {
    /// Index of the round the countdown belongs to.
    pub round: usize,
    /// Seconds remaining.
    pub time_left: u64,
}

#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
/// Broadcast whenever the gameplay phase changes.
pub struct PhaseChangedEvent {
    /// The phase that was just entered.
    pub phase: VisibleGamePhase,
    /// Full current question (host view, answer key included) during
    /// playing/reveal phases.
    pub question: Option<QuestionDetail>,
    /// 1-based index of the current question.
    pub current_question: Option<u32>,
    /// Total number of questions.
    pub total_questions: Option<u32>,
    /// Final scoreboard, present once the game is over.
    pub scoreboard: Option<Vec<LeaderboardEntry>>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Event emitted when a round has been graded.
pub struct RoundRevealedEvent {
    /// Identifier of the revealed question.
    pub question_id: u32,
    /// Human-readable correct answer (empty for ungraded rounds).
    pub correct_text: String,
    /// Aggregated round statistics.
    pub stats: RoundStats,
    /// Standings after the round.
    pub leaderboard: Vec<LeaderboardEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Event emitted when the game finished and final rankings are out.
pub struct GameFinishedEvent {
    /// Final standings.
    pub ranking: Vec<LeaderboardEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Emoji reaction relayed from a player to the host screen.
pub struct ReactionEvent {
    /// Channel identifier of the reacting player.
    pub player_id: Uuid,
    /// The reaction emoji.
    pub emoji: String,
}
