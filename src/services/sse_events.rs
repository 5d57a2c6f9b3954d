//! Presentation event construction and broadcasting.

use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dto::{
        events::{
            GameFinishedEvent, PhaseChangedEvent, PlayerJoinedEvent, PlayerKickedEvent,
            ReactionEvent, RoundRevealedEvent, ServerEvent, TimerTickEvent, VoteReceivedEvent,
        },
        game::PlayerSummary,
        quiz::QuestionDetail,
    },
    services::ranking,
    state::{SharedState, game::GameSession, state_machine::GamePhase},
};

const EVENT_PLAYER_JOINED: &str = "player.joined";
const EVENT_PLAYER_KICKED: &str = "player.kicked";
const EVENT_VOTE_RECEIVED: &str = "vote.received";
const EVENT_TIMER_TICK: &str = "timer.tick";
const EVENT_PHASE_CHANGED: &str = "phase_changed";
const EVENT_ROUND_REVEALED: &str = "round.revealed";
const EVENT_GAME_FINISHED: &str = "game.finished";
const EVENT_REACTION: &str = "reaction";

/// Broadcast a player registration.
pub fn broadcast_player_joined(state: &SharedState, player: PlayerSummary, player_count: usize) {
    let payload = PlayerJoinedEvent {
        player,
        player_count,
    };
    send_event(state, EVENT_PLAYER_JOINED, &payload);
}

/// Broadcast that the host removed a player.
pub fn broadcast_player_kicked(state: &SharedState, player_id: Uuid) {
    let payload = PlayerKickedEvent { player_id };
    send_event(state, EVENT_PLAYER_KICKED, &payload);
}

/// Broadcast the updated answer count after a vote was recorded.
pub fn broadcast_vote_received(
    state: &SharedState,
    player_id: Uuid,
    vote_count: usize,
    player_count: usize,
) {
    let payload = VoteReceivedEvent {
        player_id,
        vote_count,
        player_count,
    };
    send_event(state, EVENT_VOTE_RECEIVED, &payload);
}

/// Broadcast one countdown tick.
pub fn broadcast_timer_tick(state: &SharedState, round: usize, time_left: u64) {
    let payload = TimerTickEvent { round, time_left };
    send_event(state, EVENT_TIMER_TICK, &payload);
}

/// Broadcast the grading summary of a revealed round.
pub fn broadcast_round_revealed(state: &SharedState, event: RoundRevealedEvent) {
    send_event(state, EVENT_ROUND_REVEALED, &event);
}

/// Broadcast the final standings.
pub fn broadcast_game_finished(state: &SharedState, event: GameFinishedEvent) {
    send_event(state, EVENT_GAME_FINISHED, &event);
}

/// Relay a player reaction to the host screen.
pub fn broadcast_reaction(state: &SharedState, player_id: Uuid, emoji: String) {
    let payload = ReactionEvent { player_id, emoji };
    send_event(state, EVENT_REACTION, &payload);
}

/// Broadcast a gameplay phase change notification.
pub async fn broadcast_phase_changed(state: &SharedState, phase: &GamePhase) {
    let snapshot = build_phase_changed_event(state, phase).await;
    send_event(state, EVENT_PHASE_CHANGED, &snapshot);
}

fn send_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.events().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize SSE payload"),
    }
}

async fn build_phase_changed_event(state: &SharedState, phase: &GamePhase) -> PhaseChangedEvent {
    let (question, current_question, total_questions, scoreboard) = state
        .read_session(|maybe| match maybe {
            Some(session) => (
                question_for_phase(session, phase),
                session.current_question_index.map(|index| index as u32 + 1),
                Some(session.quiz.questions.len() as u32),
                scoreboard_for_phase(session, phase),
            ),
            None => (None, None, None, None),
        })
        .await;

    PhaseChangedEvent {
        phase: phase.into(),
        question,
        current_question,
        total_questions,
        scoreboard,
    }
}

/// The host view of the current question, shown during live and reveal
/// phases. The answer key stays on this stream; players get the sanitized
/// broadcast instead.
fn question_for_phase(session: &GameSession, phase: &GamePhase) -> Option<QuestionDetail> {
    match phase {
        GamePhase::Playing | GamePhase::Reveal => {
            session.current_question().map(QuestionDetail::from)
        }
        _ => None,
    }
}

fn scoreboard_for_phase(
    session: &GameSession,
    phase: &GamePhase,
) -> Option<Vec<crate::dto::game::LeaderboardEntry>> {
    match phase {
        GamePhase::GameOver => Some(
            ranking::rank(&session.roster)
                .iter()
                .map(Into::into)
                .collect(),
        ),
        _ => None,
    }
}
