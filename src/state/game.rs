//! Runtime game session state: roster, votes and the per-round bookkeeping
//! the host is authoritative for.

use std::{
    collections::HashMap,
    time::{SystemTime, UNIX_EPOCH},
};

use indexmap::IndexMap;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::quiz::{Question, Quiz, format_number};

/// Alphabet used for join codes; visually ambiguous glyphs (I, 1, 0, O) are
/// excluded so codes survive being read out loud or copied from a screen.
const JOIN_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
/// Number of characters in a join code.
const JOIN_CODE_LENGTH: usize = 4;

/// Generate a short human-shareable game code.
pub fn generate_join_code() -> String {
    let mut rng = rand::rng();
    (0..JOIN_CODE_LENGTH)
        .map(|_| JOIN_CODE_ALPHABET[rng.random_range(0..JOIN_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Milliseconds since the Unix epoch; the authoritative clock reference used
/// for question start times and vote timestamps.
pub fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// A registered player and their persistent per-game attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Opaque channel identifier assigned on connection.
    pub id: Uuid,
    /// Display name chosen by the player.
    pub name: String,
    /// Emoji avatar.
    pub avatar: String,
    /// Cosmetic color theme tag.
    pub theme: String,
    /// Registration timestamp in epoch milliseconds.
    pub joined_at_ms: u64,
    /// Cumulative score.
    pub score: u32,
    /// Consecutive-correct counter; resets on any incorrect or missed answer.
    pub streak: u32,
    /// Cosmetic currency balance.
    pub coins: u32,
}

/// A vote value as submitted on the wire: either free text or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    /// Numeric answer (sliders, but accepted anywhere).
    Number(f64),
    /// Textual answer (option ids, open-ended text).
    Text(String),
}

impl AnswerValue {
    /// Canonical string form used for option matching and vote distributions.
    pub fn as_text(&self) -> String {
        match self {
            AnswerValue::Text(text) => text.clone(),
            AnswerValue::Number(number) => format_number(*number),
        }
    }

    /// Numeric form when the answer is a number or parses as one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AnswerValue::Number(number) => Some(*number),
            AnswerValue::Text(text) => text.trim().parse().ok(),
        }
    }
}

/// The authoritative record of one player's answer for the active round.
#[derive(Debug, Clone, PartialEq)]
pub struct Vote {
    /// Submitted answer value.
    pub answer: AnswerValue,
    /// Receipt timestamp in epoch milliseconds, stamped by the host.
    pub timestamp_ms: u64,
}

/// Aggregated state for one hosted game, from lobby to final ranking.
///
/// The session is exclusively owned by the shared application state; every
/// mutation happens under its lock, so votes and roster updates are applied
/// sequentially.
#[derive(Debug)]
pub struct GameSession {
    /// Short shareable code identifying this game.
    pub join_code: String,
    /// The quiz being played.
    pub quiz: Quiz,
    /// Creation timestamp for auditing.
    pub created_at: SystemTime,
    /// Registered players in join order. Join order is load-bearing: it is
    /// the documented tie-break for equal scores in the ranking.
    pub roster: IndexMap<Uuid, Player>,
    /// Votes for the active round, keyed by player id.
    votes: HashMap<Uuid, Vote>,
    /// Index of the question currently played or revealed.
    pub current_question_index: Option<usize>,
    /// Epoch milliseconds at which the current round started.
    pub question_started_at_ms: u64,
    /// Seconds remaining on the current round's countdown.
    pub time_left_secs: u64,
}

impl GameSession {
    /// Build a fresh session in the lobby for the given quiz.
    pub fn new(quiz: Quiz) -> Self {
        Self {
            join_code: generate_join_code(),
            quiz,
            created_at: SystemTime::now(),
            roster: IndexMap::new(),
            votes: HashMap::new(),
            current_question_index: None,
            question_started_at_ms: 0,
            time_left_secs: 0,
        }
    }

    /// Register a player, replacing any previous registration under the same
    /// channel id (last write wins, no rejection).
    pub fn register_player(
        &mut self,
        id: Uuid,
        name: String,
        avatar: String,
        theme: String,
        starting_coins: u32,
        now_ms: u64,
    ) -> Player {
        let player = Player {
            id,
            name,
            avatar,
            theme,
            joined_at_ms: now_ms,
            score: 0,
            streak: 0,
            coins: starting_coins,
        };
        self.roster.insert(id, player.clone());
        player
    }

    /// Record a vote for the active round, overwriting any earlier vote from
    /// the same player. The last received vote is authoritative.
    ///
    /// Returns `false` when the voter is not on the roster.
    pub fn record_vote(&mut self, player_id: Uuid, answer: AnswerValue, now_ms: u64) -> bool {
        if !self.roster.contains_key(&player_id) {
            return false;
        }
        self.votes.insert(
            player_id,
            Vote {
                answer,
                timestamp_ms: now_ms,
            },
        );
        true
    }

    /// Number of votes recorded for the active round.
    pub fn vote_count(&self) -> usize {
        self.votes.len()
    }

    /// Reset per-round state and start the countdown for `index`.
    ///
    /// Returns the question so callers can build the broadcast.
    pub fn begin_round(&mut self, index: usize, now_ms: u64) -> Option<&Question> {
        let time_limit_secs = self.quiz.questions.get(index)?.time_limit_secs;
        self.votes.clear();
        self.current_question_index = Some(index);
        self.question_started_at_ms = now_ms;
        self.time_left_secs = time_limit_secs;
        self.quiz.questions.get(index)
    }

    /// Question currently being played or revealed.
    pub fn current_question(&self) -> Option<&Question> {
        self.current_question_index
            .and_then(|index| self.quiz.questions.get(index))
    }

    /// Take the frozen vote snapshot for grading, leaving the live map empty.
    /// Votes arriving after this point belong to no round and are discarded
    /// when the next round starts.
    pub fn freeze_votes(&mut self) -> HashMap<Uuid, Vote> {
        std::mem::take(&mut self.votes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::quiz::{AnswerOption, OptionColor, QuestionKind};

    fn test_quiz() -> Quiz {
        Quiz {
            id: Uuid::new_v4(),
            title: "Test".into(),
            description: None,
            cover_image_url: None,
            questions: vec![Question {
                id: 0,
                text: "Q1".into(),
                time_limit_secs: 20,
                kind: QuestionKind::MultipleChoice {
                    options: vec![
                        AnswerOption {
                            id: "opt1".into(),
                            color: OptionColor::Red,
                            text: "A".into(),
                        },
                        AnswerOption {
                            id: "opt2".into(),
                            color: OptionColor::Blue,
                            text: "B".into(),
                        },
                    ],
                    correct_option_id: "opt1".into(),
                },
            }],
            created_at: SystemTime::now(),
        }
    }

    #[test]
    fn join_codes_use_the_unambiguous_alphabet() {
        for _ in 0..64 {
            let code = generate_join_code();
            assert_eq!(code.len(), 4);
            assert!(
                code.bytes().all(|b| JOIN_CODE_ALPHABET.contains(&b)),
                "unexpected character in {code}"
            );
        }
    }

    #[test]
    fn re_registration_replaces_the_player_record() {
        let mut session = GameSession::new(test_quiz());
        let id = Uuid::new_v4();
        session.register_player(id, "First".into(), "🦊".into(), "red".into(), 200, 1);
        session.roster.get_mut(&id).unwrap().score = 500;
        session.register_player(id, "Second".into(), "🐼".into(), "blue".into(), 200, 2);

        assert_eq!(session.roster.len(), 1);
        let player = &session.roster[&id];
        assert_eq!(player.name, "Second");
        assert_eq!(player.score, 0);
    }

    #[test]
    fn later_vote_overwrites_earlier_vote() {
        let mut session = GameSession::new(test_quiz());
        let id = Uuid::new_v4();
        session.register_player(id, "P".into(), "🦊".into(), "red".into(), 200, 0);
        session.begin_round(0, 1_000);

        assert!(session.record_vote(id, AnswerValue::Text("opt1".into()), 2_000));
        assert!(session.record_vote(id, AnswerValue::Text("opt2".into()), 3_000));

        let votes = session.freeze_votes();
        assert_eq!(votes.len(), 1);
        let vote = &votes[&id];
        assert_eq!(vote.answer, AnswerValue::Text("opt2".into()));
        assert_eq!(vote.timestamp_ms, 3_000);
    }

    #[test]
    fn votes_from_unregistered_peers_are_rejected() {
        let mut session = GameSession::new(test_quiz());
        session.begin_round(0, 1_000);
        assert!(!session.record_vote(Uuid::new_v4(), AnswerValue::Number(3.0), 2_000));
        assert_eq!(session.vote_count(), 0);
    }

    #[test]
    fn begin_round_clears_previous_votes() {
        let mut session = GameSession::new(test_quiz());
        let id = Uuid::new_v4();
        session.register_player(id, "P".into(), "🦊".into(), "red".into(), 200, 0);
        session.begin_round(0, 1_000);
        session.record_vote(id, AnswerValue::Text("opt1".into()), 2_000);

        session.begin_round(0, 10_000);
        assert_eq!(session.vote_count(), 0);
        assert_eq!(session.question_started_at_ms, 10_000);
        assert_eq!(session.time_left_secs, 20);
    }

    #[test]
    fn answer_values_coerce_between_text_and_number() {
        assert_eq!(AnswerValue::Number(60.0).as_text(), "60");
        assert_eq!(AnswerValue::Number(0.5).as_text(), "0.5");
        assert_eq!(AnswerValue::Text(" 42 ".into()).as_number(), Some(42.0));
        assert_eq!(AnswerValue::Text("not a number".into()).as_number(), None);
    }
}
