//! Message protocol exchanged between the host and each player channel.
//!
//! One JSON message per exchange, `type`-tagged, camelCase fields. The
//! broadcast side deliberately uses [`QuestionBroadcast`], a projection that
//! cannot carry the answer key: the authoritative question never leaves the
//! host.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;

use crate::state::{
    game::AnswerValue,
    quiz::{AnswerOption, Question, QuestionKind},
};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
/// Messages accepted from player channels.
#[serde(tag = "type")]
pub enum PlayerMessage {
    /// Registration request; the first message on every channel.
    #[serde(rename = "JOIN")]
    Join {
        /// Display name.
        name: String,
        /// Emoji avatar.
        avatar: String,
        /// Cosmetic color theme tag.
        theme: String,
    },
    /// Answer submission for the active round.
    #[serde(rename = "VOTE")]
    Vote {
        /// The answer value, textual or numeric.
        #[schema(value_type = Object)]
        answer: AnswerValue,
    },
    /// Emoji reaction, forwarded to the presentation stream.
    #[serde(rename = "REACTION")]
    Reaction {
        /// The reaction emoji.
        emoji: String,
    },
    /// Power-up activation. Declared in the protocol but never consulted by
    /// scoring; kept as an extension point.
    #[serde(rename = "USE_POWERUP")]
    UsePowerUp {
        /// Which power-up the player wants to use.
        #[serde(rename = "powerUp")]
        power_up: PowerUpKind,
    },
    /// Unrecognised message type; tolerated and ignored.
    #[serde(other)]
    Unknown,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
/// Messages sent from the host to individual player channels.
#[serde(tag = "type")]
pub enum HostMessage {
    /// Acknowledges a successful JOIN.
    #[serde(rename = "WELCOME", rename_all = "camelCase")]
    Welcome {
        /// Shareable code of the joined game.
        game_id: String,
    },
    /// Announces a new round. Carries the sanitized question only.
    #[serde(rename = "GAME_START", rename_all = "camelCase")]
    GameStart {
        /// The question, stripped of its answer key.
        question: QuestionBroadcast,
        /// 1-based index of the current question.
        current_question: u32,
        /// Total number of questions in the quiz.
        total_questions: u32,
        /// Authoritative round start in epoch milliseconds.
        start_time: u64,
    },
    /// Per-player grading outcome sent at reveal time.
    #[serde(rename = "RESULT", rename_all = "camelCase")]
    Result {
        /// New cumulative score.
        score: u32,
        /// Winning option id for choice questions.
        correct_option_id: Option<String>,
        /// Human-readable correct answer.
        correct_text: String,
        /// Target value for slider questions.
        correct_value: Option<f64>,
        /// New coin balance.
        coins: u32,
        /// Coins earned this round.
        coins_earned: u32,
        /// New streak value.
        streak: u32,
        /// Badges awarded this round.
        badges: Vec<Badge>,
        /// Leaderboard position after this round.
        rank: u32,
        /// Aggregated statistics for the round.
        round_stats: RoundStats,
    },
    /// Final ranking for one player.
    #[serde(rename = "GAME_OVER")]
    GameOver {
        /// Final leaderboard position.
        rank: u32,
        /// Final score.
        score: u32,
    },
    /// The player has been removed by the host.
    #[serde(rename = "KICK")]
    Kick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
/// Informational badges awarded at reveal time. They never affect scores.
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Badge {
    /// Earliest correct voter of the round.
    SpeedDemon,
    /// Only correct voter of the round. Declared but not yet awarded.
    LoneWolf,
    /// Large rank climb. Declared but not yet awarded.
    ComebackKid,
    /// Post-round streak of three or more.
    OnFire,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
/// Power-up identifiers declared in the protocol. Extension point only.
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PowerUpKind {
    /// Remove half of the wrong options.
    FiftyFifty,
    /// Pause the countdown.
    TimeFreeze,
    /// Double the stake on the current answer.
    DoubleDown,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Aggregated statistics of one revealed round.
pub struct RoundStats {
    /// Number of players on the roster.
    pub total_players: u32,
    /// Number of correct votes.
    pub correct_count: u32,
    /// Vote counts keyed by canonical answer text.
    pub vote_distribution: BTreeMap<String, u32>,
    /// Mean numeric answer, for slider rounds.
    pub average_value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
/// Wire tag identifying a question variant.
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionTypeTag {
    /// Multiple choice.
    Mc,
    /// True/false.
    TrueFalse,
    /// Ungraded poll.
    Poll,
    /// Free-text question.
    OpenEnded,
    /// Ungraded word cloud.
    WordCloud,
    /// Numeric slider.
    Slider,
}

impl From<&QuestionKind> for QuestionTypeTag {
    fn from(value: &QuestionKind) -> Self {
        match value {
            QuestionKind::MultipleChoice { .. } => QuestionTypeTag::Mc,
            QuestionKind::TrueFalse { .. } => QuestionTypeTag::TrueFalse,
            QuestionKind::Poll { .. } => QuestionTypeTag::Poll,
            QuestionKind::OpenEnded { .. } => QuestionTypeTag::OpenEnded,
            QuestionKind::WordCloud => QuestionTypeTag::WordCloud,
            QuestionKind::Slider { .. } => QuestionTypeTag::Slider,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
/// Answer option as broadcast to players.
pub struct OptionBroadcast {
    /// Option identifier to submit as a vote.
    pub id: String,
    /// Display color tag.
    pub color: String,
    /// Answer text.
    pub text: String,
}

impl From<&AnswerOption> for OptionBroadcast {
    fn from(value: &AnswerOption) -> Self {
        Self {
            id: value.id.clone(),
            color: value.color.as_str().to_string(),
            text: value.text.clone(),
        }
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// The player-facing projection of a question.
///
/// This type has no field for `correct_option_id`, `correct_answer` or
/// `correct_value`: inspecting the broadcast cannot reveal the answer.
pub struct QuestionBroadcast {
    /// Question identifier.
    pub id: u32,
    /// Variant tag.
    #[serde(rename = "type")]
    pub question_type: QuestionTypeTag,
    /// Question text.
    pub text: String,
    /// Countdown in seconds.
    pub time_limit: u64,
    /// Options for choice-based questions.
    pub options: Option<Vec<OptionBroadcast>>,
    /// Lower slider bound.
    pub min: Option<f64>,
    /// Upper slider bound.
    pub max: Option<f64>,
    /// Slider step size.
    pub step: Option<f64>,
}

impl From<&Question> for QuestionBroadcast {
    fn from(question: &Question) -> Self {
        let (min, max, step) = match question.kind {
            QuestionKind::Slider {
                min, max, step, ..
            } => (Some(min), Some(max), Some(step)),
            _ => (None, None, None),
        };

        Self {
            id: question.id,
            question_type: (&question.kind).into(),
            text: question.text.clone(),
            time_limit: question.time_limit_secs,
            options: question
                .kind
                .options()
                .map(|options| options.iter().map(Into::into).collect()),
            min,
            max,
            step,
        }
    }
}
