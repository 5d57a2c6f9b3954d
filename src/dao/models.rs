//! Stored document shapes for quizzes and finished-game results.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::quiz::OptionColor;

/// Stored quiz document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizEntity {
    /// Primary key of the quiz.
    pub id: Uuid,
    /// Quiz title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional cover image URL.
    pub cover_image_url: Option<String>,
    /// Ordered questions.
    pub questions: Vec<QuestionEntity>,
    /// Creation timestamp.
    pub created_at: SystemTime,
}

/// Stored question document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionEntity {
    /// Question identifier, unique within the quiz.
    pub id: u32,
    /// Question text.
    pub text: String,
    /// Countdown in seconds.
    pub time_limit_secs: u64,
    /// Variant payload.
    pub kind: QuestionKindEntity,
}

/// Stored variant payload of a question.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QuestionKindEntity {
    /// Pick-one question.
    MultipleChoice {
        /// Ordered answer options.
        options: Vec<AnswerOptionEntity>,
        /// Identifier of the winning option.
        correct_option_id: String,
    },
    /// Two-option question.
    TrueFalse {
        /// Exactly two options.
        options: Vec<AnswerOptionEntity>,
        /// Identifier of the winning option.
        correct_option_id: String,
    },
    /// Ungraded poll.
    Poll {
        /// Ordered answer options.
        options: Vec<AnswerOptionEntity>,
    },
    /// Free-text question.
    OpenEnded {
        /// Canonical accepted answer.
        correct_answer: String,
    },
    /// Ungraded word cloud.
    WordCloud,
    /// Numeric guess question.
    Slider {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
        /// Step size.
        step: f64,
        /// Target value.
        correct_value: f64,
    },
}

/// Stored answer option.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerOptionEntity {
    /// Option identifier.
    pub id: String,
    /// Display color tag.
    pub color: OptionColor,
    /// Answer text.
    pub text: String,
}

/// Stored record of a finished game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameResultEntity {
    /// Primary key of the result.
    pub id: Uuid,
    /// Join code of the game the result belongs to.
    pub join_code: String,
    /// Title of the quiz that was played.
    pub quiz_title: String,
    /// Completion timestamp.
    pub finished_at: SystemTime,
    /// Final standings, best first.
    pub rankings: Vec<RankingEntryEntity>,
}

/// One row of a stored final ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingEntryEntity {
    /// 1-based rank.
    pub rank: u32,
    /// Player display name.
    pub name: String,
    /// Final score.
    pub score: u32,
}
