//! Runtime quiz model: the host-side authoritative questions, including the
//! correctness data that is never broadcast to players.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::{AnswerOptionEntity, QuestionEntity, QuestionKindEntity, QuizEntity};

/// Color tag carried by an answer option, used by clients to pick a button style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionColor {
    /// Red answer button.
    Red,
    /// Blue answer button.
    Blue,
    /// Green answer button.
    Green,
    /// Yellow answer button.
    Yellow,
}

impl OptionColor {
    /// Wire representation of the color tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionColor::Red => "red",
            OptionColor::Blue => "blue",
            OptionColor::Green => "green",
            OptionColor::Yellow => "yellow",
        }
    }
}

impl std::str::FromStr for OptionColor {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "red" => Ok(OptionColor::Red),
            "blue" => Ok(OptionColor::Blue),
            "green" => Ok(OptionColor::Green),
            "yellow" => Ok(OptionColor::Yellow),
            _ => Err(()),
        }
    }
}

/// One selectable answer of a choice-based question.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOption {
    /// Stable identifier referenced by votes and by the answer key.
    pub id: String,
    /// Display color tag.
    pub color: OptionColor,
    /// Answer text.
    pub text: String,
}

/// Variant-specific payload of a question.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionKind {
    /// Pick-one question with a single correct option.
    MultipleChoice {
        /// Ordered answer options.
        options: Vec<AnswerOption>,
        /// Identifier of the winning option.
        correct_option_id: String,
    },
    /// Two-option variant of [`QuestionKind::MultipleChoice`].
    TrueFalse {
        /// Exactly two options.
        options: Vec<AnswerOption>,
        /// Identifier of the winning option.
        correct_option_id: String,
    },
    /// Opinion poll; collected but never graded.
    Poll {
        /// Ordered answer options.
        options: Vec<AnswerOption>,
    },
    /// Free-text question matched case- and whitespace-insensitively.
    OpenEnded {
        /// Canonical accepted answer.
        correct_answer: String,
    },
    /// Free-text collection for a word cloud; never graded.
    WordCloud,
    /// Numeric guess graded by continuous accuracy.
    Slider {
        /// Lower bound of the slider.
        min: f64,
        /// Upper bound of the slider.
        max: f64,
        /// Slider step size.
        step: f64,
        /// Value the accuracy is measured against.
        correct_value: f64,
    },
}

impl QuestionKind {
    /// Whether votes on this question affect score, streak and coins.
    pub fn is_graded(&self) -> bool {
        !matches!(self, QuestionKind::Poll { .. } | QuestionKind::WordCloud)
    }

    /// Options shown to players, when the variant has any.
    pub fn options(&self) -> Option<&[AnswerOption]> {
        match self {
            QuestionKind::MultipleChoice { options, .. }
            | QuestionKind::TrueFalse { options, .. }
            | QuestionKind::Poll { options } => Some(options),
            _ => None,
        }
    }
}

/// A single authored question. Immutable once the game is created.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    /// Position-derived identifier, unique within the quiz.
    pub id: u32,
    /// Question text shown to everyone.
    pub text: String,
    /// Countdown for the round in seconds.
    pub time_limit_secs: u64,
    /// Variant payload.
    pub kind: QuestionKind,
}

impl Question {
    /// Human-readable text of the correct answer, revealed in result messages.
    pub fn correct_text(&self) -> String {
        match &self.kind {
            QuestionKind::MultipleChoice {
                options,
                correct_option_id,
            }
            | QuestionKind::TrueFalse {
                options,
                correct_option_id,
            } => options
                .iter()
                .find(|option| option.id == *correct_option_id)
                .map(|option| option.text.clone())
                .unwrap_or_default(),
            QuestionKind::OpenEnded { correct_answer } => correct_answer.clone(),
            QuestionKind::Slider { correct_value, .. } => format_number(*correct_value),
            QuestionKind::Poll { .. } | QuestionKind::WordCloud => String::new(),
        }
    }

    /// Structured answer key for result messages: the winning option id for
    /// choice questions, the target value for sliders.
    pub fn answer_key(&self) -> (Option<String>, Option<f64>) {
        match &self.kind {
            QuestionKind::MultipleChoice {
                correct_option_id, ..
            }
            | QuestionKind::TrueFalse {
                correct_option_id, ..
            } => (Some(correct_option_id.clone()), None),
            QuestionKind::Slider { correct_value, .. } => (None, Some(*correct_value)),
            _ => (None, None),
        }
    }
}

/// Canonical string rendering of a numeric value (integers without a
/// fractional part).
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// An authored quiz: the unit of persistence and of hosting.
#[derive(Debug, Clone, PartialEq)]
pub struct Quiz {
    /// Stable identifier used by the quiz store.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// Optional description shown on the dashboard.
    pub description: Option<String>,
    /// Optional cover image URL.
    pub cover_image_url: Option<String>,
    /// Ordered questions.
    pub questions: Vec<Question>,
    /// Creation timestamp for auditing.
    pub created_at: SystemTime,
}

impl From<AnswerOptionEntity> for AnswerOption {
    fn from(value: AnswerOptionEntity) -> Self {
        Self {
            id: value.id,
            color: value.color,
            text: value.text,
        }
    }
}

impl From<AnswerOption> for AnswerOptionEntity {
    fn from(value: AnswerOption) -> Self {
        Self {
            id: value.id,
            color: value.color,
            text: value.text,
        }
    }
}

impl From<QuestionKindEntity> for QuestionKind {
    fn from(value: QuestionKindEntity) -> Self {
        match value {
            QuestionKindEntity::MultipleChoice {
                options,
                correct_option_id,
            } => Self::MultipleChoice {
                options: options.into_iter().map(Into::into).collect(),
                correct_option_id,
            },
            QuestionKindEntity::TrueFalse {
                options,
                correct_option_id,
            } => Self::TrueFalse {
                options: options.into_iter().map(Into::into).collect(),
                correct_option_id,
            },
            QuestionKindEntity::Poll { options } => Self::Poll {
                options: options.into_iter().map(Into::into).collect(),
            },
            QuestionKindEntity::OpenEnded { correct_answer } => Self::OpenEnded { correct_answer },
            QuestionKindEntity::WordCloud => Self::WordCloud,
            QuestionKindEntity::Slider {
                min,
                max,
                step,
                correct_value,
            } => Self::Slider {
                min,
                max,
                step,
                correct_value,
            },
        }
    }
}

impl From<QuestionKind> for QuestionKindEntity {
    fn from(value: QuestionKind) -> Self {
        match value {
            QuestionKind::MultipleChoice {
                options,
                correct_option_id,
            } => Self::MultipleChoice {
                options: options.into_iter().map(Into::into).collect(),
                correct_option_id,
            },
            QuestionKind::TrueFalse {
                options,
                correct_option_id,
            } => Self::TrueFalse {
                options: options.into_iter().map(Into::into).collect(),
                correct_option_id,
            },
            QuestionKind::Poll { options } => Self::Poll {
                options: options.into_iter().map(Into::into).collect(),
            },
            QuestionKind::OpenEnded { correct_answer } => Self::OpenEnded { correct_answer },
            QuestionKind::WordCloud => Self::WordCloud,
            QuestionKind::Slider {
                min,
                max,
                step,
                correct_value,
            } => Self::Slider {
                min,
                max,
                step,
                correct_value,
            },
        }
    }
}

impl From<QuestionEntity> for Question {
    fn from(value: QuestionEntity) -> Self {
        Self {
            id: value.id,
            text: value.text,
            time_limit_secs: value.time_limit_secs,
            kind: value.kind.into(),
        }
    }
}

impl From<Question> for QuestionEntity {
    fn from(value: Question) -> Self {
        Self {
            id: value.id,
            text: value.text,
            time_limit_secs: value.time_limit_secs,
            kind: value.kind.into(),
        }
    }
}

impl From<QuizEntity> for Quiz {
    fn from(value: QuizEntity) -> Self {
        Self {
            id: value.id,
            title: value.title,
            description: value.description,
            cover_image_url: value.cover_image_url,
            questions: value.questions.into_iter().map(Into::into).collect(),
            created_at: value.created_at,
        }
    }
}

impl From<Quiz> for QuizEntity {
    fn from(value: Quiz) -> Self {
        Self {
            id: value.id,
            title: value.title,
            description: value.description,
            cover_image_url: value.cover_image_url,
            questions: value.questions.into_iter().map(Into::into).collect(),
            created_at: value.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mc_question() -> Question {
        Question {
            id: 0,
            text: "Capital of France?".into(),
            time_limit_secs: 20,
            kind: QuestionKind::MultipleChoice {
                options: vec![
                    AnswerOption {
                        id: "opt1".into(),
                        color: OptionColor::Red,
                        text: "Paris".into(),
                    },
                    AnswerOption {
                        id: "opt2".into(),
                        color: OptionColor::Blue,
                        text: "Lyon".into(),
                    },
                ],
                correct_option_id: "opt1".into(),
            },
        }
    }

    #[test]
    fn correct_text_resolves_the_winning_option() {
        assert_eq!(mc_question().correct_text(), "Paris");
    }

    #[test]
    fn correct_text_renders_slider_targets_without_trailing_zeroes() {
        let question = Question {
            id: 1,
            text: "Guess".into(),
            time_limit_secs: 20,
            kind: QuestionKind::Slider {
                min: 0.0,
                max: 100.0,
                step: 1.0,
                correct_value: 50.0,
            },
        };
        assert_eq!(question.correct_text(), "50");
    }

    #[test]
    fn ungraded_kinds_are_flagged() {
        assert!(mc_question().kind.is_graded());
        assert!(!QuestionKind::WordCloud.is_graded());
        assert!(!QuestionKind::Poll { options: vec![] }.is_graded());
    }

    #[test]
    fn entity_round_trip_preserves_questions() {
        let question = mc_question();
        let entity: QuestionEntity = question.clone().into();
        let back: Question = entity.into();
        assert_eq!(back, question);
    }
}
