//! Authoring-side quiz payloads: validated inputs and stored documents.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dao::models::QuizEntity,
    dto::{
        format_system_time,
        validation::{validate_time_limit, validation_error},
        wire::QuestionTypeTag,
    },
    state::quiz::{Question, QuestionKind},
};

/// Payload used to host a game from a quiz definition.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateGameRequest {
    /// The quiz to play.
    #[validate(nested)]
    pub quiz: QuizInput,
}

/// Incoming quiz definition, shared by the hosting and the save endpoints.
#[skip_serializing_none]
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuizInput {
    /// Quiz title.
    #[validate(length(min = 1, message = "quiz title must not be empty"))]
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Optional cover image URL.
    #[serde(default)]
    pub cover_image_url: Option<String>,
    /// Ordered question list.
    #[validate(
        length(min = 1, message = "a quiz requires at least one question"),
        nested
    )]
    pub questions: Vec<QuestionInput>,
}

/// Incoming question definition in the flat authored shape.
#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionInput {
    /// Variant tag.
    #[serde(rename = "type")]
    pub question_type: QuestionTypeTag,
    /// Question text.
    pub text: String,
    /// Optional countdown override in seconds.
    #[serde(default)]
    pub time_limit: Option<u64>,
    /// Options for choice-based variants.
    #[serde(default)]
    pub options: Vec<OptionInput>,
    /// Winning option id for MC and TRUE_FALSE.
    #[serde(default)]
    pub correct_option_id: Option<String>,
    /// Accepted answer for OPEN_ENDED.
    #[serde(default)]
    pub correct_answer: Option<String>,
    /// Lower bound for SLIDER.
    #[serde(default)]
    pub min: Option<f64>,
    /// Upper bound for SLIDER.
    #[serde(default)]
    pub max: Option<f64>,
    /// Step size for SLIDER.
    #[serde(default)]
    pub step: Option<f64>,
    /// Target value for SLIDER.
    #[serde(default)]
    pub correct_value: Option<f64>,
}

/// Incoming answer option definition.
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
pub struct OptionInput {
    /// Stable option identifier referenced by votes.
    #[validate(length(min = 1, message = "option id must not be empty"))]
    pub id: String,
    /// Display color tag (red, blue, green or yellow).
    pub color: String,
    /// Answer text.
    #[validate(length(min = 1, message = "option text must not be empty"))]
    pub text: String,
}

impl Validate for QuestionInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.text.trim().is_empty() {
            errors.add(
                "text",
                validation_error("question_text_empty", "question text must not be empty".into()),
            );
        }

        if let Some(secs) = self.time_limit {
            if let Err(err) = validate_time_limit(secs) {
                errors.add("time_limit", err);
            }
        }

        for option in &self.options {
            if let Err(option_errors) = option.validate() {
                errors.merge_self("options", Err(option_errors));
            }
        }

        let option_ids: HashSet<&str> = self.options.iter().map(|o| o.id.as_str()).collect();
        if option_ids.len() != self.options.len() {
            errors.add(
                "options",
                validation_error("option_ids_duplicate", "option ids must be unique".into()),
            );
        }

        match self.question_type {
            QuestionTypeTag::Mc | QuestionTypeTag::TrueFalse | QuestionTypeTag::Poll => {
                let minimum = 2;
                if self.options.len() < minimum {
                    errors.add(
                        "options",
                        validation_error(
                            "options_missing",
                            format!(
                                "{:?} questions need at least {minimum} options",
                                self.question_type
                            ),
                        ),
                    );
                }

                if matches!(
                    self.question_type,
                    QuestionTypeTag::Mc | QuestionTypeTag::TrueFalse
                ) {
                    match self.correct_option_id.as_deref() {
                        None => errors.add(
                            "correct_option_id",
                            validation_error(
                                "correct_option_missing",
                                "a winning option id is required".into(),
                            ),
                        ),
                        Some(id) if !option_ids.contains(id) => errors.add(
                            "correct_option_id",
                            validation_error(
                                "correct_option_unknown",
                                format!("winning option `{id}` is not among the options"),
                            ),
                        ),
                        Some(_) => {}
                    }
                }
            }
            QuestionTypeTag::OpenEnded => {
                if self
                    .correct_answer
                    .as_deref()
                    .is_none_or(|answer| answer.trim().is_empty())
                {
                    errors.add(
                        "correct_answer",
                        validation_error(
                            "correct_answer_missing",
                            "open-ended questions need a non-empty accepted answer".into(),
                        ),
                    );
                }
            }
            QuestionTypeTag::WordCloud => {}
            QuestionTypeTag::Slider => {
                match (self.min, self.max, self.correct_value) {
                    (Some(min), Some(max), Some(correct)) => {
                        if max < min {
                            errors.add(
                                "max",
                                validation_error(
                                    "slider_bounds_inverted",
                                    format!("slider max ({max}) must not be below min ({min})"),
                                ),
                            );
                        } else if !(min..=max).contains(&correct) {
                            errors.add(
                                "correct_value",
                                validation_error(
                                    "slider_target_out_of_range",
                                    format!("target value {correct} is outside [{min}, {max}]"),
                                ),
                            );
                        }
                    }
                    _ => errors.add(
                        "min",
                        validation_error(
                            "slider_fields_missing",
                            "slider questions need min, max and a target value".into(),
                        ),
                    ),
                }

                if let Some(step) = self.step {
                    if step <= 0.0 {
                        errors.add(
                            "step",
                            validation_error(
                                "slider_step_invalid",
                                format!("slider step must be positive (got {step})"),
                            ),
                        );
                    }
                }
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Stored quiz document as returned by the dashboard endpoints.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizDocument {
    /// Stable quiz identifier.
    pub id: Uuid,
    /// Quiz title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional cover image URL.
    pub cover_image_url: Option<String>,
    /// Full questions, including answer keys. This is the host-facing
    /// authoring surface, not the player broadcast.
    pub questions: Vec<QuestionDetail>,
    /// Creation timestamp, RFC 3339.
    pub created_at: String,
}

impl From<QuizEntity> for QuizDocument {
    fn from(value: QuizEntity) -> Self {
        Self {
            id: value.id,
            title: value.title,
            description: value.description,
            cover_image_url: value.cover_image_url,
            questions: value
                .questions
                .into_iter()
                .map(|entity| QuestionDetail::from(&Question::from(entity)))
                .collect(),
            created_at: format_system_time(value.created_at),
        }
    }
}

/// Host-side view of a question, answer key included.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDetail {
    /// Question identifier.
    pub id: u32,
    /// Variant tag.
    #[serde(rename = "type")]
    pub question_type: QuestionTypeTag,
    /// Question text.
    pub text: String,
    /// Countdown in seconds.
    pub time_limit: u64,
    /// Options for choice-based variants.
    pub options: Option<Vec<OptionDetail>>,
    /// Winning option id.
    pub correct_option_id: Option<String>,
    /// Accepted open-ended answer.
    pub correct_answer: Option<String>,
    /// Lower slider bound.
    pub min: Option<f64>,
    /// Upper slider bound.
    pub max: Option<f64>,
    /// Slider step size.
    pub step: Option<f64>,
    /// Slider target value.
    pub correct_value: Option<f64>,
}

/// Host-side view of an answer option.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OptionDetail {
    /// Option identifier.
    pub id: String,
    /// Display color tag.
    pub color: String,
    /// Answer text.
    pub text: String,
}

impl From<&Question> for QuestionDetail {
    fn from(question: &Question) -> Self {
        let options = question.kind.options().map(|options| {
            options
                .iter()
                .map(|option| OptionDetail {
                    id: option.id.clone(),
                    color: option.color.as_str().to_string(),
                    text: option.text.clone(),
                })
                .collect()
        });

        let (correct_option_id, correct_answer, min, max, step, correct_value) =
            match &question.kind {
                QuestionKind::MultipleChoice {
                    correct_option_id, ..
                }
                | QuestionKind::TrueFalse {
                    correct_option_id, ..
                } => (
                    Some(correct_option_id.clone()),
                    None,
                    None,
                    None,
                    None,
                    None,
                ),
                QuestionKind::OpenEnded { correct_answer } => {
                    (None, Some(correct_answer.clone()), None, None, None, None)
                }
                QuestionKind::Slider {
                    min,
                    max,
                    step,
                    correct_value,
                } => (
                    None,
                    None,
                    Some(*min),
                    Some(*max),
                    Some(*step),
                    Some(*correct_value),
                ),
                QuestionKind::Poll { .. } | QuestionKind::WordCloud => {
                    (None, None, None, None, None, None)
                }
            };

        Self {
            id: question.id,
            question_type: (&question.kind).into(),
            text: question.text.clone(),
            time_limit: question.time_limit_secs,
            options,
            correct_option_id,
            correct_answer,
            min,
            max,
            step,
            correct_value,
        }
    }
}
