//! Quiz dashboard endpoints backed by the quiz store.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::quiz::{QuizDocument, QuizInput},
    error::AppError,
    services::quiz_service,
    state::SharedState,
};

/// Routes handling stored quiz management.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/quizzes", post(save_quiz).get(list_quizzes))
        .route("/quizzes/{id}", delete(delete_quiz))
}

/// Persist an authored quiz.
#[utoipa::path(
    post,
    path = "/quizzes",
    tag = "quizzes",
    request_body = QuizInput,
    responses(
        (status = 200, description = "Quiz saved", body = QuizDocument),
        (status = 503, description = "Quiz store unavailable")
    )
)]
pub async fn save_quiz(
    State(state): State<SharedState>,
    Json(payload): Json<QuizInput>,
) -> Result<Json<QuizDocument>, AppError> {
    payload.validate()?;
    let document = quiz_service::save_quiz(&state, payload).await?;
    Ok(Json(document))
}

/// List stored quizzes, newest first.
#[utoipa::path(
    get,
    path = "/quizzes",
    tag = "quizzes",
    responses(
        (status = 200, description = "Stored quizzes", body = [QuizDocument]),
        (status = 503, description = "Quiz store unavailable")
    )
)]
pub async fn list_quizzes(
    State(state): State<SharedState>,
) -> Result<Json<Vec<QuizDocument>>, AppError> {
    let documents = quiz_service::list_quizzes(&state).await?;
    Ok(Json(documents))
}

/// Delete a stored quiz.
#[utoipa::path(
    delete,
    path = "/quizzes/{id}",
    tag = "quizzes",
    params(("id" = Uuid, Path, description = "Identifier of the quiz to delete")),
    responses(
        (status = 204, description = "Quiz deleted"),
        (status = 404, description = "Unknown quiz")
    )
)]
pub async fn delete_quiz(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<(), AppError> {
    quiz_service::delete_quiz(&state, id).await?;
    Ok(())
}
