//! Quiz dashboard operations backed by the quiz store.

use std::time::SystemTime;

use uuid::Uuid;

use crate::{
    dao::models::QuizEntity,
    dto::quiz::{QuizDocument, QuizInput},
    error::ServiceError,
    services::game_service,
    state::SharedState,
};

/// Validate and persist an authored quiz, returning the stored document.
pub async fn save_quiz(
    state: &SharedState,
    input: QuizInput,
) -> Result<QuizDocument, ServiceError> {
    // Reuse the hosting-side conversion so a quiz that saves is a quiz that
    // can be hosted.
    let quiz = game_service::build_quiz(input, state.config())?;

    let entity = QuizEntity {
        id: Uuid::new_v4(),
        created_at: SystemTime::now(),
        ..QuizEntity::from(quiz)
    };

    let store = state.require_quiz_store().await?;
    store.save_quiz(entity.clone()).await?;
    Ok(entity.into())
}

/// List every stored quiz, newest first.
pub async fn list_quizzes(state: &SharedState) -> Result<Vec<QuizDocument>, ServiceError> {
    let store = state.require_quiz_store().await?;
    let quizzes = store.list_quizzes().await?;
    Ok(quizzes.into_iter().map(Into::into).collect())
}

/// Delete a stored quiz by id.
pub async fn delete_quiz(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_quiz_store().await?;
    store.delete_quiz(id).await?;
    Ok(())
}
