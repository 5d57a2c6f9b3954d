//! Abstraction over the persistence layer for quizzes and game results.

pub mod memory;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::models::{GameResultEntity, QuizEntity};
use crate::dao::storage::StorageResult;

/// Passive persistence collaborator for the quiz dashboard and the results
/// archive. The game engine never blocks a live round on any of these calls.
pub trait QuizStore: Send + Sync {
    /// Persist a quiz document, replacing any document with the same id.
    fn save_quiz(&self, quiz: QuizEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// List every stored quiz, newest first.
    fn list_quizzes(&self) -> BoxFuture<'static, StorageResult<Vec<QuizEntity>>>;
    /// Delete a stored quiz by id.
    fn delete_quiz(&self, id: Uuid) -> BoxFuture<'static, StorageResult<()>>;
    /// Archive the final ranking of a finished game.
    fn save_result(&self, result: GameResultEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Probe the backend for liveness.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
