//! In-process quiz store backend.

use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use futures::{FutureExt, future};
use uuid::Uuid;

use crate::dao::{
    models::{GameResultEntity, QuizEntity},
    quiz_store::QuizStore,
    storage::{StorageError, StorageResult},
};

/// Quiz store keeping every document in process memory.
///
/// This is the default backend: a single-host party game does not need a
/// database to run. Documents live as long as the process does.
#[derive(Default)]
pub struct MemoryQuizStore {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    quizzes: DashMap<Uuid, QuizEntity>,
    results: Mutex<Vec<GameResultEntity>>,
}

impl MemoryQuizStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the archived results, newest last. Used by diagnostics
    /// and tests.
    pub fn saved_results(&self) -> Vec<GameResultEntity> {
        self.inner
            .results
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl QuizStore for MemoryQuizStore {
    fn save_quiz(&self, quiz: QuizEntity) -> future::BoxFuture<'static, StorageResult<()>> {
        self.inner.quizzes.insert(quiz.id, quiz);
        future::ready(Ok(())).boxed()
    }

    fn list_quizzes(&self) -> future::BoxFuture<'static, StorageResult<Vec<QuizEntity>>> {
        let mut quizzes: Vec<QuizEntity> = self
            .inner
            .quizzes
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        quizzes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        future::ready(Ok(quizzes)).boxed()
    }

    fn delete_quiz(&self, id: Uuid) -> future::BoxFuture<'static, StorageResult<()>> {
        let outcome = match self.inner.quizzes.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StorageError::not_found(format!("quiz `{id}`"))),
        };
        future::ready(outcome).boxed()
    }

    fn save_result(&self, result: GameResultEntity) -> future::BoxFuture<'static, StorageResult<()>> {
        if let Ok(mut guard) = self.inner.results.lock() {
            guard.push(result);
        }
        future::ready(Ok(())).boxed()
    }

    fn health_check(&self) -> future::BoxFuture<'static, StorageResult<()>> {
        future::ready(Ok(())).boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;

    fn quiz(title: &str) -> QuizEntity {
        QuizEntity {
            id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            cover_image_url: None,
            questions: vec![],
            created_at: SystemTime::now(),
        }
    }

    #[tokio::test]
    async fn save_then_list_round_trips() {
        let store = MemoryQuizStore::new();
        let entity = quiz("Movie night");
        store.save_quiz(entity.clone()).await.unwrap();

        let listed = store.list_quizzes().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, entity.id);
    }

    #[tokio::test]
    async fn saving_under_the_same_id_replaces_the_document() {
        let store = MemoryQuizStore::new();
        let mut entity = quiz("v1");
        store.save_quiz(entity.clone()).await.unwrap();
        entity.title = "v2".into();
        store.save_quiz(entity.clone()).await.unwrap();

        let listed = store.list_quizzes().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "v2");
    }

    #[tokio::test]
    async fn deleting_an_unknown_quiz_reports_not_found() {
        let store = MemoryQuizStore::new();
        let err = store.delete_quiz(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[tokio::test]
    async fn results_accumulate_in_order() {
        let store = MemoryQuizStore::new();
        for code in ["AAAA", "BBBB"] {
            store
                .save_result(GameResultEntity {
                    id: Uuid::new_v4(),
                    join_code: code.into(),
                    quiz_title: "t".into(),
                    finished_at: SystemTime::now(),
                    rankings: vec![],
                })
                .await
                .unwrap();
        }

        let results = store.saved_results();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].join_code, "AAAA");
    }
}
