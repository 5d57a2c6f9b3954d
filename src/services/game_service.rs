//! Host-side game orchestration: hosting, starting rounds, revealing and
//! finishing the game.

use std::time::SystemTime;

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::models::{GameResultEntity, RankingEntryEntity},
    dto::{
        events::{GameFinishedEvent, RoundRevealedEvent},
        game::GameSummary,
        quiz::{CreateGameRequest, OptionInput, QuizInput},
        wire::{HostMessage, QuestionBroadcast, QuestionTypeTag},
    },
    error::ServiceError,
    services::{ranking, round_timer, scoring, sse_events},
    state::{
        SharedState,
        game::{GameSession, epoch_ms},
        quiz::{AnswerOption, OptionColor, Question, QuestionKind, Quiz},
        state_machine::GameEvent,
        transitions::run_transition_with_broadcast,
    },
};

/// Host a new game: build the session, open the lobby and hand out a join code.
pub async fn create_game(
    state: &SharedState,
    request: CreateGameRequest,
) -> Result<GameSummary, ServiceError> {
    let quiz = build_quiz(request.quiz, state.config())?;

    let summary = run_transition_with_broadcast(state, GameEvent::OpenLobby, || async {
        let session = GameSession::new(quiz);
        let summary = GameSummary::from_session(
            &session,
            crate::dto::phase::VisibleGamePhase::Lobby,
        );
        info!(join_code = %session.join_code, quiz = %session.quiz.title, "game hosted");

        let mut slot = state.session().write().await;
        *slot = Some(session);
        Ok(summary)
    })
    .await?;

    Ok(summary)
}

/// Start the quiz. Requires at least one registered player.
pub async fn start_game(state: &SharedState) -> Result<(), ServiceError> {
    let player_count = state
        .read_session(|maybe| maybe.map(|session| session.roster.len()).unwrap_or(0))
        .await;
    if player_count == 0 {
        return Err(ServiceError::InvalidState(
            "at least one player must join before starting".into(),
        ));
    }

    run_transition_with_broadcast(state, GameEvent::StartGame, || start_round(state, 0)).await
}

/// Broadcast question `index` and arm its countdown.
async fn start_round(state: &SharedState, index: usize) -> Result<(), ServiceError> {
    let now_ms = epoch_ms();

    let (message, time_limit_secs) = state
        .with_session_mut(|session| {
            let total_questions = session.quiz.questions.len() as u32;
            let Some(question) = session.begin_round(index, now_ms) else {
                return Err(ServiceError::InvalidState(format!(
                    "question index {index} is out of range"
                )));
            };

            let message = HostMessage::GameStart {
                question: QuestionBroadcast::from(question),
                current_question: index as u32 + 1,
                total_questions,
                start_time: now_ms,
            };
            Ok((message, question.time_limit_secs))
        })
        .await?;

    state.peers().broadcast(&message);
    state
        .install_round_timer(round_timer::spawn(state.clone(), index, time_limit_secs))
        .await;
    Ok(())
}

/// End the active round and grade the frozen vote snapshot.
///
/// `expected_round` carries the round index of the countdown that triggered
/// the reveal; a timer that lost the race against a manual reveal (or fired
/// after the session moved on) fails here without side effects. Grading,
/// roster mutation and result construction all happen under the session
/// lock inside the transition, so votes arriving afterwards can never leak
/// into this round.
pub async fn reveal_round(
    state: &SharedState,
    expected_round: Option<usize>,
) -> Result<(), ServiceError> {
    state.cancel_round_timer().await;
    let config = state.config().clone();

    let (results, event) = run_transition_with_broadcast(state, GameEvent::Reveal, || async {
        state
            .with_session_mut(|session| {
                if let Some(expected) = expected_round {
                    if session.current_question_index != Some(expected) {
                        return Err(ServiceError::InvalidState(
                            "countdown belongs to an earlier round".into(),
                        ));
                    }
                }

                let question = session
                    .current_question()
                    .cloned()
                    .ok_or_else(|| ServiceError::InvalidState("no round is active".into()))?;

                let votes = session.freeze_votes();
                let grading = scoring::grade(
                    &question,
                    session.question_started_at_ms,
                    &votes,
                    &session.roster,
                    &config,
                );

                for outcome in &grading.outcomes {
                    if let Some(player) = session.roster.get_mut(&outcome.player_id) {
                        player.score += outcome.earned_points;
                        player.streak = outcome.new_streak;
                        player.coins += outcome.coins_earned;
                    }
                }
                session.time_left_secs = 0;

                let ranking = ranking::rank(&session.roster);
                let correct_text = question.correct_text();
                let (correct_option_id, correct_value) = question.answer_key();

                let results: Vec<(Uuid, HostMessage)> = grading
                    .outcomes
                    .iter()
                    .filter_map(|outcome| {
                        let player = session.roster.get(&outcome.player_id)?;
                        Some((
                            outcome.player_id,
                            HostMessage::Result {
                                score: player.score,
                                correct_option_id: correct_option_id.clone(),
                                correct_text: correct_text.clone(),
                                correct_value,
                                coins: player.coins,
                                coins_earned: outcome.coins_earned,
                                streak: player.streak,
                                badges: outcome.badges.clone(),
                                rank: ranking::rank_of(&ranking, &outcome.player_id)
                                    .unwrap_or(0),
                                round_stats: grading.stats.clone(),
                            },
                        ))
                    })
                    .collect();

                let event = RoundRevealedEvent {
                    question_id: question.id,
                    correct_text,
                    stats: grading.stats,
                    leaderboard: ranking.iter().map(Into::into).collect(),
                };

                Ok((results, event))
            })
            .await
    })
    .await?;

    for (peer_id, message) in results {
        state.peers().send(&peer_id, message);
    }
    sse_events::broadcast_round_revealed(state, event);
    Ok(())
}

/// Advance past a revealed question: next round, or game over after the last.
pub async fn next_question(state: &SharedState) -> Result<(), ServiceError> {
    let progress = state
        .read_session(|maybe| {
            maybe.map(|session| {
                (
                    session
                        .current_question_index
                        .map(|index| index + 1)
                        .unwrap_or(0),
                    session.quiz.questions.len(),
                )
            })
        })
        .await;
    let Some((next_index, total)) = progress else {
        return Err(ServiceError::InvalidState(
            "no game is currently hosted".into(),
        ));
    };

    state.cancel_round_timer().await;

    if next_index < total {
        run_transition_with_broadcast(state, GameEvent::NextQuestion, || {
            start_round(state, next_index)
        })
        .await
    } else {
        finish_game(state).await
    }
}

/// Send final rankings, archive the result and mark the game as over.
async fn finish_game(state: &SharedState) -> Result<(), ServiceError> {
    let (messages, event, entity) =
        run_transition_with_broadcast(state, GameEvent::Finish, || async {
            state
                .with_session_mut(|session| {
                    let ranking = ranking::rank(&session.roster);
                    let messages: Vec<(Uuid, HostMessage)> = ranking
                        .iter()
                        .map(|entry| {
                            (
                                entry.player_id,
                                HostMessage::GameOver {
                                    rank: entry.rank,
                                    score: entry.score,
                                },
                            )
                        })
                        .collect();
                    let event = GameFinishedEvent {
                        ranking: ranking.iter().map(Into::into).collect(),
                    };
                    let entity = GameResultEntity {
                        id: Uuid::new_v4(),
                        join_code: session.join_code.clone(),
                        quiz_title: session.quiz.title.clone(),
                        finished_at: SystemTime::now(),
                        rankings: ranking
                            .iter()
                            .map(|entry| RankingEntryEntity {
                                rank: entry.rank,
                                name: entry.name.clone(),
                                score: entry.score,
                            })
                            .collect(),
                    };
                    Ok((messages, event, entity))
                })
                .await
        })
        .await?;

    for (peer_id, message) in messages {
        state.peers().send(&peer_id, message);
    }
    sse_events::broadcast_game_finished(state, event);

    // Archive in the background; a live lobby must never wait on storage.
    if let Some(store) = state.quiz_store().await {
        let join_code = entity.join_code.clone();
        tokio::spawn(async move {
            if let Err(err) = store.save_result(entity).await {
                warn!(join_code = %join_code, error = %err, "failed to archive game result");
            }
        });
    }

    Ok(())
}

/// Tear down the hosted game from any phase. The host left; the session and
/// every peer channel go with it.
pub async fn close_game(state: &SharedState) -> Result<(), ServiceError> {
    state.cancel_round_timer().await;

    run_transition_with_broadcast(state, GameEvent::CloseGame, || async {
        let mut slot = state.session().write().await;
        if slot.take().is_none() {
            return Err(ServiceError::InvalidState(
                "no game is currently hosted".into(),
            ));
        }
        Ok(())
    })
    .await?;

    state.peers().clear();
    Ok(())
}

/// Summary of the hosted game for the dashboard.
pub async fn current_summary(state: &SharedState) -> Result<GameSummary, ServiceError> {
    let phase = state.phase().await;
    state
        .read_session(|maybe| {
            maybe.map(|session| GameSummary::from_session(session, (&phase).into()))
        })
        .await
        .ok_or_else(|| ServiceError::NotFound("no game is currently hosted".into()))
}

/// Convert a validated quiz payload into the runtime quiz.
///
/// Cross-field requirements are re-checked here so the service stays safe
/// even when called with an unvalidated payload.
pub fn build_quiz(input: QuizInput, config: &AppConfig) -> Result<Quiz, ServiceError> {
    let QuizInput {
        title,
        description,
        cover_image_url,
        questions,
    } = input;

    if title.trim().is_empty() {
        return Err(ServiceError::InvalidInput(
            "quiz title must not be empty".into(),
        ));
    }
    if questions.is_empty() {
        return Err(ServiceError::InvalidInput(
            "a quiz requires at least one question".into(),
        ));
    }

    let questions = questions
        .into_iter()
        .enumerate()
        .map(|(index, question)| {
            let time_limit_secs = question
                .time_limit
                .unwrap_or(config.default_time_limit_secs);

            let kind = match question.question_type {
                QuestionTypeTag::Mc => QuestionKind::MultipleChoice {
                    options: build_options(question.options)?,
                    correct_option_id: require_correct_option(
                        question.correct_option_id,
                        index,
                    )?,
                },
                QuestionTypeTag::TrueFalse => QuestionKind::TrueFalse {
                    options: build_options(question.options)?,
                    correct_option_id: require_correct_option(
                        question.correct_option_id,
                        index,
                    )?,
                },
                QuestionTypeTag::Poll => QuestionKind::Poll {
                    options: build_options(question.options)?,
                },
                QuestionTypeTag::OpenEnded => QuestionKind::OpenEnded {
                    correct_answer: question
                        .correct_answer
                        .filter(|answer| !answer.trim().is_empty())
                        .ok_or_else(|| {
                            ServiceError::InvalidInput(format!(
                                "question {index} needs an accepted answer"
                            ))
                        })?,
                },
                QuestionTypeTag::WordCloud => QuestionKind::WordCloud,
                QuestionTypeTag::Slider => {
                    let (Some(min), Some(max), Some(correct_value)) =
                        (question.min, question.max, question.correct_value)
                    else {
                        return Err(ServiceError::InvalidInput(format!(
                            "question {index} needs min, max and a target value"
                        )));
                    };
                    QuestionKind::Slider {
                        min,
                        max,
                        step: question.step.unwrap_or(1.0),
                        correct_value,
                    }
                }
            };

            if let (QuestionKind::MultipleChoice {
                options,
                correct_option_id,
            }
            | QuestionKind::TrueFalse {
                options,
                correct_option_id,
            }) = &kind
            {
                if !options.iter().any(|option| option.id == *correct_option_id) {
                    return Err(ServiceError::InvalidInput(format!(
                        "question {index}: winning option `{correct_option_id}` is not among the options"
                    )));
                }
            }

            Ok(Question {
                id: index as u32,
                text: question.text,
                time_limit_secs,
                kind,
            })
        })
        .collect::<Result<Vec<Question>, ServiceError>>()?;

    Ok(Quiz {
        id: Uuid::new_v4(),
        title,
        description,
        cover_image_url,
        questions,
        created_at: SystemTime::now(),
    })
}

fn require_correct_option(
    correct_option_id: Option<String>,
    index: usize,
) -> Result<String, ServiceError> {
    correct_option_id.ok_or_else(|| {
        ServiceError::InvalidInput(format!("question {index} needs a winning option id"))
    })
}

fn build_options(options: Vec<OptionInput>) -> Result<Vec<AnswerOption>, ServiceError> {
    if options.len() < 2 {
        return Err(ServiceError::InvalidInput(
            "choice questions need at least two options".into(),
        ));
    }

    options
        .into_iter()
        .map(|option| {
            let color = option.color.parse::<OptionColor>().map_err(|_| {
                ServiceError::InvalidInput(format!(
                    "unknown option color `{}` (expected red, blue, green or yellow)",
                    option.color
                ))
            })?;
            Ok(AnswerOption {
                id: option.id,
                color,
                text: option.text,
            })
        })
        .collect()
}
