//! Full game flows driven through in-memory peer channels.

use std::{sync::Arc, time::Duration};

use tokio::sync::mpsc;
use uuid::Uuid;

use qwiz_back::{
    config::AppConfig,
    dao::quiz_store::memory::MemoryQuizStore,
    dto::{
        quiz::{CreateGameRequest, OptionInput, QuestionInput, QuizInput},
        wire::{Badge, HostMessage, PlayerMessage, QuestionTypeTag},
    },
    services::{game_service, peer_service},
    state::{
        AppState, SharedState,
        game::AnswerValue,
        peers::PeerConnection,
        state_machine::GamePhase,
    },
};

fn option(id: &str, color: &str, text: &str) -> OptionInput {
    OptionInput {
        id: id.into(),
        color: color.into(),
        text: text.into(),
    }
}

fn mc_question(time_limit: Option<u64>) -> QuestionInput {
    QuestionInput {
        question_type: QuestionTypeTag::Mc,
        text: "Pick the right one".into(),
        time_limit,
        options: vec![option("opt1", "red", "Right"), option("opt2", "blue", "Wrong")],
        correct_option_id: Some("opt1".into()),
        correct_answer: None,
        min: None,
        max: None,
        step: None,
        correct_value: None,
    }
}

fn slider_question() -> QuestionInput {
    QuestionInput {
        question_type: QuestionTypeTag::Slider,
        text: "Guess the number".into(),
        time_limit: Some(20),
        options: vec![],
        correct_option_id: None,
        correct_answer: None,
        min: Some(0.0),
        max: Some(100.0),
        step: Some(1.0),
        correct_value: Some(50.0),
    }
}

fn request_with(questions: Vec<QuestionInput>) -> CreateGameRequest {
    CreateGameRequest {
        quiz: QuizInput {
            title: "Integration quiz".into(),
            description: None,
            cover_image_url: None,
            questions,
        },
    }
}

/// Connect a fake peer and register it as a player, returning its channel id
/// and the receiving end of its message stream.
async fn join_player(
    state: &SharedState,
    name: &str,
) -> (Uuid, mpsc::UnboundedReceiver<HostMessage>) {
    let peer_id = Uuid::new_v4();
    let (tx, rx) = mpsc::unbounded_channel();
    state.peers().insert(PeerConnection { id: peer_id, tx });

    peer_service::handle_player_message(
        state,
        peer_id,
        PlayerMessage::Join {
            name: name.into(),
            avatar: "🦊".into(),
            theme: "indigo".into(),
        },
    )
    .await
    .expect("join should succeed");

    (peer_id, rx)
}

async fn vote(state: &SharedState, peer_id: Uuid, answer: AnswerValue) {
    peer_service::handle_player_message(state, peer_id, PlayerMessage::Vote { answer })
        .await
        .expect("vote should be handled");
}

fn next_message(rx: &mut mpsc::UnboundedReceiver<HostMessage>) -> HostMessage {
    rx.try_recv().expect("expected a pending message")
}

fn drain(rx: &mut mpsc::UnboundedReceiver<HostMessage>) -> Vec<HostMessage> {
    let mut messages = Vec::new();
    while let Ok(message) = rx.try_recv() {
        messages.push(message);
    }
    messages
}

#[tokio::test]
async fn full_game_runs_from_lobby_to_final_ranking() {
    let state = AppState::new(AppConfig::default());
    let store = Arc::new(MemoryQuizStore::new());
    state.install_quiz_store(store.clone()).await;

    let summary = game_service::create_game(
        &state,
        request_with(vec![mc_question(Some(20)), slider_question()]),
    )
    .await
    .unwrap();
    assert_eq!(summary.join_code.len(), 4);
    assert_eq!(state.phase().await, GamePhase::Lobby);

    // Starting an empty lobby is refused.
    assert!(game_service::start_game(&state).await.is_err());

    let (alice, mut alice_rx) = join_player(&state, "alice").await;
    let (bob, mut bob_rx) = join_player(&state, "bob").await;
    let (carol, mut carol_rx) = join_player(&state, "carol").await;

    game_service::start_game(&state).await.unwrap();
    assert_eq!(state.phase().await, GamePhase::Playing);

    for rx in [&mut alice_rx, &mut bob_rx, &mut carol_rx] {
        match next_message(rx) {
            HostMessage::GameStart {
                question,
                current_question,
                total_questions,
                ..
            } => {
                assert_eq!(current_question, 1);
                assert_eq!(total_questions, 2);
                assert_eq!(question.options.as_ref().map(Vec::len), Some(2));
            }
            other => panic!("expected GAME_START, got {other:?}"),
        }
    }

    // Drive the protocol path, then pin the receipt timestamps so the speed
    // bonus is deterministic: alice after 2 s, bob after 5 s, carol silent.
    vote(&state, alice, AnswerValue::Text("opt1".into())).await;
    vote(&state, bob, AnswerValue::Text("opt2".into())).await;
    state
        .with_session_mut(|session| {
            let start = session.question_started_at_ms;
            session.record_vote(alice, AnswerValue::Text("opt1".into()), start + 2_000);
            session.record_vote(bob, AnswerValue::Text("opt2".into()), start + 5_000);
            Ok(())
        })
        .await
        .unwrap();

    game_service::reveal_round(&state, None).await.unwrap();
    assert_eq!(state.phase().await, GamePhase::Reveal);

    match next_message(&mut alice_rx) {
        HostMessage::Result {
            score,
            correct_option_id,
            coins,
            coins_earned,
            streak,
            badges,
            rank,
            round_stats,
            ..
        } => {
            // 500 base + 450 speed + 100 streak bonus.
            assert_eq!(score, 1050);
            assert_eq!(correct_option_id.as_deref(), Some("opt1"));
            assert_eq!(coins, 250);
            assert_eq!(coins_earned, 50);
            assert_eq!(streak, 1);
            assert!(badges.contains(&Badge::SpeedDemon));
            assert!(!badges.contains(&Badge::OnFire));
            assert_eq!(rank, 1);
            assert_eq!(round_stats.total_players, 3);
            assert_eq!(round_stats.correct_count, 1);
        }
        other => panic!("expected RESULT, got {other:?}"),
    }

    match next_message(&mut bob_rx) {
        HostMessage::Result {
            score,
            coins,
            coins_earned,
            streak,
            rank,
            ..
        } => {
            assert_eq!(score, 0);
            assert_eq!(coins, 210);
            assert_eq!(coins_earned, 10);
            assert_eq!(streak, 0);
            assert_eq!(rank, 2);
        }
        other => panic!("expected RESULT, got {other:?}"),
    }

    match next_message(&mut carol_rx) {
        HostMessage::Result {
            score,
            coins_earned,
            rank,
            ..
        } => {
            // Roster players without a vote are graded as incorrect.
            assert_eq!(score, 0);
            assert_eq!(coins_earned, 10);
            assert_eq!(rank, 3);
        }
        other => panic!("expected RESULT, got {other:?}"),
    }

    // A vote arriving after the reveal belongs to no round.
    vote(&state, bob, AnswerValue::Text("opt1".into())).await;
    let pending_votes = state
        .read_session(|maybe| maybe.map(|session| session.vote_count()).unwrap_or(0))
        .await;
    assert_eq!(pending_votes, 0);

    game_service::next_question(&state).await.unwrap();
    for rx in [&mut alice_rx, &mut bob_rx, &mut carol_rx] {
        match next_message(rx) {
            HostMessage::GameStart {
                question,
                current_question,
                ..
            } => {
                assert_eq!(current_question, 2);
                assert_eq!(question.min, Some(0.0));
                assert_eq!(question.max, Some(100.0));
            }
            other => panic!("expected GAME_START, got {other:?}"),
        }
    }

    vote(&state, carol, AnswerValue::Number(50.0)).await;
    vote(&state, bob, AnswerValue::Number(60.0)).await;

    game_service::reveal_round(&state, None).await.unwrap();

    match next_message(&mut carol_rx) {
        HostMessage::Result {
            score,
            correct_value,
            streak,
            badges,
            rank,
            ..
        } => {
            // Exact guess: 1000 accuracy points + 100 streak bonus.
            assert_eq!(score, 1100);
            assert_eq!(correct_value, Some(50.0));
            assert_eq!(streak, 1);
            assert!(badges.contains(&Badge::SpeedDemon));
            assert_eq!(rank, 1);
        }
        other => panic!("expected RESULT, got {other:?}"),
    }

    match next_message(&mut bob_rx) {
        HostMessage::Result { score, rank, .. } => {
            // Accuracy 0.9 pays 900 points without the correctness badge.
            assert_eq!(score, 900);
            assert_eq!(rank, 3);
        }
        other => panic!("expected RESULT, got {other:?}"),
    }

    match next_message(&mut alice_rx) {
        HostMessage::Result { score, streak, rank, .. } => {
            assert_eq!(score, 1050);
            assert_eq!(streak, 0);
            assert_eq!(rank, 2);
        }
        other => panic!("expected RESULT, got {other:?}"),
    }

    game_service::next_question(&state).await.unwrap();
    assert_eq!(state.phase().await, GamePhase::GameOver);

    for (rx, expected_rank, expected_score) in [
        (&mut carol_rx, 1, 1100),
        (&mut alice_rx, 2, 1050),
        (&mut bob_rx, 3, 900),
    ] {
        match next_message(rx) {
            HostMessage::GameOver { rank, score } => {
                assert_eq!(rank, expected_rank);
                assert_eq!(score, expected_score);
            }
            other => panic!("expected GAME_OVER, got {other:?}"),
        }
    }

    // The result archive runs in the background.
    for _ in 0..100 {
        if !store.saved_results().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    let results = store.saved_results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].rankings.len(), 3);
    assert_eq!(results[0].rankings[0].name, "carol");
    assert_eq!(results[0].rankings[0].rank, 1);

    game_service::close_game(&state).await.unwrap();
    assert_eq!(state.phase().await, GamePhase::Idle);
    assert!(state.peers().is_empty());
}

#[tokio::test(start_paused = true)]
async fn countdown_expiry_reveals_exactly_once() {
    let state = AppState::new(AppConfig::default());

    game_service::create_game(&state, request_with(vec![mc_question(Some(2))]))
        .await
        .unwrap();
    let (alice, mut alice_rx) = join_player(&state, "alice").await;

    game_service::start_game(&state).await.unwrap();
    vote(&state, alice, AnswerValue::Text("opt1".into())).await;

    // Virtual time auto-advances; wait for the countdown to fire the reveal.
    for _ in 0..200 {
        if state.phase().await == GamePhase::Reveal {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(state.phase().await, GamePhase::Reveal);

    // Let any stray timer fire; the round must still be graded exactly once.
    tokio::time::sleep(Duration::from_secs(5)).await;

    let messages = drain(&mut alice_rx);
    let results = messages
        .iter()
        .filter(|message| matches!(message, HostMessage::Result { .. }))
        .count();
    assert_eq!(results, 1);
}

#[tokio::test(start_paused = true)]
async fn manual_reveal_cancels_the_countdown() {
    let state = AppState::new(AppConfig::default());

    game_service::create_game(&state, request_with(vec![mc_question(Some(2))]))
        .await
        .unwrap();
    let (alice, mut alice_rx) = join_player(&state, "alice").await;

    game_service::start_game(&state).await.unwrap();
    vote(&state, alice, AnswerValue::Text("opt1".into())).await;

    game_service::reveal_round(&state, None).await.unwrap();
    assert_eq!(state.phase().await, GamePhase::Reveal);

    // Give the cancelled countdown every chance to fire anyway.
    tokio::time::sleep(Duration::from_secs(5)).await;

    let messages = drain(&mut alice_rx);
    let results = messages
        .iter()
        .filter(|message| matches!(message, HostMessage::Result { .. }))
        .count();
    assert_eq!(results, 1);
}

#[tokio::test]
async fn joining_mid_game_is_accepted_and_graded_as_silent() {
    let state = AppState::new(AppConfig::default());

    game_service::create_game(&state, request_with(vec![mc_question(Some(20))]))
        .await
        .unwrap();
    let (alice, mut alice_rx) = join_player(&state, "alice").await;

    game_service::start_game(&state).await.unwrap();
    let _ = next_message(&mut alice_rx);

    // Late joiner: accepted onto the roster mid-round.
    let (_dave, mut dave_rx) = join_player(&state, "dave").await;

    vote(&state, alice, AnswerValue::Text("opt1".into())).await;
    game_service::reveal_round(&state, None).await.unwrap();

    match next_message(&mut dave_rx) {
        HostMessage::Result {
            score, coins_earned, ..
        } => {
            assert_eq!(score, 0);
            assert_eq!(coins_earned, 10);
        }
        other => panic!("expected RESULT, got {other:?}"),
    }
}
