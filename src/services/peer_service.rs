//! Lifecycle of an individual player WebSocket connection.
//!
//! The socket is bridged onto a typed peer channel: a dedicated writer task
//! serializes outbound [`HostMessage`]s, while the read loop parses inbound
//! frames and feeds them to [`handle_player_message`]. All protocol handling
//! lives in that function, so tests can drive it without a socket.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dto::wire::{HostMessage, PlayerMessage},
    error::ServiceError,
    services::{lobby_service, sse_events},
    state::{
        SharedState,
        game::epoch_ms,
        peers::PeerConnection,
        state_machine::GamePhase,
    },
};

/// How long a fresh connection may stay silent before it must have joined.
const JOIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Handle the full lifecycle for an individual player WebSocket connection.
///
/// `join_code` carries the code from the join URL when the client passed
/// one; a mismatch against the hosted game is rejected before registration.
pub async fn handle_socket(state: SharedState, socket: WebSocket, join_code: Option<String>) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<HostMessage>();

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            let payload = match serde_json::to_string(&message) {
                Ok(payload) => payload,
                Err(err) => {
                    warn!(error = %err, "failed to serialize host message");
                    continue;
                }
            };
            if sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    if let Some(code) = join_code {
        let matches = state
            .read_session(|maybe| {
                maybe.is_some_and(|session| session.join_code.eq_ignore_ascii_case(&code))
            })
            .await;
        if !matches {
            warn!(code = %code, "join code does not match the hosted game");
            finalize(writer_task, outbound_tx).await;
            return;
        }
    }

    let initial_message = match tokio::time::timeout(JOIN_TIMEOUT, receiver.next()).await {
        Ok(Some(Ok(Message::Text(text)))) => text,
        Ok(Some(Ok(Message::Close(_)))) | Ok(None) => {
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Ok(Some(Ok(_))) => {
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Ok(Some(Err(err))) => {
            warn!(error = %err, "websocket receive error");
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Err(_) => {
            warn!("websocket join timed out");
            finalize(writer_task, outbound_tx).await;
            return;
        }
    };

    let inbound = match serde_json::from_str::<PlayerMessage>(&initial_message) {
        Ok(message) => message,
        Err(err) => {
            warn!(error = %err, "failed to parse player message");
            finalize(writer_task, outbound_tx).await;
            return;
        }
    };

    let PlayerMessage::Join {
        name,
        avatar,
        theme,
    } = inbound
    else {
        warn!("first message was not a join");
        finalize(writer_task, outbound_tx).await;
        return;
    };

    // Opaque random channel id; doubles as the player id in the roster.
    let peer_id = Uuid::new_v4();

    state.peers().insert(PeerConnection {
        id: peer_id,
        tx: outbound_tx.clone(),
    });

    match lobby_service::register_player(&state, peer_id, name, avatar, theme).await {
        Ok(player) => {
            info!(peer = %peer_id, name = %player.name, "player joined");
        }
        Err(err) => {
            warn!(peer = %peer_id, error = %err, "registration rejected");
            state.peers().remove(&peer_id);
            finalize(writer_task, outbound_tx).await;
            return;
        }
    }

    let game_id = state
        .read_session(|maybe| maybe.map(|session| session.join_code.clone()))
        .await
        .unwrap_or_default();
    let _ = outbound_tx.send(HostMessage::Welcome { game_id });

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<PlayerMessage>(&text) {
                Ok(inbound) => {
                    if let Err(err) = handle_player_message(&state, peer_id, inbound).await {
                        warn!(peer = %peer_id, error = %err, "failed to handle player message");
                    }
                }
                Err(err) => {
                    warn!(peer = %peer_id, error = %err, "failed to parse player message");
                }
            },
            Ok(Message::Ping(_)) => {
                // Axum answers pings at the protocol level.
            }
            Ok(Message::Close(_)) => {
                info!(peer = %peer_id, "player closed the connection");
                break;
            }
            Ok(Message::Binary(_)) => {}
            Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(peer = %peer_id, error = %err, "websocket error");
                break;
            }
        }
    }

    // The channel is gone; the roster entry stays so the player keeps their
    // place in scoring and ranking until the game ends.
    state.peers().remove(&peer_id);
    info!(peer = %peer_id, "player disconnected");

    finalize(writer_task, outbound_tx).await;
}

/// Apply one inbound protocol message from a registered peer.
pub async fn handle_player_message(
    state: &SharedState,
    peer_id: Uuid,
    message: PlayerMessage,
) -> Result<(), ServiceError> {
    match message {
        PlayerMessage::Join {
            name,
            avatar,
            theme,
        } => {
            // Duplicate registration: last write wins, by design.
            lobby_service::register_player(state, peer_id, name, avatar, theme).await?;
            Ok(())
        }
        PlayerMessage::Vote { answer } => {
            // Votes only count while the round is live. Anything arriving
            // outside the playing phase (including between the grading
            // snapshot and the reveal broadcast) is dropped silently.
            if state.phase().await != GamePhase::Playing {
                return Ok(());
            }

            let recorded = state
                .with_session_mut(|session| {
                    let recorded = session.record_vote(peer_id, answer, epoch_ms());
                    Ok(recorded.then(|| (session.vote_count(), session.roster.len())))
                })
                .await?;

            if let Some((vote_count, player_count)) = recorded {
                sse_events::broadcast_vote_received(state, peer_id, vote_count, player_count);
            }
            Ok(())
        }
        PlayerMessage::Reaction { emoji } => {
            sse_events::broadcast_reaction(state, peer_id, emoji);
            Ok(())
        }
        PlayerMessage::UsePowerUp { power_up } => {
            // Declared in the protocol but not consulted by scoring.
            info!(peer = %peer_id, power_up = ?power_up, "power-up ignored");
            Ok(())
        }
        PlayerMessage::Unknown => {
            warn!(peer = %peer_id, "ignoring unknown message type");
            Ok(())
        }
    }
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<HostMessage>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
