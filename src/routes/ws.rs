//! Player WebSocket endpoint.

use axum::{
    Router,
    extract::{Query, State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;

use crate::{services::peer_service, state::SharedState};

#[derive(Debug, Deserialize)]
/// Query parameters accepted by the WebSocket endpoint.
pub struct JoinQuery {
    /// Join code from a shared URL, checked against the hosted game.
    pub join: Option<String>,
}

#[utoipa::path(
    get,
    path = "/ws",
    responses((status = 101, description = "Switching protocols to WebSocket"))
)]
/// Upgrade the HTTP connection into a player game channel.
pub async fn ws_handler(
    State(state): State<SharedState>,
    Query(query): Query<JoinQuery>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let shared_state = state.clone();
    ws.on_upgrade(move |socket| peer_service::handle_socket(shared_state, socket, query.join))
}

/// Configure the WebSocket endpoint.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/ws", get(ws_handler))
}
