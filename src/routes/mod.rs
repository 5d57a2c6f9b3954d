//! HTTP surface: host control, quiz dashboard, player WebSocket and SSE.

use axum::Router;

use crate::state::SharedState;

pub mod docs;
pub mod game;
pub mod health;
pub mod quiz;
pub mod sse;
pub mod ws;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(ws::router())
        .merge(game::router())
        .merge(quiz::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
