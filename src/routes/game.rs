//! Host control endpoints driving the round lifecycle.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{game::GameSummary, quiz::CreateGameRequest},
    error::AppError,
    services::{game_service, lobby_service},
    state::SharedState,
};

/// Routes handling the hosted game lifecycle.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/game", post(create_game).get(get_game).delete(close_game))
        .route("/game/start", post(start_game))
        .route("/game/reveal", post(reveal_round))
        .route("/game/next", post(next_question))
        .route("/game/players/{id}/kick", post(kick_player))
}

/// Host a new game from a quiz definition and open the lobby.
#[utoipa::path(
    post,
    path = "/game",
    tag = "game",
    request_body = CreateGameRequest,
    responses(
        (status = 200, description = "Game hosted, lobby open", body = GameSummary),
        (status = 409, description = "Another game is already hosted")
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    Json(payload): Json<CreateGameRequest>,
) -> Result<Json<GameSummary>, AppError> {
    payload.validate()?;
    let summary = game_service::create_game(&state, payload).await?;
    Ok(Json(summary))
}

/// Summary of the hosted game.
#[utoipa::path(
    get,
    path = "/game",
    tag = "game",
    responses(
        (status = 200, description = "Current game summary", body = GameSummary),
        (status = 404, description = "No game is hosted")
    )
)]
pub async fn get_game(State(state): State<SharedState>) -> Result<Json<GameSummary>, AppError> {
    let summary = game_service::current_summary(&state).await?;
    Ok(Json(summary))
}

/// Tear down the hosted game.
#[utoipa::path(
    delete,
    path = "/game",
    tag = "game",
    responses((status = 204, description = "Game closed"))
)]
pub async fn close_game(State(state): State<SharedState>) -> Result<(), AppError> {
    game_service::close_game(&state).await?;
    Ok(())
}

/// Start the quiz with the players currently in the lobby.
#[utoipa::path(
    post,
    path = "/game/start",
    tag = "game",
    responses(
        (status = 204, description = "First round started"),
        (status = 409, description = "Not in the lobby, or no player joined")
    )
)]
pub async fn start_game(State(state): State<SharedState>) -> Result<(), AppError> {
    game_service::start_game(&state).await?;
    Ok(())
}

/// Force the reveal of the active round before the countdown expires.
#[utoipa::path(
    post,
    path = "/game/reveal",
    tag = "game",
    responses(
        (status = 204, description = "Round revealed and graded"),
        (status = 409, description = "No round is live")
    )
)]
pub async fn reveal_round(State(state): State<SharedState>) -> Result<(), AppError> {
    game_service::reveal_round(&state, None).await?;
    Ok(())
}

/// Advance to the next question, or finish after the last one.
#[utoipa::path(
    post,
    path = "/game/next",
    tag = "game",
    responses(
        (status = 204, description = "Next round started or game finished"),
        (status = 409, description = "No revealed round to advance from")
    )
)]
pub async fn next_question(State(state): State<SharedState>) -> Result<(), AppError> {
    game_service::next_question(&state).await?;
    Ok(())
}

/// Remove a player from the game.
#[utoipa::path(
    post,
    path = "/game/players/{id}/kick",
    tag = "game",
    params(("id" = Uuid, Path, description = "Channel id of the player to remove")),
    responses(
        (status = 204, description = "Player kicked"),
        (status = 404, description = "Unknown player")
    )
)]
pub async fn kick_player(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<(), AppError> {
    lobby_service::kick_player(&state, id).await?;
    Ok(())
}
