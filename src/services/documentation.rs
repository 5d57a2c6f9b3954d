//! Aggregated OpenAPI specification.

use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Qwiz Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::event_stream,
        crate::routes::ws::ws_handler,
        crate::routes::game::create_game,
        crate::routes::game::get_game,
        crate::routes::game::close_game,
        crate::routes::game::start_game,
        crate::routes::game::reveal_round,
        crate::routes::game::next_question,
        crate::routes::game::kick_player,
        crate::routes::quiz::save_quiz,
        crate::routes::quiz::list_quizzes,
        crate::routes::quiz::delete_quiz,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::phase::VisibleGamePhase,
            crate::dto::wire::PlayerMessage,
            crate::dto::wire::HostMessage,
            crate::dto::wire::Badge,
            crate::dto::wire::PowerUpKind,
            crate::dto::wire::RoundStats,
            crate::dto::wire::QuestionBroadcast,
            crate::dto::game::GameSummary,
            crate::dto::game::PlayerSummary,
            crate::dto::game::LeaderboardEntry,
            crate::dto::quiz::CreateGameRequest,
            crate::dto::quiz::QuizInput,
            crate::dto::quiz::QuestionInput,
            crate::dto::quiz::QuizDocument,
            crate::dto::quiz::QuestionDetail,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "game", description = "Host control over the round lifecycle"),
        (name = "quizzes", description = "Stored quiz management"),
        (name = "sse", description = "Server-sent events stream"),
        (name = "players", description = "WebSocket operations for player devices"),
    )
)]
pub struct ApiDoc;
