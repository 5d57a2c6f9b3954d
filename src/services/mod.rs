//! Service layer: game orchestration, grading and transport plumbing.

/// OpenAPI documentation generation.
pub mod documentation;
/// Host-side game orchestration.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Roster management: registration and kicks.
pub mod lobby_service;
/// Player WebSocket connection handling.
pub mod peer_service;
/// Quiz dashboard operations.
pub mod quiz_service;
/// Leaderboard derivation.
pub mod ranking;
/// Per-round countdown task.
pub mod round_timer;
/// Vote grading at reveal time.
pub mod scoring;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
