//! Router assembly: HTTP endpoints, WebSocket upgrade, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - JSON API under `/api/v1/...`
/// - CORS (allow any origin/method/headers); the client is a local app
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // Catalog and search session
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/content", get(http::http_get_catalog))
        .route("/api/v1/content/search", post(http::http_post_search))
        .route("/api/v1/content/filters", post(http::http_post_filters))
        .route("/api/v1/content/filters/reset", post(http::http_post_reset_filters))
        .route("/api/v1/content/refresh", post(http::http_post_refresh))
        .route("/api/v1/content/trending", get(http::http_get_trending))
        .route("/api/v1/content/featured", get(http::http_get_featured))
        .route("/api/v1/content/daily-expressions", get(http::http_get_daily_expressions))
        .route("/api/v1/content/by-type", get(http::http_get_by_type))
        .route("/api/v1/content/by-language", get(http::http_get_by_language))
        .route("/api/v1/content/travel", get(http::http_get_travel))
        .route("/api/v1/content/:id", get(http::http_get_content))
        .route("/api/v1/content/:id/related", get(http::http_get_related))
        // Progression
        .route("/api/v1/content/:id/view", post(http::http_post_view))
        .route("/api/v1/content/:id/learn", post(http::http_post_learn))
        .route("/api/v1/content/:id/bookmark", post(http::http_post_bookmark))
        .route("/api/v1/content/:id/favorite", post(http::http_post_favorite))
        .route(
            "/api/v1/content/:id/download",
            post(http::http_post_download).delete(http::http_delete_download),
        )
        .route("/api/v1/content/:id/share", post(http::http_post_share))
        .route("/api/v1/content/:id/speak", post(http::http_post_speak))
        .route("/api/v1/progress", get(http::http_get_progress))
        .route("/api/v1/library", get(http::http_get_library))
        .route("/api/v1/profile", get(http::http_get_profile))
        // Gamification
        .route("/api/v1/stats", get(http::http_get_stats))
        .route("/api/v1/stats/points", get(http::http_get_points))
        .route("/api/v1/stats/login", post(http::http_post_login))
        .route("/api/v1/stats/quiz-answer", post(http::http_post_quiz_answer))
        .route("/api/v1/stats/share", post(http::http_post_share_stat))
        .route("/api/v1/stats/language", post(http::http_post_language))
        .route("/api/v1/stats/travel-mode", post(http::http_post_travel_mode))
        .route("/api/v1/stats/meme", post(http::http_post_meme))
        .route("/api/v1/achievements", get(http::http_get_achievements))
        // Daily queue
        .route("/api/v1/daily", get(http::http_get_daily))
        .route("/api/v1/daily/:id/learned", post(http::http_post_daily_learned))
        .route("/api/v1/daily/quiz", get(http::http_get_daily_quiz))
        .route("/api/v1/daily/quiz/complete", post(http::http_post_daily_quiz_complete))
        // Profile
        .route(
            "/api/v1/settings",
            get(http::http_get_settings).patch(http::http_patch_settings),
        )
        .route("/api/v1/leaderboard", get(http::http_get_leaderboard))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
