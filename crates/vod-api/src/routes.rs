//! API routes.

use axum::middleware;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::categories::list_categories;
use crate::handlers::health::{health, ready};
use crate::handlers::history::{list_history, list_liked};
use crate::handlers::playlists::{
    add_video, create_playlist, delete_playlist, list_playlist_videos, list_playlists,
    remove_video, update_playlist,
};
use crate::handlers::subscriptions::{subscribe, unsubscribe};
use crate::handlers::videos::{
    create_video, delete_video, generate, get_video, list_studio, list_subscribed,
    list_trending, list_videos, register_view, toggle_reaction, update_video,
};
use crate::handlers::webhooks::media_webhook;
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, security_headers,
    RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let video_routes = Router::new()
        // Feeds first so literal segments win over :video_id
        .route("/videos", get(list_videos))
        .route("/videos/trending", get(list_trending))
        .route("/videos/subscribed", get(list_subscribed))
        .route("/videos/liked", get(list_liked))
        // Creation and single-video operations
        .route("/videos", post(create_video))
        .route("/videos/:video_id", get(get_video))
        .route("/videos/:video_id", patch(update_video))
        .route("/videos/:video_id", delete(delete_video))
        // Engagement
        .route("/videos/:video_id/views", post(register_view))
        .route("/videos/:video_id/reaction", post(toggle_reaction))
        // AI metadata generation
        .route("/videos/:video_id/generate/:kind", post(generate))
        // Creator dashboard
        .route("/studio/videos", get(list_studio));

    let playlist_routes = Router::new()
        .route("/playlists", post(create_playlist))
        .route("/playlists", get(list_playlists))
        .route("/playlists/:playlist_id", patch(update_playlist))
        .route("/playlists/:playlist_id", delete(delete_playlist))
        .route("/playlists/:playlist_id/videos", post(add_video))
        .route("/playlists/:playlist_id/videos", get(list_playlist_videos))
        .route(
            "/playlists/:playlist_id/videos/:video_id",
            delete(remove_video),
        );

    let library_routes = Router::new()
        .route("/history", get(list_history))
        .route("/subscriptions/:creator_id", post(subscribe))
        .route("/subscriptions/:creator_id", delete(unsubscribe))
        .route("/categories", get(list_categories));

    let rate_limiter = std::sync::Arc::new(RateLimiterCache::new(state.config.rate_limit_rps));

    let api_routes = Router::new()
        .merge(video_routes)
        .merge(playlist_routes)
        .merge(library_routes)
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ));

    // Signed provider callbacks, deliberately outside the rate limiter
    let webhook_routes = Router::new().route("/webhooks/media", post(media_webhook));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", api_routes)
        .merge(webhook_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
