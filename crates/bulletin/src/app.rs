use std::time::Duration;

use axum::{
    http::{header, Method, StatusCode},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use bulletin_auth::route_guard;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    handlers::{
        admin::{
            cache_stats, create_event, create_news, create_promotion, delete_event, delete_news,
            delete_promotion, invalidate_cache, invalidate_sessions, put_setting,
        },
        content::{get_settings, list_events, list_news, list_promotions},
        health::{healthz, livez},
        me::me,
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let public_routes = Router::new()
        .route("/promotions", get(list_promotions))
        .route("/news", get(list_news))
        .route("/events", get(list_events))
        .route("/settings", get(get_settings));

    let admin_routes = Router::new()
        .route("/promotions", post(create_promotion))
        .route("/promotions/{id}", delete(delete_promotion))
        .route("/news", post(create_news))
        .route("/news/{id}", delete(delete_news))
        .route("/events", post(create_event))
        .route("/events/{id}", delete(delete_event))
        .route("/settings/{key}", put(put_setting))
        .route("/cache/stats", get(cache_stats))
        .route("/cache/invalidate", post(invalidate_cache))
        .route("/sessions/{user_id}", delete(invalidate_sessions));

    let api_routes = Router::new()
        .nest("/public", public_routes)
        .nest("/admin", admin_routes)
        .route("/me", get(me))
        .layer(cors);

    // The guard sees the full path, so it wraps the outer router.
    Router::new()
        .route("/livez", get(livez))
        .route("/healthz", get(healthz))
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(
            state.auth.clone(),
            route_guard,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        .with_state(state)
}
