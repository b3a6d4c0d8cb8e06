use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{auth_middleware, login_rate_limit};
use crate::handlers::{
    attach_skill, create_job, create_skill, current_session, get_job, health_check, job_matches,
    list_skills, login, logout, signup, upsert_address,
};
use crate::state::ServerState;

/// Request bodies are small JSON documents
const MAX_API_BODY_SIZE: usize = 1024 * 1024;

/// Build the application router with all routes and middleware
pub fn build_router(state: Arc<ServerState>) -> Router {
    let login_route = Router::new()
        .route("/auth/login", post(login))
        .layer(middleware::from_fn_with_state(
            state.auth_state.clone(),
            login_rate_limit,
        ));

    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/auth/signup", post(signup))
        .route("/skills", get(list_skills).post(create_skill))
        .merge(login_route);

    let protected_routes = Router::new()
        .route("/auth/session", get(current_session))
        .route("/auth/logout", post(logout))
        .route("/users/{user_id}/address", post(upsert_address))
        .route("/users/{user_id}/skills/{skill_id}", post(attach_skill))
        .route("/jobs", post(create_job))
        .route("/jobs/{job_id}", get(get_job))
        .route("/jobs/{job_id}/matches", get(job_matches))
        .layer(middleware::from_fn_with_state(
            state.auth_state.clone(),
            auth_middleware,
        ));

    let cors_origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(cors_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(RequestBodyLimitLayer::new(MAX_API_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
