use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::auth::session::{AuthRateLimiter, SessionManager};
use crate::handlers::ApiError;
use crate::storage::UserId;

/// Authentication state shared with middleware
#[derive(Clone)]
pub struct AuthState {
    pub session_manager: SessionManager,
    pub rate_limiter: AuthRateLimiter,
}

impl AuthState {
    pub fn new(session_manager: SessionManager, rate_limiter: AuthRateLimiter) -> Self {
        Self {
            session_manager,
            rate_limiter,
        }
    }
}

/// Caller identity attached to requests that passed `auth_middleware`
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub session_id: Uuid,
    pub token: String,
}

/// Peer address, or the unspecified address when the server was not started
/// with connect info (in-process tests)
fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

fn bearer_token(request: &Request) -> Option<String> {
    let value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?
        .trim();

    // Accept both "Bearer <token>" and a raw token
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .unwrap_or(value)
        .trim();

    (!token.is_empty()).then(|| token.to_string())
}

/// Authentication middleware for protected routes
pub async fn auth_middleware(
    State(state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(&request);

    if state.rate_limiter.is_rate_limited(ip) {
        warn!("Rate limited request from {}", ip);
        return ApiError::TooManyRequests.into_response();
    }

    let Some(token) = bearer_token(&request) else {
        state.rate_limiter.record_failure(ip);
        return ApiError::Unauthorized("Missing Authorization header".to_string()).into_response();
    };

    let Some((session_id, user_id)) = state.session_manager.validate_token(&token) else {
        if state.rate_limiter.record_failure(ip) {
            warn!("IP {} is now rate limited after failed auth", ip);
        }
        return ApiError::Unauthorized("invalid authentication credentials".to_string())
            .into_response();
    };

    // Only a successful login clears the IP's failures
    request.extensions_mut().insert(AuthenticatedUser {
        user_id,
        session_id,
        token,
    });

    next.run(request).await
}

/// Failed-login throttling wrapped around the login route
pub async fn login_rate_limit(
    State(state): State<Arc<AuthState>>,
    request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(&request);

    if state.rate_limiter.is_rate_limited(ip) {
        warn!("Rate limited login attempt from {}", ip);
        return ApiError::TooManyRequests.into_response();
    }

    let response = next.run(request).await;

    match response.status() {
        StatusCode::UNAUTHORIZED => {
            if state.rate_limiter.record_failure(ip) {
                warn!("IP {} is now rate limited after failed logins", ip);
            }
        }
        status if status.is_success() => state.rate_limiter.clear(ip),
        _ => {}
    }

    response
}
