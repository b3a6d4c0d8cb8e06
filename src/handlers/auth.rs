use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::{hash_password, verify_against_decoy, verify_password, AuthenticatedUser};
use crate::handlers::{ApiError, UserRead};
use crate::state::ServerState;
use crate::storage::{NewUser, StorageError, UserProfile};
use crate::validation::{self, USER_NAME_LEN};

/// Signup request
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in_seconds: u64,
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("invalid credentials".to_string())
}

/// Create an account
pub async fn signup(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<UserRead>), ApiError> {
    let name = validation::text_field("name", &request.name, USER_NAME_LEN)?;
    let email = validation::email(&request.email)?;
    validation::password(&request.password)?;

    let password_hash = hash_password(&request.password)?;
    let user = state
        .user_store
        .create_user(NewUser {
            name,
            email,
            password_hash,
        })
        .await?;

    info!("New user registered: {} (id {})", user.email, user.id);

    let profile = UserProfile {
        user,
        address: None,
        skills: Vec::new(),
    };
    Ok((StatusCode::CREATED, Json(profile.into())))
}

/// Exchange email and password for a bearer token
pub async fn login(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = validation::email(&request.email)?;
    validation::password(&request.password)?;

    let user = match state.user_store.get_user_by_email(&email).await {
        Ok(user) => user,
        Err(StorageError::UserEmailNotFound(_)) => {
            verify_against_decoy(&request.password);
            warn!("Login attempt for unknown user: {}", email);
            return Err(invalid_credentials());
        }
        Err(e) => return Err(e.into()),
    };

    if !verify_password(&request.password, &user.password_hash)? {
        warn!("Invalid password for user: {}", email);
        return Err(invalid_credentials());
    }

    let (token, _expires_at) = state.auth_state.session_manager.create_session(user.id);
    info!("User {} logged in successfully", user.email);

    Ok(Json(LoginResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        expires_in_seconds: state.auth_state.session_manager.timeout_seconds(),
    }))
}

/// Profile of the authenticated caller
pub async fn current_session(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Result<Json<UserRead>, ApiError> {
    let profile = match state.user_store.get_profile(caller.user_id).await {
        Ok(profile) => profile,
        // Session outlived its account
        Err(StorageError::UserNotFound(_)) => {
            state.auth_state.session_manager.revoke_session(&caller.token);
            return Err(ApiError::Unauthorized(
                "invalid authentication credentials".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Json(profile.into()))
}

/// Revoke the token used for this request
pub async fn logout(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> StatusCode {
    state.auth_state.session_manager.revoke_session(&caller.token);
    info!("User {} logged out (session {})", caller.user_id, caller.session_id);
    StatusCode::NO_CONTENT
}
