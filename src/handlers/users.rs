use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::AuthenticatedUser;
use crate::handlers::{ApiError, UserRead};
use crate::state::ServerState;
use crate::storage::{Address, NewAddress, SkillId, UserId};
use crate::validation::{self, ValidationError, CITY_LEN, STATE_LEN, STREET_LEN, ZIP_CODE_LEN};

/// Address payload; coordinates are required for addresses
#[derive(Debug, Deserialize)]
pub struct AddressRequest {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl AddressRequest {
    fn validate(self) -> Result<NewAddress, ValidationError> {
        let (latitude, longitude) = validation::required_coordinates(self.latitude, self.longitude)?;
        Ok(NewAddress {
            street: validation::text_field("street", &self.street, STREET_LEN)?,
            city: validation::text_field("city", &self.city, CITY_LEN)?,
            state: validation::text_field("state", &self.state, STATE_LEN)?,
            zip_code: validation::text_field("zip_code", &self.zip_code, ZIP_CODE_LEN)?,
            latitude,
            longitude,
        })
    }
}

/// The target user must exist and be the caller
async fn ensure_self(
    state: &ServerState,
    caller: &AuthenticatedUser,
    user_id: UserId,
) -> Result<(), ApiError> {
    state.user_store.get_user(user_id).await?;
    if caller.user_id != user_id {
        warn!(
            "User {} attempted to modify user {}",
            caller.user_id, user_id
        );
        return Err(ApiError::Forbidden(
            "operation not permitted for this user".to_string(),
        ));
    }
    Ok(())
}

/// Set or replace a user's address
pub async fn upsert_address(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(user_id): Path<UserId>,
    Json(request): Json<AddressRequest>,
) -> Result<Json<Address>, ApiError> {
    let address = request.validate()?;
    ensure_self(&state, &caller, user_id).await?;

    let address = state.user_store.upsert_address(user_id, address).await?;
    info!("Address updated for user {}", user_id);
    Ok(Json(address))
}

/// Register a skill for a user
pub async fn attach_skill(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path((user_id, skill_id)): Path<(UserId, SkillId)>,
) -> Result<Json<UserRead>, ApiError> {
    ensure_self(&state, &caller, user_id).await?;

    state.user_store.attach_skill(user_id, skill_id).await?;
    let profile = state.user_store.get_profile(user_id).await?;
    Ok(Json(profile.into()))
}
