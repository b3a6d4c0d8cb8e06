use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::handlers::ApiError;
use crate::state::ServerState;
use crate::storage::Skill;
use crate::validation::{self, SKILL_NAME_LEN};

#[derive(Debug, Deserialize)]
pub struct CreateSkillRequest {
    pub name: String,
}

pub async fn create_skill(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<CreateSkillRequest>,
) -> Result<(StatusCode, Json<Skill>), ApiError> {
    let name = validation::text_field("name", &request.name, SKILL_NAME_LEN)?;
    let skill = state.skill_store.create_skill(&name).await?;

    info!("Skill created: {} (id {})", skill.name, skill.id);
    Ok((StatusCode::CREATED, Json(skill)))
}

/// All skills ordered by name
pub async fn list_skills(State(state): State<Arc<ServerState>>) -> Result<Json<Vec<Skill>>, ApiError> {
    Ok(Json(state.skill_store.list_skills().await?))
}
