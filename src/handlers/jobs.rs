use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::AuthenticatedUser;
use crate::handlers::{ApiError, JobDetail};
use crate::matching::{list_job_matches, JobMatch, Page};
use crate::state::ServerState;
use crate::storage::{Job, JobId, NewJob, SkillId, StorageError, UserId};
use crate::validation::{self, ValidationError, JOB_DESCRIPTION_LEN, JOB_TITLE_LEN};

/// Query params for job creation
#[derive(Debug, Deserialize)]
pub struct CreateJobParams {
    /// Id of the company posting the job
    pub empresa_id: Option<UserId>,
}

/// Job payload
#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub skill_ids: Vec<SkillId>,
}

impl CreateJobRequest {
    fn validate(self) -> Result<NewJob, ValidationError> {
        Ok(NewJob {
            title: validation::text_field("title", &self.title, JOB_TITLE_LEN)?,
            description: validation::text_field(
                "description",
                &self.description,
                JOB_DESCRIPTION_LEN,
            )?,
            latitude: validation::latitude(self.latitude)?,
            longitude: validation::longitude(self.longitude)?,
            skill_ids: self.skill_ids,
        })
    }
}

/// Query params for the match listing
#[derive(Debug, Deserialize)]
pub struct MatchesQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

async fn job_detail(state: &ServerState, job: Job) -> Result<JobDetail, ApiError> {
    let skills = state.job_store.job_skills(job.id).await?;
    let company = state.user_store.get_profile(job.company_id).await?;
    Ok(JobDetail::new(job, skills, company))
}

/// Load a job the caller owns
async fn owned_job(
    state: &ServerState,
    caller: &AuthenticatedUser,
    job_id: JobId,
) -> Result<Job, ApiError> {
    let job = state.job_store.get_job(job_id).await?;
    if job.company_id != caller.user_id {
        warn!(
            "User {} denied access to job {} of company {}",
            caller.user_id, job.id, job.company_id
        );
        return Err(ApiError::forbidden_for_company());
    }
    Ok(job)
}

/// Post a job on behalf of the caller's company
pub async fn create_job(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Query(params): Query<CreateJobParams>,
    Json(request): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobDetail>), ApiError> {
    let company_id = params
        .empresa_id
        .ok_or_else(|| ValidationError::new("empresa_id", "field required"))?;
    if company_id != caller.user_id {
        warn!(
            "User {} attempted to post a job for company {}",
            caller.user_id, company_id
        );
        return Err(ApiError::forbidden_for_company());
    }

    let new_job = request.validate()?;
    let job = match state.job_store.create_job(company_id, new_job).await {
        Ok(job) => job,
        Err(StorageError::UserNotFound(_)) => {
            return Err(ApiError::not_found("company not found", "COMPANY_NOT_FOUND"))
        }
        Err(e) => return Err(e.into()),
    };

    info!("Job {} created by company {}", job.id, company_id);
    Ok((StatusCode::CREATED, Json(job_detail(&state, job).await?)))
}

pub async fn get_job(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(job_id): Path<JobId>,
) -> Result<Json<JobDetail>, ApiError> {
    let job = owned_job(&state, &caller, job_id).await?;
    Ok(Json(job_detail(&state, job).await?))
}

/// Ranked workers for a job, paginated with `limit`/`offset`
pub async fn job_matches(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(job_id): Path<JobId>,
    Query(query): Query<MatchesQuery>,
) -> Result<Json<Vec<JobMatch>>, ApiError> {
    let page = Page::new(query.limit, query.offset)?;
    let job = owned_job(&state, &caller, job_id).await?;

    let matches = list_job_matches(state.job_store.as_ref(), &job, page).await?;
    Ok(Json(matches))
}
