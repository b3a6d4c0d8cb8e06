use async_trait::async_trait;

use crate::matching::MatchCandidate;
use crate::storage::types::{Job, JobId, NewJob, Skill, SkillId, UserId};

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("User not found: {0}")]
    UserEmailNotFound(String),

    #[error("Skill not found: {0}")]
    SkillNotFound(SkillId),

    #[error("Job not found: {0}")]
    JobNotFound(JobId),

    #[error("Email already exists: {0}")]
    DuplicateEmail(String),

    #[error("Skill already exists: {0}")]
    DuplicateSkill(String),

    #[error("skills not found: {0:?}")]
    MissingSkills(Vec<SkillId>),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Storage backend for the skill catalogue
#[async_trait]
pub trait SkillStore: Send + Sync {
    /// Create a skill; names are unique
    async fn create_skill(&self, name: &str) -> StorageResult<Skill>;

    /// All skills ordered by name
    async fn list_skills(&self) -> StorageResult<Vec<Skill>>;

    async fn get_skill(&self, id: SkillId) -> StorageResult<Skill>;
}

/// Storage backend for jobs and their required skills
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Create a job for `company_id` together with its required skills.
    /// Nothing is written when any skill id is unknown.
    async fn create_job(&self, company_id: UserId, job: NewJob) -> StorageResult<Job>;

    async fn get_job(&self, id: JobId) -> StorageResult<Job>;

    /// Required skills of a job ordered by name
    async fn job_skills(&self, job_id: JobId) -> StorageResult<Vec<Skill>>;

    /// Users eligible for a job, newest first.
    ///
    /// Excludes the posting company. When the job requires skills, only users
    /// holding at least one of them are returned.
    async fn match_candidates(&self, job: &Job) -> StorageResult<Vec<MatchCandidate>>;
}
