use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::storage::{Address, Job, JobId, Skill, UserId, UserProfile};

/// Public view of a user; never exposes the password hash
#[derive(Debug, Clone, Serialize)]
pub struct UserRead {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub address: Option<Address>,
    pub skills: Vec<Skill>,
}

impl From<UserProfile> for UserRead {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.user.id,
            name: profile.user.name,
            email: profile.user.email,
            created_at: profile.user.created_at,
            address: profile.address,
            skills: profile.skills,
        }
    }
}

/// Job with its required skills and the posting company
#[derive(Debug, Clone, Serialize)]
pub struct JobDetail {
    pub id: JobId,
    pub title: String,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub company_id: UserId,
    pub created_at: DateTime<Utc>,
    pub skills: Vec<Skill>,
    pub company: UserRead,
}

impl JobDetail {
    pub fn new(job: Job, skills: Vec<Skill>, company: UserProfile) -> Self {
        Self {
            id: job.id,
            title: job.title,
            description: job.description,
            latitude: job.latitude,
            longitude: job.longitude,
            company_id: job.company_id,
            created_at: job.created_at,
            skills,
            company: company.into(),
        }
    }
}
