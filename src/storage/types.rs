use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::storage::users::User;

pub type UserId = i64;
pub type SkillId = i64;
pub type JobId = i64;

/// A named capability held by workers and required by jobs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skill {
    pub id: SkillId,
    pub name: String,
}

/// Postal address and coordinates of a user (at most one per user)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Address {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: UserId,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Validated address fields to store for a user
#[derive(Debug, Clone)]
pub struct NewAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Job posted by a company
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub description: String,
    pub company_id: UserId,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Validated job fields; `skill_ids` may contain duplicates
#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub skill_ids: Vec<SkillId>,
}

/// User with the address and skills shown in API responses
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub user: User,
    pub address: Option<Address>,
    pub skills: Vec<Skill>,
}
