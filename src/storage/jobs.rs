use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::collections::{BTreeSet, HashMap};

use super::traits::{JobStore, StorageError, StorageResult};
use super::types::{Job, JobId, NewJob, Skill, SkillId, UserId};
use crate::matching::{GeoPoint, MatchCandidate};

/// Ids of the users eligible for a job: everyone but the company (`?1`) and,
/// when the job (`?2`) requires skills, only holders of at least one of them
const CANDIDATE_IDS: &str = r#"
    SELECT u.id
    FROM users u
    WHERE u.id != ?1
      AND (
        NOT EXISTS (SELECT 1 FROM job_skills WHERE job_id = ?2)
        OR EXISTS (
            SELECT 1
            FROM user_skills us
            JOIN job_skills js ON js.skill_id = us.skill_id
            WHERE us.user_id = u.id AND js.job_id = ?2
        )
      )
"#;

/// SQLite implementation of JobStore
pub struct SqliteJobStore {
    pool: SqlitePool,
}

impl SqliteJobStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize database schema for jobs and job skills
    pub async fn initialize(&self) -> StorageResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS jobs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title VARCHAR(120) NOT NULL,
                description VARCHAR(1024) NOT NULL,
                company_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                latitude REAL,
                longitude REAL,
                created_at TIMESTAMP NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS job_skills (
                job_id INTEGER NOT NULL REFERENCES jobs(id) ON DELETE CASCADE,
                skill_id INTEGER NOT NULL REFERENCES skills(id) ON DELETE CASCADE,
                PRIMARY KEY (job_id, skill_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_jobs_company ON jobs(company_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

fn json_id_list(ids: &BTreeSet<SkillId>) -> String {
    let items: Vec<String> = ids.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join(","))
}

fn job_from_row(row: &SqliteRow) -> Job {
    Job {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        company_id: row.get("company_id"),
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl JobStore for SqliteJobStore {
    async fn create_job(&self, company_id: UserId, job: NewJob) -> StorageResult<Job> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT id FROM users WHERE id = ?")
            .bind(company_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StorageError::UserNotFound(company_id))?;

        let requested: BTreeSet<SkillId> = job.skill_ids.iter().copied().collect();
        if !requested.is_empty() {
            // One JSON array bind, whatever the number of ids
            let missing: Vec<SkillId> = sqlx::query(
                r#"
                SELECT j.value AS id
                FROM json_each(?) j
                LEFT JOIN skills s ON s.id = j.value
                WHERE s.id IS NULL
                ORDER BY j.value
                "#,
            )
            .bind(json_id_list(&requested))
            .fetch_all(&mut *tx)
            .await?
            .iter()
            .map(|row| row.get::<SkillId, _>("id"))
            .collect();

            if !missing.is_empty() {
                // Dropping the transaction rolls it back
                return Err(StorageError::MissingSkills(missing));
            }
        }

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO jobs (title, description, company_id, latitude, longitude, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&job.title)
        .bind(&job.description)
        .bind(company_id)
        .bind(job.latitude)
        .bind(job.longitude)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        let job_id = result.last_insert_rowid();

        for skill_id in &requested {
            sqlx::query("INSERT INTO job_skills (job_id, skill_id) VALUES (?, ?)")
                .bind(job_id)
                .bind(*skill_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(Job {
            id: job_id,
            title: job.title,
            description: job.description,
            company_id,
            latitude: job.latitude,
            longitude: job.longitude,
            created_at: now,
        })
    }

    async fn get_job(&self, id: JobId) -> StorageResult<Job> {
        let row = sqlx::query(
            r#"
            SELECT id, title, description, company_id, latitude, longitude, created_at
            FROM jobs
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::JobNotFound(id))?;

        Ok(job_from_row(&row))
    }

    async fn job_skills(&self, job_id: JobId) -> StorageResult<Vec<Skill>> {
        let rows = sqlx::query(
            r#"
            SELECT s.id, s.name
            FROM skills s
            JOIN job_skills js ON js.skill_id = s.id
            WHERE js.job_id = ?
            ORDER BY s.name ASC
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Skill {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }

    async fn match_candidates(&self, job: &Job) -> StorageResult<Vec<MatchCandidate>> {
        let rows = sqlx::query(&format!(
            r#"
            WITH candidates AS ({CANDIDATE_IDS})
            SELECT u.id, u.name, u.created_at, a.latitude, a.longitude
            FROM users u
            JOIN candidates c ON c.id = u.id
            LEFT JOIN addresses a ON a.user_id = u.id
            ORDER BY u.created_at DESC, u.id DESC
            "#
        ))
        .bind(job.company_id)
        .bind(job.id)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        // Same filter again, so the statement size does not grow with the candidates
        let skill_rows = sqlx::query(&format!(
            r#"
            WITH candidates AS ({CANDIDATE_IDS})
            SELECT us.user_id, us.skill_id
            FROM user_skills us
            JOIN candidates c ON c.id = us.user_id
            "#
        ))
        .bind(job.company_id)
        .bind(job.id)
        .fetch_all(&self.pool)
        .await?;

        let mut skills_by_user: HashMap<UserId, Vec<SkillId>> = HashMap::new();
        for row in skill_rows {
            skills_by_user
                .entry(row.get("user_id"))
                .or_default()
                .push(row.get("skill_id"));
        }

        Ok(rows
            .iter()
            .map(|row| {
                let user_id: UserId = row.get("id");
                let latitude: Option<f64> = row.get("latitude");
                let longitude: Option<f64> = row.get("longitude");
                MatchCandidate {
                    user_id,
                    name: row.get("name"),
                    created_at: row.get("created_at"),
                    skill_ids: skills_by_user.remove(&user_id).unwrap_or_default(),
                    location: latitude.zip(longitude).map(|(lat, lng)| GeoPoint::new(lat, lng)),
                }
            })
            .collect())
    }
}
