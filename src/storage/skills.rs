use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use super::traits::{SkillStore, StorageError, StorageResult};
use super::types::{Skill, SkillId};

/// SQLite implementation of SkillStore
pub struct SqliteSkillStore {
    pool: SqlitePool,
}

impl SqliteSkillStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn initialize(&self) -> StorageResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS skills (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(80) UNIQUE NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl SkillStore for SqliteSkillStore {
    async fn create_skill(&self, name: &str) -> StorageResult<Skill> {
        let result = sqlx::query("INSERT INTO skills (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| match e.as_database_error() {
                Some(db_err) if db_err.is_unique_violation() => {
                    StorageError::DuplicateSkill(name.to_string())
                }
                _ => StorageError::Database(e),
            })?;

        Ok(Skill {
            id: result.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    async fn list_skills(&self) -> StorageResult<Vec<Skill>> {
        let rows = sqlx::query("SELECT id, name FROM skills ORDER BY name ASC")
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

    async fn get_skill(&self, id: SkillId) -> StorageResult<Skill> {
        let row = sqlx::query("SELECT id, name FROM skills WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::SkillNotFound(id))?;

        Ok(Skill {
            id: row.get("id"),
            name: row.get("name"),
        })
    }
}
