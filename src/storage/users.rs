use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::traits::{StorageError, StorageResult};
use super::types::{Address, NewAddress, Skill, SkillId, UserId, UserProfile};

/// User account; companies and workers are both users
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// User creation request (password already hashed)
#[derive(Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// User store trait
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a new user; emails are unique
    async fn create_user(&self, user: NewUser) -> StorageResult<User>;

    async fn get_user(&self, id: UserId) -> StorageResult<User>;

    async fn get_user_by_email(&self, email: &str) -> StorageResult<User>;

    /// All users, oldest first
    async fn list_users(&self) -> StorageResult<Vec<User>>;

    /// Insert or replace the single address of a user
    async fn upsert_address(&self, user_id: UserId, address: NewAddress) -> StorageResult<Address>;

    async fn get_address(&self, user_id: UserId) -> StorageResult<Option<Address>>;

    /// Register a skill for a user. Attaching a skill twice is a no-op.
    async fn attach_skill(&self, user_id: UserId, skill_id: SkillId) -> StorageResult<()>;

    /// Skills of a user ordered by name
    async fn user_skills(&self, user_id: UserId) -> StorageResult<Vec<Skill>>;

    /// User with address and skills
    async fn get_profile(&self, user_id: UserId) -> StorageResult<UserProfile> {
        let user = self.get_user(user_id).await?;
        let address = self.get_address(user_id).await?;
        let skills = self.user_skills(user_id).await?;
        Ok(UserProfile {
            user,
            address,
            skills,
        })
    }
}

/// SQLite implementation of UserStore
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize database schema for users, addresses and user skills
    pub async fn initialize(&self) -> StorageResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(100) NOT NULL,
                email VARCHAR(255) UNIQUE NOT NULL,
                password_hash VARCHAR(255) NOT NULL,
                created_at TIMESTAMP NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS addresses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER UNIQUE NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                street VARCHAR(120) NOT NULL,
                city VARCHAR(80) NOT NULL,
                state VARCHAR(50) NOT NULL,
                zip_code VARCHAR(20) NOT NULL,
                latitude REAL NOT NULL,
                longitude REAL NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_skills (
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                skill_id INTEGER NOT NULL REFERENCES skills(id) ON DELETE CASCADE,
                PRIMARY KEY (user_id, skill_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_user_skills_skill ON user_skills(skill_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn ensure_user(&self, id: UserId) -> StorageResult<()> {
        sqlx::query("SELECT id FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|_| ())
            .ok_or(StorageError::UserNotFound(id))
    }
}

fn user_from_row(row: &SqliteRow) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
    }
}

fn address_from_row(row: &SqliteRow) -> Address {
    Address {
        id: row.get("id"),
        user_id: row.get("user_id"),
        street: row.get("street"),
        city: row.get("city"),
        state: row.get("state"),
        zip_code: row.get("zip_code"),
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn create_user(&self, user: NewUser) -> StorageResult<User> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, password_hash, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return StorageError::DuplicateEmail(user.email.clone());
                }
            }
            StorageError::Database(e)
        })?;

        Ok(User {
            id: result.last_insert_rowid(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
        })
    }

    async fn get_user(&self, id: UserId) -> StorageResult<User> {
        let row = sqlx::query(
            "SELECT id, name, email, password_hash, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::UserNotFound(id))?;

        Ok(user_from_row(&row))
    }

    async fn get_user_by_email(&self, email: &str) -> StorageResult<User> {
        let row = sqlx::query(
            "SELECT id, name, email, password_hash, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StorageError::UserEmailNotFound(email.to_string()))?;

        Ok(user_from_row(&row))
    }

    async fn list_users(&self) -> StorageResult<Vec<User>> {
        let rows = sqlx::query(
            "SELECT id, name, email, password_hash, created_at FROM users ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(user_from_row).collect())
    }

    async fn upsert_address(&self, user_id: UserId, address: NewAddress) -> StorageResult<Address> {
        self.ensure_user(user_id).await?;

        let row = sqlx::query(
            r#"
            INSERT INTO addresses (user_id, street, city, state, zip_code, latitude, longitude)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id) DO UPDATE SET
                street = excluded.street,
                city = excluded.city,
                state = excluded.state,
                zip_code = excluded.zip_code,
                latitude = excluded.latitude,
                longitude = excluded.longitude
            RETURNING id, user_id, street, city, state, zip_code, latitude, longitude
            "#,
        )
        .bind(user_id)
        .bind(&address.street)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.zip_code)
        .bind(address.latitude)
        .bind(address.longitude)
        .fetch_one(&self.pool)
        .await?;

        Ok(address_from_row(&row))
    }

    async fn get_address(&self, user_id: UserId) -> StorageResult<Option<Address>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, street, city, state, zip_code, latitude, longitude
            FROM addresses
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(address_from_row))
    }

    async fn attach_skill(&self, user_id: UserId, skill_id: SkillId) -> StorageResult<()> {
        self.ensure_user(user_id).await?;

        sqlx::query("SELECT id FROM skills WHERE id = ?")
            .bind(skill_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::SkillNotFound(skill_id))?;

        sqlx::query("INSERT OR IGNORE INTO user_skills (user_id, skill_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(skill_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn user_skills(&self, user_id: UserId) -> StorageResult<Vec<Skill>> {
        let rows = sqlx::query(
            r#"
            SELECT s.id, s.name
            FROM skills s
            JOIN user_skills us ON us.skill_id = s.id
            WHERE us.user_id = ?
            ORDER BY s.name ASC
            "#,
        )
        .bind(user_id)
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sqlite::test_pool;
    use crate::storage::{SkillStore, SqliteSkillStore};

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Maria Souza".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$fake".to_string(),
        }
    }

    fn address(street: &str, latitude: f64, longitude: f64) -> NewAddress {
        NewAddress {
            street: street.to_string(),
            city: "São Paulo".to_string(),
            state: "SP".to_string(),
            zip_code: "01310-100".to_string(),
            latitude,
            longitude,
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup_user() {
        let store = SqliteUserStore::new(test_pool().await);

        let created = store.create_user(new_user("maria@obra.com")).await.unwrap();
        let by_id = store.get_user(created.id).await.unwrap();
        let by_email = store.get_user_by_email("maria@obra.com").await.unwrap();

        assert_eq!(by_id.email, "maria@obra.com");
        assert_eq!(by_email.id, created.id);
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let store = SqliteUserStore::new(test_pool().await);
        store.create_user(new_user("dup@obra.com")).await.unwrap();

        let err = store.create_user(new_user("dup@obra.com")).await.unwrap_err();
        assert!(matches!(err, StorageError::DuplicateEmail(email) if email == "dup@obra.com"));
    }

    #[tokio::test]
    async fn test_missing_user() {
        let store = SqliteUserStore::new(test_pool().await);

        assert!(matches!(
            store.get_user(99).await,
            Err(StorageError::UserNotFound(99))
        ));
        assert!(matches!(
            store.get_user_by_email("ghost@obra.com").await,
            Err(StorageError::UserEmailNotFound(_))
        ));
        assert!(matches!(
            store.upsert_address(99, address("Rua A", 0.0, 0.0)).await,
            Err(StorageError::UserNotFound(99))
        ));
    }

    #[tokio::test]
    async fn test_upsert_address_replaces_existing() {
        let store = SqliteUserStore::new(test_pool().await);
        let user = store.create_user(new_user("addr@obra.com")).await.unwrap();

        let first = store
            .upsert_address(user.id, address("Rua Augusta", -23.55, -46.63))
            .await
            .unwrap();
        let second = store
            .upsert_address(user.id, address("Avenida Paulista", -23.56, -46.65))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.street, "Avenida Paulista");
        let stored = store.get_address(user.id).await.unwrap().unwrap();
        assert_eq!(stored.latitude, -23.56);
    }

    #[tokio::test]
    async fn test_attach_skill_is_idempotent() {
        let pool = test_pool().await;
        let store = SqliteUserStore::new(pool.clone());
        let skills = SqliteSkillStore::new(pool);

        let user = store.create_user(new_user("skill@obra.com")).await.unwrap();
        let pintura = skills.create_skill("Pintura").await.unwrap();
        let alvenaria = skills.create_skill("Alvenaria").await.unwrap();

        store.attach_skill(user.id, pintura.id).await.unwrap();
        store.attach_skill(user.id, pintura.id).await.unwrap();
        store.attach_skill(user.id, alvenaria.id).await.unwrap();

        let names: Vec<String> = store
            .user_skills(user.id)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Alvenaria", "Pintura"]);

        assert!(matches!(
            store.attach_skill(user.id, 404).await,
            Err(StorageError::SkillNotFound(404))
        ));
    }

    #[tokio::test]
    async fn test_profile_combines_address_and_skills() {
        let pool = test_pool().await;
        let store = SqliteUserStore::new(pool.clone());
        let skills = SqliteSkillStore::new(pool);

        let user = store.create_user(new_user("perfil@obra.com")).await.unwrap();
        let profile = store.get_profile(user.id).await.unwrap();
        assert!(profile.address.is_none());
        assert!(profile.skills.is_empty());

        let eletrica = skills.create_skill("Elétrica").await.unwrap();
        store.attach_skill(user.id, eletrica.id).await.unwrap();
        store
            .upsert_address(user.id, address("Rua B", -22.9, -43.2))
            .await
            .unwrap();

        let profile = store.get_profile(user.id).await.unwrap();
        assert_eq!(profile.skills, vec![eletrica]);
        assert_eq!(profile.address.unwrap().user_id, user.id);
    }
}
