use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewUser, Task, User};
use crate::store::{normalize_email, stale_write, UserStore};

const USER_COLUMNS: &str =
    "id, username, email, password_hash, tasks, version, created_at, updated_at";

/// Document store backed by Postgres: one row per user, tasks embedded as JSONB.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    tasks: Json<Vec<Task>>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            tasks: row.tasks.0,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl PgUserStore {
    /// Connects and applies the embedded migrations.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Migration failed: {}", e)))?;
        log::info!("Connected to document store");
        Ok(Self { pool })
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (id, username, email, password_hash) VALUES ($1, $2, $3, $4) \
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(normalize_email(&user.email))
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn save(&self, user: &User) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET username = $2, tasks = $3, version = version + 1, updated_at = NOW() \
             WHERE id = $1 AND version = $4 \
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(Json(&user.tasks))
        .bind(user.version)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::from).ok_or_else(|| stale_write(user.id))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Needs a reachable Postgres in DATABASE_URL.
    #[ignore]
    #[actix_rt::test]
    async fn test_versioned_save_round_trip() {
        dotenv::dotenv().ok();
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL not set");
        let store = PgUserStore::connect(&url).await.unwrap();
        let email = format!("pg-{}@example.com", Uuid::new_v4());

        let created = store
            .create(NewUser {
                username: "Pg User".to_string(),
                email: email.to_uppercase(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(created.email, email);

        let saved = store.save(&created).await.unwrap();
        assert_eq!(saved.version, created.version + 1);
        assert!(matches!(
            store.save(&created).await,
            Err(AppError::WriteConflict(_))
        ));

        let _ = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(created.id)
            .execute(&store.pool)
            .await;
    }
}
