//! Persistence of user aggregates.
//!
//! A user, its tasks and their subtasks form one document. Services load it with
//! [`UserStore::find_by_id`], mutate it in memory and write it back whole with
//! [`UserStore::save`]. Saves are versioned: an aggregate that was loaded before
//! somebody else's save is rejected with [`AppError::WriteConflict`] instead of
//! silently overwriting that save.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::models::{NewUser, User};

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Case-insensitive lookup.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Inserts a new aggregate with no tasks at version 1.
    ///
    /// Fails with [`AppError::Conflict`] if the email is taken.
    async fn create(&self, user: NewUser) -> Result<User, AppError>;

    /// Persists the whole aggregate if `user.version` is still the stored version and
    /// returns it with the bumped version.
    async fn save(&self, user: &User) -> Result<User, AppError>;

    /// Releases connections at shutdown.
    async fn close(&self) {}
}

/// Emails are compared and stored trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn stale_write(id: Uuid) -> AppError {
    log::warn!("Rejected stale write to user {}", id);
    AppError::WriteConflict(
        "The task list was modified by another request; reload and try again".into(),
    )
}

/// Opens the store named by `DATABASE_URL`.
pub async fn connect(config: &Config) -> Result<Arc<dyn UserStore>, AppError> {
    if config.uses_memory_store() {
        log::warn!("Using the in-memory document store; data is lost on shutdown");
        return Ok(Arc::new(MemoryUserStore::new()));
    }
    let store = PgUserStore::connect(&config.database_url).await?;
    Ok(Arc::new(store))
}
