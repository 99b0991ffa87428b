use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewUser, User};
use crate::store::{normalize_email, stale_write, UserStore};

/// Process-local document store with the same semantics as [`PgUserStore`](super::PgUserStore).
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = normalize_email(email);
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let email = normalize_email(&user.email);
        let mut users = self.users.write().await;
        if users.values().any(|existing| existing.email == email) {
            return Err(AppError::Conflict("User already exists".into()));
        }

        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            email,
            password_hash: user.password_hash,
            tasks: Vec::new(),
            version: 1,
            created_at: now,
            updated_at: now,
        };
        users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn save(&self, user: &User) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        let stored = users.get_mut(&user.id).ok_or_else(|| stale_write(user.id))?;
        if stored.version != user.version {
            return Err(stale_write(user.id));
        }

        *stored = User {
            version: user.version + 1,
            updated_at: Utc::now(),
            ..user.clone()
        };
        Ok(stored.clone())
    }
}
