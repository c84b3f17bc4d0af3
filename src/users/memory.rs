use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{CreateUserError, NewUser, User, UserStore};

/// Test double for `PgUserStore`. Enforces the same email uniqueness.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn remove(&self, id: Uuid) -> Option<User> {
        self.users.lock().unwrap().remove(&id)
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn create(&self, user: NewUser<'_>) -> Result<User, CreateUserError> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == user.email) {
            return Err(CreateUserError::EmailTaken);
        }
        let now = OffsetDateTime::now_utc();
        let created = User {
            id: Uuid::new_v4(),
            email: user.email.to_string(),
            password_hash: user.password_hash.to_string(),
            full_name: user.full_name.to_string(),
            created_at: now,
            updated_at: now,
        };
        users.insert(created.id, created.clone());
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn email_is_unique_and_case_sensitive() {
        let store = MemoryUserStore::default();
        let new = NewUser {
            full_name: "Jane Doe",
            email: "jane@example.com",
            password_hash: "hash",
        };
        let jane = store.create(new).await.unwrap();
        assert!(matches!(store.create(new).await, Err(CreateUserError::EmailTaken)));

        let upper = NewUser {
            email: "Jane@example.com",
            ..new
        };
        assert!(store.create(upper).await.is_ok());

        let found = store.find_by_email("jane@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, jane.id);
        assert!(store.find_by_id(jane.id).await.unwrap().is_some());

        store.remove(jane.id);
        assert!(store.find_by_id(jane.id).await.unwrap().is_none());
    }
}
