use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    error::{AccountError, Result},
    users::{model::User, store::UserStore},
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    emails: HashMap<String, Uuid>, // email -> user id
}

/// Process-local store with the same uniqueness rules as the `users` table.
#[derive(Default)]
pub struct InMemoryUserStore {
    tables: Mutex<Tables>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.tables.lock().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn save(&self, user: &User) -> Result<User> {
        let mut tables = self.tables.lock().await;
        if let Some(owner) = tables.emails.get(&user.email) {
            if *owner != user.identity.id {
                return Err(AccountError::DuplicateEmail(user.email.clone()));
            }
        }

        let mut row = user.clone();
        row.identity.mark_persisted();
        if let Some(existing) = tables.users.get(&row.identity.id) {
            row.identity.created_at = existing.identity.created_at;
            let old_email = existing.email.clone();
            tables.emails.remove(&old_email);
        }
        tables.emails.insert(row.email.clone(), row.identity.id);
        tables.users.insert(row.identity.id, row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .emails
            .get(email)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        match tables.users.remove(&id) {
            Some(user) => {
                tables.emails.remove(&user.email);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
