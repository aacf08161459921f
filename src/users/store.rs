use async_trait::async_trait;
use uuid::Uuid;

use crate::{error::Result, users::model::User};

/// Persistence for [`User`] rows.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts the row, or updates it when the id already exists. An update
    /// never rewrites `created_at`. Fails with `DuplicateEmail` when another
    /// row holds the same email.
    async fn save(&self, user: &User) -> Result<User>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    /// Exact match on the stored (already normalized) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    /// Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}
