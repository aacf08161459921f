use tracing::info;

use crate::{
    config::SuperuserConfig,
    identity::Identifiable,
    users::{UserFields, UserManager},
};

/// Creates the configured superuser unless an account with that email
/// already exists. Returns whether an account was created.
pub async fn ensure_superuser(users: &UserManager, config: &SuperuserConfig) -> anyhow::Result<bool> {
    if let Some(existing) = users.get_by_email(&config.email).await? {
        info!(user_id = %existing.id(), "superuser already present");
        return Ok(false);
    }
    let admin = users
        .create_superuser(&config.email, Some(&config.password), UserFields::default())
        .await?;
    info!(user_id = %admin.id(), email = %admin.email, "superuser bootstrapped");
    Ok(true)
}
