use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    error::{AccountError, Result},
    identity::Identifiable,
    users::{email::normalize_email, model::User, password::hash_password, store::UserStore},
};

/// Optional attributes for the factory operations. `None` means "not
/// supplied": the entity default applies, or for `create_superuser` the
/// elevated default.
#[derive(Debug, Clone, Default)]
pub struct UserFields {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
}

impl UserFields {
    fn apply(self, user: &mut User) {
        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name;
        }
        if let Some(is_active) = self.is_active {
            user.permissions.is_active = is_active;
        }
        if let Some(is_staff) = self.is_staff {
            user.permissions.is_staff = is_staff;
        }
        if let Some(is_superuser) = self.is_superuser {
            user.permissions.is_superuser = is_superuser;
        }
    }
}

/// Creates and looks up accounts on top of a [`UserStore`].
#[derive(Clone)]
pub struct UserManager {
    store: Arc<dyn UserStore>,
}

impl UserManager {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn UserStore {
        self.store.as_ref()
    }

    #[instrument(skip(self, password, extra))]
    pub async fn create_user(
        &self,
        email: &str,
        password: Option<&str>,
        extra: UserFields,
    ) -> Result<User> {
        if email.trim().is_empty() {
            warn!("create_user without email");
            return Err(AccountError::MissingField("email"));
        }
        let email = normalize_email(email);

        let mut user = User::new(email);
        extra.apply(&mut user);
        user.set_password(password)?;
        user.save(self.store()).await?;

        info!(
            user_id = %user.id(),
            email = %user.email,
            is_staff = user.is_staff(),
            is_superuser = user.is_superuser(),
            "user created"
        );
        Ok(user)
    }

    /// Same as [`Self::create_user`] with `is_staff` and `is_superuser`
    /// defaulting to true. Explicit values in `extra` are kept.
    #[instrument(skip(self, password, extra))]
    pub async fn create_superuser(
        &self,
        email: &str,
        password: Option<&str>,
        mut extra: UserFields,
    ) -> Result<User> {
        extra.is_staff.get_or_insert(true);
        extra.is_superuser.get_or_insert(true);
        self.create_user(email, password, extra).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<User>> {
        self.store.find_by_id(id).await
    }

    /// Lookup by login identifier; the email is normalized first.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        self.store.find_by_email(&normalize_email(email)).await
    }

    /// Returns the user when the password matches and the account is active.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.get_by_email(email).await? else {
            // Pay for one hash anyway so unknown emails are not faster.
            hash_password(password)?;
            debug!("authenticate unknown email");
            return Ok(None);
        };

        if !user.has_usable_password() {
            // Same cost as the unknown-email branch.
            hash_password(password)?;
            debug!(user_id = %user.id(), "authenticate account without password");
            return Ok(None);
        }
        if !user.check_password(password)? {
            debug!(user_id = %user.id(), "authenticate wrong password");
            return Ok(None);
        }
        if !user.is_active() {
            debug!(user_id = %user.id(), "authenticate inactive user");
            return Ok(None);
        }
        Ok(Some(user))
    }

    /// Stamps `last_login` and saves.
    pub async fn record_login(&self, user: &mut User) -> Result<()> {
        user.mark_logged_in();
        user.save(self.store()).await?;
        debug!(user_id = %user.id(), "last_login updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::memory::InMemoryUserStore;

    fn manager() -> (UserManager, Arc<InMemoryUserStore>) {
        let store = Arc::new(InMemoryUserStore::new());
        (UserManager::new(store.clone()), store)
    }

    #[tokio::test]
    async fn create_user_assigns_identity_and_defaults() {
        let (manager, _) = manager();
        let user = manager
            .create_user("alice@example.com", Some("pw"), UserFields::default())
            .await
            .unwrap();
        assert_eq!(user.id().get_version_num(), 4);
        assert_eq!(user.created_at(), user.updated_at());
        assert!(user.is_active());
        assert!(!user.is_staff());
        assert!(!user.is_superuser());
        assert!(user.check_password("pw").unwrap());
    }

    #[tokio::test]
    async fn create_user_gives_unique_ids() {
        let (manager, _) = manager();
        let a = manager
            .create_user("a@example.com", None, UserFields::default())
            .await
            .unwrap();
        let b = manager
            .create_user("b@example.com", None, UserFields::default())
            .await
            .unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[tokio::test]
    async fn create_user_requires_email() {
        let (manager, store) = manager();
        for email in ["", "   "] {
            let err = manager
                .create_user(email, Some("pw"), UserFields::default())
                .await
                .unwrap_err();
            assert!(matches!(err, AccountError::MissingField("email")));
        }
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn create_user_normalizes_domain() {
        let (manager, store) = manager();
        let user = manager
            .create_user("A@Example.com", Some("pw"), UserFields::default())
            .await
            .unwrap();
        assert_eq!(user.email, "A@example.com");
        let stored = store.find_by_email("A@example.com").await.unwrap().unwrap();
        assert_eq!(stored.id(), user.id());
    }

    #[tokio::test]
    async fn create_user_twice_is_a_uniqueness_violation() {
        let (manager, store) = manager();
        manager
            .create_user("a@example.com", Some("pw"), UserFields::default())
            .await
            .unwrap();
        let err = manager
            .create_user("a@EXAMPLE.com", Some("pw"), UserFields::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::DuplicateEmail(email) if email == "a@example.com"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn create_user_rejects_malformed_email() {
        let (manager, store) = manager();
        let err = manager
            .create_user("not-an-email", Some("pw"), UserFields::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::Validation { field: "email", .. }));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn create_user_without_password_has_no_usable_password() {
        let (manager, _) = manager();
        let user = manager
            .create_user("sso@example.com", None, UserFields::default())
            .await
            .unwrap();
        assert!(!user.has_usable_password());
        assert!(manager.authenticate("sso@example.com", "").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_user_applies_extra_fields() {
        let (manager, _) = manager();
        let user = manager
            .create_user(
                "ada@example.com",
                Some("pw"),
                UserFields {
                    first_name: Some("Ada".into()),
                    last_name: Some("Lovelace".into()),
                    is_active: Some(false),
                    ..UserFields::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(user.full_name(), "Ada Lovelace");
        assert!(!user.is_active());
    }

    #[tokio::test]
    async fn create_superuser_sets_elevated_flags() {
        let (manager, _) = manager();
        let admin = manager
            .create_superuser("root@example.com", Some("pw"), UserFields::default())
            .await
            .unwrap();
        assert!(admin.is_staff());
        assert!(admin.is_superuser());
        assert!(admin.is_active());
    }

    #[tokio::test]
    async fn create_superuser_keeps_explicit_values() {
        let (manager, _) = manager();
        let admin = manager
            .create_superuser(
                "root@example.com",
                Some("pw"),
                UserFields {
                    is_staff: Some(false),
                    ..UserFields::default()
                },
            )
            .await
            .unwrap();
        assert!(!admin.is_staff());
        assert!(admin.is_superuser());
    }

    #[tokio::test]
    async fn create_superuser_requires_email() {
        let (manager, _) = manager();
        let err = manager
            .create_superuser("", Some("pw"), UserFields::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::MissingField("email")));
    }

    #[tokio::test]
    async fn authenticate_checks_password_and_active_flag() {
        let (manager, _) = manager();
        let user = manager
            .create_user("bob@example.com", Some("secret-pw"), UserFields::default())
            .await
            .unwrap();

        let found = manager
            .authenticate("bob@EXAMPLE.COM", "secret-pw")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id(), user.id());

        assert!(manager.authenticate("bob@example.com", "nope").await.unwrap().is_none());
        assert!(manager.authenticate("ghost@example.com", "secret-pw").await.unwrap().is_none());

        let mut inactive = found;
        inactive.permissions.is_active = false;
        inactive.save(manager.store()).await.unwrap();
        assert!(manager.authenticate("bob@example.com", "secret-pw").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn authenticate_rejects_account_without_password() {
        let (manager, _) = manager();
        manager
            .create_user("sso@example.com", None, UserFields::default())
            .await
            .unwrap();
        for attempt in ["", "anything", "sso@example.com"] {
            assert!(manager.authenticate("sso@example.com", attempt).await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn record_login_stamps_last_login() {
        let (manager, _) = manager();
        let mut user = manager
            .create_user("bob@example.com", Some("pw"), UserFields::default())
            .await
            .unwrap();
        assert!(user.last_login().is_none());

        manager.record_login(&mut user).await.unwrap();
        let stored = manager.get(user.id()).await.unwrap().unwrap();
        assert!(stored.last_login().is_some());
        assert_eq!(stored.created_at(), user.created_at());
        assert!(stored.updated_at() >= stored.created_at());
    }
}
