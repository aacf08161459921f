use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::{
    error::{AccountError, Result},
    identity::{now_utc, Identifiable, Identity},
    users::{
        email::is_valid_email,
        password::{hash_password, verify_password},
        store::UserStore,
    },
};

const NAME_MAX_LENGTH: usize = 100;

/// Role flags. A fresh account can log in but has no elevated rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Permissions {
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl Default for Permissions {
    fn default() -> Self {
        Self {
            is_active: true,
            is_staff: false,
            is_superuser: false,
        }
    }
}

/// Password hash plus login tracking. `password_hash` is `None` for accounts
/// without a usable password.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Credentials {
    #[serde(skip_serializing)]
    password_hash: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub(crate) last_login: Option<OffsetDateTime>,
}

impl Credentials {
    pub(crate) fn password_hash(&self) -> Option<&str> {
        self.password_hash.as_deref()
    }
}

/// User record in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub(crate) identity: Identity,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub permissions: Permissions,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub(crate) credentials: Credentials,
}

impl Identifiable for User {
    fn identity(&self) -> &Identity {
        &self.identity
    }

    fn identity_mut(&mut self) -> &mut Identity {
        &mut self.identity
    }
}

impl User {
    /// In-memory entity with a fresh identity and default flags. Callers go
    /// through `UserManager` to get a persisted, password-bearing account.
    pub(crate) fn new(email: String) -> Self {
        Self {
            identity: Identity::new(),
            email,
            first_name: String::new(),
            last_name: String::new(),
            permissions: Permissions::default(),
            credentials: Credentials::default(),
        }
    }

    /// The login identifier.
    pub fn username(&self) -> &str {
        &self.email
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn is_active(&self) -> bool {
        self.permissions.is_active
    }

    pub fn is_staff(&self) -> bool {
        self.permissions.is_staff
    }

    pub fn is_superuser(&self) -> bool {
        self.permissions.is_superuser
    }

    pub fn last_login(&self) -> Option<OffsetDateTime> {
        self.credentials.last_login
    }

    /// Hashes and stores `plain`; `None` leaves the account without a usable
    /// password.
    pub fn set_password(&mut self, plain: Option<&str>) -> Result<()> {
        match plain {
            Some(plain) => {
                self.credentials.password_hash = Some(hash_password(plain)?);
            }
            None => self.set_unusable_password(),
        }
        Ok(())
    }

    pub fn set_unusable_password(&mut self) {
        self.credentials.password_hash = None;
    }

    pub fn has_usable_password(&self) -> bool {
        self.credentials.password_hash.is_some()
    }

    /// False for accounts without a usable password.
    pub fn check_password(&self, plain: &str) -> Result<bool> {
        match &self.credentials.password_hash {
            Some(hash) => verify_password(plain, hash),
            None => Ok(false),
        }
    }

    pub(crate) fn mark_logged_in(&mut self) {
        self.credentials.last_login = Some(now_utc());
    }

    /// Field-level checks run before every write.
    pub fn validate(&self) -> Result<()> {
        if self.email.is_empty() {
            return Err(AccountError::MissingField("email"));
        }
        if !is_valid_email(&self.email) {
            return Err(AccountError::validation(
                "email",
                format!("{:?} is not a valid email address", self.email),
            ));
        }
        for (field, value) in [("first_name", &self.first_name), ("last_name", &self.last_name)] {
            if value.chars().count() > NAME_MAX_LENGTH {
                return Err(AccountError::validation(
                    field,
                    format!("must be at most {} characters", NAME_MAX_LENGTH),
                ));
            }
        }
        Ok(())
    }

    /// Validates, refreshes `updated_at`, writes through `store` and replaces
    /// `self` with the stored row. On failure `self` is left as it was.
    pub async fn save(&mut self, store: &dyn UserStore) -> Result<()> {
        self.validate()?;
        let mut pending = self.clone();
        pending.touch();
        let mut row = store.save(&pending).await?;
        row.identity.mark_persisted();
        *self = row;
        Ok(())
    }

    /// Hard delete.
    pub async fn delete(self, store: &dyn UserStore) -> Result<()> {
        if store.delete(self.id()).await? {
            Ok(())
        } else {
            Err(AccountError::NotFound(self.id()))
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.email)
    }
}
