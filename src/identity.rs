use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// Primary key and lifecycle timestamps shared by every persisted entity.
/// Read through [`Identifiable`]; only [`Identity::touch`] writes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Identity {
    pub(crate) id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) updated_at: OffsetDateTime,
    /// Set until the first successful write. Rows read back from storage
    /// never carry it.
    #[serde(skip)]
    #[sqlx(skip)]
    fresh: bool,
}

impl Identity {
    /// Fresh id, both timestamps set to the same instant.
    pub fn new() -> Self {
        let now = now_utc();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            fresh: true,
        }
    }

    /// Whether this identity has not been written yet.
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    pub(crate) fn mark_persisted(&mut self) {
        self.fresh = false;
    }

    /// Refreshes the timestamps ahead of a write. The first write stamps both
    /// with the same instant; later writes only move `updated_at`, and never
    /// backwards.
    pub fn touch(&mut self) {
        let now = now_utc();
        if self.fresh {
            self.created_at = now;
            self.updated_at = now;
        } else {
            self.updated_at = now.max(self.updated_at).max(self.created_at);
        }
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::new()
    }
}

/// Current UTC time truncated to microseconds, the precision Postgres keeps.
pub fn now_utc() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now - Duration::nanoseconds(i64::from(now.nanosecond() % 1_000))
}

/// Implemented by entities that embed an [`Identity`].
pub trait Identifiable {
    fn identity(&self) -> &Identity;
    fn identity_mut(&mut self) -> &mut Identity;

    fn id(&self) -> Uuid {
        self.identity().id
    }

    fn created_at(&self) -> OffsetDateTime {
        self.identity().created_at
    }

    fn updated_at(&self) -> OffsetDateTime {
        self.identity().updated_at
    }

    /// Called right before every storage write.
    fn touch(&mut self) {
        self.identity_mut().touch();
    }
}
