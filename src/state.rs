use std::sync::Arc;

use crate::config::AppConfig;
use crate::db;
use crate::users::{memory::InMemoryUserStore, pg::PgUserStore, UserManager};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: UserManager,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let pool = db::connect(&config).await?;
        db::migrate(&pool).await?;

        let users = UserManager::new(Arc::new(PgUserStore::new(pool)));
        Ok(Self { config, users })
    }

    /// State backed by [`InMemoryUserStore`], for tests and local runs
    /// without Postgres.
    pub fn in_memory() -> Self {
        let config = Arc::new(AppConfig {
            database_url: "memory://".into(),
            max_connections: 1,
            host: "127.0.0.1".into(),
            port: 0,
            superuser: None,
        });
        let users = UserManager::new(Arc::new(InMemoryUserStore::new()));
        Self { config, users }
    }
}
