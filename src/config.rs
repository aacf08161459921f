use anyhow::Context;
use serde::Deserialize;

/// Credentials for the account created on startup when none exists yet.
#[derive(Debug, Clone, Deserialize)]
pub struct SuperuserConfig {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub superuser: Option<SuperuserConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let max_connections = match var("DB_MAX_CONNECTIONS") {
            Some(v) => v.parse().context("DB_MAX_CONNECTIONS must be a number")?,
            None => 10,
        };
        let port = match var("APP_PORT") {
            Some(v) => v.parse().context("APP_PORT must be a port number")?,
            None => 8080,
        };
        let superuser = match (var("SUPERUSER_EMAIL"), var("SUPERUSER_PASSWORD")) {
            (Some(email), Some(password)) => Some(SuperuserConfig { email, password }),
            _ => None,
        };
        Ok(Self {
            database_url,
            max_connections,
            host: var("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            superuser,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
