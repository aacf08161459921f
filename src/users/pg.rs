use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{AccountError, Result},
    users::{model::User, store::UserStore},
};

const USER_COLUMNS: &str = "id, email, first_name, last_name, is_active, is_staff, is_superuser, \
                            password_hash, last_login, created_at, updated_at";

/// `users` table in PostgreSQL.
#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Unique violations on the email index become `DuplicateEmail`.
fn map_write_error(err: sqlx::Error, email: &str) -> AccountError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AccountError::DuplicateEmail(email.to_string())
        }
        _ => AccountError::Database(err),
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn save(&self, user: &User) -> Result<User> {
        let sql = format!(
            r#"
            INSERT INTO users ({USER_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO UPDATE SET
                email = EXCLUDED.email,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                is_active = EXCLUDED.is_active,
                is_staff = EXCLUDED.is_staff,
                is_superuser = EXCLUDED.is_superuser,
                password_hash = EXCLUDED.password_hash,
                last_login = EXCLUDED.last_login,
                updated_at = EXCLUDED.updated_at
            RETURNING {USER_COLUMNS}
            "#
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(user.identity.id)
            .bind(&user.email)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(user.permissions.is_active)
            .bind(user.permissions.is_staff)
            .bind(user.permissions.is_superuser)
            .bind(user.credentials.password_hash())
            .bind(user.credentials.last_login)
            .bind(user.identity.created_at)
            .bind(user.identity.updated_at)
            .fetch_one(&self.db)
            .await
            .map_err(|e| map_write_error(e, &user.email))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
