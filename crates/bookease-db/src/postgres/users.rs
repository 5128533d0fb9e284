use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use bookease_auth::CredentialStore;
use bookease_core::DomainError;
use bookease_models::{User, UserField};

use super::{ROLE_JOINS, USER_COLUMNS, UserRow, map_db_error, upsert_user};

#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_active_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users u {ROLE_JOINS} \
             WHERE u.username = $1 AND u.active GROUP BY u.id"
        );

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(row.map(User::from))
    }

    #[instrument(skip(self))]
    async fn set_token_revoked(&self, user_id: Uuid, revoked: bool) -> Result<(), DomainError> {
        sqlx::query("UPDATE users SET token_revoked = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(revoked)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, value))]
    async fn exists_active(&self, field: UserField, value: &str) -> Result<bool, DomainError> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM users WHERE {} = $1 AND active)",
            field.column()
        );

        sqlx::query_scalar::<_, bool>(&sql)
            .bind(value)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn save_user(&self, user: &User) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        if !upsert_user(&mut tx, user).await.map_err(map_db_error)? {
            return Err(DomainError::not_found("User", user.id));
        }
        tx.commit().await.map_err(map_db_error)
    }
}
