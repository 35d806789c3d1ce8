use async_trait::async_trait;
use sqlx::PgPool;

use super::user::map_sqlx_error;
use super::user::UserRow;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::ProviderLink;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::ProviderLinkRepository;
use crate::user::errors::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct ProviderLinkRow {
    id: i64,
    user_id: i64,
    provider: String,
    provider_user_id: String,
}

impl ProviderLinkRow {
    fn into_link(self) -> ProviderLink {
        ProviderLink {
            id: self.id,
            user_id: UserId(self.user_id),
            provider: self.provider,
            provider_user_id: self.provider_user_id,
        }
    }
}

pub struct PostgresProviderLinkRepository {
    pool: PgPool,
}

impl PostgresProviderLinkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProviderLinkRepository for PostgresProviderLinkRepository {
    async fn find_linked_user(
        &self,
        provider: &str,
        subject: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT u.id, u.username, u.email, u.password_hash, u.date_of_birth, u.role, u.created_at, u.updated_at
            FROM users u
            JOIN user_providers p ON p.user_id = u.id
            WHERE p.provider = $1 AND p.provider_user_id = $2
            "#,
        )
        .bind(provider)
        .bind(subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(UserRow::into_user).transpose()
    }

    async fn link_existing(
        &self,
        user_id: UserId,
        provider: &str,
        subject: &str,
    ) -> Result<ProviderLink, RepositoryError> {
        let row: ProviderLinkRow = sqlx::query_as(
            r#"
            INSERT INTO user_providers (user_id, provider, provider_user_id)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, provider, provider_user_id
            "#,
        )
        .bind(user_id.0)
        .bind(provider)
        .bind(subject)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into_link())
    }

    async fn create_user_with_link(
        &self,
        user: NewUser,
        provider: &str,
        subject: &str,
    ) -> Result<User, RepositoryError> {
        // Both inserts commit together; a uniqueness violation on either
        // rolls back the account so no linkless row survives the race.
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let now = chrono::Utc::now();
        let row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (username, email, password_hash, date_of_birth, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING id, username, email, password_hash, date_of_birth, role, created_at, updated_at
            "#,
        )
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.date_of_birth)
        .bind(user.role.as_str())
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        sqlx::query(
            r#"
            INSERT INTO user_providers (user_id, provider, provider_user_id)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(row.id)
        .bind(provider)
        .bind(subject)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        row.into_user()
    }
}
