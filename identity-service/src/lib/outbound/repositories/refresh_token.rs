use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::account::errors::StoreError;
use crate::account::models::RefreshToken;
use crate::account::models::RefreshTokenId;
use crate::account::models::UserId;
use crate::account::ports::RefreshTokenStore;

const SELECT_TOKEN: &str = "SELECT id, token, user_id, expires_at, is_revoked, revoked_at, \
     ip_address, user_agent, created_at, updated_at FROM refresh_tokens";

#[derive(FromRow)]
struct RefreshTokenRow {
    id: Uuid,
    token: String,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
    is_revoked: bool,
    revoked_at: Option<DateTime<Utc>>,
    ip_address: Option<String>,
    user_agent: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RefreshTokenRow> for RefreshToken {
    fn from(row: RefreshTokenRow) -> Self {
        Self {
            id: RefreshTokenId(row.id),
            token: row.token,
            user_id: UserId(row.user_id),
            expires_at: row.expires_at,
            is_revoked: row.is_revoked,
            revoked_at: row.revoked_at,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub struct PostgresRefreshTokenStore {
    pool: PgPool,
}

impl PostgresRefreshTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenStore for PostgresRefreshTokenStore {
    async fn create(&self, token: RefreshToken) -> Result<RefreshToken, StoreError> {
        sqlx::query(
            "INSERT INTO refresh_tokens \
             (id, token, user_id, expires_at, is_revoked, revoked_at, \
              ip_address, user_agent, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(token.id.0)
        .bind(&token.token)
        .bind(token.user_id.0)
        .bind(token.expires_at)
        .bind(token.is_revoked)
        .bind(token.revoked_at)
        .bind(token.ip_address.as_deref())
        .bind(token.user_agent.as_deref())
        .bind(token.created_at)
        .bind(token.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation()
                    && db_err.constraint() == Some("refresh_tokens_token_key")
                {
                    return StoreError::DuplicateToken;
                }
            }
            StoreError::Database(e.to_string())
        })?;

        Ok(token)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>, StoreError> {
        if token.trim().is_empty() {
            return Ok(None);
        }

        // Exact match: the secret is compared verbatim, never case-folded.
        let row = sqlx::query_as::<_, RefreshTokenRow>(&format!("{SELECT_TOKEN} WHERE token = $1"))
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(row.map(RefreshToken::from))
    }

    async fn find_all_by_user(&self, user_id: &UserId) -> Result<Vec<RefreshToken>, StoreError> {
        let rows = sqlx::query_as::<_, RefreshTokenRow>(&format!(
            "{SELECT_TOKEN} WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(RefreshToken::from).collect())
    }

    async fn update(&self, token: RefreshToken) -> Result<RefreshToken, StoreError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET expires_at = $2, is_revoked = $3, \
             revoked_at = $4, updated_at = $5 WHERE id = $1",
        )
        .bind(token.id.0)
        .bind(token.expires_at)
        .bind(token.is_revoked)
        .bind(token.revoked_at)
        .bind(token.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(token.id.to_string()));
        }

        Ok(token)
    }

    async fn delete_all_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn revoke_all_for_user(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        // Single statement, so the bulk revoke is atomic at the store.
        let result = sqlx::query(
            "UPDATE refresh_tokens SET is_revoked = TRUE, revoked_at = $2, updated_at = $2 \
             WHERE user_id = $1 AND is_revoked = FALSE",
        )
        .bind(user_id.0)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
