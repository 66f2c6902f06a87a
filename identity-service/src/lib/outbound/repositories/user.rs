use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::account::errors::StoreError;
use crate::account::models::User;
use crate::account::models::UserId;
use crate::account::ports::CredentialStore;

const SELECT_USER: &str = "SELECT id, username, email, password_hash, first_name, last_name, \
     is_active, created_at, updated_at, last_login_at FROM users";

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    username: Option<String>,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_login_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId(row.id),
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            first_name: row.first_name,
            last_name: row.last_name,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
            last_login_at: row.last_login_at,
        }
    }
}

pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_unique_violation(user: &User, e: sqlx::Error) -> StoreError {
        if let Some(db_err) = e.as_database_error() {
            if db_err.is_unique_violation() {
                if db_err.constraint() == Some("users_username_key") {
                    return StoreError::DuplicateUsername(
                        user.username.clone().unwrap_or_default(),
                    );
                }
                if db_err.constraint() == Some("users_email_key") {
                    return StoreError::DuplicateEmail(user.email.clone());
                }
            }
        }
        StoreError::Database(e.to_string())
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn create(&self, user: User) -> Result<User, StoreError> {
        sqlx::query(
            "INSERT INTO users \
             (id, username, email, password_hash, first_name, last_name, \
              is_active, created_at, updated_at, last_login_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(user.id.0)
        .bind(user.username.as_deref())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(user.last_login_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::map_unique_violation(&user, e))?;

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE id = $1"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(row.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        if username.trim().is_empty() {
            return Ok(None);
        }

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "{SELECT_USER} WHERE LOWER(username) = LOWER($1)"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(row.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        if email.trim().is_empty() {
            return Ok(None);
        }

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "{SELECT_USER} WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(row.map(User::from))
    }

    async fn find_by_username_or_email(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, StoreError> {
        // Username wins when an identifier matches both.
        if let Some(user) = self.find_by_username(identifier).await? {
            return Ok(Some(user));
        }
        self.find_by_email(identifier).await
    }

    async fn username_exists(&self, username: &str) -> Result<bool, StoreError> {
        if username.trim().is_empty() {
            return Ok(false);
        }

        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE LOWER(username) = LOWER($1))",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        if email.trim().is_empty() {
            return Ok(false);
        }

        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))
    }

    async fn update(&self, user: User) -> Result<User, StoreError> {
        let result = sqlx::query(
            "UPDATE users SET username = $2, email = $3, password_hash = $4, \
             first_name = $5, last_name = $6, is_active = $7, updated_at = $8, \
             last_login_at = $9 WHERE id = $1",
        )
        .bind(user.id.0)
        .bind(user.username.as_deref())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.is_active)
        .bind(user.updated_at)
        .bind(user.last_login_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::map_unique_violation(&user, e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(user.id.to_string()));
        }

        Ok(user)
    }
}
