use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::account::errors::AuthError;
use crate::account::errors::StoreError;
use crate::account::models::AuthSuccess;
use crate::account::models::ClientInfo;
use crate::account::models::NewAccount;
use crate::account::models::RefreshToken;
use crate::account::models::User;
use crate::account::models::UserId;

/// Port for authentication domain operations.
///
/// The transport layer consumes exactly this surface and maps each
/// `AuthError` variant to a status code; nothing here knows about HTTP.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new account and issue its first token pair.
    ///
    /// # Errors
    /// * `Validation` - Blank email/password/name, or malformed email
    /// * `EmailAlreadyExists` / `UsernameAlreadyExists` - Conflict, whether
    ///   caught by the pre-check or by the store's unique constraint
    /// * `Unexpected` - Store or hashing failure
    async fn register(
        &self,
        account: NewAccount,
        client: ClientInfo,
    ) -> Result<AuthSuccess, AuthError>;

    /// Verify credentials and issue a token pair.
    ///
    /// `identifier` may be a username or an email; lookup tries username
    /// first, case-insensitively. Stamps `last_login_at` on success.
    ///
    /// # Errors
    /// * `Validation` - Blank identifier or password
    /// * `InvalidCredentials` - Unknown identifier or wrong password, with
    ///   identical message text for both
    /// * `AccountDeactivated` - Credentials correct but account disabled
    async fn login(
        &self,
        identifier: &str,
        password: &str,
        client: ClientInfo,
    ) -> Result<AuthSuccess, AuthError>;

    /// Exchange a refresh secret for a new token pair.
    ///
    /// Single-use rotation: the presented secret is revoked before the
    /// replacement is issued, so a concurrent replay of the same secret
    /// cannot mint a second live chain.
    ///
    /// # Errors
    /// * `Validation` - Blank input
    /// * `InvalidRefreshToken` - Unknown secret, or owning user gone
    /// * `RefreshTokenNotActive` - Secret expired or revoked
    /// * `AccountDeactivated` - Owning account disabled
    async fn refresh_token(
        &self,
        refresh_secret: &str,
        client: ClientInfo,
    ) -> Result<AuthSuccess, AuthError>;

    /// Revoke a single refresh secret.
    ///
    /// Idempotent: blank input, an unknown secret, or an already-revoked
    /// one all return `Ok(false)` without touching state.
    async fn logout(&self, refresh_secret: &str) -> Result<bool, AuthError>;

    /// Revoke every outstanding refresh token for a user
    /// (logout-all-devices). Returns `Ok(true)` iff at least one token was
    /// newly revoked.
    async fn revoke_all_tokens(&self, user_id: &UserId) -> Result<bool, AuthError>;

    /// Replace a user's password after verifying the current one, revoking
    /// all outstanding refresh tokens.
    ///
    /// # Errors
    /// * `Validation` - Blank current or new password
    /// * `UserNotFound` - No such user
    /// * `InvalidCredentials` - Current password does not match
    async fn change_password(
        &self,
        user_id: &UserId,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;

    /// List a user's refresh tokens, newest first, for session audit.
    async fn list_user_tokens(&self, user_id: &UserId) -> Result<Vec<RefreshToken>, AuthError>;

    /// Delete expired refresh token rows. Invoked by an external scheduler,
    /// never self-triggered. Returns the number of rows removed.
    async fn purge_expired_tokens(&self) -> Result<u64, AuthError>;
}

/// Persistence operations for user records.
///
/// Username and email comparisons are case-insensitive. Lookups with a
/// blank key return `Ok(None)` / `Ok(false)` rather than failing.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Persist a new user.
    ///
    /// # Errors
    /// * `DuplicateEmail` / `DuplicateUsername` - Unique constraint hit
    /// * `Database` - Operation failed
    async fn create(&self, user: User) -> Result<User, StoreError>;

    /// Retrieve a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError>;

    /// Retrieve a user by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Retrieve a user by email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Retrieve a user by username or email: username is tried first, then
    /// email.
    async fn find_by_username_or_email(&self, identifier: &str)
        -> Result<Option<User>, StoreError>;

    /// Whether a user with this username exists.
    async fn username_exists(&self, username: &str) -> Result<bool, StoreError>;

    /// Whether a user with this email exists.
    async fn email_exists(&self, email: &str) -> Result<bool, StoreError>;

    /// Update an existing user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DuplicateEmail` / `DuplicateUsername` - New value collides
    /// * `Database` - Operation failed
    async fn update(&self, user: User) -> Result<User, StoreError>;
}

/// Persistence operations for refresh token records.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync + 'static {
    /// Persist a new refresh token row.
    ///
    /// # Errors
    /// * `DuplicateToken` - Secret value collides with an existing row
    /// * `Database` - Operation failed
    async fn create(&self, token: RefreshToken) -> Result<RefreshToken, StoreError>;

    /// Retrieve a token row by its secret value (exact match).
    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>, StoreError>;

    /// Retrieve all of a user's token rows, newest first.
    async fn find_all_by_user(&self, user_id: &UserId) -> Result<Vec<RefreshToken>, StoreError>;

    /// Update an existing token row (used to flip revocation flags).
    ///
    /// # Errors
    /// * `NotFound` - Row does not exist
    /// * `Database` - Operation failed
    async fn update(&self, token: RefreshToken) -> Result<RefreshToken, StoreError>;

    /// Bulk-delete rows whose expiry is at or before `now`. Returns the
    /// number of rows deleted.
    async fn delete_all_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;

    /// Revoke every currently non-revoked token for a user in a single
    /// statement, stamping `revoked_at = now`. Returns the number of rows
    /// changed.
    async fn revoke_all_for_user(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<u64, StoreError>;
}
