use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordHasher;
use auth::TokenSigner;
use chrono::Duration;
use chrono::Utc;

use crate::account::errors::AuthError;
use crate::account::models::AuthSuccess;
use crate::account::models::ClientInfo;
use crate::account::models::NewAccount;
use crate::account::models::RefreshToken;
use crate::account::models::RefreshTokenId;
use crate::account::models::User;
use crate::account::models::UserId;
use crate::account::ports::AuthServicePort;
use crate::account::ports::CredentialStore;
use crate::account::ports::RefreshTokenStore;

/// Domain service implementation for authentication operations.
///
/// Stateless coordinator over the credential and refresh-token stores; all
/// durable state lives behind the ports. One instance serves concurrent
/// requests.
pub struct AuthService<CS, RS>
where
    CS: CredentialStore,
    RS: RefreshTokenStore,
{
    credentials: Arc<CS>,
    refresh_tokens: Arc<RS>,
    password_hasher: PasswordHasher,
    token_signer: TokenSigner,
    refresh_token_days: i64,
}

impl<CS, RS> AuthService<CS, RS>
where
    CS: CredentialStore,
    RS: RefreshTokenStore,
{
    /// Create a new authentication service with injected dependencies.
    ///
    /// # Arguments
    /// * `credentials` - User persistence implementation
    /// * `refresh_tokens` - Refresh token persistence implementation
    /// * `token_signer` - Configured signer (construction already enforced
    ///   the key-length invariant)
    /// * `refresh_token_days` - Refresh token lifetime
    pub fn new(
        credentials: Arc<CS>,
        refresh_tokens: Arc<RS>,
        token_signer: TokenSigner,
        refresh_token_days: i64,
    ) -> Self {
        Self {
            credentials,
            refresh_tokens,
            password_hasher: PasswordHasher::new(),
            token_signer,
            refresh_token_days,
        }
    }

    /// Issue an access token and a refresh secret for `user`, persisting
    /// the refresh token row.
    async fn issue_session(
        &self,
        user: User,
        client: ClientInfo,
    ) -> Result<AuthSuccess, AuthError> {
        let issued = self.token_signer.issue_access_token(
            &user.id.to_string(),
            user.username.as_deref(),
            &user.email,
        )?;

        let refresh_secret = self.token_signer.issue_refresh_secret();
        let now = Utc::now();

        let refresh_token = RefreshToken {
            id: RefreshTokenId::new(),
            token: refresh_secret.clone(),
            user_id: user.id,
            expires_at: now + Duration::days(self.refresh_token_days),
            is_revoked: false,
            revoked_at: None,
            ip_address: client.ip_address,
            user_agent: client.user_agent,
            created_at: now,
            updated_at: now,
        };

        self.refresh_tokens.create(refresh_token).await?;

        Ok(AuthSuccess {
            user,
            access_token: issued.token,
            access_token_expires_at: issued.expires_at,
            refresh_token: refresh_secret,
        })
    }
}

#[async_trait]
impl<CS, RS> AuthServicePort for AuthService<CS, RS>
where
    CS: CredentialStore,
    RS: RefreshTokenStore,
{
    async fn register(
        &self,
        account: NewAccount,
        client: ClientInfo,
    ) -> Result<AuthSuccess, AuthError> {
        let email = account.email.trim();
        if email.is_empty() {
            return Err(AuthError::Validation("Email is required".to_string()));
        }
        if email_address::EmailAddress::from_str(email).is_err() {
            return Err(AuthError::Validation("Invalid email format".to_string()));
        }
        if account.password.trim().is_empty() {
            return Err(AuthError::Validation("Password is required".to_string()));
        }
        if account.first_name.trim().is_empty() || account.last_name.trim().is_empty() {
            return Err(AuthError::Validation(
                "First and last name are required".to_string(),
            ));
        }

        // Absent username and whitespace username are the same thing.
        let username = account
            .username
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string);

        // Pre-checks; the store's unique constraints still back them up if
        // another registration lands in between.
        if self.credentials.email_exists(email).await? {
            return Err(AuthError::EmailAlreadyExists);
        }
        if let Some(username) = &username {
            if self.credentials.username_exists(username).await? {
                return Err(AuthError::UsernameAlreadyExists);
            }
        }

        let password_hash = self.password_hasher.hash(&account.password)?;

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            username,
            email: email.to_string(),
            password_hash,
            first_name: account.first_name.trim().to_string(),
            last_name: account.last_name.trim().to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        };

        let user = self.credentials.create(user).await?;

        self.issue_session(user, client).await
    }

    async fn login(
        &self,
        identifier: &str,
        password: &str,
        client: ClientInfo,
    ) -> Result<AuthSuccess, AuthError> {
        if identifier.trim().is_empty() || password.trim().is_empty() {
            return Err(AuthError::Validation(
                "Username or email and password are required".to_string(),
            ));
        }

        let user = self
            .credentials
            .find_by_username_or_email(identifier.trim())
            .await?;

        // Unknown identifier and wrong password produce the same failure.
        let Some(mut user) = user else {
            return Err(AuthError::InvalidCredentials);
        };

        if !user.is_active {
            return Err(AuthError::AccountDeactivated);
        }

        if !self
            .password_hasher
            .verify(password, &user.password_hash)?
        {
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        user.last_login_at = Some(now);
        user.updated_at = now;
        let user = self.credentials.update(user).await?;

        self.issue_session(user, client).await
    }

    async fn refresh_token(
        &self,
        refresh_secret: &str,
        client: ClientInfo,
    ) -> Result<AuthSuccess, AuthError> {
        let refresh_secret = refresh_secret.trim();
        if refresh_secret.is_empty() {
            return Err(AuthError::Validation(
                "Refresh token is required".to_string(),
            ));
        }

        let Some(mut record) = self.refresh_tokens.find_by_token(refresh_secret).await? else {
            return Err(AuthError::InvalidRefreshToken);
        };

        let now = Utc::now();
        // Expired and revoked are deliberately indistinguishable here.
        if !record.is_valid(now) {
            return Err(AuthError::RefreshTokenNotActive);
        }

        let Some(user) = self.credentials.find_by_id(&record.user_id).await? else {
            return Err(AuthError::InvalidRefreshToken);
        };
        if !user.is_active {
            return Err(AuthError::AccountDeactivated);
        }

        // Revoke the presented token before issuing its replacement. If a
        // concurrent call races us, the worst case is a secret that dies
        // twice, never two live chains from one secret.
        record.revoke(now);
        self.refresh_tokens.update(record).await?;

        self.issue_session(user, client).await
    }

    async fn logout(&self, refresh_secret: &str) -> Result<bool, AuthError> {
        let refresh_secret = refresh_secret.trim();
        if refresh_secret.is_empty() {
            return Ok(false);
        }

        let Some(mut record) = self.refresh_tokens.find_by_token(refresh_secret).await? else {
            return Ok(false);
        };
        if record.is_revoked {
            return Ok(false);
        }

        record.revoke(Utc::now());
        self.refresh_tokens.update(record).await?;

        Ok(true)
    }

    async fn revoke_all_tokens(&self, user_id: &UserId) -> Result<bool, AuthError> {
        let revoked = self
            .refresh_tokens
            .revoke_all_for_user(user_id, Utc::now())
            .await?;

        Ok(revoked > 0)
    }

    async fn change_password(
        &self,
        user_id: &UserId,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if current_password.trim().is_empty() || new_password.trim().is_empty() {
            return Err(AuthError::Validation(
                "Current and new passwords are required".to_string(),
            ));
        }

        let Some(mut user) = self.credentials.find_by_id(user_id).await? else {
            return Err(AuthError::UserNotFound);
        };

        if !self
            .password_hasher
            .verify(current_password, &user.password_hash)?
        {
            return Err(AuthError::InvalidCredentials);
        }

        user.password_hash = self.password_hasher.hash(new_password)?;
        let now = Utc::now();
        user.updated_at = now;
        self.credentials.update(user).await?;

        // Sessions minted under the old password do not outlive it.
        self.refresh_tokens
            .revoke_all_for_user(user_id, now)
            .await?;

        Ok(())
    }

    async fn list_user_tokens(&self, user_id: &UserId) -> Result<Vec<RefreshToken>, AuthError> {
        Ok(self.refresh_tokens.find_all_by_user(user_id).await?)
    }

    async fn purge_expired_tokens(&self) -> Result<u64, AuthError> {
        Ok(self.refresh_tokens.delete_all_expired(Utc::now()).await?)
    }
}
