use std::sync::Arc;

use crate::application::ports::{
    IdentityError, IdentityProvider, RepositoryError, SessionTokens, TokenError, UserRepository,
};
use crate::domain::{IdentityId, User, UserId};

const MIN_PASSWORD_LENGTH: usize = 6;

/// A freshly issued bearer token and the user it belongs to.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

/// Signup, login and credential verification on top of the identity provider.
pub struct AuthService {
    identity_provider: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn SessionTokens>,
}

impl AuthService {
    pub fn new(
        identity_provider: Arc<dyn IdentityProvider>,
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn SessionTokens>,
    ) -> Self {
        Self {
            identity_provider,
            users,
            tokens,
        }
    }

    #[tracing::instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let email = normalize_email(email)?;
        validate_password(password)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let identity_id = self
            .identity_provider
            .sign_up(&email, password)
            .await
            .map_err(AuthError::from_identity)?;

        let user = User::new(email, identity_id);
        self.users.create(&user).await.map_err(|e| match e {
            RepositoryError::ConstraintViolation(_) => AuthError::EmailTaken,
            other => AuthError::Storage(other),
        })?;

        tracing::info!(user_id = %user.id, "User signed up");
        self.issue(user)
    }

    #[tracing::instrument(skip(self, password))]
    pub async fn log_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let email = normalize_email(email)?;
        if password.is_empty() {
            return Err(AuthError::Validation("Password is required".to_string()));
        }

        let identity_id = self
            .identity_provider
            .authenticate(&email, password)
            .await
            .map_err(AuthError::from_identity)?;

        let user = match self.users.find_by_email(&email).await? {
            Some(user) if user.identity_id == identity_id => user,
            Some(user) => {
                tracing::warn!(user_id = %user.id, "Identity mismatch for stored user");
                return Err(AuthError::InvalidCredentials);
            }
            None => self.adopt_identity(email, identity_id).await?,
        };

        tracing::info!(user_id = %user.id, "User logged in");
        self.issue(user)
    }

    /// Resolves a bearer token to the user id it was issued for.
    pub fn verify_token(&self, token: &str) -> Result<UserId, AuthError> {
        self.tokens
            .verify(token)
            .map(|claims| claims.sub)
            .map_err(AuthError::InvalidToken)
    }

    /// Links a provider account that has no local record yet, as left behind
    /// when a signup created the account but failed to store the user.
    async fn adopt_identity(&self, email: String, identity_id: IdentityId) -> Result<User, AuthError> {
        let user = User::new(email, identity_id);
        match self.users.create(&user).await {
            Ok(()) => {
                tracing::warn!(user_id = %user.id, "Created missing local record for authenticated identity");
                Ok(user)
            }
            Err(RepositoryError::ConstraintViolation(_)) => {
                // A concurrent login stored it first.
                match self.users.find_by_email(&user.email).await? {
                    Some(existing) if existing.identity_id == user.identity_id => Ok(existing),
                    _ => Err(AuthError::InvalidCredentials),
                }
            }
            Err(e) => Err(AuthError::Storage(e)),
        }
    }

    fn issue(&self, user: User) -> Result<AuthSession, AuthError> {
        let token = self.tokens.issue(&user).map_err(AuthError::TokenIssue)?;
        Ok(AuthSession { token, user })
    }
}

fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AuthError::Validation("Email is required".to_string()));
    }
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(AuthError::Validation("Email address is invalid".to_string()));
    }
    Ok(email)
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("email already registered")]
    EmailTaken,
    #[error("identity provider: {0}")]
    Provider(IdentityError),
    #[error("storage: {0}")]
    Storage(#[from] RepositoryError),
    #[error("invalid token: {0}")]
    InvalidToken(TokenError),
    #[error("token issue failed: {0}")]
    TokenIssue(TokenError),
}

impl AuthError {
    fn from_identity(error: IdentityError) -> Self {
        match error {
            IdentityError::InvalidCredentials => AuthError::InvalidCredentials,
            IdentityError::EmailExists => AuthError::EmailTaken,
            other => AuthError::Provider(other),
        }
    }
}
