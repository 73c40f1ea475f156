use async_trait::async_trait;

use crate::domain::IdentityId;

/// External credential authority. Both calls return the durable identity id.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<IdentityId, IdentityError>;

    async fn authenticate(&self, email: &str, password: &str)
    -> Result<IdentityId, IdentityError>;
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("email already registered")]
    EmailExists,
    #[error("rejected by identity provider: {0}")]
    Rejected(String),
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}
