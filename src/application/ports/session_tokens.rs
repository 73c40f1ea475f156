use serde::{Deserialize, Serialize};

use crate::domain::{User, UserId};

/// Claims embedded in a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: UserId,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies the gateway's own signed bearer tokens.
pub trait SessionTokens: Send + Sync {
    fn issue(&self, user: &User) -> Result<String, TokenError>;

    fn verify(&self, token: &str) -> Result<SessionClaims, TokenError>;
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("token signing failed: {0}")]
    Signing(String),
}
