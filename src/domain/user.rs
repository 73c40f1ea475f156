use chrono::{DateTime, Utc};
use serde::Serialize;

use super::UserId;

/// Identifier issued by the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct IdentityId(String);

impl IdentityId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub identity_id: IdentityId,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, identity_id: IdentityId) -> Self {
        Self {
            id: UserId::new(),
            email,
            identity_id,
            created_at: Utc::now(),
        }
    }
}
