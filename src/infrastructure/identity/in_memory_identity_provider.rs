use std::collections::HashMap;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::application::ports::{IdentityError, IdentityProvider};
use crate::domain::IdentityId;

struct Account {
    identity_id: IdentityId,
    /// Argon2id hash in PHC string form.
    password_hash: String,
}

/// Credential store kept in process memory, hashing passwords with Argon2id.
pub struct InMemoryIdentityProvider {
    accounts: RwLock<HashMap<String, Account>>,
    hasher: Argon2<'static>,
}

impl Default for InMemoryIdentityProvider {
    fn default() -> Self {
        Self::with_hasher(Argon2::default())
    }
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cheap Argon2id parameters for test suites that sign up many users.
    pub fn low_cost() -> Result<Self, IdentityError> {
        let params = Params::new(1024, 1, 1, None)
            .map_err(|e| IdentityError::Rejected(format!("argon2 params: {}", e)))?;
        Ok(Self::with_hasher(Argon2::new(
            Algorithm::Argon2id,
            Version::V0x13,
            params,
        )))
    }

    pub fn with_hasher(hasher: Argon2<'static>) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            hasher,
        }
    }

    /// PHC string stored for `email`, if the account exists.
    pub async fn stored_hash(&self, email: &str) -> Option<String> {
        self.accounts
            .read()
            .await
            .get(email)
            .map(|account| account.password_hash.clone())
    }

    async fn hash(&self, password: &str) -> Result<String, IdentityError> {
        let hasher = self.hasher.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            hasher
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
        })
        .await
        .map_err(|e| IdentityError::Unavailable(format!("hashing task: {}", e)))?
        .map_err(|e| IdentityError::Rejected(format!("password hashing: {}", e)))
    }

    async fn verify(&self, password: &str, stored: String) -> Result<bool, IdentityError> {
        let hasher = self.hasher.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || {
            PasswordHash::new(&stored)
                .map(|parsed| hasher.verify_password(password.as_bytes(), &parsed).is_ok())
        })
        .await
        .map_err(|e| IdentityError::Unavailable(format!("hashing task: {}", e)))?
        .map_err(|e| IdentityError::Rejected(format!("stored hash: {}", e)))
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<IdentityId, IdentityError> {
        if self.accounts.read().await.contains_key(email) {
            return Err(IdentityError::EmailExists);
        }

        let password_hash = self.hash(password).await?;

        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(email) {
            return Err(IdentityError::EmailExists);
        }
        let identity_id = IdentityId::new(Uuid::new_v4().simple().to_string());
        accounts.insert(
            email.to_string(),
            Account {
                identity_id: identity_id.clone(),
                password_hash,
            },
        );

        tracing::debug!(identity_id = %identity_id.as_str(), "Local identity created");
        Ok(identity_id)
    }

    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IdentityId, IdentityError> {
        let (identity_id, stored) = {
            let accounts = self.accounts.read().await;
            let account = accounts
                .get(email)
                .ok_or(IdentityError::InvalidCredentials)?;
            (account.identity_id.clone(), account.password_hash.clone())
        };

        if !self.verify(password, stored).await? {
            return Err(IdentityError::InvalidCredentials);
        }
        Ok(identity_id)
    }
}
