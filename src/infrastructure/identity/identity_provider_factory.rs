use std::sync::Arc;

use serde::Deserialize;

use crate::application::ports::{IdentityError, IdentityProvider};
use crate::presentation::config::IdentitySettings;

use super::{FirebaseIdentityProvider, InMemoryIdentityProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityProviderKind {
    Memory,
    Firebase,
}

pub struct IdentityProviderFactory;

impl IdentityProviderFactory {
    pub fn create(
        settings: &IdentitySettings,
    ) -> Result<Arc<dyn IdentityProvider>, IdentityError> {
        match settings.provider {
            IdentityProviderKind::Memory => {
                tracing::warn!("Using in-memory identity provider; accounts are lost on restart");
                Ok(Arc::new(InMemoryIdentityProvider::new()))
            }
            IdentityProviderKind::Firebase => {
                let api_key = settings.api_key.clone().ok_or_else(|| {
                    IdentityError::Unavailable("identity.api_key required for firebase".to_string())
                })?;
                Ok(Arc::new(FirebaseIdentityProvider::new(
                    api_key,
                    settings.base_url.clone(),
                )))
            }
        }
    }
}
