mod firebase_identity_provider;
mod identity_provider_factory;
mod in_memory_identity_provider;

pub use firebase_identity_provider::{FirebaseIdentityProvider, map_error_code};
pub use identity_provider_factory::{IdentityProviderFactory, IdentityProviderKind};
pub use in_memory_identity_provider::InMemoryIdentityProvider;
