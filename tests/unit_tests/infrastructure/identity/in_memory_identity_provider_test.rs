use medassist::application::ports::{IdentityError, IdentityProvider};
use medassist::infrastructure::identity::InMemoryIdentityProvider;

fn provider() -> InMemoryIdentityProvider {
    InMemoryIdentityProvider::low_cost().unwrap()
}

#[tokio::test]
async fn given_signed_up_account_when_authenticating_then_returns_same_identity() {
    let provider = provider();

    let created = provider.sign_up("a@example.com", "pw123456").await.unwrap();
    let authenticated = provider.authenticate("a@example.com", "pw123456").await.unwrap();

    assert_eq!(created, authenticated);
}

#[tokio::test]
async fn given_existing_email_when_signing_up_then_returns_email_exists() {
    let provider = provider();
    provider.sign_up("a@example.com", "pw123456").await.unwrap();

    let result = provider.sign_up("a@example.com", "other123").await;

    assert!(matches!(result, Err(IdentityError::EmailExists)));
}

#[tokio::test]
async fn given_wrong_password_or_unknown_email_when_authenticating_then_returns_invalid_credentials()
 {
    let provider = provider();
    provider.sign_up("a@example.com", "pw123456").await.unwrap();

    assert!(matches!(
        provider.authenticate("a@example.com", "nope").await,
        Err(IdentityError::InvalidCredentials)
    ));
    assert!(matches!(
        provider.authenticate("b@example.com", "pw123456").await,
        Err(IdentityError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn given_same_password_for_two_accounts_when_signing_up_then_identities_differ() {
    let provider = provider();

    let first = provider.sign_up("a@example.com", "shared-pw").await.unwrap();
    let second = provider.sign_up("b@example.com", "shared-pw").await.unwrap();

    assert_ne!(first, second);
}

#[tokio::test]
async fn given_signed_up_account_when_inspecting_storage_then_password_is_salted_argon2id_phc() {
    let provider = provider();
    provider.sign_up("a@example.com", "shared-pw").await.unwrap();
    provider.sign_up("b@example.com", "shared-pw").await.unwrap();

    let first = provider.stored_hash("a@example.com").await.unwrap();
    let second = provider.stored_hash("b@example.com").await.unwrap();

    assert!(first.starts_with("$argon2id$"));
    assert!(!first.contains("shared-pw"));
    assert_ne!(first, second);
}

#[tokio::test]
async fn given_default_cost_when_round_tripping_then_authenticates() {
    let provider = InMemoryIdentityProvider::new();

    let created = provider.sign_up("a@example.com", "pw123456").await.unwrap();

    assert_eq!(provider.authenticate("a@example.com", "pw123456").await.unwrap(), created);
}
