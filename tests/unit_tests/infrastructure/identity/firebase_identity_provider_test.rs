use axum::Json;
use axum::Router;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use serde_json::{Value, json};
use std::collections::HashMap;

use medassist::application::ports::{IdentityError, IdentityProvider};
use medassist::infrastructure::identity::{FirebaseIdentityProvider, map_error_code};

use crate::helpers::spawn_mock_server;

async fn sign_up(Query(params): Query<HashMap<String, String>>, Json(body): Json<Value>) -> impl IntoResponse {
    if params.get("key").map(String::as_str) != Some("test-key") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": {"message": "API_KEY_INVALID"}})),
        );
    }
    if body["email"] == "taken@example.com" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": {"message": "EMAIL_EXISTS"}})),
        );
    }
    (StatusCode::OK, Json(json!({"localId": "firebase-uid-1", "idToken": "ignored"})))
}

async fn sign_in(Json(body): Json<Value>) -> impl IntoResponse {
    if body["password"] == "correct-horse" {
        (StatusCode::OK, Json(json!({"localId": "firebase-uid-1"})))
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": {"message": "INVALID_LOGIN_CREDENTIALS"}})),
        )
    }
}

async fn start_identity_server() -> (String, tokio::sync::oneshot::Sender<()>) {
    let app = Router::new()
        .route("/accounts:signUp", post(sign_up))
        .route("/accounts:signInWithPassword", post(sign_in));
    spawn_mock_server(app).await
}

#[tokio::test]
async fn given_new_account_when_signing_up_then_returns_local_id() {
    let (base_url, shutdown_tx) = start_identity_server().await;
    let provider = FirebaseIdentityProvider::new("test-key".to_string(), Some(base_url));

    let identity = provider.sign_up("new@example.com", "secret123").await.unwrap();

    assert_eq!(identity.as_str(), "firebase-uid-1");
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_taken_email_when_signing_up_then_returns_email_exists() {
    let (base_url, shutdown_tx) = start_identity_server().await;
    let provider = FirebaseIdentityProvider::new("test-key".to_string(), Some(base_url));

    let result = provider.sign_up("taken@example.com", "secret123").await;

    assert!(matches!(result, Err(IdentityError::EmailExists)));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_wrong_password_when_authenticating_then_returns_invalid_credentials() {
    let (base_url, shutdown_tx) = start_identity_server().await;
    let provider = FirebaseIdentityProvider::new("test-key".to_string(), Some(base_url));

    assert!(
        provider
            .authenticate("new@example.com", "correct-horse")
            .await
            .is_ok()
    );
    assert!(matches!(
        provider.authenticate("new@example.com", "wrong").await,
        Err(IdentityError::InvalidCredentials)
    ));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_unreachable_provider_when_signing_up_then_returns_unavailable() {
    let provider =
        FirebaseIdentityProvider::new("k".to_string(), Some("http://127.0.0.1:1".to_string()));

    let result = provider.sign_up("a@example.com", "secret123").await;

    assert!(matches!(result, Err(IdentityError::Unavailable(_))));
}

#[test]
fn given_error_codes_when_mapping_then_distinguishes_conflicts_and_bad_credentials() {
    assert!(matches!(map_error_code("EMAIL_EXISTS"), IdentityError::EmailExists));
    assert!(matches!(
        map_error_code("EMAIL_NOT_FOUND"),
        IdentityError::InvalidCredentials
    ));
    assert!(matches!(
        map_error_code("INVALID_PASSWORD"),
        IdentityError::InvalidCredentials
    ));
    assert!(matches!(
        map_error_code("WEAK_PASSWORD : Password should be at least 6 characters"),
        IdentityError::Rejected(_)
    ));
}
