use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use medassist::application::ports::SessionTokens;
use medassist::application::services::{
    AuthService, ChatOrchestrator, ResponseGenerator, SessionStore, TranscriptionService,
};
use medassist::domain::{IdentityId, User};
use medassist::infrastructure::auth::HmacSessionTokens;
use medassist::infrastructure::identity::InMemoryIdentityProvider;
use medassist::infrastructure::persistence::{
    InMemoryConversationRepository, InMemoryPatientRepository, InMemoryUserRepository,
};
use medassist::presentation::{AppState, create_router};

use crate::helpers::{FixedTranscriptionEngine, ScriptedLlmClient, fast_options};

const PASSWORD: &str = "correct-horse-battery";
const BOUNDARY: &str = "medassist-test-boundary";

struct TestApp {
    router: Router,
    llm: Arc<ScriptedLlmClient>,
}

impl TestApp {
    fn new() -> Self {
        Self::with_llm(ScriptedLlmClient::new())
    }

    fn with_llm(llm: ScriptedLlmClient) -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let conversations = Arc::new(InMemoryConversationRepository::new());
        let llm = Arc::new(llm);
        let engine = Arc::new(FixedTranscriptionEngine::new("My knee hurts"));
        let transcription = Arc::new(TranscriptionService::with_limit(engine, 1024));

        let auth_service = Arc::new(AuthService::new(
            Arc::new(InMemoryIdentityProvider::low_cost().unwrap()),
            users.clone(),
            Arc::new(HmacSessionTokens::new("api-test-secret", chrono::Duration::minutes(5))),
        ));
        let chatbot = Arc::new(ChatOrchestrator::new(
            users,
            conversations.clone(),
            Arc::new(SessionStore::default()),
            Arc::clone(&transcription),
            ResponseGenerator::new(llm.clone()),
            fast_options(1, Default::default()),
        ));

        let router = create_router(AppState {
            auth_service,
            chatbot,
            transcription,
            patients: Arc::new(InMemoryPatientRepository::new()),
            conversations,
        });

        Self { router, llm }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn signup(&self, email: &str) -> String {
        let (status, body) = self
            .send(json_request(
                "POST",
                "/api/auth/signup",
                None,
                json!({"email": email, "password": PASSWORD}),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn multipart_request(token: &str, field: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"clip.wav\"\r\nContent-Type: audio/wav\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/voice")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn given_running_app_when_checking_health_then_reports_healthy() {
    let app = TestApp::new();

    let (status, body) = app.send(get_request("/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["active_sessions"], 0);
}

#[tokio::test]
async fn given_new_email_when_signing_up_then_returns_token_and_user() {
    let app = TestApp::new();

    let (status, body) = app
        .send(json_request(
            "POST",
            "/api/auth/signup",
            None,
            json!({"email": "Nurse@Example.com", "password": PASSWORD}),
        ))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["token"].as_str().is_some_and(|t| t.split('.').count() == 3));
    assert_eq!(body["user"]["email"], "nurse@example.com");
}

#[tokio::test]
async fn given_registered_email_when_signing_up_again_then_bad_request() {
    let app = TestApp::new();
    app.signup("dup@example.com").await;

    let (status, body) = app
        .send(json_request(
            "POST",
            "/api/auth/signup",
            None,
            json!({"email": "dup@example.com", "password": PASSWORD}),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already registered");
}

#[tokio::test]
async fn given_malformed_json_when_signing_up_then_bad_request() {
    let app = TestApp::new();
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/signup")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn given_registered_user_when_logging_in_then_returns_token() {
    let app = TestApp::new();
    app.signup("login@example.com").await;

    let (status, body) = app
        .send(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"email": "login@example.com", "password": PASSWORD}),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn given_wrong_password_when_logging_in_then_unauthorized() {
    let app = TestApp::new();
    app.signup("login@example.com").await;

    let (status, body) = app
        .send(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"email": "login@example.com", "password": "not-the-password"}),
        ))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn given_no_token_when_listing_patients_then_unauthorized() {
    let app = TestApp::new();

    let (status, _) = app.send(get_request("/api/patients", None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn given_forged_token_when_listing_patients_then_forbidden() {
    let app = TestApp::new();
    let forged = HmacSessionTokens::new("another-secret", chrono::Duration::minutes(5))
        .issue(&User::new("x@example.com".to_string(), IdentityId::new("x")))
        .unwrap();

    let (status, body) = app.send(get_request("/api/patients", Some(&forged))).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Invalid or expired token");
}

#[tokio::test]
async fn given_unknown_patient_id_when_fetching_then_not_found() {
    let app = TestApp::new();
    let token = app.signup("gp@example.com").await;

    for uri in ["/api/patients/999", "/api/patients/abc"] {
        let (status, body) = app.send(get_request(uri, Some(&token))).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Patient not found"}));
    }
}

#[tokio::test]
async fn given_created_patient_when_fetching_then_owner_sees_it_and_others_do_not() {
    let app = TestApp::new();
    let owner = app.signup("owner@example.com").await;
    let stranger = app.signup("stranger@example.com").await;

    let (status, created) = app
        .send(json_request(
            "POST",
            "/api/patients",
            Some(&owner),
            json!({"name": "Ola Nordmann", "date_of_birth": "1970-01-31", "gender": "male"}),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/patients/{}", created["id"]);

    let (status, fetched) = app.send(get_request(&uri, Some(&owner))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Ola Nordmann");
    assert_eq!(fetched["date_of_birth"], "1970-01-31");

    let (status, _) = app.send(get_request(&uri, Some(&stranger))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, listed) = app.send(get_request("/api/patients", Some(&stranger))).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn given_blank_name_when_creating_patient_then_bad_request() {
    let app = TestApp::new();
    let token = app.signup("gp@example.com").await;

    let (status, body) = app
        .send(json_request("POST", "/api/patients", Some(&token), json!({"name": "  "})))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Patient name is required");
}

#[tokio::test]
async fn given_text_message_when_chatting_then_reply_is_returned_and_listed() {
    let app = TestApp::new();
    let token = app.signup("chat@example.com").await;

    let (status, reply) = app
        .send(json_request(
            "POST",
            "/api/chat",
            Some(&token),
            json!({"type": "text", "content": "Is ibuprofen safe with coffee?"}),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["type"], "reply");
    assert_eq!(reply["persisted"], true);
    assert_eq!(app.llm.call_count(), 1);

    let (status, listing) = app
        .send(get_request("/api/conversations?limit=5", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["total"], 1);
    assert_eq!(listing["turns"][0]["input_kind"], "text");
    assert_eq!(listing["turns"][0]["input_text"], "Is ibuprofen safe with coffee?");
}

#[tokio::test]
async fn given_blank_message_when_chatting_then_validation_error() {
    let app = TestApp::new();
    let token = app.signup("chat@example.com").await;

    let (status, reply) = app
        .send(json_request(
            "POST",
            "/api/chat",
            Some(&token),
            json!({"type": "text", "content": "   "}),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(reply["error"], "Message content must not be empty");
    assert_eq!(app.llm.call_count(), 0);
}

#[tokio::test]
async fn given_audio_upload_when_posting_voice_then_returns_transcript() {
    let app = TestApp::new();
    let token = app.signup("voice@example.com").await;

    let (status, body) = app
        .send(multipart_request(&token, "audio", b"RIFF\x24\x00\x00\x00WAVEfmt "))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"text": "My knee hurts"}));
}

#[tokio::test]
async fn given_upload_without_audio_field_when_posting_voice_then_bad_request() {
    let app = TestApp::new();
    let token = app.signup("voice@example.com").await;

    let (status, body) = app
        .send(multipart_request(&token, "attachment", b"RIFF"))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No audio file uploaded");
}

#[tokio::test]
async fn given_audio_over_limit_when_posting_voice_then_bad_request() {
    let app = TestApp::new();
    let token = app.signup("voice@example.com").await;

    let (status, _) = app
        .send(multipart_request(&token, "audio", &vec![0u8; 2048]))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn given_overlong_message_when_chatting_then_error_reply_with_validation_kind() {
    let app = TestApp::new();
    let token = app.signup("chat@example.com").await;

    let (status, reply) = app
        .send(json_request(
            "POST",
            "/api/chat",
            Some(&token),
            json!({"type": "text", "content": "a".repeat(4001)}),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["kind"], "validation_error");
}

#[tokio::test]
async fn given_no_token_when_chatting_then_unauthorized_and_model_is_not_called() {
    let app = TestApp::new();

    let (status, _) = app
        .send(json_request(
            "POST",
            "/api/chat",
            None,
            json!({"type": "text", "content": "hello"}),
        ))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.llm.call_count(), 0);
}

#[tokio::test]
async fn given_forged_token_when_chatting_then_forbidden_and_model_is_not_called() {
    let app = TestApp::new();
    app.signup("real@example.com").await;
    let forged = HmacSessionTokens::new("another-secret", chrono::Duration::minutes(5))
        .issue(&User::new("real@example.com".to_string(), IdentityId::new("x")))
        .unwrap();

    let (status, _) = app
        .send(json_request(
            "POST",
            "/api/chat",
            Some(&forged),
            json!({"type": "text", "content": "hello"}),
        ))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(app.llm.call_count(), 0);
}

#[tokio::test]
async fn given_client_hangs_up_mid_turn_when_chatting_then_turn_is_still_persisted() {
    let app = TestApp::with_llm(ScriptedLlmClient::new().with_delay(Duration::from_millis(200)));
    let token = app.signup("hangup@example.com").await;

    let request = json_request(
        "POST",
        "/api/chat",
        Some(&token),
        json!({"type": "text", "content": "are you still there?"}),
    );
    let abandoned =
        tokio::time::timeout(Duration::from_millis(50), app.router.clone().oneshot(request)).await;
    assert!(abandoned.is_err());

    tokio::time::sleep(Duration::from_millis(400)).await;

    let (_, listing) = app
        .send(get_request("/api/conversations", Some(&token)))
        .await;
    assert_eq!(listing["total"], 1);
    assert_eq!(listing["turns"][0]["output_text"], "Reply to: are you still there?");
}
