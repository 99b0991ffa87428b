#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test;
use async_trait::async_trait;
use serde_json::{json, Value};
use taskledger::auth::TokenService;
use taskledger::models::{NewUser, User};
use taskledger::store::{MemoryUserStore, UserStore};
use taskledger::{AppError, AppState};
use tokio::sync::oneshot;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret";

/// App state over a fresh in-memory store. The store handle is returned so tests can
/// inspect what was actually persisted.
pub fn test_state() -> (AppState, Arc<dyn UserStore>) {
    let store: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new());
    (state_over(Arc::clone(&store)), store)
}

pub fn state_over(store: Arc<dyn UserStore>) -> AppState {
    AppState::with_tokens(
        store,
        TokenService::new(TEST_SECRET, 30),
        "http://localhost:5000",
    )
}

type SaveGate = (oneshot::Sender<()>, oneshot::Receiver<()>);

/// In-memory store whose next `save` can be held until the test releases it, so a
/// second request can run between one request's load and its save.
pub struct PausingStore {
    inner: MemoryUserStore,
    gate: Mutex<Option<SaveGate>>,
}

impl PausingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryUserStore::new(),
            gate: Mutex::new(None),
        }
    }

    /// Arms the gate. The first receiver fires once a save is parked; sending on the
    /// returned sender lets that save through.
    pub fn pause_next_save(&self) -> (oneshot::Receiver<()>, oneshot::Sender<()>) {
        let (reached_tx, reached_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        *self.gate.lock().unwrap() = Some((reached_tx, release_rx));
        (reached_rx, release_tx)
    }
}

#[async_trait]
impl UserStore for PausingStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.inner.find_by_email(email).await
    }

    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        self.inner.create(user).await
    }

    async fn save(&self, user: &User) -> Result<User, AppError> {
        let gate = self.gate.lock().unwrap().take();
        if let Some((reached, release)) = gate {
            reached.send(()).unwrap();
            release.await.unwrap();
        }
        self.inner.save(user).await
    }
}

pub struct TestUser {
    pub id: String,
    pub token: String,
}

/// Sends a request and returns the status with the decoded JSON body (`Null` if empty).
pub async fn send(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    req: test::TestRequest,
) -> (StatusCode, Value) {
    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status();
    let bytes = test::read_body(resp).await;
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub async fn register_and_login(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
) -> TestUser {
    let (status, body) = send(
        app,
        test::TestRequest::post()
            .uri("/api/users/register")
            .set_json(json!({
                "username": "Test User",
                "email": email,
                "password": "password123"
            })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");

    let (status, body) = send(
        app,
        test::TestRequest::post()
            .uri("/api/users/login")
            .set_json(json!({ "email": email, "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");

    TestUser {
        id: body["user"]["id"].as_str().unwrap().to_string(),
        token: body["user"]["accessToken"].as_str().unwrap().to_string(),
    }
}

pub fn bearer(user: &TestUser) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", user.token))
}
