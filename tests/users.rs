mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use pretty_assertions::assert_eq;
use serde_json::json;
use taskledger::build_app;

use common::{send, test_state};

#[actix_rt::test]
async fn test_register_and_login_flow() {
    let (state, store) = test_state();
    let app = test::init_service(build_app(state)).await;

    let register_payload = json!({
        "username": "Integration User",
        "email": "Integration@Example.com",
        "password": "Password123!"
    });
    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/users/register")
            .set_json(&register_payload),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "Registration failed: {body}");
    assert_eq!(body["email"], "integration@example.com");
    assert_eq!(body["username"], "Integration User");
    assert!(body["_id"].is_string());
    let keys: Vec<&String> = body.as_object().unwrap().keys().collect();
    assert_eq!(keys.len(), 3, "unexpected fields in {body}");
    assert!(!body.to_string().contains("Password123!"));
    assert!(!body.to_string().contains("$2"));

    // The stored hash is a real bcrypt hash, not the password.
    let stored = store
        .find_by_email("integration@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_ne!(stored.password_hash, "Password123!");

    // Same email, different case: still a duplicate.
    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/users/register")
            .set_json(json!({
                "username": "Someone Else",
                "email": "INTEGRATION@example.com",
                "password": "another-password"
            })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User already exists");

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/users/login")
            .set_json(json!({
                "email": "integration@example.com",
                "password": "Password123!"
            })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "Login failed: {body}");
    assert_eq!(body["user"]["email"], "integration@example.com");
    assert_eq!(body["user"]["username"], "Integration User");
    assert_eq!(body["user"]["id"], json!(stored.id));
    assert!(!body["user"]["accessToken"].as_str().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_bad_credentials_are_401() {
    let (state, _store) = test_state();
    let app = test::init_service(build_app(state)).await;
    common::register_and_login(&app, "known@example.com").await;

    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/users/login")
            .set_json(json!({ "email": "known@example.com", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/users/login")
            .set_json(json!({ "email": "unknown@example.com", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Email or password is not valid");
}

#[actix_rt::test]
async fn test_register_rejects_missing_and_invalid_fields() {
    let (state, _store) = test_state();
    let app = test::init_service(build_app(state)).await;

    let cases = [
        json!({ "email": "a@example.com", "password": "password123" }),
        json!({ "username": "Ada", "password": "password123" }),
        json!({ "username": "Ada", "email": "a@example.com" }),
        json!({ "username": "   ", "email": "a@example.com", "password": "password123" }),
        json!({ "username": "Ada_99", "email": "a@example.com", "password": "password123" }),
        json!({ "username": "Ada", "email": "not-an-email", "password": "password123" }),
        json!({ "username": "Ada", "email": "a@example.com", "password": "123" }),
    ];
    for payload in cases {
        let (status, body) = send(
            &app,
            test::TestRequest::post()
                .uri("/api/users/register")
                .set_json(&payload),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload} gave {body}");
        assert!(body["error"].is_string());
    }

    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/users/login")
            .set_json(json!({ "email": "a@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_openapi_document_is_served() {
    let (state, _store) = test_state();
    let app = test::init_service(build_app(state)).await;

    let (status, body) = send(&app, test::TestRequest::get().uri("/api-docs/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/tasks/{task_id}/subtasks"].is_object());
    assert_eq!(body["servers"][0]["url"], "http://localhost:5000");
}
