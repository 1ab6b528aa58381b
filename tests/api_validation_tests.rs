// SPDX-License-Identifier: MIT

//! Input validation tests.
//!
//! All of these must fail with 400 before any storage access, so they
//! run against the offline mock database.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

async fn post_json(app: axum::Router, uri: &str, token: Option<&str>, body: serde_json::Value) -> StatusCode {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    app.oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn test_signup_short_password_rejected() {
    let (app, _) = common::create_test_app();

    let status = post_json(
        app,
        "/api/auth/signup",
        None,
        serde_json::json!({
            "name": "Alice",
            "email": "alice@example.com",
            "password": "short"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_signup_password_length_counted_in_characters() {
    let (app, _) = common::create_test_app();

    // Seven characters but eleven bytes; a byte count would let it pass.
    let status = post_json(
        app,
        "/api/auth/signup",
        None,
        serde_json::json!({
            "name": "Alice",
            "email": "alice@example.com",
            "password": "ñañañañ"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_signup_blank_fields_rejected() {
    let (app, _) = common::create_test_app();

    let status = post_json(
        app,
        "/api/auth/signup",
        None,
        serde_json::json!({
            "name": "   ",
            "email": "alice@example.com",
            "password": "long enough password"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_add_member_unrecognized_role_rejected() {
    let (app, state) = common::create_test_app();
    let token = common::test_access_token("user-1", &state.config);

    // Role parsing happens before the project lookup.
    let status = post_json(
        app,
        "/api/projects/p1/members",
        Some(&token),
        serde_json::json!({ "email": "bob@example.com", "role": "owner" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_todo_blank_title_rejected() {
    let (app, state) = common::create_test_app();
    let token = common::test_access_token("user-1", &state.config);

    let status = post_json(
        app,
        "/api/todos",
        Some(&token),
        serde_json::json!({ "title": "   " }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_list_unrecognized_kind_rejected() {
    let (app, state) = common::create_test_app();
    let token = common::test_access_token("user-1", &state.config);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/health?kind=meditation")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_create_unknown_type_rejected() {
    let (app, state) = common::create_test_app();
    let token = common::test_access_token("user-1", &state.config);

    // The tagged union rejects unknown variants at deserialization.
    let status = post_json(
        app,
        "/api/health",
        Some(&token),
        serde_json::json!({ "type": "meditation", "minutes": 20 }),
    )
    .await;

    assert!(
        status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY,
        "unexpected status: {}",
        status
    );
}

#[tokio::test]
async fn test_create_project_blank_name_rejected() {
    let (app, state) = common::create_test_app();
    let token = common::test_access_token("user-1", &state.config);

    let status = post_json(
        app,
        "/api/projects",
        Some(&token),
        serde_json::json!({ "name": "", "kind": "todo" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
