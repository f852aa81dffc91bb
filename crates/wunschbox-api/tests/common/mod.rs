//! Shared fixtures for the HTTP integration tests. Each test gets its own
//! in-memory database, so tests never see each other's rows.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use serde_json::{Value, json};
use tower::ServiceExt;

use wunschbox_api::auth::{AppState, AppStateInner};
use wunschbox_api::routes;
use wunschbox_api::suggestions::GiftSuggester;
use wunschbox_db::Database;
use wunschbox_types::api::{GiftSuggestion, SuggestionRequest};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const TEST_PASSWORD: &str = "correct horse battery";

/// Suggester that answers from a fixed list, or fails when built with
/// `failing()`.
pub struct MockSuggester {
    fail: bool,
}

impl MockSuggester {
    pub fn working() -> Self {
        Self { fail: false }
    }

    pub fn failing() -> Self {
        Self { fail: true }
    }
}

#[async_trait]
impl GiftSuggester for MockSuggester {
    async fn suggest(&self, req: &SuggestionRequest) -> anyhow::Result<Vec<GiftSuggestion>> {
        if self.fail {
            anyhow::bail!("upstream unavailable");
        }
        Ok(vec![GiftSuggestion {
            title: format!("Malset für {}", req.child_name),
            description: "Farben und Pinsel".into(),
            estimated_price_range: req.budget.clone(),
        }])
    }
}

pub fn test_state_with(suggester: MockSuggester) -> AppState {
    Arc::new(AppStateInner {
        db: Database::open_in_memory().expect("in-memory database"),
        jwt_secret: TEST_SECRET.into(),
        token_ttl_days: 1,
        suggester: Arc::new(suggester),
    })
}

pub fn create_test_app() -> Router {
    routes::app(test_state_with(MockSuggester::working()))
}

/// A registered account as seen by the client.
pub struct TestUser {
    pub id: String,
    pub name: String,
    pub token: String,
}

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn parse_response_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}

pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub fn json_request_with_auth(method: Method, uri: &str, body: Value, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub fn request_with_auth(method: Method, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

pub fn get_request_with_auth(uri: &str, token: &str) -> Request<Body> {
    request_with_auth(Method::GET, uri, token)
}

async fn register(app: &Router, body: Value) -> TestUser {
    let response = send(app, json_request(Method::POST, "/api/auth/register", body)).await;
    let status = response.status();
    let json = parse_response_body(response).await;
    if status != StatusCode::CREATED {
        panic!("Registration failed with status: {}, body: {}", status, json);
    }

    TestUser {
        id: json["user"]["id"].as_str().unwrap().to_string(),
        name: json["user"]["name"].as_str().unwrap().to_string(),
        token: json["token"].as_str().unwrap().to_string(),
    }
}

/// Self-registration always yields a parent.
pub async fn register_parent(app: &Router, name: &str, email: &str) -> TestUser {
    register(
        app,
        json!({ "name": name, "email": email, "password": TEST_PASSWORD }),
    )
    .await
}

/// Issues an invitation as `parent` and redeems it.
pub async fn invite_relative(app: &Router, parent: &TestUser, name: &str, email: &str) -> TestUser {
    let token = create_invitation(app, parent, name, "RELATIVE").await;
    register(
        app,
        json!({
            "name": name,
            "email": email,
            "password": TEST_PASSWORD,
            "invitationToken": token,
        }),
    )
    .await
}

/// Returns the invitation token.
pub async fn create_invitation(app: &Router, parent: &TestUser, guest: &str, role: &str) -> String {
    let response = send(
        app,
        json_request_with_auth(
            Method::POST,
            "/api/invitations",
            json!({ "guestName": guest, "guestRoleDescription": "Oma", "targetRole": role }),
            &parent.token,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = parse_response_body(response).await;
    body["token"].as_str().unwrap().to_string()
}

/// Returns the new gift's id.
pub async fn create_gift(app: &Router, parent: &TestUser, body: Value) -> String {
    let response = send(
        app,
        json_request_with_auth(Method::POST, "/api/gifts", body, &parent.token),
    )
    .await;
    let status = response.status();
    let json = parse_response_body(response).await;
    assert_eq!(status, StatusCode::CREATED, "create gift failed: {}", json);
    json["id"].as_str().unwrap().to_string()
}
