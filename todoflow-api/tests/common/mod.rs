#![allow(dead_code)]
//! Common test utilities for integration tests
//!
//! - Router over a fresh in-memory store
//! - Session tokens for two independent users
//! - Shutdown token shared with the router's streams
//! - Request helpers returning status and parsed JSON body

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::Value;
use todoflow_api::app::{build_router, AppState};
use todoflow_api::config::Config;
use todoflow_shared::auth::jwt::{create_token, Claims, TokenType};
use todoflow_shared::events::ChangeHub;
use todoflow_shared::service::TodoService;
use todoflow_shared::store::InMemoryTodoStore;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Test context containing the router and two users
pub struct TestContext {
    pub app: axum::Router,
    pub config: Config,
    pub alice_id: Uuid,
    pub alice_token: String,
    pub bob_id: Uuid,
    pub bob_token: String,
    pub shutdown: CancellationToken,
}

impl TestContext {
    pub fn new() -> Self {
        let config = Config::from_lookup(|key| match key {
            "JWT_SECRET" => Some(TEST_SECRET.to_string()),
            _ => None,
        })
        .expect("Failed to build test config");

        let service = TodoService::new(
            Arc::new(InMemoryTodoStore::new()),
            ChangeHub::new(config.events.channel_capacity),
        );
        let state = AppState::new(service, config.clone());
        let shutdown = state.shutdown_token();
        let app = build_router(state);

        let alice_id = Uuid::new_v4();
        let bob_id = Uuid::new_v4();

        TestContext {
            app,
            config,
            alice_id,
            alice_token: token_for(alice_id),
            bob_id,
            bob_token: token_for(bob_id),
            shutdown,
        }
    }

    /// Sends a request and returns status plus JSON body (`Null` if the body isn't JSON)
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, json)
    }

    /// Creates a todo as the given user and returns its ID
    pub async fn create_todo(&self, token: &str, body: Value) -> Uuid {
        let (status, json) = self.send("POST", "/v1/todos", Some(token), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", json);

        json["id"]
            .as_str()
            .and_then(|id| Uuid::parse_str(id).ok())
            .expect("create response should contain an id")
    }
}

pub fn token_for(user_id: Uuid) -> String {
    create_token(&Claims::new(user_id, TokenType::Access), TEST_SECRET).unwrap()
}
