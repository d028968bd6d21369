//! HTTP Integration Tests for Conversation Parsing
//!
//! Tests endpoint-aware option parsing, the compact form, conversation
//! validation, and response sender naming.
//!
//! Run with: `cargo test --test convos_test -- --nocapture`

mod helpers;

use axum::http::Method;
use helpers::{body_to_json, TestApp, ALICE_ID};
use serde_json::json;

async fn post(app: &TestApp, uri: &str, body: serde_json::Value) -> (u16, serde_json::Value) {
    let resp = app
        .send_json(Method::POST, uri, &app.token_for(ALICE_ID), &body)
        .await;
    let status = resp.status().as_u16();
    (status, body_to_json(resp).await)
}

// ============================================================================
// Parse
// ============================================================================

#[tokio::test]
async fn test_parse_keeps_schema_fields() {
    let app = TestApp::new();

    let (status, json) = post(
        &app,
        "/api/convos/parse",
        json!({
            "endpoint": "openAI",
            "conversation": {
                "conversationId": "c1",
                "model": "gpt-4o",
                "temperature": 0.7,
                "chatGptLabel": "Helper",
                "topK": 5,
                "unknown": true
            }
        }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(json["endpoint"], "openAI");
    assert_eq!(
        json["conversation"],
        json!({ "model": "gpt-4o", "temperature": 0.7, "modelLabel": "Helper" })
    );
}

#[tokio::test]
async fn test_compact_parse_drops_defaults() {
    let app = TestApp::new();

    let (status, json) = post(
        &app,
        "/api/convos/parse",
        json!({
            "endpoint": "openAI",
            "compact": true,
            "conversation": { "model": "gpt-4o", "temperature": 1, "top_p": 0.5 }
        }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(json["conversation"], json!({ "model": "gpt-4o", "top_p": 0.5 }));
}

#[tokio::test]
async fn test_possible_values_override_model() {
    let app = TestApp::new();

    let (status, json) = post(
        &app,
        "/api/convos/parse",
        json!({
            "endpoint": "my-proxy",
            "endpointType": "custom",
            "conversation": { "model": "stale" },
            "possibleValues": { "models": ["", "llama-3"] }
        }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(json["endpoint"], "my-proxy");
    assert_eq!(json["conversation"]["model"], "llama-3");
}

#[tokio::test]
async fn test_endpoint_without_schema() {
    let app = TestApp::new();

    let (status, json) = post(
        &app,
        "/api/convos/parse",
        json!({ "endpoint": "chatGPTBrowser", "conversation": { "model": "x" } }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(json["error"], "UNSUPPORTED_ENDPOINT");
}

#[tokio::test]
async fn test_endpoint_required() {
    let app = TestApp::new();

    let (status, json) = post(
        &app,
        "/api/convos/parse",
        json!({ "endpoint": "", "conversation": {} }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(json["error"], "VALIDATION_ERROR");
    assert_eq!(json["issues"][0]["path"][0], "endpoint");
}

// ============================================================================
// Validate
// ============================================================================

#[tokio::test]
async fn test_validate_fills_default_title() {
    let app = TestApp::new();

    let (status, json) = post(
        &app,
        "/api/convos/validate",
        json!({
            "conversationId": "c1",
            "endpoint": "anthropic",
            "createdAt": "2025-01-01T00:00:00.000Z",
            "updatedAt": "2025-01-01T00:00:00.000Z",
            "maxContextTokens": "8000"
        }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(json["title"], "New Chat");
    assert_eq!(json["maxContextTokens"], 8000);
}

#[tokio::test]
async fn test_validate_requires_conversation_id() {
    let app = TestApp::new();

    let (status, json) = post(
        &app,
        "/api/convos/validate",
        json!({
            "endpoint": "openAI",
            "createdAt": "2025-01-01T00:00:00.000Z",
            "updatedAt": "2025-01-01T00:00:00.000Z"
        }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(json["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_validate_rejects_fractional_token_limit() {
    let app = TestApp::new();

    let (status, json) = post(
        &app,
        "/api/convos/validate",
        json!({
            "conversationId": "c1",
            "endpoint": "openAI",
            "createdAt": "2025-01-01T00:00:00.000Z",
            "updatedAt": "2025-01-01T00:00:00.000Z",
            "maxContextTokens": "12.9"
        }),
    )
    .await;
    assert_eq!(status, 400);
    assert!(json["message"].as_str().unwrap().contains("whole number"));
}

#[tokio::test]
async fn test_parse_body_type_error_is_json() {
    let app = TestApp::new();

    let (status, json) = post(
        &app,
        "/api/convos/parse",
        json!({ "endpoint": "openAI", "conversation": {}, "compact": "yes" }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(json["error"], "VALIDATION_ERROR");
    assert_eq!(json["issues"][0]["path"], json!(["compact"]));
}

// ============================================================================
// Sender
// ============================================================================

#[tokio::test]
async fn test_response_sender() {
    let app = TestApp::new();

    let (_, json) = post(
        &app,
        "/api/convos/sender",
        json!({ "endpoint": "openAI", "model": "gpt-4o-mini" }),
    )
    .await;
    assert_eq!(json["sender"], "GPT-4o");

    let (_, json) = post(
        &app,
        "/api/convos/sender",
        json!({ "endpoint": "anthropic", "model": "claude-3", "modelLabel": "Helper" }),
    )
    .await;
    assert_eq!(json["sender"], "Helper");
}
