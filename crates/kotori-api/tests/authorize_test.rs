//! Authorization behavior of the webhook route.
//!
//! Every deny path must be externally indistinguishable: same status, same
//! empty body. The handler must never run for a denied request, which these
//! tests observe through the reply mock's expected call counts.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use kotori_testing::{payloads, TestEnv};
use tower::ServiceExt;

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

#[tokio::test]
async fn valid_signature_reaches_dispatcher() {
    let env = TestEnv::new().await;
    env.mock_reply_expecting("T1", "You said: hello", 1).await;

    let body = payloads::webhook_body(&[payloads::text_event("T1", "hello")]);
    let response = env.router().oneshot(env.webhook_request(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_signature_is_denied() {
    let env = TestEnv::new().await;
    env.mock_reply_ok(0).await;

    let body = payloads::webhook_body(&[payloads::text_event("T1", "hello")]);
    let response = env.router().oneshot(env.webhook_request_unsigned(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn wrong_signature_is_denied() {
    let env = TestEnv::new().await;
    env.mock_reply_ok(0).await;

    let body = payloads::webhook_body(&[payloads::text_event("T1", "hello")]);
    let wrong = kotori_api::crypto::sign("some-other-secret", &body);
    let response =
        env.router().oneshot(env.webhook_request_with_signature(&body, &wrong)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn garbage_signature_is_denied_like_any_other() {
    let env = TestEnv::new().await;
    env.mock_reply_ok(0).await;

    let body = payloads::webhook_body(&[payloads::text_event("T1", "hello")]);
    let response = env
        .router()
        .oneshot(env.webhook_request_with_signature(&body, "deadbeef"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn deny_responses_are_indistinguishable() {
    let env = TestEnv::new().await;
    let body = payloads::webhook_body(&[payloads::text_event("T1", "hello")]);

    let missing = env.router().oneshot(env.webhook_request_unsigned(&body)).await.unwrap();
    let mismatched = env
        .router()
        .oneshot(env.webhook_request_with_signature(&body, "AAAA"))
        .await
        .unwrap();

    assert_eq!(missing.status(), mismatched.status());
    assert_eq!(body_bytes(missing).await, body_bytes(mismatched).await);
}

#[tokio::test]
async fn tampered_body_fails_original_signature() {
    let env = TestEnv::new().await;
    env.mock_reply_ok(0).await;

    let body = payloads::webhook_body(&[payloads::text_event("T1", "hello")]);
    let signature = env.sign(&body);
    let tampered = payloads::webhook_body(&[payloads::text_event("T1", "hellp")]);

    let response = env
        .router()
        .oneshot(env.webhook_request_with_signature(&tampered, &signature))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unavailable_secret_store_fails_closed() {
    let env = TestEnv::with_failing_secret_store().await;
    env.mock_reply_ok(0).await;

    let body = payloads::webhook_body(&[payloads::text_event("T1", "hello")]);
    let response = env.router().oneshot(env.webhook_request(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(!env.credentials.is_warm());
}

#[tokio::test]
async fn oversized_body_is_rejected_before_signature_work() {
    let env = TestEnv::new().await;

    let oversized = vec![b'a'; 2 * 1024 * 1024];
    let response = env.router().oneshot(env.webhook_request(&oversized)).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn health_routes_bypass_authorization() {
    let env = TestEnv::new().await;

    for route in ["/health", "/ready", "/live"] {
        let request = Request::builder().method("GET").uri(route).body(Body::empty()).unwrap();
        let response = env.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{route} should not require a signature");
    }
}

#[tokio::test]
async fn signature_header_lookup_is_case_insensitive() {
    let env = TestEnv::new().await;
    env.mock_reply_expecting("T1", "You said: hi", 1).await;

    let body = payloads::webhook_body(&[payloads::text_event("T1", "hi")]);
    let signature = env.sign(&body);
    let request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json")
        .header("X-Line-Signature", signature)
        .body(Body::from(body))
        .unwrap();

    let response = env.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
