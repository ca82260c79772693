//! Router-level tests against a substituted translation backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use translate_relay::config::ServiceConfig;
use translate_relay::error::UpstreamError;
use translate_relay::routes;
use translate_relay::state::AppState;
use translate_relay::translator::{LanguageDescriptor, TranslationBackend};
use translate_relay::websocket;

/// Echoes a marker derived from the input so concurrent requests can be
/// told apart, and counts invocations.
struct EchoBackend {
    calls: AtomicUsize,
}

impl EchoBackend {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TranslationBackend for EchoBackend {
    async fn supported_languages(
        &self,
        _display_language_code: &str,
    ) -> Result<Vec<LanguageDescriptor>, UpstreamError> {
        Ok(vec![
            LanguageDescriptor {
                language: "en".to_string(),
                display_name: "English".to_string(),
            },
            LanguageDescriptor {
                language: "fr".to_string(),
                display_name: "French".to_string(),
            },
        ])
    }

    async fn translate(
        &self,
        text: &str,
        _source_lang: Option<&str>,
        target_lang: Option<&str>,
    ) -> Result<String, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{}:{}", target_lang.unwrap_or("auto"), text))
    }
}

struct FailingBackend;

#[async_trait]
impl TranslationBackend for FailingBackend {
    async fn supported_languages(
        &self,
        _display_language_code: &str,
    ) -> Result<Vec<LanguageDescriptor>, UpstreamError> {
        Err(UpstreamError::Status {
            status: 503,
            body: "quota exceeded".to_string(),
        })
    }

    async fn translate(
        &self,
        _text: &str,
        _source_lang: Option<&str>,
        _target_lang: Option<&str>,
    ) -> Result<String, UpstreamError> {
        Err(UpstreamError::Status {
            status: 503,
            body: "quota exceeded".to_string(),
        })
    }
}

fn test_config() -> ServiceConfig {
    let env: HashMap<&str, &str> = HashMap::from([
        ("SECRET_KEY", "test-secret"),
        ("GOOGLE_PROJECT_ID", "demo-project"),
        ("GOOGLE_PRIVATE_KEY_ID", "key-1"),
        ("GOOGLE_PRIVATE_KEY", "unused"),
        ("GOOGLE_CLIENT_EMAIL", "svc@demo-project.iam.gserviceaccount.com"),
    ]);
    ServiceConfig::from_lookup(|name| env.get(name).map(|v| v.to_string())).unwrap()
}

fn state_with(backend: Arc<dyn TranslationBackend>) -> AppState {
    AppState::new(test_config(), backend)
}

fn post_translate(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/translate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn translate_returns_backend_result() {
    let app = routes::app(state_with(Arc::new(EchoBackend::new())));

    let response = app
        .oneshot(post_translate(json!({
            "text": "hello",
            "sourceLang": "en",
            "targetLang": "fr",
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body, json!({ "translatedText": "fr:hello" }));
}

#[tokio::test]
async fn blank_text_is_rejected_without_calling_backend() {
    let backend = Arc::new(EchoBackend::new());
    let app = routes::app(state_with(backend.clone()));

    for text in ["", "   ", "\t\n"] {
        let response = app
            .clone()
            .oneshot(post_translate(json!({ "text": text, "targetLang": "fr" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body, json!({ "error": "Empty text" }));
    }

    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_text_field_is_treated_as_blank() {
    let app = routes::app(state_with(Arc::new(EchoBackend::new())));

    let response = app
        .oneshot(post_translate(json!({ "targetLang": "fr" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upstream_failure_maps_to_bad_gateway() {
    let app = routes::app(state_with(Arc::new(FailingBackend)));

    let response = app
        .oneshot(post_translate(json!({ "text": "hello", "targetLang": "fr" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert_eq!(body, json!({ "error": "upstream unavailable" }));
}

#[tokio::test]
async fn languages_lists_every_descriptor() {
    let app = routes::app(state_with(Arc::new(EchoBackend::new())));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/languages")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let languages = body.as_array().unwrap();
    assert!(!languages.is_empty());
    for lang in languages {
        assert!(lang.get("language").is_some());
        assert!(lang.get("display_name").is_some());
    }
}

#[tokio::test]
async fn languages_failure_maps_to_bad_gateway() {
    let app = routes::app(state_with(Arc::new(FailingBackend)));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/languages")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn concurrent_translations_do_not_cross_talk() {
    let app = routes::app(state_with(Arc::new(EchoBackend::new())));

    let requests = (0..16).map(|i| {
        let app = app.clone();
        async move {
            let text = format!("text-{}", i);
            let response = app
                .oneshot(post_translate(json!({ "text": text, "targetLang": "fr" })))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            (i, json_body(response).await)
        }
    });

    for (i, body) in futures_util::future::join_all(requests).await {
        assert_eq!(body["translatedText"], format!("fr:text-{}", i));
    }
}

#[tokio::test]
async fn ws_translate_event_yields_one_result() {
    let state = state_with(Arc::new(EchoBackend::new()));

    let event = websocket::handle_message(
        &state,
        &json!({
            "type": "translate",
            "text": "hello",
            "sourceLang": "en",
            "targetLang": "fr",
        })
        .to_string(),
    )
    .await;

    assert_eq!(
        event,
        Some(json!({ "type": "translation_result", "translatedText": "fr:hello" }))
    );
}

#[tokio::test]
async fn ws_blank_text_yields_error_event() {
    let backend = Arc::new(EchoBackend::new());
    let state = state_with(backend.clone());

    let event = websocket::handle_message(
        &state,
        &json!({ "type": "translate", "text": "" }).to_string(),
    )
    .await;

    assert_eq!(event, Some(json!({ "type": "error", "error": "Empty text" })));
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn ws_upstream_failure_yields_error_event() {
    let state = state_with(Arc::new(FailingBackend));

    let event = websocket::handle_message(
        &state,
        &json!({ "type": "translate", "text": "hello", "targetLang": "fr" }).to_string(),
    )
    .await;

    assert_eq!(
        event,
        Some(json!({ "type": "error", "error": "upstream unavailable" }))
    );
}

#[tokio::test]
async fn ws_unknown_event_is_ignored() {
    let state = state_with(Arc::new(EchoBackend::new()));

    let event =
        websocket::handle_message(&state, &json!({ "type": "ping" }).to_string()).await;

    assert_eq!(event, None);
}

#[tokio::test]
async fn health_reports_ok() {
    let app = routes::app(state_with(Arc::new(EchoBackend::new())));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
}
