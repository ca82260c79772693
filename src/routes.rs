use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::error::RelayError;
use crate::state::AppState;
use crate::translator::{LanguageDescriptor, TranslateRequest, TranslateResponse};

/// Builds the full application router. CORS stays wide open on every route;
/// the browser client is served from a different origin.
pub fn app(state: AppState) -> Router {
    create_routes()
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub fn create_routes() -> Router<AppState> {
    Router::new()
        // WebSocket
        .route("/ws", get(crate::websocket::websocket_handler))
        // Health check
        .route("/health", get(health_check))
        // REST API routes
        .route("/languages", get(list_languages))
        .route("/translate", post(translate_text))
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "environment": state.config.environment,
    }))
}

#[derive(Debug, Deserialize)]
struct LanguagesParams {
    #[serde(rename = "displayLanguageCode")]
    display_language_code: Option<String>,
}

async fn list_languages(
    State(state): State<AppState>,
    Query(params): Query<LanguagesParams>,
) -> Result<Json<Vec<LanguageDescriptor>>, RelayError> {
    let display = params.display_language_code.as_deref().unwrap_or("en");
    let languages = state.translator.supported_languages(display).await?;
    Ok(Json(languages))
}

async fn translate_text(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, RelayError> {
    if request.text.trim().is_empty() {
        return Err(RelayError::EmptyText);
    }

    let translated = state
        .translator
        .translate(
            &request.text,
            request.source_lang.as_deref(),
            request.target_lang.as_deref(),
        )
        .await?;

    Ok(Json(TranslateResponse {
        translated_text: translated,
    }))
}
