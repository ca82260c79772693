use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::auth::TokenSource;
use super::interface::{LanguageDescriptor, TranslationBackend};
use crate::config::ServiceConfig;
use crate::error::UpstreamError;

const BASE_URL: &str = "https://translation.googleapis.com/v3";

/// Bound on each outbound call so a stalled upstream cannot hold a handler
/// open indefinitely.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the Cloud Translation v3 API.
///
/// Holds one `reqwest::Client` (safe for concurrent use, per its docs) and
/// one token source, both constructed at startup and shared by every
/// handler for the process lifetime.
pub struct GoogleTranslator {
    http: reqwest::Client,
    auth: TokenSource,
    parent: String,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TranslateTextRequest<'a> {
    contents: [&'a str; 1],
    mime_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_language_code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_language_code: Option<&'a str>,
}

#[derive(Deserialize)]
struct TranslateTextResponse {
    #[serde(default)]
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

#[derive(Deserialize)]
struct SupportedLanguagesResponse {
    #[serde(default)]
    languages: Vec<SupportedLanguage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SupportedLanguage {
    language_code: String,
    #[serde(default)]
    display_name: String,
}

impl GoogleTranslator {
    pub fn new(config: &ServiceConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            auth: TokenSource::new(config.credentials.clone(), http.clone()),
            http,
            parent: config.parent(),
            base_url: BASE_URL.to_string(),
        })
    }

    /// Points the client at a different API host, for tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn send_checked(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, UpstreamError> {
        let token = self.auth.bearer_token().await?;
        let response = request.bearer_auth(token).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { status, body });
        }
        Ok(response)
    }
}

#[async_trait]
impl TranslationBackend for GoogleTranslator {
    async fn supported_languages(
        &self,
        display_language_code: &str,
    ) -> Result<Vec<LanguageDescriptor>, UpstreamError> {
        let url = format!("{}/{}/supportedLanguages", self.base_url, self.parent);
        debug!("listing supported languages, display={}", display_language_code);

        let response = self
            .send_checked(
                self.http
                    .get(&url)
                    .query(&[("displayLanguageCode", display_language_code)]),
            )
            .await?;

        let body: SupportedLanguagesResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))?;

        Ok(body
            .languages
            .into_iter()
            .map(|lang| LanguageDescriptor {
                language: lang.language_code,
                display_name: lang.display_name,
            })
            .collect())
    }

    async fn translate(
        &self,
        text: &str,
        source_lang: Option<&str>,
        target_lang: Option<&str>,
    ) -> Result<String, UpstreamError> {
        let url = format!("{}/{}:translateText", self.base_url, self.parent);

        // An empty source language means "let the provider detect it".
        let body = TranslateTextRequest {
            contents: [text],
            mime_type: "text/plain",
            source_language_code: source_lang.filter(|s| !s.is_empty()),
            target_language_code: target_lang.filter(|s| !s.is_empty()),
        };

        let response = self.send_checked(self.http.post(&url).json(&body)).await?;

        let body: TranslateTextResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))?;

        body.translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| UpstreamError::Decode("response carried no translations".to_string()))
    }
}
