use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::UpstreamError;

/// One supported language as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageDescriptor {
    pub language: String,
    pub display_name: String,
}

/// Translation request as it appears on the wire, shared by the HTTP body
/// and the WebSocket event payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateRequest {
    #[serde(default)]
    pub text: String,
    #[serde(rename = "sourceLang", default)]
    pub source_lang: Option<String>,
    #[serde(rename = "targetLang", default)]
    pub target_lang: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateResponse {
    #[serde(rename = "translatedText")]
    pub translated_text: String,
}

/// Interface to the external translation provider.
///
/// Implementations hold one long-lived client and must be safe to share
/// across concurrent handlers; every call is a single outbound request with
/// no retry.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Lists the languages the provider can translate between, with display
    /// names localized to `display_language_code`.
    async fn supported_languages(
        &self,
        display_language_code: &str,
    ) -> Result<Vec<LanguageDescriptor>, UpstreamError>;

    /// Translates one piece of text. A missing source language lets the
    /// provider auto-detect it.
    async fn translate(
        &self,
        text: &str,
        source_lang: Option<&str>,
        target_lang: Option<&str>,
    ) -> Result<String, UpstreamError>;
}
