use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::ServiceAccountKey;
use crate::error::UpstreamError;

const SCOPE: &str = "https://www.googleapis.com/auth/cloud-translation";

/// Lifetime of the signed assertion, the maximum Google accepts.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Refresh this long before the cached token actually expires.
const REFRESH_MARGIN_SECS: i64 = 300;

#[derive(Clone)]
struct CachedToken {
    value: SecretString,
    expires_at: DateTime<Utc>,
}

/// Exchanges a service-account key for OAuth2 bearer tokens.
///
/// The signed JWT assertion is posted to the key's token endpoint; the
/// resulting access token is cached and reused until shortly before expiry.
/// Safe to share across concurrent handlers: the cache is behind an RwLock
/// and a stale read at worst causes one redundant exchange.
pub struct TokenSource {
    key: ServiceAccountKey,
    http: reqwest::Client,
    cached: RwLock<Option<CachedToken>>,
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: i64,
    iat: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

impl TokenSource {
    pub fn new(key: ServiceAccountKey, http: reqwest::Client) -> Self {
        Self {
            key,
            http,
            cached: RwLock::new(None),
        }
    }

    /// Returns a bearer token for the next outbound call, performing the
    /// exchange only when no fresh token is cached.
    pub async fn bearer_token(&self) -> Result<String, UpstreamError> {
        {
            let cached = self.cached.read().await;
            if let Some(token) = cached.as_ref() {
                if Utc::now() < token.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) {
                    return Ok(token.value.expose_secret().clone());
                }
            }
        }

        let token = self.exchange().await?;
        let value = token.value.expose_secret().clone();
        *self.cached.write().await = Some(token);
        Ok(value)
    }

    fn signed_assertion(&self) -> Result<String, UpstreamError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: SCOPE,
            aud: &self.key.token_uri,
            exp: now + ASSERTION_LIFETIME_SECS,
            iat: now,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.key.private_key_id.clone());

        let encoding_key =
            EncodingKey::from_rsa_pem(self.key.private_key.expose_secret().as_bytes())
                .map_err(|e| UpstreamError::Auth(format!("invalid private key: {}", e)))?;

        encode(&header, &claims, &encoding_key)
            .map_err(|e| UpstreamError::Auth(format!("signing failed: {}", e)))
    }

    async fn exchange(&self) -> Result<CachedToken, UpstreamError> {
        let assertion = self.signed_assertion()?;
        debug!("exchanging service-account assertion for access token");

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Auth(format!(
                "token endpoint returned {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Auth(format!("unreadable token response: {}", e)))?;

        Ok(CachedToken {
            value: SecretString::new(token.access_token),
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
        })
    }
}
