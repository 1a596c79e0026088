//! Backend REST API client.
//!
//! # Architecture
//!
//! - One [`ApiClient`] per process; clones share the HTTP connection pool
//! - Every response is an envelope `{success, msg?, ...}`; `success: false`
//!   becomes [`ApiError::Rejected`] with the server's message
//! - The bearer token is attached when present
//! - Checkout lookups are cached in memory via `moka`
//!
//! # Example
//!
//! ```rust,ignore
//! use comanda_client::{ApiClient, ClientConfig};
//!
//! let client = ApiClient::new(&ClientConfig::from_env()?)?;
//! let categories = client.list_categories().await?;
//!
//! let authed = client.with_token(token);
//! let number = authed.create_order(&payload).await?;
//! ```

mod auth;
mod catalog;
mod lookups;
mod orders;
pub mod types;

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error::ApiError;
use types::{Empty, Envelope, LookupKind, LookupOption};

pub use types::{CheckoutLookups, LookupId, LookupSource, Registration};

/// Longest body excerpt written to logs.
const LOG_BODY_LIMIT: usize = 500;

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the ordering backend.
///
/// Implements `Debug` manually to redact the bearer token.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
    token: Option<SecretString>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    lookups: Cache<LookupKind, Vec<LookupOption>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        let lookups = Cache::builder()
            .max_capacity(16)
            .time_to_live(config.lookup_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_url.clone(),
                lookups,
            }),
            token: None,
        })
    }

    /// A client that sends `token` as its bearer credential.
    #[must_use]
    pub fn with_token(&self, token: SecretString) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            token: Some(token),
        }
    }

    /// A client that sends no credentials.
    #[must_use]
    pub fn anonymous(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            token: None,
        }
    }

    #[must_use]
    pub const fn has_token(&self) -> bool {
        self.token.is_some()
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build a request for a path relative to the base URL.
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self
            .inner
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::Decode {
                context: "request URL",
                detail: e.to_string(),
            })?;

        let builder = self.inner.client.request(method, url);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        })
    }

    /// Send a request and unwrap the response envelope.
    async fn send<T>(&self, builder: RequestBuilder, context: &'static str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        debug!(%status, context, "Backend responded");

        if !status.is_success() {
            let message = serde_json::from_str::<Envelope<Empty>>(&body)
                .ok()
                .and_then(|e| e.message());
            tracing::warn!(
                status = %status,
                context,
                body = %excerpt(&body),
                "Backend returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Envelope<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    context,
                    body = %excerpt(&body),
                    "Failed to parse backend response"
                );
                return Err(ApiError::Decode {
                    context,
                    detail: e.to_string(),
                });
            }
        };

        if !envelope.success {
            return Err(ApiError::rejected(envelope.message()));
        }

        Ok(envelope.body)
    }
}

fn excerpt(body: &str) -> String {
    body.chars().take(LOG_BODY_LIMIT).collect()
}
