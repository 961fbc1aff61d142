//! Twist API v3 client.
//!
//! Layers, leaf first: [`transport`] puts bytes on the wire, [`retry`] makes
//! a flaky endpoint dependable, [`fetch`] turns one request into typed and
//! verified records, and [`paginate`] walks page after page until a
//! collection is complete.
//!
//! See <https://developer.twist.com/v3/> for the API itself.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use crate::cancel::Cancellation;
use crate::error::Error;
use crate::prelude::{eyre, Result};

pub mod fetch;
pub mod paginate;
pub mod retry;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use transport::{ApiRequest, ReqwestTransport, Transport};

/// Client identifier sent with every request.
const CLIENT_ID: &str = concat!("twist/", env!("CARGO_PKG_VERSION"));

/// Twist configuration from environment variables
#[derive(Debug, Clone)]
pub struct TwistConfig {
    pub base_url: String,
    pub token: String,
    pub timeout: Duration,
}

impl TwistConfig {
    /// Default Twist API base URL
    pub const DEFAULT_BASE_URL: &'static str = "https://api.twist.com/api/v3";

    /// Default per-request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Load configuration from environment variables
    /// Uses TWIST_TOKEN for auth (may be supplied later with `with_overrides`)
    /// Uses TWIST_API_BASE with default fallback
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("TWIST_API_BASE")
                .unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_string()),
            token: std::env::var("TWIST_TOKEN").unwrap_or_default(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Apply CLI overrides to the configuration
    pub fn with_overrides(
        mut self,
        base_url: Option<String>,
        token: Option<String>,
        timeout: Option<u64>,
    ) -> Self {
        if let Some(url) = base_url {
            self.base_url = url;
        }
        if let Some(token) = token {
            self.token = token;
        }
        if let Some(secs) = timeout {
            self.timeout = Duration::from_secs(secs);
        }
        self
    }

    /// Build a client talking to the real API.
    pub fn client(&self) -> Result<TwistClient> {
        if self.token.is_empty() {
            return Err(eyre!("please set TWIST_TOKEN env"));
        }
        let transport = ReqwestTransport::new(self.timeout)?;
        Ok(TwistClient::new(
            Arc::new(transport),
            &self.base_url,
            &self.token,
        )?)
    }
}

/// Twist API client. Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct TwistClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    headers: HeaderMap,
}

impl std::fmt::Debug for TwistClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwistClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl TwistClient {
    /// Create a client authenticating with a bearer `token`.
    ///
    /// See <https://developer.twist.com/v3/#authentication> for details.
    pub fn new(transport: Arc<dyn Transport>, base_url: &str, token: &str) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| Error::Request(format!("invalid token: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_ID));

        Ok(Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            headers,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.base_url)
    }

    /// GET `endpoint` with `params` in the query string.
    fn get(&self, endpoint: &str, params: &[(&str, String)]) -> ApiRequest {
        let mut url = self.url(endpoint);
        if !params.is_empty() {
            url.push('?');
            url.push_str(&encode_params(params));
        }
        self.authorize(ApiRequest::new(Method::GET, url))
    }

    /// POST `endpoint` with `params` as a form body.
    fn post_form(&self, endpoint: &str, params: &[(&str, String)]) -> ApiRequest {
        self.authorize(ApiRequest::form(self.url(endpoint), params))
    }

    fn authorize(&self, mut request: ApiRequest) -> ApiRequest {
        request
            .headers
            .extend(self.headers.iter().map(|(k, v)| (k.clone(), v.clone())));
        request
    }

    /// Send `request` through the retry engine and decode the JSON body.
    async fn fetch_json<T: DeserializeOwned>(
        &self,
        mut request: ApiRequest,
        cancel: &Cancellation,
    ) -> Result<T, Error> {
        let body = retry::send_with_retries(self.transport.as_ref(), &mut request, cancel).await?;
        let bytes = body.read_to_end(cancel).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// `application/x-www-form-urlencoded` encoding, also used for query strings.
pub fn encode_params(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
