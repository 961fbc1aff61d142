//! Requests, responses and the network seam underneath the retry engine.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use std::io::{Cursor, Read, Seek};
use std::time::Duration;

use crate::cancel::Cancellation;
use crate::error::Error;

/// A request body the retry engine can send.
///
/// Bodies are read from their current position on every attempt, so a body
/// can only be retried if it can be put back at the start.
pub trait RequestBody: Read + Send {
    /// Seek access when the body can be replayed, `None` otherwise.
    fn as_seek(&mut self) -> Option<&mut dyn Seek> {
        None
    }
}

impl RequestBody for Cursor<Vec<u8>> {
    fn as_seek(&mut self) -> Option<&mut dyn Seek> {
        Some(self)
    }
}

/// One logical API request, possibly sent several times.
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Box<dyn RequestBody>>,
}

impl std::fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// POST with an `application/x-www-form-urlencoded` body.
    pub fn form(url: impl Into<String>, params: &[(&str, String)]) -> Self {
        let mut request = Self::new(Method::POST, url)
            .with_body(Cursor::new(super::encode_params(params).into_bytes()));
        request.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        request
    }

    pub fn with_body(mut self, body: impl RequestBody + 'static) -> Self {
        self.body = Some(Box::new(body));
        self
    }

    /// Snapshot the request for one attempt, reading the body from its
    /// current position.
    pub fn prepare(&mut self) -> Result<PreparedRequest, Error> {
        let body = match self.body.as_mut() {
            Some(body) => {
                let mut buf = Vec::new();
                body.read_to_end(&mut buf).map_err(Error::Body)?;
                Some(buf)
            }
            None => None,
        };

        Ok(PreparedRequest {
            method: self.method.clone(),
            url: self.url.clone(),
            headers: self.headers.clone(),
            body,
        })
    }
}

/// What goes over the wire for one attempt.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

/// A single-use response body stream.
pub struct ResponseBody {
    stream: BoxStream<'static, Result<Bytes, Error>>,
}

impl std::fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ResponseBody")
    }
}

impl ResponseBody {
    pub fn from_stream(stream: BoxStream<'static, Result<Bytes, Error>>) -> Self {
        Self { stream }
    }

    /// Drain the body. The stream is released when this returns, whatever the
    /// outcome.
    pub async fn read_to_end(mut self, cancel: &Cancellation) -> Result<Vec<u8>, Error> {
        let mut buf = Vec::new();
        loop {
            let chunk = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                chunk = self.stream.next() => chunk,
            };
            match chunk {
                Some(chunk) => buf.extend_from_slice(&chunk?),
                None => return Ok(buf),
            }
        }
    }
}

/// Response head plus body, before classification.
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub content_type: Option<String>,
    pub body: ResponseBody,
}

/// Sends one attempt. Errors are network-level failures and are always
/// considered transient.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &PreparedRequest) -> Result<HttpResponse, Error>;
}

/// [`Transport`] over a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &PreparedRequest) -> Result<HttpResponse, Error> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| Error::Network(e.to_string())))
            .boxed();

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            content_type,
            body: ResponseBody::from_stream(body),
        })
    }
}
