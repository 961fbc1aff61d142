//! In-memory transports for exercising the client without a network.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::StreamExt;
use std::collections::{HashMap, VecDeque};
use std::io::Read;
use std::sync::Mutex;

use super::transport::{HttpResponse, PreparedRequest, RequestBody, ResponseBody, Transport};
use crate::error::Error;

type Reply = Result<HttpResponse, Error>;

/// A request body that can be read exactly once, such as a pipe.
pub struct OneShot<R>(pub R);

impl<R: Read> Read for OneShot<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.0.read(buf)
    }
}

impl<R: Read + Send> RequestBody for OneShot<R> {}

fn body_from(body: &str) -> ResponseBody {
    let bytes = Bytes::from(body.to_string());
    ResponseBody::from_stream(futures::stream::once(async move { Ok(bytes) }).boxed())
}

/// Replays a fixed list of replies, one per request, and records what was sent.
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<PreparedRequest>>,
    hang: bool,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            hang: false,
        }
    }

    /// A transport whose requests never complete.
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn respond(status: u16, content_type: Option<&str>, body: &str) -> Reply {
        Ok(HttpResponse {
            status,
            reason: String::new(),
            content_type: content_type.map(str::to_string),
            body: body_from(body),
        })
    }

    pub fn requests(&self) -> Vec<PreparedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &PreparedRequest) -> Result<HttpResponse, Error> {
        self.requests.lock().unwrap().push(request.clone());
        if self.hang {
            futures::future::pending::<()>().await;
        }
        let reply = self.replies.lock().unwrap().pop_front();
        reply.unwrap_or_else(|| panic!("unexpected request to {}", request.url))
    }
}

/// Answers each request by calling a handler, like a tiny fake server.
pub struct FnTransport<F> {
    handler: F,
    requests: Mutex<Vec<PreparedRequest>>,
}

impl<F> FnTransport<F>
where
    F: Fn(&PreparedRequest) -> Reply + Send + Sync,
{
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<PreparedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl<F> Transport for FnTransport<F>
where
    F: Fn(&PreparedRequest) -> Reply + Send + Sync,
{
    async fn send(&self, request: &PreparedRequest) -> Result<HttpResponse, Error> {
        self.requests.lock().unwrap().push(request.clone());
        (self.handler)(request)
    }
}

pub fn ok_json(body: &str) -> Reply {
    ScriptedTransport::respond(200, Some("application/json"), body)
}

pub fn status(code: u16) -> Reply {
    ScriptedTransport::respond(code, Some("text/plain"), "")
}

/// Query string or form parameters of a request, decoded.
pub fn params(request: &PreparedRequest) -> HashMap<String, String> {
    let encoded = match &request.body {
        Some(body) => String::from_utf8_lossy(body).into_owned(),
        None => request
            .url
            .split_once('?')
            .map(|(_, query)| query.to_string())
            .unwrap_or_default(),
    };

    encoded
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| {
            (
                urlencoding::decode(k).unwrap().into_owned(),
                urlencoding::decode(v).unwrap().into_owned(),
            )
        })
        .collect()
}

/// The last two path segments of the request URL, e.g. `comments/get`.
pub fn endpoint(request: &PreparedRequest) -> String {
    let path = request.url.split('?').next().unwrap_or_default();
    let mut segments = path.rsplit('/');
    let action = segments.next().unwrap_or_default();
    let resource = segments.next().unwrap_or_default();
    format!("{resource}/{action}")
}
