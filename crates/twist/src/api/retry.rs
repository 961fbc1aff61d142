//! The retry engine.
//!
//! Turns a flaky endpoint into a dependable one: every request goes through
//! [`send_with_retries`], which retries throttling (429), server errors (5xx)
//! and network failures on a fixed interval and gives up after
//! [`MAX_ATTEMPTS`].

use log::{debug, warn};
use std::io::SeekFrom;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use twist_core::response::{classify_response, Verdict};

use super::transport::{ApiRequest, ResponseBody, Transport};
use crate::cancel::Cancellation;
use crate::error::Error;

/// Attempts per logical request, the first one included.
pub const MAX_ATTEMPTS: usize = 10;

/// Fixed wait between attempts.
pub const RETRY_INTERVAL: Duration = Duration::from_millis(500);

enum Failure {
    Retry(Error),
    Fatal(Error),
}

/// Send `request` until it succeeds, fails for good, or runs out of
/// attempts. On success the caller owns the returned body stream.
///
/// A request body is rewound before each retry. If it cannot be rewound the
/// request fails instead of resending a partially consumed body.
pub async fn send_with_retries(
    transport: &dyn Transport,
    request: &mut ApiRequest,
    cancel: &Cancellation,
) -> Result<ResponseBody, Error> {
    let mut ticker = None;
    let mut attempt = 1;

    loop {
        let err = match send_once(transport, request, cancel).await {
            Ok(body) => return Ok(body),
            Err(Failure::Fatal(err)) => return Err(err),
            Err(Failure::Retry(err)) => err,
        };

        if attempt >= MAX_ATTEMPTS {
            return Err(Error::GaveUp {
                attempts: MAX_ATTEMPTS,
                last: Box::new(err),
            });
        }
        warn!(
            "{} {} failed on attempt {}/{}: {}",
            request.method, request.url, attempt, MAX_ATTEMPTS, err
        );

        if let Some(body) = request.body.as_mut() {
            match body.as_seek() {
                Some(seeker) => {
                    seeker.seek(SeekFrom::Start(0)).map_err(Error::Rewind)?;
                }
                None => return Err(Error::NotRewindable(Box::new(err))),
            }
        }

        let ticker = ticker.get_or_insert_with(|| {
            let mut ticker = interval_at(Instant::now() + RETRY_INTERVAL, RETRY_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            _ = ticker.tick() => {}
        }

        attempt += 1;
    }
}

async fn send_once(
    transport: &dyn Transport,
    request: &mut ApiRequest,
    cancel: &Cancellation,
) -> Result<ResponseBody, Failure> {
    let prepared = request.prepare().map_err(Failure::Fatal)?;
    debug!("{} {}", prepared.method, prepared.url);

    let response = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(Failure::Fatal(Error::Cancelled)),
        response = transport.send(&prepared) => response.map_err(Failure::Retry)?,
    };

    // Rejected responses are dropped here, which releases their bodies.
    match classify_response(
        response.status,
        &response.reason,
        response.content_type.as_deref(),
    ) {
        Verdict::Success => Ok(response.body),
        Verdict::Retry(msg) => Err(Failure::Retry(Error::Status(msg))),
        Verdict::Fatal(msg) => Err(Failure::Fatal(Error::Status(msg))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{ok_json, status, OneShot, ScriptedTransport};
    use reqwest::Method;
    use std::io::Cursor;
    use std::sync::Arc;

    fn get() -> ApiRequest {
        ApiRequest::new(Method::GET, "https://api.example.com/workspaces/get")
    }

    async fn body_text(body: ResponseBody) -> String {
        String::from_utf8(body.read_to_end(&Cancellation::new()).await.unwrap()).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_attempt_success() {
        let transport = ScriptedTransport::new(vec![ok_json("[]")]);
        let body = send_with_retries(&transport, &mut get(), &Cancellation::new())
            .await
            .unwrap();
        assert_eq!(body_text(body).await, "[]");
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_within_budget() {
        for failures in 1..MAX_ATTEMPTS {
            let mut script: Vec<_> = (0..failures)
                .map(|i| match i % 3 {
                    0 => status(503),
                    1 => status(429),
                    _ => Err(Error::Network("connection reset".to_string())),
                })
                .collect();
            script.push(ok_json("[1]"));
            let transport = ScriptedTransport::new(script);

            let started = Instant::now();
            let body = send_with_retries(&transport, &mut get(), &Cancellation::new())
                .await
                .unwrap_or_else(|e| panic!("{failures} failures should be retried: {e}"));

            assert_eq!(body_text(body).await, "[1]");
            assert_eq!(transport.requests().len(), failures + 1);
            assert_eq!(started.elapsed(), RETRY_INTERVAL * failures as u32);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let script = (0..MAX_ATTEMPTS).map(|_| status(502)).collect();
        let transport = ScriptedTransport::new(script);

        let err = send_with_retries(&transport, &mut get(), &Cancellation::new())
            .await
            .unwrap_err();

        assert_eq!(transport.requests().len(), MAX_ATTEMPTS);
        match err {
            Error::GaveUp { attempts, last } => {
                assert_eq!(attempts, MAX_ATTEMPTS);
                assert!(last.to_string().contains("502"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_status_is_not_retried() {
        let transport = ScriptedTransport::new(vec![status(404), ok_json("[]")]);
        let err = send_with_retries(&transport, &mut get(), &Cancellation::new())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Status(ref msg) if msg.contains("404")));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wrong_content_type_is_not_retried() {
        let transport = ScriptedTransport::new(vec![
            ScriptedTransport::respond(200, Some("text/html"), "<html>"),
            ok_json("[]"),
        ]);
        let err = send_with_retries(&transport, &mut get(), &Cancellation::new())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("text/html"));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rewinds_seekable_body() {
        let transport = ScriptedTransport::new(vec![status(500), status(500), ok_json("[]")]);
        let mut request = ApiRequest::form(
            "https://api.example.com/threads/get",
            &[("channel_id", "7".to_string())],
        );

        send_with_retries(&transport, &mut request, &Cancellation::new())
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        for sent in requests {
            assert_eq!(sent.body.as_deref(), Some(&b"channel_id=7"[..]));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_rewindable_body_fails_before_retry() {
        let transport = ScriptedTransport::new(vec![status(503), ok_json("[]")]);
        let mut request = ApiRequest::new(Method::POST, "https://api.example.com/threads/get")
            .with_body(OneShot(&b"channel_id=7"[..]));

        let err = send_with_retries(&transport, &mut request, &Cancellation::new())
            .await
            .unwrap_err();

        assert_eq!(transport.requests().len(), 1);
        match err {
            Error::NotRewindable(last) => assert!(last.to_string().contains("503")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_seekable_body_without_retry_is_sent_once() {
        let transport = ScriptedTransport::new(vec![ok_json("[]")]);
        let mut request = ApiRequest::new(Method::POST, "https://api.example.com/threads/get")
            .with_body(Cursor::new(b"x=1".to_vec()));

        send_with_retries(&transport, &mut request, &Cancellation::new())
            .await
            .unwrap();
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_during_wait() {
        let transport = ScriptedTransport::new(vec![status(503), ok_json("[]")]);
        let cancel = Arc::new(Cancellation::new());

        let task = tokio::spawn({
            let cancel = Arc::clone(&cancel);
            async move {
                let mut request = get();
                send_with_retries(&transport, &mut request, &cancel).await
            }
        });

        // The first attempt fails immediately; cancel while waiting to retry.
        tokio::time::sleep(RETRY_INTERVAL / 2).await;
        cancel.cancel();

        let err = task.await.unwrap().unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_during_request() {
        let transport = ScriptedTransport::hanging();
        let cancel = Cancellation::new();
        cancel.cancel();

        let err = send_with_retries(&transport, &mut get(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_while_request_in_flight() {
        let transport = Arc::new(ScriptedTransport::hanging());
        let cancel = Arc::new(Cancellation::new());

        let task = tokio::spawn({
            let transport = Arc::clone(&transport);
            let cancel = Arc::clone(&cancel);
            async move {
                let mut request = get();
                send_with_retries(&*transport, &mut request, &cancel).await
            }
        });

        // The transport never answers; the attempt stays in flight.
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(transport.requests().len(), 1);
        assert!(!task.is_finished());

        cancel.cancel();
        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, Error::Cancelled));
        assert_eq!(transport.requests().len(), 1);
    }
}
