//! Classification of a single HTTP attempt.
//!
//! The retry engine in the shell decides what to do with each response based
//! only on what this module returns, so the policy is testable without a
//! network.

/// Media type every successful Twist API response must carry.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// What the retry engine should do with one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Hand the body to the caller.
    Success,
    /// Transient failure, eligible for another attempt.
    Retry(String),
    /// Contract breach that retrying cannot fix.
    Fatal(String),
}

/// Classify a response by status code and `Content-Type` header.
///
/// - 200 with exactly `application/json` is a success
/// - 200 with anything else is fatal
/// - 429 and 5xx are retryable
/// - every other status is fatal
pub fn classify_response(status: u16, reason: &str, content_type: Option<&str>) -> Verdict {
    match status {
        200 => match content_type {
            Some(ct) if is_json(ct) => Verdict::Success,
            Some(ct) => Verdict::Fatal(format!("unexpected Content-Type: {ct:?}")),
            None => Verdict::Fatal("missing Content-Type".to_string()),
        },
        429 | 500..=599 => Verdict::Retry(status_message(status, reason)),
        _ => Verdict::Fatal(status_message(status, reason)),
    }
}

/// Whether a `Content-Type` header is exactly `application/json`. Parameters
/// such as `charset` and any change of case make it something else.
pub fn is_json(content_type: &str) -> bool {
    content_type == JSON_CONTENT_TYPE
}

fn status_message(status: u16, reason: &str) -> String {
    if reason.is_empty() {
        format!("unexpected status: \"{status}\"")
    } else {
        format!("unexpected status: \"{status} {reason}\"")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_json_is_success() {
        assert_eq!(
            classify_response(200, "OK", Some("application/json")),
            Verdict::Success
        );
    }

    #[test]
    fn test_ok_json_with_parameters_is_fatal() {
        for ct in ["application/json; charset=utf-8", "APPLICATION/JSON", " application/json"] {
            assert!(
                matches!(classify_response(200, "OK", Some(ct)), Verdict::Fatal(_)),
                "{ct:?} should be fatal"
            );
        }
    }

    #[test]
    fn test_ok_with_other_content_type_is_fatal() {
        assert!(matches!(
            classify_response(200, "OK", Some("text/html")),
            Verdict::Fatal(msg) if msg.contains("text/html")
        ));
        assert!(matches!(
            classify_response(200, "OK", None),
            Verdict::Fatal(_)
        ));
    }

    #[test]
    fn test_throttling_and_server_errors_are_retryable() {
        for status in [429, 500, 502, 503, 504, 599] {
            assert!(
                matches!(classify_response(status, "", None), Verdict::Retry(_)),
                "status {status} should be retryable"
            );
        }
    }

    #[test]
    fn test_other_statuses_are_fatal() {
        for status in [201, 204, 301, 400, 401, 403, 404, 422] {
            assert!(
                matches!(classify_response(status, "", None), Verdict::Fatal(_)),
                "status {status} should be fatal"
            );
        }
    }

    #[test]
    fn test_status_message_includes_reason() {
        assert_eq!(
            classify_response(503, "Service Unavailable", None),
            Verdict::Retry("unexpected status: \"503 Service Unavailable\"".to_string())
        );
    }

    #[test]
    fn test_is_json_rejects_lookalikes() {
        assert!(is_json("application/json"));
        assert!(!is_json("Application/JSON"));
        assert!(!is_json("application/json;charset=utf-8"));
        assert!(!is_json("application/jsonp"));
        assert!(!is_json("application/problem+json"));
        assert!(!is_json(""));
    }
}
