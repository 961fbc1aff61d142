//! Parsing of Twist web links ("Copy link to thread").

use regex::Regex;
use std::sync::LazyLock;

static THREAD_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://twist\.com/a/(\d+)/ch/(\d+)/t/(\d+)/?$").expect("valid regex")
});

static CHAT_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://twist\.com/a/(\d+)/msg/(\d+)/?$").expect("valid regex")
});

/// What a Twist link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    Thread {
        workspace: u64,
        channel: u64,
        thread: u64,
    },
    Conversation {
        workspace: u64,
        conversation: u64,
    },
}

/// Parse a thread or conversation link.
pub fn parse_link(url: &str) -> Result<Link, String> {
    if let Some(caps) = THREAD_URL.captures(url) {
        return Ok(Link::Thread {
            workspace: parse_id(&caps[1])?,
            channel: parse_id(&caps[2])?,
            thread: parse_id(&caps[3])?,
        });
    }

    if let Some(caps) = CHAT_URL.captures(url) {
        return Ok(Link::Conversation {
            workspace: parse_id(&caps[1])?,
            conversation: parse_id(&caps[2])?,
        });
    }

    if url.contains("/msg/") {
        Err(format!("{url:?} does not match {}", CHAT_URL.as_str()))
    } else {
        Err(format!("{url:?} does not match {}", THREAD_URL.as_str()))
    }
}

fn parse_id(digits: &str) -> Result<u64, String> {
    digits
        .parse::<u64>()
        .map_err(|e| format!("invalid id {digits:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_thread_link() {
        assert_eq!(
            parse_link("https://twist.com/a/1/ch/22/t/333/"),
            Ok(Link::Thread {
                workspace: 1,
                channel: 22,
                thread: 333
            })
        );
        assert!(parse_link("https://twist.com/a/1/ch/22/t/333").is_ok());
    }

    #[test]
    fn test_parse_conversation_link() {
        assert_eq!(
            parse_link("https://twist.com/a/1/msg/4567/"),
            Ok(Link::Conversation {
                workspace: 1,
                conversation: 4567
            })
        );
    }

    #[test]
    fn test_reject_foreign_links() {
        let err = parse_link("https://example.com/a/1/ch/2/t/3/").unwrap_err();
        assert!(err.contains("does not match"));

        let err = parse_link("https://twist.com/a/1/msg/abc/").unwrap_err();
        assert!(err.contains("msg"));
    }

    #[test]
    fn test_reject_overflowing_id() {
        let err = parse_link("https://twist.com/a/1/ch/2/t/99999999999999999999999/").unwrap_err();
        assert!(err.contains("invalid id"));
    }
}
