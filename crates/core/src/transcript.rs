//! Plain-text transcripts of threads and conversations.

use crate::model::{Comment, Message, Thread, User};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::collections::HashMap;
use std::fmt::Write;
use std::sync::LazyLock;

static MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(?<name>[^\]]+)\]\(twist-mention://\d+\)").expect("valid regex")
});

const UNKNOWN_USER: &str = "UNKNOWN USER";
const DAY_FORMAT: &str = "%A, %d %b %Y";
const MINUTE_FORMAT: &str = "%A, %d %b %Y %H:%M";

/// Marker printed above a conversation dump that hit the message limit.
pub const EARLIER_MESSAGES_NOTICE: &str = "(earlier messages not shown)";

/// Replace `[Name](twist-mention://123)` markup with the bare name.
pub fn strip_mentions(text: &str) -> String {
    MENTION.replace_all(text, "${name}").into_owned()
}

/// Creator id to display name.
#[derive(Debug, Default, Clone)]
pub struct Directory {
    names: HashMap<u64, String>,
}

impl Directory {
    pub fn from_users(users: &[User]) -> Self {
        Self {
            names: users
                .iter()
                .map(|u| (u.id, u.display_name().to_string()))
                .collect(),
        }
    }

    pub fn name(&self, id: u64) -> &str {
        self.names
            .get(&id)
            .map(String::as_str)
            .filter(|n| !n.is_empty())
            .unwrap_or(UNKNOWN_USER)
    }
}

/// Incrementally renders a thread: the opening post first, then comments
/// page by page as they arrive.
pub struct ThreadTranscript<'a> {
    directory: &'a Directory,
    buf: String,
}

impl<'a> ThreadTranscript<'a> {
    pub fn new(directory: &'a Directory, thread: &Thread) -> Self {
        let mut buf = String::new();
        buf.push_str("<post>\n");
        let _ = writeln!(
            buf,
            "<author>{}</author><date>{}</date>",
            directory.name(thread.creator),
            format_date(thread.posted_at(), DAY_FORMAT)
        );
        let _ = writeln!(buf, "# {}\n", thread.title);
        let _ = writeln!(buf, "{}", strip_mentions(&thread.text));
        buf.push_str("</post>\n");

        Self { directory, buf }
    }

    pub fn push_comments(&mut self, comments: &[Comment]) {
        for comment in comments {
            self.buf.push_str("<comment>\n");
            let _ = writeln!(
                self.buf,
                "<author>{}</author><date>{}</date>",
                self.directory.name(comment.creator),
                format_date(comment.posted_at(), DAY_FORMAT)
            );
            let _ = writeln!(self.buf, "{}", strip_mentions(&comment.text));
            self.buf.push_str("</comment>\n");
        }
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

/// Render a conversation. `truncated` adds a notice that older messages were
/// left out.
pub fn render_conversation(messages: &[Message], truncated: bool) -> String {
    let mut buf = String::new();
    if truncated {
        buf.push_str(EARLIER_MESSAGES_NOTICE);
        buf.push_str("\n\n");
    }
    for msg in messages {
        let _ = writeln!(
            buf,
            "<msg><author>{}</author><date>{}</date>",
            msg.author,
            format_date(msg.posted_at(), MINUTE_FORMAT)
        );
        let _ = writeln!(buf, "{}", strip_mentions(&msg.text));
        buf.push_str("</msg>\n");
    }
    buf
}

fn format_date(at: Option<DateTime<Utc>>, format: &str) -> String {
    at.map(|dt| dt.format(format).to_string())
        .unwrap_or_default()
}
