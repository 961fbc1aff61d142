//! Twist API v3 records.
//!
//! Field names follow the API wire format; see <https://developer.twist.com/v3/>.
//! Every record is a read-only snapshot decoded from a single response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A shared place between users. Workspaces contain channels.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub id: u64,
    pub name: String,
}

/// Channels organize threads around broad topics.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub archived: bool,
}

/// A conversation on a specific topic. Threads contain comments.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Thread {
    pub id: u64,
    #[serde(default)]
    pub posted_ts: u64,
    #[serde(rename = "last_updated_ts", default)]
    pub updated_ts: u64,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "content", default)]
    pub text: String,
    #[serde(default)]
    pub creator: u64,
    #[serde(rename = "is_archived", default)]
    pub archived: bool,
}

impl Thread {
    pub fn posted_at(&self) -> Option<DateTime<Utc>> {
        timestamp_to_utc(self.posted_ts as i64)
    }
}

/// A message posted to a thread.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: u64,
    #[serde(rename = "content", default)]
    pub text: String,
    #[serde(default)]
    pub creator: u64,
    /// Position of the comment within its thread. Authoritative ordering key.
    #[serde(rename = "obj_index")]
    pub order_index: i64,
    #[serde(default)]
    pub posted_ts: u64,
}

impl Comment {
    pub fn posted_at(&self) -> Option<DateTime<Utc>> {
        timestamp_to_utc(self.posted_ts as i64)
    }
}

/// A workspace member.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub short_name: String,
}

impl User {
    /// The short name when set, the full name otherwise.
    pub fn display_name(&self) -> &str {
        if self.short_name.is_empty() {
            &self.name
        } else {
            &self.short_name
        }
    }
}

/// A message in a direct conversation.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Message {
    #[serde(rename = "content", default)]
    pub text: String,
    #[serde(rename = "creator_name", default)]
    pub author: String,
    #[serde(default)]
    pub posted_ts: i64,
}

impl Message {
    pub fn posted_at(&self) -> Option<DateTime<Utc>> {
        timestamp_to_utc(self.posted_ts)
    }
}

fn timestamp_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts, 0)
}
