//! Listing commands: workspaces, channels, users, threads and comments.
//!
//! Every command prints a table by default and the raw records with `--json`.

use crate::prelude::{println, *};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub mod comments;
pub mod threads;
pub mod workspaces;

fn output_json<T: Serialize + ?Sized>(records: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    println!("{}", json);
    Ok(())
}

/// `2006-01-02 15:04` in UTC, or `-` for a missing timestamp.
fn format_ts(at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(dt) if dt.timestamp() > 0 => dt.format("%Y-%m-%d %H:%M").to_string(),
        _ => "-".to_string(),
    }
}

/// First line of `text`, cut to `max` characters.
fn summary(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() > max {
        let cut: String = line.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    } else {
        line.to_string()
    }
}
