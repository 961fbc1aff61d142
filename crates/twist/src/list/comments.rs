use crate::cancel::Cancellation;
use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use twist_core::model::Comment;
use twist_core::transcript::Directory;

use super::{format_ts, output_json, summary};

#[derive(Debug, clap::Args, Clone)]
pub struct CommentsOptions {
    /// Thread ID
    #[clap(env = "TWIST_THREAD")]
    pub thread_id: u64,

    /// Only comments posted at or after this Unix timestamp. Best effort:
    /// comments may be missed or repeated, and are not ordered.
    #[arg(short, long)]
    pub since: Option<u64>,

    /// Workspace ID, used to show author names instead of ids
    #[arg(short, long, env = "TWIST_WORKSPACE")]
    pub workspace: Option<u64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(options: CommentsOptions, global: crate::Global, cancel: &Cancellation) -> Result<()> {
    let client = global.config().client()?;

    let pages = match options.since {
        Some(since) => client.comments_paginator_since(options.thread_id, since),
        None => client.comments_paginator(options.thread_id),
    };
    if pages.is_loose() {
        log::warn!("--since is best effort: comments may be missing or repeated");
    }
    if global.verbose {
        eprintln!("Fetching comments of thread {}...", options.thread_id);
    }

    let comments = pages.collect_all(cancel).await?;

    if options.json {
        return output_json(&comments);
    }

    let directory = match options.workspace {
        Some(id) => Some(Directory::from_users(&client.users(id, cancel).await?)),
        None => None,
    };
    print_comments(&comments, directory.as_ref());
    Ok(())
}

fn author(directory: Option<&Directory>, creator: u64) -> String {
    match directory {
        Some(directory) => directory.name(creator).to_string(),
        None => creator.to_string(),
    }
}

fn print_comments(comments: &[Comment], directory: Option<&Directory>) {
    if comments.is_empty() {
        println!("{}", "No comments found.".yellow());
        return;
    }

    let mut table = new_table();
    table.add_row(prettytable::row![
        "#".bold().cyan(),
        "Posted".bold().cyan(),
        "Author".bold().cyan(),
        "Comment".bold().cyan()
    ]);
    for comment in comments {
        table.add_row(prettytable::row![
            comment.order_index.to_string().green().to_string(),
            format_ts(comment.posted_at()).bright_black().to_string(),
            author(directory, comment.creator).bright_white().to_string(),
            summary(&comment.text, 72)
        ]);
    }
    table.printstd();
}
