use crate::cancel::Cancellation;
use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use twist_core::model::Thread;

use super::{format_ts, output_json, summary};

#[derive(Debug, clap::Args, Clone)]
pub struct ThreadsOptions {
    /// Channel ID
    #[clap(env = "TWIST_CHANNEL")]
    pub channel_id: u64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(options: ThreadsOptions, global: crate::Global, cancel: &Cancellation) -> Result<()> {
    if global.verbose {
        eprintln!("Fetching threads of channel {}...", options.channel_id);
    }

    let client = global.config().client()?;
    let threads = client
        .threads_paginator(options.channel_id)
        .collect_all(cancel)
        .await?;

    if options.json {
        output_json(&threads)
    } else {
        print_threads(&threads);
        Ok(())
    }
}

fn print_threads(threads: &[Thread]) {
    if threads.is_empty() {
        println!("{}", "No threads found.".yellow());
        return;
    }

    let mut table = new_table();
    table.add_row(prettytable::row![
        "ID".bold().cyan(),
        "Posted".bold().cyan(),
        "Updated".bold().cyan(),
        "Title".bold().cyan()
    ]);
    for thread in threads {
        let title = summary(&thread.title, 72);
        let title = if thread.archived {
            format!("{title} (archived)").bright_black().to_string()
        } else {
            title.bright_white().to_string()
        };
        table.add_row(prettytable::row![
            thread.id.to_string().green().to_string(),
            format_ts(thread.posted_at()).bright_black().to_string(),
            format_ts(chrono::DateTime::from_timestamp(thread.updated_ts as i64, 0))
                .bright_black()
                .to_string(),
            title
        ]);
    }
    table.printstd();

    println!("\n{} {}", threads.len().to_string().bright_cyan().bold(), "threads".bright_white());
}
