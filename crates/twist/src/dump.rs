use crate::api::fetch::MAX_MESSAGES;
use crate::api::TwistClient;
use crate::cache::TranscriptCache;
use crate::cancel::Cancellation;
use crate::prelude::{eprintln, print, *};
use std::time::SystemTime;
use twist_core::links::{parse_link, Link};
use twist_core::transcript::{render_conversation, Directory, ThreadTranscript};

#[derive(Debug, clap::Args, Clone)]
pub struct DumpOptions {
    /// Thread or conversation link (e.g., "https://twist.com/a/1/ch/2/t/3/")
    #[clap(env = "TWIST_URL")]
    pub url: String,

    /// Reuse a transcript fetched in the last five minutes
    #[arg(
        short,
        long,
        env = "DUMP_TWIST_THREAD_CACHE",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub cache: bool,
}

pub async fn run(options: DumpOptions, global: crate::Global, cancel: &Cancellation) -> Result<()> {
    let link = parse_link(&options.url).map_err(|e| eyre!(e))?;

    let cache = prepare_cache(TranscriptCache::open(), options.cache, SystemTime::now());
    if let Some(data) = cache.as_ref().and_then(|c| c.read(&options.url)) {
        if global.verbose {
            eprintln!("Using cached transcript for {}", options.url);
        }
        print!("{data}");
        return Ok(());
    }

    if global.verbose {
        eprintln!("Fetching {:?}...", link);
    }

    let client = global.config().client()?;
    let data = dump_data(&client, link, cancel).await?;

    if let Some(cache) = &cache {
        if let Err(e) = cache.write(&options.url, &data) {
            log::warn!("could not cache transcript: {e}");
        }
    }

    print!("{data}");
    Ok(())
}

/// Drop expired entries on every run, then hand the cache back only if
/// `enabled`. A cache that cannot be used is skipped with a warning.
fn prepare_cache(
    cache: Result<TranscriptCache>,
    enabled: bool,
    now: SystemTime,
) -> Option<TranscriptCache> {
    let cache = match cache {
        Ok(cache) => cache,
        Err(e) if enabled => {
            log::warn!("transcript cache disabled: {e}");
            return None;
        }
        Err(e) => {
            log::debug!("skipping transcript cache pruning: {e}");
            return None;
        }
    };

    match cache.prune(now) {
        Ok(0) => {}
        Ok(n) => log::debug!("pruned {n} expired transcripts"),
        Err(e) => log::warn!("could not prune transcript cache: {e}"),
    }

    enabled.then_some(cache)
}

/// Render the transcript a link points at.
pub async fn dump_data(client: &TwistClient, link: Link, cancel: &Cancellation) -> Result<String> {
    match link {
        Link::Thread {
            workspace, thread, ..
        } => dump_thread(client, workspace, thread, cancel).await,
        Link::Conversation { conversation, .. } => {
            let messages = client.conversation_messages(conversation, cancel).await?;
            Ok(render_conversation(
                &messages,
                messages.len() >= MAX_MESSAGES,
            ))
        }
    }
}

async fn dump_thread(
    client: &TwistClient,
    workspace_id: u64,
    thread_id: u64,
    cancel: &Cancellation,
) -> Result<String> {
    let users = client.users(workspace_id, cancel).await?;
    let directory = Directory::from_users(&users);

    let thread = client.thread(thread_id, cancel).await?;
    let mut transcript = ThreadTranscript::new(&directory, &thread);

    let mut pages = client.comments_paginator(thread_id);
    while pages.has_next() {
        let comments = pages.next_page(cancel).await?;
        transcript.push_comments(&comments);
    }

    Ok(transcript.finish())
}
