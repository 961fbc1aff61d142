//! Paginators over threads and comments.
//!
//! A paginator owns its cursor and borrows the client. Typical usage:
//!
//! ```rust,ignore
//! let mut pages = client.comments_paginator(3456);
//! while pages.has_next() {
//!     let comments = pages.next_page(&cancel).await?;
//!     render(&comments);
//! }
//! ```
//!
//! Calling `next_page` after `has_next` turned false fails with
//! [`Error::Exhausted`] instead of returning an empty page.

use twist_core::cursor::{CommentWindow, CommentsCursor, ThreadsCursor};
use twist_core::model::{Comment, Thread};

use super::TwistClient;
use crate::cancel::Cancellation;
use crate::error::Error;

impl TwistClient {
    /// Paginator over every thread of a channel, ascending by id.
    pub fn threads_paginator(&self, channel_id: u64) -> ThreadsPaginator<'_> {
        ThreadsPaginator {
            client: self,
            channel_id,
            cursor: ThreadsCursor::new(),
        }
    }

    /// Paginator over every comment of a thread: complete, gap-free and
    /// ordered by order index, or an error.
    pub fn comments_paginator(&self, thread_id: u64) -> CommentsPaginator<'_> {
        CommentsPaginator {
            client: self,
            thread_id,
            cursor: CommentsCursor::exact(),
        }
    }

    /// Best-effort paginator over the comments of a thread posted at `since`
    /// or later, for cheap incremental polling.
    ///
    /// Results may miss comments created while paging, may repeat comments
    /// across page boundaries and are not necessarily ordered. Use
    /// [`comments_paginator`](Self::comments_paginator) when completeness
    /// matters.
    pub fn comments_paginator_since(&self, thread_id: u64, since: u64) -> CommentsPaginator<'_> {
        CommentsPaginator {
            client: self,
            thread_id,
            cursor: CommentsCursor::loose(since),
        }
    }
}

/// Fetches all threads in a channel, one page per call.
#[derive(Debug)]
pub struct ThreadsPaginator<'a> {
    client: &'a TwistClient,
    channel_id: u64,
    cursor: ThreadsCursor,
}

impl ThreadsPaginator<'_> {
    /// Whether there's another page to load. Only turns false once the last
    /// page has been returned by [`next_page`](Self::next_page).
    pub fn has_next(&self) -> bool {
        self.cursor.has_next()
    }

    pub async fn next_page(&mut self, cancel: &Cancellation) -> Result<Vec<Thread>, Error> {
        let after_id = self.cursor.after_id().map_err(|e| {
            Error::from(e).context(format!("reading threads of channel {}", self.channel_id))
        })?;
        let threads = self
            .client
            .threads_page(self.channel_id, after_id, cancel)
            .await?;
        self.cursor.advance(&threads);
        Ok(threads)
    }

    /// Drain the remaining pages.
    pub async fn collect_all(mut self, cancel: &Cancellation) -> Result<Vec<Thread>, Error> {
        let mut all = Vec::new();
        while self.has_next() {
            all.extend(self.next_page(cancel).await?);
        }
        Ok(all)
    }
}

/// Fetches the comments of a thread, one page per call.
#[derive(Debug)]
pub struct CommentsPaginator<'a> {
    client: &'a TwistClient,
    thread_id: u64,
    cursor: CommentsCursor,
}

impl CommentsPaginator<'_> {
    pub fn has_next(&self) -> bool {
        self.cursor.has_next()
    }

    /// Whether this paginator only makes best-effort guarantees.
    pub fn is_loose(&self) -> bool {
        matches!(self.cursor.window(), Ok(CommentWindow::Loose { .. }))
    }

    pub async fn next_page(&mut self, cancel: &Cancellation) -> Result<Vec<Comment>, Error> {
        let thread_id = self.thread_id;
        let context = move || format!("reading comments of thread {thread_id}");
        let window = self
            .cursor
            .window()
            .map_err(|e| Error::from(e).context(context()))?;
        let comments = self
            .client
            .comments_page(self.thread_id, window, cancel)
            .await?;
        self.cursor
            .advance(&comments)
            .map_err(|e| Error::from(e).context(context()))?;
        Ok(comments)
    }

    /// Drain the remaining pages.
    pub async fn collect_all(mut self, cancel: &Cancellation) -> Result<Vec<Comment>, Error> {
        let mut all = Vec::new();
        while self.has_next() {
            all.extend(self.next_page(cancel).await?);
        }
        Ok(all)
    }
}
