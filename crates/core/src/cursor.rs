//! Pagination cursors.
//!
//! Each cursor is a small state machine: `Active` while another page may
//! exist, `Done` once a short page has been seen. The shell paginators own a
//! cursor, ask it what to request next, and feed every page back through
//! `advance`. Asking a `Done` cursor for another request is a caller bug and
//! returns [`CursorError::Exhausted`].

use crate::model::{Comment, Thread};
use crate::ordering::OrderingError;

/// Page size limit for `threads/get`.
pub const MAX_THREADS_PER_PAGE: usize = 100;

/// Page size limit for `comments/get`.
pub const MAX_COMMENTS_PER_PAGE: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    #[error("all pages already read")]
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState<C> {
    Active(C),
    Done,
}

impl<C: Copy> PageState<C> {
    fn current(&self) -> Result<C, CursorError> {
        match self {
            PageState::Active(cursor) => Ok(*cursor),
            PageState::Done => Err(CursorError::Exhausted),
        }
    }
}

/// Value sent as `after_id`.
///
/// The API ignores `after_id=0` and falls back to sorting by update time, so
/// the beginning of a channel is requested with `-1`.
pub fn after_id_param(after_id: u64) -> String {
    if after_id == 0 {
        "-1".to_string()
    } else {
        after_id.to_string()
    }
}

/// Cursor over the threads of one channel, ordered by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadsCursor {
    state: PageState<u64>,
}

impl Default for ThreadsCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadsCursor {
    pub fn new() -> Self {
        Self {
            state: PageState::Active(0),
        }
    }

    pub fn state(&self) -> PageState<u64> {
        self.state
    }

    /// Whether another page should be requested.
    pub fn has_next(&self) -> bool {
        matches!(self.state, PageState::Active(_))
    }

    /// Id of the last thread already seen, `0` at the beginning.
    pub fn after_id(&self) -> Result<u64, CursorError> {
        self.state.current()
    }

    pub fn advance(&mut self, page: &[Thread]) {
        let PageState::Active(after_id) = self.state else {
            return;
        };

        self.state = if page.len() < MAX_THREADS_PER_PAGE {
            PageState::Done
        } else {
            PageState::Active(page.last().map(|t| t.id).unwrap_or(after_id))
        };
    }
}

/// The next comments request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentWindow {
    /// Index-based window `[from_index, from_index + 499]`. `anchored` is
    /// set once a page has been seen, after which every page must start
    /// exactly at `from_index`.
    Exact { from_index: i64, anchored: bool },
    /// Timestamp-based window of comments posted at or after `newer_than`.
    Loose { newer_than: u64 },
}

impl CommentWindow {
    /// Query parameters selecting this window, besides `thread_id` and `limit`.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        match *self {
            CommentWindow::Exact { from_index, .. } => vec![
                ("from_obj_index", from_index.to_string()),
                // Both bounds are inclusive: the API returns
                // [from_obj_index, to_obj_index][:limit].
                (
                    "to_obj_index",
                    from_index
                        .saturating_add(MAX_COMMENTS_PER_PAGE as i64 - 1)
                        .to_string(),
                ),
            ],
            CommentWindow::Loose { newer_than } => {
                vec![("newer_than_ts", newer_than.to_string())]
            }
        }
    }

    /// Order index the page must start at, if known.
    pub fn expected_start(&self) -> Option<i64> {
        match *self {
            CommentWindow::Exact {
                from_index,
                anchored: true,
            } => Some(from_index),
            _ => None,
        }
    }
}

/// Cursor over the comments of one thread.
///
/// The mode is fixed at construction. Exact mode yields every comment once,
/// in order, or fails. Loose mode is a cheap incremental poll with no such
/// guarantee: comments created while paging may be missed, comments sharing
/// a timestamp across a page boundary may repeat, and pages are not ordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentsCursor {
    state: PageState<CommentWindow>,
}

impl Default for CommentsCursor {
    fn default() -> Self {
        Self::exact()
    }
}

impl CommentsCursor {
    pub fn exact() -> Self {
        Self {
            state: PageState::Active(CommentWindow::Exact {
                from_index: 0,
                anchored: false,
            }),
        }
    }

    /// Comments posted at `since` or later, best effort.
    pub fn loose(since: u64) -> Self {
        Self {
            state: PageState::Active(CommentWindow::Loose { newer_than: since }),
        }
    }

    pub fn state(&self) -> PageState<CommentWindow> {
        self.state
    }

    pub fn has_next(&self) -> bool {
        matches!(self.state, PageState::Active(_))
    }

    pub fn window(&self) -> Result<CommentWindow, CursorError> {
        self.state.current()
    }

    /// Move past `page`.
    ///
    /// Fails when a full page ends at the largest representable order index
    /// or timestamp. The cursor is left unchanged then.
    pub fn advance(&mut self, page: &[Comment]) -> Result<(), OrderingError> {
        let PageState::Active(window) = self.state else {
            return Ok(());
        };

        if page.len() < MAX_COMMENTS_PER_PAGE {
            self.state = PageState::Done;
            return Ok(());
        }

        let next = match window {
            CommentWindow::Exact { from_index, .. } => CommentWindow::Exact {
                from_index: match page.last() {
                    Some(last) => last
                        .order_index
                        .checked_add(1)
                        .ok_or(OrderingError::IndexOverflow(last.order_index))?,
                    None => from_index,
                },
                anchored: true,
            },
            // The API boundary is inclusive; without the +1 the comments at
            // the maximum timestamp would be returned forever.
            CommentWindow::Loose { newer_than } => CommentWindow::Loose {
                newer_than: match page.iter().map(|c| c.posted_ts).max() {
                    Some(ts) => ts
                        .checked_add(1)
                        .ok_or(OrderingError::TimestampOverflow(ts))?,
                    None => newer_than,
                },
            },
        };
        self.state = PageState::Active(next);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn threads(ids: std::ops::RangeInclusive<u64>) -> Vec<Thread> {
        ids.map(|id| Thread {
            id,
            posted_ts: 0,
            updated_ts: 0,
            title: String::new(),
            text: String::new(),
            creator: 0,
            archived: false,
        })
        .collect()
    }

    fn comments(indices: std::ops::Range<i64>, ts: impl Fn(i64) -> u64) -> Vec<Comment> {
        indices
            .map(|order_index| Comment {
                id: order_index as u64,
                text: String::new(),
                creator: 0,
                order_index,
                posted_ts: ts(order_index),
            })
            .collect()
    }

    #[test]
    fn test_after_id_param_uses_sentinel_for_zero() {
        assert_eq!(after_id_param(0), "-1");
        assert_eq!(after_id_param(123), "123");
    }

    #[test]
    fn test_threads_cursor_advances_on_full_page() {
        let mut cursor = ThreadsCursor::new();
        assert_eq!(cursor.after_id(), Ok(0));

        cursor.advance(&threads(1..=100));
        assert!(cursor.has_next());
        assert_eq!(cursor.after_id(), Ok(100));
    }

    #[test]
    fn test_threads_cursor_finishes_on_short_page() {
        let mut cursor = ThreadsCursor::new();
        cursor.advance(&threads(1..=99));
        assert!(!cursor.has_next());
        assert_eq!(cursor.after_id(), Err(CursorError::Exhausted));
    }

    #[test]
    fn test_threads_cursor_finishes_on_empty_page() {
        let mut cursor = ThreadsCursor::new();
        cursor.advance(&threads(1..=100));
        cursor.advance(&[]);
        assert_eq!(cursor.state(), PageState::Done);
    }

    #[test]
    fn test_exact_window_params() {
        let window = CommentsCursor::exact().window().unwrap();
        assert_eq!(
            window.params(),
            vec![
                ("from_obj_index", "0".to_string()),
                ("to_obj_index", "499".to_string())
            ]
        );
        assert_eq!(window.expected_start(), None);
    }

    #[test]
    fn test_exact_cursor_anchors_after_first_page() {
        let mut cursor = CommentsCursor::exact();
        cursor.advance(&comments(0..500, |_| 1)).unwrap();

        let window = cursor.window().unwrap();
        assert_eq!(
            window,
            CommentWindow::Exact {
                from_index: 500,
                anchored: true
            }
        );
        assert_eq!(window.expected_start(), Some(500));
        assert_eq!(window.params()[1], ("to_obj_index", "999".to_string()));
    }

    #[test]
    fn test_loose_cursor_moves_past_max_timestamp() {
        let mut cursor = CommentsCursor::loose(1_000);
        // Timestamps deliberately out of order; the maximum is 1_000 + 499 * 3.
        cursor
            .advance(&comments(0..500, |i| 1_000 + ((i * 7) % 500) as u64 * 3))
            .unwrap();

        assert_eq!(
            cursor.window(),
            Ok(CommentWindow::Loose {
                newer_than: 1_000 + 499 * 3 + 1
            })
        );
        assert_eq!(
            cursor.window().unwrap().params(),
            vec![("newer_than_ts", "2498".to_string())]
        );
    }

    #[test]
    fn test_loose_cursor_finishes_on_short_page() {
        let mut cursor = CommentsCursor::loose(0);
        cursor.advance(&comments(0..3, |i| i as u64)).unwrap();
        assert!(!cursor.has_next());
        assert_eq!(cursor.window(), Err(CursorError::Exhausted));
    }

    #[test]
    fn test_advance_after_done_is_ignored() {
        let mut cursor = CommentsCursor::exact();
        cursor.advance(&[]).unwrap();
        cursor.advance(&comments(0..500, |_| 0)).unwrap();
        assert_eq!(cursor.state(), PageState::Done);
    }

    #[test]
    fn test_exact_window_near_max_index() {
        let window = CommentWindow::Exact {
            from_index: i64::MAX - 10,
            anchored: true,
        };
        assert_eq!(window.params()[1], ("to_obj_index", i64::MAX.to_string()));
    }

    #[test]
    fn test_exact_cursor_rejects_index_overflow() {
        let mut cursor = CommentsCursor::exact();
        let mut page = comments(0..MAX_COMMENTS_PER_PAGE as i64, |_| 0);
        for comment in &mut page {
            comment.order_index += i64::MAX - (MAX_COMMENTS_PER_PAGE as i64 - 1);
        }

        assert_eq!(
            cursor.advance(&page),
            Err(OrderingError::IndexOverflow(i64::MAX))
        );
        assert_eq!(cursor, CommentsCursor::exact());
    }

    #[test]
    fn test_loose_cursor_rejects_timestamp_overflow() {
        let mut cursor = CommentsCursor::loose(u64::MAX - 1);
        let page = comments(0..MAX_COMMENTS_PER_PAGE as i64, |i| {
            if i == 7 {
                u64::MAX
            } else {
                u64::MAX - 1
            }
        });

        assert_eq!(
            cursor.advance(&page),
            Err(OrderingError::TimestampOverflow(u64::MAX))
        );
        assert_eq!(
            cursor.window(),
            Ok(CommentWindow::Loose {
                newer_than: u64::MAX - 1
            })
        );
    }
}
