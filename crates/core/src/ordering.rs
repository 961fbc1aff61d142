//! Server-side ordering checks.
//!
//! The API promises ascending results, but a paginated fetch is only correct
//! if that promise holds for every page, so pages are verified rather than
//! trusted.

use crate::model::{Comment, Thread};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderingError {
    #[error("API returned threads that are not properly sorted by ids")]
    ThreadsUnsorted,

    #[error("API returned comments that are not properly sorted by obj_index")]
    CommentsUnsorted,

    #[error("ordering issue in comments: order index is {got}, expected {expected}")]
    CommentGap { got: i64, expected: i64 },

    #[error("comments page starts at order index {got}, requested {expected}")]
    UnexpectedStart { got: i64, expected: i64 },

    #[error("no order index can follow {0}")]
    IndexOverflow(i64),

    #[error("no timestamp can follow {0}")]
    TimestampOverflow(u64),
}

/// Threads must be ascending by id.
///
/// A zero `after_id` once made the API sort by update time instead, which
/// this check catches.
pub fn check_threads_sorted(threads: &[Thread]) -> Result<(), OrderingError> {
    if threads.windows(2).all(|w| w[0].id <= w[1].id) {
        Ok(())
    } else {
        Err(OrderingError::ThreadsUnsorted)
    }
}

/// Comments in one page must be sorted and contiguous by order index:
/// `first, first + 1, first + 2, ...`.
///
/// When `expected_start` is set the first comment must sit exactly there.
/// The first page of a thread passes `None` because order indices do not
/// have to start at zero.
pub fn check_comment_window(
    comments: &[Comment],
    expected_start: Option<i64>,
) -> Result<(), OrderingError> {
    if !comments
        .windows(2)
        .all(|w| w[0].order_index <= w[1].order_index)
    {
        return Err(OrderingError::CommentsUnsorted);
    }

    let Some(first) = comments.first() else {
        return Ok(());
    };

    if let Some(expected) = expected_start {
        if first.order_index != expected {
            return Err(OrderingError::UnexpectedStart {
                got: first.order_index,
                expected,
            });
        }
    }

    let offset = first.order_index;
    for (i, comment) in comments.iter().enumerate().skip(1) {
        let expected = offset
            .checked_add(i as i64)
            .ok_or(OrderingError::IndexOverflow(offset))?;
        if comment.order_index != expected {
            return Err(OrderingError::CommentGap {
                got: comment.order_index,
                expected,
            });
        }
    }

    Ok(())
}
