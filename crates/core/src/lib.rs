//! Core library for twist
//!
//! This crate implements the **Functional Core** of the twist application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The twist project uses a two-crate architecture to enforce separation of concerns:
//!
//! - **`twist_core`** (this crate): Pure decisions and transformations with zero I/O
//! - **`twist`**: HTTP, retries, the filesystem cache and the CLI (the Imperative Shell)
//!
//! Everything that decides *what* to do lives here: whether a response is a
//! success, a transient failure or a fatal one; which page to request next;
//! whether a page honours the API's ordering promises. The shell only carries
//! those decisions out.
//!
//! # Module Organization
//!
//! - [`model`]: Twist API records (workspaces, channels, threads, comments, users, messages)
//! - [`response`]: Classification of a single HTTP attempt for the retry engine
//! - [`ordering`]: Verification of the ordering and contiguity of fetched pages
//! - [`cursor`]: Pagination state machines for threads and comments
//! - [`links`]: Parsing of twist.com thread and conversation links
//! - [`transcript`]: Plain-text rendering and mention stripping
//! - [`cache`]: Naming and expiry rules for cached transcripts
//!
//! # Example Usage
//!
//! ```rust
//! use twist_core::cursor::{CommentWindow, CommentsCursor};
//!
//! let mut cursor = CommentsCursor::exact();
//! assert_eq!(
//!     cursor.window(),
//!     Ok(CommentWindow::Exact { from_index: 0, anchored: false })
//! );
//!
//! // A short page means the thread has been read in full.
//! cursor.advance(&[]).unwrap();
//! assert!(!cursor.has_next());
//! ```

pub mod cache;
pub mod cursor;
pub mod links;
pub mod model;
pub mod ordering;
pub mod response;
pub mod transcript;
