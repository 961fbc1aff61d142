use twist_core::cursor::CursorError;
use twist_core::ordering::OrderingError;

/// Errors returned by the Twist API client.
///
/// Only [`Error::Network`] and retryable statuses are ever retried, and only
/// inside the retry engine. Everything that reaches a caller is final.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Connection failure, timeout or broken body stream.
    #[error("network error: {0}")]
    Network(String),

    /// Unexpected status or content type.
    #[error("{0}")]
    Status(String),

    #[error("decoding response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Ordering(#[from] OrderingError),

    #[error("reading request body: {0}")]
    Body(#[source] std::io::Error),

    #[error("rewinding request body to 0: {0}")]
    Rewind(#[source] std::io::Error),

    #[error("cannot rewind non-nil request body for retry, last error was {0}")]
    NotRewindable(Box<Error>),

    #[error("giving up after {attempts} retries, last error was {last}")]
    GaveUp { attempts: usize, last: Box<Error> },

    #[error("operation cancelled")]
    Cancelled,

    #[error("invalid {0} id")]
    InvalidId(&'static str),

    #[error(transparent)]
    Exhausted(#[from] CursorError),

    #[error("invalid request: {0}")]
    Request(String),

    #[error("{context}: {inner}")]
    Context { context: String, inner: Box<Error> },
}

impl Error {
    /// Prefix the error with what was being done. Cancellation is returned
    /// unchanged so callers can match on it directly.
    pub fn context(self, context: impl Into<String>) -> Self {
        match self {
            Error::Cancelled => Error::Cancelled,
            err => Error::Context {
                context: context.into(),
                inner: Box::new(err),
            },
        }
    }

    /// The error with every [`Error::Context`] layer removed.
    pub fn root(&self) -> &Error {
        match self {
            Error::Context { inner, .. } => inner.root(),
            err => err,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.root(), Error::Cancelled)
    }
}
