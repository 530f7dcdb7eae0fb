use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;
use std::sync::Arc;

/// Error kinds for DoruDB operations.
///
/// Every failure surfaced by the engine carries exactly one of these kinds so
/// callers can tell a transient lock timeout from a bad argument or a
/// duplicate document without parsing messages.
///
/// # Examples
///
/// ```rust
/// use dorudb::errors::{DoruError, DoruResult, ErrorKind};
///
/// fn example() -> DoruResult<()> {
///     Err(DoruError::new("Collection not specified", ErrorKind::InvalidArgument))
/// }
///
/// assert_eq!(example().unwrap_err().kind(), &ErrorKind::InvalidArgument);
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Request validation
    /// Empty or malformed collection name, malformed filter usage
    InvalidArgument,
    /// An explicit document ID is not a non-negative integer
    TypeMismatch,
    /// Update called with a document that has no ID
    MissingId,
    /// Create collided with an already stored document
    DuplicateId,
    /// The requested document does not exist
    NotFound,

    // Concurrency
    /// The bounded lock-retry budget was exhausted; safe to retry
    LockTimeout,

    // Query planning
    /// The query shape is not supported by the current configuration
    UnsupportedQuery,

    // Index maintenance
    /// Index update given something that is not a document
    InvalidInput,

    // Ambient
    /// Generic IO error
    IOError,
    /// Error encoding or decoding JSON
    EncodingError,
    /// A builder setting was rejected
    InvalidConfiguration,
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InvalidArgument => write!(f, "Invalid argument"),
            ErrorKind::TypeMismatch => write!(f, "Type mismatch"),
            ErrorKind::MissingId => write!(f, "Missing ID"),
            ErrorKind::DuplicateId => write!(f, "Duplicate ID"),
            ErrorKind::NotFound => write!(f, "Not found"),
            ErrorKind::LockTimeout => write!(f, "Lock timeout"),
            ErrorKind::UnsupportedQuery => write!(f, "Unsupported query"),
            ErrorKind::InvalidInput => write!(f, "Invalid input"),
            ErrorKind::IOError => write!(f, "IO error"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::InvalidConfiguration => write!(f, "Invalid configuration"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom DoruDB error type.
///
/// `DoruError` carries a message, an [`ErrorKind`], an optional cause and the
/// backtrace captured where it was created.
///
/// # Examples
///
/// ```rust
/// use dorudb::errors::{DoruError, ErrorKind};
///
/// let cause = DoruError::new("disk unplugged", ErrorKind::IOError);
/// let err = DoruError::new_with_cause("Index rewrite failed", ErrorKind::IOError, cause);
/// assert!(err.cause().is_some());
/// ```
#[derive(Clone)]
pub struct DoruError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<DoruError>>,
    backtrace: Arc<Backtrace>,
}

impl DoruError {
    /// Creates a new `DoruError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        DoruError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    /// Creates a new `DoruError` that keeps `cause` in its chain.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: DoruError) -> Self {
        DoruError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&DoruError> {
        self.cause.as_deref()
    }

    /// Returns `true` when retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        self.error_kind == ErrorKind::LockTimeout
    }
}

impl Display for DoruError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for DoruError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace),
        }
    }
}

impl Error for DoruError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for DoruDB operations.
pub type DoruResult<T> = Result<T, DoruError>;

impl From<std::io::Error> for DoruError {
    fn from(err: std::io::Error) -> Self {
        let error_kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            _ => ErrorKind::IOError,
        };
        DoruError::new(&format!("IO error: {}", err), error_kind)
    }
}

impl From<serde_json::Error> for DoruError {
    fn from(err: serde_json::Error) -> Self {
        DoruError::new(
            &format!("JSON encoding error: {}", err),
            ErrorKind::EncodingError,
        )
    }
}

impl From<std::string::FromUtf8Error> for DoruError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        DoruError::new(
            &format!("UTF-8 encoding error: {}", err),
            ErrorKind::EncodingError,
        )
    }
}

impl From<std::num::ParseIntError> for DoruError {
    fn from(err: std::num::ParseIntError) -> Self {
        DoruError::new(
            &format!("Integer parsing error: {}", err),
            ErrorKind::TypeMismatch,
        )
    }
}
