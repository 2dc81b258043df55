use thiserror::Error;
use uuid::Uuid;

/// Failure raised by the underlying repository during a session operation.
///
/// This is the "checked" error surface of the [`Session`](crate::session::Session)
/// trait. Callers of the template never see it directly: the template executor
/// converts it into [`AccessError`] at its boundary.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("no item found at path '{0}'")]
    PathNotFound(String),

    #[error("no node found for id '{0}'")]
    NodeNotFound(Uuid),

    #[error("item already exists at path '{0}'")]
    ItemExists(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("lock failure: {0}")]
    Lock(String),

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("unsupported repository operation: {0}")]
    UnsupportedOperation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("repository failure: {0}")]
    Internal(String),
}

/// Unified error taxonomy surfaced by the template executor.
///
/// Everything above the executor sees only this closed set; repository
/// failures, I/O failures and uncaught callback failures are all funneled
/// through [`convert_access_error`].
#[derive(Error, Debug)]
pub enum AccessError {
    /// No session is bound to the current context and creation is disallowed.
    #[error("no session bound to the current context and session creation is disallowed")]
    ResourceUnavailable,

    /// A repository-level or I/O failure occurred while a session was in use.
    #[error("repository access failure: {0}")]
    ResourceAccessFailure(#[source] RepositoryError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A callback failure outside the repository taxonomy, surfaced unchanged.
    #[error(transparent)]
    Unclassified(#[from] anyhow::Error),
}

/// The closed set of failures a template callback may raise.
///
/// `Access` exists so a callback can propagate the result of a nested
/// template invocation with `?`; it passes through translation unchanged.
#[derive(Error, Debug)]
pub enum CallbackError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AccessError>;
pub type SessionResult<T> = std::result::Result<T, RepositoryError>;
pub type CallbackResult<T> = std::result::Result<T, CallbackError>;

/// Single conversion entry point from callback failures into the unified
/// taxonomy. Pure mapping: no inspection, no retries.
pub fn convert_access_error(err: CallbackError) -> AccessError {
    match err {
        CallbackError::Repository(e) => AccessError::ResourceAccessFailure(e),
        // I/O during streamed import looks like a repository failure to callers.
        CallbackError::Io(e) => AccessError::ResourceAccessFailure(RepositoryError::Io(e)),
        CallbackError::Access(e) => e,
        CallbackError::Other(e) => AccessError::Unclassified(e),
    }
}

impl From<CallbackError> for AccessError {
    fn from(err: CallbackError) -> Self {
        convert_access_error(err)
    }
}
