//! Error types for pgfixture

use thiserror::Error;

/// Result type alias for pgfixture operations
pub type SetupResult<T> = Result<T, SetupError>;

/// Error types for fixture building and execution
#[derive(Debug, Error)]
pub enum SetupError {
    /// A builder was used in the wrong phase (e.g. columns set twice, nothing to insert)
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// A builder argument broke a contract (name collision, count mismatch, unknown column)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Statement preparation or execution error
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// A value could not be written into a statement parameter
    #[error("Bind error on parameter {index}: {message}")]
    Bind { index: usize, message: String },

    /// The requested operation is not supported by the current configuration
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl SetupError {
    /// Create an illegal state error
    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::IllegalState(message.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a bind error for a 1-based parameter index
    pub fn bind(index: usize, message: impl Into<String>) -> Self {
        Self::Bind {
            index,
            message: message.into(),
        }
    }

    /// Check if this is an illegal state error
    pub fn is_illegal_state(&self) -> bool {
        matches!(self, Self::IllegalState(_))
    }

    /// Check if this is an invalid argument error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Check if the failure came from the database layer rather than from
    /// a misuse of the fixture API.
    pub fn is_database_error(&self) -> bool {
        match self {
            Self::Database(_) | Self::Connection(_) | Self::Bind { .. } => true,
            #[cfg(feature = "pool")]
            Self::Pool(_) => true,
            _ => false,
        }
    }

    /// SQLSTATE code reported by the server, if any.
    pub fn sql_state(&self) -> Option<&str> {
        match self {
            Self::Database(err) => err.as_db_error().map(|db| db.code().code()),
            _ => None,
        }
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for SetupError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
