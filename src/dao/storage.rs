use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The store signaled quota exhaustion; retried with back-off before
    /// falling through to the general unavailable handling.
    #[error("storage rate limited: {message}")]
    RateLimited {
        /// Human readable description of the rate-limit signal.
        message: String,
    },
    /// The store cannot be reached or rejected the request.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Human readable description of the failure.
        message: String,
        /// Underlying backend failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A flush targeted a nickname with no existing row.
    #[error("no stored row for `{username}`")]
    RecordNotFound {
        /// Normalized nickname the write was aimed at.
        username: String,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Whether the error is the store's distinguishable rate-limit signal.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, StorageError::RateLimited { .. })
    }
}
