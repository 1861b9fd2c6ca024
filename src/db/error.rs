//! Storage error type returned by every gateway operation.

use std::fmt;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A storage operation failed.
///
/// Constraint violations, I/O errors and (de)serialization errors all
/// surface as this one type. The underlying cause is available through
/// [`std::error::Error::source`].
#[derive(Debug, thiserror::Error)]
#[error("Storage operation failed ({operation}): {source}")]
pub struct StorageError {
    operation: &'static str,
    #[source]
    source: BoxError,
}

pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    pub fn new(operation: &'static str, source: impl Into<BoxError>) -> Self {
        Self {
            operation,
            source: source.into(),
        }
    }

    /// Name of the operation that failed, e.g. `"upsert workout"`.
    pub fn operation(&self) -> &'static str {
        self.operation
    }
}

/// Converts any fallible result into a [`StorageResult`] tagged with the
/// operation name, logging the failure.
pub(crate) trait Context<T> {
    fn during(self, operation: &'static str) -> StorageResult<T>;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: Into<BoxError> + fmt::Display,
{
    fn during(self, operation: &'static str) -> StorageResult<T> {
        self.map_err(|e| {
            tracing::warn!("{} failed: {}", operation, e);
            StorageError::new(operation, e)
        })
    }
}
