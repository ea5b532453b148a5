// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for document store operations.

use recoverable::{Recovery, RecoveryInfo};

/// An error reported by a document store.
///
/// A missing document is never an error: lookups report it as [`Lookup::NotFound`][crate::Lookup::NotFound]
/// and deletions as [`Removal::NotFound`][crate::Removal::NotFound]. An `Error` therefore always means the
/// store could not complete the request.
///
/// Every error carries a [`RecoveryInfo`] so that callers and resilience middleware can tell
/// transient conditions (worth retrying) from permanent ones.
///
/// # Examples
///
/// ```
/// use docstore::Error;
/// use recoverable::{Recovery, RecoveryKind};
///
/// let error = Error::transient("connection reset by peer");
/// assert_eq!(error.recovery().kind(), RecoveryKind::Retry);
///
/// let error = Error::permanent("mapping conflict on field 'value'");
/// assert_eq!(error.recovery().kind(), RecoveryKind::Never);
/// ```
#[ohno::error]
pub struct Error {
    recovery: RecoveryInfo,
}

impl Error {
    /// Creates an error for a condition that may clear up if the request is retried,
    /// such as a timeout or a dropped connection.
    pub fn transient(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(RecoveryInfo::retry(), cause)
    }

    /// Creates an error for a store that is currently not serving requests.
    pub fn unavailable(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(RecoveryInfo::unavailable(), cause)
    }

    /// Creates an error for a request the store rejected and will keep rejecting.
    pub fn permanent(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(RecoveryInfo::never(), cause)
    }
}

impl Recovery for Error {
    fn recovery(&self) -> RecoveryInfo {
        self.recovery.clone()
    }
}

/// A specialized [`Result`] type for document store operations.
pub type Result<T> = std::result::Result<T, Error>;
