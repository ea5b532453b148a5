// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for cache operations.

use recoverable::{Recovery, RecoveryInfo};

/// The category of a cache [`Error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The cache was configured incorrectly. Raised at construction, never recovered.
    Configuration,
    /// The document store failed. The store error is kept as the source.
    Store,
    /// A stored value could not be decoded into the requested payload type.
    Codec,
}

/// An error from a cache operation.
///
/// Cache misses and deletes of absent ids are not errors; they are reported through the
/// return values of [`CacheProvider`][crate::CacheProvider]. Store failures forward the
/// store's [`RecoveryInfo`], so retry middleware sees the same classification the store
/// client reported.
///
/// # Examples
///
/// ```
/// use docstore_cache::{CacheOptions, ErrorKind};
///
/// let error = CacheOptions::from_map([("schema", "items")]).expect_err("index is required");
/// assert_eq!(error.kind(), ErrorKind::Configuration);
/// ```
#[ohno::error]
pub struct Error {
    kind: ErrorKind,
    recovery: RecoveryInfo,
}

impl Error {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::caused_by(ErrorKind::Configuration, RecoveryInfo::never(), message.into())
    }

    pub(crate) fn codec(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(ErrorKind::Codec, RecoveryInfo::never(), cause)
    }

    /// Returns the category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<docstore::Error> for Error {
    fn from(error: docstore::Error) -> Self {
        Self::caused_by(ErrorKind::Store, error.recovery(), error)
    }
}

impl Recovery for Error {
    fn recovery(&self) -> RecoveryInfo {
        self.recovery.clone()
    }
}

/// A specialized [`Result`] type for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use ohno::ErrorExt;
    use recoverable::RecoveryKind;

    use super::*;

    #[test]
    fn store_errors_keep_source_and_recovery() {
        let error = Error::from(docstore::Error::transient("connection reset"));

        assert_eq!(error.kind(), ErrorKind::Store);
        assert_eq!(error.recovery().kind(), RecoveryKind::Retry);
        assert!(error.find_source::<docstore::Error>().is_some());
        assert!(format!("{error}").contains("connection reset"));
    }

    #[test]
    fn configuration_errors_are_never_recoverable() {
        let error = Error::configuration("missing option");

        assert_eq!(error.kind(), ErrorKind::Configuration);
        assert_eq!(error.recovery().kind(), RecoveryKind::Never);
        assert!(format!("{error}").contains("missing option"));
    }

    #[test]
    fn codec_errors_are_never_recoverable() {
        let error = Error::codec("expected a string");

        assert_eq!(error.kind(), ErrorKind::Codec);
        assert_eq!(error.recovery().kind(), RecoveryKind::Never);
    }
}
