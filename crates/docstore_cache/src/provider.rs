// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The cache contract exposed to callers.

use std::time::Duration;

use docstore::ServerStatus;

use crate::Result;

/// A key/value cache with per-entry expiry.
///
/// Keys are plain strings; callers that namespace their keys do so before calling in.
///
/// Absence is never an error: [`fetch`](Self::fetch) reports a miss as `Ok(None)`,
/// [`contains`](Self::contains) as `Ok(false)` and [`delete`](Self::delete) of an absent
/// key as `Ok(false)`. An `Err` means the backing store could not be used at all and the
/// cache should be treated as unavailable.
pub trait CacheProvider<V>: Send + Sync {
    /// Fetches the payload cached under `id`, or `None` on a miss.
    fn fetch(&self, id: &str) -> impl Future<Output = Result<Option<V>>> + Send;

    /// Returns `true` if an entry is cached under `id`.
    fn contains(&self, id: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Caches `data` under `id`, replacing any previous entry.
    ///
    /// A `ttl` of `None` or zero sets no expiry override. Saving is best effort:
    /// `Ok(false)` means the entry was not cached, which callers must tolerate.
    fn save(&self, id: &str, data: &V, ttl: Option<Duration>) -> impl Future<Output = Result<bool>> + Send;

    /// Deletes the entry cached under `id`. Returns `false` if there was none.
    fn delete(&self, id: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Deletes every entry of this cache.
    fn flush_all(&self) -> impl Future<Output = Result<bool>> + Send;

    /// Returns diagnostics of the backing store, if it reports any.
    fn stats(&self) -> impl Future<Output = Result<Option<ServerStatus>>> + Send;
}
