// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for configuring document caches.

use std::marker::PhantomData;

use docstore::DocumentStore;

use crate::{CacheOptions, DocumentCache, Result};

/// Builder for a [`DocumentCache`].
///
/// # Examples
///
/// ```
/// use docstore::testing::InMemoryStore;
/// use docstore_cache::DocumentCache;
/// use tick::Clock;
///
/// let cache = DocumentCache::<_, String>::builder(InMemoryStore::new(Clock::new_frozen()))
///     .index("app-cache")
///     .schema("sessions")
///     .logs(false)
///     .build()?;
///
/// assert_eq!(cache.index(), "app-cache");
/// assert_eq!(cache.schema_name(), "sessions");
/// # Ok::<(), docstore_cache::Error>(())
/// ```
pub struct DocumentCacheBuilder<S, V> {
    store: S,
    index: Option<String>,
    schema: Option<String>,
    logging_enabled: bool,
    _phantom: PhantomData<fn() -> V>,
}

impl<S, V> std::fmt::Debug for DocumentCacheBuilder<S, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentCacheBuilder")
            .field("index", &self.index)
            .field("schema", &self.schema)
            .field("logging_enabled", &self.logging_enabled)
            .finish_non_exhaustive()
    }
}

impl<S, V> DocumentCacheBuilder<S, V>
where
    S: DocumentStore,
{
    pub(crate) fn new(store: S) -> Self {
        Self {
            store,
            index: None,
            schema: None,
            logging_enabled: true,
            _phantom: PhantomData,
        }
    }

    /// Sets the collection (index) holding the cache documents. Required.
    #[must_use]
    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Sets the schema (document type) of the cache documents.
    ///
    /// Defaults to [`DEFAULT_SCHEMA`][crate::DEFAULT_SCHEMA].
    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Takes index and schema from already validated options.
    #[must_use]
    pub fn options(mut self, options: CacheOptions) -> Self {
        self.index = Some(options.index().to_string());
        self.schema = Some(options.schema().to_string());
        self
    }

    /// Enables or disables `cache.event` log records. Enabled by default.
    #[must_use]
    pub fn logs(mut self, enabled: bool) -> Self {
        self.logging_enabled = enabled;
        self
    }

    /// Validates the configuration and builds the cache. No store calls are made.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no index was set, or if the index or schema is blank.
    pub fn build(self) -> Result<DocumentCache<S, V>> {
        let mut options = Vec::with_capacity(2);
        if let Some(index) = self.index {
            options.push((crate::INDEX_OPTION, index));
        }
        if let Some(schema) = self.schema {
            options.push((crate::SCHEMA_OPTION, schema));
        }
        let options = CacheOptions::from_map(options)?;
        Ok(DocumentCache::from_parts(self.store, options, self.logging_enabled))
    }
}
