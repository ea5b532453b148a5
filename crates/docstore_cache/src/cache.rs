// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The document-store backed cache.

use std::marker::PhantomData;
use std::time::Duration;

use async_once_cell::OnceCell;
use docstore::{Collection, DocumentStore, Lookup, Removal, Schema, ServerStatus};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::builder::DocumentCacheBuilder;
use crate::codec::{self, cache_mapping};
use crate::telemetry::{CacheActivity, CacheOperation, CacheTelemetry};
use crate::{CacheOptions, CacheProvider, Result};

type SchemaOf<S> = <<S as DocumentStore>::Collection as Collection>::Schema;

/// A cache whose entries are documents in a remote document store.
///
/// Each entry is one document, addressed by the cache key, whose `value` field holds the
/// JSON-serialized payload. The collection and its schema are provisioned lazily on first
/// use and the handles are kept for the lifetime of the cache; constructing a cache never
/// talks to the store.
///
/// Every successful [`save`](CacheProvider::save) refreshes the collection before it
/// returns, so a fetch that follows a save observes the saved value even on stores that
/// only make writes visible eventually.
///
/// # Examples
///
/// ```
/// use docstore::testing::InMemoryStore;
/// use docstore_cache::{CacheProvider, DocumentCache};
/// use tick::Clock;
/// # futures::executor::block_on(async {
///
/// let store = InMemoryStore::new(Clock::new_frozen());
/// let cache = DocumentCache::<_, String>::new(store, [("index", "app-cache")])?;
///
/// assert!(cache.save("greeting", &"hello".to_string(), None).await?);
/// assert_eq!(cache.fetch("greeting").await?.as_deref(), Some("hello"));
/// assert!(cache.delete("greeting").await?);
/// assert_eq!(cache.fetch("greeting").await?, None);
/// # Ok::<(), docstore_cache::Error>(())
/// # });
/// ```
pub struct DocumentCache<S, V>
where
    S: DocumentStore,
{
    store: S,
    options: CacheOptions,
    telemetry: CacheTelemetry,
    collection: OnceCell<S::Collection>,
    schema: OnceCell<SchemaOf<S>>,
    _phantom: PhantomData<fn() -> V>,
}

impl<S, V> std::fmt::Debug for DocumentCache<S, V>
where
    S: DocumentStore,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentCache")
            .field("index", &self.options.index())
            .field("schema", &self.options.schema())
            .field("provisioned", &self.schema.get().is_some())
            .finish_non_exhaustive()
    }
}

impl<S, V> DocumentCache<S, V>
where
    S: DocumentStore,
{
    /// Creates a cache over `store` from string options.
    ///
    /// See [`CacheOptions::from_map`] for the recognized keys.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the `index` option is missing or blank. No store
    /// call is made in either case.
    pub fn new<I, K, O>(store: S, options: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, O)>,
        K: AsRef<str>,
        O: Into<String>,
    {
        Ok(Self::from_parts(store, CacheOptions::from_map(options)?, true))
    }

    /// Creates a cache over `store` from validated options.
    #[must_use]
    pub fn with_options(store: S, options: CacheOptions) -> Self {
        Self::from_parts(store, options, true)
    }

    /// Returns a builder for configuring a cache over `store`.
    #[must_use]
    pub fn builder(store: S) -> DocumentCacheBuilder<S, V> {
        DocumentCacheBuilder::new(store)
    }

    pub(crate) fn from_parts(store: S, options: CacheOptions, logging_enabled: bool) -> Self {
        Self {
            store,
            options,
            telemetry: CacheTelemetry::new(logging_enabled),
            collection: OnceCell::new(),
            schema: OnceCell::new(),
            _phantom: PhantomData,
        }
    }

    /// Returns the name of the collection holding the cache documents.
    #[must_use]
    pub fn index(&self) -> &str {
        self.options.index()
    }

    /// Returns the name of the schema of the cache documents.
    #[must_use]
    pub fn schema_name(&self) -> &str {
        self.options.schema()
    }

    /// Returns the underlying store client.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Provisions the collection and schema now instead of on first use.
    ///
    /// Calling this more than once is harmless; provisioning runs at most once per cache.
    ///
    /// # Errors
    ///
    /// Returns a store error if the collection cannot be checked or created, or if the
    /// schema definition is rejected.
    pub async fn provision(&self) -> Result<()> {
        self.schema().await.map(|_| ())
    }

    async fn collection(&self) -> Result<&S::Collection> {
        self.collection
            .get_or_try_init(async {
                let collection = self.store.collection(self.options.index());
                self.ensure_exists(&collection).await.inspect_err(|error| {
                    self.telemetry.record_error(self.index(), CacheOperation::Provision, error);
                })?;
                Ok::<_, crate::Error>(collection)
            })
            .await
    }

    async fn ensure_exists(&self, collection: &S::Collection) -> Result<()> {
        if collection.exists().await? {
            return Ok(());
        }
        match collection.create().await {
            Ok(()) => {
                self.telemetry.record(self.index(), CacheOperation::Provision, CacheActivity::Inserted);
                Ok(())
            }
            // Another process may have created it between our check and our create.
            Err(error) => {
                if collection.exists().await? {
                    Ok(())
                } else {
                    Err(error.into())
                }
            }
        }
    }

    async fn schema(&self) -> Result<&SchemaOf<S>> {
        self.schema
            .get_or_try_init(async {
                let schema = self.collection().await?.schema(self.options.schema());
                schema.define(&cache_mapping()).await.map_err(|error| {
                    let error = crate::Error::from(error);
                    self.telemetry.record_error(self.index(), CacheOperation::Provision, &error);
                    error
                })?;
                self.telemetry.record(self.index(), CacheOperation::Provision, CacheActivity::Ok);
                Ok::<_, crate::Error>(schema)
            })
            .await
    }

    async fn lookup(&self, operation: CacheOperation, id: &str) -> Result<Lookup<docstore::Document>> {
        let schema = self.schema().await?;
        schema.get_document(id).await.map_err(|error| {
            let error = crate::Error::from(error);
            self.telemetry.record_error(self.index(), operation, &error);
            error
        })
    }

    /// The update-or-create sequence of a save, followed by the refresh.
    async fn write(&self, schema: &SchemaOf<S>, id: &str, data: &V, ttl: Option<Duration>) -> Result<CacheActivity>
    where
        V: Serialize,
    {
        let fields = codec::encode(id, data)?;

        let activity = match schema.get_document(id).await? {
            Lookup::Found(mut document) => {
                document.set_data(fields);
                if let Some(ttl) = ttl {
                    document.set_ttl(ttl);
                }
                schema.update_document(document).await?;
                CacheActivity::Updated
            }
            Lookup::NotFound => {
                let mut document = schema.create_document(id, fields);
                if let Some(ttl) = ttl {
                    document.set_ttl(ttl);
                }
                schema.add_document(document).await?;
                CacheActivity::Inserted
            }
        };

        self.collection().await?.refresh().await?;
        Ok(activity)
    }
}

impl<S, V> CacheProvider<V> for DocumentCache<S, V>
where
    S: DocumentStore,
    V: Serialize + DeserializeOwned + Send + Sync,
{
    async fn fetch(&self, id: &str) -> Result<Option<V>> {
        match self.lookup(CacheOperation::Fetch, id).await? {
            Lookup::Found(document) => {
                let value = codec::decode(&document).inspect_err(|error| {
                    self.telemetry.record_error(self.index(), CacheOperation::Fetch, error);
                })?;
                self.telemetry.record(self.index(), CacheOperation::Fetch, CacheActivity::Hit);
                Ok(Some(value))
            }
            Lookup::NotFound => {
                self.telemetry.record(self.index(), CacheOperation::Fetch, CacheActivity::Miss);
                Ok(None)
            }
        }
    }

    async fn contains(&self, id: &str) -> Result<bool> {
        let found = self.lookup(CacheOperation::Contains, id).await?.is_found();
        let activity = if found { CacheActivity::Hit } else { CacheActivity::Miss };
        self.telemetry.record(self.index(), CacheOperation::Contains, activity);
        Ok(found)
    }

    async fn save(&self, id: &str, data: &V, ttl: Option<Duration>) -> Result<bool> {
        let schema = self.schema().await?;

        match self.write(schema, id, data, codec::effective_ttl(ttl)).await {
            Ok(activity) => {
                self.telemetry.record(self.index(), CacheOperation::Save, activity);
                Ok(true)
            }
            Err(error) => {
                self.telemetry.record_error(self.index(), CacheOperation::Save, &error);
                Ok(false)
            }
        }
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let schema = self.schema().await?;
        match schema.delete_by_id(id).await {
            Ok(Removal::Deleted) => {
                self.telemetry.record(self.index(), CacheOperation::Delete, CacheActivity::Deleted);
                Ok(true)
            }
            Ok(Removal::NotFound) => {
                self.telemetry.record(self.index(), CacheOperation::Delete, CacheActivity::Miss);
                Ok(false)
            }
            Err(error) => {
                let error = crate::Error::from(error);
                self.telemetry.record_error(self.index(), CacheOperation::Delete, &error);
                Err(error)
            }
        }
    }

    async fn flush_all(&self) -> Result<bool> {
        let schema = self.schema().await?;
        schema.delete_all().await.map_err(|error| {
            let error = crate::Error::from(error);
            self.telemetry.record_error(self.index(), CacheOperation::Flush, &error);
            error
        })?;
        self.telemetry.record(self.index(), CacheOperation::Flush, CacheActivity::Deleted);
        Ok(true)
    }

    async fn stats(&self) -> Result<Option<ServerStatus>> {
        let status = self.store.server_status().await.map_err(|error| {
            let error = crate::Error::from(error);
            self.telemetry.record_error(self.index(), CacheOperation::Stats, &error);
            error
        })?;
        self.telemetry.record(self.index(), CacheOperation::Stats, CacheActivity::Ok);
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use docstore::testing::{InMemoryStore, StoreOp};
    use tick::Clock;

    use super::*;
    use crate::telemetry::testing::LogCapture;

    fn block_on<F: std::future::Future>(f: F) -> F::Output {
        futures::executor::block_on(f)
    }

    fn cache(store: &InMemoryStore, logs: bool) -> DocumentCache<InMemoryStore, String> {
        DocumentCache::builder(store.clone())
            .index("logged")
            .logs(logs)
            .build()
            .expect("index is set")
    }

    #[test]
    fn absorbed_save_failure_is_logged() {
        let capture = LogCapture::default();
        let _guard = tracing::subscriber::set_default(capture.subscriber());
        let store = InMemoryStore::new(Clock::new_frozen());
        store.fail_when(|op| matches!(op, StoreOp::AddDocument { .. }));

        let saved = block_on(cache(&store, true).save("k", &"v".to_string(), None)).expect("save absorbs failures");

        assert!(!saved);
        assert!(capture.output().contains("ERROR"));
        assert!(capture.output().contains("cache.save"));
        assert!(capture.output().contains("add document failed"));
    }

    #[test]
    fn successful_operations_are_logged() {
        let capture = LogCapture::default();
        let _guard = tracing::subscriber::set_default(capture.subscriber());
        let store = InMemoryStore::new(Clock::new_frozen());
        let cache = cache(&store, true);

        block_on(async {
            cache.save("k", &"v".to_string(), None).await.expect("save");
            cache.delete("k").await.expect("delete");
        });

        assert!(capture.output().contains("logged"));
        assert!(capture.output().contains("cache.inserted"));
        assert!(capture.output().contains("cache.deleted"));
    }

    #[test]
    fn logging_can_be_disabled() {
        let capture = LogCapture::default();
        let _guard = tracing::subscriber::set_default(capture.subscriber());
        let store = InMemoryStore::new(Clock::new_frozen());
        store.fail_when(|op| matches!(op, StoreOp::AddDocument { .. }));

        let saved = block_on(cache(&store, false).save("k", &"v".to_string(), None)).expect("save absorbs failures");

        assert!(!saved);
        assert!(capture.output().is_empty());
    }

    #[test]
    fn debug_reports_provisioning_state() {
        let store = InMemoryStore::new(Clock::new_frozen());
        let cache = cache(&store, false);
        assert!(format!("{cache:?}").contains("provisioned: false"));

        block_on(cache.provision()).expect("provision");
        assert!(format!("{cache:?}").contains("provisioned: true"));
    }
}
