// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! In-memory document store for testing.
//!
//! This module provides [`InMemoryStore`], a document store that keeps everything in
//! process memory, records every call and supports failure injection. It models the two
//! store behaviors that id-addressed consumers must cope with:
//!
//! - **Delayed visibility**: added or updated documents are buffered and only become
//!   readable after [`Collection::refresh`]. Deletes take effect immediately.
//! - **TTL expiry**: when the schema mapping enables TTL, documents written with a TTL
//!   stop being readable once the store's [`Clock`] passes their expiry.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;
use tick::Clock;

use crate::{Collection, Document, DocumentStore, Error, Lookup, Mapping, Removal, Result, Schema, ServerStatus};

/// A recorded store call with full context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreOp {
    /// Server status was queried.
    ServerStatus,
    /// Collection existence was checked.
    CollectionExists {
        /// Collection name.
        collection: String,
    },
    /// A collection was created.
    CreateCollection {
        /// Collection name.
        collection: String,
    },
    /// A collection was refreshed.
    Refresh {
        /// Collection name.
        collection: String,
    },
    /// A schema mapping was sent.
    DefineSchema {
        /// Collection name.
        collection: String,
        /// Schema name.
        schema: String,
        /// The mapping that was sent.
        mapping: Mapping,
    },
    /// A document was read by id.
    GetDocument {
        /// Collection name.
        collection: String,
        /// Schema name.
        schema: String,
        /// Document id.
        id: String,
    },
    /// A new document was written.
    AddDocument {
        /// Collection name.
        collection: String,
        /// Schema name.
        schema: String,
        /// The document that was written.
        document: Document,
    },
    /// An existing document was overwritten.
    UpdateDocument {
        /// Collection name.
        collection: String,
        /// Schema name.
        schema: String,
        /// The document that was written.
        document: Document,
    },
    /// A document was deleted by id.
    DeleteById {
        /// Collection name.
        collection: String,
        /// Schema name.
        schema: String,
        /// Document id.
        id: String,
    },
    /// All documents of a schema were deleted.
    DeleteAll {
        /// Collection name.
        collection: String,
        /// Schema name.
        schema: String,
    },
}

impl StoreOp {
    fn describe(&self) -> &'static str {
        match self {
            Self::ServerStatus => "server status",
            Self::CollectionExists { .. } => "collection exists",
            Self::CreateCollection { .. } => "create collection",
            Self::Refresh { .. } => "refresh",
            Self::DefineSchema { .. } => "define schema",
            Self::GetDocument { .. } => "get document",
            Self::AddDocument { .. } => "add document",
            Self::UpdateDocument { .. } => "update document",
            Self::DeleteById { .. } => "delete by id",
            Self::DeleteAll { .. } => "delete all",
        }
    }
}

type FailPredicate = Box<dyn Fn(&StoreOp) -> bool + Send + Sync>;

#[derive(Clone, Debug)]
struct StoredDocument {
    document: Document,
    expires_at: Option<SystemTime>,
}

impl StoredDocument {
    fn is_live(&self, now: SystemTime) -> bool {
        self.expires_at.is_none_or(|expires_at| now < expires_at)
    }
}

#[derive(Debug, Default)]
struct SchemaState {
    mapping: Option<Mapping>,
    visible: HashMap<String, StoredDocument>,
    pending: HashMap<String, StoredDocument>,
}

impl SchemaState {
    fn live(&self, id: &str, now: SystemTime) -> Option<&StoredDocument> {
        self.pending
            .get(id)
            .or_else(|| self.visible.get(id))
            .filter(|stored| stored.is_live(now))
    }

    fn stage(&mut self, document: Document, now: SystemTime) {
        let ttl_enabled = self.mapping.as_ref().is_some_and(Mapping::is_ttl_enabled);
        let expires_at = document.ttl().filter(|_| ttl_enabled).and_then(|ttl| now.checked_add(ttl));
        self.pending
            .insert(document.id().to_string(), StoredDocument { document, expires_at });
    }

    fn refresh(&mut self) {
        self.visible.extend(self.pending.drain());
    }
}

#[derive(Debug, Default)]
struct CollectionState {
    schemas: HashMap<String, SchemaState>,
}

struct State {
    clock: Clock,
    collections: HashMap<String, CollectionState>,
    status: Option<ServerStatus>,
    operations: Vec<StoreOp>,
    fail_when: Option<FailPredicate>,
    // Collections that exist but read as absent to the next existence check.
    racing: HashSet<String>,
}

impl State {
    /// Records the call and returns an injected failure if the predicate matches.
    fn record(&mut self, op: StoreOp) -> Result<()> {
        let fail = self.fail_when.as_ref().is_some_and(|predicate| predicate(&op));
        let description = op.describe();
        self.operations.push(op);
        if fail {
            return Err(Error::transient(format!("in-memory store: {description} failed")));
        }
        Ok(())
    }

    fn collection_mut(&mut self, collection: &str) -> Result<&mut CollectionState> {
        self.collections
            .get_mut(collection)
            .ok_or_else(|| Error::permanent(format!("no such collection: {collection}")))
    }

    fn schema_mut(&mut self, collection: &str, schema: &str) -> Result<&mut SchemaState> {
        Ok(self.collection_mut(collection)?.schemas.entry(schema.to_string()).or_default())
    }
}

/// An in-memory document store that records calls and supports failure injection.
///
/// Clones share state, so a test can keep one clone for assertions while the code
/// under test owns another.
///
/// # Examples
///
/// ```
/// use docstore::testing::{InMemoryStore, StoreOp};
/// use docstore::{Collection, DocumentStore, Lookup, Schema};
/// use serde_json::Map;
/// use tick::Clock;
/// # futures::executor::block_on(async {
///
/// let store = InMemoryStore::new(Clock::new_frozen());
/// let collection = store.collection("cache");
/// collection.create().await?;
///
/// let schema = collection.schema("item");
/// schema.add_document(schema.create_document("a", Map::new())).await?;
///
/// // Writes become readable after a refresh.
/// assert_eq!(schema.get_document("a").await?, Lookup::NotFound);
/// collection.refresh().await?;
/// assert!(schema.get_document("a").await?.is_found());
/// # Ok::<(), docstore::Error>(())
/// # });
/// ```
#[derive(Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("InMemoryStore")
            .field("collections", &state.collections.keys().collect::<Vec<_>>())
            .field("operations", &state.operations.len())
            .field("fail_when", &state.fail_when.is_some())
            .finish()
    }
}

impl InMemoryStore {
    /// Creates an empty store whose TTL expiry follows `clock`.
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                clock,
                collections: HashMap::new(),
                status: None,
                operations: Vec::new(),
                fail_when: None,
                racing: HashSet::new(),
            })),
        }
    }

    /// Sets the payload returned by [`DocumentStore::server_status`].
    pub fn set_server_status(&self, status: Option<ServerStatus>) {
        self.state.lock().status = status;
    }

    /// Sets a predicate that decides which calls fail with a transient error.
    ///
    /// Failing calls are still recorded.
    ///
    /// # Examples
    ///
    /// ```
    /// use docstore::testing::{InMemoryStore, StoreOp};
    /// use tick::Clock;
    ///
    /// let store = InMemoryStore::new(Clock::new_frozen());
    ///
    /// // Fail every refresh
    /// store.fail_when(|op| matches!(op, StoreOp::Refresh { .. }));
    ///
    /// // Fail reads of one id only
    /// store.fail_when(|op| matches!(op, StoreOp::GetDocument { id, .. } if id == "poisoned"));
    /// ```
    pub fn fail_when<F>(&self, predicate: F)
    where
        F: Fn(&StoreOp) -> bool + Send + Sync + 'static,
    {
        self.state.lock().fail_when = Some(Box::new(predicate));
    }

    /// Clears the failure predicate.
    pub fn clear_failures(&self) {
        self.state.lock().fail_when = None;
    }

    /// Returns a copy of all recorded calls.
    #[must_use]
    pub fn operations(&self) -> Vec<StoreOp> {
        self.state.lock().operations.clone()
    }

    /// Clears the recorded calls.
    pub fn clear_operations(&self) {
        self.state.lock().operations.clear();
    }

    /// Creates a collection directly, without recording a call.
    pub fn seed_collection(&self, collection: &str) {
        self.state.lock().collections.entry(collection.to_string()).or_default();
    }

    /// Simulates another client creating `collection` right after the next existence check.
    ///
    /// The collection is created now, but the next [`Collection::exists`] call for it still
    /// reports `false`. A [`Collection::create`] that follows then fails because the
    /// collection already exists, and later existence checks report `true`.
    pub fn race_collection_create(&self, collection: &str) {
        let mut state = self.state.lock();
        state.collections.entry(collection.to_string()).or_default();
        state.racing.insert(collection.to_string());
    }

    /// Stores a document directly and makes it visible, without recording a call.
    ///
    /// The collection is created if needed.
    pub fn seed_document(&self, collection: &str, schema: &str, document: Document) {
        let mut state = self.state.lock();
        let now = state.clock.system_time();
        let schema = state
            .collections
            .entry(collection.to_string())
            .or_default()
            .schemas
            .entry(schema.to_string())
            .or_default();
        schema.stage(document, now);
        schema.refresh();
    }

    /// Returns `true` if the collection exists.
    #[must_use]
    pub fn has_collection(&self, collection: &str) -> bool {
        self.state.lock().collections.contains_key(collection)
    }

    /// Returns the last mapping defined for a schema.
    #[must_use]
    pub fn mapping(&self, collection: &str, schema: &str) -> Option<Mapping> {
        self.state
            .lock()
            .collections
            .get(collection)?
            .schemas
            .get(schema)?
            .mapping
            .clone()
    }

    /// Returns a live document regardless of whether it has been refreshed yet.
    #[must_use]
    pub fn document(&self, collection: &str, schema: &str, id: &str) -> Option<Document> {
        let state = self.state.lock();
        let now = state.clock.system_time();
        state
            .collections
            .get(collection)?
            .schemas
            .get(schema)?
            .live(id, now)
            .map(|stored| stored.document.clone())
    }

    /// Returns the number of live documents under a schema, refreshed or not.
    #[must_use]
    pub fn document_count(&self, collection: &str, schema: &str) -> usize {
        let state = self.state.lock();
        let now = state.clock.system_time();
        state
            .collections
            .get(collection)
            .and_then(|c| c.schemas.get(schema))
            .map_or(0, |s| {
                let mut ids: Vec<&String> = s.visible.keys().chain(s.pending.keys()).collect();
                ids.sort();
                ids.dedup();
                ids.into_iter().filter(|id| s.live(id, now).is_some()).count()
            })
    }
}

impl DocumentStore for InMemoryStore {
    type Collection = InMemoryCollection;

    fn collection(&self, name: &str) -> Self::Collection {
        InMemoryCollection {
            name: name.to_string(),
            state: Arc::clone(&self.state),
        }
    }

    async fn server_status(&self) -> Result<Option<ServerStatus>> {
        let mut state = self.state.lock();
        state.record(StoreOp::ServerStatus)?;
        Ok(state.status.clone())
    }
}

/// A collection handle of an [`InMemoryStore`].
#[derive(Clone)]
pub struct InMemoryCollection {
    name: String,
    state: Arc<Mutex<State>>,
}

impl std::fmt::Debug for InMemoryCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCollection").field("name", &self.name).finish()
    }
}

impl Collection for InMemoryCollection {
    type Schema = InMemorySchema;

    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self) -> Result<bool> {
        let mut state = self.state.lock();
        state.record(StoreOp::CollectionExists {
            collection: self.name.clone(),
        })?;
        if state.racing.remove(&self.name) {
            return Ok(false);
        }
        Ok(state.collections.contains_key(&self.name))
    }

    async fn create(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.record(StoreOp::CreateCollection {
            collection: self.name.clone(),
        })?;
        if state.collections.contains_key(&self.name) {
            return Err(Error::permanent(format!("collection already exists: {}", self.name)));
        }
        state.collections.insert(self.name.clone(), CollectionState::default());
        Ok(())
    }

    async fn refresh(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.record(StoreOp::Refresh {
            collection: self.name.clone(),
        })?;
        state
            .collection_mut(&self.name)?
            .schemas
            .values_mut()
            .for_each(SchemaState::refresh);
        Ok(())
    }

    fn schema(&self, name: &str) -> Self::Schema {
        InMemorySchema {
            collection: self.name.clone(),
            name: name.to_string(),
            state: Arc::clone(&self.state),
        }
    }
}

/// A schema handle of an [`InMemoryStore`].
#[derive(Clone)]
pub struct InMemorySchema {
    collection: String,
    name: String,
    state: Arc<Mutex<State>>,
}

impl std::fmt::Debug for InMemorySchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySchema")
            .field("collection", &self.collection)
            .field("name", &self.name)
            .finish()
    }
}

impl Schema for InMemorySchema {
    fn name(&self) -> &str {
        &self.name
    }

    async fn define(&self, mapping: &Mapping) -> Result<()> {
        let mut state = self.state.lock();
        state.record(StoreOp::DefineSchema {
            collection: self.collection.clone(),
            schema: self.name.clone(),
            mapping: mapping.clone(),
        })?;
        state.schema_mut(&self.collection, &self.name)?.mapping = Some(mapping.clone());
        Ok(())
    }

    async fn get_document(&self, id: &str) -> Result<Lookup<Document>> {
        let mut state = self.state.lock();
        state.record(StoreOp::GetDocument {
            collection: self.collection.clone(),
            schema: self.name.clone(),
            id: id.to_string(),
        })?;
        let now = state.clock.system_time();
        let schema = state.schema_mut(&self.collection, &self.name)?;
        let found = schema
            .visible
            .get(id)
            .filter(|stored| stored.is_live(now))
            .map(|stored| stored.document.clone());
        Ok(found.into())
    }

    async fn add_document(&self, document: Document) -> Result<()> {
        let mut state = self.state.lock();
        state.record(StoreOp::AddDocument {
            collection: self.collection.clone(),
            schema: self.name.clone(),
            document: document.clone(),
        })?;
        let now = state.clock.system_time();
        let schema = state.schema_mut(&self.collection, &self.name)?;
        if schema.live(document.id(), now).is_some() {
            return Err(Error::permanent(format!("document already exists: {}", document.id())));
        }
        schema.stage(document, now);
        Ok(())
    }

    async fn update_document(&self, document: Document) -> Result<()> {
        let mut state = self.state.lock();
        state.record(StoreOp::UpdateDocument {
            collection: self.collection.clone(),
            schema: self.name.clone(),
            document: document.clone(),
        })?;
        let now = state.clock.system_time();
        let schema = state.schema_mut(&self.collection, &self.name)?;
        if schema.live(document.id(), now).is_none() {
            return Err(Error::permanent(format!("document does not exist: {}", document.id())));
        }
        schema.stage(document, now);
        Ok(())
    }

    async fn delete_by_id(&self, id: &str) -> Result<Removal> {
        let mut state = self.state.lock();
        state.record(StoreOp::DeleteById {
            collection: self.collection.clone(),
            schema: self.name.clone(),
            id: id.to_string(),
        })?;
        let now = state.clock.system_time();
        let schema = state.schema_mut(&self.collection, &self.name)?;
        let existed = schema.live(id, now).is_some();
        schema.visible.remove(id);
        schema.pending.remove(id);
        Ok(if existed { Removal::Deleted } else { Removal::NotFound })
    }

    async fn delete_all(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.record(StoreOp::DeleteAll {
            collection: self.collection.clone(),
            schema: self.name.clone(),
        })?;
        let schema = state.schema_mut(&self.collection, &self.name)?;
        schema.visible.clear();
        schema.pending.clear();
        Ok(())
    }
}
