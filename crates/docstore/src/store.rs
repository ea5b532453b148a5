// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The traits a document store client implements.
//!
//! Handles are acquired synchronously and without I/O; only the operations that talk to
//! the store return futures. This lets callers hold on to handles cheaply and defer every
//! network round trip until it is actually needed.

use serde_json::{Map, Value};

use crate::{Document, Fields, Lookup, Mapping, Removal, Result};

/// Server or cluster diagnostics, passed through without interpretation.
pub type ServerStatus = Map<String, Value>;

/// A client connection to a document store.
pub trait DocumentStore: Send + Sync {
    /// The collection handle type of this store.
    type Collection: Collection;

    /// Returns a handle to the named collection.
    ///
    /// The collection is not required to exist; use [`Collection::exists`] and
    /// [`Collection::create`] to provision it.
    fn collection(&self, name: &str) -> Self::Collection;

    /// Queries the server for its status.
    ///
    /// Returns `None` if the store reports no status.
    fn server_status(&self) -> impl Future<Output = Result<Option<ServerStatus>>> + Send;
}

/// A handle to a named collection of documents (an index).
pub trait Collection: Send + Sync {
    /// The schema handle type of this collection.
    type Schema: Schema;

    /// Returns the collection name.
    fn name(&self) -> &str;

    /// Returns `true` if the collection exists in the store.
    fn exists(&self) -> impl Future<Output = Result<bool>> + Send;

    /// Creates the collection.
    fn create(&self) -> impl Future<Output = Result<()>> + Send;

    /// Makes all writes issued so far visible to subsequent reads.
    fn refresh(&self) -> impl Future<Output = Result<()>> + Send;

    /// Returns a handle to the named schema within this collection.
    fn schema(&self, name: &str) -> Self::Schema;
}

/// A handle to a schema (document type) within a collection.
pub trait Schema: Send + Sync {
    /// Returns the schema name.
    fn name(&self) -> &str;

    /// Sends the field declarations and TTL setting for this schema to the store.
    fn define(&self, mapping: &Mapping) -> impl Future<Output = Result<()>> + Send;

    /// Reads the document with the given id.
    fn get_document(&self, id: &str) -> impl Future<Output = Result<Lookup<Document>>> + Send;

    /// Builds a new document for this schema. No I/O is performed.
    fn create_document(&self, id: &str, fields: Fields) -> Document {
        Document::new(id, fields)
    }

    /// Writes a document that does not exist yet.
    fn add_document(&self, document: Document) -> impl Future<Output = Result<()>> + Send;

    /// Overwrites an existing document.
    fn update_document(&self, document: Document) -> impl Future<Output = Result<()>> + Send;

    /// Deletes the document with the given id.
    fn delete_by_id(&self, id: &str) -> impl Future<Output = Result<Removal>> + Send;

    /// Deletes every document under this schema.
    fn delete_all(&self) -> impl Future<Output = Result<()>> + Send;
}
