// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use serde_json::{Map, Value};

/// Field values of a document, keyed by field name.
pub type Fields = Map<String, Value>;

/// A document addressed by id within a schema.
///
/// Documents are plain data: building or modifying one performs no I/O. Send it to the
/// store with [`Schema::add_document`][crate::Schema::add_document] or
/// [`Schema::update_document`][crate::Schema::update_document].
///
/// # Examples
///
/// ```
/// use docstore::Document;
/// use serde_json::{Map, Value};
/// use std::time::Duration;
///
/// let mut fields = Map::new();
/// fields.insert("value".to_string(), Value::from("payload"));
///
/// let mut doc = Document::new("user:42", fields);
/// doc.set_ttl(Duration::from_secs(60));
///
/// assert_eq!(doc.id(), "user:42");
/// assert_eq!(doc.get_str("value"), Some("payload"));
/// assert_eq!(doc.ttl(), Some(Duration::from_secs(60)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    id: String,
    fields: Fields,
    ttl: Option<Duration>,
}

impl Document {
    /// Creates a document with the given id and fields and no TTL.
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
            ttl: None,
        }
    }

    /// Returns the document id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the value of a field, if present.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns the value of a field if it is present and holds a string.
    #[must_use]
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Returns all fields.
    #[must_use]
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Replaces all fields of the document.
    pub fn set_data(&mut self, fields: Fields) {
        self.fields = fields;
    }

    /// Returns the time-to-live requested for this document, if any.
    #[must_use]
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Requests store-managed expiry `ttl` after the document is written.
    pub fn set_ttl(&mut self, ttl: Duration) {
        self.ttl = Some(ttl);
    }
}
