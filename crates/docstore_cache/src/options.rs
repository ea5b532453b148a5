// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Validated cache configuration.

use crate::{Error, Result};

/// Option key naming the collection (index) that holds the cache documents. Required.
pub const INDEX_OPTION: &str = "index";

/// Option key naming the schema (document type) of the cache documents.
pub const SCHEMA_OPTION: &str = "schema";

/// Schema name used when [`SCHEMA_OPTION`] is not given.
pub const DEFAULT_SCHEMA: &str = "cache-item";

/// Configuration of a [`DocumentCache`][crate::DocumentCache].
///
/// Validation happens when the options are built, so a misconfigured cache fails before
/// it ever talks to the store.
///
/// # Examples
///
/// ```
/// use docstore_cache::CacheOptions;
/// use std::collections::HashMap;
///
/// let mut map = HashMap::new();
/// map.insert("index", "app-cache");
///
/// let options = CacheOptions::from_map(map)?;
/// assert_eq!(options.index(), "app-cache");
/// assert_eq!(options.schema(), "cache-item");
/// # Ok::<(), docstore_cache::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheOptions {
    index: String,
    schema: String,
}

impl CacheOptions {
    /// Creates options for the given collection name and the default schema.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `index` is empty or blank.
    pub fn new(index: impl Into<String>) -> Result<Self> {
        Ok(Self {
            index: require(INDEX_OPTION, Some(index.into()))?,
            schema: DEFAULT_SCHEMA.to_string(),
        })
    }

    /// Builds options from string key/value pairs.
    ///
    /// Recognized keys are [`INDEX_OPTION`] and [`SCHEMA_OPTION`]; other keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the index option is missing or blank, or if the
    /// schema option is present but blank.
    pub fn from_map<I, K, V>(options: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut index = None;
        let mut schema = None;
        for (key, value) in options {
            match key.as_ref() {
                INDEX_OPTION => index = Some(value.into()),
                SCHEMA_OPTION => schema = Some(value.into()),
                _ => {}
            }
        }

        let options = Self::new(require(INDEX_OPTION, index)?)?;
        match schema {
            Some(schema) => options.with_schema(schema),
            None => Ok(options),
        }
    }

    /// Replaces the schema name.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `schema` is empty or blank.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Result<Self> {
        self.schema = require(SCHEMA_OPTION, Some(schema.into()))?;
        Ok(self)
    }

    /// Returns the collection name.
    #[must_use]
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Returns the schema name.
    #[must_use]
    pub fn schema(&self) -> &str {
        &self.schema
    }
}

fn require(option: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        Some(_) => Err(Error::configuration(format!("the \"{option}\" option must not be empty"))),
        None => Err(Error::configuration(format!("you must provide the \"{option}\" option"))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::ErrorKind;

    #[test]
    fn from_map_reads_index_and_schema() {
        let options = CacheOptions::from_map([("index", "cache"), ("schema", "entries"), ("unused", "x")])
            .expect("options should be valid");

        assert_eq!(options.index(), "cache");
        assert_eq!(options.schema(), "entries");
    }

    #[test]
    fn from_map_accepts_owned_map() {
        let mut map = HashMap::new();
        map.insert("index".to_string(), "cache".to_string());

        let options = CacheOptions::from_map(&map).expect("options should be valid");
        assert_eq!(options.index(), "cache");
        assert_eq!(options.schema(), DEFAULT_SCHEMA);
    }

    #[test]
    fn missing_index_is_rejected() {
        let error = CacheOptions::from_map(Vec::<(&str, &str)>::new()).expect_err("index is required");

        assert_eq!(error.kind(), ErrorKind::Configuration);
        assert!(format!("{error}").contains("you must provide the \"index\" option"));
    }

    #[test]
    fn blank_values_are_rejected() {
        assert!(CacheOptions::new("").is_err());
        assert!(CacheOptions::new("   ").is_err());
        assert!(CacheOptions::from_map([("index", "cache"), ("schema", "")]).is_err());
    }
}
