// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Schema definitions sent to the store when provisioning a schema.

use serde::{Deserialize, Serialize};

/// The storage type of a mapped field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum FieldType {
    /// Text.
    String,
}

/// A single field declaration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name.
    pub name: String,
    /// Field storage type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl FieldSpec {
    /// Creates a field declaration.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// The shape of the documents under a schema.
///
/// A mapping lists the declared fields and whether the store expires documents
/// that carry a time-to-live.
///
/// # Examples
///
/// ```
/// use docstore::{FieldType, Mapping};
///
/// let mapping = Mapping::new()
///     .field("id", FieldType::String)
///     .field("value", FieldType::String)
///     .ttl_enabled(true);
///
/// assert_eq!(mapping.fields().len(), 2);
/// assert!(mapping.is_ttl_enabled());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    fields: Vec<FieldSpec>,
    ttl_enabled: bool,
}

impl Mapping {
    /// Creates an empty mapping with TTL disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field declaration.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.push(FieldSpec::new(name, field_type));
        self
    }

    /// Enables or disables store-managed TTL expiry.
    #[must_use]
    pub fn ttl_enabled(mut self, enabled: bool) -> Self {
        self.ttl_enabled = enabled;
        self
    }

    /// Returns the declared fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Returns `true` if documents under this mapping may expire.
    #[must_use]
    pub fn is_ttl_enabled(&self) -> bool {
        self.ttl_enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_serializes_field_types() {
        let mapping = Mapping::new().field("value", FieldType::String).ttl_enabled(true);
        let json = serde_json::to_value(&mapping).expect("mapping should serialize");

        assert_eq!(json["fields"][0]["name"], "value");
        assert_eq!(json["fields"][0]["type"], "string");
        assert_eq!(json["ttl_enabled"], true);
    }

    #[test]
    fn identical_mappings_compare_equal() {
        let a = Mapping::new().field("id", FieldType::String).ttl_enabled(true);
        let b = Mapping::new().field("id", FieldType::String).ttl_enabled(true);
        assert_eq!(a, b);
    }
}
