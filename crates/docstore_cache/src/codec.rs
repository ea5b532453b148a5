// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Conversion between cache payloads and document fields.
//!
//! Payloads are stored as their JSON text in the `value` field, so the document store
//! only ever sees strings. The `id` field mirrors the document id.

use std::time::Duration;

use docstore::{Document, FieldType, Fields, Mapping};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Error, Result};

/// Name of the field holding the cache key.
pub const ID_FIELD: &str = "id";

/// Name of the field holding the serialized payload.
pub const VALUE_FIELD: &str = "value";

/// The mapping every cache schema is provisioned with.
pub(crate) fn cache_mapping() -> Mapping {
    Mapping::new()
        .field(ID_FIELD, FieldType::String)
        .field(VALUE_FIELD, FieldType::String)
        .ttl_enabled(true)
}

pub(crate) fn encode<V: Serialize>(id: &str, payload: &V) -> Result<Fields> {
    let encoded = serde_json::to_string(payload).map_err(Error::codec)?;
    let mut fields = Fields::new();
    fields.insert(ID_FIELD.to_string(), Value::from(id));
    fields.insert(VALUE_FIELD.to_string(), Value::from(encoded));
    Ok(fields)
}

pub(crate) fn decode<V: DeserializeOwned>(document: &Document) -> Result<V> {
    let encoded = document
        .get_str(VALUE_FIELD)
        .ok_or_else(|| Error::codec(format!("document '{}' has no string '{VALUE_FIELD}' field", document.id())))?;
    serde_json::from_str(encoded).map_err(Error::codec)
}

/// Normalizes a requested TTL to whole seconds.
///
/// `None` and zero mean "no TTL override". Fractions of a second round up so that a short
/// TTL never collapses into "no expiry".
pub(crate) fn effective_ttl(ttl: Option<Duration>) -> Option<Duration> {
    ttl.filter(|ttl| !ttl.is_zero()).map(|ttl| {
        let secs = ttl.as_secs().saturating_add(u64::from(ttl.subsec_nanos() > 0));
        Duration::from_secs(secs)
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::ErrorKind;

    #[test]
    fn payload_round_trips_through_value_field() {
        let mut payload = BTreeMap::new();
        payload.insert("name".to_string(), vec![1_u32, 2, 3]);

        let fields = encode("k", &payload).expect("payload should encode");
        assert_eq!(fields[ID_FIELD], "k");
        assert!(fields[VALUE_FIELD].is_string());

        let decoded: BTreeMap<String, Vec<u32>> = decode(&Document::new("k", fields)).expect("payload should decode");
        assert_eq!(decoded, payload);
    }

    #[test]
    fn strings_are_stored_as_json_text() {
        let fields = encode("k", &"quote \" and\nnewline").expect("payload should encode");
        assert_eq!(fields[VALUE_FIELD], r#""quote \" and\nnewline""#);
    }

    #[test]
    fn missing_value_field_is_codec_error() {
        let error = decode::<String>(&Document::new("k", Fields::new())).expect_err("decode should fail");
        assert_eq!(error.kind(), ErrorKind::Codec);
    }

    #[test]
    fn mismatched_payload_type_is_codec_error() {
        let fields = encode("k", &"text").expect("payload should encode");
        let error = decode::<u64>(&Document::new("k", fields)).expect_err("decode should fail");
        assert_eq!(error.kind(), ErrorKind::Codec);
    }

    #[test]
    fn effective_ttl_treats_zero_as_none() {
        assert_eq!(effective_ttl(None), None);
        assert_eq!(effective_ttl(Some(Duration::ZERO)), None);
        assert_eq!(effective_ttl(Some(Duration::from_secs(30))), Some(Duration::from_secs(30)));
        assert_eq!(effective_ttl(Some(Duration::from_millis(1500))), Some(Duration::from_secs(2)));
        assert_eq!(effective_ttl(Some(Duration::from_millis(1))), Some(Duration::from_secs(1)));
    }

    #[test]
    fn effective_ttl_saturates_at_max_seconds() {
        assert_eq!(effective_ttl(Some(Duration::MAX)), Some(Duration::from_secs(u64::MAX)));
        assert_eq!(
            effective_ttl(Some(Duration::from_secs(u64::MAX))),
            Some(Duration::from_secs(u64::MAX))
        );
    }

    #[test]
    fn cache_mapping_declares_id_and_value_with_ttl() {
        let mapping = cache_mapping();
        let names: Vec<&str> = mapping.fields().iter().map(|f| f.name.as_str()).collect();

        assert_eq!(names, [ID_FIELD, VALUE_FIELD]);
        assert!(mapping.fields().iter().all(|f| f.field_type == FieldType::String));
        assert!(mapping.is_ttl_enabled());
    }
}
