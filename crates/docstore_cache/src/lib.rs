// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A cache provider backed by a remote document store.
//!
//! [`DocumentCache`] implements the [`CacheProvider`] contract (fetch, contains, save with
//! expiry, delete, flush and stats) on top of any [`docstore::DocumentStore`]. Each cache
//! entry is a document whose id is the cache key and whose `value` field holds the
//! JSON-serialized payload.
//!
//! # Semantics
//!
//! - **Lazy provisioning**: the collection is created if absent and the schema is defined
//!   (two string fields, TTL enabled) on first use, once per cache instance.
//! - **Misses are values**: an absent key is `Ok(None)` / `Ok(false)`, never an error.
//! - **Overwrite on save**: saving an existing key updates the document in place;
//!   saving a new key creates it.
//! - **Best-effort save**: failures while writing are logged and reported as `Ok(false)`.
//! - **Read after write**: a successful save refreshes the collection before returning.
//!
//! # Quick Start
//!
//! ```
//! use docstore::testing::InMemoryStore;
//! use docstore_cache::{CacheProvider, DocumentCache};
//! use std::time::Duration;
//! use tick::Clock;
//! # futures::executor::block_on(async {
//!
//! let cache = DocumentCache::<_, Vec<u32>>::builder(InMemoryStore::new(Clock::new_frozen()))
//!     .index("app-cache")
//!     .build()?;
//!
//! cache.save("primes", &vec![2, 3, 5, 7], Some(Duration::from_secs(300))).await?;
//! assert!(cache.contains("primes").await?);
//! assert_eq!(cache.fetch("primes").await?, Some(vec![2, 3, 5, 7]));
//! # Ok::<(), docstore_cache::Error>(())
//! # });
//! ```
//!
//! # Logging
//!
//! Every operation emits a `cache.event` record through `tracing` with the fields
//! `cache.name`, `cache.operation` and `cache.activity`. Disable it per cache with
//! [`DocumentCacheBuilder::logs`].

pub mod builder;
pub mod cache;
mod codec;
pub mod error;
pub mod options;
pub mod provider;
mod telemetry;

#[doc(inline)]
pub use builder::DocumentCacheBuilder;
#[doc(inline)]
pub use cache::DocumentCache;
#[doc(inline)]
pub use codec::{ID_FIELD, VALUE_FIELD};
#[doc(inline)]
pub use error::{Error, ErrorKind, Result};
#[doc(inline)]
pub use options::{CacheOptions, DEFAULT_SCHEMA, INDEX_OPTION, SCHEMA_OPTION};
#[doc(inline)]
pub use provider::CacheProvider;
