// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Client-side contract for schema-described document stores.
//!
//! A document store keeps documents addressable by id inside named collections, with a
//! schema describing the fields of the documents stored under it. This crate defines the
//! small slice of such a store that id-addressed consumers (for example caches) need:
//!
//! - [`DocumentStore`] hands out [`Collection`] handles and reports server status.
//! - [`Collection`] can be checked for existence, created and refreshed, and hands out
//!   [`Schema`] handles.
//! - [`Schema`] accepts a [`Mapping`] and performs reads, writes and deletes of
//!   [`Document`]s by id.
//!
//! Reads and deletes report absence as data ([`Lookup::NotFound`], [`Removal::NotFound`]),
//! so an [`Error`] always means the store failed to answer.
//!
//! # Testing
//!
//! Enable the `test-util` feature for `testing::InMemoryStore`, an in-memory store
//! that records every call, supports failure injection and models delayed write
//! visibility and TTL expiry.

mod document;
pub mod error;
pub mod lookup;
pub mod mapping;
pub mod store;
#[cfg(any(feature = "test-util", test))]
pub mod testing;

#[doc(inline)]
pub use document::{Document, Fields};
#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use lookup::{Lookup, Removal};
#[doc(inline)]
pub use mapping::{FieldSpec, FieldType, Mapping};
#[doc(inline)]
pub use store::{Collection, DocumentStore, Schema, ServerStatus};
