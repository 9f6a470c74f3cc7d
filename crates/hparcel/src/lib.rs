// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # HPARCEL - Marshalling container for cross-process calls
//!
//! A [`Parcel`] is a growable, position-addressed byte buffer that carries
//! call arguments and replies between address spaces on the same host.
//! On top of the flat primitives it layers a tagged-value protocol, a
//! polymorphic object protocol with a scoped type registry, and a reply
//! status channel.
//!
//! ## Quick Start
//!
//! ```rust
//! use hparcel::{Bundle, Parcel, RegistryScope, Result, Value};
//!
//! fn main() -> Result<()> {
//!     let mut bundle = Bundle::new();
//!     bundle.insert("answer", 42);
//!     bundle.insert("name", "hparcel");
//!
//!     let mut parcel = Parcel::new();
//!     parcel.write_value(&Value::List(vec![Value::Bundle(bundle), Value::Null]))?;
//!
//!     parcel.set_position(0)?;
//!     let back = parcel.read_value(&RegistryScope::default())?;
//!     assert!(matches!(back, Value::List(ref items) if items.len() == 2));
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |  Status channel     write_status_* / read_status                    |
//! +---------------------------------------------------------------------+
//! |  Tagged values      Value, ValueTag, ValueClassifier, Bundle        |
//! +---------------------------------------------------------------------+
//! |  Object protocol    Parcelable, Creator, RegistryScope, CreatorCache|
//! +---------------------------------------------------------------------+
//! |  Flat primitives    scalars, strings, arrays, binders, tokens       |
//! +---------------------------------------------------------------------+
//! |  Parcel             data | position | size | capacity  (+ pool)     |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Parcel`] | The byte container and every read/write operation |
//! | [`Value`] | One tagged value, as produced by [`Parcel::read_value`] |
//! | [`Bundle`] | String-keyed map of values with its own framing |
//! | [`RegistryScope`] | Context type identifiers are resolved under |
//! | [`ParcelPool`] | Bounded free-list of reusable parcels |
//!
//! ## Wire format
//!
//! Host byte order, every datum padded to 4 bytes. The output of
//! [`Parcel::marshall`] is only meaningful to the same build on the same
//! host; it is not a storage format.

pub mod bundle;
pub mod config;
pub mod error;
pub mod parcel;
pub mod parcelable;
pub mod pool;
pub mod serializer;
pub mod status;
pub mod value;

pub use bundle::{Bundle, BundleCreator, PersistableBundle, PersistableBundleCreator};
pub use config::ParcelConfig;
pub use error::{Error, Result};
pub use parcel::{Binder, Parcel};
pub use parcelable::{
    CacheStats, Creator, CreatorCache, FromParcel, HashMapTypeRegistry, Parcelable, RegistryScope,
    ScopeId, ScopedCreator, TypeRegistry, TypedCreator, WriteFlags,
};
pub use pool::{ParcelPool, PoolStats, PooledParcel};
#[cfg(feature = "serde")]
pub use serializer::JsonObjectSerializer;
pub use serializer::{ObjectSerializer, SerializedObject};
pub use status::{RemoteException, StatusKind};
pub use value::{Size, SizeF, Value, ValueClassifier, ValueTag};
