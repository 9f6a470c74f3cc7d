// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! String-keyed attribute containers.
//!
//! A [`Bundle`] maps keys to arbitrary [`Value`]s. A [`PersistableBundle`]
//! only accepts primitive values, arrays of them and nested persistable
//! bundles. Both are self-delimiting on the wire:
//!
//! ```text
//! length:i32 (-1 = null) | magic:i32 | count:i32 | (key:string16, value)...
//!                         \_______________ length bytes ______________/
//! ```
//!
//! `length` is backpatched once the entries are written, so a reader can
//! check that it consumed exactly the bytes the writer produced.

use crate::config::{BUNDLE_MAGIC, NULL_LENGTH, PERSISTABLE_BUNDLE_MAGIC};
use crate::error::{Error, Result};
use crate::parcel::Parcel;
use crate::parcelable::{Creator, Parcelable, RegistryScope, ScopedCreator, WriteFlags};
use crate::value::{Value, ValueTag};
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Ordered mapping from string keys to tagged values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bundle {
    map: BTreeMap<String, Value>,
}

impl Bundle {
    /// Type identifier used when a bundle travels as a parcelable.
    pub const TYPE_IDENTIFIER: &'static str = "hparcel.Bundle";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Insert `value` under `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.map.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.map.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get_i32(&self, key: &str) -> Option<i32> {
        self.get(key).and_then(Value::as_i32)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}

impl Parcelable for Bundle {
    fn type_identifier(&self) -> &str {
        Self::TYPE_IDENTIFIER
    }

    fn write_to_parcel(&self, parcel: &mut Parcel, _flags: WriteFlags) -> Result<()> {
        parcel.write_bundle(Some(self))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Bundle restricted to values that survive outside the process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistableBundle {
    map: BTreeMap<String, Value>,
}

impl PersistableBundle {
    pub const TYPE_IDENTIFIER: &'static str = "hparcel.PersistableBundle";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Insert a persistable `value` under `key`.
    ///
    /// # Errors
    /// [`Error::UnsupportedValueType`] when `value` is not persistable; the
    /// bundle is left unchanged.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Result<Option<Value>> {
        let value = value.into();
        let tag = value.tag();
        if !tag.is_persistable() {
            return Err(Error::UnsupportedValueType(format!(
                "{:?} in a persistable bundle",
                tag
            )));
        }
        Ok(self.map.insert(key.into(), value))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.map.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Parcelable for PersistableBundle {
    fn type_identifier(&self) -> &str {
        Self::TYPE_IDENTIFIER
    }

    fn write_to_parcel(&self, parcel: &mut Parcel, _flags: WriteFlags) -> Result<()> {
        parcel.write_persistable_bundle(Some(self))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Registry creator for [`Bundle`]; nested parcelables resolve in the
/// caller's scope.
#[derive(Debug, Default)]
pub struct BundleCreator;

impl Creator for BundleCreator {
    fn type_identifier(&self) -> &str {
        Bundle::TYPE_IDENTIFIER
    }

    fn create_from_parcel(&self, parcel: &mut Parcel) -> Result<Arc<dyn Parcelable>> {
        self.create_from_parcel_scoped(parcel, RegistryScope::builtin())
    }

    fn as_scoped(&self) -> Option<&dyn ScopedCreator> {
        Some(self)
    }
}

impl ScopedCreator for BundleCreator {
    fn create_from_parcel_scoped(
        &self,
        parcel: &mut Parcel,
        scope: &RegistryScope,
    ) -> Result<Arc<dyn Parcelable>> {
        let offset = parcel.position();
        let bundle = parcel
            .read_bundle(scope)?
            .ok_or_else(|| Error::invalid(offset, "null bundle body"))?;
        Ok(Arc::new(bundle))
    }
}

#[derive(Debug, Default)]
pub struct PersistableBundleCreator;

impl Creator for PersistableBundleCreator {
    fn type_identifier(&self) -> &str {
        PersistableBundle::TYPE_IDENTIFIER
    }

    fn create_from_parcel(&self, parcel: &mut Parcel) -> Result<Arc<dyn Parcelable>> {
        let offset = parcel.position();
        let bundle = parcel
            .read_persistable_bundle()?
            .ok_or_else(|| Error::invalid(offset, "null bundle body"))?;
        Ok(Arc::new(bundle))
    }
}

impl Parcel {
    pub fn write_bundle(&mut self, bundle: Option<&Bundle>) -> Result<()> {
        match bundle {
            Some(bundle) => self.write_bundle_body(BUNDLE_MAGIC, &bundle.map),
            None => self.write_i32(NULL_LENGTH),
        }
    }

    pub fn read_bundle(&mut self, scope: &RegistryScope) -> Result<Option<Bundle>> {
        self.nested(|parcel| {
            let map = parcel.read_bundle_body(BUNDLE_MAGIC, |parcel, _| parcel.read_value(scope))?;
            Ok(map.map(|map| Bundle { map }))
        })
    }

    pub fn write_persistable_bundle(&mut self, bundle: Option<&PersistableBundle>) -> Result<()> {
        match bundle {
            Some(bundle) => self.write_bundle_body(PERSISTABLE_BUNDLE_MAGIC, &bundle.map),
            None => self.write_i32(NULL_LENGTH),
        }
    }

    /// Persistable values never reference registered types, so no scope is
    /// needed. A non-persistable tag is rejected before its payload is read.
    pub fn read_persistable_bundle(&mut self) -> Result<Option<PersistableBundle>> {
        self.nested(|parcel| {
            let scope = RegistryScope::builtin();
            let map = parcel.read_bundle_body(PERSISTABLE_BUNDLE_MAGIC, |parcel, key| {
                let raw = parcel.peek_i32()?;
                match ValueTag::try_from(raw) {
                    Ok(tag) if tag.is_persistable() => parcel.read_value(scope),
                    Ok(tag) => Err(Error::UnsupportedValueType(format!(
                        "{:?} under key '{}' in a persistable bundle",
                        tag, key
                    ))),
                    Err(tag) => Err(Error::UnknownTag {
                        tag,
                        offset: parcel.position(),
                    }),
                }
            })?;
            Ok(map.map(|map| PersistableBundle { map }))
        })
    }

    fn write_bundle_body(&mut self, magic: i32, map: &BTreeMap<String, Value>) -> Result<()> {
        let length_offset = self.position();
        self.write_i32(0)?;
        let start = self.position();
        self.write_i32(magic)?;
        self.write_len(map.len())?;
        for (key, value) in map {
            self.write_string(Some(key.as_str()))?;
            self.write_value(value)?;
        }
        let length = i32::try_from(self.position() - start).map_err(|_| Error::OutOfRange {
            offset: start,
            limit: i32::MAX as usize,
        })?;
        self.patch_i32(length_offset, length)
    }

    fn read_bundle_body(
        &mut self,
        magic: i32,
        mut read_entry: impl FnMut(&mut Parcel, &str) -> Result<Value>,
    ) -> Result<Option<BTreeMap<String, Value>>> {
        let offset = self.position();
        let length = self.read_i32()?;
        if length == NULL_LENGTH {
            return Ok(None);
        }
        let length = usize::try_from(length)
            .map_err(|_| Error::invalid(offset, format!("negative bundle length {}", length)))?;
        if length > self.available() {
            return Err(Error::TruncatedData {
                offset,
                requested: length,
                available: self.available(),
            });
        }

        let start = self.position();
        let found = self.read_i32()?;
        if found != magic {
            return Err(Error::invalid(
                start,
                format!("bad bundle magic {:#010x}, expected {:#010x}", found, magic),
            ));
        }
        let count_offset = self.position();
        // Key prefix plus value tag per entry.
        let count = self
            .read_nullable_len(8)?
            .ok_or_else(|| Error::invalid(count_offset, "null bundle entry count"))?;

        let mut map = BTreeMap::new();
        for _ in 0..count {
            let key_offset = self.position();
            let key = self
                .read_string()?
                .ok_or_else(|| Error::invalid(key_offset, "null bundle key"))?;
            let value = read_entry(self, &key)?;
            map.insert(key, value);
        }

        let consumed = self.position() - start;
        if consumed != length {
            return Err(Error::invalid(
                offset,
                format!("bundle declared {} bytes, entries used {}", length, consumed),
            ));
        }
        Ok(Some(map))
    }
}
