// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Decode dispatch: tag -> payload -> `Value`.
//!
//! Must stay in lockstep with `write.rs`: every tag the encoder emits has
//! exactly one arm here. Unlike the standalone `create_*` readers, an
//! implausible array length inside a tagged value is corrupt input and
//! fails the whole decode.

use super::{Size, SizeF, Value, ValueTag};
use crate::config::NULL_LENGTH;
use crate::error::{Error, Result};
use crate::parcel::Parcel;
use crate::parcelable::RegistryScope;
use crate::serializer::SerializedObject;
use std::collections::BTreeMap;

impl Parcel {
    /// Read one tagged value.
    ///
    /// `scope` resolves the type identifiers of any polymorphic objects
    /// met along the way.
    pub fn read_value(&mut self, scope: &RegistryScope) -> Result<Value> {
        self.nested(|parcel| parcel.read_value_at_depth(scope))
    }

    fn read_value_at_depth(&mut self, scope: &RegistryScope) -> Result<Value> {
        let offset = self.position();
        let raw = self.read_i32()?;
        let tag = ValueTag::try_from(raw).map_err(|tag| {
            log::warn!("[parcel] unknown value tag {} at offset {}", tag, offset);
            Error::UnknownTag { tag, offset }
        })?;

        let value = match tag {
            ValueTag::Null => Value::Null,
            ValueTag::String => self.read_string()?.map_or(Value::Null, Value::String),
            ValueTag::Integer => Value::Int(self.read_i32()?),
            ValueTag::Map => self.read_map(scope)?.map_or(Value::Null, Value::Map),
            ValueTag::Bundle => self.read_bundle(scope)?.map_or(Value::Null, Value::Bundle),
            ValueTag::PersistableBundle => self
                .read_persistable_bundle()?
                .map_or(Value::Null, Value::PersistableBundle),
            ValueTag::Parcelable => self
                .read_parcelable(scope)?
                .map_or(Value::Null, Value::Parcelable),
            ValueTag::Short => Value::Short(self.read_i16()?),
            ValueTag::Long => Value::Long(self.read_i64()?),
            ValueTag::Float => Value::Float(self.read_f32()?),
            ValueTag::Double => Value::Double(self.read_f64()?),
            ValueTag::Boolean => Value::Bool(self.read_bool()?),
            ValueTag::Byte => Value::Byte(self.read_byte()?),
            ValueTag::CharSequence => self.read_text()?.map_or(Value::Null, Value::Text),
            ValueTag::List => self.read_list(scope)?.map_or(Value::Null, Value::List),
            ValueTag::SparseArray => self
                .read_sparse_array(scope)?
                .map_or(Value::Null, Value::SparseArray),
            ValueTag::SparseBooleanArray => self
                .read_sparse_boolean_array()?
                .map_or(Value::Null, Value::SparseBooleanArray),
            ValueTag::BooleanArray => self
                .strict(Parcel::create_bool_array)?
                .map_or(Value::Null, Value::BoolArray),
            ValueTag::ByteArray => self
                .strict(Parcel::create_byte_array)?
                .map_or(Value::Null, Value::ByteArray),
            ValueTag::StringArray => self
                .strict(Parcel::create_string_array)?
                .map_or(Value::Null, Value::StringArray),
            ValueTag::CharSequenceArray => self
                .strict(Parcel::create_text_array)?
                .map_or(Value::Null, Value::TextArray),
            ValueTag::IntArray => self
                .strict(Parcel::create_int_array)?
                .map_or(Value::Null, Value::IntArray),
            ValueTag::LongArray => self
                .strict(Parcel::create_long_array)?
                .map_or(Value::Null, Value::LongArray),
            ValueTag::DoubleArray => self
                .strict(Parcel::create_double_array)?
                .map_or(Value::Null, Value::DoubleArray),
            ValueTag::IBinder => self
                .read_strong_binder()?
                .map_or(Value::Null, Value::Binder),
            ValueTag::ParcelableArray => self
                .read_parcelable_array(scope)?
                .map_or(Value::Null, Value::ParcelableArray),
            ValueTag::Size => Value::Size(Size::new(self.read_i32()?, self.read_i32()?)),
            ValueTag::SizeF => Value::SizeF(SizeF::new(self.read_f32()?, self.read_f32()?)),
            ValueTag::ObjectArray => self
                .read_object_array(scope)?
                .map_or(Value::Null, Value::ObjectArray),
            ValueTag::Serializable => self
                .read_serializable()?
                .map_or(Value::Null, Value::Serializable),
        };
        Ok(value)
    }

    /// Run a lenient `create_*` reader, turning its "implausible length"
    /// `None` into an error. A genuine null (`-1`) still yields `None`.
    fn strict<T>(&mut self, create: fn(&mut Parcel) -> Result<Option<T>>) -> Result<Option<T>> {
        let offset = self.position();
        let marker = self.peek_i32()?;
        match create(self)? {
            None if marker != NULL_LENGTH => Err(Error::invalid(
                offset,
                format!("array length {} exceeds the remaining data", marker),
            )),
            values => Ok(values),
        }
    }

    pub fn read_map(&mut self, scope: &RegistryScope) -> Result<Option<Vec<(Value, Value)>>> {
        // Two tags per entry at minimum.
        let Some(count) = self.read_nullable_len(8)? else {
            return Ok(None);
        };
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let key = self.read_value(scope)?;
            let value = self.read_value(scope)?;
            entries.push((key, value));
        }
        Ok(Some(entries))
    }

    pub fn read_list(&mut self, scope: &RegistryScope) -> Result<Option<Vec<Value>>> {
        let Some(count) = self.read_nullable_len(4)? else {
            return Ok(None);
        };
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(self.read_value(scope)?);
        }
        Ok(Some(items))
    }

    pub fn read_object_array(&mut self, scope: &RegistryScope) -> Result<Option<Vec<Value>>> {
        self.read_list(scope)
    }

    /// Later duplicates of a key replace earlier ones.
    pub fn read_sparse_array(
        &mut self,
        scope: &RegistryScope,
    ) -> Result<Option<BTreeMap<i32, Value>>> {
        let Some(count) = self.read_nullable_len(8)? else {
            return Ok(None);
        };
        let mut entries = BTreeMap::new();
        for _ in 0..count {
            let key = self.read_i32()?;
            let value = self.read_value(scope)?;
            entries.insert(key, value);
        }
        Ok(Some(entries))
    }

    pub fn read_sparse_boolean_array(&mut self) -> Result<Option<BTreeMap<i32, bool>>> {
        let Some(count) = self.read_nullable_len(8)? else {
            return Ok(None);
        };
        let mut entries = BTreeMap::new();
        for _ in 0..count {
            let key = self.read_i32()?;
            let value = self.read_bool()?;
            entries.insert(key, value);
        }
        Ok(Some(entries))
    }

    /// A null type name is a null object; a null blob is corrupt.
    pub fn read_serializable(&mut self) -> Result<Option<SerializedObject>> {
        let Some(type_name) = self.read_string()? else {
            return Ok(None);
        };
        let offset = self.position();
        let data = self
            .strict(Parcel::create_byte_array)?
            .ok_or_else(|| Error::invalid(offset, "serializable without payload"))?;
        Ok(Some(SerializedObject { type_name, data }))
    }
}
