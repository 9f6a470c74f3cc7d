// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Encode dispatch: `Value` -> tag -> payload.

use super::{Value, ValueTag};
use crate::bundle::{Bundle, PersistableBundle};
use crate::config::NULL_LENGTH;
use crate::error::{Error, Result};
use crate::parcel::Parcel;
use crate::parcelable::{Parcelable, WriteFlags};
use crate::serializer::SerializedObject;
use std::collections::BTreeMap;

impl Parcel {
    /// Write `value` as a tag followed by its payload.
    pub fn write_value(&mut self, value: &Value) -> Result<()> {
        let tag = value.tag();
        self.write_i32(tag.as_i32())?;

        match value {
            Value::Null => Ok(()),
            Value::String(s) => self.write_string(Some(s.as_str())),
            Value::Int(v) => self.write_i32(*v),
            Value::Map(entries) => self.write_map(Some(entries.as_slice())),
            Value::Bundle(bundle) => self.write_bundle(Some(bundle)),
            Value::PersistableBundle(bundle) => self.write_persistable_bundle(Some(bundle)),
            Value::Parcelable(p) => self.write_parcelable_payload(tag, p.as_ref()),
            Value::Short(v) => self.write_i16(*v),
            Value::Long(v) => self.write_i64(*v),
            Value::Float(v) => self.write_f32(*v),
            Value::Double(v) => self.write_f64(*v),
            Value::Bool(v) => self.write_bool(*v),
            Value::Byte(v) => self.write_byte(*v),
            Value::Text(s) => self.write_text(Some(s.as_str())),
            Value::List(items) => self.write_list(Some(items.as_slice())),
            Value::SparseArray(entries) => self.write_sparse_array(Some(entries)),
            Value::SparseBooleanArray(entries) => self.write_sparse_boolean_array(Some(entries)),
            Value::BoolArray(v) => self.write_bool_array(Some(v.as_slice())),
            Value::ByteArray(v) => self.write_byte_array(Some(v.as_slice())),
            Value::StringArray(v) => self.write_string_array(Some(v.as_slice())),
            Value::TextArray(v) => self.write_text_array(Some(v.as_slice())),
            Value::IntArray(v) => self.write_int_array(Some(v.as_slice())),
            Value::LongArray(v) => self.write_long_array(Some(v.as_slice())),
            Value::DoubleArray(v) => self.write_double_array(Some(v.as_slice())),
            Value::Binder(binder) => self.write_strong_binder(Some(binder)),
            Value::ParcelableArray(items) => {
                self.write_parcelable_array(Some(items.as_slice()), WriteFlags::NONE)
            }
            Value::Size(size) => {
                self.write_i32(size.width)?;
                self.write_i32(size.height)
            }
            Value::SizeF(size) => {
                self.write_f32(size.width)?;
                self.write_f32(size.height)
            }
            Value::ObjectArray(items) => self.write_object_array(Some(items.as_slice())),
            Value::Serializable(obj) => self.write_serializable(Some(obj)),
        }
    }

    /// A parcelable that is really a bundle is written in bundle form.
    fn write_parcelable_payload(&mut self, tag: ValueTag, p: &dyn Parcelable) -> Result<()> {
        let any = p.as_any();
        match tag {
            ValueTag::Bundle => match any.downcast_ref::<Bundle>() {
                Some(bundle) => self.write_bundle(Some(bundle)),
                None => Err(Error::UnsupportedValueType(p.type_identifier().to_string())),
            },
            ValueTag::PersistableBundle => match any.downcast_ref::<PersistableBundle>() {
                Some(bundle) => self.write_persistable_bundle(Some(bundle)),
                None => Err(Error::UnsupportedValueType(p.type_identifier().to_string())),
            },
            _ => self.write_parcelable(Some(p), WriteFlags::NONE),
        }
    }

    /// Count, then `(key, value)` pairs, both written as tagged values.
    pub fn write_map(&mut self, entries: Option<&[(Value, Value)]>) -> Result<()> {
        let Some(entries) = entries else {
            return self.write_i32(NULL_LENGTH);
        };
        self.write_len(entries.len())?;
        for (key, value) in entries {
            self.write_value(key)?;
            self.write_value(value)?;
        }
        Ok(())
    }

    pub fn write_list(&mut self, items: Option<&[Value]>) -> Result<()> {
        let Some(items) = items else {
            return self.write_i32(NULL_LENGTH);
        };
        self.write_len(items.len())?;
        for item in items {
            self.write_value(item)?;
        }
        Ok(())
    }

    /// Same layout as a list; the tag is what tells them apart.
    pub fn write_object_array(&mut self, items: Option<&[Value]>) -> Result<()> {
        self.write_list(items)
    }

    /// Count, then `(i32 key, value)` pairs in ascending key order.
    pub fn write_sparse_array(&mut self, entries: Option<&BTreeMap<i32, Value>>) -> Result<()> {
        let Some(entries) = entries else {
            return self.write_i32(NULL_LENGTH);
        };
        self.write_len(entries.len())?;
        for (key, value) in entries {
            self.write_i32(*key)?;
            self.write_value(value)?;
        }
        Ok(())
    }

    pub fn write_sparse_boolean_array(&mut self, entries: Option<&BTreeMap<i32, bool>>) -> Result<()> {
        let Some(entries) = entries else {
            return self.write_i32(NULL_LENGTH);
        };
        self.write_len(entries.len())?;
        for (key, value) in entries {
            self.write_i32(*key)?;
            self.write_bool(*value)?;
        }
        Ok(())
    }

    /// Type name, then the opaque blob. `None` writes a null type name.
    pub fn write_serializable(&mut self, obj: Option<&SerializedObject>) -> Result<()> {
        let Some(obj) = obj else {
            return self.write_string(None);
        };
        self.write_string(Some(obj.type_name.as_str()))?;
        self.write_byte_array(Some(obj.data.as_slice()))
    }
}
