// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime classification of loosely typed values.
//!
//! Typed callers build a [`Value`] directly. Callers holding an arbitrary
//! `&dyn Any` go through [`ValueClassifier`], which probes concrete types
//! in a fixed priority order, most specific first:
//!
//! ```text
//!  1  ()                          Null
//!  2  String, &str                String
//!  3  i32                         Int
//!  4  HashMap/BTreeMap<String, V> Map
//!  5  Bundle                      Bundle
//!  6  PersistableBundle           PersistableBundle
//!  7  Arc<dyn Parcelable>         Parcelable
//!  8  i16 i64 f32 f64 bool i8     Short .. Byte
//!  9  Arc<str>, Box<str>, Cow     Text
//! 10  Vec<Value>                  List
//! 11  BTreeMap<i32, Value|bool>   SparseArray / SparseBooleanArray
//! 12  Vec<bool|u8|String|i32|..>  typed arrays
//! 13  Arc<dyn Binder>             Binder
//! 14  Vec<Arc<dyn Parcelable>>    ParcelableArray
//! 15  Size, SizeF                 Size / SizeF
//! 16  Vec<Box<dyn Any>>           ObjectArray (elements classified)
//! 17  serializer                  Serializable
//! 18  anything else               UnsupportedValueType
//! ```
//!
//! An existing `Value` passes through unchanged.

use super::{Size, SizeF, Value};
use crate::bundle::{Bundle, PersistableBundle};
use crate::error::{Error, Result};
use crate::parcel::{Binder, Parcel};
use crate::parcelable::Parcelable;
use crate::serializer::{ObjectSerializer, SerializedObject};
use std::any::Any;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Return from the enclosing function on the first type that matches.
macro_rules! probe {
    ($value:expr, $($type:ty => $make:expr),+ $(,)?) => {
        $(
            if let Some(v) = $value.downcast_ref::<$type>() {
                let make: fn(&$type) -> Value = $make;
                return Ok(make(v));
            }
        )+
    };
}

/// Priority-ordered `&dyn Any` to [`Value`] cascade.
#[derive(Clone, Default)]
pub struct ValueClassifier {
    serializer: Option<Arc<dyn ObjectSerializer>>,
}

impl std::fmt::Debug for ValueClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueClassifier")
            .field(
                "serializer",
                &self.serializer.as_ref().map(|_| "Arc<dyn ObjectSerializer>"),
            )
            .finish()
    }
}

impl ValueClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fall back to `serializer` for types nothing else claims.
    #[must_use]
    pub fn with_serializer(mut self, serializer: Arc<dyn ObjectSerializer>) -> Self {
        self.serializer = Some(serializer);
        self
    }

    pub fn classify(&self, value: &dyn Any) -> Result<Value> {
        if let Some(v) = value.downcast_ref::<Value>() {
            return Ok(v.clone());
        }

        probe!(value,
            () => |_| Value::Null,
            String => |v| Value::String(v.clone()),
            &'static str => |v| Value::String((*v).to_string()),
            i32 => |v| Value::Int(*v),
            HashMap<String, Value> => |m| {
                // Sorted, so equal maps encode identically.
                let mut entries: Vec<_> = m
                    .iter()
                    .map(|(k, v)| (Value::String(k.clone()), v.clone()))
                    .collect();
                entries.sort_by(|a, b| a.0.as_str().cmp(&b.0.as_str()));
                Value::Map(entries)
            },
            BTreeMap<String, Value> => |m| {
                Value::Map(
                    m.iter()
                        .map(|(k, v)| (Value::String(k.clone()), v.clone()))
                        .collect(),
                )
            },
            Bundle => |b| Value::Bundle(b.clone()),
            PersistableBundle => |b| Value::PersistableBundle(b.clone()),
            Arc<dyn Parcelable> => |p| Value::Parcelable(Arc::clone(p)),
            i16 => |v| Value::Short(*v),
            i64 => |v| Value::Long(*v),
            f32 => |v| Value::Float(*v),
            f64 => |v| Value::Double(*v),
            bool => |v| Value::Bool(*v),
            i8 => |v| Value::Byte(*v),
            Arc<str> => |s| Value::Text(s.to_string()),
            Box<str> => |s| Value::Text(s.to_string()),
            Cow<'static, str> => |s| Value::Text(s.to_string()),
            Vec<Value> => |v| Value::List(v.clone()),
            BTreeMap<i32, Value> => |m| Value::SparseArray(m.clone()),
            BTreeMap<i32, bool> => |m| Value::SparseBooleanArray(m.clone()),
            Vec<bool> => |v| Value::BoolArray(v.clone()),
            Vec<u8> => |v| Value::ByteArray(v.clone()),
            Vec<String> => |v| Value::StringArray(v.iter().cloned().map(Some).collect()),
            Vec<Option<String>> => |v| Value::StringArray(v.clone()),
            Vec<Arc<str>> => |v| Value::TextArray(v.iter().map(|s| Some(s.to_string())).collect()),
            Vec<i32> => |v| Value::IntArray(v.clone()),
            Vec<i64> => |v| Value::LongArray(v.clone()),
            Vec<f64> => |v| Value::DoubleArray(v.clone()),
            Arc<dyn Binder> => |b| Value::Binder(Arc::clone(b)),
            Vec<Arc<dyn Parcelable>> => |v| {
                Value::ParcelableArray(v.iter().cloned().map(Some).collect())
            },
            Vec<Option<Arc<dyn Parcelable>>> => |v| Value::ParcelableArray(v.clone()),
            Size => |s| Value::Size(*s),
            SizeF => |s| Value::SizeF(*s),
        );

        if let Some(items) = value.downcast_ref::<Vec<Box<dyn Any + Send + Sync>>>() {
            return items
                .iter()
                .map(|item| self.classify(item.as_ref()))
                .collect::<Result<Vec<_>>>()
                .map(Value::ObjectArray);
        }
        if let Some(items) = value.downcast_ref::<Vec<Box<dyn Any>>>() {
            return items
                .iter()
                .map(|item| self.classify(item.as_ref()))
                .collect::<Result<Vec<_>>>()
                .map(Value::ObjectArray);
        }

        if let Some(obj) = value.downcast_ref::<SerializedObject>() {
            return Ok(Value::Serializable(obj.clone()));
        }
        if let Some(serializer) = &self.serializer {
            if let Some(obj) = serializer.serialize(value) {
                return obj.map(Value::Serializable);
            }
        }

        Err(Error::UnsupportedValueType(format!("{:?}", value.type_id())))
    }
}

impl Parcel {
    /// Classify `value` with a serializer-less [`ValueClassifier`] and write it.
    pub fn write_value_any(&mut self, value: &dyn Any) -> Result<()> {
        self.write_value_with(&ValueClassifier::new(), value)
    }

    pub fn write_value_with(&mut self, classifier: &ValueClassifier, value: &dyn Any) -> Result<()> {
        let value = classifier.classify(value)?;
        self.write_value(&value)
    }
}
