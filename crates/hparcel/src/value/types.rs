// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::ValueTag;
use crate::bundle::{Bundle, PersistableBundle};
use crate::parcel::Binder;
use crate::parcelable::Parcelable;
use crate::serializer::SerializedObject;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Integer width/height pair (SIZE tag).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Float width/height pair (SIZEF tag).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SizeF {
    pub width: f32,
    pub height: f32,
}

impl SizeF {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// A dynamically typed value, one variant per wire tag.
///
/// A null payload under a typed tag (a `-1` string, array or container
/// length) decodes as [`Value::Null`].
///
/// Equality is structural, with three refinements:
/// - floats compare by bit pattern, so `NaN == NaN` but `0.0 != -0.0`
/// - parcelables compare via [`Parcelable::content_eq`]
/// - binders compare by identity
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    String(String),
    Int(i32),
    /// Generic map, in insertion order. Keys are arbitrary values.
    Map(Vec<(Value, Value)>),
    Bundle(Bundle),
    PersistableBundle(PersistableBundle),
    Parcelable(Arc<dyn Parcelable>),
    Short(i16),
    Long(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    Byte(i8),
    /// Plain character sequence.
    Text(String),
    List(Vec<Value>),
    SparseArray(BTreeMap<i32, Value>),
    SparseBooleanArray(BTreeMap<i32, bool>),
    BoolArray(Vec<bool>),
    ByteArray(Vec<u8>),
    StringArray(Vec<Option<String>>),
    TextArray(Vec<Option<String>>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    DoubleArray(Vec<f64>),
    Binder(Arc<dyn Binder>),
    ParcelableArray(Vec<Option<Arc<dyn Parcelable>>>),
    Size(Size),
    SizeF(SizeF),
    ObjectArray(Vec<Value>),
    Serializable(SerializedObject),
}

impl Value {
    /// Tag this value is written under.
    ///
    /// A [`Value::Parcelable`] wrapping a bundle reports the bundle's own
    /// tag: the specific container wins over the generic protocol.
    pub fn tag(&self) -> ValueTag {
        match self {
            Value::Null => ValueTag::Null,
            Value::String(_) => ValueTag::String,
            Value::Int(_) => ValueTag::Integer,
            Value::Map(_) => ValueTag::Map,
            Value::Bundle(_) => ValueTag::Bundle,
            Value::PersistableBundle(_) => ValueTag::PersistableBundle,
            Value::Parcelable(p) => {
                let any = p.as_any();
                if any.is::<Bundle>() {
                    ValueTag::Bundle
                } else if any.is::<PersistableBundle>() {
                    ValueTag::PersistableBundle
                } else {
                    ValueTag::Parcelable
                }
            }
            Value::Short(_) => ValueTag::Short,
            Value::Long(_) => ValueTag::Long,
            Value::Float(_) => ValueTag::Float,
            Value::Double(_) => ValueTag::Double,
            Value::Bool(_) => ValueTag::Boolean,
            Value::Byte(_) => ValueTag::Byte,
            Value::Text(_) => ValueTag::CharSequence,
            Value::List(_) => ValueTag::List,
            Value::SparseArray(_) => ValueTag::SparseArray,
            Value::SparseBooleanArray(_) => ValueTag::SparseBooleanArray,
            Value::BoolArray(_) => ValueTag::BooleanArray,
            Value::ByteArray(_) => ValueTag::ByteArray,
            Value::StringArray(_) => ValueTag::StringArray,
            Value::TextArray(_) => ValueTag::CharSequenceArray,
            Value::IntArray(_) => ValueTag::IntArray,
            Value::LongArray(_) => ValueTag::LongArray,
            Value::DoubleArray(_) => ValueTag::DoubleArray,
            Value::Binder(_) => ValueTag::IBinder,
            Value::ParcelableArray(_) => ValueTag::ParcelableArray,
            Value::Size(_) => ValueTag::Size,
            Value::SizeF(_) => ValueTag::SizeF,
            Value::ObjectArray(_) => ValueTag::ObjectArray,
            Value::Serializable(_) => ValueTag::Serializable,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Downcast a carried parcelable to its concrete type.
    pub fn downcast_parcelable<T: 'static>(&self) -> Option<&T> {
        match self {
            Value::Parcelable(p) => p.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::String(a), Value::String(b)) | (Value::Text(a), Value::Text(b)) => {
                a == b
            }
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Bundle(a), Value::Bundle(b)) => a == b,
            (Value::PersistableBundle(a), Value::PersistableBundle(b)) => a == b,
            (Value::Parcelable(a), Value::Parcelable(b)) => a.content_eq(b.as_ref()),
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::List(a), Value::List(b))
            | (Value::ObjectArray(a), Value::ObjectArray(b)) => a == b,
            (Value::SparseArray(a), Value::SparseArray(b)) => a == b,
            (Value::SparseBooleanArray(a), Value::SparseBooleanArray(b)) => a == b,
            (Value::BoolArray(a), Value::BoolArray(b)) => a == b,
            (Value::ByteArray(a), Value::ByteArray(b)) => a == b,
            (Value::StringArray(a), Value::StringArray(b))
            | (Value::TextArray(a), Value::TextArray(b)) => a == b,
            (Value::IntArray(a), Value::IntArray(b)) => a == b,
            (Value::LongArray(a), Value::LongArray(b)) => a == b,
            (Value::DoubleArray(a), Value::DoubleArray(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
            }
            (Value::Binder(a), Value::Binder(b)) => Arc::ptr_eq(a, b),
            (Value::ParcelableArray(a), Value::ParcelableArray(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| match (x, y) {
                        (None, None) => true,
                        (Some(x), Some(y)) => x.content_eq(y.as_ref()),
                        _ => false,
                    })
            }
            (Value::Size(a), Value::Size(b)) => a == b,
            (Value::SizeF(a), Value::SizeF(b)) => {
                a.width.to_bits() == b.width.to_bits() && a.height.to_bits() == b.height.to_bits()
            }
            (Value::Serializable(a), Value::Serializable(b)) => a == b,
            _ => false,
        }
    }
}

macro_rules! impl_from {
    ($($type:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$type> for Value {
                fn from(value: $type) -> Self {
                    Value::$variant(value)
                }
            }
        )+
    };
}

impl_from!(
    String => String,
    i32 => Int,
    i16 => Short,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    bool => Bool,
    i8 => Byte,
    Bundle => Bundle,
    PersistableBundle => PersistableBundle,
    Vec<Value> => List,
    Vec<u8> => ByteArray,
    Vec<i32> => IntArray,
    Vec<i64> => LongArray,
    Vec<f64> => DoubleArray,
    Vec<bool> => BoolArray,
    Size => Size,
    SizeF => SizeF,
    SerializedObject => Serializable,
);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
