// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire tags of the tagged-value protocol.
//!
//! Tag numbers are part of the wire format. Never renumber a tag; append
//! new ones at the end.

/// Discriminant written (as an i32) ahead of every tagged value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(i32)]
pub enum ValueTag {
    Null = -1,
    String = 0,
    Integer = 1,
    Map = 2,
    Bundle = 3,
    Parcelable = 4,
    Short = 5,
    Long = 6,
    Float = 7,
    Double = 8,
    Boolean = 9,
    CharSequence = 10,
    List = 11,
    SparseArray = 12,
    ByteArray = 13,
    StringArray = 14,
    IBinder = 15,
    ParcelableArray = 16,
    ObjectArray = 17,
    IntArray = 18,
    LongArray = 19,
    Byte = 20,
    Serializable = 21,
    SparseBooleanArray = 22,
    BooleanArray = 23,
    CharSequenceArray = 24,
    PersistableBundle = 25,
    Size = 26,
    SizeF = 27,
    DoubleArray = 28,
}

impl ValueTag {
    /// Every tag, in wire-number order.
    pub const ALL: [ValueTag; 30] = [
        ValueTag::Null,
        ValueTag::String,
        ValueTag::Integer,
        ValueTag::Map,
        ValueTag::Bundle,
        ValueTag::Parcelable,
        ValueTag::Short,
        ValueTag::Long,
        ValueTag::Float,
        ValueTag::Double,
        ValueTag::Boolean,
        ValueTag::CharSequence,
        ValueTag::List,
        ValueTag::SparseArray,
        ValueTag::ByteArray,
        ValueTag::StringArray,
        ValueTag::IBinder,
        ValueTag::ParcelableArray,
        ValueTag::ObjectArray,
        ValueTag::IntArray,
        ValueTag::LongArray,
        ValueTag::Byte,
        ValueTag::Serializable,
        ValueTag::SparseBooleanArray,
        ValueTag::BooleanArray,
        ValueTag::CharSequenceArray,
        ValueTag::PersistableBundle,
        ValueTag::Size,
        ValueTag::SizeF,
        ValueTag::DoubleArray,
    ];

    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Tags a persistable bundle may carry.
    pub const fn is_persistable(self) -> bool {
        matches!(
            self,
            ValueTag::Null
                | ValueTag::String
                | ValueTag::Integer
                | ValueTag::Long
                | ValueTag::Double
                | ValueTag::Boolean
                | ValueTag::IntArray
                | ValueTag::LongArray
                | ValueTag::DoubleArray
                | ValueTag::StringArray
                | ValueTag::BooleanArray
                | ValueTag::PersistableBundle
        )
    }
}

impl TryFrom<i32> for ValueTag {
    type Error = i32;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        let index = raw.checked_add(1).ok_or(raw)?;
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(raw)
    }
}

impl From<ValueTag> for i32 {
    fn from(tag: ValueTag) -> Self {
        tag.as_i32()
    }
}
