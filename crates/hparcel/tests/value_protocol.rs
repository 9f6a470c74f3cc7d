// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic
#![allow(clippy::float_cmp)] // Test assertions with constants
#![allow(clippy::unreadable_literal)] // Large test constants
#![allow(clippy::missing_panics_doc)] // Tests/examples panic on failure
#![allow(clippy::too_many_lines)] // Example/test code
#![allow(clippy::cast_possible_truncation)] // Test parameters
#![allow(clippy::cast_possible_wrap)] // Test conversions

//! Tagged-value protocol, end to end.
//!
//! Every tag is written through `write_value` and read back through
//! `read_value`, including the mixed-primitive list and the tag priority
//! of bundles.

use hparcel::{
    Binder, Bundle, Error, FromParcel, HashMapTypeRegistry, Parcel, Parcelable, PersistableBundle,
    RegistryScope, SerializedObject, Size, SizeF, Value, ValueTag, WriteFlags,
};
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

impl Parcelable for Point {
    fn type_identifier(&self) -> &str {
        Self::TYPE_IDENTIFIER
    }

    fn write_to_parcel(&self, parcel: &mut Parcel, _flags: WriteFlags) -> hparcel::Result<()> {
        parcel.write_i32(self.x)?;
        parcel.write_i32(self.y)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl FromParcel for Point {
    const TYPE_IDENTIFIER: &'static str = "test.Point";

    fn from_parcel(parcel: &mut Parcel) -> hparcel::Result<Self> {
        Ok(Point {
            x: parcel.read_i32()?,
            y: parcel.read_i32()?,
        })
    }
}

#[derive(Debug)]
struct Service;

impl Binder for Service {
    fn descriptor(&self) -> &str {
        "test.IService"
    }
}

fn point_scope() -> RegistryScope {
    let mut registry = HashMapTypeRegistry::new();
    registry.register::<Point>();
    RegistryScope::new(Arc::new(registry))
}

fn roundtrip(value: &Value, scope: &RegistryScope) -> Value {
    let mut parcel = Parcel::new();
    parcel.write_value(value).expect("Write should succeed");
    assert_eq!(parcel.size() % 4, 0, "every value is word padded");
    parcel.set_position(0).expect("Rewind should succeed");
    let back = parcel.read_value(scope).expect("Read should succeed");
    assert_eq!(parcel.available(), 0, "decode consumes exactly what encode wrote");
    back
}

/// One representative value per tag, binders excluded (they only resolve
/// inside the parcel that holds them).
fn sample_values() -> Vec<Value> {
    let mut bundle = Bundle::new();
    bundle.insert("int", 7);
    bundle.insert("text", "seven");
    bundle.insert("nested", Value::List(vec![Value::Long(-1), Value::Null]));

    let mut persistable = PersistableBundle::new();
    persistable
        .insert("flag", true)
        .expect("Boolean is persistable");
    persistable
        .insert("ids", vec![1i64, 2, 3])
        .expect("Long array is persistable");

    let mut sparse = BTreeMap::new();
    sparse.insert(-5, Value::from("minus five"));
    sparse.insert(12, Value::Double(0.25));

    let mut sparse_bool = BTreeMap::new();
    sparse_bool.insert(1, true);
    sparse_bool.insert(4, false);

    let point: Arc<dyn Parcelable> = Arc::new(Point { x: 3, y: -4 });

    vec![
        Value::Null,
        Value::from("hello"),
        Value::Int(i32::MIN),
        Value::Map(vec![
            (Value::from("k"), Value::Int(1)),
            (Value::Int(2), Value::Null),
        ]),
        Value::Bundle(bundle),
        Value::Parcelable(Arc::clone(&point)),
        Value::Short(-300),
        Value::Long(i64::MAX),
        Value::Float(1.5),
        Value::Double(-2.75),
        Value::Bool(true),
        Value::Text("chars".to_string()),
        Value::List(vec![Value::Int(1), Value::from("two")]),
        Value::SparseArray(sparse),
        Value::ByteArray(vec![0, 1, 2, 0xFF, 7]),
        Value::StringArray(vec![Some("a".to_string()), None, Some(String::new())]),
        Value::ParcelableArray(vec![Some(point), None]),
        Value::ObjectArray(vec![Value::Bool(false), Value::Short(9)]),
        Value::IntArray(vec![i32::MAX, 0, -1]),
        Value::LongArray(vec![]),
        Value::Byte(-128),
        Value::Serializable(SerializedObject::new("test.Blob", vec![9, 8, 7])),
        Value::SparseBooleanArray(sparse_bool),
        Value::BoolArray(vec![true, false, true]),
        Value::TextArray(vec![None, Some("t".to_string())]),
        Value::PersistableBundle(persistable),
        Value::Size(Size::new(640, 480)),
        Value::SizeF(SizeF::new(0.5, -0.5)),
        Value::DoubleArray(vec![f64::MIN_POSITIVE, f64::NAN]),
    ]
}

#[test]
fn test_every_tag_roundtrips() {
    let scope = point_scope();
    let values = sample_values();

    let mut covered: Vec<ValueTag> = values.iter().map(Value::tag).collect();
    covered.push(ValueTag::IBinder);
    covered.sort();
    covered.dedup();
    assert_eq!(covered, ValueTag::ALL.to_vec(), "samples cover every tag");

    for value in &values {
        assert_eq!(&roundtrip(value, &scope), value, "tag {:?}", value.tag());
    }
}

#[test]
fn test_binder_roundtrips_by_identity() {
    let service: Arc<dyn Binder> = Arc::new(Service);
    let mut parcel = Parcel::new();
    parcel
        .write_value(&Value::Binder(Arc::clone(&service)))
        .expect("Write should succeed");
    parcel.write_value(&Value::Int(5)).expect("Write should succeed");
    assert!(parcel.has_object_references());

    parcel.set_position(0).expect("Rewind should succeed");
    let scope = RegistryScope::default();
    match parcel.read_value(&scope).expect("Read should succeed") {
        Value::Binder(back) => {
            assert!(Arc::ptr_eq(&back, &service));
            assert_eq!(back.descriptor(), "test.IService");
        }
        other => panic!("expected a binder, got {:?}", other),
    }
    assert_eq!(parcel.read_value(&scope).expect("Read should succeed"), Value::Int(5));
    assert!(matches!(parcel.marshall(), Err(Error::ObjectReferencesPresent)));
}

#[test]
fn test_mixed_primitive_list() {
    let items = vec![
        Value::Int(1),
        Value::from("hi"),
        Value::Null,
        Value::Double(3.5),
    ];

    let mut parcel = Parcel::new();
    parcel.write_list(Some(&items[..])).expect("Write should succeed");
    parcel.set_position(0).expect("Rewind should succeed");
    let back = parcel
        .read_list(&RegistryScope::default())
        .expect("Read should succeed")
        .expect("List should not be null");

    assert_eq!(back, items);
    assert_eq!(back[0].as_i32(), Some(1));
    assert_eq!(back[1].as_str(), Some("hi"));
    assert!(back[2].is_null());
    assert_eq!(back[3].as_f64(), Some(3.5));
}

#[test]
fn test_bundle_wins_over_generic_parcelable() {
    let mut bundle = Bundle::new();
    bundle.insert("answer", 42);

    let as_parcelable: Arc<dyn Parcelable> = Arc::new(bundle.clone());
    let value = Value::Parcelable(as_parcelable);
    assert_eq!(value.tag(), ValueTag::Bundle);

    let mut parcel = Parcel::new();
    parcel.write_value(&value).expect("Write should succeed");
    parcel.set_position(0).expect("Rewind should succeed");
    assert_eq!(
        parcel.read_i32().expect("Read should succeed"),
        ValueTag::Bundle.as_i32()
    );

    match roundtrip(&value, &RegistryScope::default()) {
        Value::Bundle(back) => assert_eq!(back, bundle),
        other => panic!("expected a bundle, got {:?}", other),
    }

    let persistable: Arc<dyn Parcelable> = Arc::new(PersistableBundle::new());
    assert_eq!(
        Value::Parcelable(persistable).tag(),
        ValueTag::PersistableBundle
    );
}

#[test]
fn test_any_classification_matches_explicit_values() {
    let mut parcel = Parcel::new();
    parcel.write_value_any(&42i32).expect("Write should succeed");
    parcel.write_value_any(&"hi").expect("Write should succeed");
    parcel.write_value_any(&vec![1i64, 2]).expect("Write should succeed");
    parcel.write_value_any(&()).expect("Write should succeed");

    let mut explicit = Parcel::new();
    for value in [
        Value::Int(42),
        Value::from("hi"),
        Value::LongArray(vec![1, 2]),
        Value::Null,
    ] {
        explicit.write_value(&value).expect("Write should succeed");
    }
    assert_eq!(parcel.as_bytes(), explicit.as_bytes());
}

#[test]
fn test_unknown_tag_is_reported_with_offset() {
    let mut parcel = Parcel::new();
    parcel.write_value(&Value::Int(1)).expect("Write should succeed");
    parcel.write_i32(99).expect("Write should succeed");
    parcel.write_i32(0).expect("Write should succeed");

    parcel.set_position(0).expect("Rewind should succeed");
    let scope = RegistryScope::default();
    assert_eq!(parcel.read_value(&scope).expect("Read should succeed"), Value::Int(1));
    match parcel.read_value(&scope) {
        Err(Error::UnknownTag { tag, offset }) => {
            assert_eq!(tag, 99);
            assert_eq!(offset, 8);
        }
        other => panic!("expected an unknown tag, got {:?}", other),
    }
}

#[test]
fn test_unregistered_parcelable_fails_to_decode() {
    let mut parcel = Parcel::new();
    parcel
        .write_value(&Value::Parcelable(Arc::new(Point { x: 1, y: 2 })))
        .expect("Write should succeed");
    parcel.set_position(0).expect("Rewind should succeed");

    match parcel.read_value(&RegistryScope::default()) {
        Err(Error::BadPolymorphicType { identifier, .. }) => assert_eq!(identifier, "test.Point"),
        other => panic!("expected a bad type, got {:?}", other),
    }
}

// ============================================================================
// Seeded sweeps
// ============================================================================

fn random_string(rng: &mut fastrand::Rng) -> String {
    let len = rng.usize(0..12);
    (0..len).map(|_| rng.char(..)).collect()
}

fn random_value(rng: &mut fastrand::Rng, depth: usize) -> Value {
    let leaf_kinds = 14;
    let kinds = if depth == 0 { leaf_kinds } else { leaf_kinds + 5 };
    match rng.usize(0..kinds) {
        0 => Value::Null,
        1 => Value::String(random_string(rng)),
        2 => Value::Int(rng.i32(..)),
        3 => Value::Short(rng.i16(..)),
        4 => Value::Long(rng.i64(..)),
        5 => Value::Float(f32::from_bits(rng.u32(..))),
        6 => Value::Double(f64::from_bits(rng.u64(..))),
        7 => Value::Bool(rng.bool()),
        8 => Value::Byte(rng.i8(..)),
        9 => Value::Text(random_string(rng)),
        10 => Value::ByteArray((0..rng.usize(0..9)).map(|_| rng.u8(..)).collect()),
        11 => Value::IntArray((0..rng.usize(0..5)).map(|_| rng.i32(..)).collect()),
        12 => Value::StringArray(
            (0..rng.usize(0..4))
                .map(|_| rng.bool().then(|| random_string(rng)))
                .collect(),
        ),
        13 => Value::Size(Size::new(rng.i32(..), rng.i32(..))),
        14 => Value::List(
            (0..rng.usize(0..4))
                .map(|_| random_value(rng, depth - 1))
                .collect(),
        ),
        15 => Value::ObjectArray(
            (0..rng.usize(0..4))
                .map(|_| random_value(rng, depth - 1))
                .collect(),
        ),
        16 => Value::Map(
            (0..rng.usize(0..3))
                .map(|_| (random_value(rng, depth - 1), random_value(rng, depth - 1)))
                .collect(),
        ),
        17 => {
            let mut bundle = Bundle::new();
            for _ in 0..rng.usize(0..4) {
                bundle.insert(random_string(rng), random_value(rng, depth - 1));
            }
            Value::Bundle(bundle)
        }
        _ => Value::SparseArray(
            (0..rng.usize(0..4))
                .map(|_| (rng.i32(..), random_value(rng, depth - 1)))
                .collect(),
        ),
    }
}

#[test]
fn test_random_value_trees_roundtrip() {
    let scope = RegistryScope::default();
    for seed in 0..200u64 {
        let mut rng = fastrand::Rng::with_seed(seed);
        let value = random_value(&mut rng, 3);
        assert_eq!(roundtrip(&value, &scope), value, "seed {}", seed);
    }
}

#[test]
fn test_random_value_sequences_share_one_parcel() {
    let scope = RegistryScope::default();
    let mut rng = fastrand::Rng::with_seed(0x5EED);
    let values: Vec<Value> = (0..64).map(|_| random_value(&mut rng, 2)).collect();

    let mut parcel = Parcel::new();
    for value in &values {
        parcel.write_value(value).expect("Write should succeed");
    }
    let bytes = parcel.marshall().expect("Marshall should succeed");

    let mut copy = Parcel::new();
    copy.unmarshall(&bytes, 0, bytes.len())
        .expect("Unmarshall should succeed");
    copy.set_position(0).expect("Rewind should succeed");
    for value in &values {
        assert_eq!(&copy.read_value(&scope).expect("Read should succeed"), value);
    }
    assert_eq!(copy.available(), 0);
}
