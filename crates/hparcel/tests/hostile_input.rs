// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic
#![allow(clippy::missing_panics_doc)] // Tests/examples panic on failure
#![allow(clippy::cast_possible_truncation)] // Test parameters

//! Decoding truncated, corrupt and adversarial input.
//!
//! Every reader must fail with an error, never panic, never over-allocate.

use hparcel::{Bundle, Error, Parcel, ParcelConfig, RegistryScope, Value, ValueTag};
use std::thread;

fn sample() -> Parcel {
    let mut bundle = Bundle::new();
    bundle.insert("name", "probe");
    bundle.insert("ids", vec![1i32, 2, 3]);
    bundle.insert("bytes", vec![0xAAu8; 5]);

    let mut parcel = Parcel::new();
    parcel
        .write_value(&Value::List(vec![
            Value::Bundle(bundle),
            Value::Text("tail".to_string()),
            Value::Long(-9),
        ]))
        .expect("Write should succeed");
    parcel
}

#[test]
fn test_every_truncation_fails_cleanly() {
    let full = sample().marshall().expect("Marshall should succeed");
    let scope = RegistryScope::default();

    for cut in 0..full.len() {
        let mut parcel = Parcel::from_bytes(&full[..cut]);
        let result = parcel.read_value(&scope);
        assert!(result.is_err(), "prefix of {} bytes decoded", cut);
    }

    let mut parcel = Parcel::from_bytes(&full);
    parcel.read_value(&scope).expect("Full input should decode");
}

#[test]
fn test_truncated_scalar_reports_offset() {
    let mut parcel = Parcel::from_bytes(&[1, 0, 0, 0, 2, 0]);
    parcel.read_i32().expect("First word is complete");
    match parcel.read_i32() {
        Err(Error::TruncatedData {
            offset,
            requested,
            available,
        }) => {
            assert_eq!((offset, requested, available), (4, 4, 2));
        }
        other => panic!("expected truncation, got {:?}", other),
    }
}

fn words(values: &[i32]) -> Parcel {
    let mut parcel = Parcel::new();
    for value in values {
        parcel.write_i32(*value).expect("Write should succeed");
    }
    parcel.set_position(0).expect("Rewind should succeed");
    parcel
}

#[test]
fn test_huge_lengths_do_not_allocate() {
    let scope = RegistryScope::default();
    let claims = [
        ValueTag::IntArray,
        ValueTag::LongArray,
        ValueTag::ByteArray,
        ValueTag::StringArray,
        ValueTag::List,
        ValueTag::Map,
        ValueTag::SparseArray,
        ValueTag::ParcelableArray,
    ];
    for tag in claims {
        let mut parcel = words(&[tag.as_i32(), i32::MAX, 0]);
        let err = parcel
            .read_value(&scope)
            .expect_err("An impossible length must be rejected");
        assert!(
            matches!(err, Error::InvalidData { offset: 4, .. }),
            "{:?}: {:?}",
            tag,
            err
        );
    }

    let mut parcel = words(&[ValueTag::String.as_i32(), i32::MAX]);
    assert!(parcel
        .read_value(&scope)
        .expect_err("An impossible string must be rejected")
        .is_truncation());
}

#[test]
fn test_lenient_creators_return_none() {
    let mut parcel = words(&[i32::MAX, 1, 2]);
    assert_eq!(parcel.create_int_array().expect("Read should succeed"), None);

    let mut parcel = words(&[-7]);
    assert_eq!(parcel.create_long_array().expect("Read should succeed"), None);
}

#[test]
fn test_bundle_length_lies() {
    let scope = RegistryScope::default();
    let mut bundle = Bundle::new();
    bundle.insert("k", 1);

    let mut parcel = Parcel::new();
    parcel.write_bundle(Some(&bundle)).expect("Write should succeed");
    let mut bytes = parcel.marshall().expect("Marshall should succeed");

    // Claim four more payload bytes than exist.
    let claimed = i32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) + 4;
    bytes[..4].copy_from_slice(&claimed.to_ne_bytes());
    let mut parcel = Parcel::from_bytes(&bytes);
    assert!(parcel
        .read_bundle(&scope)
        .expect_err("Overlong bundle must be rejected")
        .is_truncation());

    // Corrupt the magic.
    let mut bytes = parcel.as_bytes().to_vec();
    bytes[..4].copy_from_slice(&(claimed - 4).to_ne_bytes());
    bytes[4] ^= 0xFF;
    let mut parcel = Parcel::from_bytes(&bytes);
    assert!(matches!(
        parcel.read_bundle(&scope),
        Err(Error::InvalidData { offset: 4, .. })
    ));
}

#[test]
fn test_nesting_bomb_is_bounded() {
    let levels = 300;
    let mut parcel = Parcel::new();
    for _ in 0..levels {
        parcel
            .write_i32(ValueTag::List.as_i32())
            .expect("Write should succeed");
        parcel.write_i32(1).expect("Write should succeed");
    }
    parcel
        .write_i32(ValueTag::Null.as_i32())
        .expect("Write should succeed");
    let bytes = parcel.marshall().expect("Marshall should succeed");

    let mut parcel = Parcel::from_bytes(&bytes);
    assert!(matches!(
        parcel.read_value(&RegistryScope::default()),
        Err(Error::NestingTooDeep { limit: 128 })
    ));

    // A raised limit recurses 300 deep; give the reader a stack to match.
    let reader = thread::Builder::new()
        .name("deep-reader".to_string())
        .stack_size(64 * 1024 * 1024)
        .spawn(move || {
            let config = ParcelConfig::default().with_max_nesting_depth(512);
            let mut parcel = Parcel::with_config(&config);
            parcel
                .unmarshall(&bytes, 0, bytes.len())
                .expect("Unmarshall should succeed");
            parcel
                .read_value(&RegistryScope::default())
                .map(|_| ())
        })
        .expect("Reader thread should spawn");
    reader
        .join()
        .expect("Reader thread should not panic")
        .expect("A generous limit admits the same input");
}

#[test]
fn test_dangling_binder_reference() {
    let mut parcel = words(&[ValueTag::IBinder.as_i32(), 3]);
    assert!(matches!(
        parcel.read_value(&RegistryScope::default()),
        Err(Error::InvalidData { offset: 4, .. })
    ));
}

#[test]
fn test_random_bytes_never_panic() {
    let scope = RegistryScope::default();
    for seed in 0..500u64 {
        let mut rng = fastrand::Rng::with_seed(seed);
        let len = rng.usize(0..256);
        let mut bytes: Vec<u8> = (0..len).map(|_| rng.u8(..)).collect();
        // Bias the first word towards a valid tag so decoding goes deep.
        if len >= 4 {
            let tag = rng.i32(-1..=28);
            bytes[..4].copy_from_slice(&tag.to_ne_bytes());
        }

        let mut parcel = Parcel::from_bytes(&bytes);
        let _ = parcel.read_value(&scope);
        assert!(parcel.position() <= parcel.size());

        let mut parcel = Parcel::from_bytes(&bytes);
        let _ = parcel.read_status();
        let mut parcel = Parcel::from_bytes(&bytes);
        let _ = parcel.read_persistable_bundle();
        let mut parcel = Parcel::from_bytes(&bytes);
        let _ = parcel.create_string_array();
    }
}
