// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use hparcel::{Parcel, RegistryScope};

fuzz_target!(|data: &[u8]| {
    let scope = RegistryScope::default();

    // Tagged values, back to back until the input runs out or breaks
    let mut parcel = Parcel::from_bytes(data);
    while parcel.available() > 0 {
        if parcel.read_value(&scope).is_err() {
            break;
        }
    }

    // Bundle readers
    let _ = Parcel::from_bytes(data).read_bundle(&scope);
    let _ = Parcel::from_bytes(data).read_persistable_bundle();

    // Lenient array creators
    let _ = Parcel::from_bytes(data).create_string_array();
    let _ = Parcel::from_bytes(data).create_text_array();
    let _ = Parcel::from_bytes(data).create_double_array();
});
