// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use hparcel::Parcel;

fuzz_target!(|data: &[u8]| {
    // Reply header, with and without the diagnostic side channel
    let _ = Parcel::from_bytes(data).read_status_with_header();

    // Interface token check
    let _ = Parcel::from_bytes(data).enforce_interface("fuzz.IService");
});
