// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tagged-value protocol.
//!
//! A tagged value is an i32 [`ValueTag`] followed by a tag-specific payload.
//! This is the only self-describing part of the format: everything else in
//! a parcel is positional.
//!
//! # Wire payloads
//!
//! ```text
//! MAP, LIST, OBJECTARRAY   len:i32 | value...          (MAP: key, value pairs)
//! SPARSEARRAY              len:i32 | (key:i32, value)...
//! SPARSEBOOLEANARRAY       len:i32 | (key:i32, bool:i32)...
//! SIZE / SIZEF             width | height
//! SERIALIZABLE             type_name:string16 | data:byte array
//! ```

mod classify;
mod read;
mod tag;
mod types;
mod write;

pub use classify::ValueClassifier;
pub use tag::ValueTag;
pub use types::{Size, SizeF, Value};
