// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Primitive codec: fixed-width scalars, length-prefixed byte arrays,
//! strings and primitive arrays.
//!
//! Every datum occupies a whole number of 4-byte words. Sub-word scalars
//! (bool, byte, i16) are widened to an i32 slot.
//!
//! ```text
//! i32 / f32          [4]
//! i64 / f64          [8]
//! byte array         len:i32 (-1 = null) | bytes | pad
//! string16           units:i32 (-1 = null) | utf16[units] | 0u16 | pad
//! string8            bytes:i32 (-1 = null) | utf8[bytes] | 0u8 | pad
//! X array            len:i32 (-1 = null) | X[len]
//! ```
//!
//! `create_*` readers treat a length prefix that could not possibly fit in
//! the remaining bytes as a null array (with a warning) instead of
//! honouring it. `read_*_into` readers demand an exact length match.

use super::Parcel;
use crate::config::{NULL_LENGTH, TEXT_KIND_PLAIN};
use crate::error::{Error, Result};
use byteorder::{ByteOrder, NativeEndian};

/// Generate write/read pairs for fixed-width scalars.
///
/// Each generated writer reserves a padded slot and stores the value in
/// host byte order; each reader consumes the same slot or fails with
/// `TruncatedData`.
macro_rules! impl_fixed {
    ($write:ident, $read:ident, $type:ty, $size:expr, $put:ident, $get:ident) => {
        pub fn $write(&mut self, value: $type) -> Result<()> {
            let slot = self.write_slot($size)?;
            NativeEndian::$put(slot, value);
            Ok(())
        }

        pub fn $read(&mut self) -> Result<$type> {
            let slot = self.read_slot($size)?;
            Ok(NativeEndian::$get(slot))
        }
    };
}

/// Generate nullable array writers, defensive creators and exact-length
/// readers for fixed-width element types.
macro_rules! impl_array {
    ($write:ident, $create:ident, $read_into:ident, $type:ty, $width:expr, $put:ident, $get:ident) => {
        pub fn $write(&mut self, values: Option<&[$type]>) -> Result<()> {
            let Some(values) = values else {
                return self.write_i32(NULL_LENGTH);
            };
            self.write_len(values.len())?;
            for value in values {
                self.$put(*value)?;
            }
            Ok(())
        }

        pub fn $create(&mut self) -> Result<Option<Vec<$type>>> {
            let len = self.read_i32()?;
            let Some(count) = self.plausible_count(len, $width) else {
                return Ok(None);
            };
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                values.push(self.$get()?);
            }
            Ok(Some(values))
        }

        pub fn $read_into(&mut self, dest: &mut [$type]) -> Result<()> {
            self.expect_len(dest.len())?;
            for slot in dest.iter_mut() {
                *slot = self.$get()?;
            }
            Ok(())
        }
    };
}

impl Parcel {
    // ========================================================================
    // Scalars
    // ========================================================================

    impl_fixed!(write_i32, read_i32, i32, 4, write_i32, read_i32);
    impl_fixed!(write_i64, read_i64, i64, 8, write_i64, read_i64);
    impl_fixed!(write_f32, read_f32, f32, 4, write_f32, read_f32);
    impl_fixed!(write_f64, read_f64, f64, 8, write_f64, read_f64);

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_i32(i32::from(value))
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_i32()? != 0)
    }

    pub fn write_byte(&mut self, value: i8) -> Result<()> {
        self.write_i32(i32::from(value))
    }

    /// Reads a widened byte; upper bits are discarded.
    pub fn read_byte(&mut self) -> Result<i8> {
        Ok(self.read_i32()? as i8)
    }

    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        self.write_i32(i32::from(value))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.read_i32()? as i16)
    }

    // ========================================================================
    // Byte arrays
    // ========================================================================

    pub fn write_byte_array(&mut self, bytes: Option<&[u8]>) -> Result<()> {
        let Some(bytes) = bytes else {
            return self.write_i32(NULL_LENGTH);
        };
        self.write_len(bytes.len())?;
        self.write_slot(bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }

    /// Write `bytes[offset..offset + len]` as a length-prefixed array.
    pub fn write_byte_array_range(&mut self, bytes: &[u8], offset: usize, len: usize) -> Result<()> {
        match offset.checked_add(len) {
            Some(end) if end <= bytes.len() => self.write_byte_array(Some(&bytes[offset..end])),
            _ => Err(Error::OutOfRange {
                offset,
                limit: bytes.len(),
            }),
        }
    }

    pub fn create_byte_array(&mut self) -> Result<Option<Vec<u8>>> {
        let len = self.read_i32()?;
        let Some(count) = self.plausible_count(len, 1) else {
            return Ok(None);
        };
        Ok(Some(self.read_slot(count)?.to_vec()))
    }

    pub fn read_byte_array_into(&mut self, dest: &mut [u8]) -> Result<()> {
        self.expect_len(dest.len())?;
        let slot = self.read_slot(dest.len())?;
        dest.copy_from_slice(slot);
        Ok(())
    }

    // ========================================================================
    // Strings
    // ========================================================================

    /// Write a UTF-16 string; `None` and `""` have distinct encodings.
    pub fn write_string(&mut self, value: Option<&str>) -> Result<()> {
        let Some(value) = value else {
            return self.write_i32(NULL_LENGTH);
        };
        let units: Vec<u16> = value.encode_utf16().collect();
        self.write_len(units.len())?;
        let slot = self.write_slot((units.len() + 1) * 2)?;
        for (chunk, unit) in slot.chunks_exact_mut(2).zip(&units) {
            NativeEndian::write_u16(chunk, *unit);
        }
        Ok(())
    }

    pub fn read_string(&mut self) -> Result<Option<String>> {
        let offset = self.position();
        let Some(units) = self.read_string_len(offset)? else {
            return Ok(None);
        };
        let byte_len = units
            .checked_add(1)
            .and_then(|n| n.checked_mul(2))
            .ok_or_else(|| Error::invalid(offset, "string length overflow"))?;
        let slot = self.read_slot(byte_len)?;

        let mut decoded = Vec::with_capacity(units);
        for chunk in slot.chunks_exact(2) {
            decoded.push(NativeEndian::read_u16(chunk));
        }
        if decoded.pop() != Some(0) {
            return Err(Error::invalid(offset, "string16 missing terminator"));
        }
        String::from_utf16(&decoded)
            .map(Some)
            .map_err(|e| Error::invalid(offset, e.to_string()))
    }

    /// Write a UTF-8 string (string8 form).
    pub fn write_string8(&mut self, value: Option<&str>) -> Result<()> {
        let Some(value) = value else {
            return self.write_i32(NULL_LENGTH);
        };
        let bytes = value.as_bytes();
        self.write_len(bytes.len())?;
        self.write_slot(bytes.len() + 1)?[..bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    pub fn read_string8(&mut self) -> Result<Option<String>> {
        let offset = self.position();
        let Some(len) = self.read_string_len(offset)? else {
            return Ok(None);
        };
        let byte_len = len
            .checked_add(1)
            .ok_or_else(|| Error::invalid(offset, "string length overflow"))?;
        let slot = self.read_slot(byte_len)?;
        if slot[len] != 0 {
            return Err(Error::invalid(offset, "string8 missing terminator"));
        }
        std::str::from_utf8(&slot[..len])
            .map(|s| Some(s.to_string()))
            .map_err(|e| Error::invalid(offset, e.to_string()))
    }

    /// Write a plain character sequence (kind header + string16).
    pub fn write_text(&mut self, value: Option<&str>) -> Result<()> {
        self.write_i32(TEXT_KIND_PLAIN)?;
        self.write_string(value)
    }

    pub fn read_text(&mut self) -> Result<Option<String>> {
        let offset = self.position();
        let kind = self.read_i32()?;
        if kind != TEXT_KIND_PLAIN {
            return Err(Error::invalid(
                offset,
                format!("unsupported text kind {}", kind),
            ));
        }
        self.read_string()
    }

    // ========================================================================
    // Primitive arrays
    // ========================================================================

    impl_array!(write_bool_array, create_bool_array, read_bool_array_into, bool, 4, write_bool, read_bool);
    impl_array!(write_int_array, create_int_array, read_int_array_into, i32, 4, write_i32, read_i32);
    impl_array!(write_long_array, create_long_array, read_long_array_into, i64, 8, write_i64, read_i64);
    impl_array!(write_float_array, create_float_array, read_float_array_into, f32, 4, write_f32, read_f32);
    impl_array!(write_double_array, create_double_array, read_double_array_into, f64, 8, write_f64, read_f64);

    pub fn write_string_array<S: AsRef<str>>(&mut self, values: Option<&[Option<S>]>) -> Result<()> {
        let Some(values) = values else {
            return self.write_i32(NULL_LENGTH);
        };
        self.write_len(values.len())?;
        for value in values {
            self.write_string(value.as_ref().map(AsRef::as_ref))?;
        }
        Ok(())
    }

    /// Each element needs at least its own length prefix, which bounds the
    /// plausible element count.
    pub fn create_string_array(&mut self) -> Result<Option<Vec<Option<String>>>> {
        let len = self.read_i32()?;
        let Some(count) = self.plausible_count(len, 4) else {
            return Ok(None);
        };
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(self.read_string()?);
        }
        Ok(Some(values))
    }

    pub fn read_string_array_into(&mut self, dest: &mut [Option<String>]) -> Result<()> {
        self.expect_len(dest.len())?;
        for slot in dest.iter_mut() {
            *slot = self.read_string()?;
        }
        Ok(())
    }

    /// List form of [`Parcel::write_string_array`]; same wire layout.
    pub fn write_string_list<I, S>(&mut self, values: Option<I>) -> Result<()>
    where
        I: IntoIterator<Item = Option<S>>,
        I::IntoIter: ExactSizeIterator,
        S: AsRef<str>,
    {
        let Some(values) = values else {
            return self.write_i32(NULL_LENGTH);
        };
        let values = values.into_iter();
        self.write_len(values.len())?;
        for value in values {
            self.write_string(value.as_ref().map(AsRef::as_ref))?;
        }
        Ok(())
    }

    pub fn create_string_list(&mut self) -> Result<Option<Vec<Option<String>>>> {
        self.create_string_array()
    }

    /// Refill `dest` from a stored string list, reusing its allocation.
    ///
    /// A null list clears `dest`. Extra existing entries are truncated.
    pub fn read_string_list_into(&mut self, dest: &mut Vec<Option<String>>) -> Result<()> {
        let count = self.read_nullable_len(4)?.unwrap_or(0);
        dest.truncate(count);
        for index in 0..count {
            let value = self.read_string()?;
            match dest.get_mut(index) {
                Some(slot) => *slot = value,
                None => dest.push(value),
            }
        }
        Ok(())
    }

    pub fn write_text_array<S: AsRef<str>>(&mut self, values: Option<&[Option<S>]>) -> Result<()> {
        let Some(values) = values else {
            return self.write_i32(NULL_LENGTH);
        };
        self.write_len(values.len())?;
        for value in values {
            self.write_text(value.as_ref().map(AsRef::as_ref))?;
        }
        Ok(())
    }

    pub fn create_text_array(&mut self) -> Result<Option<Vec<Option<String>>>> {
        let len = self.read_i32()?;
        // kind + length prefix
        let Some(count) = self.plausible_count(len, 8) else {
            return Ok(None);
        };
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(self.read_text()?);
        }
        Ok(Some(values))
    }

    // ========================================================================
    // Length prefixes
    // ========================================================================

    /// Write a non-null element count.
    pub(crate) fn write_len(&mut self, len: usize) -> Result<()> {
        let len = i32::try_from(len).map_err(|_| Error::OutOfRange {
            offset: len,
            limit: i32::MAX as usize,
        })?;
        self.write_i32(len)
    }

    /// Read a container element count; `-1` is null.
    ///
    /// Unlike the `create_*` readers, a count that cannot fit in the
    /// remaining bytes (at `min_width` bytes per element) is corrupt input.
    pub(crate) fn read_nullable_len(&mut self, min_width: usize) -> Result<Option<usize>> {
        let offset = self.position();
        let len = self.read_i32()?;
        if len == NULL_LENGTH {
            return Ok(None);
        }
        if len < 0 {
            return Err(Error::invalid(offset, format!("negative length {}", len)));
        }
        let count = len as usize;
        if count.saturating_mul(min_width) > self.available() {
            return Err(Error::invalid(
                offset,
                format!(
                    "length {} exceeds the {} bytes left",
                    count,
                    self.available()
                ),
            ));
        }
        Ok(Some(count))
    }

    /// Read the next i32 without consuming it.
    pub(crate) fn peek_i32(&mut self) -> Result<i32> {
        let start = self.position();
        let value = self.read_i32()?;
        self.set_position(start)?;
        Ok(value)
    }

    fn read_string_len(&mut self, offset: usize) -> Result<Option<usize>> {
        let len = self.read_i32()?;
        match len {
            NULL_LENGTH => Ok(None),
            n if n < 0 => Err(Error::invalid(
                offset,
                format!("negative string length {}", n),
            )),
            n => Ok(Some(n as usize)),
        }
    }

    fn expect_len(&mut self, expected: usize) -> Result<()> {
        let actual = self.read_i32()?;
        if usize::try_from(actual).ok() != Some(expected) {
            return Err(Error::LengthMismatch {
                expected,
                actual: i64::from(actual),
            });
        }
        Ok(())
    }
}
