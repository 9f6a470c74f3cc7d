// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Growable, position-addressed byte container.
//!
//! A [`Parcel`] owns one contiguous region plus three cursors:
//!
//! ```text
//! 0                position            size              capacity
//! |--------------------|-----------------|--------------------|
//!   already read /        still readable    allocated, unused
//!   already written
//! ```
//!
//! Invariant: `position <= size <= capacity`. Writes grow the capacity on
//! demand and bump `size` to `max(size, position + written)`. Reads never go
//! past `size`; they fail with [`Error::TruncatedData`] instead.
//!
//! The byte layout is host-endian and only meaningful to a peer running the
//! same build. Never persist the output of [`Parcel::marshall`].
//!
//! A parcel is not internally synchronized: every mutating operation takes
//! `&mut self`, so one read-or-write sequence owns it at a time.

mod binder;
mod primitives;
mod token;

pub use binder::Binder;
pub(crate) use binder::ObjectEntry;

use crate::config::{pad_size, ParcelConfig, DEFAULT_MAX_NESTING_DEPTH, MAX_PARCEL_SIZE};
use crate::error::{Error, Result};
use byteorder::{ByteOrder, NativeEndian};

/// Marshalling container for data crossing an address-space boundary.
#[derive(Debug, Clone)]
pub struct Parcel {
    /// Backing region; `data.len()` is the capacity.
    data: Vec<u8>,
    size: usize,
    position: usize,
    /// Live object references, ordered by their table index.
    objects: Vec<ObjectEntry>,
    max_depth: usize,
    depth: usize,
}

impl Default for Parcel {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Parcel {
    /// Two parcels are equal when their meaningful bytes are.
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Parcel {
    /// Create an empty parcel.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty parcel with `capacity` bytes pre-allocated.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity.min(MAX_PARCEL_SIZE)],
            size: 0,
            position: 0,
            objects: Vec::new(),
            max_depth: DEFAULT_MAX_NESTING_DEPTH,
            depth: 0,
        }
    }

    #[must_use]
    pub fn with_config(config: &ParcelConfig) -> Self {
        let mut parcel = Self::with_capacity(config.initial_capacity);
        parcel.max_depth = config.max_nesting_depth;
        parcel
    }

    /// Create a parcel holding a copy of `bytes`, positioned at 0.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut parcel = Self::new();
        parcel.data = bytes.to_vec();
        parcel.size = bytes.len();
        parcel
    }

    // ========================================================================
    // Cursors
    // ========================================================================

    pub fn position(&self) -> usize {
        self.position
    }

    /// Move the cursor. Moving past `size` extends `size` (zero-filled).
    pub fn set_position(&mut self, position: usize) -> Result<()> {
        if position > MAX_PARCEL_SIZE {
            return Err(Error::OutOfRange {
                offset: position,
                limit: MAX_PARCEL_SIZE,
            });
        }
        if position > self.size {
            self.extend_size(position)?;
        }
        self.position = position;
        Ok(())
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Set the number of meaningful bytes.
    ///
    /// Growing zero-fills the new tail. Shrinking below `position` clamps
    /// `position` to the new size and releases object references whose
    /// slot no longer fits.
    pub fn set_size(&mut self, size: usize) -> Result<()> {
        if size > MAX_PARCEL_SIZE {
            return Err(Error::OutOfRange {
                offset: size,
                limit: MAX_PARCEL_SIZE,
            });
        }
        if size >= self.size {
            return self.extend_size(size);
        }
        self.size = size;
        if self.position > size {
            self.position = size;
        }
        self.release_objects_beyond(size);
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Make sure at least `capacity` bytes are allocated.
    pub fn ensure_capacity(&mut self, capacity: usize) -> Result<()> {
        if capacity > self.data.len() {
            self.grow_to(capacity)?;
        }
        Ok(())
    }

    /// Set the allocation to exactly `capacity` bytes. Cannot drop below `size`.
    pub fn set_capacity(&mut self, capacity: usize) -> Result<()> {
        if capacity < self.size {
            return Err(Error::OutOfRange {
                offset: capacity,
                limit: self.size,
            });
        }
        if capacity > MAX_PARCEL_SIZE {
            return Err(Error::OutOfRange {
                offset: capacity,
                limit: MAX_PARCEL_SIZE,
            });
        }
        self.data.resize(capacity, 0);
        self.data.shrink_to_fit();
        Ok(())
    }

    /// Bytes between `position` and `size`.
    pub fn available(&self) -> usize {
        self.size - self.position
    }

    /// Meaningful bytes `[0, size)`.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.size]
    }

    /// Forget all contents but keep the allocation, for reuse.
    pub fn reset(&mut self) {
        self.size = 0;
        self.position = 0;
        self.depth = 0;
        self.objects.clear();
    }

    // ========================================================================
    // Flat byte array boundary
    // ========================================================================

    /// Copy out `[0, size)`.
    ///
    /// Fails with [`Error::ObjectReferencesPresent`] when the parcel carries
    /// live object references, which have no flat representation.
    pub fn marshall(&self) -> Result<Vec<u8>> {
        if !self.objects.is_empty() {
            return Err(Error::ObjectReferencesPresent);
        }
        Ok(self.as_bytes().to_vec())
    }

    /// Replace the contents with `bytes[offset..offset + len]` and rewind.
    pub fn unmarshall(&mut self, bytes: &[u8], offset: usize, len: usize) -> Result<()> {
        let range = checked_range(offset, len, bytes.len())?;
        self.data.clear();
        self.data.extend_from_slice(&bytes[range]);
        self.size = len;
        self.position = 0;
        self.depth = 0;
        self.objects.clear();
        Ok(())
    }

    /// Copy `other[offset..offset + len]` in at the current position.
    ///
    /// Object references inside the copied range come along and are
    /// renumbered into this parcel's table. A range that cuts through a
    /// reference slot is rejected with [`Error::InvalidData`] before
    /// anything is copied.
    pub fn append_from(&mut self, other: &Parcel, offset: usize, len: usize) -> Result<()> {
        let range = checked_range(offset, len, other.size)?;
        let end = range.end;
        if let Some(entry) = other.objects.iter().find(|entry| {
            let slot_end = entry.offset + 4;
            let overlaps = entry.offset < end && slot_end > offset;
            overlaps && (entry.offset < offset || slot_end > end)
        }) {
            return Err(Error::invalid(
                entry.offset,
                format!(
                    "range {}..{} splits an object reference slot",
                    offset, end
                ),
            ));
        }
        let start = self.position;
        self.write_raw(&other.data[range])?;

        for entry in &other.objects {
            if entry.offset >= offset && entry.offset + 4 <= offset + len {
                let local = start + (entry.offset - offset);
                let index = self.objects.len();
                NativeEndian::write_i32(&mut self.data[local..local + 4], index as i32);
                self.objects.push(ObjectEntry {
                    offset: local,
                    binder: entry.binder.clone(),
                });
            }
        }
        Ok(())
    }

    // ========================================================================
    // Raw, unpadded I/O
    // ========================================================================

    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        let end = self.end_of_write(bytes.len())?;
        self.data[self.position..end].copy_from_slice(bytes);
        self.commit_write(end);
        Ok(())
    }

    /// Write `bytes[offset..offset + len]` without a length prefix.
    pub fn write_raw_range(&mut self, bytes: &[u8], offset: usize, len: usize) -> Result<()> {
        let range = checked_range(offset, len, bytes.len())?;
        self.write_raw(&bytes[range])
    }

    pub fn read_raw(&mut self, len: usize) -> Result<&[u8]> {
        let start = self.position;
        self.check_available(len)?;
        self.position += len;
        Ok(&self.data[start..start + len])
    }

    /// Advance the read cursor by `len` bytes.
    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.check_available(len)?;
        self.position += len;
        Ok(())
    }

    // ========================================================================
    // Padded slots (crate-internal building blocks of the codecs)
    // ========================================================================

    /// Reserve `len` bytes (padded to the word boundary) at `position`,
    /// zero the slot and advance. Returns the unpadded slot.
    pub(crate) fn write_slot(&mut self, len: usize) -> Result<&mut [u8]> {
        let padded = padded_len(len, self.position)?;
        let start = self.position;
        let end = self.end_of_write(padded)?;
        self.data[start..end].fill(0);
        self.commit_write(end);
        Ok(&mut self.data[start..start + len])
    }

    /// Consume `len` bytes (plus padding) at `position`.
    pub(crate) fn read_slot(&mut self, len: usize) -> Result<&[u8]> {
        self.check_available(len)?;
        let padded = padded_len(len, self.position)?;
        let start = self.position;
        self.check_available(padded)?;
        self.position += padded;
        Ok(&self.data[start..start + len])
    }

    /// Overwrite a previously written i32 (length backpatching).
    pub(crate) fn patch_i32(&mut self, offset: usize, value: i32) -> Result<()> {
        if offset + 4 > self.size {
            return Err(Error::OutOfRange {
                offset,
                limit: self.size,
            });
        }
        NativeEndian::write_i32(&mut self.data[offset..offset + 4], value);
        Ok(())
    }

    /// Plausibility check for a length prefix read from untrusted input.
    ///
    /// Returns the element count when `count * min_width` fits in the
    /// remaining bytes, `None` otherwise (including negative counts).
    pub(crate) fn plausible_count(&self, count: i32, min_width: usize) -> Option<usize> {
        let count = usize::try_from(count).ok()?;
        let needed = count.checked_mul(min_width)?;
        if needed > self.available() {
            log::warn!(
                "[parcel] implausible length {} x {}B at offset {} ({} bytes left)",
                count,
                min_width,
                self.position,
                self.available()
            );
            return None;
        }
        Some(count)
    }

    /// Run `f` one nesting level deeper, failing once the configured depth
    /// is exceeded.
    pub(crate) fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= self.max_depth {
            return Err(Error::NestingTooDeep {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    pub(crate) fn objects(&self) -> &[ObjectEntry] {
        &self.objects
    }

    pub(crate) fn push_object(&mut self, entry: ObjectEntry) -> usize {
        self.objects.push(entry);
        self.objects.len() - 1
    }

    /// Drop table entries whose slot ends past `size` and renumber the
    /// survivors so their inline indices stay dense.
    fn release_objects_beyond(&mut self, size: usize) {
        if self.objects.iter().all(|entry| entry.offset + 4 <= size) {
            return;
        }
        let before = self.objects.len();
        let mut kept = Vec::with_capacity(before);
        for (old, entry) in std::mem::take(&mut self.objects).into_iter().enumerate() {
            if entry.offset + 4 > size {
                continue;
            }
            let new = kept.len();
            let slot = &mut self.data[entry.offset..entry.offset + 4];
            // Only renumber slots that still hold their own index.
            if new != old && NativeEndian::read_i32(slot) == old as i32 {
                NativeEndian::write_i32(slot, new as i32);
            }
            kept.push(entry);
        }
        log::debug!(
            "[parcel] truncated to {}: released {} object reference(s)",
            size,
            before - kept.len()
        );
        self.objects = kept;
    }

    // ========================================================================
    // Growth
    // ========================================================================

    fn check_available(&self, len: usize) -> Result<()> {
        if len > self.available() {
            return Err(Error::TruncatedData {
                offset: self.position,
                requested: len,
                available: self.available(),
            });
        }
        Ok(())
    }

    /// End offset of a `len`-byte write at `position`, growing as needed.
    fn end_of_write(&mut self, len: usize) -> Result<usize> {
        let end = self
            .position
            .checked_add(len)
            .filter(|end| *end <= MAX_PARCEL_SIZE)
            .ok_or(Error::OutOfRange {
                offset: self.position,
                limit: MAX_PARCEL_SIZE,
            })?;
        if end > self.data.len() {
            self.grow_to(end)?;
        }
        Ok(end)
    }

    fn commit_write(&mut self, end: usize) {
        self.position = end;
        if end > self.size {
            self.size = end;
        }
    }

    fn extend_size(&mut self, size: usize) -> Result<()> {
        if size > self.data.len() {
            self.grow_to(size)?;
        }
        self.data[self.size..size].fill(0);
        self.size = size;
        Ok(())
    }

    /// Grow the allocation by half again the requested size.
    fn grow_to(&mut self, needed: usize) -> Result<()> {
        if needed > MAX_PARCEL_SIZE {
            return Err(Error::OutOfRange {
                offset: needed,
                limit: MAX_PARCEL_SIZE,
            });
        }
        let target = needed
            .saturating_add(needed / 2)
            .clamp(needed, MAX_PARCEL_SIZE);
        log::debug!(
            "[parcel] grow capacity {} -> {}",
            self.data.len(),
            target
        );
        self.data.resize(target, 0);
        Ok(())
    }
}

fn checked_range(offset: usize, len: usize, limit: usize) -> Result<std::ops::Range<usize>> {
    match offset.checked_add(len) {
        Some(end) if end <= limit => Ok(offset..end),
        _ => Err(Error::OutOfRange { offset, limit }),
    }
}

fn padded_len(len: usize, offset: usize) -> Result<usize> {
    if len > MAX_PARCEL_SIZE {
        return Err(Error::OutOfRange {
            offset,
            limit: MAX_PARCEL_SIZE,
        });
    }
    Ok(pad_size(len))
}
