// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! HPARCEL Configuration - Single Source of Truth
//!
//! Wire constants and the runtime knobs of the container live here.
//! **NEVER hardcode them elsewhere!**
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: wire constants (padding, magics, status header values)
//! - **Level 2 (Dynamic)**: [`ParcelConfig`] for per-parcel / per-pool limits
//!
//! # Example
//!
//! ```
//! use hparcel::config::{ParcelConfig, PAD_SIZE};
//!
//! assert_eq!(PAD_SIZE, 4);
//!
//! let config = ParcelConfig::default()
//!     .with_initial_capacity(256)
//!     .with_pool_size(2);
//! assert_eq!(config.initial_capacity, 256);
//! ```

// =======================================================================
// Wire layout
// =======================================================================

/// Every datum written to a parcel is padded to this boundary.
pub const PAD_SIZE: usize = 4;

/// Largest size (and position) a parcel may reach.
///
/// Length prefixes are i32 on the wire, so anything larger could not be
/// described by a peer anyway.
pub const MAX_PARCEL_SIZE: usize = i32::MAX as usize;

/// Length prefix sentinel for null strings / arrays / containers.
pub const NULL_LENGTH: i32 = -1;

/// Bundle magic, "BNDL" read as a little-endian i32.
pub const BUNDLE_MAGIC: i32 = 0x4C44_4E42;

/// Persistable bundle magic, "PNDL" read as a little-endian i32.
pub const PERSISTABLE_BUNDLE_MAGIC: i32 = 0x4C44_4E50;

/// Strict-mode policy header written ahead of an interface token.
pub const STRICT_MODE_PENALTY_GATHER: i32 = 0x40 << 16;

/// Text kind for plain (span-less) character sequences.
pub const TEXT_KIND_PLAIN: i32 = 1;

// =======================================================================
// Runtime defaults
// =======================================================================

/// Free-list bound of a [`crate::ParcelPool`].
pub const DEFAULT_POOL_SIZE: usize = 6;

/// Nesting bound for tagged values, bundles and polymorphic objects.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 128;

/// Initial allocation of a freshly created parcel.
pub const DEFAULT_INITIAL_CAPACITY: usize = 0;

/// Round a byte length up to the next [`PAD_SIZE`] boundary.
#[must_use]
pub const fn pad_size(len: usize) -> usize {
    (len + PAD_SIZE - 1) & !(PAD_SIZE - 1)
}

/// Runtime configuration consumed by [`crate::Parcel::with_config`] and
/// [`crate::ParcelPool::with_config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParcelConfig {
    /// Bytes reserved up-front for a new parcel.
    pub initial_capacity: usize,
    /// Deepest nesting a decoder accepts before failing with
    /// [`crate::Error::NestingTooDeep`].
    pub max_nesting_depth: usize,
    /// Free-list bound for pooled parcels.
    pub pool_size: usize,
}

impl Default for ParcelConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

impl ParcelConfig {
    #[must_use]
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Nesting limit for tagged-value decoding.
    ///
    /// Each level recurses through the decoder, and an unoptimized build
    /// spends several KiB of stack per level. Limits much above the default
    /// need a reader thread with a larger stack (see
    /// `std::thread::Builder::stack_size`).
    #[must_use]
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    #[must_use]
    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_size_rounds_to_word() {
        assert_eq!(pad_size(0), 0);
        assert_eq!(pad_size(1), 4);
        assert_eq!(pad_size(4), 4);
        assert_eq!(pad_size(5), 8);
        assert_eq!(pad_size(11), 12);
    }

    #[test]
    fn test_magics_spell_their_names() {
        assert_eq!(&BUNDLE_MAGIC.to_le_bytes(), b"BNDL");
        assert_eq!(&PERSISTABLE_BUNDLE_MAGIC.to_le_bytes(), b"PNDL");
    }

    #[test]
    fn test_config_setters_chain() {
        let config = ParcelConfig::default()
            .with_initial_capacity(64)
            .with_max_nesting_depth(8)
            .with_pool_size(1);
        assert_eq!(config.initial_capacity, 64);
        assert_eq!(config.max_nesting_depth, 8);
        assert_eq!(config.pool_size, 1);
        assert_eq!(ParcelConfig::default().pool_size, DEFAULT_POOL_SIZE);
    }
}
