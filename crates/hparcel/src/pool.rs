// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounded free-list of reusable parcels.
//!
//! Pooling only saves allocations; a parcel from the pool behaves exactly
//! like a fresh one. The pool never blocks: an empty pool allocates, and a
//! full pool drops what is handed back.

use crate::config::ParcelConfig;
use crate::parcel::Parcel;
use parking_lot::Mutex;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};

/// Pool occupancy and traffic counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Parcels currently idle in the pool.
    pub idle: usize,
    /// Free-list bound.
    pub max_size: usize,
    /// `obtain()` calls served from the free list.
    pub reused: u64,
    /// `obtain()` calls that had to allocate.
    pub allocated: u64,
}

/// Thread-safe parcel pool.
#[derive(Debug)]
pub struct ParcelPool {
    free: Mutex<Vec<Parcel>>,
    config: ParcelConfig,
    reused: AtomicU64,
    allocated: AtomicU64,
}

impl Default for ParcelPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ParcelPool {
    pub fn new() -> Self {
        Self::with_config(ParcelConfig::default())
    }

    /// `config.pool_size` bounds the free list; fresh parcels are built
    /// from `config`.
    pub fn with_config(config: ParcelConfig) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(config.pool_size)),
            config,
            reused: AtomicU64::new(0),
            allocated: AtomicU64::new(0),
        }
    }

    /// Borrow a cleared parcel. It returns to the pool when the guard drops.
    pub fn obtain(&self) -> PooledParcel<'_> {
        let recycled = self.free.lock().pop();
        let parcel = match recycled {
            Some(parcel) => {
                self.reused.fetch_add(1, Ordering::Relaxed);
                log::trace!("[pool] reuse parcel (capacity {})", parcel.capacity());
                parcel
            }
            None => {
                self.allocated.fetch_add(1, Ordering::Relaxed);
                log::trace!("[pool] empty, allocating");
                Parcel::with_config(&self.config)
            }
        };
        PooledParcel {
            parcel: Some(parcel),
            pool: self,
        }
    }

    /// Return a parcel taken with [`PooledParcel::detach`] (or built
    /// elsewhere). Dropped when the pool is full.
    pub fn recycle(&self, mut parcel: Parcel) {
        parcel.reset();
        let mut free = self.free.lock();
        if free.len() < self.config.pool_size {
            free.push(parcel);
        } else {
            log::trace!("[pool] full, dropping parcel");
        }
    }

    /// Idle parcels currently held.
    pub fn len(&self) -> usize {
        self.free.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.free.lock().is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.config.pool_size
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            idle: self.len(),
            max_size: self.config.pool_size,
            reused: self.reused.load(Ordering::Relaxed),
            allocated: self.allocated.load(Ordering::Relaxed),
        }
    }
}

/// RAII handle to a pooled parcel.
#[derive(Debug)]
pub struct PooledParcel<'a> {
    /// Always `Some` until dropped or detached.
    parcel: Option<Parcel>,
    pool: &'a ParcelPool,
}

impl PooledParcel<'_> {
    /// Keep the parcel; it will not go back to the pool.
    pub fn detach(mut self) -> Parcel {
        self.parcel.take().unwrap_or_default()
    }
}

impl Deref for PooledParcel<'_> {
    type Target = Parcel;

    fn deref(&self) -> &Parcel {
        match &self.parcel {
            Some(parcel) => parcel,
            None => unreachable!("pooled parcel accessed after detach"),
        }
    }
}

impl DerefMut for PooledParcel<'_> {
    fn deref_mut(&mut self) -> &mut Parcel {
        match &mut self.parcel {
            Some(parcel) => parcel,
            None => unreachable!("pooled parcel accessed after detach"),
        }
    }
}

impl Drop for PooledParcel<'_> {
    fn drop(&mut self) {
        if let Some(parcel) = self.parcel.take() {
            self.pool.recycle(parcel);
        }
    }
}
