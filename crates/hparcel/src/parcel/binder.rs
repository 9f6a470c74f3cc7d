// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Live object references.
//!
//! A reference is written inline as an i32 index into the parcel's object
//! table (`-1` for null). The table itself never reaches the flat byte
//! form, which is why [`Parcel::marshall`] refuses parcels that hold one.

use super::Parcel;
use crate::config::NULL_LENGTH;
use crate::error::{Error, Result};
use std::fmt;
use std::sync::Arc;

/// Handle to a remote-capable object carried by reference.
pub trait Binder: fmt::Debug + Send + Sync {
    /// Interface descriptor the object implements.
    fn descriptor(&self) -> &str;
}

/// One slot of the object table.
#[derive(Debug, Clone)]
pub(crate) struct ObjectEntry {
    /// Byte offset of the inline index.
    pub(crate) offset: usize,
    pub(crate) binder: Arc<dyn Binder>,
}

impl Parcel {
    pub fn write_strong_binder(&mut self, binder: Option<&Arc<dyn Binder>>) -> Result<()> {
        let Some(binder) = binder else {
            return self.write_i32(NULL_LENGTH);
        };
        let offset = self.position();
        let index = i32::try_from(self.objects().len()).map_err(|_| Error::OutOfRange {
            offset,
            limit: i32::MAX as usize,
        })?;
        self.write_i32(index)?;
        self.push_object(ObjectEntry {
            offset,
            binder: Arc::clone(binder),
        });
        log::trace!(
            "[parcel] binder '{}' -> object #{} at offset {}",
            binder.descriptor(),
            index,
            offset
        );
        Ok(())
    }

    pub fn read_strong_binder(&mut self) -> Result<Option<Arc<dyn Binder>>> {
        let offset = self.position();
        let marker = self.read_i32()?;
        if marker == NULL_LENGTH {
            return Ok(None);
        }
        usize::try_from(marker)
            .ok()
            .and_then(|index| self.objects().get(index))
            .map(|entry| Some(Arc::clone(&entry.binder)))
            .ok_or_else(|| {
                Error::invalid(
                    offset,
                    format!(
                        "object reference #{} outside table of {}",
                        marker,
                        self.objects().len()
                    ),
                )
            })
    }

    /// `true` when the parcel carries at least one live object reference.
    pub fn has_object_references(&self) -> bool {
        !self.objects().is_empty()
    }
}
