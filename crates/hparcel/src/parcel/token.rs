// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Interface tokens: a strict-mode policy word followed by the interface
//! descriptor, written at the head of a transaction.

use super::Parcel;
use crate::config::STRICT_MODE_PENALTY_GATHER;
use crate::error::{Error, Result};

impl Parcel {
    pub fn write_interface_token(&mut self, descriptor: &str) -> Result<()> {
        self.write_i32(STRICT_MODE_PENALTY_GATHER)?;
        self.write_string(Some(descriptor))
    }

    /// Read an interface token and check it names `descriptor`.
    ///
    /// The policy word is consumed but not interpreted.
    pub fn enforce_interface(&mut self, descriptor: &str) -> Result<()> {
        let _policy = self.read_i32()?;
        let actual = self.read_string()?;
        if actual.as_deref() == Some(descriptor) {
            return Ok(());
        }
        log::debug!(
            "[parcel] interface token mismatch: expected '{}', found {:?}",
            descriptor,
            actual
        );
        Err(Error::InterfaceMismatch {
            expected: descriptor.to_string(),
            actual: actual.unwrap_or_default(),
        })
    }
}
