// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Exception/status channel.
//!
//! Every reply starts with a status header:
//!
//! ```text
//! ok                 0
//! error              code:i32 | message:string16 [| service_code:i32]
//! ok + diagnostics   -128 | size:i32 | bytes[size] | pad | 0
//! ```
//!
//! The trailing service code is present for `ServiceSpecific` only. The
//! diagnostic header is a side channel ahead of a success code; code
//! `-128` is reserved for it and never names an error kind.

use crate::error::{Error, Result};
use crate::parcel::Parcel;
use std::fmt;

/// Status code of a successful reply.
pub const STATUS_OK: i32 = 0;

/// Reserved code announcing a diagnostic reply header.
pub const HAS_REPLY_HEADER: i32 = -128;

/// Error categories carried by a status header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    Security,
    BadParcelable,
    IllegalArgument,
    NullPointer,
    IllegalState,
    UnsupportedOperation,
    /// Application-defined failure with its own code.
    ServiceSpecific(i32),
}

impl StatusKind {
    /// Wire code of this kind.
    pub const fn code(self) -> i32 {
        match self {
            StatusKind::Security => -1,
            StatusKind::BadParcelable => -2,
            StatusKind::IllegalArgument => -3,
            StatusKind::NullPointer => -4,
            StatusKind::IllegalState => -5,
            StatusKind::UnsupportedOperation => -7,
            StatusKind::ServiceSpecific(_) => -8,
        }
    }

    /// Kind for `code`; a service-specific kind starts with code 0 until
    /// its trailing field is read.
    fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(StatusKind::Security),
            -2 => Some(StatusKind::BadParcelable),
            -3 => Some(StatusKind::IllegalArgument),
            -4 => Some(StatusKind::NullPointer),
            -5 => Some(StatusKind::IllegalState),
            -7 => Some(StatusKind::UnsupportedOperation),
            -8 => Some(StatusKind::ServiceSpecific(0)),
            _ => None,
        }
    }
}

/// Failure reported by the far side of a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteException {
    kind: StatusKind,
    message: Option<String>,
}

impl RemoteException {
    pub fn new(kind: StatusKind, message: Option<&str>) -> Self {
        Self {
            kind,
            message: message.map(str::to_string),
        }
    }

    pub fn kind(&self) -> StatusKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for RemoteException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            StatusKind::ServiceSpecific(code) => write!(f, "ServiceSpecific({})", code)?,
            kind => write!(f, "{:?}", kind)?,
        }
        if let Some(message) = &self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for RemoteException {}

impl Parcel {
    pub fn write_status_ok(&mut self) -> Result<()> {
        self.write_i32(STATUS_OK)
    }

    pub fn write_status_error(&mut self, exception: &RemoteException) -> Result<()> {
        self.write_i32(exception.kind.code())?;
        self.write_string(exception.message())?;
        if let StatusKind::ServiceSpecific(code) = exception.kind {
            self.write_i32(code)?;
        }
        Ok(())
    }

    pub fn write_status(&mut self, kind: StatusKind, message: Option<&str>) -> Result<()> {
        self.write_status_error(&RemoteException::new(kind, message))
    }

    /// Success status preceded by a diagnostic header carrying `header`.
    pub fn write_status_ok_with_header(&mut self, header: &[u8]) -> Result<()> {
        self.write_i32(HAS_REPLY_HEADER)?;
        self.write_len(header.len())?;
        self.write_slot(header.len())?.copy_from_slice(header);
        self.write_status_ok()
    }

    /// Read a status header; diagnostic headers are skipped.
    ///
    /// # Errors
    /// - [`Error::Remote`] for a known error kind
    /// - [`Error::UnknownStatusCode`] for any other non-zero code
    pub fn read_status(&mut self) -> Result<()> {
        self.read_status_with_header().map(|_| ())
    }

    /// Like [`Parcel::read_status`], returning the diagnostic header bytes
    /// if one was present.
    pub fn read_status_with_header(&mut self) -> Result<Option<Vec<u8>>> {
        let mut code = self.read_i32()?;
        let mut header = None;
        if code == HAS_REPLY_HEADER {
            let offset = self.position();
            let size = self.read_i32()?;
            let size = usize::try_from(size)
                .map_err(|_| Error::invalid(offset, format!("negative reply header size {}", size)))?;
            header = Some(self.read_slot(size)?.to_vec());
            code = self.read_i32()?;
        }

        if code == STATUS_OK {
            return Ok(header);
        }
        let Some(kind) = StatusKind::from_code(code) else {
            log::warn!("[status] unknown status code {}", code);
            return Err(Error::UnknownStatusCode(code));
        };
        let message = self.read_string()?;
        let kind = match kind {
            StatusKind::ServiceSpecific(_) => StatusKind::ServiceSpecific(self.read_i32()?),
            kind => kind,
        };
        Err(Error::Remote(RemoteException { kind, message }))
    }
}
