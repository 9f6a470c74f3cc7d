// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for HPARCEL.
//!
//! Every failure is raised at the point of detection and aborts the current
//! read or write sequence; nothing is retried and no partially decoded value
//! is handed back.

use crate::status::RemoteException;
use thiserror::Error;

/// Result type for parcel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for parcel operations.
#[derive(Debug, Error)]
pub enum Error {
    // ========================================================================
    // Buffer Errors
    // ========================================================================
    /// A read asked for more bytes than remain before `size`.
    #[error("truncated data at offset {offset}: need {requested} bytes, {available} available")]
    TruncatedData {
        offset: usize,
        requested: usize,
        available: usize,
    },
    /// A fixed-length read-into received a stored length that does not match
    /// the destination.
    #[error("length mismatch: destination holds {expected} elements, stored length is {actual}")]
    LengthMismatch { expected: usize, actual: i64 },
    /// Position, size or source range outside what the buffer can address.
    #[error("offset {offset} out of range (limit {limit})")]
    OutOfRange { offset: usize, limit: usize },

    // ========================================================================
    // Tagged-Value Errors
    // ========================================================================
    /// The encoder met a value it has no tag for.
    #[error("unsupported value type: {0}")]
    UnsupportedValueType(String),
    /// The decoder met a tag outside the known set.
    #[error("unknown value tag {tag} at offset {offset}")]
    UnknownTag { tag: i32, offset: usize },
    /// Payload bytes are present but malformed.
    #[error("invalid data at offset {offset}: {reason}")]
    InvalidData { offset: usize, reason: String },
    /// Nested values exceed the configured depth.
    #[error("nesting deeper than {limit} levels")]
    NestingTooDeep { limit: usize },

    // ========================================================================
    // Polymorphic Object Errors
    // ========================================================================
    /// A type identifier could not be resolved to a conformant creator.
    #[error("bad parcelable type '{identifier}': {reason}")]
    BadPolymorphicType { identifier: String, reason: String },
    /// `marshall()` was asked to flatten live object references.
    #[error("cannot marshall a parcel that holds object references")]
    ObjectReferencesPresent,
    /// `enforce_interface()` read a different interface descriptor.
    #[error("interface mismatch: expected '{expected}', found '{actual}'")]
    InterfaceMismatch { expected: String, actual: String },
    /// The generic object serializer failed.
    #[error("serializer error: {0}")]
    Serializer(String),

    // ========================================================================
    // Status Channel Errors
    // ========================================================================
    /// The reply header carried a known error category.
    #[error("remote exception: {0}")]
    Remote(RemoteException),
    /// The reply header carried a code outside the known set.
    #[error("unknown status code {0}")]
    UnknownStatusCode(i32),
}

impl Error {
    /// Shorthand used by decoders for malformed payloads.
    pub(crate) fn invalid(offset: usize, reason: impl Into<String>) -> Self {
        Error::InvalidData {
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn bad_type(identifier: &str, reason: impl Into<String>) -> Self {
        Error::BadPolymorphicType {
            identifier: identifier.to_string(),
            reason: reason.into(),
        }
    }

    /// `true` for errors caused by running out of input bytes.
    #[must_use]
    pub fn is_truncation(&self) -> bool {
        matches!(self, Error::TruncatedData { .. })
    }
}

impl From<RemoteException> for Error {
    fn from(e: RemoteException) -> Self {
        Error::Remote(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::StatusKind;

    #[test]
    fn test_error_display_variants() {
        let err = Error::TruncatedData {
            offset: 12,
            requested: 4,
            available: 2,
        };
        assert_eq!(
            err.to_string(),
            "truncated data at offset 12: need 4 bytes, 2 available"
        );

        let err = Error::UnknownTag { tag: 99, offset: 8 };
        assert_eq!(err.to_string(), "unknown value tag 99 at offset 8");

        let err = Error::bad_type("com.example.Missing", "not registered");
        assert_eq!(
            err.to_string(),
            "bad parcelable type 'com.example.Missing': not registered"
        );
    }

    #[test]
    fn test_truncation_is_distinguishable() {
        let truncated = Error::TruncatedData {
            offset: 0,
            requested: 4,
            available: 0,
        };
        assert!(truncated.is_truncation());
        assert!(!Error::bad_type("x", "y").is_truncation());
    }

    #[test]
    fn test_remote_exception_converts() {
        let err: Error = RemoteException::new(StatusKind::IllegalState, Some("closed")).into();
        match err {
            Error::Remote(e) => assert_eq!(e.kind(), StatusKind::IllegalState),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
