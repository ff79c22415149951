// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for request signing.

use crate::codec::WireType;

/// Errors that can occur while building or inspecting signature headers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A serialized message could not be decoded.
    #[error("malformed field: {reason}")]
    MalformedField {
        /// What was wrong with the input.
        reason: &'static str,
    },
    /// A field carries a wire type the encoder cannot write.
    #[error("unsupported field type: {0:?}")]
    UnsupportedFieldType(WireType),
    /// A required signing input is missing or empty.
    #[error("precondition failed: {0}")]
    PreconditionFailed(&'static str),
    /// The random source could not produce nonce bytes.
    #[error("random source failure: {0}")]
    RandomSourceFailure(String),
    /// An `x-argus` value does not have the expected envelope.
    #[error("invalid envelope: {0}")]
    InvalidEnvelope(&'static str),
}

impl Error {
    pub(crate) fn malformed(reason: &'static str) -> Self {
        Self::MalformedField { reason }
    }
}

/// Result type alias using [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
