//! Error and result-code types for the BZIP2 codec.
//!
//! The streaming encoder and decoder are defined in terms of a stable
//! integer result-code namespace (mirroring the C `BZ_*` constants), not
//! exceptions, so [`BzError`] carries a [`BzError::result_code`] method
//! alongside the usual `Display`/`Error` impls.

use thiserror::Error;

/// The error type for BZIP2 encode/decode operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BzError {
    /// Host integer widths are not what the format assumes.
    #[error("configuration error: host integer widths unsupported")]
    Config,

    /// A null/absent context, out-of-range numeric parameter, or a context
    /// passed to the wrong stream.
    #[error("parameter error: {message}")]
    Param {
        /// Description of the invalid parameter.
        message: String,
    },

    /// An action inconsistent with the current FSM mode (e.g. `Run` after
    /// `Finish`).
    #[error("sequence error: {message}")]
    Sequence {
        /// Description of the offending call.
        message: String,
    },

    /// Allocation failure. The core frees all partial allocations before
    /// surfacing this.
    #[error("memory error")]
    Memory,

    /// Stream magic bytes did not match the expected header or block/EOS
    /// magic.
    #[error("bad magic bytes: {message}")]
    DataMagic {
        /// Description of where the mismatch occurred.
        message: String,
    },

    /// Structurally invalid compressed data: bad lengths, out-of-range
    /// selectors, a bad `origPtr`, block-size overflow, or a CRC mismatch.
    #[error("data error: {message}")]
    Data {
        /// Description of the corruption.
        message: String,
    },

    /// A well-formed prefix ran out of input before reaching `STREAM_END`.
    /// Only produced by the one-shot buffer helpers.
    #[error("unexpected end of input: expected at least {expected} more bytes")]
    UnexpectedEof {
        /// Minimum number of additional bytes that would have been needed.
        expected: usize,
    },

    /// Output buffer exhausted in one-shot mode before `STREAM_END`.
    #[error("output buffer full")]
    OutbuffFull,
}

impl BzError {
    /// Construct a [`BzError::Param`].
    pub fn param(message: impl Into<String>) -> Self {
        Self::Param {
            message: message.into(),
        }
    }

    /// Construct a [`BzError::Sequence`].
    pub fn sequence(message: impl Into<String>) -> Self {
        Self::Sequence {
            message: message.into(),
        }
    }

    /// Construct a [`BzError::DataMagic`].
    pub fn data_magic(message: impl Into<String>) -> Self {
        Self::DataMagic {
            message: message.into(),
        }
    }

    /// Construct a [`BzError::Data`].
    pub fn data(message: impl Into<String>) -> Self {
        Self::Data {
            message: message.into(),
        }
    }

    /// Map this error onto the stable integer result-code namespace.
    pub fn result_code(&self) -> i32 {
        match self {
            BzError::Config => -9,
            BzError::Param { .. } => -2,
            BzError::Sequence { .. } => -1,
            BzError::Memory => -3,
            BzError::DataMagic { .. } => -5,
            BzError::Data { .. } => -4,
            BzError::UnexpectedEof { .. } => -7,
            BzError::OutbuffFull => -8,
        }
    }
}

impl From<BzError> for oxiarc_core::error::OxiArcError {
    fn from(err: BzError) -> Self {
        match err {
            BzError::Config => oxiarc_core::error::OxiArcError::InvalidHeader {
                message: "host integer widths unsupported".into(),
            },
            BzError::Param { message } | BzError::Sequence { message } => {
                oxiarc_core::error::OxiArcError::InvalidHeader { message }
            }
            BzError::Memory => oxiarc_core::error::OxiArcError::InvalidHeader {
                message: "allocation failure".into(),
            },
            BzError::DataMagic { message } => oxiarc_core::error::OxiArcError::InvalidMagic {
                expected: crate::BZIP2_MAGIC.to_vec(),
                found: message.into_bytes(),
            },
            BzError::Data { message } => {
                oxiarc_core::error::OxiArcError::CorruptedData { offset: 0, message }
            }
            BzError::UnexpectedEof { expected } => {
                oxiarc_core::error::OxiArcError::UnexpectedEof { expected }
            }
            BzError::OutbuffFull => oxiarc_core::error::OxiArcError::BufferTooSmall {
                needed: 1,
                available: 0,
            },
        }
    }
}

/// Result type alias for BZIP2 operations.
pub type Result<T> = std::result::Result<T, BzError>;

/// The action requested of [`crate::encode::BzEncoder::compress`] for a
/// given call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Consume as much input as is available; never forces a block flush.
    Run,
    /// Force the current block to flush once all available input has been
    /// consumed.
    Flush,
    /// Flush the current block and terminate the stream (EOS) once all
    /// available input has been consumed.
    Finish,
}

/// The stable result-code namespace returned by [`crate::stream`] entry
/// points on success. Negative codes are errors and are instead carried as
/// [`BzError`] variants via [`BzError::result_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ResultCode {
    /// General success / no special condition.
    Ok = 0,
    /// `Run` made progress and the mode stays `Running`.
    RunOk = 1,
    /// `Flush` made progress but the flush has not drained yet.
    FlushOk = 2,
    /// `Finish` made progress but has not drained yet.
    FinishOk = 3,
    /// The stream reached its terminal state (EOS for decode, drained
    /// FINISHING for encode).
    StreamEnd = 4,
}
