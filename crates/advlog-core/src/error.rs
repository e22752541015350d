//! Error types for advlog-core.
//!
//! Only I/O-level failures and log framing violations are surfaced as
//! errors. Malformed advertising data never is: the decoders degrade to a
//! best-effort decode of whatever bytes are available.
//!
//! | Condition | Representation |
//! |-----------|----------------|
//! | File or socket failure | [`Error::Io`], fatal for the current run |
//! | Short frame payload | [`Error::CorruptFrame`], ends the read sequence |
//! | Oversized frame payload | [`Error::PayloadTooLarge`], nothing is written |
//! | Truncated report or AD record | early stop, residual bytes hex-dumped |
//! | Report without the key field | dropped and counted in [`crate::AggregateStats`] |
//! | Unknown AD type | [`crate::ad::AdRecord::Unknown`], rendered as a raw dump |

use thiserror::Error;

use advlog_types::ParseError;

/// Errors that can occur while reading, writing or capturing advertisement logs.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error on the log file or event source.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A frame header promised more payload than the log holds.
    #[error("Corrupt frame at offset {offset}: expected {expected} payload bytes, got {actual}")]
    CorruptFrame {
        /// Byte offset of the frame header within the log.
        offset: u64,
        /// Payload length declared by the header.
        expected: usize,
        /// Payload bytes actually available.
        actual: usize,
    },

    /// Frame payloads are limited to 16-bit lengths.
    #[error("Frame payload too large: {0} bytes (maximum 65535)")]
    PayloadTooLarge(usize),

    /// A value could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Invalid lookup or aggregation configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type alias using advlog-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;
