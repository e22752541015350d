//! Error types for data parsing in advlog-types.

use thiserror::Error;

/// Errors that can occur when parsing advertisement-related values.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Failed to parse data due to insufficient or malformed bytes.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A textual Bluetooth address was not of the form `AA:BB:CC:DD:EE:FF`.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

/// Result type alias using advlog-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
