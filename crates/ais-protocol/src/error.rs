//! Error types for NMEA sentence parsing and AIS encoding

use thiserror::Error;

/// Errors that can occur while parsing sentence data
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Framing violates the `$`/`!` ... `*CC` syntax or the length bound
    #[error("malformed sentence: {0}")]
    MalformedSentence(String),

    /// Checksum mismatch
    #[error("checksum mismatch: expected 0x{expected:02X}, got 0x{actual:02X}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    /// Sentence identifier is not one we understand
    #[error("unsupported sentence type: {0}")]
    UnsupportedSentenceType(String),

    /// A field could not be interpreted
    #[error("invalid {field} field: {value:?}")]
    InvalidField { field: &'static str, value: String },

    /// Binary string contained something other than '0' or '1'
    #[error("invalid binary digit: {0:?}")]
    InvalidBinary(char),
}

/// Higher-level protocol errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Parse error
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// AIS message type outside the supported set
    #[error("unsupported AIS message type: {0}")]
    UnsupportedMessageType(u8),

    /// Rendered sentence exceeds the 82 character limit
    #[error("sentence too long: {len} characters (max 82)")]
    SentenceTooLong { len: usize },

    /// AIVDM fragment metadata is inconsistent
    #[error("invalid fragment: {0}")]
    InvalidFragment(String),
}
