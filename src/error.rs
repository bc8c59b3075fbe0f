//! Error types for the protobuf row reader.
//!
//! Two failure kinds matter to callers: a wire stream that violates the
//! protobuf grammar (fatal for the in-flight message), and a well-formed
//! value that cannot be represented in the requested column type (recoverable
//! per value, the stream stays aligned).

use thiserror::Error;

/// Errors raised while decoding a protobuf byte stream.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The byte stream violates the protobuf wire grammar: malformed varint,
    /// unmatched group end, impossible tag, or a rewind the byte source
    /// cannot satisfy.
    #[error("protobuf messages are corrupted or don't match the provided schema")]
    UnknownFormat,

    /// A well-formed field value cannot be represented in the requested
    /// target type.
    #[error(transparent)]
    BadCast(#[from] CastError),

    /// The byte source failed, including truncation mid-message.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A conversion failure between a protobuf field and a column target type.
#[derive(Debug, Error)]
pub enum CastError {
    /// The wire type of the field cannot be converted to the target type at
    /// all, regardless of the value.
    #[error("cannot convert protobuf field '{field}' of type {wire_type} to {target}")]
    UnsupportedTarget {
        field: String,
        wire_type: &'static str,
        target: &'static str,
    },

    /// The value itself does not fit or does not parse as the target type.
    #[error("cannot convert value '{value}' of protobuf field '{field}' to {target}")]
    InvalidValue {
        field: String,
        value: String,
        target: &'static str,
    },
}

pub(crate) fn unknown_format() -> DecodeError {
    DecodeError::UnknownFormat
}
