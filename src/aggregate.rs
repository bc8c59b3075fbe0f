//! Seam for opaque aggregate-function state.
//!
//! Columns holding aggregate state receive the field payload verbatim; the
//! binary format belongs to the aggregate implementation, not to the wire
//! reader.

use std::io;

/// Deserializes aggregate-function state from its binary representation.
///
/// The reader hands over the raw payload bytes of a string/bytes field; the
/// implementation owns the format and the resulting state value.
pub trait AggregateStateDeserializer {
    type State;

    fn deserialize(&self, bytes: &[u8]) -> io::Result<Self::State>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Test deserializer that keeps the payload as-is.
    pub struct RawStateDeserializer;

    impl AggregateStateDeserializer for RawStateDeserializer {
        type State = Vec<u8>;

        fn deserialize(&self, bytes: &[u8]) -> io::Result<Self::State> {
            Ok(bytes.to_vec())
        }
    }
}
