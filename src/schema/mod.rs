//! Schema handling: descriptor parsing and column→field matching.
//!
//! The reader is driven by a `prost-reflect` message descriptor. Callers
//! that receive the schema as a serialized `FileDescriptorSet` can resolve
//! it here; the matcher then pairs the caller's column names with descriptor
//! fields into the tree the decoder walks.

mod matcher;
mod tree;

use prost::Message;
use prost_reflect::{DescriptorPool, MessageDescriptor};
use prost_types::FileDescriptorSet;
use thiserror::Error;

pub use matcher::MatchError;

pub(crate) use matcher::match_columns;
pub(crate) use tree::{NodeId, SchemaTree};

/// Errors raised while resolving a serialized descriptor set.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to decode FileDescriptorSet: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("failed to build descriptor pool: {0}")]
    Pool(#[from] prost_reflect::DescriptorError),

    #[error("message type not found: {0}")]
    MessageNotFound(String),
}

/// Decode a serialized `FileDescriptorSet` and resolve a message type by its
/// fully qualified name.
pub fn parse_message_descriptor(
    bytes: &[u8],
    message_name: &str,
) -> Result<MessageDescriptor, SchemaError> {
    let descriptor_set = FileDescriptorSet::decode(bytes)?;
    let pool = DescriptorPool::from_file_descriptor_set(descriptor_set)?;
    pool.get_message_by_name(message_name)
        .ok_or_else(|| SchemaError::MessageNotFound(message_name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_a_message_from_a_serialized_descriptor_set() {
        let file = prost_types::FileDescriptorProto {
            name: Some("t.proto".to_string()),
            package: Some("t".to_string()),
            message_type: vec![prost_types::DescriptorProto {
                name: Some("M".to_string()),
                ..Default::default()
            }],
            syntax: Some("proto3".to_string()),
            ..Default::default()
        };
        let bytes = FileDescriptorSet { file: vec![file] }.encode_to_vec();

        let descriptor = parse_message_descriptor(&bytes, "t.M").unwrap();
        assert_eq!(descriptor.full_name(), "t.M");

        assert!(matches!(
            parse_message_descriptor(&bytes, "t.Missing").unwrap_err(),
            SchemaError::MessageNotFound(name) if name == "t.Missing"
        ));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(matches!(
            parse_message_descriptor(&[0xFF, 0xFF], "t.M").unwrap_err(),
            SchemaError::Decode(_)
        ));
    }
}
