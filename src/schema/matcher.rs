//! Column-to-field matching over a message descriptor.
//!
//! Column names address fields by name; dotted paths descend into nested
//! submessages ("pos.x" is field `x` of the message field `pos`). Matching
//! is exact first, ASCII-case-insensitive as a fallback. Every column must
//! resolve to a scalar leaf; failures are reported here, before any wire
//! bytes are read.

use log::debug;
use prost_reflect::{FieldDescriptor, Kind, MessageDescriptor};
use thiserror::Error;

use crate::convert::Converter;
use crate::schema::tree::{FieldNode, SchemaTree};

/// Errors raised while pairing columns with protobuf fields.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("no columns were requested")]
    NoColumns,

    #[error("column '{0}' doesn't match any field of the protobuf schema")]
    ColumnNotFound(String),

    #[error("column '{0}' descends into a protobuf field that is not a message")]
    NotANestedMessage(String),

    #[error("column '{0}' matches a protobuf field that is already taken")]
    DuplicateColumn(String),
}

/// Resolve a field by name within a message, case-insensitively if the
/// exact name is absent.
fn find_field(descriptor: &MessageDescriptor, name: &str) -> Option<FieldDescriptor> {
    descriptor.get_field_by_name(name).or_else(|| {
        descriptor
            .fields()
            .find(|field| field.name().eq_ignore_ascii_case(name))
    })
}

pub(crate) fn match_columns(
    descriptor: &MessageDescriptor,
    columns: &[String],
) -> Result<SchemaTree, MatchError> {
    if columns.is_empty() {
        return Err(MatchError::NoColumns);
    }

    let mut tree = SchemaTree::new();
    for (column_index, column) in columns.iter().enumerate() {
        insert_column(&mut tree, descriptor, column, column_index)?;
    }
    tree.finalize();
    debug!(
        "matched {} columns against message '{}'",
        columns.len(),
        descriptor.full_name()
    );
    Ok(tree)
}

fn insert_column(
    tree: &mut SchemaTree,
    root_descriptor: &MessageDescriptor,
    column: &str,
    column_index: usize,
) -> Result<(), MatchError> {
    let not_found = || MatchError::ColumnNotFound(column.to_string());

    let mut node = SchemaTree::ROOT;
    let mut descriptor = root_descriptor.clone();
    let mut segments = column.split('.').peekable();
    while let Some(segment) = segments.next() {
        if segment.is_empty() {
            return Err(not_found());
        }
        let field = find_field(&descriptor, segment).ok_or_else(not_found)?;
        let existing = tree
            .node(node)
            .fields
            .iter()
            .position(|f| f.number == field.number());

        if segments.peek().is_none() {
            // Leaf: must be a scalar with a converter, and must be new.
            if existing.is_some() {
                return Err(MatchError::DuplicateColumn(column.to_string()));
            }
            let converter = Converter::for_field(&field).ok_or_else(not_found)?;
            tree.node_mut(node).fields.push(FieldNode {
                number: field.number(),
                column_index: Some(column_index),
                nested: None,
                converter: Some(converter),
            });
            return Ok(());
        }

        // Interior segment: must be a message field; reuse or create the
        // nested node.
        let nested_descriptor = match field.kind() {
            Kind::Message(message) => message,
            _ => return Err(MatchError::NotANestedMessage(column.to_string())),
        };
        let child = match existing {
            Some(index) => tree
                .node(node)
                .fields[index]
                .nested
                .ok_or_else(|| MatchError::DuplicateColumn(column.to_string()))?,
            None => {
                let child = tree.add_child(node);
                tree.node_mut(node).fields.push(FieldNode {
                    number: field.number(),
                    column_index: None,
                    nested: Some(child),
                    converter: None,
                });
                child
            }
        };
        node = child;
        descriptor = nested_descriptor;
    }
    Err(not_found())
}
