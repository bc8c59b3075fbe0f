//! The row-oriented protobuf reader.
//!
//! Ties the wire reader, the matched schema tree and the per-field
//! converters together behind the call sequence the ingestion loop drives:
//! start a message, pull column indices until exhausted, read each column's
//! value with its target type, end the message.

use prost_reflect::MessageDescriptor;
use uuid::Uuid;

use crate::aggregate::AggregateStateDeserializer;
use crate::convert::Converter;
use crate::decimal::{Decimal128, Decimal32, Decimal64};
use crate::error::DecodeError;
use crate::schema::{match_columns, MatchError, NodeId, SchemaTree};
use crate::source::ByteSource;
use crate::wire::WireReader;

/// Streaming decoder delivering (column index, typed value) pairs from
/// length-prefixed protobuf messages.
///
/// ```ignore
/// let mut reader = ProtobufReader::new(source, &descriptor, &columns)?;
/// while reader.start_message()? {
///     while let Some(idx) = reader.read_column_index()? {
///         let value = reader.read_i32()?; // per-column target type
///     }
///     reader.end_message()?;
/// }
/// ```
///
/// One instance serves one caller; the typed reads operate on the column
/// selected by the latest successful `read_column_index`.
pub struct ProtobufReader<S> {
    wire: WireReader<S>,
    tree: SchemaTree,
    node: NodeId,
    field_index: usize,
    selected: Option<(NodeId, usize)>,
}

impl<S: ByteSource> ProtobufReader<S> {
    /// Match `columns` against the message descriptor and bind a converter
    /// to every leaf. Fails before any bytes are read.
    pub fn new(
        source: S,
        descriptor: &MessageDescriptor,
        columns: &[String],
    ) -> Result<Self, MatchError> {
        let tree = match_columns(descriptor, columns)?;
        Ok(Self {
            wire: WireReader::new(source),
            tree,
            node: SchemaTree::ROOT,
            field_index: 0,
            selected: None,
        })
    }

    /// Begin the next root message. `Ok(false)` on a clean end of stream.
    pub fn start_message(&mut self) -> Result<bool, DecodeError> {
        if !self.wire.start_message()? {
            return Ok(false);
        }
        self.node = SchemaTree::ROOT;
        self.field_index = 0;
        self.selected = None;
        Ok(true)
    }

    /// Finish the current message, reconciling the byte source to the
    /// message boundary no matter how much of it was consumed.
    pub fn end_message(&mut self) -> Result<(), DecodeError> {
        self.wire.end_root_message()?;
        self.node = SchemaTree::ROOT;
        self.field_index = 0;
        self.selected = None;
        Ok(())
    }

    /// Advance to the next matched field and return its column index, or
    /// `None` once the message is exhausted. Unmatched fields are skipped,
    /// matched submessages are descended into transparently.
    pub fn read_column_index(&mut self) -> Result<Option<usize>, DecodeError> {
        loop {
            let Some(field_number) = self.wire.read_field_number()? else {
                let (parent, index_in_parent) = {
                    let node = self.tree.node(self.node);
                    (node.parent, node.index_in_parent)
                };
                let Some(parent) = parent else {
                    self.selected = None;
                    return Ok(None);
                };
                self.wire.end_message()?;
                self.node = parent;
                // Resume the parent scan at the submessage's own position.
                self.field_index = index_in_parent;
                continue;
            };

            let mut found = None;
            {
                let node = self.tree.node(self.node);
                // Fast path: tags usually arrive in ascending field order.
                while self.field_index < node.fields.len() {
                    let field = &node.fields[self.field_index];
                    if field.number == field_number {
                        found = Some(self.field_index);
                        break;
                    }
                    if field.number > field_number {
                        break;
                    }
                    self.field_index += 1;
                }
                if found.is_none() {
                    found = node.by_number.get(&field_number).copied();
                }
            }
            let Some(index) = found else {
                // Not mapped to a column; the wire reader skips it.
                continue;
            };

            let (nested, column_index) = {
                let field = &self.tree.node(self.node).fields[index];
                (field.nested, field.column_index)
            };
            if let Some(child) = nested {
                self.wire.start_message()?;
                self.node = child;
                self.field_index = 0;
                continue;
            }

            self.selected = Some((self.node, index));
            return Ok(Some(
                column_index.expect("leaf fields always own a column"),
            ));
        }
    }

    fn parts(&mut self) -> (&mut Converter, &mut WireReader<S>) {
        let (node, index) = self
            .selected
            .expect("call read_column_index before typed reads");
        (self.tree.converter_mut(node, index), &mut self.wire)
    }

    /// Append the selected column's value as text/bytes. `Ok(false)` when
    /// the field is exhausted.
    pub fn read_string_into(&mut self, out: &mut Vec<u8>) -> Result<bool, DecodeError> {
        let (converter, wire) = self.parts();
        converter.read_string_into(wire, out)
    }

    /// Supply the (name, value) pairs of an 8-bit column enum. Must happen
    /// before the first enum read on that column; later calls are ignored.
    pub fn prepare_enum_mapping8(&mut self, pairs: &[(String, i8)]) {
        let (converter, _) = self.parts();
        converter.prepare_enum_mapping8(pairs);
    }

    /// 16-bit variant of [`prepare_enum_mapping8`](Self::prepare_enum_mapping8).
    pub fn prepare_enum_mapping16(&mut self, pairs: &[(String, i16)]) {
        let (converter, _) = self.parts();
        converter.prepare_enum_mapping16(pairs);
    }

    pub fn read_decimal32(
        &mut self,
        precision: u32,
        scale: u32,
    ) -> Result<Option<Decimal32>, DecodeError> {
        let (converter, wire) = self.parts();
        converter.read_decimal32(wire, precision, scale)
    }

    pub fn read_decimal64(
        &mut self,
        precision: u32,
        scale: u32,
    ) -> Result<Option<Decimal64>, DecodeError> {
        let (converter, wire) = self.parts();
        converter.read_decimal64(wire, precision, scale)
    }

    pub fn read_decimal128(
        &mut self,
        precision: u32,
        scale: u32,
    ) -> Result<Option<Decimal128>, DecodeError> {
        let (converter, wire) = self.parts();
        converter.read_decimal128(wire, precision, scale)
    }

    /// Hand the selected column's payload to an aggregate-state
    /// deserializer.
    pub fn read_aggregate<A: AggregateStateDeserializer>(
        &mut self,
        deserializer: &A,
    ) -> Result<Option<A::State>, DecodeError> {
        let (converter, wire) = self.parts();
        converter.read_aggregate(wire, deserializer)
    }
}

macro_rules! typed_reads {
    ($($method:ident -> $ty:ty),* $(,)?) => {
        impl<S: ByteSource> ProtobufReader<S> {
            $(pub fn $method(&mut self) -> Result<Option<$ty>, DecodeError> {
                let (converter, wire) = self.parts();
                converter.$method(wire)
            })*
        }
    };
}

typed_reads! {
    read_i8 -> i8,
    read_i16 -> i16,
    read_i32 -> i32,
    read_i64 -> i64,
    read_u8 -> u8,
    read_u16 -> u16,
    read_u32 -> u32,
    read_u64 -> u64,
    read_u128 -> u128,
    read_f32 -> f32,
    read_f64 -> f64,
    read_enum8 -> i8,
    read_enum16 -> i16,
    read_uuid -> Uuid,
    read_date -> u16,
    read_date_time -> u32,
}
