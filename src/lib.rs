//! Streaming protobuf decoder for columnar row ingestion.
//!
//! Decodes length-prefixed protobuf messages straight from a byte source
//! into per-column typed values, without materializing intermediate message
//! structures. Callers name their columns (dotted paths address nested
//! submessages), the matcher pairs them with descriptor fields, and the
//! reader then emits (column index, typed value) pairs per message:
//!
//! ```ignore
//! let mut reader = ProtobufReader::new(source, &descriptor, &columns)?;
//! while reader.start_message()? {
//!     while let Some(idx) = reader.read_column_index()? {
//!         reader.read_i64()?; // or any other per-column target type
//!     }
//!     reader.end_message()?;
//! }
//! ```

pub mod aggregate;
pub mod decimal;
pub mod error;
pub mod reader;
pub mod schema;
pub mod source;
pub mod wire;

mod convert;
#[cfg(test)]
mod testutil;

pub use aggregate::AggregateStateDeserializer;
pub use decimal::{Decimal128, Decimal32, Decimal64};
pub use error::{CastError, DecodeError};
pub use reader::ProtobufReader;
pub use schema::{parse_message_descriptor, MatchError, SchemaError};
pub use source::{ByteSource, ReadSource, SliceSource};
pub use wire::WireReader;
