//! Per-field conversion between wire payloads and column target types.
//!
//! Every matched leaf field gets one converter, selected by the field's
//! declared proto type. Four families cover the 15 scalar wire types:
//! string/bytes, the twelve numeric types, bool, and enum. Each family
//! implements the full target surface; combinations the family cannot
//! express fail as a bad cast without touching the wire cursor.

mod from_bool;
mod from_enum;
mod from_number;
mod from_string;

use std::fmt;

use prost_reflect::{FieldDescriptor, Kind};
use uuid::Uuid;

use crate::aggregate::AggregateStateDeserializer;
use crate::decimal::{Decimal128, Decimal32, Decimal64};
use crate::error::{CastError, DecodeError};
use crate::source::ByteSource;
use crate::wire::WireReader;

pub(crate) use from_bool::BoolConverter;
pub(crate) use from_enum::EnumConverter;
pub(crate) use from_number::{NumberConverter, NumberKind};
pub(crate) use from_string::StringConverter;

/// Proto type name of a field, as it appears in cast error messages.
pub(crate) fn kind_name(kind: &Kind) -> &'static str {
    match kind {
        Kind::Double => "double",
        Kind::Float => "float",
        Kind::Int32 => "int32",
        Kind::Int64 => "int64",
        Kind::Uint32 => "uint32",
        Kind::Uint64 => "uint64",
        Kind::Sint32 => "sint32",
        Kind::Sint64 => "sint64",
        Kind::Fixed32 => "fixed32",
        Kind::Fixed64 => "fixed64",
        Kind::Sfixed32 => "sfixed32",
        Kind::Sfixed64 => "sfixed64",
        Kind::Bool => "bool",
        Kind::String => "string",
        Kind::Bytes => "bytes",
        Kind::Message(_) => "message",
        Kind::Enum(_) => "enum",
    }
}

pub(crate) fn unsupported_target(field: &FieldDescriptor, target: &'static str) -> DecodeError {
    CastError::UnsupportedTarget {
        field: field.name().to_string(),
        wire_type: kind_name(&field.kind()),
        target,
    }
    .into()
}

pub(crate) fn invalid_value(
    field: &FieldDescriptor,
    value: impl fmt::Display,
    target: &'static str,
) -> DecodeError {
    CastError::InvalidValue {
        field: field.name().to_string(),
        value: value.to_string(),
        target,
    }
    .into()
}

/// The canonical host value of a numeric wire payload: signed varints and
/// signed fixed widths widen to i64, unsigned ones to u64, floats keep their
/// width so error messages and string targets print the original value.
#[derive(Debug, Clone, Copy)]
pub(crate) enum WireNumber {
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
}

impl WireNumber {
    pub(crate) fn cast<T: NumericTarget>(self) -> Option<T> {
        match self {
            WireNumber::I64(v) => T::from_i64(v),
            WireNumber::U64(v) => T::from_u64(v),
            WireNumber::F32(v) => T::from_f64(f64::from(v)),
            WireNumber::F64(v) => T::from_f64(v),
        }
    }
}

impl fmt::Display for WireNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireNumber::I64(v) => write!(f, "{v}"),
            WireNumber::U64(v) => write!(f, "{v}"),
            WireNumber::F32(v) => write!(f, "{v}"),
            WireNumber::F64(v) => write!(f, "{v}"),
        }
    }
}

/// A column-side numeric type reachable by checked narrowing.
pub(crate) trait NumericTarget: Sized + Copy + fmt::Display {
    const NAME: &'static str;

    fn from_i64(v: i64) -> Option<Self>;
    fn from_u64(v: u64) -> Option<Self>;
    fn from_f64(v: f64) -> Option<Self>;
}

macro_rules! int_target {
    ($ty:ty, $name:literal) => {
        impl NumericTarget for $ty {
            const NAME: &'static str = $name;

            fn from_i64(v: i64) -> Option<Self> {
                Self::try_from(v).ok()
            }

            fn from_u64(v: u64) -> Option<Self> {
                Self::try_from(v).ok()
            }

            fn from_f64(v: f64) -> Option<Self> {
                if !v.is_finite() {
                    return None;
                }
                let truncated = v.trunc();
                // The exclusive upper bound is exact in f64 even for the
                // 64-bit widths, where MAX itself rounds up to it.
                if truncated < <$ty>::MIN as f64 || truncated >= (<$ty>::MAX as f64) + 1.0 {
                    return None;
                }
                Some(truncated as $ty)
            }
        }
    };
}

int_target!(i8, "Int8");
int_target!(i16, "Int16");
int_target!(i32, "Int32");
int_target!(i64, "Int64");
int_target!(u8, "UInt8");
int_target!(u16, "UInt16");
int_target!(u32, "UInt32");
int_target!(u64, "UInt64");

impl NumericTarget for f32 {
    const NAME: &'static str = "Float32";

    fn from_i64(v: i64) -> Option<Self> {
        Some(v as f32)
    }

    fn from_u64(v: u64) -> Option<Self> {
        Some(v as f32)
    }

    fn from_f64(v: f64) -> Option<Self> {
        if v.is_finite() && v.abs() > f64::from(f32::MAX) {
            return None;
        }
        Some(v as f32)
    }
}

impl NumericTarget for f64 {
    const NAME: &'static str = "Float64";

    fn from_i64(v: i64) -> Option<Self> {
        Some(v as f64)
    }

    fn from_u64(v: u64) -> Option<Self> {
        Some(v as f64)
    }

    fn from_f64(v: f64) -> Option<Self> {
        Some(v)
    }
}

/// The full target surface of a converter family.
///
/// Defaults reject the combination; families override what their wire type
/// supports. `prepare_enum_mapping*` defaults to a no-op so callers can
/// prepare unconditionally over a mixed column set.
pub(crate) trait FieldConverter {
    fn field(&self) -> &FieldDescriptor;

    fn unsupported<T>(&self, target: &'static str) -> Result<T, DecodeError> {
        Err(unsupported_target(self.field(), target))
    }

    fn read_string_into<S: ByteSource>(
        &mut self,
        _wire: &mut WireReader<S>,
        _out: &mut Vec<u8>,
    ) -> Result<bool, DecodeError> {
        self.unsupported("String")
    }

    fn read_i8<S: ByteSource>(
        &mut self,
        _wire: &mut WireReader<S>,
    ) -> Result<Option<i8>, DecodeError> {
        self.unsupported("Int8")
    }

    fn read_i16<S: ByteSource>(
        &mut self,
        _wire: &mut WireReader<S>,
    ) -> Result<Option<i16>, DecodeError> {
        self.unsupported("Int16")
    }

    fn read_i32<S: ByteSource>(
        &mut self,
        _wire: &mut WireReader<S>,
    ) -> Result<Option<i32>, DecodeError> {
        self.unsupported("Int32")
    }

    fn read_i64<S: ByteSource>(
        &mut self,
        _wire: &mut WireReader<S>,
    ) -> Result<Option<i64>, DecodeError> {
        self.unsupported("Int64")
    }

    fn read_u8<S: ByteSource>(
        &mut self,
        _wire: &mut WireReader<S>,
    ) -> Result<Option<u8>, DecodeError> {
        self.unsupported("UInt8")
    }

    fn read_u16<S: ByteSource>(
        &mut self,
        _wire: &mut WireReader<S>,
    ) -> Result<Option<u16>, DecodeError> {
        self.unsupported("UInt16")
    }

    fn read_u32<S: ByteSource>(
        &mut self,
        _wire: &mut WireReader<S>,
    ) -> Result<Option<u32>, DecodeError> {
        self.unsupported("UInt32")
    }

    fn read_u64<S: ByteSource>(
        &mut self,
        _wire: &mut WireReader<S>,
    ) -> Result<Option<u64>, DecodeError> {
        self.unsupported("UInt64")
    }

    fn read_u128<S: ByteSource>(
        &mut self,
        _wire: &mut WireReader<S>,
    ) -> Result<Option<u128>, DecodeError> {
        self.unsupported("UInt128")
    }

    fn read_f32<S: ByteSource>(
        &mut self,
        _wire: &mut WireReader<S>,
    ) -> Result<Option<f32>, DecodeError> {
        self.unsupported("Float32")
    }

    fn read_f64<S: ByteSource>(
        &mut self,
        _wire: &mut WireReader<S>,
    ) -> Result<Option<f64>, DecodeError> {
        self.unsupported("Float64")
    }

    fn prepare_enum_mapping8(&mut self, _pairs: &[(String, i8)]) {}

    fn prepare_enum_mapping16(&mut self, _pairs: &[(String, i16)]) {}

    fn read_enum8<S: ByteSource>(
        &mut self,
        _wire: &mut WireReader<S>,
    ) -> Result<Option<i8>, DecodeError> {
        self.unsupported("Enum")
    }

    fn read_enum16<S: ByteSource>(
        &mut self,
        _wire: &mut WireReader<S>,
    ) -> Result<Option<i16>, DecodeError> {
        self.unsupported("Enum")
    }

    fn read_uuid<S: ByteSource>(
        &mut self,
        _wire: &mut WireReader<S>,
    ) -> Result<Option<Uuid>, DecodeError> {
        self.unsupported("UUID")
    }

    fn read_date<S: ByteSource>(
        &mut self,
        _wire: &mut WireReader<S>,
    ) -> Result<Option<u16>, DecodeError> {
        self.unsupported("Date")
    }

    fn read_date_time<S: ByteSource>(
        &mut self,
        _wire: &mut WireReader<S>,
    ) -> Result<Option<u32>, DecodeError> {
        self.unsupported("DateTime")
    }

    fn read_decimal32<S: ByteSource>(
        &mut self,
        _wire: &mut WireReader<S>,
        _precision: u32,
        _scale: u32,
    ) -> Result<Option<Decimal32>, DecodeError> {
        self.unsupported("Decimal32")
    }

    fn read_decimal64<S: ByteSource>(
        &mut self,
        _wire: &mut WireReader<S>,
        _precision: u32,
        _scale: u32,
    ) -> Result<Option<Decimal64>, DecodeError> {
        self.unsupported("Decimal64")
    }

    fn read_decimal128<S: ByteSource>(
        &mut self,
        _wire: &mut WireReader<S>,
        _precision: u32,
        _scale: u32,
    ) -> Result<Option<Decimal128>, DecodeError> {
        self.unsupported("Decimal128")
    }

    fn read_aggregate<S: ByteSource, A: AggregateStateDeserializer>(
        &mut self,
        _wire: &mut WireReader<S>,
        _deserializer: &A,
    ) -> Result<Option<A::State>, DecodeError> {
        self.unsupported("AggregateFunction")
    }
}

/// One converter per matched leaf field, tagged by wire-type family.
#[derive(Debug)]
pub(crate) enum Converter {
    FromString(StringConverter),
    FromNumber(NumberConverter),
    FromBool(BoolConverter),
    FromEnum(EnumConverter),
}

impl Converter {
    /// Select the family for a scalar field. `None` for message fields,
    /// which nest instead of converting.
    pub(crate) fn for_field(field: &FieldDescriptor) -> Option<Converter> {
        let kind = field.kind();
        let number_kind = match kind {
            Kind::String | Kind::Bytes => {
                return Some(Converter::FromString(StringConverter::new(field.clone())));
            }
            Kind::Bool => {
                return Some(Converter::FromBool(BoolConverter::new(field.clone())));
            }
            Kind::Enum(enum_desc) => {
                return Some(Converter::FromEnum(EnumConverter::new(
                    field.clone(),
                    enum_desc,
                )));
            }
            Kind::Message(_) => return None,
            Kind::Int32 => NumberKind::Int32,
            Kind::Sint32 => NumberKind::Sint32,
            Kind::Uint32 => NumberKind::Uint32,
            Kind::Int64 => NumberKind::Int64,
            Kind::Sint64 => NumberKind::Sint64,
            Kind::Uint64 => NumberKind::Uint64,
            Kind::Fixed32 => NumberKind::Fixed32,
            Kind::Sfixed32 => NumberKind::Sfixed32,
            Kind::Fixed64 => NumberKind::Fixed64,
            Kind::Sfixed64 => NumberKind::Sfixed64,
            Kind::Float => NumberKind::Float,
            Kind::Double => NumberKind::Double,
        };
        Some(Converter::FromNumber(NumberConverter::new(
            field.clone(),
            number_kind,
        )))
    }
}

macro_rules! dispatch {
    ($self:ident, $method:ident($($arg:expr),*)) => {
        match $self {
            Converter::FromString(c) => c.$method($($arg),*),
            Converter::FromNumber(c) => c.$method($($arg),*),
            Converter::FromBool(c) => c.$method($($arg),*),
            Converter::FromEnum(c) => c.$method($($arg),*),
        }
    };
}

macro_rules! forward_reads {
    ($($method:ident -> $ty:ty),* $(,)?) => {
        $(pub(crate) fn $method<S: ByteSource>(
            &mut self,
            wire: &mut WireReader<S>,
        ) -> Result<Option<$ty>, DecodeError> {
            dispatch!(self, $method(wire))
        })*
    };
}

impl Converter {
    forward_reads! {
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

    pub(crate) fn read_string_into<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
        out: &mut Vec<u8>,
    ) -> Result<bool, DecodeError> {
        dispatch!(self, read_string_into(wire, out))
    }

    pub(crate) fn prepare_enum_mapping8(&mut self, pairs: &[(String, i8)]) {
        dispatch!(self, prepare_enum_mapping8(pairs))
    }

    pub(crate) fn prepare_enum_mapping16(&mut self, pairs: &[(String, i16)]) {
        dispatch!(self, prepare_enum_mapping16(pairs))
    }

    pub(crate) fn read_decimal32<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
        precision: u32,
        scale: u32,
    ) -> Result<Option<Decimal32>, DecodeError> {
        dispatch!(self, read_decimal32(wire, precision, scale))
    }

    pub(crate) fn read_decimal64<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
        precision: u32,
        scale: u32,
    ) -> Result<Option<Decimal64>, DecodeError> {
        dispatch!(self, read_decimal64(wire, precision, scale))
    }

    pub(crate) fn read_decimal128<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
        precision: u32,
        scale: u32,
    ) -> Result<Option<Decimal128>, DecodeError> {
        dispatch!(self, read_decimal128(wire, precision, scale))
    }

    pub(crate) fn read_aggregate<S: ByteSource, A: AggregateStateDeserializer>(
        &mut self,
        wire: &mut WireReader<S>,
        deserializer: &A,
    ) -> Result<Option<A::State>, DecodeError> {
        dispatch!(self, read_aggregate(wire, deserializer))
    }
}
