//! Conversions from numeric wire fields.
//!
//! Each of the twelve numeric proto types has one canonical host read;
//! targets are reached by checked narrowing. Enum targets additionally
//! validate membership against the prepared value set, and float wire types
//! can never target an enum.

use std::collections::HashSet;

use prost_reflect::FieldDescriptor;

use crate::convert::{invalid_value, FieldConverter, NumericTarget, WireNumber};
use crate::decimal::{pow10, Decimal128, Decimal32, Decimal64, DecimalRepr};
use crate::error::DecodeError;
use crate::source::ByteSource;
use crate::wire::WireReader;

/// Which wire read produces this field's canonical value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NumberKind {
    Int32,
    Sint32,
    Uint32,
    Int64,
    Sint64,
    Uint64,
    Fixed32,
    Sfixed32,
    Fixed64,
    Sfixed64,
    Float,
    Double,
}

impl NumberKind {
    fn is_float(self) -> bool {
        matches!(self, NumberKind::Float | NumberKind::Double)
    }
}

#[derive(Debug)]
pub(crate) struct NumberConverter {
    field: FieldDescriptor,
    kind: NumberKind,
    enum_values: Option<HashSet<i16>>,
}

impl NumberConverter {
    pub(crate) fn new(field: FieldDescriptor, kind: NumberKind) -> Self {
        Self {
            field,
            kind,
            enum_values: None,
        }
    }

    fn read_number<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<WireNumber>, DecodeError> {
        let number = match self.kind {
            NumberKind::Int32 | NumberKind::Int64 => wire.read_int()?.map(WireNumber::I64),
            NumberKind::Sint32 | NumberKind::Sint64 => wire.read_sint()?.map(WireNumber::I64),
            NumberKind::Uint32 | NumberKind::Uint64 => wire.read_uint()?.map(WireNumber::U64),
            NumberKind::Fixed32 => wire
                .read_fixed::<u32>()?
                .map(|v| WireNumber::U64(u64::from(v))),
            NumberKind::Sfixed32 => wire
                .read_fixed::<i32>()?
                .map(|v| WireNumber::I64(i64::from(v))),
            NumberKind::Fixed64 => wire.read_fixed::<u64>()?.map(WireNumber::U64),
            NumberKind::Sfixed64 => wire.read_fixed::<i64>()?.map(WireNumber::I64),
            NumberKind::Float => wire.read_fixed::<f32>()?.map(WireNumber::F32),
            NumberKind::Double => wire.read_fixed::<f64>()?.map(WireNumber::F64),
        };
        Ok(number)
    }

    fn read_numeric<S, T>(&mut self, wire: &mut WireReader<S>) -> Result<Option<T>, DecodeError>
    where
        S: ByteSource,
        T: NumericTarget,
    {
        let Some(number) = self.read_number(wire)? else {
            return Ok(None);
        };
        match number.cast::<T>() {
            Some(value) => Ok(Some(value)),
            None => Err(invalid_value(&self.field, number, T::NAME)),
        }
    }

    fn read_enum_value<S, T>(&mut self, wire: &mut WireReader<S>) -> Result<Option<T>, DecodeError>
    where
        S: ByteSource,
        T: NumericTarget + Into<i16>,
    {
        // Floating point has no exact enum identity; rejected before any read.
        if self.kind.is_float() {
            return self.unsupported("Enum");
        }
        if self.enum_values.is_none() {
            return self.unsupported("Enum");
        }
        let Some(number) = self.read_number(wire)? else {
            return Ok(None);
        };
        let Some(value) = number.cast::<T>() else {
            return Err(invalid_value(&self.field, number, "Enum"));
        };
        let known = self
            .enum_values
            .as_ref()
            .is_some_and(|set| set.contains(&value.into()));
        if !known {
            return Err(invalid_value(&self.field, number, "Enum"));
        }
        Ok(Some(value))
    }

    fn read_decimal<S, D>(
        &mut self,
        wire: &mut WireReader<S>,
        scale: u32,
    ) -> Result<Option<D>, DecodeError>
    where
        S: ByteSource,
        D: DecimalRepr,
    {
        let Some(number) = self.read_number(wire)? else {
            return Ok(None);
        };
        let scaled = match number {
            WireNumber::I64(v) => pow10(scale).and_then(|m| i128::from(v).checked_mul(m)),
            WireNumber::U64(v) => pow10(scale).and_then(|m| i128::from(v).checked_mul(m)),
            WireNumber::F32(v) => scale_float(f64::from(v), scale),
            WireNumber::F64(v) => scale_float(v, scale),
        };
        match scaled.and_then(D::from_scaled_i128) {
            Some(decimal) => Ok(Some(decimal)),
            None => Err(invalid_value(&self.field, number, D::TARGET_NAME)),
        }
    }

    fn prepare_value_set<V: Into<i16> + Copy>(&mut self, pairs: &[(String, V)]) {
        if self.enum_values.is_some() {
            return;
        }
        self.enum_values = Some(pairs.iter().map(|(_, value)| (*value).into()).collect());
    }
}

/// Scale a float into the decimal's integer domain, truncating toward zero.
fn scale_float(value: f64, scale: u32) -> Option<i128> {
    let scaled = value * 10f64.powi(scale as i32);
    if !scaled.is_finite() {
        return None;
    }
    let truncated = scaled.trunc();
    if truncated < i128::MIN as f64 || truncated >= i128::MAX as f64 {
        return None;
    }
    Some(truncated as i128)
}

impl FieldConverter for NumberConverter {
    fn field(&self) -> &FieldDescriptor {
        &self.field
    }

    fn read_string_into<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
        out: &mut Vec<u8>,
    ) -> Result<bool, DecodeError> {
        let Some(number) = self.read_number(wire)? else {
            return Ok(false);
        };
        out.extend_from_slice(number.to_string().as_bytes());
        Ok(true)
    }

    fn read_i8<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<i8>, DecodeError> {
        self.read_numeric(wire)
    }

    fn read_i16<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<i16>, DecodeError> {
        self.read_numeric(wire)
    }

    fn read_i32<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<i32>, DecodeError> {
        self.read_numeric(wire)
    }

    fn read_i64<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<i64>, DecodeError> {
        self.read_numeric(wire)
    }

    fn read_u8<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<u8>, DecodeError> {
        self.read_numeric(wire)
    }

    fn read_u16<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<u16>, DecodeError> {
        self.read_numeric(wire)
    }

    fn read_u32<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<u32>, DecodeError> {
        self.read_numeric(wire)
    }

    fn read_u64<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<u64>, DecodeError> {
        self.read_numeric(wire)
    }

    fn read_f32<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<f32>, DecodeError> {
        self.read_numeric(wire)
    }

    fn read_f64<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<f64>, DecodeError> {
        self.read_numeric(wire)
    }

    fn prepare_enum_mapping8(&mut self, pairs: &[(String, i8)]) {
        self.prepare_value_set(pairs);
    }

    fn prepare_enum_mapping16(&mut self, pairs: &[(String, i16)]) {
        self.prepare_value_set(pairs);
    }

    fn read_enum8<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<i8>, DecodeError> {
        self.read_enum_value(wire)
    }

    fn read_enum16<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<i16>, DecodeError> {
        self.read_enum_value(wire)
    }

    fn read_date<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<u16>, DecodeError> {
        // A day count in the 16-bit range.
        self.read_numeric(wire)
    }

    fn read_date_time<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<u32>, DecodeError> {
        // An unsigned second count.
        self.read_numeric(wire)
    }

    fn read_decimal32<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
        _precision: u32,
        scale: u32,
    ) -> Result<Option<Decimal32>, DecodeError> {
        self.read_decimal(wire, scale)
    }

    fn read_decimal64<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
        _precision: u32,
        scale: u32,
    ) -> Result<Option<Decimal64>, DecodeError> {
        self.read_decimal(wire, scale)
    }

    fn read_decimal128<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
        _precision: u32,
        scale: u32,
    ) -> Result<Option<Decimal128>, DecodeError> {
        self.read_decimal(wire, scale)
    }
}
