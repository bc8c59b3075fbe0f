//! Conversions from bool wire fields.
//!
//! The payload is a varint; zero is false, anything else true. Numeric and
//! decimal targets receive 0/1, the string target the literal words.

use prost_reflect::FieldDescriptor;

use crate::convert::{FieldConverter, NumericTarget};
use crate::decimal::{Decimal128, Decimal32, Decimal64, DecimalRepr};
use crate::error::DecodeError;
use crate::source::ByteSource;
use crate::wire::WireReader;

#[derive(Debug)]
pub(crate) struct BoolConverter {
    field: FieldDescriptor,
}

impl BoolConverter {
    pub(crate) fn new(field: FieldDescriptor) -> Self {
        Self { field }
    }

    fn read_flag<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<bool>, DecodeError> {
        Ok(wire.read_uint()?.map(|n| n != 0))
    }

    fn read_numeric<S, T>(&mut self, wire: &mut WireReader<S>) -> Result<Option<T>, DecodeError>
    where
        S: ByteSource,
        T: NumericTarget,
    {
        let Some(flag) = self.read_flag(wire)? else {
            return Ok(None);
        };
        // 0 and 1 fit every numeric target.
        Ok(T::from_u64(u64::from(flag)))
    }

    fn read_decimal<S, D>(&mut self, wire: &mut WireReader<S>) -> Result<Option<D>, DecodeError>
    where
        S: ByteSource,
        D: DecimalRepr,
    {
        let Some(flag) = self.read_flag(wire)? else {
            return Ok(None);
        };
        Ok(D::from_scaled_i128(i128::from(flag)))
    }
}

impl FieldConverter for BoolConverter {
    fn field(&self) -> &FieldDescriptor {
        &self.field
    }

    fn read_string_into<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
        out: &mut Vec<u8>,
    ) -> Result<bool, DecodeError> {
        let Some(flag) = self.read_flag(wire)? else {
            return Ok(false);
        };
        out.extend_from_slice(if flag { b"true" } else { b"false" });
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

    fn read_decimal32<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
        _precision: u32,
        _scale: u32,
    ) -> Result<Option<Decimal32>, DecodeError> {
        self.read_decimal(wire)
    }

    fn read_decimal64<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
        _precision: u32,
        _scale: u32,
    ) -> Result<Option<Decimal64>, DecodeError> {
        self.read_decimal(wire)
    }

    fn read_decimal128<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
        _precision: u32,
        _scale: u32,
    ) -> Result<Option<Decimal128>, DecodeError> {
        self.read_decimal(wire)
    }
}
