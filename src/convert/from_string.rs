//! Conversions from string/bytes wire fields.
//!
//! The payload is pulled into a scratch buffer once, then parsed into the
//! target: text parse for numerics, delegated parsers for UUID, date,
//! datetime and decimals, a name lookup for enum targets, and a direct
//! append for string columns.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use prost_reflect::FieldDescriptor;
use uuid::Uuid;

use crate::aggregate::AggregateStateDeserializer;
use crate::convert::{invalid_value, FieldConverter, NumericTarget};
use crate::decimal::{parse_decimal, Decimal128, Decimal32, Decimal64, DecimalRepr};
use crate::error::DecodeError;
use crate::source::ByteSource;
use crate::wire::WireReader;

/// Day number of 1970-01-01 in the proleptic Gregorian calendar.
const UNIX_EPOCH_CE_DAYS: i64 = 719_163;

#[derive(Debug)]
pub(crate) struct StringConverter {
    field: FieldDescriptor,
    scratch: Vec<u8>,
    enum_name_to_value: Option<HashMap<String, i16>>,
}

impl StringConverter {
    pub(crate) fn new(field: FieldDescriptor) -> Self {
        Self {
            field,
            scratch: Vec::new(),
            enum_name_to_value: None,
        }
    }

    /// Pull the field payload into the scratch buffer. `false` when the
    /// field is exhausted.
    fn fill_scratch<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<bool, DecodeError> {
        self.scratch.clear();
        wire.read_string_into(&mut self.scratch)
    }

    fn scratch_text(&self, target: &'static str) -> Result<&str, DecodeError> {
        std::str::from_utf8(&self.scratch).map_err(|_| {
            invalid_value(
                &self.field,
                String::from_utf8_lossy(&self.scratch),
                target,
            )
        })
    }

    fn read_parsed<S, T>(&mut self, wire: &mut WireReader<S>) -> Result<Option<T>, DecodeError>
    where
        S: ByteSource,
        T: NumericTarget + FromStr,
    {
        if !self.fill_scratch(wire)? {
            return Ok(None);
        }
        let text = self.scratch_text(T::NAME)?;
        match text.parse::<T>() {
            Ok(value) => Ok(Some(value)),
            Err(_) => Err(invalid_value(&self.field, text, T::NAME)),
        }
    }

    fn read_enum_value<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<i16>, DecodeError> {
        if !self.fill_scratch(wire)? {
            return Ok(None);
        }
        let text = std::str::from_utf8(&self.scratch).unwrap_or("");
        match self.enum_name_to_value.as_ref().and_then(|m| m.get(text)) {
            Some(&value) => Ok(Some(value)),
            None => Err(invalid_value(
                &self.field,
                String::from_utf8_lossy(&self.scratch),
                "Enum",
            )),
        }
    }

    fn read_decimal<S, D>(
        &mut self,
        wire: &mut WireReader<S>,
        precision: u32,
        scale: u32,
    ) -> Result<Option<D>, DecodeError>
    where
        S: ByteSource,
        D: DecimalRepr,
    {
        if !self.fill_scratch(wire)? {
            return Ok(None);
        }
        let text = self.scratch_text(D::TARGET_NAME)?;
        match parse_decimal(text, precision, scale).and_then(D::from_scaled_i128) {
            Some(decimal) => Ok(Some(decimal)),
            None => Err(invalid_value(&self.field, text, D::TARGET_NAME)),
        }
    }

    fn prepare_name_map<V: Into<i16> + Copy>(&mut self, pairs: &[(String, V)]) {
        if self.enum_name_to_value.is_some() {
            return;
        }
        self.enum_name_to_value = Some(
            pairs
                .iter()
                .map(|(name, value)| (name.clone(), (*value).into()))
                .collect(),
        );
    }
}

impl FieldConverter for StringConverter {
    fn field(&self) -> &FieldDescriptor {
        &self.field
    }

    fn read_string_into<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
        out: &mut Vec<u8>,
    ) -> Result<bool, DecodeError> {
        wire.read_string_into(out)
    }

    fn read_i8<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<i8>, DecodeError> {
        self.read_parsed(wire)
    }

    fn read_i16<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<i16>, DecodeError> {
        self.read_parsed(wire)
    }

    fn read_i32<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<i32>, DecodeError> {
        self.read_parsed(wire)
    }

    fn read_i64<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<i64>, DecodeError> {
        self.read_parsed(wire)
    }

    fn read_u8<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<u8>, DecodeError> {
        self.read_parsed(wire)
    }

    fn read_u16<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<u16>, DecodeError> {
        self.read_parsed(wire)
    }

    fn read_u32<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<u32>, DecodeError> {
        self.read_parsed(wire)
    }

    fn read_u64<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<u64>, DecodeError> {
        self.read_parsed(wire)
    }

    fn read_f32<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<f32>, DecodeError> {
        self.read_parsed(wire)
    }

    fn read_f64<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<f64>, DecodeError> {
        self.read_parsed(wire)
    }

    fn prepare_enum_mapping8(&mut self, pairs: &[(String, i8)]) {
        self.prepare_name_map(pairs);
    }

    fn prepare_enum_mapping16(&mut self, pairs: &[(String, i16)]) {
        self.prepare_name_map(pairs);
    }

    fn read_enum8<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<i8>, DecodeError> {
        Ok(self.read_enum_value(wire)?.map(|v| v as i8))
    }

    fn read_enum16<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<i16>, DecodeError> {
        self.read_enum_value(wire)
    }

    fn read_uuid<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<Uuid>, DecodeError> {
        if !self.fill_scratch(wire)? {
            return Ok(None);
        }
        let text = self.scratch_text("UUID")?;
        match Uuid::parse_str(text) {
            Ok(uuid) => Ok(Some(uuid)),
            Err(_) => Err(invalid_value(&self.field, text, "UUID")),
        }
    }

    fn read_date<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<u16>, DecodeError> {
        if !self.fill_scratch(wire)? {
            return Ok(None);
        }
        let text = self.scratch_text("Date")?;
        let day = NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .map(|date| i64::from(date.num_days_from_ce()) - UNIX_EPOCH_CE_DAYS)
            .and_then(|days| u16::try_from(days).ok());
        match day {
            Some(day) => Ok(Some(day)),
            None => Err(invalid_value(&self.field, text, "Date")),
        }
    }

    fn read_date_time<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<u32>, DecodeError> {
        if !self.fill_scratch(wire)? {
            return Ok(None);
        }
        let text = self.scratch_text("DateTime")?;
        let seconds = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S"))
            .ok()
            .and_then(|dt| u32::try_from(dt.and_utc().timestamp()).ok());
        match seconds {
            Some(seconds) => Ok(Some(seconds)),
            None => Err(invalid_value(&self.field, text, "DateTime")),
        }
    }

    fn read_decimal32<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
        precision: u32,
        scale: u32,
    ) -> Result<Option<Decimal32>, DecodeError> {
        self.read_decimal(wire, precision, scale)
    }

    fn read_decimal64<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
        precision: u32,
        scale: u32,
    ) -> Result<Option<Decimal64>, DecodeError> {
        self.read_decimal(wire, precision, scale)
    }

    fn read_decimal128<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
        precision: u32,
        scale: u32,
    ) -> Result<Option<Decimal128>, DecodeError> {
        self.read_decimal(wire, precision, scale)
    }

    fn read_aggregate<S: ByteSource, A: AggregateStateDeserializer>(
        &mut self,
        wire: &mut WireReader<S>,
        deserializer: &A,
    ) -> Result<Option<A::State>, DecodeError> {
        if !self.fill_scratch(wire)? {
            return Ok(None);
        }
        Ok(Some(deserializer.deserialize(&self.scratch)?))
    }
}
