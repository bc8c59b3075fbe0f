//! Conversions from enum wire fields.
//!
//! The payload is a varint carrying the proto enum number. String targets
//! emit the proto name through a number→name map built lazily from the enum
//! descriptor; enum targets go through a number→value map built when the
//! caller supplies the column enum's (name, value) pairs; numeric targets
//! are a plain checked narrowing of the number.

use std::collections::HashMap;

use prost_reflect::{EnumDescriptor, FieldDescriptor};

use crate::convert::{invalid_value, FieldConverter, NumericTarget, WireNumber};
use crate::error::DecodeError;
use crate::source::ByteSource;
use crate::wire::WireReader;

#[derive(Debug)]
pub(crate) struct EnumConverter {
    field: FieldDescriptor,
    enum_desc: EnumDescriptor,
    number_to_name: Option<HashMap<i64, String>>,
    number_to_value: Option<HashMap<i64, i16>>,
}

impl EnumConverter {
    pub(crate) fn new(field: FieldDescriptor, enum_desc: EnumDescriptor) -> Self {
        Self {
            field,
            enum_desc,
            number_to_name: None,
            number_to_value: None,
        }
    }

    fn read_number<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<i64>, DecodeError> {
        wire.read_int()
    }

    fn read_numeric<S, T>(&mut self, wire: &mut WireReader<S>) -> Result<Option<T>, DecodeError>
    where
        S: ByteSource,
        T: NumericTarget,
    {
        let Some(number) = self.read_number(wire)? else {
            return Ok(None);
        };
        match T::from_i64(number) {
            Some(value) => Ok(Some(value)),
            None => Err(invalid_value(&self.field, WireNumber::I64(number), T::NAME)),
        }
    }

    fn read_enum_value<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
    ) -> Result<Option<i16>, DecodeError> {
        if self.number_to_value.is_none() {
            return self.unsupported("Enum");
        }
        let Some(number) = self.read_number(wire)? else {
            return Ok(None);
        };
        let value = self
            .number_to_value
            .as_ref()
            .and_then(|map| map.get(&number).copied());
        match value {
            Some(value) => Ok(Some(value)),
            None => Err(invalid_value(&self.field, number, "Enum")),
        }
    }

    fn prepare_number_to_name(&mut self) {
        if self.number_to_name.is_some() {
            return;
        }
        self.number_to_name = Some(
            self.enum_desc
                .values()
                .map(|value| (i64::from(value.number()), value.name().to_string()))
                .collect(),
        );
    }

    /// Intersect the column enum's pairs with the proto enum's values on
    /// name. Names the proto enum does not declare are dropped.
    fn prepare_number_to_value<V: Into<i16> + Copy>(&mut self, pairs: &[(String, V)]) {
        if self.number_to_value.is_some() {
            return;
        }
        let name_to_number: HashMap<String, i64> = self
            .enum_desc
            .values()
            .map(|value| (value.name().to_string(), i64::from(value.number())))
            .collect();
        self.number_to_value = Some(
            pairs
                .iter()
                .filter_map(|(name, value)| {
                    name_to_number
                        .get(name.as_str())
                        .map(|&number| (number, (*value).into()))
                })
                .collect(),
        );
    }
}

impl FieldConverter for EnumConverter {
    fn field(&self) -> &FieldDescriptor {
        &self.field
    }

    fn read_string_into<S: ByteSource>(
        &mut self,
        wire: &mut WireReader<S>,
        out: &mut Vec<u8>,
    ) -> Result<bool, DecodeError> {
        self.prepare_number_to_name();
        let Some(number) = self.read_number(wire)? else {
            return Ok(false);
        };
        let name = self
            .number_to_name
            .as_ref()
            .and_then(|map| map.get(&number));
        match name {
            Some(name) => {
                out.extend_from_slice(name.as_bytes());
                Ok(true)
            }
            None => Err(invalid_value(&self.field, number, "Enum")),
        }
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

    fn prepare_enum_mapping8(&mut self, pairs: &[(String, i8)]) {
        self.prepare_number_to_value(pairs);
    }

    fn prepare_enum_mapping16(&mut self, pairs: &[(String, i16)]) {
        self.prepare_number_to_value(pairs);
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
}
