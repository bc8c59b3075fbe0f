//! Shared test fixtures: wire-format encoders and descriptor builders.

use prost_reflect::{DescriptorPool, MessageDescriptor};

pub(crate) fn uvarint(mut value: u64) -> Vec<u8> {
    let mut out = Vec::new();
    while value >= 0x80 {
        out.push(value as u8 | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
    out
}

pub(crate) fn zigzag(value: i64) -> u64 {
    ((value as u64) << 1) ^ ((value >> 63) as u64)
}

pub(crate) fn sint_zigzag(value: i64) -> Vec<u8> {
    uvarint(zigzag(value))
}

pub(crate) fn tag(field: u32, wire_type: u32) -> Vec<u8> {
    uvarint((u64::from(field) << 3) | u64::from(wire_type))
}

/// A varint-typed field with its value.
pub(crate) fn field_varint(field: u32, value: u64) -> Vec<u8> {
    let mut out = tag(field, 0);
    out.extend(uvarint(value));
    out
}

/// A length-delimited field with its payload.
pub(crate) fn field_bytes(field: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = tag(field, 2);
    out.extend(uvarint(payload.len() as u64));
    out.extend_from_slice(payload);
    out
}

/// Length-prefix a root message payload.
pub(crate) fn root_message(payload: &[u8]) -> Vec<u8> {
    let mut out = uvarint(payload.len() as u64);
    out.extend_from_slice(payload);
    out
}

pub(crate) mod descriptors {
    use super::*;
    use prost_types::field_descriptor_proto::{Label, Type};
    use prost_types::{
        DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
        FileDescriptorProto, FileDescriptorSet,
    };

    pub(crate) fn scalar_field(name: &str, number: i32, ty: Type) -> FieldDescriptorProto {
        FieldDescriptorProto {
            name: Some(name.to_string()),
            number: Some(number),
            label: Some(Label::Optional as i32),
            r#type: Some(ty as i32),
            ..Default::default()
        }
    }

    pub(crate) fn repeated_field(name: &str, number: i32, ty: Type) -> FieldDescriptorProto {
        FieldDescriptorProto {
            label: Some(Label::Repeated as i32),
            ..scalar_field(name, number, ty)
        }
    }

    pub(crate) fn message_field(name: &str, number: i32, type_name: &str) -> FieldDescriptorProto {
        FieldDescriptorProto {
            name: Some(name.to_string()),
            number: Some(number),
            label: Some(Label::Optional as i32),
            r#type: Some(Type::Message as i32),
            type_name: Some(type_name.to_string()),
            ..Default::default()
        }
    }

    pub(crate) fn enum_field(name: &str, number: i32, type_name: &str) -> FieldDescriptorProto {
        FieldDescriptorProto {
            r#type: Some(Type::Enum as i32),
            ..message_field(name, number, type_name)
        }
    }

    pub(crate) fn message(name: &str, fields: Vec<FieldDescriptorProto>) -> DescriptorProto {
        DescriptorProto {
            name: Some(name.to_string()),
            field: fields,
            ..Default::default()
        }
    }

    pub(crate) fn enumeration(name: &str, values: &[(&str, i32)]) -> EnumDescriptorProto {
        EnumDescriptorProto {
            name: Some(name.to_string()),
            value: values
                .iter()
                .map(|(value_name, number)| EnumValueDescriptorProto {
                    name: Some(value_name.to_string()),
                    number: Some(*number),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    pub(crate) fn pool(
        messages: Vec<DescriptorProto>,
        enums: Vec<EnumDescriptorProto>,
    ) -> DescriptorPool {
        let file = FileDescriptorProto {
            name: Some("test.proto".to_string()),
            package: Some("test".to_string()),
            message_type: messages,
            enum_type: enums,
            syntax: Some("proto3".to_string()),
            ..Default::default()
        };
        DescriptorPool::from_file_descriptor_set(FileDescriptorSet { file: vec![file] })
            .expect("valid test descriptors")
    }

    /// `message Single { <ty> value = 1; }`
    pub(crate) fn single_field(ty: Type) -> MessageDescriptor {
        pool(
            vec![message("Single", vec![scalar_field("value", 1, ty)])],
            vec![],
        )
        .get_message_by_name("test.Single")
        .expect("message registered")
    }

    /// `message Point { int32 x = 1; int32 y = 2; string label = 3; }`
    pub(crate) fn point_message() -> MessageDescriptor {
        pool(
            vec![message(
                "Point",
                vec![
                    scalar_field("x", 1, Type::Int32),
                    scalar_field("y", 2, Type::Int32),
                    scalar_field("label", 3, Type::String),
                ],
            )],
            vec![],
        )
        .get_message_by_name("test.Point")
        .expect("message registered")
    }

    /// `message Outer { Inner inner = 1; int32 id = 2; }` with
    /// `message Inner { string s = 1; int32 n = 2; }`
    pub(crate) fn nested_message() -> MessageDescriptor {
        pool(
            vec![
                message(
                    "Outer",
                    vec![
                        message_field("inner", 1, ".test.Inner"),
                        scalar_field("id", 2, Type::Int32),
                    ],
                ),
                message(
                    "Inner",
                    vec![
                        scalar_field("s", 1, Type::String),
                        scalar_field("n", 2, Type::Int32),
                    ],
                ),
            ],
            vec![],
        )
        .get_message_by_name("test.Outer")
        .expect("message registered")
    }

    /// `message Tagged { Color color = 1; }` with `enum Color { A = 0; B = 7; }`
    pub(crate) fn enum_message() -> MessageDescriptor {
        pool(
            vec![message(
                "Tagged",
                vec![enum_field("color", 1, ".test.Color")],
            )],
            vec![enumeration("Color", &[("A", 0), ("B", 7)])],
        )
        .get_message_by_name("test.Tagged")
        .expect("message registered")
    }
}
