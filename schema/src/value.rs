use crate::{
    bb::{ByteBuffer, ByteBufferMut, NestingGuard},
    error::{DecodeError, EncodeError},
    primitive::Primitive,
    schema::{Field, FieldType, ModelDef, Schema},
    timestamp::Timestamp,
    traits::{is_nil, NIL_MESSAGE},
};

use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

/// This type holds dynamic CCL data.
///
/// Values can represent any message of a CCL schema and can be converted to
/// and from byte arrays using the corresponding [Schema]. Model and field
/// names are borrowed from the Schema, so a Value can outlive the buffer it
/// was decoded from but not the schema.
#[derive(Clone, PartialEq)]
pub enum Value<'a> {
    /// An absent nested message.
    Null,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    String(String),
    Bytes(Vec<u8>),
    Timestamp(Timestamp),
    Array(Vec<Value<'a>>),
    Object(&'a str, HashMap<&'a str, Value<'a>>),
}

impl<'a> Value<'a> {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `false` for other value kinds.
    pub fn as_bool(&self) -> bool {
        match *self {
            Value::Bool(value) => value,
            _ => false,
        }
    }

    /// Widens any signed integer. Returns `0` for other value kinds.
    pub fn as_i64(&self) -> i64 {
        match *self {
            Value::Int8(value) => value as i64,
            Value::Int16(value) => value as i64,
            Value::Int32(value) => value as i64,
            Value::Int64(value) => value,
            _ => 0,
        }
    }

    /// Widens any unsigned integer. Returns `0` for other value kinds.
    pub fn as_u64(&self) -> u64 {
        match *self {
            Value::UInt8(value) => value as u64,
            Value::UInt16(value) => value as u64,
            Value::UInt32(value) => value as u64,
            Value::UInt64(value) => value,
            _ => 0,
        }
    }

    /// Returns `0.0` for other value kinds.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Value::Float32(value) => value as f64,
            Value::Float64(value) => value,
            _ => 0.0,
        }
    }

    /// Returns `""` for other value kinds.
    pub fn as_str(&self) -> &str {
        match *self {
            Value::String(ref value) => value.as_str(),
            _ => "",
        }
    }

    /// Returns an empty slice for other value kinds.
    pub fn as_bytes(&self) -> &[u8] {
        match *self {
            Value::Bytes(ref value) => value.as_slice(),
            _ => &[],
        }
    }

    /// Returns the epoch for other value kinds.
    pub fn as_timestamp(&self) -> Timestamp {
        match *self {
            Value::Timestamp(value) => value,
            _ => Timestamp::UNIX_EPOCH,
        }
    }

    /// Returns an empty array for other value kinds.
    pub fn as_array(&self) -> &[Value<'a>] {
        match *self {
            Value::Array(ref values) => values.as_slice(),
            _ => &[],
        }
    }

    /// The length of an [Array](#variant.Array); `0` for other value kinds.
    pub fn len(&self) -> usize {
        match *self {
            Value::Array(ref values) => values.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends to an [Array](#variant.Array). Does nothing for other value kinds.
    pub fn push(&mut self, value: Value<'a>) {
        if let Value::Array(ref mut values) = *self {
            values.push(value);
        }
    }

    /// Reads a field out of an [Object](#variant.Object).
    pub fn get(&self, name: &str) -> Option<&Value<'a>> {
        match *self {
            Value::Object(_, ref fields) => fields.get(name),
            _ => None,
        }
    }

    /// Updates a field on an [Object](#variant.Object). Does nothing for
    /// other value kinds.
    pub fn set(&mut self, name: &'a str, value: Value<'a>) {
        if let Value::Object(_, ref mut fields) = *self {
            fields.insert(name, value);
        }
    }

    /// Removes a field from an [Object](#variant.Object). Does nothing for
    /// other value kinds.
    pub fn remove(&mut self, name: &'a str) {
        if let Value::Object(_, ref mut fields) = *self {
            fields.remove(name);
        }
    }

    /// The zero value of the model at `model_index`: zero scalars, empty
    /// strings and arrays, absent nested messages.
    pub fn zero(schema: &'a Schema, model_index: usize) -> Result<Value<'a>, DecodeError> {
        let model = schema
            .model(model_index)
            .ok_or(DecodeError::UnknownModel(model_index))?;
        let fields = model
            .fields
            .iter()
            .map(|field| (field.name.as_str(), Value::zero_field(field)))
            .collect();
        Ok(Value::Object(model.name.as_str(), fields))
    }

    fn zero_field(field: &Field) -> Value<'a> {
        if field.is_array {
            return Value::Array(vec![]);
        }
        match field.type_ {
            FieldType::Primitive(primitive) => Value::zero_primitive(primitive),
            FieldType::Model(_) => Value::Null,
        }
    }

    fn zero_primitive(primitive: Primitive) -> Value<'a> {
        match primitive {
            Primitive::Bool     => Value::Bool(false),
            Primitive::Int8     => Value::Int8(0),
            Primitive::Int16    => Value::Int16(0),
            Primitive::Int32    => Value::Int32(0),
            Primitive::Int64    => Value::Int64(0),
            Primitive::UInt8    => Value::UInt8(0),
            Primitive::UInt16   => Value::UInt16(0),
            Primitive::UInt32   => Value::UInt32(0),
            Primitive::UInt64   => Value::UInt64(0),
            Primitive::Float32  => Value::Float32(0.0),
            Primitive::Float64  => Value::Float64(0.0),
            Primitive::String   => Value::String(String::new()),
            Primitive::Bytes    => Value::Bytes(vec![]),
            Primitive::DateTime => Value::Timestamp(Timestamp::UNIX_EPOCH),
        }
    }

    /// Decodes the model at `model_index` of `schema` from `bytes`. The nil
    /// sentinel decodes to the model's [zero](#method.zero) value.
    pub fn decode(schema: &'a Schema, model_index: usize, bytes: &[u8]) -> Result<Value<'a>, DecodeError> {
        if is_nil(bytes) {
            return Value::zero(schema, model_index);
        }
        Value::decode_model_bb(schema, model_index, &mut ByteBuffer::new(bytes))
    }

    /// Decodes every field of the model at `model_index` from `bb`, in
    /// declaration order. This is mainly useful as a helper routine for
    /// [decode](#method.decode), which you probably want to use instead.
    pub fn decode_model_bb(
        schema: &'a Schema,
        model_index: usize,
        bb: &mut ByteBuffer,
    ) -> Result<Value<'a>, DecodeError> {
        let model = schema
            .model(model_index)
            .ok_or(DecodeError::UnknownModel(model_index))?;
        let mut fields = HashMap::new();
        for field in &model.fields {
            fields.insert(
                field.name.as_str(),
                Value::decode_field_bb(schema, field, bb)?,
            );
        }
        Ok(Value::Object(model.name.as_str(), fields))
    }

    /// Decodes the field specified by `field` from `bb` starting at the
    /// current index.
    pub fn decode_field_bb(
        schema: &'a Schema,
        field: &Field,
        bb: &mut ByteBuffer,
    ) -> Result<Value<'a>, DecodeError> {
        if field.is_array {
            let count = bb.read_count()?;
            let mut array = Vec::with_capacity(count);
            for _ in 0..count {
                array.push(Value::decode_element_bb(schema, field.type_, true, bb)?);
            }
            Ok(Value::Array(array))
        } else {
            Value::decode_element_bb(schema, field.type_, false, bb)
        }
    }

    fn decode_element_bb(
        schema: &'a Schema,
        type_: FieldType,
        in_array: bool,
        bb: &mut ByteBuffer,
    ) -> Result<Value<'a>, DecodeError> {
        match type_ {
            FieldType::Primitive(primitive) => Value::decode_primitive_bb(primitive, bb),
            FieldType::Model(index) => {
                let payload = bb.read_prefixed()?;
                if !is_nil(payload) {
                    let _nesting = NestingGuard::enter()?;
                    Value::decode_model_bb(schema, index, &mut ByteBuffer::new(payload))
                } else if in_array {
                    Value::zero(schema, index)
                } else {
                    Ok(Value::Null)
                }
            }
        }
    }

    fn decode_primitive_bb(primitive: Primitive, bb: &mut ByteBuffer) -> Result<Value<'a>, DecodeError> {
        Ok(match primitive {
            Primitive::Bool     => Value::Bool(bb.read_bool()?),
            Primitive::Int8     => Value::Int8(bb.read_i8()?),
            Primitive::Int16    => Value::Int16(bb.read_i16()?),
            Primitive::Int32    => Value::Int32(bb.read_i32()?),
            Primitive::Int64    => Value::Int64(bb.read_i64()?),
            Primitive::UInt8    => Value::UInt8(bb.read_u8()?),
            Primitive::UInt16   => Value::UInt16(bb.read_u16()?),
            Primitive::UInt32   => Value::UInt32(bb.read_u32()?),
            Primitive::UInt64   => Value::UInt64(bb.read_u64()?),
            Primitive::Float32  => Value::Float32(bb.read_f32()?),
            Primitive::Float64  => Value::Float64(bb.read_f64()?),
            Primitive::String   => Value::String(bb.read_string()?),
            Primitive::Bytes    => Value::Bytes(bb.read_byte_vec()?),
            Primitive::DateTime => Value::Timestamp(bb.read_timestamp()?),
        })
    }

    /// Encodes this value into bytes using the provided `schema`. Only
    /// [Object](#variant.Object) and [Null](#variant.Null) are messages;
    /// `Null` encodes as the nil sentinel.
    pub fn encode(&self, schema: &Schema) -> Result<Vec<u8>, EncodeError> {
        match self {
            Value::Null => Ok(NIL_MESSAGE.to_vec()),
            Value::Object(name, fields) => {
                let model = schema
                    .model_index(name)
                    .and_then(|index| schema.model(index))
                    .ok_or_else(|| EncodeError::UnknownModel(name.to_string()))?;
                let mut bb = ByteBufferMut::new();
                encode_fields(schema, model, fields, &mut bb)?;
                Ok(bb.data())
            }
            _ => Err(EncodeError::UnknownModel(format!("{:?}", self))),
        }
    }

    fn encode_element_bb(
        &self,
        schema: &Schema,
        model: &ModelDef,
        field: &Field,
        bb: &mut ByteBufferMut,
    ) -> Result<(), EncodeError> {
        match field.type_ {
            FieldType::Primitive(primitive) => self.encode_primitive_bb(primitive, model, field, bb),
            FieldType::Model(index) => {
                let nested = schema
                    .model(index)
                    .ok_or_else(|| EncodeError::UnknownModel(index.to_string()))?;
                match self {
                    Value::Null => bb.write_bytes(&NIL_MESSAGE),
                    Value::Object(name, fields) if *name == nested.name => {
                        let mut inner = ByteBufferMut::new();
                        encode_fields(schema, nested, fields, &mut inner)?;
                        bb.write_bytes(inner.as_slice())
                    }
                    _ => Err(mismatch(model, field, &nested.name)),
                }
            }
        }
    }

    fn encode_primitive_bb(
        &self,
        primitive: Primitive,
        model: &ModelDef,
        field: &Field,
        bb: &mut ByteBufferMut,
    ) -> Result<(), EncodeError> {
        match (primitive, self) {
            (Primitive::Bool, Value::Bool(value))         => bb.write_bool(*value),
            (Primitive::Int8, Value::Int8(value))         => bb.write_i8(*value),
            (Primitive::Int16, Value::Int16(value))       => bb.write_i16(*value),
            (Primitive::Int32, Value::Int32(value))       => bb.write_i32(*value),
            (Primitive::Int64, Value::Int64(value))       => bb.write_i64(*value),
            (Primitive::UInt8, Value::UInt8(value))       => bb.write_u8(*value),
            (Primitive::UInt16, Value::UInt16(value))     => bb.write_u16(*value),
            (Primitive::UInt32, Value::UInt32(value))     => bb.write_u32(*value),
            (Primitive::UInt64, Value::UInt64(value))     => bb.write_u64(*value),
            (Primitive::Float32, Value::Float32(value))   => bb.write_f32(*value),
            (Primitive::Float64, Value::Float64(value))   => bb.write_f64(*value),
            (Primitive::String, Value::String(value))     => bb.write_string(value)?,
            (Primitive::Bytes, Value::Bytes(value))       => bb.write_bytes(value)?,
            (Primitive::DateTime, Value::Timestamp(value)) => bb.write_timestamp(*value),
            _ => return Err(mismatch(model, field, primitive.name())),
        }
        Ok(())
    }
}

/// Writes every field of `model` in declaration order.
fn encode_fields(
    schema: &Schema,
    model: &ModelDef,
    fields: &HashMap<&str, Value>,
    bb: &mut ByteBufferMut,
) -> Result<(), EncodeError> {
    for field in &model.fields {
        let value = fields
            .get(field.name.as_str())
            .ok_or_else(|| EncodeError::MissingField {
                model: model.name.clone(),
                field: field.name.clone(),
            })?;

        if field.is_array {
            let items = match value {
                Value::Array(items) => items,
                _ => return Err(mismatch(model, field, "array")),
            };
            bb.write_len(items.len())?;
            for item in items {
                item.encode_element_bb(schema, model, field, bb)?;
            }
        } else {
            value.encode_element_bb(schema, model, field, bb)?;
        }
    }
    Ok(())
}

fn mismatch(model: &ModelDef, field: &Field, expected: &str) -> EncodeError {
    EncodeError::TypeMismatch {
        model:    model.name.clone(),
        field:    field.name.clone(),
        expected: expected.to_owned(),
    }
}

impl<'a> Index<usize> for Value<'a> {
    type Output = Value<'a>;

    /// A convenience method that adds support for `self[index]` expressions.
    /// It will panic if this value isn't an [Array](#variant.Array) or if the
    /// provided index is out of bounds.
    fn index(&self, index: usize) -> &Value<'a> {
        match *self {
            Value::Array(ref values) => &values[index],
            _ => panic!("cannot index a non-array value"),
        }
    }
}

impl<'a> fmt::Debug for Value<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match *self {
            Value::Null => write!(f, "null"),
            Value::Bool(value) => value.fmt(f),
            Value::Int8(value) => value.fmt(f),
            Value::Int16(value) => value.fmt(f),
            Value::Int32(value) => value.fmt(f),
            Value::Int64(value) => value.fmt(f),
            Value::UInt8(value) => value.fmt(f),
            Value::UInt16(value) => value.fmt(f),
            Value::UInt32(value) => value.fmt(f),
            Value::UInt64(value) => value.fmt(f),
            Value::Float32(value) => value.fmt(f),
            Value::Float64(value) => value.fmt(f),
            Value::String(ref value) => value.fmt(f),
            Value::Bytes(ref value) => value.fmt(f),
            Value::Timestamp(value) => write!(f, "@{}", value.unix_nanos()),
            Value::Array(ref values) => values.fmt(f),

            Value::Object(name, ref fields) => {
                let mut keys: Vec<_> = fields.keys().collect();
                let mut first = true;
                keys.sort();
                write!(f, "{} {{", name)?;

                for key in keys {
                    if first {
                        first = false;
                    } else {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {:?}", key, fields[key])?;
                }

                write!(f, "}}")
            }
        }
    }
}
