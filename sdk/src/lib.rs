//! ccl
//!
//! Runtime support for CCL-encoded data and the entry points of the compiler.
//!
//! - The wire-format buffers, [Serializable] and [Timestamp] used by generated Rust code
//! - Schema compilation and code generation (re-exported from `ccl-compiler`)
//! - Dynamic decoding of any message into JSON

pub use ccl_compiler::{
    compile_runtime_schema, compile_schema, generate, CclError, Definition, GenerateOptions,
};
pub use ccl_schema::{
    is_nil, serialize_optional, ByteBuffer, ByteBufferMut, DecodeError, EncodeError, Primitive,
    Schema, Serializable, Timestamp, Value, NIL_MESSAGE,
};

/// Renders a dynamically decoded message as JSON. Objects carry only their
/// fields; bytes become arrays of numbers and timestamps Unix nanoseconds.
pub fn to_json(value: &Value) -> serde_json::Value {
    use serde_json::Value as Json;
    match value {
        Value::Null          => Json::Null,
        Value::Bool(v)       => Json::Bool(*v),
        Value::Int8(v)       => Json::from(*v),
        Value::Int16(v)      => Json::from(*v),
        Value::Int32(v)      => Json::from(*v),
        Value::Int64(v)      => Json::from(*v),
        Value::UInt8(v)      => Json::from(*v),
        Value::UInt16(v)     => Json::from(*v),
        Value::UInt32(v)     => Json::from(*v),
        Value::UInt64(v)     => Json::from(*v),
        Value::Float32(v)    => serde_json::Number::from_f64(f64::from(*v)).map_or(Json::Null, Json::Number),
        Value::Float64(v)    => serde_json::Number::from_f64(*v).map_or(Json::Null, Json::Number),
        Value::String(v)     => Json::String(v.clone()),
        Value::Bytes(v)      => Json::Array(v.iter().map(|b| Json::from(*b)).collect()),
        Value::Timestamp(v)  => Json::from(v.unix_nanos()),
        Value::Array(values) => Json::Array(values.iter().map(to_json).collect()),
        Value::Object(_, fields) => Json::Object(
            fields
                .iter()
                .map(|(name, field)| (name.to_string(), to_json(field)))
                .collect(),
        ),
    }
}

/// Decode `bytes` as a `model_name` message of the schema in `schema_text`
/// into a pretty-printed JSON string.
pub fn decode_to_json(schema_text: &str, model_name: &str, bytes: &[u8]) -> Result<String, CclError> {
    let definition = compile_schema(schema_text)?;
    let schema = compile_runtime_schema(&definition)?;
    let index = schema
        .model_index(model_name)
        .ok_or_else(|| CclError::UnknownModel(model_name.to_string()))?;
    let value = Value::decode(&schema, index, bytes)?;
    Ok(serde_json::to_string_pretty(&to_json(&value)).unwrap_or_default())
}

pub mod traits {
    pub use ccl_schema::Serializable;
}

pub mod error {
    pub use ccl_compiler::CclError;
    pub use ccl_schema::{DecodeError, EncodeError};
}

pub mod schema {
    pub use ccl_schema::{Field, FieldType, ModelDef, Schema, Value};
}
