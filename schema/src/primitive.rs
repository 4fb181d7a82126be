use serde::Serialize;
use std::fmt;

/// The closed catalog of primitive wire kinds a field may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Primitive {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    String,
    Bytes,
    DateTime,
}

/// Every primitive, in catalog order.
pub const PRIMITIVES: [Primitive; 14] = [
    Primitive::Bool,
    Primitive::Int8,
    Primitive::Int16,
    Primitive::Int32,
    Primitive::Int64,
    Primitive::UInt8,
    Primitive::UInt16,
    Primitive::UInt32,
    Primitive::UInt64,
    Primitive::Float32,
    Primitive::Float64,
    Primitive::String,
    Primitive::Bytes,
    Primitive::DateTime,
];

impl Primitive {
    /// The schema keyword for this primitive.
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Bool     => "bool",
            Primitive::Int8     => "int8",
            Primitive::Int16    => "int16",
            Primitive::Int32    => "int32",
            Primitive::Int64    => "int64",
            Primitive::UInt8    => "uint8",
            Primitive::UInt16   => "uint16",
            Primitive::UInt32   => "uint32",
            Primitive::UInt64   => "uint64",
            Primitive::Float32  => "float32",
            Primitive::Float64  => "float64",
            Primitive::String   => "string",
            Primitive::Bytes    => "bytes",
            Primitive::DateTime => "datetime",
        }
    }

    /// Looks up a primitive by its schema keyword.
    pub fn from_name(name: &str) -> Option<Primitive> {
        PRIMITIVES.iter().copied().find(|p| p.name() == name)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for p in PRIMITIVES {
            assert_eq!(Primitive::from_name(p.name()), Some(p));
        }
        assert_eq!(Primitive::from_name("int"), None);
        assert_eq!(Primitive::from_name("Point"), None);
    }
}
