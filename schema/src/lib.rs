//! This is the runtime half of CCL: the little-endian, length-prefixed wire
//! format that every generated codec implements, plus a dynamic [Value] codec
//! that can read and write any message given a runtime [Schema].
//!
//! ```
//! use ccl_schema::*;
//!
//! let schema = Schema::new(vec![
//!     ModelDef::new("Point".to_owned(), 0, vec![
//!         Field::new("X", FieldType::Primitive(Primitive::Int32), false),
//!         Field::new("Y", FieldType::Primitive(Primitive::Int32), false),
//!     ]),
//! ]);
//!
//! let value = Value::decode(&schema, 0, &[1, 0, 0, 0, 254, 255, 255, 255]).unwrap();
//! assert_eq!(format!("{:?}", value), "Point {X: 1, Y: -2}");
//! assert_eq!(value.encode(&schema).unwrap(), [1, 0, 0, 0, 254, 255, 255, 255]);
//! ```

pub mod bb;
pub mod error;
pub mod primitive;
pub mod schema;
pub mod timestamp;
pub mod traits;
pub mod value;

pub use bb::*;
pub use error::*;
pub use primitive::*;
pub use schema::*;
pub use timestamp::*;
pub use traits::*;
pub use value::*;
