use std::any::Any;

use crate::error::{DecodeError, EncodeError};

/// The serialized form of an absent top-level message.
pub const NIL_MESSAGE: [u8; 1] = [0];

/// Implemented by every generated model.
///
/// The trait is object safe so that polymorphic callers can hold a
/// `Box<dyn Serializable>`, ask it for a fresh empty instance of the same
/// model and decode into that without knowing the concrete type.
pub trait Serializable {
    /// The model's identity constant as assigned by its schema.
    fn model_id(&self) -> u32;

    fn serialize_binary(&self) -> Result<Vec<u8>, EncodeError>;

    /// Replaces `self` with the message decoded from `data`. The nil sentinel
    /// leaves `self` at its zero value.
    fn deserialize_binary(&mut self, data: &[u8]) -> Result<(), DecodeError>;

    /// A zero-valued instance of the same model. Field values are not copied.
    fn clone_empty_serializable(&self) -> Box<dyn Serializable>;

    fn as_any(&self) -> &dyn Any;
}

/// Returns true when `data` is the nil sentinel.
pub fn is_nil(data: &[u8]) -> bool {
    data == NIL_MESSAGE
}

/// Serializes a message that may be absent; `None` yields [NIL_MESSAGE].
pub fn serialize_optional<T: Serializable + ?Sized>(value: Option<&T>) -> Result<Vec<u8>, EncodeError> {
    match value {
        Some(value) => value.serialize_binary(),
        None        => Ok(NIL_MESSAGE.to_vec()),
    }
}
