use thiserror::Error;

/// Failures while reading a message from the wire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A fixed-width read or a length prefix asked for more bytes than remain.
    #[error("Truncated input: needed {needed} bytes but only {remaining} remain")]
    Truncated { needed: usize, remaining: usize },

    #[error("Invalid UTF-8 in string field")]
    InvalidUtf8,

    #[error("Invalid boolean byte {0}")]
    InvalidBool(u8),

    #[error("Unknown model index {0}")]
    UnknownModel(usize),

    #[error("Nested messages go deeper than {0} levels")]
    TooDeep(usize),
}

/// Failures while writing a message to the wire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("Length {0} does not fit in a uint32 prefix")]
    LengthOverflow(usize),

    #[error("Missing field \"{field}\" of model \"{model}\"")]
    MissingField { model: String, field: String },

    #[error("Field \"{field}\" of model \"{model}\" expects a value of type {expected}")]
    TypeMismatch {
        model:    String,
        field:    String,
        expected: String,
    },

    #[error("Unknown model \"{0}\"")]
    UnknownModel(String),
}
