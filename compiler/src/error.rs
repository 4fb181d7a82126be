use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CclError {
    #[error("Parse error at line {line}, column {column}: {msg}")]
    ParseError {
        msg:    String,
        line:   usize,
        column: usize,
    },

    #[error("Schema validation error: {0}")]
    SchemaValidation(String),

    /// A field type matched neither a primitive nor a model. Backends rewrap
    /// this as [CclError::UnsupportedFieldType].
    #[error("The type \"{type_name}\" of field \"{field_name}\" in model \"{model_name}\" is not defined")]
    UnresolvedType {
        type_name:  String,
        field_name: String,
        model_name: String,
    },

    #[error("Unsupported type \"{type_name}\" for field \"{field_name}\" in model \"{model_name}\" when generating {backend} code")]
    UnsupportedFieldType {
        type_name:  String,
        field_name: String,
        model_name: String,
        backend:    String,
    },

    #[error("Unknown target language \"{0}\" (expected one of: {expected})", expected = crate::backend::BACKENDS.join(", "))]
    UnknownBackend(String),

    /// A schema name is legal CCL but cannot be emitted as-is: it collides
    /// with another generated identifier or with a name the generated code
    /// relies on.
    #[error("Cannot generate {backend} code: {reason}")]
    NameConflict {
        backend: String,
        reason:  String,
    },

    #[error("Unknown model \"{0}\"")]
    UnknownModel(String),

    #[error("Failed to decode message: {0}")]
    Decode(#[from] ccl_schema::DecodeError),

    #[error("Package name is required for {0} code generation")]
    MissingPackageName(&'static str),

    #[error("Source file {} does not exist", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("Permission denied for source file {}", path.display())]
    SourcePermissionDenied { path: PathBuf },

    #[error("Failed to read source file {}: {source}", path.display())]
    SourceIo {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    OutputIo {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CclError {
    /// Attaches the backend identifier to an unresolved type. Other errors
    /// pass through unchanged.
    pub fn for_backend(self, backend: &str) -> CclError {
        match self {
            CclError::UnresolvedType { type_name, field_name, model_name } => {
                CclError::UnsupportedFieldType {
                    type_name,
                    field_name,
                    model_name,
                    backend: backend.to_string(),
                }
            }
            other => other,
        }
    }

    /// Classifies a failure to read the schema source.
    pub fn source_io(path: PathBuf, source: std::io::Error) -> CclError {
        match source.kind() {
            std::io::ErrorKind::NotFound         => CclError::SourceNotFound { path },
            std::io::ErrorKind::PermissionDenied => CclError::SourcePermissionDenied { path },
            _ => CclError::SourceIo { path, source },
        }
    }
}
