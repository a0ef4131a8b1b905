use thiserror::Error;

#[derive(Error, Debug)]
pub enum LinkDbError {
    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Unknown field '{field}' on type '{type_name}'")]
    UnknownField { type_name: String, field: String },

    #[error("Unknown relation '{relation}' on type '{type_name}'")]
    UnknownRelation {
        type_name: String,
        relation: String,
    },

    #[error("Invalid field path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Object not found: {0}")]
    ObjectNotFound(u64),

    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Ordering comparison not supported for {field_type} field '{field}'")]
    UnsupportedComparison { field_type: String, field: String },

    #[error("A transaction is already in progress")]
    TransactionInProgress,

    #[error("Result sequence is empty")]
    EmptyResults,

    #[error("Schema validation failed: {0}")]
    SchemaError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Snapshot error: {0}")]
    SnapshotError(String),

    #[error("Compression error: {0}")]
    CompressionError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, LinkDbError>;
