use thiserror::Error;

/// Rejected table descriptor; nothing is rendered when this is returned
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("invalid field `{field}`: {reason}")]
    InvalidFieldSpec { field: String, reason: &'static str },
    #[error("invalid key `{key}`: {reason}")]
    InvalidKeySpec { key: String, reason: &'static str },
    #[error("table `{table}` declares no fields")]
    EmptyTable { table: String },
}

impl SchemaError {
    pub(crate) fn field(field: impl Into<String>, reason: &'static str) -> Self {
        SchemaError::InvalidFieldSpec {
            field: field.into(),
            reason,
        }
    }

    pub(crate) fn key(key: impl Into<String>, reason: &'static str) -> Self {
        SchemaError::InvalidKeySpec {
            key: key.into(),
            reason,
        }
    }
}

/// Failure while building one table for one deployment unit
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("migration executor failed for `{table}`")]
    ExecutorFailure {
        table: String,
        #[source]
        source: anyhow::Error,
    },
}
