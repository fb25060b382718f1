use thiserror::Error;

/// Errors surfaced to callers of the catalog core.
///
/// Asset deletion never produces one of these; see [`crate::uploads::AssetCleanup`].
#[derive(Debug, Error)]
pub enum Error {
    /// Bad input: missing file, disallowed type, oversize payload, invalid product fields.
    #[error("{0}")]
    Validation(String),

    /// I/O or network failure while persisting an asset.
    #[error("{0}")]
    Storage(String),

    #[error("{entity} with ID {id} not found")]
    NotFound { entity: &'static str, id: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Error::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::NotFound { .. } => 404,
            Error::Storage(_) => 500,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation_error",
            Error::NotFound { .. } => "not_found",
            Error::Storage(_) => "storage_error",
        }
    }
}
