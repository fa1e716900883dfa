use thiserror::Error;

use crate::store::StoreError;

/// Typed errors raised by the domain services. The HTTP boundary translates
/// each variant into a status code and response body; services themselves
/// carry no HTTP vocabulary.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    ClientNotFound(String),

    #[error("{0}")]
    VehicleNotFound(String),

    #[error("{0}")]
    RepairNotFound(String),

    #[error("{0}")]
    PartNotFound(String),

    #[error("{0}")]
    RepairPartNotFound(String),

    #[error("{0}")]
    FileNotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("A {entity} with this {field} already exists")]
    Duplicate { entity: String, field: String },

    #[error("Bad credentials")]
    BadCredentials,

    #[error("Account locked")]
    AccountLocked,

    #[error("{0}")]
    FileAccessDenied(String),

    #[error("{0}")]
    FileAlreadyExists(String),

    #[error("{0}")]
    Upload(String),

    #[error("{0}")]
    Internal(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { entity, field } => DomainError::Duplicate {
                entity: entity.to_string(),
                field,
            },
            other => DomainError::Store(other),
        }
    }
}
