//! HTTP boundary error type. Domain errors are translated here, once, into
//! a status code plus the numeric-code response body; services never see
//! HTTP vocabulary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

use crate::services::DomainError;

/// API error with the numeric application code carried in the body as
/// `errorCode` alongside a stable description and the raw message.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: u16,
    pub description: String,
    pub detail: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: u16, description: impl Into<String>) -> Self {
        Self {
            status,
            code,
            description: description.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, 401, "Unauthorized").with_detail(detail)
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, 400, "Validation failed").with_detail(detail)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let detail = err.to_string();
        match err {
            DomainError::BadCredentials => {
                Self::new(StatusCode::UNAUTHORIZED, 1000, "Bad credentials").with_detail(detail)
            }
            DomainError::AccountLocked => {
                Self::new(StatusCode::UNAUTHORIZED, 1001, "Account locked").with_detail(detail)
            }
            DomainError::RepairNotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, 1100, "Repair not found").with_detail(detail)
            }
            DomainError::VehicleNotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, 1200, "Vehicle not found").with_detail(detail)
            }
            DomainError::ClientNotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, 1300, "Client not found").with_detail(detail)
            }
            DomainError::PartNotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, 1400, "Part not found").with_detail(detail)
            }
            DomainError::RepairPartNotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, 1401, "Repair part not found").with_detail(detail)
            }
            DomainError::FileNotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, 1500, "File not found").with_detail(detail)
            }
            DomainError::Upload(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, 1501, "File not uploaded")
                    .with_detail(detail)
            }
            DomainError::FileAlreadyExists(_) => {
                Self::new(StatusCode::CONFLICT, 1502, "File already exists").with_detail(detail)
            }
            DomainError::FileAccessDenied(_) => {
                Self::new(StatusCode::FORBIDDEN, 1503, "No access to file").with_detail(detail)
            }
            DomainError::Validation(_) => {
                Self::new(StatusCode::BAD_REQUEST, 400, "Validation failed").with_detail(detail)
            }
            DomainError::Duplicate { entity, field } => Self::new(
                StatusCode::CONFLICT,
                409,
                format!("A {entity} with this {field} already exists"),
            ),
            DomainError::Internal(msg) => {
                // log the cause, return a generic body
                tracing::error!("internal error: {msg}");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, 500, "Internal server error")
            }
            DomainError::Store(store_err) => {
                tracing::error!("store error: {store_err}");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, 500, "Internal server error")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "errorCode": self.code,
                "errorDescription": self.description,
                "error": self.detail,
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_expected_codes() {
        let err = ApiError::from(DomainError::ClientNotFound("Client with id: 1 not found".into()));
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.code, 1300);

        let err = ApiError::from(DomainError::Duplicate {
            entity: "client".to_string(),
            field: "pesel".to_string(),
        });
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.description, "A client with this pesel already exists");

        let err = ApiError::from(DomainError::AccountLocked);
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.code, 1001);

        let err = ApiError::from(DomainError::FileAccessDenied("nope".into()));
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.code, 1503);
    }

    #[test]
    fn internal_errors_do_not_leak_detail() {
        let err = ApiError::from(DomainError::Internal("secret connection string".into()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.detail.is_none());
    }
}
