use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// The returns API answered, but not with something usable.
    #[error("{0}")]
    Upstream(String),

    /// The returns API could not be reached.
    #[error("{0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        let message = e.to_string();
        match e.root() {
            DomainError::Validation => AppError::BadRequest(message),
            DomainError::NotFound => AppError::NotFound(message),
            DomainError::Http { .. } | DomainError::InvalidResponse(_) => {
                AppError::Upstream(message)
            }
            DomainError::Network(_) => AppError::Unavailable(message),
            DomainError::Interrupted(_) => AppError::Internal(message),
            DomainError::PartialUpdate { .. } => AppError::Upstream(message),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = serde_json::json!({ "error": self.to_string() });
        match self {
            AppError::BadRequest(_) => HttpResponse::BadRequest().json(body),
            AppError::NotFound(_) => HttpResponse::NotFound().json(body),
            AppError::Upstream(_) => HttpResponse::BadGateway().json(body),
            AppError::Unavailable(_) => HttpResponse::ServiceUnavailable().json(body),
            AppError::Internal(msg) => {
                log::error!("{}", msg);
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Internal server error"
                }))
            }
        }
    }
}
