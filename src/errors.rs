use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::errors::{DomainError, FieldViolation, InvalidTransition};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(Vec<FieldViolation>),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Conflict(InvalidTransition),

    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(v) => AppError::Validation(v.violations),
            DomainError::NotFound(id) => AppError::NotFound(format!("Order {id} not found")),
            DomainError::InvalidTransition(t) => AppError::Conflict(t),
            DomainError::Persistence(msg) => AppError::Unavailable(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Validation(violations) => serde_json::json!({
                "error": self.to_string(),
                "violations": violations,
            }),
            AppError::Conflict(t) => serde_json::json!({
                "error": self.to_string(),
                "order_id": t.order_id,
                "current_status": t.from,
                "requested_status": t.to,
            }),
            AppError::NotFound(_) => serde_json::json!({ "error": self.to_string() }),
            AppError::Unavailable(msg) => {
                log::error!("Request failed on persistence: {}", msg);
                serde_json::json!({ "error": "Service temporarily unavailable" })
            }
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Anything that stops the service from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to create database connection pool: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("Failed to run database migrations: {0}")]
    Migrations(String),
    #[error("Failed to create Kafka producer: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
