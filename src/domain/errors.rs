use std::fmt;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::status::OrderStatus;

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Malformed or invariant-violating input. Carries every offending field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut err = Self::default();
        err.push(field, message);
        err
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations.push(FieldViolation {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }

    /// `Ok(())` when nothing was collected.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validation failed: ")?;
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", v.field, v.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Order {order_id} cannot move from {from} to {to}")]
pub struct InvalidTransition {
    pub order_id: Uuid,
    pub from: OrderStatus,
    pub to: OrderStatus,
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Order {0} not found")]
    NotFound(Uuid),
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    #[error("Persistence failure: {0}")]
    Persistence(String),
}

/// A single inventory notification that could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    #[error("Broker rejected message: {0}")]
    Rejected(String),
    #[error("Message could not be encoded: {0}")]
    Encoding(String),
    #[error("Publish timed out after {0} ms")]
    TimedOut(u128),
}
