//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`Validation`] thrown when input data fails a business rule.
//! - [`NotFound`] thrown when a referenced record does not exist.
//! - [`OutOfRange`] thrown when an ordering position falls outside `1..=N`.
//! - [`InvalidState`] thrown when an operation does not apply to the record's
//!   lifecycle state, such as restoring an active record.
//! - [`DataIntegrity`] thrown when stored data violates an invariant the
//!   engine relies on.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`NotFound`]: EngineError::NotFound
//!  [`OutOfRange`]: EngineError::OutOfRange
//!  [`InvalidState`]: EngineError::InvalidState
//!  [`DataIntegrity`]: EngineError::DataIntegrity
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Position out of range: {0}")]
    OutOfRange(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Data integrity violation: {0}")]
    DataIntegrity(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::OutOfRange(a), Self::OutOfRange(b)) => a == b,
            (Self::InvalidState(a), Self::InvalidState(b)) => a == b,
            (Self::DataIntegrity(a), Self::DataIntegrity(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
