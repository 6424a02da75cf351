//! The module contains the error the engine can throw.
//!
//! The balance and settlement calculations never fail; errors come from the
//! ledger store and from validating user input:
//!
//! - [`KeyNotFound`] thrown when a group, expense, member or invite is missing.
//! - [`Forbidden`] thrown when a non-admin tries an admin-only operation.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Forbidden`]: EngineError::Forbidden
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),
}
