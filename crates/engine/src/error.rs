//! The module contains the errors the engine can return.
//!
//! Every variant carries a short, human-readable detail string. The HTTP
//! boundary never inspects the string: it switches on [`EngineError::kind`],
//! a closed classification of the failure.

use sea_orm::DbErr;
use thiserror::Error;

/// Closed classification of engine failures, switched on at the API boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or out-of-range input; rejected before any write.
    Validation,
    /// The referenced row does not exist.
    NotFound,
    /// Duplicate key or an illegal state transition.
    Conflict,
    /// A domain rule rejected the operation (funds, ceilings, inactive refs).
    BusinessRule,
    /// Unexpected database failure; the transaction was rolled back.
    Internal,
}

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("insufficient funds on {0}")]
    InsufficientFunds(String),
    #[error("maximum amount exceeded on {0}")]
    CeilingExceeded(String),
    #[error("inactive reference: {0}")]
    InactiveRef(String),
    #[error("invalid input: {0}")]
    Validation(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::InsufficientFunds(_) | Self::CeilingExceeded(_) | Self::InactiveRef(_) => {
                ErrorKind::BusinessRule
            }
            Self::Validation(_) => ErrorKind::Validation,
            Self::Database(_) => ErrorKind::Internal,
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::CeilingExceeded(a), Self::CeilingExceeded(b)) => a == b,
            (Self::InactiveRef(a), Self::InactiveRef(b)) => a == b,
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_classify_variants() {
        assert_eq!(
            EngineError::NotFound("cash account".to_string()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            EngineError::Conflict("code already exists".to_string()).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            EngineError::InsufficientFunds("CAJA-01".to_string()).kind(),
            ErrorKind::BusinessRule
        );
        assert_eq!(
            EngineError::CeilingExceeded("CAJA-01".to_string()).kind(),
            ErrorKind::BusinessRule
        );
        assert_eq!(
            EngineError::Validation("amount must be > 0".to_string()).kind(),
            ErrorKind::Validation
        );
    }
}
