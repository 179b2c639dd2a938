use super::validation::ValidationErrors;
use crate::store::StoreError;

// ============================================================================
// Accounts Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AccountsError {
    #[error("Customer already registered with given mobile number: {0}")]
    CustomerAlreadyExists(String),

    #[error("{resource} not found with the given input data {field} : '{value}'")]
    ResourceNotFound {
        resource: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Generated account number {0} is already in use")]
    AccountNumberCollision(i64),

    #[error("Storage failure: {0}")]
    Store(#[from] StoreError),
}

/// The four response classes of the error translation layer, plus the
/// structured 400 used for unparseable input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Validation,
    AlreadyExists,
    MalformedRequest,
    NotFound,
    Unclassified,
}

impl FailureKind {
    pub fn label(&self) -> &'static str {
        match self {
            FailureKind::Validation => "validation",
            FailureKind::AlreadyExists => "already_exists",
            FailureKind::MalformedRequest => "malformed_request",
            FailureKind::NotFound => "not_found",
            FailureKind::Unclassified => "unclassified",
        }
    }
}

impl AccountsError {
    pub fn not_found(resource: &'static str, field: &'static str, value: impl ToString) -> Self {
        AccountsError::ResourceNotFound {
            resource,
            field,
            value: value.to_string(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            AccountsError::Validation(_) => FailureKind::Validation,
            AccountsError::CustomerAlreadyExists(_) => FailureKind::AlreadyExists,
            AccountsError::MalformedRequest(_) => FailureKind::MalformedRequest,
            AccountsError::ResourceNotFound { .. } => FailureKind::NotFound,
            AccountsError::AccountNumberCollision(_) | AccountsError::Store(_) => FailureKind::Unclassified,
        }
    }
}
