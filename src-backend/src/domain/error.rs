//! Error Taxonomy
//!
//! One error type shared by the store, the reconciler and the client controller.

use serde::{Deserialize, Serialize};

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Why a text-completion response could not be turned into a target list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum AiResponseError {
    #[error("completion returned no choices")]
    NoChoices,
    #[error("completion choice has no message content")]
    NoContent,
    #[error("completion content is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("completion content has no `products` array")]
    MissingProducts,
}

impl AiResponseError {
    pub fn code(&self) -> &'static str {
        match self {
            AiResponseError::NoChoices => "no_choices",
            AiResponseError::NoContent => "no_content",
            AiResponseError::InvalidJson(_) => "json_parse",
            AiResponseError::MissingProducts => "missing_products",
        }
    }
}

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum DomainError {
    /// Bad input; never reaches the network
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Not authenticated: {0}")]
    NotAuthenticated(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("AI response error: {0}")]
    AiResponse(#[from] AiResponseError),
    #[error("Network error{}: {message}", status_suffix(.status))]
    Network { status: Option<u16>, message: String },
    /// The atomic apply failed and nothing was changed
    #[error("Transaction failed: {0}")]
    Transaction(String),
    #[error("Operation cancelled")]
    Cancelled,
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {})", s)).unwrap_or_default()
}

impl DomainError {
    pub fn network(status: Option<u16>, message: impl Into<String>) -> Self {
        DomainError::Network {
            status,
            message: message.into(),
        }
    }

    /// Invalid or expired session, whether reported by the store or by HTTP status
    pub fn is_auth_failure(&self) -> bool {
        match self {
            DomainError::NotAuthenticated(_) => true,
            DomainError::Network { status: Some(status), .. } => *status == 401 || *status == 403,
            _ => false,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, DomainError::Validation(_))
    }

    /// Upstream status code, where one exists
    pub fn status(&self) -> Option<u16> {
        match self {
            DomainError::Network { status, .. } => *status,
            _ => None,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Validation(_) => "validation",
            DomainError::NotAuthenticated(_) => "not_authenticated",
            DomainError::NotFound(_) => "not_found",
            DomainError::Conflict(_) => "conflict",
            DomainError::AiResponse(inner) => inner.code(),
            DomainError::Network { .. } => "network",
            DomainError::Transaction(_) => "transaction",
            DomainError::Cancelled => "cancelled",
            DomainError::Unexpected(_) => "unexpected",
        }
    }
}
