use thiserror::Error;

use crate::domain::basket::BasketId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("basket `{}` has no items after normalization", id.0)]
    EmptyBasket { id: BasketId },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("basket `{}` not found", .0.as_str())]
    NotFound(BasketId),
    #[error("basket `{}` belongs to another user", .0.as_str())]
    Forbidden(BasketId),
}

impl ApplicationError {
    /// Stable machine-readable class used in CLI payloads.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(_) => "domain_validation",
            Self::Persistence(_) => "history_load",
            Self::NotFound(_) => "not_found",
            Self::Forbidden(_) => "forbidden",
        }
    }
}
