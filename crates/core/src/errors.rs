use thiserror::Error;

use crate::domain::product::ProductId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("all fields are required: `{field}` is missing or empty")]
    MissingField { field: &'static str },
    #[error("product code `{code}` is already in use")]
    DuplicateCode { code: String },
    #[error("product with id {id} not found")]
    NotFound { id: ProductId },
    #[error("product id {id} appears more than once")]
    DuplicateId { id: ProductId },
    #[error("no product ids left after {last}")]
    IdsExhausted { last: ProductId },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl DomainError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::MissingField { .. } => "validation",
            Self::DuplicateCode { .. } => "duplicate_code",
            Self::NotFound { .. } => "not_found",
            Self::DuplicateId { .. } => "duplicate_id",
            Self::IdsExhausted { .. } => "ids_exhausted",
        }
    }
}

impl ApplicationError {
    /// Stable snake_case tag for machine-readable outcomes.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(error) => error.error_class(),
            Self::Persistence(_) => "persistence",
            Self::Configuration(_) => "config_validation",
        }
    }
}
