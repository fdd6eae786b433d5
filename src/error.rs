use thiserror::Error;

/// Failures from the remote catalog.
///
/// The display strings are what ends up in the shared error slot.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Any non-success HTTP status on a detail request
    #[error("Pokemon not found")]
    NotFound { key: String },

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed catalog response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TeamError {
    #[error("Invalid team position")]
    InvalidPosition(usize),
}
