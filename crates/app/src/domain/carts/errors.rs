//! Carts service errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("product not found")]
    ProductNotFound,

    #[error("cart line not found")]
    LineNotFound,

    /// Any storage failure, constraint violations included. Cart writes are
    /// upserts behind argument checks, so a violation here is a server fault.
    #[error("storage error")]
    Sql(#[from] sqlx::Error),
}

/// Transport-independent classification of a [`CartsServiceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartsErrorKind {
    /// The caller supplied a value that can never succeed.
    InvalidArgument,

    /// A referenced product or line does not exist.
    NotFound,

    /// Storage failed; the caller cannot fix this.
    Storage,
}

impl CartsServiceError {
    #[must_use]
    pub fn kind(&self) -> CartsErrorKind {
        match self {
            Self::InvalidArgument(_) => CartsErrorKind::InvalidArgument,
            Self::ProductNotFound | Self::LineNotFound => CartsErrorKind::NotFound,
            Self::Sql(_) => CartsErrorKind::Storage,
        }
    }
}
