//! Carts

pub mod data;
pub mod errors;
pub mod records;
mod repositories;
pub mod service;
pub mod view;

pub use errors::{CartsErrorKind, CartsServiceError};
pub use service::*;
