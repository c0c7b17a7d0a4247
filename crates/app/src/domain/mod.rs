//! Storefront Domain Concerns

pub mod carts;
pub mod pagination;
pub mod products;
