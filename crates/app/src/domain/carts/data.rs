//! Cart Data

use crate::domain::{carts::records::CartUuid, products::records::ProductUuid};

/// New Cart Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCart {
    pub uuid: CartUuid,
    pub full_name: String,
}

/// New Cart Line Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartLine {
    pub cart_uuid: CartUuid,
    pub product_uuid: ProductUuid,
    pub quantity: u32,
}

/// A request to put `quantity` of a product into the cart owned by
/// `full_name`, creating the cart when the owner has none yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartProduct {
    pub full_name: String,
    pub product_uuid: ProductUuid,
    pub quantity: u32,
}

/// Cart lookup criteria
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartCriteria {
    /// Owner of the cart
    pub full_name: String,

    /// Case-insensitive substring of the product name
    pub product_name: Option<String>,

    /// Exact line quantity
    pub quantity: Option<u32>,
}

impl CartCriteria {
    pub(crate) fn line_filter(&self) -> LineFilter<'_> {
        LineFilter {
            product_name: self
                .product_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty()),
            quantity: self.quantity,
        }
    }
}

/// Filters applied when loading the lines of a cart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct LineFilter<'a> {
    pub product_name: Option<&'a str>,
    pub quantity: Option<u32>,
}
