//! Product Records

use jiff::{Timestamp, civil::Date};

use crate::{
    domain::{
        pagination::{Paging, SortOrder},
        products::data::ProductSortKey,
    },
    uuids::TypedUuid,
};

/// Product UUID
pub type ProductUuid = TypedUuid<ProductRecord>;

/// Product Record
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub name: String,
    /// Price in minor currency units
    pub price: u64,
    pub description: String,
    pub is_discount: bool,
    /// Discount in minor currency units
    pub discount_value: Option<u64>,
    pub start_date_discount: Option<Date>,
    pub end_date_discount: Option<Date>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One page of a product listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPage {
    pub products: Vec<ProductRecord>,
    pub paging: Paging,
    pub sort_by: ProductSortKey,
    pub order_by: SortOrder,
}
