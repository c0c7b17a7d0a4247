//! Products Data

use std::str::FromStr;

use jiff::civil::Date;
use thiserror::Error;

use crate::domain::{
    pagination::{Pagination, SortOrder},
    products::records::ProductUuid,
};

/// New Product Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub name: String,
    pub price: u64,
    pub description: String,
    pub is_discount: bool,
    pub discount_value: Option<u64>,
    pub start_date_discount: Option<Date>,
    pub end_date_discount: Option<Date>,
}

/// Column a product listing can be ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductSortKey {
    #[default]
    Id,
    Name,
    Price,
    CreatedAt,
}

impl ProductSortKey {
    /// Column name, also used as the wire value.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Price => "price",
            Self::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown sort column \"{0}\"")]
pub struct UnknownSortKey(pub String);

impl FromStr for ProductSortKey {
    type Err = UnknownSortKey;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "id" => Ok(Self::Id),
            "name" => Ok(Self::Name),
            "price" => Ok(Self::Price),
            "created_at" => Ok(Self::CreatedAt),
            _ => Err(UnknownSortKey(value.to_string())),
        }
    }
}

/// Product listing criteria
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductCriteria {
    /// Case-insensitive substring of the product name
    pub search: Option<String>,
    pub sort_by: ProductSortKey,
    pub order_by: SortOrder,
    pub pagination: Pagination,
}

impl ProductCriteria {
    pub(crate) fn search(&self) -> Option<&str> {
        self.search.as_deref().filter(|search| !search.is_empty())
    }
}
