//! Get Product Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::products::records::ProductRecord;

use crate::{extensions::*, products::errors::into_status_error, state::State};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub(crate) struct ProductResponse {
    /// The unique identifier of the product
    pub id: Uuid,

    /// Display name, unique across the catalog
    pub name: String,

    /// The price of the product in minor currency units
    pub price: u64,

    pub description: String,

    /// Whether the discount fields apply
    pub is_discount: bool,

    /// Discount in minor currency units
    pub discount_value: Option<u64>,

    /// First day of the discount (`YYYY-MM-DD`)
    pub start_date_discount: Option<String>,

    /// Last day of the discount (`YYYY-MM-DD`)
    pub end_date_discount: Option<String>,

    /// The date and time the product was created
    pub created_at: String,

    /// The date and time the product was last updated
    pub updated_at: String,
}

impl From<ProductRecord> for ProductResponse {
    fn from(product: ProductRecord) -> Self {
        ProductResponse {
            id: product.uuid.into(),
            name: product.name,
            price: product.price,
            description: product.description,
            is_discount: product.is_discount,
            discount_value: product.discount_value,
            start_date_discount: product.start_date_discount.map(|date| date.to_string()),
            end_date_discount: product.end_date_discount.map(|date| date.to_string()),
            created_at: product.created_at.to_string(),
            updated_at: product.updated_at.to_string(),
        }
    }
}

/// Get Product Handler
///
/// Returns a product.
#[endpoint(
    tags("products"),
    summary = "Get Product",
    responses(
        (status_code = StatusCode::OK, description = "Product found"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let product = state
        .products()
        .get_product(product.into_inner().into())
        .await
        .map_err(|error| into_status_error(error, depot.request_id()))?;

    Ok(Json(product.into()))
}
