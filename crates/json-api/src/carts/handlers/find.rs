//! Find Cart Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use storefront_app::domain::carts::data::CartCriteria;

use crate::{
    carts::{add::CartResponse, errors::into_status_error},
    extensions::*,
    state::State,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct FindCartResponse {
    /// `null` when the owner has no cart yet
    pub cart: Option<CartResponse>,
}

/// Find Cart Handler
///
/// Returns the owner's cart, optionally narrowed to lines whose product name
/// contains `product_name` or whose quantity equals `quantity`.
#[endpoint(
    tags("carts"),
    summary = "Find Cart",
    responses(
        (status_code = StatusCode::OK, description = "Cart lookup result"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    full_name: QueryParam<String, true>,
    product_name: QueryParam<String, false>,
    quantity: QueryParam<u32, false>,
    depot: &mut Depot,
) -> Result<Json<FindCartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let criteria = CartCriteria {
        full_name: full_name.into_inner(),
        product_name: product_name.into_inner(),
        quantity: quantity.into_inner(),
    };

    let cart = state
        .carts()
        .find_cart(criteria)
        .await
        .map_err(|error| into_status_error(error, depot.request_id()))?;

    Ok(Json(FindCartResponse {
        cart: cart.map(Into::into),
    }))
}
