//! Add Product To Cart Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::carts::{
    data::NewCartProduct,
    view::{CartView, CartViewLine},
};

use crate::{
    carts::errors::into_status_error, extensions::*, products::get::ProductResponse,
    state::State,
};

/// Product and quantity to put into the cart
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartProductRequest {
    pub product_id: Uuid,

    /// Added to the quantity already in the cart
    pub quantity: u32,
}

/// Add To Cart Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AddToCartRequest {
    /// Cart owner; the cart is created on first use
    pub full_name: String,

    pub product: CartProductRequest,
}

impl From<AddToCartRequest> for NewCartProduct {
    fn from(request: AddToCartRequest) -> Self {
        NewCartProduct {
            full_name: request.full_name,
            product_uuid: request.product.product_id.into(),
            quantity: request.product.quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartLineResponse {
    pub product: ProductResponse,
    pub quantity: u32,
}

impl From<CartViewLine> for CartLineResponse {
    fn from(line: CartViewLine) -> Self {
        CartLineResponse {
            product: line.product.into(),
            quantity: line.quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartResponse {
    /// The unique identifier of the cart
    pub id: Uuid,

    pub full_name: String,

    /// Cart lines, oldest first
    pub products: Vec<CartLineResponse>,
}

impl From<CartView> for CartResponse {
    fn from(cart: CartView) -> Self {
        CartResponse {
            id: cart.uuid.into(),
            full_name: cart.full_name,
            products: cart.products.into_iter().map(Into::into).collect(),
        }
    }
}

/// Add Product To Cart Handler
///
/// Adds a product to the owner's cart and returns the updated cart.
#[endpoint(
    tags("carts"),
    summary = "Add Product To Cart",
    responses(
        (status_code = StatusCode::OK, description = "Product added"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<AddToCartRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let cart = state
        .carts()
        .add_product(json.into_inner().into())
        .await
        .map_err(|error| into_status_error(error, depot.request_id()))?;

    Ok(Json(cart.into()))
}
