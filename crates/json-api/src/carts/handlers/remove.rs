//! Remove Product From Cart Handler

use std::sync::Arc;

use salvo::{
    oapi::extract::{PathParam, QueryParam},
    prelude::*,
};
use uuid::Uuid;

use storefront_app::domain::products::records::ProductUuid;

use crate::{carts::errors::into_status_error, extensions::*, state::State};

/// Remove Product From Cart Handler
///
/// With `full_name`, removes the product from that owner's cart only.
/// Without it, removes the product from every cart that holds it.
#[endpoint(
    tags("carts"),
    summary = "Remove Product From Cart",
    responses(
        (status_code = StatusCode::OK, description = "Product removed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    product_id: PathParam<Uuid>,
    full_name: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let product = ProductUuid::from_uuid(product_id.into_inner());

    let removed = match full_name.into_inner() {
        Some(full_name) => state.carts().remove_cart_product(&full_name, product).await,
        None => state.carts().remove_product(product).await,
    };

    removed.map_err(|error| into_status_error(error, depot.request_id()))?;

    Ok(StatusCode::OK)
}
