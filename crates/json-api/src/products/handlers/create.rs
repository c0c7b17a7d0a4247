//! Create Product Handler

use std::sync::Arc;

use jiff::civil::Date;
use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use storefront_app::domain::products::{data::NewProduct, records::ProductUuid};

use crate::{
    extensions::*,
    products::{errors::into_status_error, get::ProductResponse},
    state::State,
};

/// Create Product Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateProductRequest {
    pub name: String,

    /// Price in minor currency units
    pub price: u64,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub is_discount: bool,

    pub discount_value: Option<u64>,

    /// `YYYY-MM-DD`
    pub start_date_discount: Option<String>,

    /// `YYYY-MM-DD`
    pub end_date_discount: Option<String>,
}

impl CreateProductRequest {
    fn into_new_product(self) -> Result<NewProduct, StatusError> {
        let start_date_discount = parse_date(self.start_date_discount.as_deref())
            .or_400("start_date_discount must be a YYYY-MM-DD date")?;

        let end_date_discount = parse_date(self.end_date_discount.as_deref())
            .or_400("end_date_discount must be a YYYY-MM-DD date")?;

        Ok(NewProduct {
            uuid: ProductUuid::new(),
            name: self.name.trim().to_string(),
            price: self.price,
            description: self.description,
            is_discount: self.is_discount,
            discount_value: self.discount_value,
            start_date_discount,
            end_date_discount,
        })
    }
}

fn parse_date(value: Option<&str>) -> Result<Option<Date>, jiff::Error> {
    value.map(str::parse::<Date>).transpose()
}

/// Create Product Handler
#[endpoint(
    tags("products"),
    summary = "Create Product",
    responses(
        (status_code = StatusCode::CREATED, description = "Product created"),
        (status_code = StatusCode::CONFLICT, description = "Product already exists"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateProductRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let product = state
        .products()
        .create_product(json.into_inner().into_new_product()?)
        .await
        .map_err(|error| into_status_error(error, depot.request_id()))?;

    res.add_header(LOCATION, format!("/products/{}", product.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(product.into()))
}
