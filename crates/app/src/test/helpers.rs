//! Test Helpers

use crate::{
    domain::{
        carts::{
            CartsService, CartsServiceError,
            data::{CartCriteria, NewCartProduct},
            view::CartView,
        },
        products::{
            ProductsService, ProductsServiceError,
            data::NewProduct,
            records::{ProductRecord, ProductUuid},
        },
    },
    test::TestContext,
};

/// A non-discounted product with a fresh uuid.
pub(crate) fn new_product(name: &str, price: u64) -> NewProduct {
    NewProduct {
        uuid: ProductUuid::new(),
        name: name.to_string(),
        price,
        description: format!("{name} description"),
        is_discount: false,
        discount_value: None,
        start_date_discount: None,
        end_date_discount: None,
    }
}

pub(crate) async fn create_product(
    ctx: &TestContext,
    name: &str,
    price: u64,
) -> Result<ProductRecord, ProductsServiceError> {
    ctx.products.create_product(new_product(name, price)).await
}

pub(crate) async fn add_product(
    ctx: &TestContext,
    full_name: &str,
    product: ProductUuid,
    quantity: u32,
) -> Result<CartView, CartsServiceError> {
    ctx.carts
        .add_product(NewCartProduct {
            full_name: full_name.to_string(),
            product_uuid: product,
            quantity,
        })
        .await
}

pub(crate) async fn find_cart(
    ctx: &TestContext,
    full_name: &str,
    product_name: Option<&str>,
    quantity: Option<u32>,
) -> Result<Option<CartView>, CartsServiceError> {
    ctx.carts
        .find_cart(CartCriteria {
            full_name: full_name.to_string(),
            product_name: product_name.map(str::to_string),
            quantity,
        })
        .await
}

/// (product name, quantity) pairs of a cart, in line order.
pub(crate) fn quantities(cart: &CartView) -> Vec<(&str, u32)> {
    cart.products
        .iter()
        .map(|line| (line.product.name.as_str(), line.quantity))
        .collect()
}
