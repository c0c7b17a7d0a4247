//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};

use storefront_app::{
    context::AppContext,
    domain::{
        carts::MockCartsService,
        products::{
            MockProductsService,
            records::{ProductRecord, ProductUuid},
        },
    },
};

use crate::state::State;

pub(crate) fn make_product(uuid: ProductUuid) -> ProductRecord {
    ProductRecord {
        uuid,
        name: "Kopi Susu".to_string(),
        price: 15_000,
        description: "Iced milk coffee".to_string(),
        is_discount: false,
        discount_value: None,
        start_date_discount: None,
        end_date_discount: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

fn strict_carts_mock() -> MockCartsService {
    let mut carts = MockCartsService::new();

    carts.expect_add_product().never();
    carts.expect_find_cart().never();
    carts.expect_remove_product().never();
    carts.expect_remove_cart_product().never();

    carts
}

fn strict_products_mock() -> MockProductsService {
    let mut products = MockProductsService::new();

    products.expect_list_products().never();
    products.expect_get_product().never();
    products.expect_create_product().never();

    products
}

fn state(carts: MockCartsService, products: MockProductsService) -> Arc<State> {
    State::from_app_context(AppContext {
        carts: Arc::new(carts),
        products: Arc::new(products),
    })
}

pub(crate) fn carts_service(carts: MockCartsService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state(carts, strict_products_mock())))
            .push(route),
    )
}

pub(crate) fn products_service(products: MockProductsService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state(strict_carts_mock(), products)))
            .push(route),
    )
}
