//! App Router

use salvo::Router;

use crate::{carts, healthcheck, observability, products};

/// Every route the server answers, without middleware or docs.
pub(crate) fn app_router() -> Router {
    Router::new()
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(Router::with_path("metrics").get(observability::metrics_handler))
        .push(
            Router::with_path("carts")
                .get(carts::find::handler)
                .post(carts::add::handler)
                .push(Router::with_path("{product_id}").delete(carts::remove::handler)),
        )
        .push(
            Router::with_path("products")
                .get(products::index::handler)
                .post(products::create::handler)
                .push(Router::with_path("{product}").get(products::get::handler)),
        )
}
