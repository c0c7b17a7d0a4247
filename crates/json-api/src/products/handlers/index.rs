//! Product Index Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use storefront_app::domain::{
    pagination::{Pagination, SortOrder},
    products::{
        data::{ProductCriteria, ProductSortKey},
        records::ProductPage,
    },
};

use crate::{
    extensions::*,
    products::{errors::into_status_error, get::ProductResponse},
    state::State,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PagingResponse {
    /// Products matching the search, across all pages
    pub total_record: u64,

    /// Number of pages at the current limit
    pub total_page: u64,

    pub page: u32,

    pub limit: u32,

    pub sort_by: String,

    pub order_by: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ProductsResponse {
    /// The requested page of products
    pub products: Vec<ProductResponse>,

    pub paging: PagingResponse,
}

impl From<ProductPage> for ProductsResponse {
    fn from(page: ProductPage) -> Self {
        ProductsResponse {
            products: page.products.into_iter().map(Into::into).collect(),
            paging: PagingResponse {
                total_record: page.paging.total_record,
                total_page: page.paging.total_page,
                page: page.paging.page,
                limit: page.paging.limit,
                sort_by: page.sort_by.as_str().to_string(),
                order_by: page.order_by.as_str().to_string(),
            },
        }
    }
}

/// Product Index Handler
///
/// Returns one page of products, optionally filtered by a case-insensitive
/// name search.
#[endpoint(
    tags("products"),
    summary = "List Products",
    responses(
        (status_code = StatusCode::OK, description = "Products page"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    search: QueryParam<String, false>,
    page: QueryParam<u32, false>,
    limit: QueryParam<u32, false>,
    sort_by: QueryParam<String, false>,
    order_by: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<ProductsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let sort_by = sort_by
        .into_inner()
        .map(|value| value.parse::<ProductSortKey>())
        .transpose()
        .or_400("sort_by must be one of id, name, price, created_at")?
        .unwrap_or_default();

    let order_by = order_by
        .into_inner()
        .map(|value| value.parse::<SortOrder>())
        .transpose()
        .or_400("order_by must be asc or desc")?
        .unwrap_or_default();

    let criteria = ProductCriteria {
        search: search.into_inner(),
        sort_by,
        order_by,
        pagination: Pagination::new(page.into_inner(), limit.into_inner()),
    };

    let page = state
        .products()
        .list_products(criteria)
        .await
        .map_err(|error| into_status_error(error, depot.request_id()))?;

    Ok(Json(page.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use storefront_app::domain::{
        pagination::Paging,
        products::{
            MockProductsService, ProductsServiceError,
            records::{ProductRecord, ProductUuid},
        },
    };

    use crate::test_helpers::{make_product, products_service};

    use super::*;

    fn make_service(repo: MockProductsService) -> Service {
        products_service(repo, Router::with_path("products").get(handler))
    }

    fn page_for(criteria: &ProductCriteria, products: Vec<ProductRecord>) -> ProductPage {
        let total = u64::try_from(products.len()).unwrap_or_default();

        ProductPage {
            products,
            paging: Paging::new(criteria.pagination, total),
            sort_by: criteria.sort_by,
            order_by: criteria.order_by,
        }
    }

    #[tokio::test]
    async fn test_index_uses_defaults() -> TestResult {
        let mut repo = MockProductsService::new();

        repo.expect_list_products()
            .once()
            .withf(|criteria| *criteria == ProductCriteria::default())
            .return_once(|criteria| Ok(page_for(&criteria, vec![])));

        repo.expect_get_product().never();
        repo.expect_create_product().never();

        let mut res = TestClient::get("http://example.com/products")
            .send(&make_service(repo))
            .await;

        let body: ProductsResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.products.is_empty());
        assert_eq!(body.paging.page, 1);
        assert_eq!(body.paging.limit, 10);
        assert_eq!(body.paging.sort_by, "id");
        assert_eq!(body.paging.order_by, "asc");

        Ok(())
    }

    #[tokio::test]
    async fn test_index_forwards_query() -> TestResult {
        let uuid = ProductUuid::new();
        let mut repo = MockProductsService::new();

        repo.expect_list_products()
            .once()
            .withf(|criteria| {
                *criteria
                    == ProductCriteria {
                        search: Some("kopi".to_string()),
                        sort_by: ProductSortKey::Price,
                        order_by: SortOrder::Desc,
                        pagination: Pagination::new(Some(2), Some(5)),
                    }
            })
            .return_once(move |criteria| Ok(page_for(&criteria, vec![make_product(uuid)])));

        repo.expect_get_product().never();
        repo.expect_create_product().never();

        let mut res = TestClient::get(
            "http://example.com/products?search=kopi&page=2&limit=5&sort_by=price&order_by=DESC",
        )
        .send(&make_service(repo))
        .await;

        let body: ProductsResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.products.len(), 1, "expected one product");
        assert_eq!(
            body.products.first().map(|product| product.id),
            Some(uuid.into_uuid())
        );
        assert_eq!(body.paging.page, 2);
        assert_eq!(body.paging.sort_by, "price");
        assert_eq!(body.paging.order_by, "desc");

        Ok(())
    }

    #[tokio::test]
    async fn test_index_unknown_sort_column_returns_400() -> TestResult {
        let res = TestClient::get("http://example.com/products?sort_by=password")
            .send(&make_service(MockProductsService::new()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_index_non_numeric_page_returns_400() -> TestResult {
        let res = TestClient::get("http://example.com/products?page=first")
            .send(&make_service(MockProductsService::new()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_index_storage_error_returns_500() -> TestResult {
        let mut repo = MockProductsService::new();

        repo.expect_list_products()
            .once()
            .return_once(|_| Err(ProductsServiceError::Sql(sqlx::Error::PoolTimedOut)));

        repo.expect_get_product().never();
        repo.expect_create_product().never();

        let res = TestClient::get("http://example.com/products")
            .send(&make_service(repo))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));

        Ok(())
    }
}
