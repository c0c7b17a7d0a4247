//! Products service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        pagination::Paging,
        products::{
            data::{NewProduct, ProductCriteria},
            errors::ProductsServiceError,
            records::{ProductPage, ProductRecord, ProductUuid},
            repository::PgProductsRepository,
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgProductsService {
    db: Db,
    repository: PgProductsRepository,
}

impl PgProductsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgProductsRepository::new(),
        }
    }
}

#[async_trait]
impl ProductsService for PgProductsService {
    async fn list_products(
        &self,
        criteria: ProductCriteria,
    ) -> Result<ProductPage, ProductsServiceError> {
        let mut conn = self.db.acquire().await?;

        let products = self
            .repository
            .list_products(&mut conn, &criteria)
            .await?;

        let total = self
            .repository
            .count_products(&mut conn, &criteria)
            .await?;

        Ok(ProductPage {
            products,
            paging: Paging::new(criteria.pagination, total),
            sort_by: criteria.sort_by,
            order_by: criteria.order_by,
        })
    }

    async fn get_product(&self, product: ProductUuid) -> Result<ProductRecord, ProductsServiceError> {
        let mut conn = self.db.acquire().await?;

        let product = self.repository.get_product(&mut conn, product).await?;

        Ok(product)
    }

    #[tracing::instrument(
        name = "products.create",
        skip_all,
        fields(product_uuid = %product.uuid, name = %product.name),
        err
    )]
    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let product = normalise_discount(product)?;

        let mut tx = self.db.begin_transaction().await?;

        if self
            .repository
            .find_product_by_name(&mut tx, &product.name)
            .await?
            .is_some()
        {
            return Err(ProductsServiceError::AlreadyExists);
        }

        let created = self.repository.create_product(&mut tx, product).await?;

        tx.commit().await?;

        info!(product_uuid = %created.uuid, "created product");

        Ok(created)
    }
}

/// Validate a new product and clear discount fields when no discount applies.
fn normalise_discount(mut product: NewProduct) -> Result<NewProduct, ProductsServiceError> {
    if product.name.trim().is_empty() {
        return Err(ProductsServiceError::MissingRequiredData);
    }

    if !product.is_discount {
        product.discount_value = None;
        product.start_date_discount = None;
        product.end_date_discount = None;

        return Ok(product);
    }

    match (
        product.discount_value,
        product.start_date_discount,
        product.end_date_discount,
    ) {
        (Some(_), Some(start), Some(end)) if start <= end => Ok(product),
        _ => Err(ProductsServiceError::InvalidData),
    }
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Retrieves one page of products matching the criteria.
    async fn list_products(
        &self,
        criteria: ProductCriteria,
    ) -> Result<ProductPage, ProductsServiceError>;

    /// Retrieve a single product.
    async fn get_product(&self, product: ProductUuid) -> Result<ProductRecord, ProductsServiceError>;

    /// Creates a new product. Product names are unique.
    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError>;
}
