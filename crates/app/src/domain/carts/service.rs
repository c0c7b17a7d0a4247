//! Carts service.

use async_trait::async_trait;
use mockall::automock;
use sqlx::PgConnection;
use tracing::{debug, error, info};

use crate::{
    database::Db,
    domain::{
        carts::{
            data::{CartCriteria, LineFilter, NewCart, NewCartLine, NewCartProduct},
            errors::CartsServiceError,
            records::{CartRecord, CartUuid},
            repositories::{PgCartLinesRepository, PgCartsRepository},
            view::CartView,
        },
        products::{PgProductsRepository, records::ProductUuid},
    },
};

/// Largest quantity a single cart line can hold.
const MAX_QUANTITY: u32 = i32::MAX.unsigned_abs();

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    carts_repository: PgCartsRepository,
    lines_repository: PgCartLinesRepository,
    products_repository: PgProductsRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            carts_repository: PgCartsRepository::new(),
            lines_repository: PgCartLinesRepository::new(),
            products_repository: PgProductsRepository::new(),
        }
    }

    /// Create-or-merge the line for `product` in the owner's cart. Every
    /// statement runs on `conn`, which callers pass as a transaction.
    async fn put_product(
        &self,
        conn: &mut PgConnection,
        full_name: &str,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<CartRecord, CartsServiceError> {
        if self
            .products_repository
            .find_product(conn, product)
            .await?
            .is_none()
        {
            return Err(CartsServiceError::ProductNotFound);
        }

        let line = |cart: &CartRecord| NewCartLine {
            cart_uuid: cart.uuid,
            product_uuid: product,
            quantity,
        };

        let Some(cart) = self
            .carts_repository
            .find_cart_by_full_name(conn, full_name)
            .await?
        else {
            let cart = self
                .carts_repository
                .create_cart(
                    conn,
                    NewCart {
                        uuid: CartUuid::new(),
                        full_name: full_name.to_string(),
                    },
                )
                .await?;

            info!(cart_uuid = %cart.uuid, "created cart");

            self.lines_repository.insert_line(conn, line(&cart)).await?;

            return Ok(cart);
        };

        match self
            .lines_repository
            .find_line_for_update(conn, cart.uuid, product)
            .await?
        {
            None => {
                self.lines_repository.insert_line(conn, line(&cart)).await?;
            }
            Some(existing) => {
                let merged = merged_quantity(existing.quantity, quantity)?;

                debug!(from = existing.quantity, to = merged, "merging cart line");

                self.lines_repository
                    .update_line_quantity(conn, cart.uuid, product, merged)
                    .await?;
            }
        }

        Ok(cart)
    }

    /// Load the lines of `cart` matching `filter` and resolve their products.
    async fn load_view(
        &self,
        conn: &mut PgConnection,
        cart: CartRecord,
        filter: LineFilter<'_>,
    ) -> Result<CartView, CartsServiceError> {
        let lines = self
            .lines_repository
            .find_lines(conn, cart.uuid, filter)
            .await?;

        let uuids: Vec<ProductUuid> = lines.iter().map(|line| line.product_uuid).collect();

        let products = self
            .products_repository
            .get_products(conn, &uuids)
            .await?;

        CartView::assemble(cart, lines, products).map_err(|missing| {
            error!(product_uuid = %missing, "cart line references a missing product");

            CartsServiceError::Sql(sqlx::Error::RowNotFound)
        })
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    #[tracing::instrument(
        name = "carts.add_product",
        skip_all,
        fields(
            full_name = %product.full_name,
            product_uuid = %product.product_uuid,
            quantity = product.quantity
        ),
        err
    )]
    async fn add_product(&self, product: NewCartProduct) -> Result<CartView, CartsServiceError> {
        let full_name = require_full_name(&product.full_name)?;
        require_product(product.product_uuid)?;
        require_quantity(product.quantity)?;

        let mut tx = self.db.begin_transaction().await?;

        let cart = match self
            .put_product(&mut tx, full_name, product.product_uuid, product.quantity)
            .await
        {
            Ok(cart) => {
                tx.commit().await?;

                cart
            }
            Err(error) => {
                tx.rollback().await?;

                return Err(error);
            }
        };

        let mut conn = self.db.acquire().await?;

        self.load_view(&mut conn, cart, LineFilter::default()).await
    }

    #[tracing::instrument(
        name = "carts.find_cart",
        skip_all,
        fields(full_name = %criteria.full_name),
        err
    )]
    async fn find_cart(&self, criteria: CartCriteria) -> Result<Option<CartView>, CartsServiceError> {
        let full_name = require_full_name(&criteria.full_name)?;
        require_quantity_filter(criteria.quantity)?;

        let mut conn = self.db.acquire().await?;

        let Some(cart) = self
            .carts_repository
            .find_cart_by_full_name(&mut conn, full_name)
            .await?
        else {
            return Ok(None);
        };

        let view = self
            .load_view(&mut conn, cart, criteria.line_filter())
            .await?;

        Ok(Some(view))
    }

    #[tracing::instrument(
        name = "carts.remove_product",
        skip(self, product),
        fields(product_uuid = %product),
        err
    )]
    async fn remove_product(&self, product: ProductUuid) -> Result<(), CartsServiceError> {
        require_product(product)?;

        let mut conn = self.db.acquire().await?;

        let rows_affected = self
            .lines_repository
            .delete_lines_by_product(&mut conn, product)
            .await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::LineNotFound);
        }

        info!(rows_affected, "removed product from carts");

        Ok(())
    }

    #[tracing::instrument(
        name = "carts.remove_cart_product",
        skip(self, product),
        fields(product_uuid = %product),
        err
    )]
    async fn remove_cart_product(
        &self,
        full_name: &str,
        product: ProductUuid,
    ) -> Result<(), CartsServiceError> {
        let full_name = require_full_name(full_name)?;
        require_product(product)?;

        let mut conn = self.db.acquire().await?;

        let Some(cart) = self
            .carts_repository
            .find_cart_by_full_name(&mut conn, full_name)
            .await?
        else {
            return Err(CartsServiceError::LineNotFound);
        };

        let rows_affected = self
            .lines_repository
            .delete_line(&mut conn, cart.uuid, product)
            .await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::LineNotFound);
        }

        Ok(())
    }
}

fn require_full_name(full_name: &str) -> Result<&str, CartsServiceError> {
    let full_name = full_name.trim();

    if full_name.is_empty() {
        return Err(CartsServiceError::InvalidArgument("full_name must not be blank"));
    }

    Ok(full_name)
}

fn require_product(product: ProductUuid) -> Result<(), CartsServiceError> {
    if product.is_nil() {
        return Err(CartsServiceError::InvalidArgument("product_id must be set"));
    }

    Ok(())
}

fn require_quantity(quantity: u32) -> Result<(), CartsServiceError> {
    if quantity == 0 || quantity > MAX_QUANTITY {
        return Err(CartsServiceError::InvalidArgument(
            "quantity must be between 1 and 2147483647",
        ));
    }

    Ok(())
}

/// A filter of zero matches nothing, but one beyond the stored range cannot
/// be bound at all.
fn require_quantity_filter(quantity: Option<u32>) -> Result<(), CartsServiceError> {
    if quantity.is_some_and(|quantity| quantity > MAX_QUANTITY) {
        return Err(CartsServiceError::InvalidArgument(
            "quantity filter must be at most 2147483647",
        ));
    }

    Ok(())
}

fn merged_quantity(existing: u32, added: u32) -> Result<u32, CartsServiceError> {
    existing
        .checked_add(added)
        .filter(|quantity| *quantity <= MAX_QUANTITY)
        .ok_or(CartsServiceError::InvalidArgument(
            "quantity would exceed 2147483647",
        ))
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Add `quantity` of a product to the owner's cart, creating the cart on
    /// first use and merging into an existing line. Returns the whole cart.
    async fn add_product(&self, product: NewCartProduct) -> Result<CartView, CartsServiceError>;

    /// Find the cart owned by `criteria.full_name`, with its lines narrowed
    /// by the optional filters. `None` when the owner has no cart.
    async fn find_cart(&self, criteria: CartCriteria) -> Result<Option<CartView>, CartsServiceError>;

    /// Remove every cart line holding `product`.
    async fn remove_product(&self, product: ProductUuid) -> Result<(), CartsServiceError>;

    /// Remove `product` from the cart owned by `full_name` only.
    async fn remove_cart_product(
        &self,
        full_name: &str,
        product: ProductUuid,
    ) -> Result<(), CartsServiceError>;
}

#[cfg(test)]
mod tests {
    use sqlx::query_scalar;
    use testresult::TestResult;
    use tokio::task::JoinSet;

    use crate::{
        domain::carts::errors::CartsErrorKind,
        test::{
            TestContext,
            helpers::{add_product, create_product, find_cart, quantities},
        },
    };

    use super::*;

    async fn count_rows(ctx: &TestContext, table: &str) -> TestResult<i64> {
        let count = query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(ctx.pool())
            .await?;

        Ok(count)
    }

    #[test]
    fn merged_quantity_rejects_overflow() {
        assert_eq!(merged_quantity(1, 3).ok(), Some(4));
        assert!(merged_quantity(MAX_QUANTITY, 1).is_err());
        assert!(merged_quantity(u32::MAX, u32::MAX).is_err());
    }

    #[test]
    fn arguments_are_validated() {
        assert!(require_full_name(" \t").is_err());
        assert_eq!(require_full_name(" Rehan Dwi ").ok(), Some("Rehan Dwi"));
        assert!(require_product(ProductUuid::from_uuid(uuid::Uuid::nil())).is_err());
        assert!(require_quantity(0).is_err());
        assert!(require_quantity(MAX_QUANTITY + 1).is_err());
        assert!(require_quantity(MAX_QUANTITY).is_ok());
        assert!(require_quantity_filter(Some(0)).is_ok());
        assert!(require_quantity_filter(Some(MAX_QUANTITY)).is_ok());
        assert!(require_quantity_filter(Some(MAX_QUANTITY + 1)).is_err());
        assert!(require_quantity_filter(None).is_ok());
    }

    #[tokio::test]
    async fn add_product_for_new_owner_creates_cart_and_line() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, "Kopi Susu", 15_000).await?;

        let cart = add_product(&ctx, "Rehan Dwi", product.uuid, 2).await?;

        assert_eq!(cart.full_name, "Rehan Dwi");
        assert_eq!(cart.products.len(), 1);
        assert_eq!(cart.products[0].product, product);
        assert_eq!(cart.products[0].quantity, 2);
        assert_eq!(count_rows(&ctx, "carts").await?, 1);
        assert_eq!(count_rows(&ctx, "cart_products").await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn add_product_accumulates_quantity() -> TestResult {
        let ctx = TestContext::new().await;
        let coffee = create_product(&ctx, "Kopi Susu", 15_000).await?;
        let tea = create_product(&ctx, "Teh Manis", 5_000).await?;

        let first = add_product(&ctx, "Rehan Dwi", coffee.uuid, 1).await?;
        add_product(&ctx, "Rehan Dwi", tea.uuid, 1).await?;
        let cart = add_product(&ctx, "Rehan Dwi", coffee.uuid, 5).await?;

        assert_eq!(cart.uuid, first.uuid);
        assert_eq!(quantities(&cart), [("Kopi Susu", 6), ("Teh Manis", 1)]);

        Ok(())
    }

    #[tokio::test]
    async fn find_cart_without_cart_returns_none() -> TestResult {
        let ctx = TestContext::new().await;

        let cart = find_cart(&ctx, "Nobody", None, None).await?;

        assert!(cart.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn find_cart_filters_by_product_name_case_insensitively() -> TestResult {
        let ctx = TestContext::new().await;

        for (name, price) in [("Kopi Susu", 15_000), ("Es Kopi", 18_000), ("Teh Manis", 5_000)] {
            let product = create_product(&ctx, name, price).await?;
            add_product(&ctx, "Rehan Dwi", product.uuid, 1).await?;
        }

        let cart = find_cart(&ctx, "Rehan Dwi", Some("KOPI"), None)
            .await?
            .ok_or("cart should exist")?;

        assert_eq!(quantities(&cart), [("Kopi Susu", 1), ("Es Kopi", 1)]);

        let cart = find_cart(&ctx, "Rehan Dwi", Some("100%"), None)
            .await?
            .ok_or("cart should exist")?;

        assert!(cart.products.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn find_cart_filters_by_quantity() -> TestResult {
        let ctx = TestContext::new().await;
        let coffee = create_product(&ctx, "Kopi Susu", 15_000).await?;
        let tea = create_product(&ctx, "Teh Manis", 5_000).await?;

        add_product(&ctx, "Rehan Dwi", coffee.uuid, 2).await?;
        add_product(&ctx, "Rehan Dwi", tea.uuid, 3).await?;

        let cart = find_cart(&ctx, "Rehan Dwi", None, Some(3))
            .await?
            .ok_or("cart should exist")?;

        assert_eq!(quantities(&cart), [("Teh Manis", 3)]);

        Ok(())
    }

    #[tokio::test]
    async fn find_cart_rejects_quantity_filter_beyond_storage_range() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, "Kopi Susu", 15_000).await?;

        add_product(&ctx, "Rehan Dwi", product.uuid, 2).await?;

        let result = find_cart(&ctx, "Rehan Dwi", None, Some(3_000_000_000)).await;

        let Err(error) = result else {
            return Err(format!("expected InvalidArgument, got {result:?}").into());
        };

        assert!(matches!(error, CartsServiceError::InvalidArgument(_)));
        assert_eq!(error.kind(), CartsErrorKind::InvalidArgument);

        let cart = find_cart(&ctx, "Rehan Dwi", None, Some(MAX_QUANTITY))
            .await?
            .ok_or("cart should exist")?;

        assert!(cart.products.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn remove_unknown_product_returns_line_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, "Kopi Susu", 15_000).await?;

        add_product(&ctx, "Rehan Dwi", product.uuid, 2).await?;

        let result = ctx.carts.remove_product(ProductUuid::new()).await;

        assert!(
            matches!(result, Err(CartsServiceError::LineNotFound)),
            "expected LineNotFound, got {result:?}"
        );

        let cart = find_cart(&ctx, "Rehan Dwi", None, None)
            .await?
            .ok_or("cart should exist")?;

        assert_eq!(quantities(&cart), [("Kopi Susu", 2)]);

        Ok(())
    }

    #[tokio::test]
    async fn add_then_remove_scenario() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, "Kopi Susu", 15_000).await?;

        let cart = add_product(&ctx, "Rehan Dwi", product.uuid, 1).await?;
        assert_eq!(quantities(&cart), [("Kopi Susu", 1)]);

        let cart = add_product(&ctx, "Rehan Dwi", product.uuid, 3).await?;
        assert_eq!(quantities(&cart), [("Kopi Susu", 4)]);

        let found = find_cart(&ctx, "Rehan Dwi", None, None)
            .await?
            .ok_or("cart should exist")?;
        assert_eq!(found.uuid, cart.uuid);
        assert_eq!(quantities(&found), [("Kopi Susu", 4)]);

        ctx.carts.remove_product(product.uuid).await?;

        let found = find_cart(&ctx, "Rehan Dwi", None, None)
            .await?
            .ok_or("cart should exist")?;
        assert!(found.products.is_empty());

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_adds_converge_on_one_line() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, "Kopi Susu", 15_000).await?;

        let mut tasks = JoinSet::new();

        for _ in 0..8 {
            let carts = ctx.carts.clone();

            tasks.spawn(async move {
                carts
                    .add_product(NewCartProduct {
                        full_name: "Rehan Dwi".to_string(),
                        product_uuid: product.uuid,
                        quantity: 1,
                    })
                    .await
            });
        }

        while let Some(result) = tasks.join_next().await {
            result??;
        }

        let cart = find_cart(&ctx, "Rehan Dwi", None, None)
            .await?
            .ok_or("cart should exist")?;

        assert_eq!(quantities(&cart), [("Kopi Susu", 8)]);
        assert_eq!(count_rows(&ctx, "carts").await?, 1);
        assert_eq!(count_rows(&ctx, "cart_products").await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn invalid_arguments_are_rejected_before_storage() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, "Kopi Susu", 15_000).await?;

        for (full_name, product_uuid, quantity) in [
            ("  ", product.uuid, 1),
            ("Rehan Dwi", ProductUuid::from_uuid(uuid::Uuid::nil()), 1),
            ("Rehan Dwi", product.uuid, 0),
        ] {
            let result = add_product(&ctx, full_name, product_uuid, quantity).await;

            assert!(
                matches!(&result, Err(error) if error.kind() == CartsErrorKind::InvalidArgument),
                "expected InvalidArgument, got {result:?}"
            );
        }

        let result = find_cart(&ctx, "", None, None).await;

        assert!(
            matches!(result, Err(CartsServiceError::InvalidArgument(_))),
            "expected InvalidArgument, got {result:?}"
        );
        assert_eq!(count_rows(&ctx, "carts").await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn unknown_product_is_rolled_back() -> TestResult {
        let ctx = TestContext::new().await;

        let result = add_product(&ctx, "Rehan Dwi", ProductUuid::new(), 1).await;

        assert!(
            matches!(result, Err(CartsServiceError::ProductNotFound)),
            "expected ProductNotFound, got {result:?}"
        );
        assert_eq!(count_rows(&ctx, "carts").await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn failed_line_insert_rolls_back_new_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, "Kopi Susu", 15_000).await?;

        sqlx::query(
            "CREATE FUNCTION reject_cart_line() RETURNS trigger LANGUAGE plpgsql AS $$ \
             BEGIN RAISE EXCEPTION 'cart line rejected'; END $$",
        )
        .execute(ctx.pool())
        .await?;

        sqlx::query(
            "CREATE TRIGGER reject_cart_line BEFORE INSERT ON cart_products \
             FOR EACH ROW EXECUTE FUNCTION reject_cart_line()",
        )
        .execute(ctx.pool())
        .await?;

        let result = add_product(&ctx, "Rehan Dwi", product.uuid, 1).await;

        let Err(error) = result else {
            return Err(format!("expected a storage error, got {result:?}").into());
        };

        assert!(matches!(error, CartsServiceError::Sql(_)));
        assert_eq!(error.kind(), CartsErrorKind::Storage);
        assert_eq!(count_rows(&ctx, "carts").await?, 0);
        assert_eq!(count_rows(&ctx, "cart_products").await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn constraint_violations_are_storage_errors() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, "Kopi Susu", 15_000).await?;
        let cart = add_product(&ctx, "Rehan Dwi", product.uuid, 1).await?;

        let duplicate_owner = sqlx::query("INSERT INTO carts (id, full_name) VALUES ($1, $2)")
            .bind(CartUuid::new().into_uuid())
            .bind("Rehan Dwi")
            .execute(ctx.pool())
            .await;

        let empty_line = sqlx::query("UPDATE cart_products SET quantity = 0 WHERE cart_id = $1")
            .bind(cart.uuid.into_uuid())
            .execute(ctx.pool())
            .await;

        for result in [duplicate_owner, empty_line] {
            let error = CartsServiceError::from(result.err().ok_or("expected a violation")?);

            assert!(matches!(error, CartsServiceError::Sql(_)), "got {error:?}");
            assert_eq!(error.kind(), CartsErrorKind::Storage);
        }

        Ok(())
    }

    #[tokio::test]
    async fn merge_overflow_leaves_line_unchanged() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, "Kopi Susu", 15_000).await?;

        add_product(&ctx, "Rehan Dwi", product.uuid, MAX_QUANTITY).await?;

        let result = add_product(&ctx, "Rehan Dwi", product.uuid, 1).await;

        assert!(
            matches!(result, Err(CartsServiceError::InvalidArgument(_))),
            "expected InvalidArgument, got {result:?}"
        );

        let cart = find_cart(&ctx, "Rehan Dwi", None, None)
            .await?
            .ok_or("cart should exist")?;

        assert_eq!(quantities(&cart), [("Kopi Susu", MAX_QUANTITY)]);

        Ok(())
    }

    #[tokio::test]
    async fn remove_cart_product_only_touches_that_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, "Kopi Susu", 15_000).await?;

        add_product(&ctx, "Rehan Dwi", product.uuid, 1).await?;
        add_product(&ctx, "Sari Ayu", product.uuid, 2).await?;

        ctx.carts
            .remove_cart_product("Rehan Dwi", product.uuid)
            .await?;

        let rehan = find_cart(&ctx, "Rehan Dwi", None, None)
            .await?
            .ok_or("cart should exist")?;
        let sari = find_cart(&ctx, "Sari Ayu", None, None)
            .await?
            .ok_or("cart should exist")?;

        assert!(rehan.products.is_empty());
        assert_eq!(quantities(&sari), [("Kopi Susu", 2)]);

        let result = ctx
            .carts
            .remove_cart_product("Rehan Dwi", product.uuid)
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::LineNotFound)),
            "expected LineNotFound, got {result:?}"
        );

        let result = ctx.carts.remove_cart_product("Nobody", product.uuid).await;

        assert!(
            matches!(result, Err(CartsServiceError::LineNotFound)),
            "expected LineNotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn remove_product_clears_every_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, "Kopi Susu", 15_000).await?;

        add_product(&ctx, "Rehan Dwi", product.uuid, 1).await?;
        add_product(&ctx, "Sari Ayu", product.uuid, 2).await?;

        ctx.carts.remove_product(product.uuid).await?;

        assert_eq!(count_rows(&ctx, "cart_products").await?, 0);
        assert_eq!(count_rows(&ctx, "carts").await?, 2);

        Ok(())
    }
}
