//! Cart Lines Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, PgConnection, Postgres, QueryBuilder, Row, postgres::PgRow, query, query_as};

use crate::{
    database::contains_pattern,
    domain::{
        carts::{
            data::{LineFilter, NewCartLine},
            records::{CartLineRecord, CartUuid},
        },
        products::records::ProductUuid,
    },
};

const FIND_LINE_FOR_UPDATE_SQL: &str = include_str!("../sql/find_line_for_update.sql");
const FIND_LINES_SQL: &str = include_str!("../sql/find_lines.sql");
const INSERT_LINE_SQL: &str = include_str!("../sql/insert_line.sql");
const UPDATE_LINE_QUANTITY_SQL: &str = include_str!("../sql/update_line_quantity.sql");
const DELETE_LINES_BY_PRODUCT_SQL: &str = include_str!("../sql/delete_lines_by_product.sql");
const DELETE_LINE_SQL: &str = include_str!("../sql/delete_line.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartLinesRepository;

impl PgCartLinesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Read the line for (`cart`, `product`) and hold its row lock until the
    /// surrounding transaction ends.
    pub(crate) async fn find_line_for_update(
        &self,
        conn: &mut PgConnection,
        cart: CartUuid,
        product: ProductUuid,
    ) -> Result<Option<CartLineRecord>, sqlx::Error> {
        query_as::<Postgres, CartLineRecord>(FIND_LINE_FOR_UPDATE_SQL)
            .bind(cart.into_uuid())
            .bind(product.into_uuid())
            .fetch_optional(&mut *conn)
            .await
    }

    /// Lines of `cart` matching `filter`, oldest first.
    pub(crate) async fn find_lines(
        &self,
        conn: &mut PgConnection,
        cart: CartUuid,
        filter: LineFilter<'_>,
    ) -> Result<Vec<CartLineRecord>, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(FIND_LINES_SQL);

        if filter.product_name.is_some() {
            builder.push(" JOIN products ON products.id = cart_products.product_id");
        }

        builder
            .push(" WHERE cart_products.cart_id = ")
            .push_bind(cart.into_uuid());

        if let Some(name) = filter.product_name {
            builder
                .push(" AND products.name ILIKE ")
                .push_bind(contains_pattern(name));
        }

        if let Some(quantity) = filter.quantity {
            builder
                .push(" AND cart_products.quantity = ")
                .push_bind(to_db_quantity(quantity)?);
        }

        builder.push(" ORDER BY cart_products.created_at, cart_products.product_id");

        builder
            .build_query_as::<CartLineRecord>()
            .fetch_all(&mut *conn)
            .await
    }

    /// Insert a line, adding to the existing quantity when the cart already
    /// holds the product.
    pub(crate) async fn insert_line(
        &self,
        conn: &mut PgConnection,
        line: NewCartLine,
    ) -> Result<CartLineRecord, sqlx::Error> {
        query_as::<Postgres, CartLineRecord>(INSERT_LINE_SQL)
            .bind(line.cart_uuid.into_uuid())
            .bind(line.product_uuid.into_uuid())
            .bind(to_db_quantity(line.quantity)?)
            .fetch_one(&mut *conn)
            .await
    }

    pub(crate) async fn update_line_quantity(
        &self,
        conn: &mut PgConnection,
        cart: CartUuid,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<CartLineRecord, sqlx::Error> {
        query_as::<Postgres, CartLineRecord>(UPDATE_LINE_QUANTITY_SQL)
            .bind(cart.into_uuid())
            .bind(product.into_uuid())
            .bind(to_db_quantity(quantity)?)
            .fetch_one(&mut *conn)
            .await
    }

    pub(crate) async fn delete_lines_by_product(
        &self,
        conn: &mut PgConnection,
        product: ProductUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_LINES_BY_PRODUCT_SQL)
            .bind(product.into_uuid())
            .execute(&mut *conn)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn delete_line(
        &self,
        conn: &mut PgConnection,
        cart: CartUuid,
        product: ProductUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_LINE_SQL)
            .bind(cart.into_uuid())
            .bind(product.into_uuid())
            .execute(&mut *conn)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for CartLineRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let quantity: i32 = row.try_get("quantity")?;

        Ok(Self {
            cart_uuid: CartUuid::from_uuid(row.try_get("cart_id")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_id")?),
            quantity: u32::try_from(quantity).map_err(|e| sqlx::Error::ColumnDecode {
                index: "quantity".to_string(),
                source: Box::new(e),
            })?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

fn to_db_quantity(quantity: u32) -> Result<i32, sqlx::Error> {
    i32::try_from(quantity).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}
