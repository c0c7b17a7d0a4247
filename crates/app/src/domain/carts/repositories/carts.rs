//! Carts Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, PgConnection, Postgres, Row, postgres::PgRow, query_as};

use crate::domain::carts::{
    data::NewCart,
    records::{CartRecord, CartUuid},
};

const FIND_CART_BY_FULL_NAME_SQL: &str = include_str!("../sql/find_cart_by_full_name.sql");
const CREATE_CART_SQL: &str = include_str!("../sql/create_cart.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartsRepository;

impl PgCartsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_cart_by_full_name(
        &self,
        conn: &mut PgConnection,
        full_name: &str,
    ) -> Result<Option<CartRecord>, sqlx::Error> {
        query_as::<Postgres, CartRecord>(FIND_CART_BY_FULL_NAME_SQL)
            .bind(full_name)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Insert a cart for `cart.full_name`, or return the cart that owner
    /// already has. A concurrent creator blocks until the winner commits and
    /// then receives the winner's row.
    pub(crate) async fn create_cart(
        &self,
        conn: &mut PgConnection,
        cart: NewCart,
    ) -> Result<CartRecord, sqlx::Error> {
        query_as::<Postgres, CartRecord>(CREATE_CART_SQL)
            .bind(cart.uuid.into_uuid())
            .bind(cart.full_name)
            .fetch_one(&mut *conn)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for CartRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CartUuid::from_uuid(row.try_get("id")?),
            full_name: row.try_get("full_name")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
