//! Products Repository

use jiff_sqlx::{Date as SqlxDate, Timestamp as SqlxTimestamp};
use sqlx::{FromRow, PgConnection, Postgres, QueryBuilder, Row, postgres::PgRow, query_as};
use uuid::Uuid;

use crate::{
    database::contains_pattern,
    domain::products::{
        data::{NewProduct, ProductCriteria, ProductSortKey},
        records::{ProductRecord, ProductUuid},
    },
};

const LIST_PRODUCTS_SQL: &str = include_str!("sql/list_products.sql");
const COUNT_PRODUCTS_SQL: &str = include_str!("sql/count_products.sql");
const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");
const GET_PRODUCTS_SQL: &str = include_str!("sql/get_products.sql");
const FIND_PRODUCT_BY_NAME_SQL: &str = include_str!("sql/find_product_by_name.sql");
const CREATE_PRODUCT_SQL: &str = include_str!("sql/create_product.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgProductsRepository;

impl PgProductsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_products(
        &self,
        conn: &mut PgConnection,
        criteria: &ProductCriteria,
    ) -> Result<Vec<ProductRecord>, sqlx::Error> {
        let offset = to_db_amount(criteria.pagination.offset(), "offset")?;

        let mut builder = QueryBuilder::<Postgres>::new(LIST_PRODUCTS_SQL);

        if let Some(search) = criteria.search() {
            builder
                .push(" WHERE name ILIKE ")
                .push_bind(contains_pattern(search));
        }

        builder
            .push(" ORDER BY ")
            .push(criteria.sort_by.as_str())
            .push(" ")
            .push(criteria.order_by.as_sql());

        if criteria.sort_by != ProductSortKey::Id {
            builder.push(", id");
        }

        builder
            .push(" LIMIT ")
            .push_bind(i64::from(criteria.pagination.limit()))
            .push(" OFFSET ")
            .push_bind(offset);

        builder
            .build_query_as::<ProductRecord>()
            .fetch_all(&mut *conn)
            .await
    }

    pub(crate) async fn count_products(
        &self,
        conn: &mut PgConnection,
        criteria: &ProductCriteria,
    ) -> Result<u64, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(COUNT_PRODUCTS_SQL);

        if let Some(search) = criteria.search() {
            builder
                .push(" WHERE name ILIKE ")
                .push_bind(contains_pattern(search));
        }

        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&mut *conn)
            .await?;

        to_amount(count, "count")
    }

    pub(crate) async fn get_product(
        &self,
        conn: &mut PgConnection,
        product: ProductUuid,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(GET_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_one(&mut *conn)
            .await
    }

    pub(crate) async fn find_product(
        &self,
        conn: &mut PgConnection,
        product: ProductUuid,
    ) -> Result<Option<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(GET_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_optional(&mut *conn)
            .await
    }

    /// Load every product in `products`; unknown ids are simply absent from
    /// the result.
    pub(crate) async fn get_products(
        &self,
        conn: &mut PgConnection,
        products: &[ProductUuid],
    ) -> Result<Vec<ProductRecord>, sqlx::Error> {
        if products.is_empty() {
            return Ok(Vec::new());
        }

        let uuids: Vec<Uuid> = products.iter().copied().map(ProductUuid::into_uuid).collect();

        query_as::<Postgres, ProductRecord>(GET_PRODUCTS_SQL)
            .bind(uuids)
            .fetch_all(&mut *conn)
            .await
    }

    pub(crate) async fn find_product_by_name(
        &self,
        conn: &mut PgConnection,
        name: &str,
    ) -> Result<Option<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(FIND_PRODUCT_BY_NAME_SQL)
            .bind(name)
            .fetch_optional(&mut *conn)
            .await
    }

    pub(crate) async fn create_product(
        &self,
        conn: &mut PgConnection,
        product: NewProduct,
    ) -> Result<ProductRecord, sqlx::Error> {
        let price = to_db_amount(product.price, "price")?;
        let discount_value = product
            .discount_value
            .map(|value| to_db_amount(value, "discount_value"))
            .transpose()?;

        query_as::<Postgres, ProductRecord>(CREATE_PRODUCT_SQL)
            .bind(product.uuid.into_uuid())
            .bind(product.name)
            .bind(price)
            .bind(product.description)
            .bind(product.is_discount)
            .bind(discount_value)
            .bind(product.start_date_discount.map(SqlxDate::from))
            .bind(product.end_date_discount.map(SqlxDate::from))
            .fetch_one(&mut *conn)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for ProductRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let discount_value = row
            .try_get::<Option<i64>, _>("discount_value")?
            .map(|value| to_amount(value, "discount_value"))
            .transpose()?;

        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("id")?),
            name: row.try_get("name")?,
            price: to_amount(row.try_get("price")?, "price")?,
            description: row.try_get("description")?,
            is_discount: row.try_get("is_discount")?,
            discount_value,
            start_date_discount: row
                .try_get::<Option<SqlxDate>, _>("start_date_discount")?
                .map(SqlxDate::to_jiff),
            end_date_discount: row
                .try_get::<Option<SqlxDate>, _>("end_date_discount")?
                .map(SqlxDate::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

fn to_amount(value: i64, col: &str) -> Result<u64, sqlx::Error> {
    u64::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

fn to_db_amount(value: u64, col: &str) -> Result<i64, sqlx::Error> {
    i64::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_amounts_are_rejected() {
        assert!(to_amount(-1, "price").is_err());
        assert_eq!(to_amount(1_500, "price").ok(), Some(1_500));
    }

    #[test]
    fn oversized_amounts_are_rejected() {
        assert!(to_db_amount(u64::MAX, "price").is_err());
    }
}
