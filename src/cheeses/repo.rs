use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::cheeses::query::ListingFilter;

/// Cheese listing record in the database. The description is stored in
/// normalized form; `is_published` and `created_at` are store-managed and
/// never client-writable.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CheeseListing {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub is_published: bool,
    pub created_at: OffsetDateTime,
}

const SELECT_COLUMNS: &str =
    "c.id, c.owner_id, c.title, c.description, c.price, c.is_published, c.created_at";

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ListingFilter) {
    if let Some(published) = filter.is_published {
        qb.push(" AND c.is_published = ").push_bind(published);
    }
    if let Some(title) = &filter.title {
        qb.push(" AND c.title ILIKE ")
            .push_bind(format!("%{}%", title));
    }
    if let Some(description) = &filter.description {
        qb.push(" AND c.description ILIKE ")
            .push_bind(format!("%{}%", description));
    }
    if let Some(email) = &filter.owner_email {
        qb.push(" AND u.email ILIKE ")
            .push_bind(format!("%{}%", email));
    }
    if let Some(price) = filter.price_gt {
        qb.push(" AND c.price > ").push_bind(price);
    }
    if let Some(price) = filter.price_gte {
        qb.push(" AND c.price >= ").push_bind(price);
    }
    if let Some(price) = filter.price_lt {
        qb.push(" AND c.price < ").push_bind(price);
    }
    if let Some(price) = filter.price_lte {
        qb.push(" AND c.price <= ").push_bind(price);
    }
}

impl CheeseListing {
    pub async fn page(
        db: &PgPool,
        filter: &ListingFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CheeseListing>, sqlx::Error> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {SELECT_COLUMNS} FROM cheese_listings c \
             JOIN users u ON u.id = c.owner_id WHERE TRUE"
        ));
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY c.created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        qb.build_query_as::<CheeseListing>().fetch_all(db).await
    }

    pub async fn count(db: &PgPool, filter: &ListingFilter) -> Result<i64, sqlx::Error> {
        let mut qb = QueryBuilder::new(
            "SELECT COUNT(*) FROM cheese_listings c \
             JOIN users u ON u.id = c.owner_id WHERE TRUE",
        );
        push_filter(&mut qb, filter);
        let row: (i64,) = qb.build_query_as().fetch_one(db).await?;
        Ok(row.0)
    }

    pub async fn find(db: &PgPool, id: Uuid) -> Result<Option<CheeseListing>, sqlx::Error> {
        sqlx::query_as::<_, CheeseListing>(&format!(
            "SELECT {SELECT_COLUMNS} FROM cheese_listings c WHERE c.id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn create(
        db: &PgPool,
        owner_id: Uuid,
        title: &str,
        description: &str,
        price: i64,
    ) -> Result<CheeseListing, sqlx::Error> {
        sqlx::query_as::<_, CheeseListing>(
            r#"
            INSERT INTO cheese_listings (owner_id, title, description, price)
            VALUES ($1, $2, $3, $4)
            RETURNING id, owner_id, title, description, price, is_published, created_at
            "#,
        )
        .bind(owner_id)
        .bind(title)
        .bind(description)
        .bind(price)
        .fetch_one(db)
        .await
    }

    /// Rewrite the writable columns only; `is_published` and `created_at`
    /// stay as the store set them.
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        owner_id: Uuid,
        title: &str,
        description: &str,
        price: i64,
    ) -> Result<CheeseListing, sqlx::Error> {
        sqlx::query_as::<_, CheeseListing>(
            r#"
            UPDATE cheese_listings
            SET owner_id = $2, title = $3, description = $4, price = $5
            WHERE id = $1
            RETURNING id, owner_id, title, description, price, is_published, created_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(title)
        .bind(description)
        .bind(price)
        .fetch_one(db)
        .await
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cheese_listings WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn titles_by_owner(db: &PgPool, owner_id: Uuid) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT title FROM cheese_listings WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(db)
        .await?;
        Ok(rows.into_iter().map(|(t,)| t).collect())
    }
}
