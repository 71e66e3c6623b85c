use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row};

use ozunlu_core::domain::product::ProductType;
use ozunlu_core::domain::quote::{iso_millis, QuoteId, QuoteRecord};

use super::{QuoteRepository, RepositoryError};
use crate::DbPool;

pub struct SqlQuoteRepository {
    pool: DbPool,
}

impl SqlQuoteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl QuoteRepository for SqlQuoteRepository {
    async fn insert(&self, record: QuoteRecord) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO quotes (
                id,
                type,
                brand,
                model,
                cargo_type,
                thickness,
                volume_m3,
                quantity,
                payment_method,
                company_name,
                contact_phone,
                email,
                contact_person,
                heard_from,
                created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id.0)
        .bind(record.product_type.as_str())
        .bind(record.brand.as_deref())
        .bind(record.model.as_deref())
        .bind(record.cargo_type.as_deref())
        .bind(record.thickness.as_deref())
        .bind(record.volume_m3.as_deref())
        .bind(&record.quantity)
        .bind(&record.payment_method)
        .bind(&record.company_name)
        .bind(&record.contact_phone)
        .bind(&record.email)
        .bind(&record.contact_person)
        .bind(record.heard_from.as_deref())
        .bind(iso_millis::format(&record.created_at))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(error)) if error.is_unique_violation() => {
                Err(RepositoryError::Duplicate(record.id))
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn list(&self) -> Result<Vec<QuoteRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT
                id,
                type,
                brand,
                model,
                cargo_type,
                thickness,
                volume_m3,
                quantity,
                payment_method,
                company_name,
                contact_phone,
                email,
                contact_person,
                heard_from,
                created_at
             FROM quotes
             ORDER BY seq ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(quote_from_row).collect()
    }

    async fn find_by_id(&self, id: QuoteId) -> Result<Option<QuoteRecord>, RepositoryError> {
        let row = sqlx::query(
            "SELECT
                id,
                type,
                brand,
                model,
                cargo_type,
                thickness,
                volume_m3,
                quantity,
                payment_method,
                company_name,
                contact_phone,
                email,
                contact_person,
                heard_from,
                created_at
             FROM quotes
             WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(quote_from_row).transpose()
    }

    async fn latest_id(&self) -> Result<Option<QuoteId>, RepositoryError> {
        let latest: Option<i64> =
            sqlx::query_scalar("SELECT MAX(id) FROM quotes").fetch_one(&self.pool).await?;
        Ok(latest.map(QuoteId))
    }
}

fn quote_from_row(row: SqliteRow) -> Result<QuoteRecord, RepositoryError> {
    let type_raw = row.try_get::<String, _>("type")?;
    let product_type = ProductType::from_str(&type_raw)
        .map_err(|_| RepositoryError::Decode(format!("unknown product type `{type_raw}`")))?;

    Ok(QuoteRecord {
        id: QuoteId(row.try_get("id")?),
        product_type,
        brand: row.try_get("brand")?,
        model: row.try_get("model")?,
        cargo_type: row.try_get("cargo_type")?,
        thickness: row.try_get("thickness")?,
        volume_m3: row.try_get("volume_m3")?,
        quantity: row.try_get("quantity")?,
        payment_method: row.try_get("payment_method")?,
        company_name: row.try_get("company_name")?,
        contact_phone: row.try_get("contact_phone")?,
        email: row.try_get("email")?,
        contact_person: row.try_get("contact_person")?,
        heard_from: row.try_get("heard_from")?,
        created_at: parse_timestamp("created_at", row.try_get("created_at")?)?,
    })
}

fn parse_timestamp(column: &str, value: String) -> Result<DateTime<Utc>, RepositoryError> {
    iso_millis::parse(&value).map_err(|error| {
        RepositoryError::Decode(format!("invalid timestamp in `{column}`: `{value}` ({error})"))
    })
}
