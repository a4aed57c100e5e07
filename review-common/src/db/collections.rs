//! Collection operations: wholesale replace, bulk read, count, grouping query
//!
//! Every write is a wholesale replace: delete-all followed by insert-many.
//! Both steps run in one transaction, so a failed insert leaves the previous
//! contents in place and readers never see a half-written collection.

use crate::db::schema::is_valid_identifier;
use crate::{AggregateRecord, CleanRecord, Dimension, Error, Field, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

fn checked(table: &str) -> Result<&str> {
    if is_valid_identifier(table) {
        Ok(table)
    } else {
        Err(Error::InvalidInput(format!("Invalid collection name: {:?}", table)))
    }
}

/// Number of documents in a collection
pub async fn count(pool: &SqlitePool, table: &str) -> Result<i64> {
    let table = checked(table)?;
    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Replace the raw collection with one JSON document per item
///
/// Returns the number of documents inserted.
pub async fn replace_raw<T: Serialize>(pool: &SqlitePool, table: &str, documents: &[T]) -> Result<u64> {
    let table = checked(table)?;

    // Encode everything before touching the collection
    let encoded = documents
        .iter()
        .map(serde_json::to_string)
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut tx = pool.begin().await?;
    sqlx::query(&format!("DELETE FROM {}", table))
        .execute(&mut *tx)
        .await?;

    let insert = format!("INSERT INTO {} (document) VALUES (?)", table);
    for document in &encoded {
        sqlx::query(&insert).bind(document).execute(&mut *tx).await?;
    }
    tx.commit().await?;

    Ok(encoded.len() as u64)
}

/// Read every raw document in insertion order
pub async fn find_all_raw(pool: &SqlitePool, table: &str) -> Result<Vec<Value>> {
    let table = checked(table)?;
    let rows: Vec<(String,)> =
        sqlx::query_as(&format!("SELECT document FROM {} ORDER BY seq ASC", table))
            .fetch_all(pool)
            .await?;

    rows.into_iter()
        .map(|(document,)| serde_json::from_str(&document).map_err(Error::from))
        .collect()
}

fn clean_column_list() -> String {
    Field::ALL
        .iter()
        .map(|f| f.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Replace the clean collection
pub async fn replace_clean(pool: &SqlitePool, table: &str, records: &[CleanRecord]) -> Result<u64> {
    let table = checked(table)?;
    let placeholders = vec!["?"; Field::ALL.len()].join(", ");
    let insert = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        clean_column_list(),
        placeholders
    );

    let mut tx = pool.begin().await?;
    sqlx::query(&format!("DELETE FROM {}", table))
        .execute(&mut *tx)
        .await?;

    // Bind order follows Field::ALL
    for r in records {
        sqlx::query(&insert)
            .bind(r.id)
            .bind(r.time_gmt)
            .bind(&r.phone)
            .bind(&r.organization)
            .bind(&r.olf)
            .bind(r.rating)
            .bind(r.number_review)
            .bind(&r.category)
            .bind(&r.country)
            .bind(&r.country_code)
            .bind(&r.state)
            .bind(&r.city)
            .bind(&r.street)
            .bind(&r.building)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    Ok(records.len() as u64)
}

fn clean_from_row(row: &SqliteRow) -> Result<CleanRecord> {
    Ok(CleanRecord {
        id: row.try_get("ID")?,
        time_gmt: row.try_get::<Option<NaiveDateTime>, _>("Time_GMT")?,
        phone: row.try_get("Phone")?,
        organization: row.try_get("Organization")?,
        olf: row.try_get("OLF")?,
        rating: row.try_get("Rating")?,
        number_review: row.try_get("NumberReview")?,
        category: row.try_get("Category")?,
        country: row.try_get("Country")?,
        country_code: row.try_get("CountryCode")?,
        state: row.try_get("State")?,
        city: row.try_get("City")?,
        street: row.try_get("Street")?,
        building: row.try_get("Building")?,
    })
}

/// Read every clean record in insertion order
pub async fn find_all_clean(pool: &SqlitePool, table: &str) -> Result<Vec<CleanRecord>> {
    let table = checked(table)?;
    let rows = sqlx::query(&format!(
        "SELECT {} FROM {} ORDER BY seq ASC",
        clean_column_list(),
        table
    ))
    .fetch_all(pool)
    .await?;

    rows.iter().map(clean_from_row).collect()
}

/// Replace an aggregate collection, keeping the given order as rank
pub async fn replace_aggregates(
    pool: &SqlitePool,
    table: &str,
    records: &[AggregateRecord],
) -> Result<u64> {
    let table = checked(table)?;
    let insert = format!(
        "INSERT INTO {} (rank, group_key, avg_rating, count) VALUES (?, ?, ?, ?)",
        table
    );

    let mut tx = pool.begin().await?;
    sqlx::query(&format!("DELETE FROM {}", table))
        .execute(&mut *tx)
        .await?;

    for (rank, record) in records.iter().enumerate() {
        sqlx::query(&insert)
            .bind(rank as i64)
            .bind(&record.key)
            .bind(record.avg_rating)
            .bind(record.count)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    Ok(records.len() as u64)
}

fn aggregate_from_row(row: &SqliteRow) -> Result<AggregateRecord> {
    Ok(AggregateRecord {
        key: row.try_get("group_key")?,
        avg_rating: row.try_get("avg_rating")?,
        count: row.try_get("count")?,
    })
}

/// Read an aggregate collection in stored (count-descending) order
pub async fn find_all_aggregates(pool: &SqlitePool, table: &str) -> Result<Vec<AggregateRecord>> {
    let table = checked(table)?;
    let rows = sqlx::query(&format!(
        "SELECT group_key, avg_rating, count FROM {} ORDER BY rank ASC",
        table
    ))
    .fetch_all(pool)
    .await?;

    rows.iter().map(aggregate_from_row).collect()
}

/// Read one page of an aggregate collection
pub async fn find_aggregates_page(
    pool: &SqlitePool,
    table: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<AggregateRecord>> {
    let table = checked(table)?;
    let rows = sqlx::query(&format!(
        "SELECT group_key, avg_rating, count FROM {} ORDER BY rank ASC LIMIT ? OFFSET ?",
        table
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    rows.iter().map(aggregate_from_row).collect()
}

/// Grouping query over the clean collection
///
/// Match: key is not null and not empty. Group: average Rating and record
/// count per key. Sort: count descending, key ascending on ties.
pub async fn group_stats(
    pool: &SqlitePool,
    clean_table: &str,
    dimension: Dimension,
) -> Result<Vec<AggregateRecord>> {
    let table = checked(clean_table)?;
    let column = dimension.field().name();
    let sql = format!(
        r#"
        SELECT {col} AS group_key, AVG(Rating) AS avg_rating, COUNT(*) AS count
        FROM {table}
        WHERE {col} IS NOT NULL AND {col} != ''
        GROUP BY {col}
        ORDER BY count DESC, group_key ASC
        "#,
        col = column,
        table = table
    );

    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    rows.iter().map(aggregate_from_row).collect()
}
