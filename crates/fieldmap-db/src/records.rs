//! Reads and writes against the raw equipment document table.
//!
//! The table name comes from configuration, so queries are built with
//! `format!`. [`CollectionName`] only admits plain identifiers and is always
//! spliced in double-quoted form, so reserved words work as table names;
//! every value is still bound as a parameter.

use fieldmap_core::{CollectionName, RawEquipmentRecord};
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::PgPool;

/// One stored document, with the JSONB column read back as text.
///
/// Postgres accepts numbers such as `1e400` that `serde_json` cannot
/// represent, so the document is parsed per row instead of by the driver.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EquipmentRecordRow {
    pub id: i64,
    pub document: String,
}

impl From<EquipmentRecordRow> for RawEquipmentRecord {
    /// A document that does not parse becomes an empty one, which the
    /// filter stage then drops for lack of coordinates.
    fn from(row: EquipmentRecordRow) -> Self {
        let id = row.id.to_string();
        match serde_json::from_str::<Value>(&row.document) {
            Ok(value) => RawEquipmentRecord::from_value(id, value),
            Err(e) => {
                tracing::debug!(record_id = %id, error = %e, "stored document does not parse; treating as empty");
                RawEquipmentRecord::new(id, Map::new())
            }
        }
    }
}

/// Create the collection table if it does not already exist.
///
/// The bundled migration only creates the default `cea_lea` table; a
/// deployment pointing `FIELDMAP_COLLECTION` elsewhere gets the same shape.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the DDL fails.
pub async fn ensure_collection(pool: &PgPool, collection: &CollectionName) -> Result<(), sqlx::Error> {
    let table = collection.quoted();
    let constraint = format!("\"{}_document_is_object\"", collection.as_str());
    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS {table} ( \
            id BIGSERIAL PRIMARY KEY, \
            document JSONB NOT NULL, \
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(), \
            CONSTRAINT {constraint} CHECK (jsonb_typeof(document) = 'object') \
         )"
    ))
    .execute(pool)
    .await?;
    Ok(())
}

/// Load every stored document in insertion order.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_raw_records(
    pool: &PgPool,
    collection: &CollectionName,
) -> Result<Vec<RawEquipmentRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, EquipmentRecordRow>(&format!(
        "SELECT id, document::text AS document FROM {} ORDER BY id",
        collection.quoted()
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(RawEquipmentRecord::from).collect())
}

/// Insert one raw document and return its generated id.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the insert fails, including when `document`
/// is not a JSON object.
pub async fn insert_record(
    pool: &PgPool,
    collection: &CollectionName,
    document: &Value,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(&format!(
        "INSERT INTO {} (document) VALUES ($1) RETURNING id",
        collection.quoted()
    ))
    .bind(Json(document))
    .fetch_one(pool)
    .await
}

/// Delete the document with the given id.
///
/// Returns `false` when no row matched. Ids that are not integers can never
/// match a stored row and also return `false`.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the delete fails.
pub async fn delete_record(
    pool: &PgPool,
    collection: &CollectionName,
    id: &str,
) -> Result<bool, sqlx::Error> {
    let Ok(id) = id.trim().parse::<i64>() else {
        return Ok(false);
    };

    let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", collection.quoted()))
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Number of stored documents.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn count_records(pool: &PgPool, collection: &CollectionName) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", collection.quoted()))
        .fetch_one(pool)
        .await
}
