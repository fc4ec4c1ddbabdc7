//! Catalog service: item batches and items with deterministic codes
//!
//! The resolver is find-or-create: a box content line referencing a
//! (type, year, size, color) tuple maps to exactly one item, created on
//! first use. Item codes are unique; a collision during creation is
//! retried with an adjusted sequence inside a savepoint rather than
//! surfaced to the caller.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{Connection, PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Item, ItemBatch, ItemType};
use shared::codes;
use shared::levels::SizeStockLevels;
use shared::validation::{validate_name, validate_year_code};

/// Attempts before giving up on finding a free item code.
const MAX_CODE_ATTEMPTS: u32 = 100;

/// Catalog service for managing batches and items
#[derive(Clone)]
pub struct CatalogService {
    db: PgPool,
}

/// Input for explicitly creating a year batch
#[derive(Debug, Deserialize)]
pub struct CreateBatchInput {
    pub type_id: Uuid,
    pub year_code: String,
    pub batch_name: Option<String>,
    pub specifications: Option<String>,
    pub production_date: Option<NaiveDate>,
    pub status: Option<String>,
}

/// Batch with catalog context
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    #[serde(flatten)]
    pub batch: ItemBatch,
    pub type_name: Option<String>,
    pub item_count: i64,
}

/// Item with batch/type context
#[derive(Debug, Serialize)]
pub struct ItemResponse {
    #[serde(flatten)]
    pub item: Item,
    pub year_code: Option<String>,
    pub type_name: Option<String>,
    pub total_stock: i64,
}

/// Query parameters for listing batches
#[derive(Debug, Deserialize)]
pub struct BatchListQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub type_id: Option<Uuid>,
    pub year_code: Option<String>,
    pub status: Option<String>,
}

/// Query parameters for listing items
#[derive(Debug, Deserialize)]
pub struct ItemListQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub batch_id: Option<Uuid>,
    pub type_id: Option<Uuid>,
    pub year_code: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub include_stock: bool,
}

fn default_limit() -> i64 {
    100
}

/// Row for item type queries
#[derive(Debug, sqlx::FromRow)]
struct ItemTypeRow {
    type_id: Uuid,
    category_id: Uuid,
    type_name: String,
    description: Option<String>,
    has_size: bool,
    available_sizes: Option<serde_json::Value>,
    has_color: bool,
    available_colors: Option<serde_json::Value>,
    min_stock_level: Option<i32>,
    max_stock_level: Option<i32>,
    size_stock_levels: Option<serde_json::Value>,
    status: String,
    created_at: DateTime<Utc>,
}

impl ItemTypeRow {
    fn into_model(self) -> ItemType {
        ItemType {
            type_id: self.type_id,
            category_id: self.category_id,
            type_name: self.type_name,
            description: self.description,
            has_size: self.has_size,
            available_sizes: string_list(self.available_sizes),
            has_color: self.has_color,
            available_colors: string_list(self.available_colors),
            min_stock_level: self.min_stock_level,
            max_stock_level: self.max_stock_level,
            size_stock_levels: self
                .size_stock_levels
                .and_then(|v| serde_json::from_value::<SizeStockLevels>(v).ok()),
            status: self.status,
            created_at: self.created_at,
        }
    }
}

/// Parse a JSONB string array, degrading to empty on malformed data.
fn string_list(value: Option<serde_json::Value>) -> Vec<String> {
    value
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}

/// Row for batch queries
#[derive(Debug, sqlx::FromRow)]
struct BatchRow {
    batch_id: Uuid,
    type_id: Uuid,
    year_code: String,
    batch_name: Option<String>,
    specifications: Option<String>,
    production_date: Option<NaiveDate>,
    status: String,
    created_at: DateTime<Utc>,
    created_by: Option<String>,
}

impl BatchRow {
    fn into_model(self) -> ItemBatch {
        ItemBatch {
            batch_id: self.batch_id,
            type_id: self.type_id,
            year_code: self.year_code,
            batch_name: self.batch_name,
            specifications: self.specifications,
            production_date: self.production_date,
            status: self.status,
            created_at: self.created_at,
            created_by: self.created_by,
        }
    }
}

/// Row for item queries
#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    item_id: Uuid,
    batch_id: Uuid,
    item_code: String,
    item_name: String,
    size: Option<String>,
    color: Option<String>,
    unit_type: Option<String>,
    qr_code: Option<String>,
    barcode: Option<String>,
    unit_price: Option<Decimal>,
    status: String,
    created_at: DateTime<Utc>,
    created_by: Option<String>,
}

impl ItemRow {
    fn into_model(self) -> Item {
        Item {
            item_id: self.item_id,
            batch_id: self.batch_id,
            item_code: self.item_code,
            item_name: self.item_name,
            size: self.size,
            color: self.color,
            unit_type: self.unit_type,
            qr_code: self.qr_code,
            barcode: self.barcode,
            unit_price: self.unit_price,
            status: self.status,
            created_at: self.created_at,
            created_by: self.created_by,
        }
    }
}

const BATCH_COLUMNS: &str = "batch_id, type_id, year_code, batch_name, specifications, \
                             production_date, status, created_at, created_by";

const ITEM_COLUMNS: &str = "item_id, batch_id, item_code, item_name, size, color, unit_type, \
                            qr_code, barcode, unit_price, status, created_at, created_by";

// ============================================================================
// Transaction-aware resolvers (used inside the receiving flow)
// ============================================================================

/// Fetch an item type by id.
pub(crate) async fn get_item_type(
    conn: &mut PgConnection,
    type_id: Uuid,
) -> AppResult<ItemType> {
    let row = sqlx::query_as::<_, ItemTypeRow>(
        r#"
        SELECT type_id, category_id, type_name, description, has_size, available_sizes,
               has_color, available_colors, min_stock_level, max_stock_level,
               size_stock_levels, status, created_at
        FROM item_types
        WHERE type_id = $1
        "#,
    )
    .bind(type_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Item type {}", type_id)))?;

    Ok(row.into_model())
}

/// Find or create the batch for a (type, year) pair.
pub(crate) async fn resolve_batch(
    conn: &mut PgConnection,
    type_id: Uuid,
    year_code: &str,
    username: &str,
) -> AppResult<ItemBatch> {
    if let Some(row) = sqlx::query_as::<_, BatchRow>(&format!(
        "SELECT {} FROM item_batches WHERE type_id = $1 AND year_code = $2",
        BATCH_COLUMNS
    ))
    .bind(type_id)
    .bind(year_code)
    .fetch_optional(&mut *conn)
    .await?
    {
        return Ok(row.into_model());
    }

    let item_type = get_item_type(conn, type_id).await?;

    let row = sqlx::query_as::<_, BatchRow>(&format!(
        r#"
        INSERT INTO item_batches (type_id, year_code, batch_name, status, created_by)
        VALUES ($1, $2, $3, 'active', $4)
        RETURNING {}
        "#,
        BATCH_COLUMNS
    ))
    .bind(type_id)
    .bind(year_code)
    .bind(codes::batch_name(&item_type.type_name, year_code))
    .bind(username)
    .fetch_one(&mut *conn)
    .await?;

    Ok(row.into_model())
}

/// Find or create the item for a (batch, size, color) tuple.
///
/// Color is an exact optional discriminator: an entry without a color
/// never matches an item that has one, and vice versa.
pub(crate) async fn resolve_item(
    conn: &mut PgConnection,
    batch: &ItemBatch,
    size: &str,
    color: Option<&str>,
    username: &str,
) -> AppResult<Item> {
    if let Some(row) = sqlx::query_as::<_, ItemRow>(&format!(
        r#"
        SELECT {}
        FROM items
        WHERE batch_id = $1 AND size = $2 AND color IS NOT DISTINCT FROM $3
        "#,
        ITEM_COLUMNS
    ))
    .bind(batch.batch_id)
    .bind(size)
    .bind(color)
    .fetch_optional(&mut *conn)
    .await?
    {
        return Ok(row.into_model());
    }

    let item_type = get_item_type(conn, batch.type_id).await?;
    let type_code = codes::type_code(&item_type.type_name);

    let existing: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM items WHERE batch_id = $1 AND size = $2",
    )
    .bind(batch.batch_id)
    .bind(size)
    .fetch_one(&mut *conn)
    .await?;

    let item_name = codes::item_name(&item_type.type_name, &batch.year_code, size, color);
    let mut sequence = existing as u32 + 1;

    // The item_code unique index is the source of truth; a collision rolls
    // back only the savepoint and the insert is retried with the next
    // sequence number.
    for _ in 0..MAX_CODE_ATTEMPTS {
        let item_code = codes::item_code(&type_code, &batch.year_code, size, sequence);

        let mut savepoint = conn.begin().await?;
        let inserted = sqlx::query_as::<_, ItemRow>(&format!(
            r#"
            INSERT INTO items (batch_id, item_code, item_name, size, color, unit_type,
                               qr_code, status, created_by)
            VALUES ($1, $2, $3, $4, $5, 'pcs', $2, 'active', $6)
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(batch.batch_id)
        .bind(&item_code)
        .bind(&item_name)
        .bind(size)
        .bind(color)
        .bind(username)
        .fetch_one(&mut *savepoint)
        .await;

        match inserted {
            Ok(row) => {
                savepoint.commit().await?;
                return Ok(row.into_model());
            }
            Err(e) if is_unique_violation(&e) => {
                savepoint.rollback().await?;
                sequence += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::DuplicateEntry("item_code".to_string()))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

// ============================================================================
// Catalog service
// ============================================================================

impl CatalogService {
    /// Create a new CatalogService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a year batch and pre-generate one item per configured size.
    pub async fn create_batch(
        &self,
        username: &str,
        input: CreateBatchInput,
    ) -> AppResult<BatchResponse> {
        validate_year_code(&input.year_code)
            .map_err(|msg| AppError::validation("year_code", msg))?;

        let mut tx = self.db.begin().await?;

        let item_type = get_item_type(&mut tx, input.type_id).await?;

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM item_batches WHERE type_id = $1 AND year_code = $2)",
        )
        .bind(input.type_id)
        .bind(&input.year_code)
        .fetch_one(&mut *tx)
        .await?;

        if exists {
            return Err(AppError::Conflict {
                resource: "item_batches".to_string(),
                message: format!(
                    "Batch for {} with year code {} already exists",
                    item_type.type_name, input.year_code
                ),
            });
        }

        let sizes = item_type.effective_sizes();
        if sizes.is_empty() {
            return Err(AppError::validation(
                "available_sizes",
                format!("Item type {} has no sizes configured", item_type.type_name),
            ));
        }

        let batch_name = input
            .batch_name
            .unwrap_or_else(|| codes::batch_name(&item_type.type_name, &input.year_code));
        validate_name(&batch_name).map_err(|msg| AppError::validation("batch_name", msg))?;

        let batch = sqlx::query_as::<_, BatchRow>(&format!(
            r#"
            INSERT INTO item_batches (type_id, year_code, batch_name, specifications,
                                      production_date, status, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            BATCH_COLUMNS
        ))
        .bind(input.type_id)
        .bind(&input.year_code)
        .bind(&batch_name)
        .bind(&input.specifications)
        .bind(input.production_date)
        .bind(input.status.as_deref().unwrap_or("active"))
        .bind(username)
        .fetch_one(&mut *tx)
        .await?
        .into_model();

        let mut item_count = 0i64;
        for size in &sizes {
            resolve_item(&mut tx, &batch, size, None, username).await?;
            item_count += 1;
        }

        tx.commit().await?;

        Ok(BatchResponse {
            batch,
            type_name: Some(item_type.type_name),
            item_count,
        })
    }

    /// List batches with optional filtering
    pub async fn list_batches(&self, query: BatchListQuery) -> AppResult<Vec<BatchResponse>> {
        let rows = sqlx::query_as::<_, BatchDetailRow>(
            r#"
            SELECT b.batch_id, b.type_id, b.year_code, b.batch_name, b.specifications,
                   b.production_date, b.status, b.created_at, b.created_by,
                   t.type_name,
                   (SELECT COUNT(*) FROM items i WHERE i.batch_id = b.batch_id) AS item_count
            FROM item_batches b
            LEFT JOIN item_types t ON t.type_id = b.type_id
            WHERE ($1::uuid IS NULL OR b.type_id = $1)
              AND ($2::text IS NULL OR b.year_code = $2)
              AND ($3::text IS NULL OR b.status = $3)
            ORDER BY b.created_at DESC
            OFFSET $4 LIMIT $5
            "#,
        )
        .bind(query.type_id)
        .bind(&query.year_code)
        .bind(&query.status)
        .bind(query.skip.max(0))
        .bind(query.limit.clamp(1, 1000))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(BatchDetailRow::into_response).collect())
    }

    /// Get batch details
    pub async fn get_batch(&self, batch_id: Uuid) -> AppResult<BatchResponse> {
        let row = sqlx::query_as::<_, BatchDetailRow>(
            r#"
            SELECT b.batch_id, b.type_id, b.year_code, b.batch_name, b.specifications,
                   b.production_date, b.status, b.created_at, b.created_by,
                   t.type_name,
                   (SELECT COUNT(*) FROM items i WHERE i.batch_id = b.batch_id) AS item_count
            FROM item_batches b
            LEFT JOIN item_types t ON t.type_id = b.type_id
            WHERE b.batch_id = $1
            "#,
        )
        .bind(batch_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Batch".to_string()))?;

        Ok(row.into_response())
    }

    /// Get all items in a batch
    pub async fn get_batch_items(&self, batch_id: Uuid) -> AppResult<Vec<ItemResponse>> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM item_batches WHERE batch_id = $1)")
                .bind(batch_id)
                .fetch_one(&self.db)
                .await?;

        if !exists {
            return Err(AppError::NotFound("Batch".to_string()));
        }

        let rows = sqlx::query_as::<_, ItemDetailRow>(
            r#"
            SELECT i.item_id, i.batch_id, i.item_code, i.item_name, i.size, i.color,
                   i.unit_type, i.qr_code, i.barcode, i.unit_price, i.status,
                   i.created_at, i.created_by,
                   b.year_code, t.type_name, 0::bigint AS total_stock
            FROM items i
            JOIN item_batches b ON b.batch_id = i.batch_id
            LEFT JOIN item_types t ON t.type_id = b.type_id
            WHERE i.batch_id = $1
            ORDER BY i.size
            "#,
        )
        .bind(batch_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(ItemDetailRow::into_response).collect())
    }

    /// List items with optional filtering
    pub async fn list_items(&self, query: ItemListQuery) -> AppResult<Vec<ItemResponse>> {
        let rows = sqlx::query_as::<_, ItemDetailRow>(
            r#"
            SELECT i.item_id, i.batch_id, i.item_code, i.item_name, i.size, i.color,
                   i.unit_type, i.qr_code, i.barcode, i.unit_price, i.status,
                   i.created_at, i.created_by,
                   b.year_code, t.type_name,
                   CASE WHEN $6 THEN
                       COALESCE((SELECT SUM(inv.quantity) FROM inventory inv
                                 WHERE inv.item_id = i.item_id), 0)
                   ELSE 0 END AS total_stock
            FROM items i
            JOIN item_batches b ON b.batch_id = i.batch_id
            LEFT JOIN item_types t ON t.type_id = b.type_id
            WHERE ($1::uuid IS NULL OR i.batch_id = $1)
              AND ($2::uuid IS NULL OR b.type_id = $2)
              AND ($3::text IS NULL OR b.year_code = $3)
              AND ($4::text IS NULL OR i.status = $4)
              AND ($5::text IS NULL OR i.item_code ILIKE $5 OR i.item_name ILIKE $5)
            ORDER BY i.item_code ASC
            OFFSET $7 LIMIT $8
            "#,
        )
        .bind(query.batch_id)
        .bind(query.type_id)
        .bind(&query.year_code)
        .bind(&query.status)
        .bind(query.search.as_ref().map(|s| format!("%{}%", s)))
        .bind(query.include_stock)
        .bind(query.skip.max(0))
        .bind(query.limit.clamp(1, 1000))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(ItemDetailRow::into_response).collect())
    }

    /// Get a single item by id
    pub async fn get_item(&self, item_id: Uuid, include_stock: bool) -> AppResult<ItemResponse> {
        let row = sqlx::query_as::<_, ItemDetailRow>(
            r#"
            SELECT i.item_id, i.batch_id, i.item_code, i.item_name, i.size, i.color,
                   i.unit_type, i.qr_code, i.barcode, i.unit_price, i.status,
                   i.created_at, i.created_by,
                   b.year_code, t.type_name,
                   CASE WHEN $2 THEN
                       COALESCE((SELECT SUM(inv.quantity) FROM inventory inv
                                 WHERE inv.item_id = i.item_id), 0)
                   ELSE 0 END AS total_stock
            FROM items i
            JOIN item_batches b ON b.batch_id = i.batch_id
            LEFT JOIN item_types t ON t.type_id = b.type_id
            WHERE i.item_id = $1
            "#,
        )
        .bind(item_id)
        .bind(include_stock)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Item".to_string()))?;

        Ok(row.into_response())
    }
}

/// Row for batch listing with context
#[derive(Debug, sqlx::FromRow)]
struct BatchDetailRow {
    batch_id: Uuid,
    type_id: Uuid,
    year_code: String,
    batch_name: Option<String>,
    specifications: Option<String>,
    production_date: Option<NaiveDate>,
    status: String,
    created_at: DateTime<Utc>,
    created_by: Option<String>,
    type_name: Option<String>,
    item_count: i64,
}

impl BatchDetailRow {
    fn into_response(self) -> BatchResponse {
        BatchResponse {
            batch: ItemBatch {
                batch_id: self.batch_id,
                type_id: self.type_id,
                year_code: self.year_code,
                batch_name: self.batch_name,
                specifications: self.specifications,
                production_date: self.production_date,
                status: self.status,
                created_at: self.created_at,
                created_by: self.created_by,
            },
            type_name: self.type_name,
            item_count: self.item_count,
        }
    }
}

/// Row for item listing with context
#[derive(Debug, sqlx::FromRow)]
struct ItemDetailRow {
    item_id: Uuid,
    batch_id: Uuid,
    item_code: String,
    item_name: String,
    size: Option<String>,
    color: Option<String>,
    unit_type: Option<String>,
    qr_code: Option<String>,
    barcode: Option<String>,
    unit_price: Option<Decimal>,
    status: String,
    created_at: DateTime<Utc>,
    created_by: Option<String>,
    year_code: Option<String>,
    type_name: Option<String>,
    total_stock: i64,
}

impl ItemDetailRow {
    fn into_response(self) -> ItemResponse {
        ItemResponse {
            item: Item {
                item_id: self.item_id,
                batch_id: self.batch_id,
                item_code: self.item_code,
                item_name: self.item_name,
                size: self.size,
                color: self.color,
                unit_type: self.unit_type,
                qr_code: self.qr_code,
                barcode: self.barcode,
                unit_price: self.unit_price,
                status: self.status,
                created_at: self.created_at,
                created_by: self.created_by,
            },
            year_code: self.year_code,
            type_name: self.type_name,
            total_stock: self.total_stock,
        }
    }
}
