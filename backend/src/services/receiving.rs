//! Receiving service: box lifecycle from supplier delivery to store stock
//!
//! Boxes move forward only: pending_checkin -> checked_in -> stocked_out.
//! Receiving declares contents (auto-creating catalog entries as needed);
//! check-in materializes one NEW inventory row per content line so stock
//! stays traceable to the box that delivered it. Both operations are a
//! single database transaction.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{BoxContent, BoxStatus, StockBox, TransactionType};
use crate::services::{catalog, stock_levels};
use shared::codes;
use shared::validation::{validate_content_mode, validate_quantity, validate_year_code};

/// Receiving service for managing boxes and check-ins
#[derive(Clone)]
pub struct ReceivingService {
    db: PgPool,
}

/// One declared content line of an incoming box.
///
/// Exactly one input mode must be used: `type_id` + `year_code` + `size`
/// (+ optional `color`) to auto-create catalog entries, or a direct
/// `item_id`.
#[derive(Debug, Deserialize)]
pub struct BoxContentInput {
    pub item_id: Option<Uuid>,
    pub type_id: Option<Uuid>,
    pub year_code: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub quantity: i32,
}

/// Input for receiving a new box from a supplier
#[derive(Debug, Deserialize)]
pub struct ReceiveBoxInput {
    pub supplier: Option<String>,
    pub po_number: Option<String>,
    pub do_number: Option<String>,
    pub invoice_number: Option<String>,
    pub received_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub contents: Vec<BoxContentInput>,
}

/// Input for checking a box into a store
#[derive(Debug, Deserialize)]
pub struct CheckInInput {
    pub store_id: Uuid,
    pub location_in_store: Option<String>,
}

/// Query parameters for listing boxes
#[derive(Debug, Deserialize)]
pub struct BoxListQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub status: Option<String>,
    pub store_id: Option<Uuid>,
    pub search: Option<String>,
}

fn default_limit() -> i64 {
    100
}

/// Box content line with item context
#[derive(Debug, Serialize)]
pub struct BoxContentDetail {
    #[serde(flatten)]
    pub content: BoxContent,
    pub item_code: String,
    pub item_name: String,
    pub size: Option<String>,
}

/// Box with store context
#[derive(Debug, Serialize)]
pub struct BoxResponse {
    #[serde(flatten)]
    pub stock_box: StockBox,
    pub store_name: Option<String>,
    pub total_items: i64,
}

/// Box with store context and content lines
#[derive(Debug, Serialize)]
pub struct BoxWithContents {
    #[serde(flatten)]
    pub stock_box: StockBox,
    pub store_name: Option<String>,
    pub total_items: i64,
    pub contents: Vec<BoxContentDetail>,
}

/// Inventory row created from a box check-in
#[derive(Debug, Serialize)]
pub struct BoxInventoryEntry {
    pub inventory_id: Uuid,
    pub item_id: Uuid,
    pub item_code: Option<String>,
    pub item_name: Option<String>,
    pub size: Option<String>,
    pub store_id: Uuid,
    pub store_name: Option<String>,
    pub quantity: i32,
    pub available_quantity: i32,
    pub location_in_store: Option<String>,
    pub checked_in_at: DateTime<Utc>,
}

/// Row for box queries
#[derive(Debug, sqlx::FromRow)]
struct BoxRow {
    box_id: Uuid,
    box_code: String,
    qr_code: Option<String>,
    supplier: Option<String>,
    po_number: Option<String>,
    do_number: Option<String>,
    invoice_number: Option<String>,
    store_id: Option<Uuid>,
    location_in_store: Option<String>,
    status: String,
    received_date: Option<NaiveDate>,
    received_by: Option<String>,
    checked_in_at: Option<DateTime<Utc>>,
    checked_in_by: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl BoxRow {
    fn into_model(self) -> StockBox {
        StockBox {
            box_id: self.box_id,
            box_code: self.box_code,
            qr_code: self.qr_code,
            supplier: self.supplier,
            po_number: self.po_number,
            do_number: self.do_number,
            invoice_number: self.invoice_number,
            store_id: self.store_id,
            location_in_store: self.location_in_store,
            status: self.status,
            received_date: self.received_date,
            received_by: self.received_by,
            checked_in_at: self.checked_in_at,
            checked_in_by: self.checked_in_by,
            notes: self.notes,
            created_at: self.created_at,
        }
    }
}

/// Row for box content queries with item context
#[derive(Debug, sqlx::FromRow)]
struct ContentDetailRow {
    content_id: Uuid,
    box_id: Uuid,
    item_id: Uuid,
    quantity: i32,
    remaining: i32,
    created_at: DateTime<Utc>,
    item_code: String,
    item_name: String,
    size: Option<String>,
}

impl ContentDetailRow {
    fn into_detail(self) -> BoxContentDetail {
        BoxContentDetail {
            content: BoxContent {
                content_id: self.content_id,
                box_id: self.box_id,
                item_id: self.item_id,
                quantity: self.quantity,
                remaining: self.remaining,
                created_at: self.created_at,
            },
            item_code: self.item_code,
            item_name: self.item_name,
            size: self.size,
        }
    }
}

const BOX_COLUMNS: &str = "box_id, box_code, qr_code, supplier, po_number, do_number, \
                           invoice_number, store_id, location_in_store, status, received_date, \
                           received_by, checked_in_at, checked_in_by, notes, created_at";

/// Allocate the next per-year box sequence number.
///
/// The upsert takes a row lock on the year's counter, so concurrent
/// receivers serialize here instead of racing a read-max-then-increment.
async fn next_box_sequence(conn: &mut PgConnection, year: i32) -> AppResult<i32> {
    let sequence: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO box_sequences (year, last_value)
        VALUES ($1, 1)
        ON CONFLICT (year) DO UPDATE SET last_value = box_sequences.last_value + 1
        RETURNING last_value
        "#,
    )
    .bind(year)
    .fetch_one(&mut *conn)
    .await?;

    Ok(sequence)
}

impl ReceivingService {
    /// Create a new ReceivingService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Receive a new box from a supplier.
    ///
    /// Auto-creates batches and items for content lines declared by
    /// (type, year, size, color); the whole operation is atomic, so a
    /// failing content line leaves no box or content rows behind.
    pub async fn receive_box(
        &self,
        username: &str,
        input: ReceiveBoxInput,
    ) -> AppResult<BoxWithContents> {
        // Validate all content lines before touching the database
        for (index, content) in input.contents.iter().enumerate() {
            let field = format!("contents[{}]", index);
            validate_content_mode(content.type_id.is_some(), content.item_id.is_some())
                .map_err(|msg| AppError::validation(&field, msg))?;
            validate_quantity(content.quantity)
                .map_err(|msg| AppError::validation(&field, msg))?;

            if content.type_id.is_some() {
                let year_code = content
                    .year_code
                    .as_deref()
                    .ok_or_else(|| AppError::validation(&field, "year_code is required"))?;
                validate_year_code(year_code)
                    .map_err(|msg| AppError::validation(&field, msg))?;
                if content.size.as_deref().map_or(true, |s| s.trim().is_empty()) {
                    return Err(AppError::validation(&field, "size is required"));
                }
            }
        }

        let mut tx = self.db.begin().await?;

        let year = Utc::now().year();
        let sequence = next_box_sequence(&mut tx, year).await?;
        let box_code = codes::box_code(year, sequence as u32);

        let stock_box = sqlx::query_as::<_, BoxRow>(&format!(
            r#"
            INSERT INTO boxes (box_code, qr_code, supplier, po_number, do_number,
                               invoice_number, received_date, received_by, status, notes)
            VALUES ($1, $1, $2, $3, $4, $5, $6, $7, 'pending_checkin', $8)
            RETURNING {}
            "#,
            BOX_COLUMNS
        ))
        .bind(&box_code)
        .bind(&input.supplier)
        .bind(&input.po_number)
        .bind(&input.do_number)
        .bind(&input.invoice_number)
        .bind(input.received_date)
        .bind(username)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?
        .into_model();

        let mut contents = Vec::with_capacity(input.contents.len());
        let mut total_items = 0i64;

        for content in &input.contents {
            let item = match (content.type_id, content.item_id) {
                (Some(type_id), _) => {
                    let batch = catalog::resolve_batch(
                        &mut tx,
                        type_id,
                        content.year_code.as_deref().unwrap_or_default(),
                        username,
                    )
                    .await?;
                    catalog::resolve_item(
                        &mut tx,
                        &batch,
                        content.size.as_deref().unwrap_or_default(),
                        content.color.as_deref(),
                        username,
                    )
                    .await?
                }
                (None, Some(item_id)) => catalog_item(&mut tx, item_id).await?,
                (None, None) => {
                    return Err(AppError::validation(
                        "contents",
                        "Either type_id with year_code and size, or item_id must be provided",
                    ));
                }
            };

            let (content_id, created_at): (Uuid, DateTime<Utc>) = sqlx::query_as(
                r#"
                INSERT INTO box_contents (box_id, item_id, quantity, remaining)
                VALUES ($1, $2, $3, $3)
                RETURNING content_id, created_at
                "#,
            )
            .bind(stock_box.box_id)
            .bind(item.item_id)
            .bind(content.quantity)
            .fetch_one(&mut *tx)
            .await?;

            total_items += content.quantity as i64;
            contents.push(BoxContentDetail {
                content: BoxContent {
                    content_id,
                    box_id: stock_box.box_id,
                    item_id: item.item_id,
                    quantity: content.quantity,
                    remaining: content.quantity,
                    created_at,
                },
                item_code: item.item_code,
                item_name: item.item_name,
                size: item.size,
            });
        }

        tx.commit().await?;

        Ok(BoxWithContents {
            stock_box,
            store_name: None,
            total_items,
            contents,
        })
    }

    /// Check a box into a store.
    ///
    /// Every content line materializes a brand-new inventory row at the
    /// target store (never merged with an existing row for the same
    /// item/store) plus a `box_checkin` ledger entry referencing the box.
    pub async fn check_in_box(
        &self,
        box_id: Uuid,
        username: &str,
        input: CheckInInput,
    ) -> AppResult<BoxResponse> {
        let mut tx = self.db.begin().await?;

        let stock_box = sqlx::query_as::<_, BoxRow>(&format!(
            "SELECT {} FROM boxes WHERE box_id = $1",
            BOX_COLUMNS
        ))
        .bind(box_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Box".to_string()))?
        .into_model();

        if BoxStatus::from_str(&stock_box.status) != Some(BoxStatus::PendingCheckin) {
            return Err(AppError::InvalidStateTransition(format!(
                "Box is already {}, cannot check in",
                stock_box.status
            )));
        }

        let store_name: String =
            sqlx::query_scalar("SELECT store_name FROM stores WHERE store_id = $1")
                .bind(input.store_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound("Store".to_string()))?;

        let contents = sqlx::query_as::<_, (Uuid, i32)>(
            "SELECT item_id, quantity FROM box_contents WHERE box_id = $1",
        )
        .bind(box_id)
        .fetch_all(&mut *tx)
        .await?;

        let mut total_items = 0i64;
        for (item_id, quantity) in &contents {
            let (min_level, max_level) = stock_levels::levels_for_item(&mut tx, *item_id).await;

            sqlx::query(
                r#"
                INSERT INTO inventory (item_id, store_id, quantity, reserved_quantity,
                                       min_level, max_level, location_in_store)
                VALUES ($1, $2, $3, 0, $4, $5, $6)
                "#,
            )
            .bind(item_id)
            .bind(input.store_id)
            .bind(quantity)
            .bind(min_level)
            .bind(max_level)
            .bind(&input.location_in_store)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO stock_transactions (transaction_type, box_id, item_id, to_store_id,
                                                quantity, reference_number, reference_type,
                                                created_by)
                VALUES ($1, $2, $3, $4, $5, $6, 'BOX', $7)
                "#,
            )
            .bind(TransactionType::BoxCheckin.as_str())
            .bind(box_id)
            .bind(item_id)
            .bind(input.store_id)
            .bind(quantity)
            .bind(&stock_box.box_code)
            .bind(username)
            .execute(&mut *tx)
            .await?;

            total_items += *quantity as i64;
        }

        let updated = sqlx::query_as::<_, BoxRow>(&format!(
            r#"
            UPDATE boxes
            SET store_id = $2, location_in_store = $3, status = 'checked_in',
                checked_in_at = NOW(), checked_in_by = $4
            WHERE box_id = $1
            RETURNING {}
            "#,
            BOX_COLUMNS
        ))
        .bind(box_id)
        .bind(input.store_id)
        .bind(&input.location_in_store)
        .bind(username)
        .fetch_one(&mut *tx)
        .await?
        .into_model();

        tx.commit().await?;

        Ok(BoxResponse {
            stock_box: updated,
            store_name: Some(store_name),
            total_items,
        })
    }

    /// Get all boxes waiting to be checked in
    pub async fn get_pending_boxes(&self, skip: i64, limit: i64) -> AppResult<Vec<BoxWithContents>> {
        let rows = sqlx::query_as::<_, BoxRow>(&format!(
            r#"
            SELECT {}
            FROM boxes
            WHERE status = 'pending_checkin'
            ORDER BY received_date DESC NULLS LAST, created_at DESC
            OFFSET $1 LIMIT $2
            "#,
            BOX_COLUMNS
        ))
        .bind(skip.max(0))
        .bind(limit.clamp(1, 1000))
        .fetch_all(&self.db)
        .await?;

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let stock_box = row.into_model();
            let contents = self.box_contents(stock_box.box_id).await?;
            let total_items = contents.iter().map(|c| c.content.quantity as i64).sum();
            result.push(BoxWithContents {
                stock_box,
                store_name: None,
                total_items,
                contents,
            });
        }

        Ok(result)
    }

    /// List boxes with optional filtering
    pub async fn list_boxes(&self, query: BoxListQuery) -> AppResult<Vec<BoxResponse>> {
        let rows = sqlx::query_as::<_, BoxListRow>(
            r#"
            SELECT b.box_id, b.box_code, b.qr_code, b.supplier, b.po_number, b.do_number,
                   b.invoice_number, b.store_id, b.location_in_store, b.status,
                   b.received_date, b.received_by, b.checked_in_at, b.checked_in_by,
                   b.notes, b.created_at,
                   s.store_name,
                   COALESCE((SELECT SUM(c.quantity) FROM box_contents c
                             WHERE c.box_id = b.box_id), 0) AS total_items
            FROM boxes b
            LEFT JOIN stores s ON s.store_id = b.store_id
            WHERE ($1::text IS NULL OR b.status = $1)
              AND ($2::uuid IS NULL OR b.store_id = $2)
              AND ($3::text IS NULL OR b.box_code ILIKE $3 OR b.supplier ILIKE $3
                   OR b.po_number ILIKE $3)
            ORDER BY b.created_at DESC
            OFFSET $4 LIMIT $5
            "#,
        )
        .bind(&query.status)
        .bind(query.store_id)
        .bind(query.search.as_ref().map(|s| format!("%{}%", s)))
        .bind(query.skip.max(0))
        .bind(query.limit.clamp(1, 1000))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(BoxListRow::into_response).collect())
    }

    /// Get box details with contents
    pub async fn get_box(&self, box_id: Uuid) -> AppResult<BoxWithContents> {
        let stock_box = sqlx::query_as::<_, BoxRow>(&format!(
            "SELECT {} FROM boxes WHERE box_id = $1",
            BOX_COLUMNS
        ))
        .bind(box_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Box".to_string()))?
        .into_model();

        let store_name = match stock_box.store_id {
            Some(store_id) => {
                sqlx::query_scalar("SELECT store_name FROM stores WHERE store_id = $1")
                    .bind(store_id)
                    .fetch_optional(&self.db)
                    .await?
            }
            None => None,
        };

        let contents = self.box_contents(box_id).await?;
        let total_items = contents.iter().map(|c| c.content.quantity as i64).sum();

        Ok(BoxWithContents {
            stock_box,
            store_name,
            total_items,
            contents,
        })
    }

    /// Get the inventory rows created from this box's check-in
    pub async fn get_box_inventory(&self, box_id: Uuid) -> AppResult<Vec<BoxInventoryEntry>> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM boxes WHERE box_id = $1)")
            .bind(box_id)
            .fetch_one(&self.db)
            .await?;

        if !exists {
            return Err(AppError::NotFound("Box".to_string()));
        }

        let rows = sqlx::query_as::<_, BoxInventoryRow>(
            r#"
            SELECT DISTINCT ON (t.item_id, t.to_store_id)
                   inv.inventory_id, inv.item_id, i.item_code, i.item_name, i.size,
                   inv.store_id, s.store_name, inv.quantity, inv.available_quantity,
                   inv.location_in_store, t.created_at AS checked_in_at
            FROM stock_transactions t
            JOIN inventory inv ON inv.item_id = t.item_id AND inv.store_id = t.to_store_id
            LEFT JOIN items i ON i.item_id = inv.item_id
            LEFT JOIN stores s ON s.store_id = inv.store_id
            WHERE t.box_id = $1 AND t.transaction_type = 'box_checkin'
            ORDER BY t.item_id, t.to_store_id, inv.created_at
            "#,
        )
        .bind(box_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(BoxInventoryRow::into_entry).collect())
    }

    /// Content lines of a box with item context
    async fn box_contents(&self, box_id: Uuid) -> AppResult<Vec<BoxContentDetail>> {
        let rows = sqlx::query_as::<_, ContentDetailRow>(
            r#"
            SELECT c.content_id, c.box_id, c.item_id, c.quantity, c.remaining, c.created_at,
                   i.item_code, i.item_name, i.size
            FROM box_contents c
            JOIN items i ON i.item_id = c.item_id
            WHERE c.box_id = $1
            ORDER BY i.item_code
            "#,
        )
        .bind(box_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(ContentDetailRow::into_detail).collect())
    }
}

/// Fetch an item by id for the direct (legacy) content path.
async fn catalog_item(conn: &mut PgConnection, item_id: Uuid) -> AppResult<crate::models::Item> {
    let row = sqlx::query_as::<_, ItemLookupRow>(
        r#"
        SELECT item_id, batch_id, item_code, item_name, size, color, unit_type,
               qr_code, barcode, unit_price, status, created_at, created_by
        FROM items
        WHERE item_id = $1
        "#,
    )
    .bind(item_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Item {}", item_id)))?;

    Ok(crate::models::Item {
        item_id: row.item_id,
        batch_id: row.batch_id,
        item_code: row.item_code,
        item_name: row.item_name,
        size: row.size,
        color: row.color,
        unit_type: row.unit_type,
        qr_code: row.qr_code,
        barcode: row.barcode,
        unit_price: row.unit_price,
        status: row.status,
        created_at: row.created_at,
        created_by: row.created_by,
    })
}

#[derive(Debug, sqlx::FromRow)]
struct ItemLookupRow {
    item_id: Uuid,
    batch_id: Uuid,
    item_code: String,
    item_name: String,
    size: Option<String>,
    color: Option<String>,
    unit_type: Option<String>,
    qr_code: Option<String>,
    barcode: Option<String>,
    unit_price: Option<rust_decimal::Decimal>,
    status: String,
    created_at: DateTime<Utc>,
    created_by: Option<String>,
}

/// Row for box listing with context
#[derive(Debug, sqlx::FromRow)]
struct BoxListRow {
    box_id: Uuid,
    box_code: String,
    qr_code: Option<String>,
    supplier: Option<String>,
    po_number: Option<String>,
    do_number: Option<String>,
    invoice_number: Option<String>,
    store_id: Option<Uuid>,
    location_in_store: Option<String>,
    status: String,
    received_date: Option<NaiveDate>,
    received_by: Option<String>,
    checked_in_at: Option<DateTime<Utc>>,
    checked_in_by: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    store_name: Option<String>,
    total_items: i64,
}

impl BoxListRow {
    fn into_response(self) -> BoxResponse {
        BoxResponse {
            stock_box: StockBox {
                box_id: self.box_id,
                box_code: self.box_code,
                qr_code: self.qr_code,
                supplier: self.supplier,
                po_number: self.po_number,
                do_number: self.do_number,
                invoice_number: self.invoice_number,
                store_id: self.store_id,
                location_in_store: self.location_in_store,
                status: self.status,
                received_date: self.received_date,
                received_by: self.received_by,
                checked_in_at: self.checked_in_at,
                checked_in_by: self.checked_in_by,
                notes: self.notes,
                created_at: self.created_at,
            },
            store_name: self.store_name,
            total_items: self.total_items,
        }
    }
}

/// Row for the box inventory view
#[derive(Debug, sqlx::FromRow)]
struct BoxInventoryRow {
    inventory_id: Uuid,
    item_id: Uuid,
    item_code: Option<String>,
    item_name: Option<String>,
    size: Option<String>,
    store_id: Uuid,
    store_name: Option<String>,
    quantity: i32,
    available_quantity: i32,
    location_in_store: Option<String>,
    checked_in_at: DateTime<Utc>,
}

impl BoxInventoryRow {
    fn into_entry(self) -> BoxInventoryEntry {
        BoxInventoryEntry {
            inventory_id: self.inventory_id,
            item_id: self.item_id,
            item_code: self.item_code,
            item_name: self.item_name,
            size: self.size,
            store_id: self.store_id,
            store_name: self.store_name,
            quantity: self.quantity,
            available_quantity: self.available_quantity,
            location_in_store: self.location_in_store,
            checked_in_at: self.checked_in_at,
        }
    }
}
