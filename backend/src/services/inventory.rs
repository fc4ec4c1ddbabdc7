//! Inventory ledger service
//!
//! Owns per-store inventory rows and the append-only stock transaction
//! log. Posting a transaction applies its state-dependent side effects
//! (quantity moves, box status advancement, provenance propagation) and
//! the ledger entry in one database transaction; any failure rolls back
//! the whole operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{BoxStatus, Inventory, StockTransaction, TransactionType};
use crate::services::stock_levels;
use shared::provenance::{select_checkin, CheckinRecord};
use shared::validation::validate_quantity;

/// Inventory service for stock transactions and inventory rows
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

/// Input for posting a stock transaction
#[derive(Debug, Deserialize)]
pub struct PostTransactionInput {
    pub transaction_type: TransactionType,
    pub item_id: Uuid,
    pub from_store_id: Option<Uuid>,
    pub to_store_id: Option<Uuid>,
    pub quantity: i32,
    pub box_id: Option<Uuid>,
    pub reference_number: Option<String>,
    pub reference_type: Option<String>,
    pub employee_name: Option<String>,
    pub employee_id: Option<String>,
    pub department: Option<String>,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

/// Query parameters for listing transactions
#[derive(Debug, Deserialize)]
pub struct TransactionListQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub item_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
    pub transaction_type: Option<String>,
    pub reference_number: Option<String>,
}

/// Query parameters for listing inventory
#[derive(Debug, Deserialize)]
pub struct InventoryListQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub item_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
    #[serde(default)]
    pub low_stock: bool,
}

/// Input for bulk inventory deletion
#[derive(Debug, Deserialize)]
pub struct BulkDeleteInput {
    pub inventory_ids: Vec<Uuid>,
    #[serde(default)]
    pub force: bool,
}

/// Result of a bulk deletion
#[derive(Debug, Serialize)]
pub struct BulkDeleteResult {
    pub deleted_count: usize,
    pub deleted_ids: Vec<Uuid>,
}

fn default_limit() -> i64 {
    100
}

/// Transaction with item/store context
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    #[serde(flatten)]
    pub transaction: StockTransaction,
    pub item_code: Option<String>,
    pub item_name: Option<String>,
    pub from_store_name: Option<String>,
    pub to_store_name: Option<String>,
}

/// Inventory row with item/store context and box provenance
#[derive(Debug, Serialize)]
pub struct InventoryResponse {
    #[serde(flatten)]
    pub inventory: Inventory,
    pub store_name: Option<String>,
    pub item_code: Option<String>,
    pub item_name: Option<String>,
    pub size: Option<String>,
    pub year_code: Option<String>,
    pub box_id: Option<Uuid>,
    pub box_reference: Option<String>,
}

const TRANSACTION_COLUMNS: &str =
    "transaction_id, item_id, from_store_id, to_store_id, transaction_type, quantity, box_id, \
     reference_number, reference_type, employee_name, employee_id, department, reason, notes, \
     created_by, created_at";

/// Row for transaction queries
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    transaction_id: Uuid,
    item_id: Uuid,
    from_store_id: Option<Uuid>,
    to_store_id: Option<Uuid>,
    transaction_type: String,
    quantity: i32,
    box_id: Option<Uuid>,
    reference_number: Option<String>,
    reference_type: Option<String>,
    employee_name: Option<String>,
    employee_id: Option<String>,
    department: Option<String>,
    reason: Option<String>,
    notes: Option<String>,
    created_by: Option<String>,
    created_at: DateTime<Utc>,
}

impl TransactionRow {
    fn into_model(self) -> StockTransaction {
        StockTransaction {
            transaction_id: self.transaction_id,
            item_id: self.item_id,
            from_store_id: self.from_store_id,
            to_store_id: self.to_store_id,
            transaction_type: self.transaction_type,
            quantity: self.quantity,
            box_id: self.box_id,
            reference_number: self.reference_number,
            reference_type: self.reference_type,
            employee_name: self.employee_name,
            employee_id: self.employee_id,
            department: self.department,
            reason: self.reason,
            notes: self.notes,
            created_by: self.created_by,
            created_at: self.created_at,
        }
    }
}

/// Source inventory row considered for an outbound movement
#[derive(Debug, sqlx::FromRow)]
struct SourceRow {
    inventory_id: Uuid,
    available_quantity: i32,
    min_level: i32,
    max_level: i32,
}

/// Pick the first source row that can satisfy the requested quantity.
fn pick_source_row(rows: &[SourceRow], requested: i32) -> Result<&SourceRow, AppError> {
    if let Some(row) = rows.iter().find(|r| r.available_quantity >= requested) {
        return Ok(row);
    }
    let available = rows.iter().map(|r| r.available_quantity).max().unwrap_or(0);
    Err(AppError::InsufficientStock {
        available,
        requested,
    })
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Post a stock transaction and apply its inventory side effects.
    pub async fn post_transaction(
        &self,
        username: &str,
        input: PostTransactionInput,
    ) -> AppResult<TransactionResponse> {
        validate_quantity(input.quantity)
            .map_err(|msg| AppError::validation("quantity", msg))?;

        let mut tx = self.db.begin().await?;

        let item: Option<(String, String)> =
            sqlx::query_as("SELECT item_code, item_name FROM items WHERE item_id = $1")
                .bind(input.item_id)
                .fetch_optional(&mut *tx)
                .await?;
        let (item_code, item_name) = item
            .ok_or_else(|| AppError::NotFound(format!("Item {}", input.item_id)))?;

        match input.transaction_type {
            TransactionType::StockOut => self.apply_stock_out(&mut tx, &input).await?,
            TransactionType::StockIn => self.apply_stock_in(&mut tx, &input, username).await?,
            TransactionType::TransferOut => {
                self.apply_transfer_out(&mut tx, &input, username).await?
            }
            // Remaining types (adjustment, return, damage, disposal,
            // transfer_in, box_checkin) are recorded as append-only audit
            // entries with no mandated inventory side effect here.
            _ => {}
        }

        let transaction = sqlx::query_as::<_, TransactionRow>(&format!(
            r#"
            INSERT INTO stock_transactions (transaction_type, item_id, from_store_id,
                                            to_store_id, quantity, box_id, reference_number,
                                            reference_type, employee_name, employee_id,
                                            department, reason, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {}
            "#,
            TRANSACTION_COLUMNS
        ))
        .bind(input.transaction_type.as_str())
        .bind(input.item_id)
        .bind(input.from_store_id)
        .bind(input.to_store_id)
        .bind(input.quantity)
        .bind(input.box_id)
        .bind(&input.reference_number)
        .bind(&input.reference_type)
        .bind(&input.employee_name)
        .bind(&input.employee_id)
        .bind(&input.department)
        .bind(&input.reason)
        .bind(&input.notes)
        .bind(username)
        .fetch_one(&mut *tx)
        .await?
        .into_model();

        tx.commit().await?;

        Ok(TransactionResponse {
            transaction,
            item_code: Some(item_code),
            item_name: Some(item_name),
            from_store_name: None,
            to_store_name: None,
        })
    }

    /// Subtract stock at the source store, advancing a referenced box to
    /// stocked_out.
    async fn apply_stock_out(
        &self,
        conn: &mut PgConnection,
        input: &PostTransactionInput,
    ) -> AppResult<()> {
        let from_store_id = input.from_store_id.ok_or_else(|| {
            AppError::validation(
                "from_store_id",
                "from_store_id is required for stock_out transactions",
            )
        })?;

        let rows = sqlx::query_as::<_, SourceRow>(
            r#"
            SELECT inventory_id, available_quantity, min_level, max_level
            FROM inventory
            WHERE item_id = $1 AND store_id = $2
            ORDER BY created_at
            "#,
        )
        .bind(input.item_id)
        .bind(from_store_id)
        .fetch_all(&mut *conn)
        .await?;

        if rows.is_empty() {
            return Err(AppError::NotFound(
                "Inventory record for this item and store".to_string(),
            ));
        }

        let source = pick_source_row(&rows, input.quantity)?;

        sqlx::query(
            r#"
            UPDATE inventory
            SET quantity = GREATEST(quantity - $2, 0), updated_at = NOW()
            WHERE inventory_id = $1
            "#,
        )
        .bind(source.inventory_id)
        .bind(input.quantity)
        .execute(&mut *conn)
        .await?;

        if let Some(box_id) = input.box_id {
            let status: Option<String> =
                sqlx::query_scalar("SELECT status FROM boxes WHERE box_id = $1")
                    .bind(box_id)
                    .fetch_optional(&mut *conn)
                    .await?;

            if status.as_deref().and_then(BoxStatus::from_str) == Some(BoxStatus::CheckedIn) {
                sqlx::query("UPDATE boxes SET status = 'stocked_out' WHERE box_id = $1")
                    .bind(box_id)
                    .execute(&mut *conn)
                    .await?;
            }

            sqlx::query(
                r#"
                UPDATE box_contents
                SET remaining = GREATEST(remaining - $3, 0)
                WHERE box_id = $1 AND item_id = $2
                "#,
            )
            .bind(box_id)
            .bind(input.item_id)
            .bind(input.quantity)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    /// Add stock at the destination store, advancing a referenced pending
    /// box to checked_in.
    async fn apply_stock_in(
        &self,
        conn: &mut PgConnection,
        input: &PostTransactionInput,
        username: &str,
    ) -> AppResult<()> {
        let to_store_id = input.to_store_id.ok_or_else(|| {
            AppError::validation(
                "to_store_id",
                "to_store_id is required for stock_in transactions",
            )
        })?;

        let store_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM stores WHERE store_id = $1)")
                .bind(to_store_id)
                .fetch_one(&mut *conn)
                .await?;
        if !store_exists {
            return Err(AppError::NotFound("Store".to_string()));
        }

        let existing: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT inventory_id FROM inventory
            WHERE item_id = $1 AND store_id = $2
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .bind(input.item_id)
        .bind(to_store_id)
        .fetch_optional(&mut *conn)
        .await?;

        match existing {
            Some(inventory_id) => {
                sqlx::query(
                    r#"
                    UPDATE inventory
                    SET quantity = quantity + $2, updated_at = NOW()
                    WHERE inventory_id = $1
                    "#,
                )
                .bind(inventory_id)
                .bind(input.quantity)
                .execute(&mut *conn)
                .await?;
            }
            None => {
                let (min_level, max_level) =
                    stock_levels::levels_for_item(conn, input.item_id).await;
                sqlx::query(
                    r#"
                    INSERT INTO inventory (item_id, store_id, quantity, reserved_quantity,
                                           min_level, max_level)
                    VALUES ($1, $2, $3, 0, $4, $5)
                    "#,
                )
                .bind(input.item_id)
                .bind(to_store_id)
                .bind(input.quantity)
                .bind(min_level)
                .bind(max_level)
                .execute(&mut *conn)
                .await?;
            }
        }

        if let Some(box_id) = input.box_id {
            let status: Option<String> =
                sqlx::query_scalar("SELECT status FROM boxes WHERE box_id = $1")
                    .bind(box_id)
                    .fetch_optional(&mut *conn)
                    .await?;

            if status.as_deref().and_then(BoxStatus::from_str) == Some(BoxStatus::PendingCheckin) {
                sqlx::query(
                    r#"
                    UPDATE boxes
                    SET status = 'checked_in', store_id = $2,
                        checked_in_at = NOW(), checked_in_by = $3
                    WHERE box_id = $1
                    "#,
                )
                .bind(box_id)
                .bind(to_store_id)
                .bind(username)
                .execute(&mut *conn)
                .await?;
            }
        }

        Ok(())
    }

    /// Move stock between two stores, carrying box provenance to the
    /// destination.
    async fn apply_transfer_out(
        &self,
        conn: &mut PgConnection,
        input: &PostTransactionInput,
        username: &str,
    ) -> AppResult<()> {
        let from_store_id = input.from_store_id.ok_or_else(|| {
            AppError::validation(
                "from_store_id",
                "from_store_id is required for transfer transactions",
            )
        })?;
        let to_store_id = input.to_store_id.ok_or_else(|| {
            AppError::validation(
                "to_store_id",
                "to_store_id is required for transfer transactions",
            )
        })?;
        if from_store_id == to_store_id {
            return Err(AppError::validation(
                "to_store_id",
                "from_store_id and to_store_id must be different",
            ));
        }

        let rows = sqlx::query_as::<_, SourceRow>(
            r#"
            SELECT inventory_id, available_quantity, min_level, max_level
            FROM inventory
            WHERE item_id = $1 AND store_id = $2
            ORDER BY created_at
            "#,
        )
        .bind(input.item_id)
        .bind(from_store_id)
        .fetch_all(&mut *conn)
        .await?;

        if rows.is_empty() {
            return Err(AppError::NotFound(
                "Inventory record for this item in the source store".to_string(),
            ));
        }

        let source = pick_source_row(&rows, input.quantity)?;
        let (source_id, source_min, source_max) =
            (source.inventory_id, source.min_level, source.max_level);

        sqlx::query(
            r#"
            UPDATE inventory
            SET quantity = GREATEST(quantity - $2, 0), updated_at = NOW()
            WHERE inventory_id = $1
            "#,
        )
        .bind(source_id)
        .bind(input.quantity)
        .execute(&mut *conn)
        .await?;

        // Box provenance: an explicit box reference wins; otherwise the
        // most recent check-in of this item into the source store.
        let (box_id, mut box_code) = match input.box_id {
            Some(box_id) => {
                let code: Option<String> =
                    sqlx::query_scalar("SELECT box_code FROM boxes WHERE box_id = $1")
                        .bind(box_id)
                        .fetch_optional(&mut *conn)
                        .await?;
                (Some(box_id), code)
            }
            None => {
                let latest: Option<(Uuid, Option<String>)> = sqlx::query_as(
                    r#"
                    SELECT box_id, reference_number
                    FROM stock_transactions
                    WHERE item_id = $1 AND to_store_id = $2
                      AND transaction_type = 'box_checkin' AND box_id IS NOT NULL
                    ORDER BY created_at DESC
                    LIMIT 1
                    "#,
                )
                .bind(input.item_id)
                .bind(from_store_id)
                .fetch_optional(&mut *conn)
                .await?;
                match latest {
                    Some((box_id, code)) => (Some(box_id), code),
                    None => (None, None),
                }
            }
        };

        // Add to the destination, creating a row with the source's
        // thresholds when none exists yet.
        let destination: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT inventory_id FROM inventory
            WHERE item_id = $1 AND store_id = $2
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .bind(input.item_id)
        .bind(to_store_id)
        .fetch_optional(&mut *conn)
        .await?;

        match destination {
            Some(inventory_id) => {
                sqlx::query(
                    r#"
                    UPDATE inventory
                    SET quantity = quantity + $2, updated_at = NOW()
                    WHERE inventory_id = $1
                    "#,
                )
                .bind(inventory_id)
                .bind(input.quantity)
                .execute(&mut *conn)
                .await?;
            }
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO inventory (item_id, store_id, quantity, reserved_quantity,
                                           min_level, max_level)
                    VALUES ($1, $2, $3, 0, $4, $5)
                    "#,
                )
                .bind(input.item_id)
                .bind(to_store_id)
                .bind(input.quantity)
                .bind(source_min)
                .bind(source_max)
                .execute(&mut *conn)
                .await?;
            }
        }

        if let Some(box_id) = box_id {
            // The box follows its stock to the destination store.
            let moved_code: Option<String> = sqlx::query_scalar(
                "UPDATE boxes SET store_id = $2 WHERE box_id = $1 RETURNING box_code",
            )
            .bind(box_id)
            .bind(to_store_id)
            .fetch_optional(&mut *conn)
            .await?;
            if box_code.is_none() {
                box_code = moved_code;
            }

            // A quantity-0 check-in marker keeps the box reference visible
            // at the destination; repeated partial transfers of the same
            // box must not duplicate it.
            if let Some(box_code) = box_code {
                let marker_exists: bool = sqlx::query_scalar(
                    r#"
                    SELECT EXISTS(
                        SELECT 1 FROM stock_transactions
                        WHERE box_id = $1 AND item_id = $2 AND to_store_id = $3
                          AND transaction_type = 'box_checkin')
                    "#,
                )
                .bind(box_id)
                .bind(input.item_id)
                .bind(to_store_id)
                .fetch_one(&mut *conn)
                .await?;

                if !marker_exists {
                    sqlx::query(
                        r#"
                        INSERT INTO stock_transactions (transaction_type, box_id, item_id,
                                                        to_store_id, quantity, reference_number,
                                                        reference_type, notes, created_by)
                        VALUES ('box_checkin', $1, $2, $3, 0, $4, 'BOX', $5, $6)
                        "#,
                    )
                    .bind(box_id)
                    .bind(input.item_id)
                    .bind(to_store_id)
                    .bind(&box_code)
                    .bind(format!("Box transferred from store {}", from_store_id))
                    .bind(username)
                    .execute(&mut *conn)
                    .await?;
                }
            }
        }

        Ok(())
    }

    /// List stock transactions with optional filtering
    pub async fn list_transactions(
        &self,
        query: TransactionListQuery,
    ) -> AppResult<Vec<TransactionResponse>> {
        let rows = sqlx::query_as::<_, TransactionDetailRow>(
            r#"
            SELECT t.transaction_id, t.item_id, t.from_store_id, t.to_store_id,
                   t.transaction_type, t.quantity, t.box_id, t.reference_number,
                   t.reference_type, t.employee_name, t.employee_id, t.department,
                   t.reason, t.notes, t.created_by, t.created_at,
                   i.item_code, i.item_name,
                   fs.store_name AS from_store_name, ts.store_name AS to_store_name
            FROM stock_transactions t
            LEFT JOIN items i ON i.item_id = t.item_id
            LEFT JOIN stores fs ON fs.store_id = t.from_store_id
            LEFT JOIN stores ts ON ts.store_id = t.to_store_id
            WHERE ($1::uuid IS NULL OR t.item_id = $1)
              AND ($2::uuid IS NULL OR t.from_store_id = $2 OR t.to_store_id = $2)
              AND ($3::text IS NULL OR t.transaction_type = $3)
              AND ($4::text IS NULL OR t.reference_number ILIKE $4)
            ORDER BY t.created_at DESC
            OFFSET $5 LIMIT $6
            "#,
        )
        .bind(query.item_id)
        .bind(query.store_id)
        .bind(&query.transaction_type)
        .bind(query.reference_number.as_ref().map(|s| format!("%{}%", s)))
        .bind(query.skip.max(0))
        .bind(query.limit.clamp(1, 1000))
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(TransactionDetailRow::into_response)
            .collect())
    }

    /// List inventory rows with item/store context and box provenance.
    pub async fn list_inventory(
        &self,
        query: InventoryListQuery,
    ) -> AppResult<Vec<InventoryResponse>> {
        let rows = sqlx::query_as::<_, InventoryDetailRow>(
            r#"
            SELECT inv.inventory_id, inv.item_id, inv.store_id, inv.quantity,
                   inv.reserved_quantity, inv.available_quantity, inv.min_level,
                   inv.max_level, inv.location_in_store, inv.notes, inv.created_at,
                   inv.updated_at,
                   s.store_name, i.item_code, i.item_name, i.size, b.year_code
            FROM inventory inv
            LEFT JOIN items i ON i.item_id = inv.item_id
            LEFT JOIN item_batches b ON b.batch_id = i.batch_id
            LEFT JOIN stores s ON s.store_id = inv.store_id
            WHERE ($1::uuid IS NULL OR inv.item_id = $1)
              AND ($2::uuid IS NULL OR inv.store_id = $2)
              AND (NOT $3 OR (inv.quantity > 0 AND inv.quantity < inv.min_level))
            ORDER BY inv.store_id, inv.item_id, inv.created_at
            OFFSET $4 LIMIT $5
            "#,
        )
        .bind(query.item_id)
        .bind(query.store_id)
        .bind(query.low_stock)
        .bind(query.skip.max(0))
        .bind(query.limit.clamp(1, 1000))
        .fetch_all(&self.db)
        .await?;

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let provenance = self
                .box_provenance(row.item_id, row.store_id, row.quantity, row.created_at)
                .await;
            result.push(row.into_response(provenance));
        }

        Ok(result)
    }

    /// Best-effort box provenance for an inventory row.
    ///
    /// Lookup failures degrade to `None`; the field is display metadata
    /// and must not fail the read.
    async fn box_provenance(
        &self,
        item_id: Uuid,
        store_id: Uuid,
        quantity: i32,
        created_at: DateTime<Utc>,
    ) -> Option<(Uuid, String)> {
        let rows: Result<Vec<(Uuid, Option<String>, i32, DateTime<Utc>)>, sqlx::Error> =
            sqlx::query_as(
                r#"
                SELECT box_id, reference_number, quantity, created_at
                FROM stock_transactions
                WHERE item_id = $1 AND to_store_id = $2
                  AND transaction_type = 'box_checkin' AND box_id IS NOT NULL
                ORDER BY created_at DESC
                "#,
            )
            .bind(item_id)
            .bind(store_id)
            .fetch_all(&self.db)
            .await;

        let records: Vec<CheckinRecord> = match rows {
            Ok(rows) => rows
                .into_iter()
                .filter_map(|(box_id, code, quantity, created_at)| {
                    code.map(|box_code| CheckinRecord {
                        box_id,
                        box_code,
                        quantity,
                        created_at,
                    })
                })
                .collect(),
            Err(e) => {
                tracing::warn!(
                    "Box provenance lookup failed for item {} store {}: {}",
                    item_id,
                    store_id,
                    e
                );
                return None;
            }
        };

        select_checkin(&records, quantity, created_at)
            .map(|record| (record.box_id, record.box_code.clone()))
    }

    /// Re-resolve an inventory row's thresholds from the current catalog
    /// configuration.
    pub async fn refresh_levels(&self, inventory_id: Uuid) -> AppResult<Inventory> {
        let mut conn = self.db.acquire().await?;

        let item_id: Uuid =
            sqlx::query_scalar("SELECT item_id FROM inventory WHERE inventory_id = $1")
                .bind(inventory_id)
                .fetch_optional(&mut *conn)
                .await?
                .ok_or_else(|| AppError::NotFound("Inventory record".to_string()))?;

        let (min_level, max_level) = stock_levels::levels_for_item(&mut conn, item_id).await;

        let row = sqlx::query_as::<_, InventoryRow>(
            r#"
            UPDATE inventory
            SET min_level = $2, max_level = $3, updated_at = NOW()
            WHERE inventory_id = $1
            RETURNING inventory_id, item_id, store_id, quantity, reserved_quantity,
                      available_quantity, min_level, max_level, location_in_store, notes,
                      created_at, updated_at
            "#,
        )
        .bind(inventory_id)
        .bind(min_level)
        .bind(max_level)
        .fetch_one(&mut *conn)
        .await?;

        Ok(row.into_model())
    }

    /// Delete an inventory row.
    ///
    /// Refused while the row still holds stock (or reservations) unless
    /// `force` is set; an empty row may be deleted even with transaction
    /// history.
    pub async fn delete_inventory(&self, inventory_id: Uuid, force: bool) -> AppResult<()> {
        let row: Option<(Uuid, Uuid, i32, i32)> = sqlx::query_as(
            "SELECT item_id, store_id, quantity, reserved_quantity FROM inventory WHERE inventory_id = $1",
        )
        .bind(inventory_id)
        .fetch_optional(&self.db)
        .await?;

        let (item_id, store_id, quantity, reserved) = row.ok_or_else(|| {
            AppError::NotFound(format!("Inventory record {}", inventory_id))
        })?;

        if !force && (quantity != 0 || reserved != 0) {
            let transaction_count: i64 = sqlx::query_scalar(
                r#"
                SELECT COUNT(*) FROM stock_transactions
                WHERE item_id = $1 AND (from_store_id = $2 OR to_store_id = $2)
                "#,
            )
            .bind(item_id)
            .bind(store_id)
            .fetch_one(&self.db)
            .await?;

            let message = if transaction_count > 0 {
                "Cannot delete inventory with remaining stock and transaction history. Use force=true to delete anyway."
            } else {
                "Cannot delete inventory with remaining stock. Use force=true to delete anyway."
            };
            return Err(AppError::Conflict {
                resource: "inventory".to_string(),
                message: message.to_string(),
            });
        }

        sqlx::query("DELETE FROM inventory WHERE inventory_id = $1")
            .bind(inventory_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Bulk delete inventory rows with the same force semantics as
    /// single deletion.
    pub async fn bulk_delete(&self, input: BulkDeleteInput) -> AppResult<BulkDeleteResult> {
        if input.inventory_ids.is_empty() {
            return Err(AppError::validation(
                "inventory_ids",
                "inventory_ids list cannot be empty",
            ));
        }

        let mut tx = self.db.begin().await?;

        let rows: Vec<(Uuid, i32, i32)> = sqlx::query_as(
            r#"
            SELECT inventory_id, quantity, reserved_quantity
            FROM inventory
            WHERE inventory_id = ANY($1)
            "#,
        )
        .bind(&input.inventory_ids)
        .fetch_all(&mut *tx)
        .await?;

        if rows.len() != input.inventory_ids.len() {
            let found: Vec<Uuid> = rows.iter().map(|r| r.0).collect();
            let missing: Vec<Uuid> = input
                .inventory_ids
                .iter()
                .filter(|id| !found.contains(id))
                .copied()
                .collect();
            return Err(AppError::NotFound(format!(
                "Inventory records {:?}",
                missing
            )));
        }

        if !input.force {
            let problematic: Vec<Uuid> = rows
                .iter()
                .filter(|(_, quantity, reserved)| *quantity != 0 || *reserved != 0)
                .map(|r| r.0)
                .collect();
            if !problematic.is_empty() {
                return Err(AppError::Conflict {
                    resource: "inventory".to_string(),
                    message: format!(
                        "Inventory records {:?} still hold stock. Use force=true to delete anyway.",
                        problematic
                    ),
                });
            }
        }

        let deleted_ids: Vec<Uuid> = rows.iter().map(|r| r.0).collect();
        sqlx::query("DELETE FROM inventory WHERE inventory_id = ANY($1)")
            .bind(&deleted_ids)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(BulkDeleteResult {
            deleted_count: deleted_ids.len(),
            deleted_ids,
        })
    }
}

/// Row for inventory queries
#[derive(Debug, sqlx::FromRow)]
struct InventoryRow {
    inventory_id: Uuid,
    item_id: Uuid,
    store_id: Uuid,
    quantity: i32,
    reserved_quantity: i32,
    available_quantity: i32,
    min_level: i32,
    max_level: i32,
    location_in_store: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl InventoryRow {
    fn into_model(self) -> Inventory {
        Inventory {
            inventory_id: self.inventory_id,
            item_id: self.item_id,
            store_id: self.store_id,
            quantity: self.quantity,
            reserved_quantity: self.reserved_quantity,
            available_quantity: self.available_quantity,
            min_level: self.min_level,
            max_level: self.max_level,
            location_in_store: self.location_in_store,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Row for inventory listing with context
#[derive(Debug, sqlx::FromRow)]
struct InventoryDetailRow {
    inventory_id: Uuid,
    item_id: Uuid,
    store_id: Uuid,
    quantity: i32,
    reserved_quantity: i32,
    available_quantity: i32,
    min_level: i32,
    max_level: i32,
    location_in_store: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    store_name: Option<String>,
    item_code: Option<String>,
    item_name: Option<String>,
    size: Option<String>,
    year_code: Option<String>,
}

impl InventoryDetailRow {
    fn into_response(self, provenance: Option<(Uuid, String)>) -> InventoryResponse {
        let (box_id, box_reference) = match provenance {
            Some((box_id, box_reference)) => (Some(box_id), Some(box_reference)),
            None => (None, None),
        };
        InventoryResponse {
            inventory: Inventory {
                inventory_id: self.inventory_id,
                item_id: self.item_id,
                store_id: self.store_id,
                quantity: self.quantity,
                reserved_quantity: self.reserved_quantity,
                available_quantity: self.available_quantity,
                min_level: self.min_level,
                max_level: self.max_level,
                location_in_store: self.location_in_store,
                notes: self.notes,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            store_name: self.store_name,
            item_code: self.item_code,
            item_name: self.item_name,
            size: self.size,
            year_code: self.year_code,
            box_id,
            box_reference,
        }
    }
}

/// Row for transaction listing with context
#[derive(Debug, sqlx::FromRow)]
struct TransactionDetailRow {
    transaction_id: Uuid,
    item_id: Uuid,
    from_store_id: Option<Uuid>,
    to_store_id: Option<Uuid>,
    transaction_type: String,
    quantity: i32,
    box_id: Option<Uuid>,
    reference_number: Option<String>,
    reference_type: Option<String>,
    employee_name: Option<String>,
    employee_id: Option<String>,
    department: Option<String>,
    reason: Option<String>,
    notes: Option<String>,
    created_by: Option<String>,
    created_at: DateTime<Utc>,
    item_code: Option<String>,
    item_name: Option<String>,
    from_store_name: Option<String>,
    to_store_name: Option<String>,
}

impl TransactionDetailRow {
    fn into_response(self) -> TransactionResponse {
        TransactionResponse {
            transaction: StockTransaction {
                transaction_id: self.transaction_id,
                item_id: self.item_id,
                from_store_id: self.from_store_id,
                to_store_id: self.to_store_id,
                transaction_type: self.transaction_type,
                quantity: self.quantity,
                box_id: self.box_id,
                reference_number: self.reference_number,
                reference_type: self.reference_type,
                employee_name: self.employee_name,
                employee_id: self.employee_id,
                department: self.department,
                reason: self.reason,
                notes: self.notes,
                created_by: self.created_by,
                created_at: self.created_at,
            },
            item_code: self.item_code,
            item_name: self.item_name,
            from_store_name: self.from_store_name,
            to_store_name: self.to_store_name,
        }
    }
}
