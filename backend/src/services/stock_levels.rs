//! Stock-level resolution against the catalog
//!
//! Thin database wrapper over the domain resolver: look up the item's
//! type configuration and resolve size override -> type default ->
//! hardcoded fallback. Lookup failures degrade to the fallback values,
//! never to an error.

use sqlx::PgConnection;
use uuid::Uuid;

use shared::levels::{resolve_levels, SizeStockLevels, DEFAULT_MAX_LEVEL, DEFAULT_MIN_LEVEL};

/// Effective (min, max) thresholds for an item.
pub(crate) async fn levels_for_item(conn: &mut PgConnection, item_id: Uuid) -> (i32, i32) {
    let row = sqlx::query_as::<_, (Option<String>, Option<i32>, Option<i32>, Option<serde_json::Value>)>(
        r#"
        SELECT i.size, t.min_stock_level, t.max_stock_level, t.size_stock_levels
        FROM items i
        JOIN item_batches b ON b.batch_id = i.batch_id
        JOIN item_types t ON t.type_id = b.type_id
        WHERE i.item_id = $1
        "#,
    )
    .bind(item_id)
    .fetch_optional(&mut *conn)
    .await;

    match row {
        Ok(Some((size, type_min, type_max, levels_json))) => {
            let size_levels =
                levels_json.and_then(|v| serde_json::from_value::<SizeStockLevels>(v).ok());
            resolve_levels(type_min, type_max, size_levels.as_ref(), size.as_deref())
        }
        Ok(None) => (DEFAULT_MIN_LEVEL, DEFAULT_MAX_LEVEL),
        Err(e) => {
            tracing::warn!("Stock level lookup failed for item {}: {}", item_id, e);
            (DEFAULT_MIN_LEVEL, DEFAULT_MAX_LEVEL)
        }
    }
}
