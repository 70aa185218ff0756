//! Order persistence.

use super::{encode_timestamp, is_foreign_key_violation, parse_timestamp, DeskStore};
use crate::{
    error::{DeskError, DeskResult},
    order_service::OrderRecord,
    types::{OrderId, UserId},
};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

impl DeskStore {
    // ── Order ──────────────────────────────────────────────────

    pub fn insert_order(
        &self,
        user_id: UserId,
        restaurant_name: &str,
        items: &str,
        total_amount: f64,
        status: &str,
        order_date: DateTime<Utc>,
    ) -> DeskResult<OrderId> {
        let conn = self.conn.lock();
        let result = conn.execute(
            "INSERT INTO orders (user_id, restaurant_name, items, total_amount, status, order_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user_id,
                restaurant_name,
                items,
                total_amount,
                status,
                encode_timestamp(&order_date)
            ],
        );
        match result {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(e) if is_foreign_key_violation(&e) => Err(DeskError::Integrity {
                context: format!("order references missing user {user_id}"),
            }),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_order(&self, order_id: OrderId) -> DeskResult<Option<OrderRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT order_id, user_id, restaurant_name, items, total_amount, status, order_date
             FROM orders WHERE order_id = ?1",
        )?;
        stmt.query_row(params![order_id], order_row_mapper)
            .optional()
            .map_err(Into::into)
    }

    pub fn orders_for_user(&self, user_id: UserId) -> DeskResult<Vec<OrderRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT order_id, user_id, restaurant_name, items, total_amount, status, order_date
             FROM orders WHERE user_id = ?1
             ORDER BY order_date DESC, order_id DESC",
        )?;
        let rows = stmt.query_map(params![user_id], order_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn order_count(&self) -> DeskResult<i64> {
        self.conn
            .lock()
            .query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0))
            .map_err(Into::into)
    }
}

fn order_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<OrderRecord> {
    Ok(OrderRecord {
        order_id: row.get(0)?,
        user_id: row.get(1)?,
        restaurant_name: row.get(2)?,
        items: row.get(3)?,
        total_amount: row.get(4)?,
        status: row.get(5)?,
        order_date: parse_timestamp(6, row.get(6)?)?,
    })
}
