//! Complaint persistence, including the enriched listing queries.

use super::{encode_timestamp, is_foreign_key_violation, parse_timestamp, DeskStore};
use crate::{
    complaint_reports::{ComplaintListing, OrderContext},
    complaint_service::{ComplaintRecord, ComplaintStatus},
    error::{DeskError, DeskResult},
    types::{ComplaintId, OrderId, UserId},
};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, params_from_iter, OptionalExtension, ToSql};
use std::collections::BTreeMap;

/// Shared SELECT for listing queries: complaint columns, the complainant's
/// username, and the order context when the complaint references an order.
const LISTING_SELECT: &str = "SELECT c.complaint_id, c.user_id, c.order_id, c.text, c.category,
            c.status, c.admin_response, c.submitted_at,
            u.username, o.restaurant_name, o.items, o.total_amount
     FROM complaints c
     JOIN users u ON u.user_id = c.user_id
     LEFT JOIN orders o ON o.order_id = c.order_id";

impl DeskStore {
    // ── Complaint ──────────────────────────────────────────────

    pub fn insert_complaint(
        &self,
        user_id: UserId,
        order_id: Option<OrderId>,
        text: &str,
        category: &str,
        status: ComplaintStatus,
        submitted_at: DateTime<Utc>,
    ) -> DeskResult<ComplaintId> {
        let conn = self.conn.lock();
        let result = conn.execute(
            "INSERT INTO complaints (user_id, order_id, text, category, status, submitted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user_id,
                order_id,
                text,
                category,
                status.as_str(),
                encode_timestamp(&submitted_at)
            ],
        );
        match result {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(e) if is_foreign_key_violation(&e) => Err(DeskError::Integrity {
                context: "complaint references a missing user or order".to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_complaint(&self, complaint_id: ComplaintId) -> DeskResult<Option<ComplaintRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT complaint_id, user_id, order_id, text, category, status,
                    admin_response, submitted_at
             FROM complaints WHERE complaint_id = ?1",
        )?;
        stmt.query_row(params![complaint_id], complaint_row_mapper)
            .optional()
            .map_err(Into::into)
    }

    /// Update a complaint's status. With `admin_response = None` the stored
    /// response is left untouched; `Some` overwrites it in the same statement.
    /// Returns false when no such complaint exists.
    pub fn set_complaint_status(
        &self,
        complaint_id: ComplaintId,
        status: ComplaintStatus,
        admin_response: Option<&str>,
    ) -> DeskResult<bool> {
        let conn = self.conn.lock();
        let rows = match admin_response {
            Some(response) => conn.execute(
                "UPDATE complaints SET status = ?1, admin_response = ?2 WHERE complaint_id = ?3",
                params![status.as_str(), response, complaint_id],
            )?,
            None => conn.execute(
                "UPDATE complaints SET status = ?1 WHERE complaint_id = ?2",
                params![status.as_str(), complaint_id],
            )?,
        };
        Ok(rows > 0)
    }

    pub fn complaints_for_user(&self, user_id: UserId) -> DeskResult<Vec<ComplaintListing>> {
        let conn = self.conn.lock();
        let sql = format!(
            "{LISTING_SELECT}
             WHERE c.user_id = ?1
             ORDER BY c.submitted_at DESC, c.complaint_id DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id], listing_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// All complaints, newest first, narrowed by whichever filters are set.
    /// The date filter compares on the calendar day of submission.
    pub fn complaints_filtered(
        &self,
        category: Option<&str>,
        status: Option<ComplaintStatus>,
        on_date: Option<NaiveDate>,
    ) -> DeskResult<Vec<ComplaintListing>> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut args: Vec<Box<dyn ToSql>> = Vec::new();
        if let Some(category) = category {
            clauses.push("c.category = ?");
            args.push(Box::new(category.to_string()));
        }
        if let Some(status) = status {
            clauses.push("c.status = ?");
            args.push(Box::new(status.as_str().to_string()));
        }
        if let Some(on_date) = on_date {
            clauses.push("date(c.submitted_at) = ?");
            args.push(Box::new(on_date.format("%Y-%m-%d").to_string()));
        }
        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };
        let sql = format!(
            "{LISTING_SELECT}{where_sql} ORDER BY c.submitted_at DESC, c.complaint_id DESC"
        );
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), listing_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Complaint totals per category, over all complaints.
    pub fn category_counts(&self) -> DeskResult<BTreeMap<String, i64>> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare("SELECT category, COUNT(*) FROM complaints GROUP BY category")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;
        rows.collect::<Result<BTreeMap<_, _>, _>>().map_err(Into::into)
    }

    // ── Test / summary helpers ─────────────────────────────────

    pub fn complaint_count(&self) -> DeskResult<i64> {
        self.conn
            .lock()
            .query_row("SELECT COUNT(*) FROM complaints", [], |row| row.get(0))
            .map_err(Into::into)
    }
}

fn complaint_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<ComplaintRecord> {
    Ok(ComplaintRecord {
        complaint_id: row.get(0)?,
        user_id: row.get(1)?,
        order_id: row.get(2)?,
        text: row.get(3)?,
        category: row.get(4)?,
        status: status_from_raw(5, row.get(5)?)?,
        admin_response: row.get(6)?,
        submitted_at: parse_timestamp(7, row.get(7)?)?,
    })
}

fn listing_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<ComplaintListing> {
    let complaint = complaint_row_mapper(row)?;
    let restaurant_name: Option<String> = row.get(9)?;
    let items: Option<String> = row.get(10)?;
    let total_amount: Option<f64> = row.get(11)?;
    let order = match (restaurant_name, items, total_amount) {
        (Some(restaurant_name), Some(items), Some(total_amount)) => Some(OrderContext {
            restaurant_name,
            items,
            total_amount,
        }),
        _ => None,
    };
    Ok(ComplaintListing {
        complaint,
        username: row.get(8)?,
        order,
    })
}

fn status_from_raw(index: usize, raw: String) -> rusqlite::Result<ComplaintStatus> {
    ComplaintStatus::parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            index,
            rusqlite::types::Type::Text,
            format!("unknown complaint status '{raw}'").into(),
        )
    })
}
