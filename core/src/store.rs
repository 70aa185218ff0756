//! SQLite persistence layer.
//!
//! RULE: Only the store modules talk to the database.
//! Services call store methods and never execute SQL themselves.

use crate::{
    account_service::{Role, UserRecord},
    error::{DeskError, DeskResult},
    types::UserId,
};
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Arc;

mod complaint;
mod order;

/// Schema migrations, applied in order and tracked in `schema_migrations`
/// so each runs exactly once per database.
const MIGRATIONS: &[(i64, &str)] = &[
    (1, include_str!("../../migrations/001_accounts.sql")),
    (2, include_str!("../../migrations/002_orders.sql")),
    (3, include_str!("../../migrations/003_complaints.sql")),
    (4, include_str!("../../migrations/004_admin_responses.sql")),
];

/// Handle to the desk database. Clones share one underlying connection;
/// writes serialize through the internal lock, which is all the atomicity
/// the single-row operations here need.
#[derive(Clone)]
pub struct DeskStore {
    conn: Arc<Mutex<Connection>>,
}

impl DeskStore {
    /// Open (or create) the desk database at `path`.
    pub fn open(path: &str) -> DeskResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (:memory: ignores it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> DeskResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Apply all pending schema migrations in order.
    pub fn migrate(&self) -> DeskResult<()> {
        let conn = self.conn.lock();
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version    INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
             );",
        )?;
        let current: i64 = conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )?;
        for (version, sql) in MIGRATIONS {
            if *version <= current {
                continue;
            }
            conn.execute_batch(sql)?;
            conn.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                params![version, encode_timestamp(&Utc::now())],
            )?;
            log::debug!("applied schema migration {version}");
        }
        Ok(())
    }

    /// Highest applied migration version. Valid after `migrate()`.
    pub fn schema_version(&self) -> DeskResult<i64> {
        self.conn
            .lock()
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
                [],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    // ── User ───────────────────────────────────────────────────

    pub fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
        created_at: DateTime<Utc>,
    ) -> DeskResult<UserId> {
        let conn = self.conn.lock();
        let result = conn.execute(
            "INSERT INTO users (username, password_hash, role, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                username,
                password_hash,
                role.as_str(),
                encode_timestamp(&created_at)
            ],
        );
        match result {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(e) if is_unique_violation(&e) => Err(DeskError::DuplicateUsername {
                username: username.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_user(&self, user_id: UserId) -> DeskResult<Option<UserRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT user_id, username, role, created_at FROM users WHERE user_id = ?1",
        )?;
        stmt.query_row(params![user_id], user_row_mapper)
            .optional()
            .map_err(Into::into)
    }

    /// Fetch a user together with the stored credential hash. Only the
    /// login check should look at the hash.
    pub fn user_by_username(&self, username: &str) -> DeskResult<Option<(UserRecord, String)>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT user_id, username, role, created_at, password_hash
             FROM users WHERE username = ?1",
        )?;
        stmt.query_row(params![username], |row| {
            let user = user_row_mapper(row)?;
            Ok((user, row.get::<_, String>(4)?))
        })
        .optional()
        .map_err(Into::into)
    }

    // ── Test / summary helpers ─────────────────────────────────

    pub fn user_count(&self) -> DeskResult<i64> {
        self.conn
            .lock()
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .map_err(Into::into)
    }
}

fn user_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRecord> {
    let role_raw: String = row.get(2)?;
    let role = Role::parse(&role_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown role '{role_raw}'").into(),
        )
    })?;
    Ok(UserRecord {
        user_id: row.get(0)?,
        username: row.get(1)?,
        role,
        created_at: parse_timestamp(3, row.get(3)?)?,
    })
}

/// Timestamps are stored as RFC 3339 UTC, truncated to whole seconds so
/// SQLite's date() can parse them for the calendar-day filter.
fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_timestamp(index: usize, raw: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                index,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

fn is_unique_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn is_foreign_key_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}
