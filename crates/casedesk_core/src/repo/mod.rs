//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for epics and the
//!   audit log.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repositories borrow the caller's connection; a caller inside a
//!   transaction passes the transaction handle so every call joins its
//!   atomic unit.
//! - Repository APIs surface typed precondition errors in addition to DB
//!   transport errors.

use rusqlite::Connection;

pub mod audit_repo;
pub mod epic_repo;
pub mod query;

use epic_repo::RepoResult;

pub(crate) fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn table_has_column(
    conn: &Connection,
    table: &str,
    column: &str,
) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
