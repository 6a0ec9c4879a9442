//! Audit-log repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Durably append one record per mutating entity action.
//! - Provide read access for inspection and tests.
//!
//! # Invariants
//! - The sink is append-only; no update or delete API exists.
//! - Append happens on the caller's connection, so a caller inside a
//!   transaction gets the entry inside its atomic unit.

use crate::model::audit::{AuditAction, AuditEntry, AuditRecord};
use crate::repo::epic_repo::{RepoError, RepoResult};
use crate::repo::{table_exists, table_has_column};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

/// Repository interface for the audit-log sink.
pub trait AuditLogRepository {
    /// Appends one entry and returns its sink-assigned row id.
    fn append(&self, entry: &AuditEntry) -> RepoResult<i64>;
    /// Returns all entries for one entity, oldest first.
    fn list_for_entity(&self, entity_name: &str, entity_id: &str) -> RepoResult<Vec<AuditRecord>>;
}

/// SQLite-backed audit-log repository.
pub struct SqliteAuditLogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAuditLogRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_audit_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl AuditLogRepository for SqliteAuditLogRepository<'_> {
    fn append(&self, entry: &AuditEntry) -> RepoResult<i64> {
        let values_json = match entry.values.as_ref() {
            Some(values) => Some(serde_json::to_string(values).map_err(|err| {
                RepoError::InvalidData(format!("unserializable audit values: {err}"))
            })?),
            None => None,
        };

        self.conn.execute(
            "INSERT INTO audit_log (
                entity_name,
                entity_id,
                action,
                values_json,
                created_by
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                entry.entity_name.as_str(),
                entry.entity_id.as_str(),
                action_to_db(entry.action),
                values_json.as_deref(),
                entry.created_by.map(|user| user.to_string()),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn list_for_entity(&self, entity_name: &str, entity_id: &str) -> RepoResult<Vec<AuditRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                id,
                entity_name,
                entity_id,
                action,
                values_json,
                created_by,
                created_at
             FROM audit_log
             WHERE entity_name = ?1
               AND entity_id = ?2
             ORDER BY id ASC;",
        )?;

        let mut rows = stmt.query(params![entity_name, entity_id])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_audit_row(row)?);
        }

        Ok(records)
    }
}

fn parse_audit_row(row: &Row<'_>) -> RepoResult<AuditRecord> {
    let action_text: String = row.get("action")?;
    let action = parse_action(&action_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid action `{action_text}` in audit_log.action"))
    })?;

    let values = match row.get::<_, Option<String>>("values_json")? {
        Some(raw) => Some(serde_json::from_str(&raw).map_err(|err| {
            RepoError::InvalidData(format!("invalid json in audit_log.values_json: {err}"))
        })?),
        None => None,
    };

    let created_by = match row.get::<_, Option<String>>("created_by")? {
        Some(raw) => Some(Uuid::parse_str(&raw).map_err(|_| {
            RepoError::InvalidData(format!("invalid uuid value `{raw}` in audit_log.created_by"))
        })?),
        None => None,
    };

    Ok(AuditRecord {
        id: row.get("id")?,
        entity_name: row.get("entity_name")?,
        entity_id: row.get("entity_id")?,
        action,
        values,
        created_by,
        created_at: row.get("created_at")?,
    })
}

fn action_to_db(action: AuditAction) -> &'static str {
    match action {
        AuditAction::Create => "create",
        AuditAction::Update => "update",
        AuditAction::Delete => "delete",
    }
}

fn parse_action(value: &str) -> Option<AuditAction> {
    match value {
        "create" => Some(AuditAction::Create),
        "update" => Some(AuditAction::Update),
        "delete" => Some(AuditAction::Delete),
        _ => None,
    }
}

fn ensure_audit_connection_ready(conn: &Connection) -> RepoResult<()> {
    if !table_exists(conn, "audit_log")? {
        return Err(RepoError::MissingRequiredTable("audit_log"));
    }

    for column in [
        "id",
        "entity_name",
        "entity_id",
        "action",
        "values_json",
        "created_by",
        "created_at",
    ] {
        if !table_has_column(conn, "audit_log", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "audit_log",
                column,
            });
        }
    }

    Ok(())
}
