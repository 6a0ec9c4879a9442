//! Epic repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Mediate all reads/writes of epic records for core callers.
//! - Keep filter-to-criteria translation and SQL details inside the
//!   persistence boundary.
//!
//! # Invariants
//! - Every read path returns records with `assign_case` expanded.
//! - `create_epic` stamps `created_by`/`updated_by` from the acting user and
//!   returns the freshly re-read record, never the raw insert input.
//! - `destroy_epic` appends exactly one delete audit entry, whether or not a
//!   matching row existed.

use crate::context::RequestContext;
use crate::db::DbError;
use crate::model::audit::{AuditAction, AuditEntry};
use crate::model::epic::{AutocompleteHit, CaseRef, EpicId, EpicRecord, Gender, NewEpic};
use crate::repo::audit_repo::{AuditLogRepository, SqliteAuditLogRepository};
use crate::repo::query::{contains_pattern, parse_epic_id, parse_order_by, OrderBy};
use crate::repo::{table_exists, table_has_column};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Entity type name recorded in audit entries for epics.
pub const EPIC_ENTITY_NAME: &str = "epic";

const EPIC_SELECT_SQL: &str = "SELECT
    e.uuid,
    e.name,
    e.gender,
    e.phone,
    e.birthdate,
    e.assign_case,
    c.name AS assign_case_name,
    e.created_at,
    e.updated_at,
    e.created_by,
    e.updated_by
FROM epics e
LEFT JOIN cases c ON c.uuid = e.assign_case";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// A mutation required an acting user and none was resolved.
    MissingCurrentUser,
    /// External id string does not normalize to a store identifier.
    InvalidId(String),
    /// Order-by string is malformed or names a non-sortable field.
    InvalidOrderBy(String),
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
    /// Required table is missing from the connection's schema.
    MissingRequiredTable(&'static str),
    /// Required column is missing from an expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingCurrentUser => {
                write!(f, "operation requires a resolved current user")
            }
            Self::InvalidId(value) => write!(f, "invalid entity id `{value}`"),
            Self::InvalidOrderBy(value) => write!(f, "invalid order-by value `{value}`"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Independent two-sided range bound, inclusive on both ends.
///
/// Either, both, or neither bound may be set; an unset bound imposes no
/// constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// Epoch milliseconds, "on or after".
    pub start: Option<i64>,
    /// Epoch milliseconds, "on or before".
    pub end: Option<i64>,
}

impl DateRange {
    pub fn starting_at(start: i64) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    pub fn between(start: i64, end: i64) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }
}

/// Structured field-level filter for epic listing.
///
/// Absent or empty fields impose no constraint; present fields are combined
/// with logical AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpicFilter {
    /// Exact identifier match, normalized before use.
    pub id: Option<String>,
    /// Case-insensitive literal substring match on the name.
    pub name: Option<String>,
    pub birthdate_range: DateRange,
    /// Exact gender match.
    pub gender: Option<Gender>,
    /// Case-insensitive literal substring match on the phone.
    pub phone: Option<String>,
    pub created_at_range: DateRange,
}

/// Query options for the principal list operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpicListQuery {
    pub filter: EpicFilter,
    /// Maximum rows to return; `0` means unbounded.
    pub limit: u32,
    /// Rows to skip; `0` means no skip.
    pub offset: u32,
    /// `field_ASC`/`field_DESC` sort string. Defaults to `createdAt_DESC`.
    pub order_by: Option<String>,
}

/// One page of matching epics plus the total over the full matching set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpicPage {
    pub rows: Vec<EpicRecord>,
    /// Cardinality of the matching set, independent of limit/offset.
    pub total: u64,
}

/// Store-native criteria passed through verbatim by [`EpicRepository::count_epics`].
///
/// `where_sql` may reference epic columns directly or through the `e` alias.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCriteria {
    pub where_sql: String,
    pub binds: Vec<Value>,
}

/// Repository interface for epic data access.
pub trait EpicRepository {
    /// Creates one epic stamped with the acting user and returns the
    /// freshly read, association-expanded record.
    fn create_epic(&self, new: &NewEpic, ctx: &RequestContext) -> RepoResult<EpicRecord>;
    /// Deletes by id, ignoring absence, and appends one delete audit entry.
    fn destroy_epic(&self, id: EpicId, ctx: &RequestContext) -> RepoResult<()>;
    /// Counts epics matching a raw store-native criteria passthrough.
    fn count_epics(&self, filter: Option<&RawCriteria>) -> RepoResult<u64>;
    /// Gets one epic by id, `None` when absent.
    fn get_epic(&self, id: EpicId) -> RepoResult<Option<EpicRecord>>;
    /// Lists one page of matching epics together with the full-set total.
    fn list_epics(&self, query: &EpicListQuery) -> RepoResult<EpicPage>;
    /// Lightweight `{id, label}` lookup for suggestion lists.
    fn autocomplete_epics(&self, search: &str, limit: u32) -> RepoResult<Vec<AutocompleteHit>>;
}

/// SQLite-backed epic repository.
///
/// Borrows the caller's connection; pass a `rusqlite::Transaction` to make
/// every call part of the caller's atomic unit.
pub struct SqliteEpicRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEpicRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_epic_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl EpicRepository for SqliteEpicRepository<'_> {
    fn create_epic(&self, new: &NewEpic, ctx: &RequestContext) -> RepoResult<EpicRecord> {
        let user = ctx.current_user.as_ref().ok_or(RepoError::MissingCurrentUser)?;
        let id = Uuid::new_v4();

        self.conn.execute(
            "INSERT INTO epics (
                uuid,
                name,
                gender,
                phone,
                birthdate,
                assign_case,
                created_by,
                updated_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7);",
            params![
                id.to_string(),
                new.name.as_str(),
                new.gender.map(gender_to_db),
                new.phone.as_deref(),
                new.birthdate,
                new.assign_case.map(|case| case.to_string()),
                user.id.to_string(),
            ],
        )?;

        // Return the re-read record so the association is expanded and the
        // store-assigned timestamps are visible.
        self.get_epic(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("created epic `{id}` missing on re-read"))
        })
    }

    fn destroy_epic(&self, id: EpicId, ctx: &RequestContext) -> RepoResult<()> {
        // No existence check: deleting an absent id is a silent no-op, but
        // the audit entry is appended either way.
        self.conn
            .execute("DELETE FROM epics WHERE uuid = ?1;", [id.to_string()])?;

        let audit = SqliteAuditLogRepository::try_new(self.conn)?;
        audit.append(&AuditEntry {
            entity_name: EPIC_ENTITY_NAME.to_string(),
            entity_id: id.to_string(),
            action: AuditAction::Delete,
            values: None,
            created_by: ctx.current_user.as_ref().map(|user| user.id),
        })?;

        Ok(())
    }

    fn count_epics(&self, filter: Option<&RawCriteria>) -> RepoResult<u64> {
        let mut sql = String::from("SELECT COUNT(*) FROM epics e");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(criteria) = filter {
            if !criteria.where_sql.trim().is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&criteria.where_sql);
                bind_values.extend(criteria.binds.iter().cloned());
            }
        }

        let count: u64 = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), |row| row.get(0))?;
        Ok(count)
    }

    fn get_epic(&self, id: EpicId) -> RepoResult<Option<EpicRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EPIC_SELECT_SQL} WHERE e.uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_epic_row(row)?));
        }

        Ok(None)
    }

    fn list_epics(&self, query: &EpicListQuery) -> RepoResult<EpicPage> {
        let (where_sql, bind_values) = build_filter_criteria(&query.filter)?;

        // Full-set total under the same criteria, never limited/offset.
        let mut count_sql = String::from("SELECT COUNT(*) FROM epics e");
        if !where_sql.is_empty() {
            count_sql.push_str(" WHERE ");
            count_sql.push_str(&where_sql);
        }
        let total: u64 = self.conn.query_row(
            &count_sql,
            params_from_iter(bind_values.iter().cloned()),
            |row| row.get(0),
        )?;

        let order = match query.order_by.as_deref() {
            Some(raw) => parse_order_by(raw)?,
            None => OrderBy::default(),
        };

        let mut sql = String::from(EPIC_SELECT_SQL);
        if !where_sql.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(order.column);
        sql.push(' ');
        sql.push_str(order.direction.as_sql());
        sql.push_str(", e.uuid ASC");

        let mut page_binds = bind_values;
        if query.limit > 0 {
            sql.push_str(" LIMIT ?");
            page_binds.push(Value::Integer(i64::from(query.limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                page_binds.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            page_binds.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(page_binds))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_epic_row(row)?);
        }

        Ok(EpicPage {
            rows: records,
            total,
        })
    }

    fn autocomplete_epics(&self, search: &str, limit: u32) -> RepoResult<Vec<AutocompleteHit>> {
        let mut sql = String::from("SELECT uuid, name FROM epics");
        let mut bind_values: Vec<Value> = Vec::new();

        let trimmed = search.trim();
        if !trimmed.is_empty() {
            // The search term matches the id only when it parses as one;
            // otherwise name containment alone applies.
            if let Ok(id) = Uuid::parse_str(trimmed) {
                sql.push_str(" WHERE (uuid = ? OR name LIKE ? ESCAPE '\\')");
                bind_values.push(Value::Text(id.to_string()));
                bind_values.push(Value::Text(contains_pattern(trimmed)));
            } else {
                sql.push_str(" WHERE name LIKE ? ESCAPE '\\'");
                bind_values.push(Value::Text(contains_pattern(trimmed)));
            }
        }

        sql.push_str(" ORDER BY name COLLATE NOCASE ASC, uuid ASC");
        if limit > 0 {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut hits = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get("uuid")?;
            hits.push(AutocompleteHit {
                id: parse_stored_uuid(&uuid_text, "epics.uuid")?,
                label: row.get("name")?,
            });
        }

        Ok(hits)
    }
}

/// Translates the structured filter into an AND-combined WHERE clause.
fn build_filter_criteria(filter: &EpicFilter) -> RepoResult<(String, Vec<Value>)> {
    let mut clauses: Vec<&'static str> = Vec::new();
    let mut bind_values: Vec<Value> = Vec::new();

    if let Some(id) = non_empty(filter.id.as_deref()) {
        let parsed = parse_epic_id(id)?;
        clauses.push("e.uuid = ?");
        bind_values.push(Value::Text(parsed.to_string()));
    }

    if let Some(name) = non_empty(filter.name.as_deref()) {
        clauses.push("e.name LIKE ? ESCAPE '\\'");
        bind_values.push(Value::Text(contains_pattern(name)));
    }

    if let Some(start) = filter.birthdate_range.start {
        clauses.push("e.birthdate >= ?");
        bind_values.push(Value::Integer(start));
    }
    if let Some(end) = filter.birthdate_range.end {
        clauses.push("e.birthdate <= ?");
        bind_values.push(Value::Integer(end));
    }

    if let Some(gender) = filter.gender {
        clauses.push("e.gender = ?");
        bind_values.push(Value::Text(gender_to_db(gender).to_string()));
    }

    if let Some(phone) = non_empty(filter.phone.as_deref()) {
        clauses.push("e.phone LIKE ? ESCAPE '\\'");
        bind_values.push(Value::Text(contains_pattern(phone)));
    }

    if let Some(start) = filter.created_at_range.start {
        clauses.push("e.created_at >= ?");
        bind_values.push(Value::Integer(start));
    }
    if let Some(end) = filter.created_at_range.end {
        clauses.push("e.created_at <= ?");
        bind_values.push(Value::Integer(end));
    }

    Ok((clauses.join(" AND "), bind_values))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.is_empty())
}

fn parse_epic_row(row: &Row<'_>) -> RepoResult<EpicRecord> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_stored_uuid(&uuid_text, "epics.uuid")?;

    let gender = match row.get::<_, Option<String>>("gender")? {
        Some(value) => Some(parse_gender(&value).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid gender `{value}` in epics.gender"))
        })?),
        None => None,
    };

    let assign_case = match row.get::<_, Option<String>>("assign_case")? {
        Some(case_uuid) => {
            let case_id = parse_stored_uuid(&case_uuid, "epics.assign_case")?;
            let name: Option<String> = row.get("assign_case_name")?;
            let name = name.ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "assign_case `{case_uuid}` has no matching case row"
                ))
            })?;
            Some(CaseRef { id: case_id, name })
        }
        None => None,
    };

    let created_by_text: String = row.get("created_by")?;
    let updated_by_text: String = row.get("updated_by")?;

    Ok(EpicRecord {
        id,
        name: row.get("name")?,
        gender,
        phone: row.get("phone")?,
        birthdate: row.get("birthdate")?,
        assign_case,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        created_by: parse_stored_uuid(&created_by_text, "epics.created_by")?,
        updated_by: parse_stored_uuid(&updated_by_text, "epics.updated_by")?,
    })
}

fn parse_stored_uuid(value: &str, location: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {location}")))
}

pub(crate) fn gender_to_db(gender: Gender) -> &'static str {
    match gender {
        Gender::Male => "male",
        Gender::Female => "female",
        Gender::Other => "other",
    }
}

fn parse_gender(value: &str) -> Option<Gender> {
    match value {
        "male" => Some(Gender::Male),
        "female" => Some(Gender::Female),
        "other" => Some(Gender::Other),
        _ => None,
    }
}

fn ensure_epic_connection_ready(conn: &Connection) -> RepoResult<()> {
    for table in ["epics", "cases"] {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    for column in [
        "uuid",
        "name",
        "gender",
        "phone",
        "birthdate",
        "assign_case",
        "created_at",
        "updated_at",
        "created_by",
        "updated_by",
    ] {
        if !table_has_column(conn, "epics", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "epics",
                column,
            });
        }
    }

    Ok(())
}
