//! Query utility helpers shared by repository implementations.
//!
//! # Responsibility
//! - Normalize external id strings into store-native identifiers.
//! - Escape free-text filter input so it matches literally inside `LIKE`.
//! - Translate `field_ASC`/`field_DESC` order strings into sort directives.
//!
//! # Invariants
//! - Sort columns are resolved against a fixed whitelist; caller input is
//!   never interpolated into SQL.

use crate::model::epic::EpicId;
use crate::repo::epic_repo::RepoError;
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

static ORDER_BY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]+)_(ASC|DESC)$").expect("valid order-by regex"));

/// Sort direction parsed from an order-by string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Resolved sort directive over a whitelisted epic column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    /// Qualified column name, safe to splice into SQL.
    pub column: &'static str,
    pub direction: SortDirection,
}

impl Default for OrderBy {
    /// Default list order: creation timestamp, newest first.
    fn default() -> Self {
        Self {
            column: "e.created_at",
            direction: SortDirection::Desc,
        }
    }
}

/// Normalizes an external id string into the store's identifier type.
pub fn parse_epic_id(value: &str) -> Result<EpicId, RepoError> {
    Uuid::parse_str(value.trim()).map_err(|_| RepoError::InvalidId(value.to_string()))
}

/// Escapes `LIKE` metacharacters so user text matches only literally.
///
/// Patterns built from the result must carry `ESCAPE '\'`.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Builds a `%text%` containment pattern with all metacharacters escaped.
pub fn contains_pattern(input: &str) -> String {
    format!("%{}%", escape_like(input))
}

/// Parses an `field_ASC`/`field_DESC` order string into a sort directive.
///
/// # Errors
/// Returns [`RepoError::InvalidOrderBy`] for malformed strings and for
/// fields outside the sortable-column whitelist.
pub fn parse_order_by(raw: &str) -> Result<OrderBy, RepoError> {
    let captures = ORDER_BY_RE
        .captures(raw.trim())
        .ok_or_else(|| RepoError::InvalidOrderBy(raw.to_string()))?;

    let column = sortable_column(&captures[1])
        .ok_or_else(|| RepoError::InvalidOrderBy(raw.to_string()))?;
    let direction = match &captures[2] {
        "ASC" => SortDirection::Asc,
        _ => SortDirection::Desc,
    };

    Ok(OrderBy { column, direction })
}

fn sortable_column(field: &str) -> Option<&'static str> {
    match field {
        "id" => Some("e.uuid"),
        "name" => Some("e.name"),
        "gender" => Some("e.gender"),
        "phone" => Some("e.phone"),
        "birthdate" => Some("e.birthdate"),
        "createdAt" => Some("e.created_at"),
        "updatedAt" => Some("e.updated_at"),
        _ => None,
    }
}
