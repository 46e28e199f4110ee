use rusqlite::types::Value;
use serde::Serialize;
use thiserror::Error;

use crate::search::sorting::{SortOption, SortOptionRegistry};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("unknown sort option `{0}`")]
    UnknownSortOption(String),
    #[error("limit must be between 1 and {}", i64::MAX)]
    InvalidLimit,
    #[error("page {0} is out of range for the requested limit")]
    InvalidPage(usize),
}

/// A dashboard search request.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// Case-insensitive substring of the title; blank matches everything.
    pub query: String,
    /// Every tag listed must be present.
    pub tags: Vec<String>,
    pub folder: Option<String>,
    /// Sort option name; falls back to the configured default.
    pub sort: Option<String>,
    pub limit: usize,
    /// 1-based.
    pub page: usize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            tags: Vec::new(),
            folder: None,
            sort: None,
            limit: 50,
            page: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub id: i64,
    pub uid: String,
    pub title: String,
    pub folder: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_meta: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_meta_name: Option<String>,
}

/// SQL plus bound parameters, ready for the storage layer.
#[derive(Debug, Clone)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Value>,
    /// Name of the sort option that ordered this query.
    pub sort: String,
    /// Label attached to each hit's `sort_meta`, when one is selected.
    pub meta_name: Option<String>,
}

/// Find the sort option for `query`, using `default_sort` when the query
/// names none.
pub fn resolve_sort(
    registry: &SortOptionRegistry,
    query: &SearchQuery,
    default_sort: &str,
) -> Result<SortOption, SearchError> {
    let name = query.sort.as_deref().unwrap_or(default_sort);
    registry
        .get(name)
        .ok_or_else(|| SearchError::UnknownSortOption(name.to_string()))
}

/// Escape `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Build the ordered dashboard query for `query`.
pub fn build_sql(
    registry: &SortOptionRegistry,
    query: &SearchQuery,
    default_sort: &str,
) -> Result<BuiltQuery, SearchError> {
    let limit = i64::try_from(query.limit)
        .ok()
        .filter(|l| *l > 0)
        .ok_or(SearchError::InvalidLimit)?;
    let page = query.page.max(1);
    let offset = (page - 1)
        .checked_mul(query.limit)
        .and_then(|o| i64::try_from(o).ok())
        .ok_or(SearchError::InvalidPage(query.page))?;
    let option = resolve_sort(registry, query, default_sort)?;

    let meta_column = if option.meta_name.is_empty() {
        None
    } else {
        option.filter.iter().find_map(|f| f.meta_column())
    };

    let mut sql = format!(
        "SELECT d.id, d.uid, d.title, d.folder, {} AS sort_meta \
         FROM dashboards d WHERE 1 = 1",
        meta_column.map_or_else(|| "NULL".to_string(), |c| format!("d.{c}"))
    );
    let mut params: Vec<Value> = Vec::new();

    let needle = query.query.trim();
    if !needle.is_empty() {
        sql.push_str(" AND d.title LIKE ? ESCAPE '\\'");
        params.push(Value::Text(format!("%{}%", escape_like(needle))));
    }

    if let Some(folder) = &query.folder {
        sql.push_str(" AND d.folder = ?");
        params.push(Value::Text(folder.clone()));
    }

    for tag in &query.tags {
        sql.push_str(
            " AND EXISTS (SELECT 1 FROM dashboard_tags t WHERE t.dashboard_id = d.id AND t.term = ?)",
        );
        params.push(Value::Text(tag.clone()));
    }

    let mut terms: Vec<String> = option.filter.iter().map(|f| f.order_by()).collect();
    terms.push("d.id ASC".to_string());
    sql.push_str(" ORDER BY ");
    sql.push_str(&terms.join(", "));

    sql.push_str(" LIMIT ? OFFSET ?");
    params.push(Value::Integer(limit));
    params.push(Value::Integer(offset));

    tracing::debug!(sort = %option.name, terms = terms.len(), "search_sql_built");

    Ok(BuiltQuery {
        sql,
        params,
        sort: option.name,
        meta_name: meta_column.map(|_| option.meta_name),
    })
}
