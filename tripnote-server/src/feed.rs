//! Translates feed query parameters into a single SQL statement.
//!
//! Filters are conjunctive. `search` is itself an OR across the content and
//! location name columns. Soft-deleted posts never match.

use rusqlite::types::Value;
use serde::Deserialize;
use uuid::Uuid;

use tripnote_types::AgeGroup;

use crate::db::repositories::POST_COLUMNS;
use crate::db::UNICODE_LOWER_FN;

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Raw query string of `GET /api/posts`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedParams {
    pub search: Option<String>,
    pub tag: Option<String>,
    pub age_group: Option<String>,
    #[serde(rename = "type")]
    pub feed_type: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FeedFilterError {
    #[error("Unknown age group: {0}")]
    AgeGroup(String),
    #[error("page must be a positive integer")]
    Page,
    #[error("limit must be an integer between 1 and {MAX_LIMIT}")]
    Limit,
}

/// Validated feed filter
#[derive(Debug, Clone, PartialEq)]
pub struct FeedFilter {
    pub search: Option<String>,
    pub tag: Option<String>,
    pub age_group: Option<AgeGroup>,
    pub following_only: bool,
    pub page: u32,
    pub limit: u32,
}

impl Default for FeedFilter {
    fn default() -> Self {
        Self {
            search: None,
            tag: None,
            age_group: None,
            following_only: false,
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn positive(value: Option<String>, default: u32) -> Option<u32> {
    match present(value) {
        None => Some(default),
        Some(raw) => raw.trim().parse::<u32>().ok().filter(|n| *n >= 1),
    }
}

impl FeedFilter {
    pub fn from_params(params: FeedParams) -> Result<Self, FeedFilterError> {
        let age_group = match present(params.age_group) {
            Some(raw) => Some(AgeGroup::parse(&raw).ok_or(FeedFilterError::AgeGroup(raw))?),
            None => None,
        };
        let page = positive(params.page, 1).ok_or(FeedFilterError::Page)?;
        let limit = positive(params.limit, DEFAULT_LIMIT)
            .filter(|n| *n <= MAX_LIMIT)
            .ok_or(FeedFilterError::Limit)?;

        Ok(Self {
            search: present(params.search),
            tag: present(params.tag),
            age_group,
            following_only: params.feed_type.as_deref() == Some("following"),
            page,
            limit,
        })
    }

    pub fn offset(&self) -> u32 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// SQL text plus positional parameters, ready for `params_from_iter`
#[derive(Debug, Clone)]
pub struct FeedQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Escape LIKE wildcards so the search term matches literally
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Build the listing query.
///
/// `following` carries the ids the requester follows when the feed is
/// restricted to them. Returns `None` when that list is empty: the result is
/// known to be empty and the post table need not be queried.
pub fn compose(filter: &FeedFilter, following: Option<&[Uuid]>) -> Option<FeedQuery> {
    let mut joins = String::new();
    let mut conditions = vec!["p.is_deleted = 0".to_string()];
    let mut params: Vec<Value> = Vec::new();

    if let Some(tag) = &filter.tag {
        joins.push_str(
            " JOIN post_tags pt ON pt.post_id = p.id JOIN tags t ON t.id = pt.tag_id",
        );
        conditions.push("t.name = ?".to_string());
        params.push(Value::Text(tag.clone()));
    }

    if let Some(age_group) = filter.age_group {
        joins.push_str(" JOIN profiles pr ON pr.user_id = p.author_id");
        conditions.push("pr.age_group = ?".to_string());
        params.push(Value::Text(age_group.as_str().to_string()));
    }

    if let Some(search) = &filter.search {
        conditions.push(format!(
            "({UNICODE_LOWER_FN}(p.content) LIKE ? ESCAPE '\\' \
             OR {UNICODE_LOWER_FN}(p.location_name) LIKE ? ESCAPE '\\')"
        ));
        let pattern = like_pattern(&search.to_lowercase());
        params.push(Value::Text(pattern.clone()));
        params.push(Value::Text(pattern));
    }

    if let Some(ids) = following {
        if ids.is_empty() {
            return None;
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        conditions.push(format!("p.author_id IN ({placeholders})"));
        params.extend(ids.iter().map(|id| Value::Text(id.to_string())));
    }

    let sql = format!(
        "SELECT {POST_COLUMNS}
         FROM posts p
         JOIN users u ON u.id = p.author_id{joins}
         WHERE {}
         ORDER BY p.created_at DESC, p.rowid DESC
         LIMIT ? OFFSET ?",
        conditions.join(" AND ")
    );
    params.push(Value::Integer(i64::from(filter.limit)));
    params.push(Value::Integer(i64::from(filter.offset())));

    Some(FeedQuery { sql, params })
}
