//! Construction of the owner-scoped todo list query.
//!
//! Raw query-string values arrive as optional strings and are turned into a
//! [`TodoQuery`] here, before any store is touched:
//!
//! - `skip` and `limit` go through [`parse_or_default`]: anything that is not an
//!   integer counts as absent. Negative values are clamped to zero.
//! - `sort` is a list of keys such as `-createdAt title`. An unknown field is a
//!   client error, since the value ends up in an `ORDER BY` clause.
//! - `search` becomes a case-insensitive substring condition on the title.
//!
//! Stores apply the sort first, then `skip`, then `limit`.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;

pub const DEFAULT_SKIP: i64 = 0;
pub const DEFAULT_LIMIT: i64 = 10;
pub const DEFAULT_SORT: &str = "-createdAt";

lazy_static! {
    // Optional direction prefix followed by a field name.
    static ref SORT_KEY_REGEX: Regex = Regex::new(r"^([+-]?)([A-Za-z_]+)$").unwrap();
}

/// Query string of `GET /api/todos` as received. Every field is optional and
/// left unparsed so that a bad value never fails extraction.
#[derive(Debug, Default, Deserialize)]
pub struct ListTodosParams {
    pub skip: Option<String>,
    pub limit: Option<String>,
    pub sort: Option<String>,
    pub search: Option<String>,
}

/// Parses `raw` as an integer, falling back to `default` when it is absent,
/// blank or not a number.
pub fn parse_or_default(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    Title,
    Completed,
}

impl SortField {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "createdAt" | "created_at" => Some(SortField::CreatedAt),
            "title" => Some(SortField::Title),
            "completed" => Some(SortField::Completed),
            _ => None,
        }
    }

    /// Column name in the `todos` table.
    pub fn column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::Title => "title",
            SortField::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn keyword(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub direction: SortDirection,
}

/// Ordered list of sort keys; earlier keys take precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoSort(pub Vec<SortKey>);

impl TodoSort {
    /// Parses a specification like `"-createdAt"` or `"completed -title"`.
    /// Keys may be separated by whitespace or commas.
    pub fn parse(spec: &str) -> Result<Self, AppError> {
        let mut keys = Vec::new();
        for token in spec
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
        {
            let captures = SORT_KEY_REGEX
                .captures(token)
                .ok_or_else(|| AppError::BadRequest(format!("Invalid sort key: {}", token)))?;
            let field = SortField::parse(&captures[2])
                .ok_or_else(|| AppError::BadRequest(format!("Cannot sort by: {}", &captures[2])))?;
            let direction = if &captures[1] == "-" {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            keys.push(SortKey { field, direction });
        }
        if keys.is_empty() {
            return Ok(Self::default());
        }
        Ok(Self(keys))
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.0
    }
}

/// Newest first.
impl Default for TodoSort {
    fn default() -> Self {
        Self(vec![SortKey {
            field: SortField::CreatedAt,
            direction: SortDirection::Descending,
        }])
    }
}

/// Conditions a todo must meet to be listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoFilter {
    /// Always present: listing never crosses owners.
    pub owner: Uuid,
    /// Case-insensitive literal substring of the title.
    pub title_contains: Option<String>,
}

impl TodoFilter {
    pub fn for_owner(owner: Uuid) -> Self {
        Self {
            owner,
            title_contains: None,
        }
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.title_contains = Some(term.into());
        self
    }
}

/// A complete page request against the task store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoQuery {
    pub filter: TodoFilter,
    pub sort: TodoSort,
    pub skip: u64,
    pub limit: u64,
}

impl TodoQuery {
    /// Builds the query for `owner` from raw query-string parameters.
    pub fn from_params(owner: Uuid, params: &ListTodosParams) -> Result<Self, AppError> {
        let skip = parse_or_default(params.skip.as_deref(), DEFAULT_SKIP);
        let limit = parse_or_default(params.limit.as_deref(), DEFAULT_LIMIT);

        let sort = match params.sort.as_deref().map(str::trim) {
            Some(spec) if !spec.is_empty() => TodoSort::parse(spec)?,
            _ => TodoSort::default(),
        };

        let mut filter = TodoFilter::for_owner(owner);
        if let Some(term) = params.search.as_deref().filter(|term| !term.is_empty()) {
            filter = filter.with_search(term);
        }

        Ok(Self {
            filter,
            sort,
            skip: clamp_non_negative(skip),
            limit: clamp_non_negative(limit),
        })
    }
}

fn clamp_non_negative(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

/// Escapes `%`, `_` and `\` so `term` matches literally inside a LIKE pattern,
/// and wraps it for a substring match.
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn params(skip: Option<&str>, limit: Option<&str>, sort: Option<&str>) -> ListTodosParams {
        ListTodosParams {
            skip: skip.map(String::from),
            limit: limit.map(String::from),
            sort: sort.map(String::from),
            search: None,
        }
    }

    #[test]
    fn test_parse_or_default() {
        assert_eq!(parse_or_default(None, 10), 10);
        assert_eq!(parse_or_default(Some("25"), 10), 25);
        assert_eq!(parse_or_default(Some(" 7 "), 10), 7);
        assert_eq!(parse_or_default(Some("abc"), 10), 10);
        assert_eq!(parse_or_default(Some("10abc"), 10), 10);
        assert_eq!(parse_or_default(Some(""), 0), 0);
        assert_eq!(parse_or_default(Some("-3"), 0), -3);
    }

    #[test]
    fn test_defaults_applied() {
        let owner = Uuid::new_v4();
        let query = TodoQuery::from_params(owner, &ListTodosParams::default()).unwrap();

        assert_eq!(query.skip, 0);
        assert_eq!(query.limit, 10);
        assert_eq!(query.sort, TodoSort::default());
        assert_eq!(query.filter, TodoFilter::for_owner(owner));
    }

    #[test]
    fn test_garbled_pagination_falls_back_to_defaults() {
        let query =
            TodoQuery::from_params(Uuid::new_v4(), &params(Some("x"), Some("ten"), None)).unwrap();
        assert_eq!((query.skip, query.limit), (0, 10));
    }

    #[test]
    fn test_negative_pagination_is_clamped() {
        let query =
            TodoQuery::from_params(Uuid::new_v4(), &params(Some("-5"), Some("-1"), None)).unwrap();
        assert_eq!((query.skip, query.limit), (0, 0));
    }

    #[test]
    fn test_sort_parsing() {
        let sort = TodoSort::parse("completed, -title").unwrap();
        assert_eq!(
            sort.keys(),
            &[
                SortKey {
                    field: SortField::Completed,
                    direction: SortDirection::Ascending
                },
                SortKey {
                    field: SortField::Title,
                    direction: SortDirection::Descending
                },
            ]
        );

        let sort = TodoSort::parse("+created_at").unwrap();
        assert_eq!(sort.keys()[0].field, SortField::CreatedAt);
        assert_eq!(sort.keys()[0].direction, SortDirection::Ascending);

        assert_eq!(TodoSort::parse("  ").unwrap(), TodoSort::default());
    }

    #[test]
    fn test_sort_rejects_unknown_fields() {
        assert!(matches!(
            TodoSort::parse("password"),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            TodoSort::parse("title; DROP TABLE todos"),
            Err(AppError::BadRequest(_))
        ));
        assert!(TodoQuery::from_params(Uuid::new_v4(), &params(None, None, Some("--title"))).is_err());
    }

    #[test]
    fn test_empty_search_is_ignored() {
        let mut raw = ListTodosParams::default();
        raw.search = Some(String::new());
        let query = TodoQuery::from_params(Uuid::new_v4(), &raw).unwrap();
        assert_eq!(query.filter.title_contains, None);

        raw.search = Some("Foo".into());
        let query = TodoQuery::from_params(Uuid::new_v4(), &raw).unwrap();
        assert_eq!(query.filter.title_contains.as_deref(), Some("Foo"));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("foo"), "%foo%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }
}
