//! Sort specs, page windows and the pagination wire contract

use crate::core::error::{FilterError, WindowError};
use crate::core::filter::Filter;
use crate::core::row::Product;
use serde::{Deserialize, Serialize};

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[serde(alias = "ASC", alias = "ascending")]
    Asc,
    #[serde(alias = "DESC", alias = "descending")]
    Desc,
}

impl SortDirection {
    /// Parse a direction leniently (`asc`, `DESC`, `-1`, ...)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" | "1" => Some(SortDirection::Asc),
            "desc" | "descending" | "-1" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Column and direction a listing is ordered by
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    pub fn asc(column: impl Into<String>) -> Self {
        Self::new(column, SortDirection::Asc)
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self::new(column, SortDirection::Desc)
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::asc(Product::DEFAULT_SORT_COLUMN)
    }
}

/// A one-based page of `limit` rows
///
/// Values are signed so that out-of-range windows from the wire can be
/// represented and rejected with [`WindowError`] instead of failing to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageWindow {
    pub page: i64,
    pub limit: i64,
}

impl PageWindow {
    pub fn new(page: i64, limit: i64) -> Self {
        Self { page, limit }
    }

    /// Check the window and return its offset, `(page - 1) * limit`
    pub fn skip(&self) -> Result<u64, WindowError> {
        if self.page < 1 {
            return Err(WindowError::InvalidPage { page: self.page });
        }
        if self.limit < 1 {
            return Err(WindowError::InvalidLimit { limit: self.limit });
        }
        (self.page - 1)
            .checked_mul(self.limit)
            .map(|skip| skip as u64)
            .ok_or(WindowError::Overflow {
                page: self.page,
                limit: self.limit,
            })
    }

    /// Like [`skip`](Self::skip) but also enforces a maximum limit
    pub fn skip_within(&self, max_limit: i64) -> Result<u64, WindowError> {
        let skip = self.skip()?;
        if self.limit > max_limit {
            return Err(WindowError::LimitTooLarge {
                limit: self.limit,
                max: max_limit,
            });
        }
        Ok(skip)
    }

    pub fn previous(&self) -> Self {
        Self::new(self.page - 1, self.limit)
    }

    pub fn next(&self) -> Self {
        Self::new(self.page + 1, self.limit)
    }
}

/// One page of rows plus the total match count and navigation hints
///
/// `previous` is set iff the window skips rows; `next` is set iff rows remain
/// after this page. Both are derived in [`PageResult::assemble`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub previous: Option<PageWindow>,
    pub next: Option<PageWindow>,
}

impl<T> PageResult<T> {
    /// Build a page from a store read.
    ///
    /// `items` is truncated to `window.limit`. The window must already have
    /// been checked with [`PageWindow::skip`].
    pub fn assemble(mut items: Vec<T>, total: u64, window: PageWindow, skip: u64) -> Self {
        items.truncate(window.limit.max(0) as usize);
        let seen = skip + items.len() as u64;

        Self {
            previous: (skip > 0).then(|| window.previous()),
            next: (seen < total).then(|| window.next()),
            items,
            total,
        }
    }
}

/// Pagination request as sent by browse clients
///
/// The filter travels as a typed value. `query` is the legacy form, a
/// pre-serialized Mongo-style predicate string; it is parsed into the same
/// typed filter and may not be combined with `filter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub page: i64,

    pub limit: i64,

    #[serde(default = "default_sort_column")]
    pub sort_column: String,

    #[serde(default)]
    pub sort_order: SortDirection,

    #[serde(default)]
    pub filter: Filter,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

fn default_sort_column() -> String {
    Product::DEFAULT_SORT_COLUMN.to_string()
}

impl PageRequest {
    pub fn new(window: PageWindow, sort: &SortSpec, filter: Filter) -> Self {
        Self {
            page: window.page,
            limit: window.limit,
            sort_column: sort.column.clone(),
            sort_order: sort.direction,
            filter,
            query: None,
        }
    }

    pub fn window(&self) -> PageWindow {
        PageWindow::new(self.page, self.limit)
    }

    pub fn sort(&self) -> SortSpec {
        SortSpec::new(self.sort_column.clone(), self.sort_order)
    }

    /// The effective filter, merging the typed and legacy forms
    pub fn resolved_filter(&self) -> Result<Filter, FilterError> {
        let legacy = self
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty());

        match (legacy, &self.filter) {
            (None, filter) => Ok(filter.clone()),
            (Some(query), Filter::NoFilter) => Filter::parse_query_string(query),
            (Some(_), Filter::Predicate(_)) => Err(FilterError::Ambiguous),
        }
    }
}

/// Query string parameters for `GET` pagination
///
/// # Example
/// ```text
/// GET /products/page?page=2&limit=25&sortColumn=price&sortOrder=desc
/// GET /products/page?page=1&limit=25&query={"$or":[{"price":{"$eq":42}}]}
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQueryParams {
    #[serde(default = "default_page")]
    pub page: i64,

    #[serde(default = "default_limit")]
    pub limit: i64,

    #[serde(default = "default_sort_column")]
    pub sort_column: String,

    /// Kept as a string so unknown directions fall back to ascending
    #[serde(default)]
    pub sort_order: Option<String>,

    #[serde(default)]
    pub query: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

impl Default for PageQueryParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            sort_column: default_sort_column(),
            sort_order: None,
            query: None,
        }
    }
}

impl From<PageQueryParams> for PageRequest {
    fn from(params: PageQueryParams) -> Self {
        Self {
            page: params.page,
            limit: params.limit,
            sort_column: params.sort_column,
            sort_order: params
                .sort_order
                .as_deref()
                .and_then(SortDirection::parse)
                .unwrap_or_default(),
            filter: Filter::NoFilter,
            query: params.query,
        }
    }
}
