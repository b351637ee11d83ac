//! Page-based listing: query parameters, resolved parameters and the response page

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::catalog::{blank_to_none, CatalogEntity};
use crate::error::{AppResult, FieldErrors};

pub const DEFAULT_SORT_FIELD: &str = "updated_at";

/// List query parameters accepted by every catalog list endpoint
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListQuery {
    /// Substring matched against the entity's primary text column
    pub keyword: Option<String>,
    /// Column to sort by (default: updated_at)
    pub sort_field: Option<String>,
    /// ASC or DESC (default: DESC)
    pub sort_order: Option<String>,
    /// Page size
    pub limit: Option<i64>,
    /// Page number, starting at 1
    pub page: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(SortOrder::Asc),
            "DESC" => Ok(SortOrder::Desc),
            other => Err(format!("Invalid sort order: {}", other)),
        }
    }
}

/// List parameters after defaults and the sort allow-list were applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub keyword: Option<String>,
    /// Always one of the entity's sortable columns
    pub sort_field: &'static str,
    pub sort_order: SortOrder,
    pub limit: i64,
    pub page: i64,
}

impl ListParams {
    /// Rows to skip; saturates so a huge page number reads past the end
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// ILIKE pattern for the keyword, with `%`, `_` and `\` matched literally
    pub fn keyword_pattern(&self) -> Option<String> {
        self.keyword.as_deref().map(like_pattern)
    }
}

impl ListQuery {
    /// Apply per-entity defaults and reject sort columns outside the entity's allow-list
    pub fn resolve<E: CatalogEntity>(&self, max_page_size: i64) -> AppResult<ListParams> {
        let mut errors = FieldErrors::new();

        let requested_field = blank_to_none(self.sort_field.clone());
        let sort_field = match requested_field.as_deref() {
            None => DEFAULT_SORT_FIELD,
            Some(field) => match E::SORTABLE.iter().find(|allowed| **allowed == field) {
                Some(allowed) => *allowed,
                None => {
                    errors.add("sort_field", "The selected sort field is invalid.");
                    DEFAULT_SORT_FIELD
                }
            },
        };

        let sort_order = match blank_to_none(self.sort_order.clone()) {
            None => SortOrder::Desc,
            Some(order) => order.parse().unwrap_or_else(|_| {
                errors.add("sort_order", "The selected sort order is invalid.");
                SortOrder::Desc
            }),
        };

        errors.into_result()?;

        let limit = match self.limit {
            Some(limit) if limit >= 1 => limit.min(max_page_size.max(1)),
            _ => E::DEFAULT_LIMIT,
        };

        Ok(ListParams {
            keyword: blank_to_none(self.keyword.clone()),
            sort_field,
            sort_order,
            limit,
            page: self.page.filter(|p| *p >= 1).unwrap_or(1),
        })
    }
}

pub fn like_pattern(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len() + 2);
    escaped.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Number of the last page, never less than 1
pub fn last_page(total: i64, per_page: i64) -> i64 {
    if per_page <= 0 {
        return 1;
    }
    ((total + per_page - 1) / per_page).max(1)
}

/// Pagination metadata returned alongside a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageMeta {
    pub current_page: i64,
    pub per_page: i64,
    /// Position of the first record on this page (1-based), absent on an empty page
    pub from: Option<i64>,
    /// Position of the last record on this page, absent on an empty page
    pub to: Option<i64>,
    pub total: i64,
    pub last_page: i64,
}

impl PageMeta {
    pub fn new(params: &ListParams, total: i64, count: usize) -> Self {
        let (from, to) = if count == 0 {
            (None, None)
        } else {
            let from = params.offset() + 1;
            (Some(from), Some(from + count as i64 - 1))
        };

        Self {
            current_page: params.page,
            per_page: params.limit,
            from,
            to,
            total,
            last_page: last_page(total, params.limit),
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    AuthorPage = Page<super::Author>,
    GenrePage = Page<super::Genre>,
    BookPage = Page<super::BookResource>
)]
pub struct Page<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub fn new(data: Vec<T>, params: &ListParams, total: i64) -> Self {
        let meta = PageMeta::new(params, total, data.len());
        Self { data, meta }
    }
}
