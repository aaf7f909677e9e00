//! List parameters, pagination metadata and paginated results
//!
//! Untrusted list input (a query string or already-split raw fields) is turned
//! into a fully resolved [`ListParams`] by [`ListParams::normalize`]. The
//! repository only ever sees resolved parameters.
//!
//! # Example
//!
//! ```rust
//! use davet_store::config::PaginationConfig;
//! use davet_store::repository::{ListParams, SortOrder};
//!
//! let defaults = PaginationConfig::default();
//! let params = ListParams::from_query("page=0&per_page=500&order_by=desc", &defaults);
//!
//! assert_eq!(params.page(), 1);
//! assert_eq!(params.per_page(), 20);
//! assert_eq!(params.sort_by(), "id");
//! assert_eq!(params.order_by(), SortOrder::Desc);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::PaginationConfig;

/// Sort direction for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending (A-Z, 0-9, oldest first)
    #[default]
    Asc,
    /// Descending (Z-A, 9-0, newest first)
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = InvalidSortOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(InvalidSortOrder(other.to_string())),
        }
    }
}

impl SortOrder {
    /// SQL keyword for ORDER BY
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Sort direction text other than `asc` or `desc`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid sort order '{0}', expected 'asc' or 'desc'")]
pub struct InvalidSortOrder(pub String);

/// Offset/limit window derived from a page number
///
/// # Example
///
/// ```rust
/// use davet_store::repository::Pagination;
///
/// let page3 = Pagination::page(3, 20);
/// assert_eq!(page3.offset, 40);
/// assert_eq!(page3.limit, 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Number of rows to skip
    pub offset: u64,
    /// Maximum number of rows to return
    pub limit: u64,
}

impl Pagination {
    /// Window for a 1-indexed page number
    #[must_use]
    pub const fn page(page_number: u64, page_size: u64) -> Self {
        Self {
            offset: page_number.saturating_sub(1) * page_size,
            limit: page_size,
        }
    }
}

/// List input as it arrives, before any bounds are applied
///
/// Every field is optional and signed so that out-of-range input such as
/// `page=-3` reaches [`ListParams::normalize`] instead of failing to parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawListParams {
    /// Requested page
    pub page: Option<i64>,
    /// Requested page size
    pub per_page: Option<i64>,
    /// Requested sort column
    pub sort_by: Option<String>,
    /// Requested sort direction, `asc` or `desc`
    pub order_by: Option<String>,
}

/// Fully resolved list parameters
///
/// `page >= 1`, `1 <= per_page <= max_per_page`, non-empty `sort_by`. Whether
/// `sort_by` is actually sortable is decided by the repository's whitelist.
///
/// The fields are only reachable through [`ListParams::normalize`] and the
/// constructors built on it. Deserializing goes through [`RawListParams`] and
/// is bounded by the default [`PaginationConfig`].
///
/// # Example
///
/// ```rust
/// use davet_store::repository::ListParams;
///
/// let params: ListParams =
///     serde_json::from_str(r#"{"page":0,"per_page":100000,"sort_by":""}"#).unwrap();
/// assert_eq!(params.page(), 1);
/// assert_eq!(params.per_page(), 20);
/// assert_eq!(params.sort_by(), "id");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawListParams")]
pub struct ListParams {
    page: u32,
    per_page: u32,
    sort_by: String,
    order_by: SortOrder,
}

impl From<RawListParams> for ListParams {
    fn from(raw: RawListParams) -> Self {
        Self::normalize(raw, &PaginationConfig::default())
    }
}

impl Default for ListParams {
    fn default() -> Self {
        Self::defaults(&PaginationConfig::default())
    }
}

impl ListParams {
    /// The complete default parameter set
    #[must_use]
    pub fn defaults(config: &PaginationConfig) -> Self {
        Self {
            page: 1,
            per_page: config.default_per_page.clamp(1, config.max_per_page.max(1)),
            sort_by: config.default_sort_by.clone(),
            order_by: config.default_order_by,
        }
    }

    /// Explicit parameters, bounded the same way as untrusted input
    #[must_use]
    pub fn new(page: u32, per_page: u32, sort_by: impl Into<String>, order_by: SortOrder) -> Self {
        let config = PaginationConfig::default();
        Self::normalize(
            RawListParams {
                page: Some(i64::from(page)),
                per_page: Some(i64::from(per_page)),
                sort_by: Some(sort_by.into()),
                order_by: Some(order_by.to_string()),
            },
            &config,
        )
    }

    /// Resolve raw input against `config`
    ///
    /// Out-of-range numbers fall back field by field: `page <= 0` becomes 1,
    /// `per_page` outside `1..=max_per_page` becomes the default page size and a
    /// blank `sort_by` or `order_by` becomes its default. An `order_by` that is
    /// neither `asc` nor `desc` is a parse failure and discards the whole input.
    #[must_use]
    pub fn normalize(raw: RawListParams, config: &PaginationConfig) -> Self {
        let defaults = Self::defaults(config);

        let order_by = raw
            .order_by
            .as_deref()
            .map(str::trim)
            .filter(|order_by| !order_by.is_empty());
        let order_by = match order_by.map(str::parse::<SortOrder>) {
            None => defaults.order_by,
            Some(Ok(order)) => order,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Discarding list parameters");
                return defaults;
            }
        };

        let page = raw
            .page
            .filter(|page| *page > 0)
            .and_then(|page| u32::try_from(page).ok())
            .unwrap_or(1);

        let per_page = raw
            .per_page
            .filter(|per_page| *per_page > 0 && *per_page <= i64::from(config.max_per_page))
            .and_then(|per_page| u32::try_from(per_page).ok())
            .unwrap_or(defaults.per_page);

        let sort_by = raw
            .sort_by
            .map(|sort_by| sort_by.trim().to_string())
            .filter(|sort_by| !sort_by.is_empty())
            .unwrap_or(defaults.sort_by);

        Self {
            page,
            per_page,
            sort_by,
            order_by,
        }
    }

    /// Parse and resolve a `page=..&per_page=..&sort_by=..&order_by=..` query
    ///
    /// A query that fails to parse yields the complete default set; nothing from
    /// it is merged.
    #[must_use]
    pub fn from_query(query: &str, config: &PaginationConfig) -> Self {
        match serde_urlencoded::from_str::<RawListParams>(query) {
            Ok(raw) => Self::normalize(raw, config),
            Err(e) => {
                tracing::warn!(error = %e, query, "Malformed list query, using defaults");
                Self::defaults(config)
            }
        }
    }

    /// Query-string form, the inverse of [`ListParams::from_query`]
    pub fn to_query_string(&self) -> Result<String, serde_urlencoded::ser::Error> {
        serde_urlencoded::to_string(self)
    }

    /// 1-indexed page number
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Page size
    #[must_use]
    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Requested sort column
    #[must_use]
    pub fn sort_by(&self) -> &str {
        &self.sort_by
    }

    /// Sort direction
    #[must_use]
    pub fn order_by(&self) -> SortOrder {
        self.order_by
    }

    /// Offset/limit window for this page
    #[must_use]
    pub fn pagination(&self) -> Pagination {
        Pagination::page(u64::from(self.page), u64::from(self.per_page))
    }

    /// Same parameters with a different sort column; a blank column is ignored
    #[must_use]
    pub fn with_sort_by(mut self, sort_by: impl Into<String>) -> Self {
        let sort_by = sort_by.into();
        if !sort_by.trim().is_empty() {
            self.sort_by = sort_by.trim().to_string();
        }
        self
    }
}

/// Number of pages needed for `total_items` at `per_page` items each
///
/// # Example
///
/// ```rust
/// use davet_store::repository::total_pages;
///
/// assert_eq!(total_pages(0, 10), 0);
/// assert_eq!(total_pages(25, 10), 3);
/// assert_eq!(total_pages(20, 10), 2);
/// assert_eq!(total_pages(20, 0), 0);
/// ```
#[must_use]
pub fn total_pages(total_items: i64, per_page: u32) -> i64 {
    if total_items <= 0 || per_page == 0 {
        return 0;
    }
    (total_items - 1) / i64::from(per_page) + 1
}

/// Pagination metadata accompanying a page of results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Current page number (1-indexed)
    pub current_page: u32,
    /// Page size
    pub per_page: u32,
    /// Total number of items across all pages
    pub total_items: i64,
    /// Total number of pages
    pub total_pages: i64,
}

impl PaginationMeta {
    /// Metadata for `total_items` rows viewed through `params`
    #[must_use]
    pub fn new(params: &ListParams, total_items: i64) -> Self {
        let total_items = total_items.max(0);
        Self {
            current_page: params.page,
            per_page: params.per_page,
            total_items,
            total_pages: total_pages(total_items, params.per_page),
        }
    }

    /// Whether a page follows this one
    #[must_use]
    pub fn has_next(&self) -> bool {
        i64::from(self.current_page) < self.total_pages
    }

    /// Whether a page precedes this one
    #[must_use]
    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }
}

/// One page of results plus its metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    /// Items on this page, in sort order
    pub data: Vec<T>,
    /// Pagination metadata
    pub meta: PaginationMeta,
}

impl<T> PaginatedResult<T> {
    /// Wrap a page fetched with `params`
    pub fn from_page(data: Vec<T>, total_items: i64, params: &ListParams) -> Self {
        Self {
            data,
            meta: PaginationMeta::new(params, total_items),
        }
    }

    /// Well-formed empty page
    pub fn empty(params: &ListParams) -> Self {
        Self::from_page(Vec::new(), 0, params)
    }

    /// Wrap a repository read, degrading a failure into an empty page
    pub fn or_empty<E: fmt::Display>(
        result: Result<(Vec<T>, i64), E>,
        params: &ListParams,
        entity: &str,
    ) -> Self {
        match result {
            Ok((data, total_items)) => Self::from_page(data, total_items, params),
            Err(e) => {
                tracing::error!(entity, error = %e, "Listing failed, returning an empty page");
                Self::empty(params)
            }
        }
    }

    /// Map each item to a new type
    pub fn map<U, F>(self, f: F) -> PaginatedResult<U>
    where
        F: FnMut(T) -> U,
    {
        PaginatedResult {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }

    /// Number of items on this page
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether this page is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PaginationConfig {
        PaginationConfig::default()
    }

    fn raw(page: i64, per_page: i64) -> RawListParams {
        RawListParams {
            page: Some(page),
            per_page: Some(per_page),
            ..RawListParams::default()
        }
    }

    #[test]
    fn test_sort_order_parsing() {
        assert_eq!("asc".parse::<SortOrder>(), Ok(SortOrder::Asc));
        assert_eq!("desc".parse::<SortOrder>(), Ok(SortOrder::Desc));
        assert!("DESC; drop".parse::<SortOrder>().is_err());
        assert_eq!(SortOrder::Desc.as_sql(), "DESC");
    }

    #[test]
    fn test_non_positive_page_becomes_first_page() {
        assert_eq!(ListParams::normalize(raw(0, 10), &config()).page(), 1);
        assert_eq!(ListParams::normalize(raw(-4, 10), &config()).page(), 1);
        assert_eq!(ListParams::normalize(raw(7, 10), &config()).page(), 7);
    }

    #[test]
    fn test_out_of_range_per_page_becomes_default() {
        assert_eq!(ListParams::normalize(raw(1, 0), &config()).per_page(), 20);
        assert_eq!(ListParams::normalize(raw(1, -1), &config()).per_page(), 20);
        assert_eq!(ListParams::normalize(raw(1, 101), &config()).per_page(), 20);
        assert_eq!(ListParams::normalize(raw(1, 100), &config()).per_page(), 100);
        assert_eq!(ListParams::normalize(raw(1, 1), &config()).per_page(), 1);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let params = ListParams::normalize(RawListParams::default(), &config());
        assert_eq!(params, ListParams::default());
        assert_eq!(params.sort_by(), "id");
        assert_eq!(params.order_by(), SortOrder::Asc);
    }

    #[test]
    fn test_blank_sort_column_takes_default() {
        let params = ListParams::normalize(
            RawListParams {
                sort_by: Some("   ".to_string()),
                ..RawListParams::default()
            },
            &config(),
        );
        assert_eq!(params.sort_by(), "id");
    }

    #[test]
    fn test_invalid_order_discards_everything() {
        let params = ListParams::normalize(
            RawListParams {
                page: Some(4),
                per_page: Some(10),
                sort_by: Some("name".to_string()),
                order_by: Some("sideways".to_string()),
            },
            &config(),
        );
        assert_eq!(params, ListParams::defaults(&config()));
    }

    #[test]
    fn test_blank_order_takes_default_and_keeps_the_rest() {
        let params = ListParams::from_query("page=3&per_page=10&order_by=", &config());
        assert_eq!(params.page(), 3);
        assert_eq!(params.per_page(), 10);
        assert_eq!(params.order_by(), SortOrder::Asc);

        let params = ListParams::from_query("page=2&order_by=%20%20", &config());
        assert_eq!(params.page(), 2);
        assert_eq!(params.order_by(), SortOrder::Asc);
    }

    #[test]
    fn test_deserializing_normalizes() {
        let params: ListParams = serde_json::from_str(
            r#"{"page":0,"per_page":0,"sort_by":"","order_by":"asc"}"#,
        )
        .unwrap();
        assert_eq!(params, ListParams::default());

        let params: ListParams =
            serde_json::from_str(r#"{"page":2,"per_page":1000000,"order_by":"desc"}"#).unwrap();
        assert_eq!(params.page(), 2);
        assert_eq!(params.per_page(), 20);
        assert_eq!(params.order_by(), SortOrder::Desc);

        let params: ListParams = serde_json::from_str(r#"{"order_by":"sideways"}"#).unwrap();
        assert_eq!(params, ListParams::default());
    }

    #[test]
    fn test_serialized_params_read_back_unchanged() {
        let params = ListParams::new(4, 25, "name", SortOrder::Desc);
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(serde_json::from_str::<ListParams>(&json).unwrap(), params);
    }

    #[test]
    fn test_blank_sort_override_is_ignored() {
        let params = ListParams::default().with_sort_by("  ").with_sort_by(" name ");
        assert_eq!(params.sort_by(), "name");
        assert_eq!(ListParams::default().with_sort_by("").sort_by(), "id");
    }

    #[test]
    fn test_malformed_query_yields_defaults() {
        let params = ListParams::from_query("page=abc&per_page=5&sort_by=name", &config());
        assert_eq!(params, ListParams::defaults(&config()));
    }

    #[test]
    fn test_query_parsing() {
        let params =
            ListParams::from_query("page=2&per_page=5&sort_by=name&order_by=desc", &config());
        assert_eq!(params.page(), 2);
        assert_eq!(params.per_page(), 5);
        assert_eq!(params.sort_by(), "name");
        assert_eq!(params.order_by(), SortOrder::Desc);
    }

    #[test]
    fn test_query_string_round_trip() {
        let params =
            ListParams::from_query("page=3&per_page=15&sort_by=slug&order_by=desc", &config());
        let query = params.to_query_string().unwrap();
        assert_eq!(query, "page=3&per_page=15&sort_by=slug&order_by=desc");
        assert_eq!(ListParams::from_query(&query, &config()), params);
    }

    #[test]
    fn test_configured_defaults() {
        let config = PaginationConfig {
            default_per_page: 50,
            max_per_page: 200,
            default_sort_by: "created_at".to_string(),
            default_order_by: SortOrder::Desc,
        };
        let params = ListParams::from_query("per_page=150", &config);
        assert_eq!(params.per_page(), 150);
        assert_eq!(params.sort_by(), "created_at");
        assert_eq!(params.order_by(), SortOrder::Desc);
    }

    #[test]
    fn test_pagination_window() {
        let params = ListParams::from_query("page=2&per_page=5", &config());
        assert_eq!(params.pagination(), Pagination { offset: 5, limit: 5 });
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(20, 10), 2);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(5, 0), 0);
        assert_eq!(total_pages(i64::MAX, 1), i64::MAX);
        assert_eq!(total_pages(i64::MAX, 2), i64::MAX / 2 + 1);
    }

    #[test]
    fn test_pagination_meta() {
        let params = ListParams::from_query("page=2&per_page=5", &config());
        let meta = PaginationMeta::new(&params, 12);
        assert_eq!(
            meta,
            PaginationMeta {
                current_page: 2,
                per_page: 5,
                total_items: 12,
                total_pages: 3,
            }
        );
        assert!(meta.has_next());
        assert!(meta.has_prev());
    }

    #[test]
    fn test_or_empty_degrades_failures() {
        let params = ListParams::default();
        let result: PaginatedResult<i32> =
            PaginatedResult::or_empty(Err::<(Vec<i32>, i64), _>("boom"), &params, "Card");
        assert!(result.is_empty());
        assert_eq!(result.meta.total_items, 0);
        assert_eq!(result.meta.total_pages, 0);
        assert_eq!(result.meta.current_page, 1);
    }

    #[test]
    fn test_map_preserves_meta() {
        let params = ListParams::default();
        let page = PaginatedResult::from_page(vec![1, 2], 2, &params).map(|n| n * 10);
        assert_eq!(page.data, vec![10, 20]);
        assert_eq!(page.meta.total_items, 2);
        assert_eq!(page.len(), 2);
    }
}
