//! Shared pagination types for list requests and responses.
//!
//! Every list endpoint accepts the same page-based parameters (`page`, `limit`, `sortBy`,
//! `sortOrder`) and answers with the same envelope: the page of items plus exactly one
//! [`Pagination`] descriptor computed against the same parameters. Ordering and filtering are
//! decided by the server; nothing here reorders or filters `data`.

use super::Validate;
use crate::api::query::QueryPairs;
use bon::Builder;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default number of items to request per page.
pub const DEFAULT_LIMIT: u32 = 10;

/// Maximum number of items that can be requested per page.
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => f.write_str("asc"),
            SortOrder::Desc => f.write_str("desc"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order '{other}' (expected asc or desc)")),
        }
    }
}

/// Standard paging and sorting parameters for list requests.
///
/// Every field is optional; absent (or zero/empty) fields are not sent at all.
///
/// ```
/// use dentctl::api::models::pagination::{ListParams, SortOrder};
///
/// let params = ListParams::builder().page(2).limit(10).sort_by("name").sort_order(SortOrder::Desc).build();
/// assert_eq!(params.query_pairs().to_string(), "page=2&limit=10&sortBy=name&sortOrder=desc");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Builder)]
pub struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    #[builder(into)]
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl ListParams {
    /// Get the page, defaulting to 1.
    #[inline]
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Get the limit, clamped between 1 and MAX_LIMIT.
    #[inline]
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// Append `page, limit, sortBy, sortOrder` in that order, skipping absent values.
    pub fn append_to(&self, pairs: &mut QueryPairs) {
        pairs
            .push_number("page", self.page)
            .push_number("limit", self.limit)
            .push_str("sortBy", self.sort_by.as_deref())
            .push_opt("sortOrder", self.sort_order);
    }

    pub fn query_pairs(&self) -> QueryPairs {
        let mut pairs = QueryPairs::new();
        self.append_to(&mut pairs);
        pairs
    }
}

/// Pagination descriptor returned alongside every list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
    pub items_per_page: u32,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl Pagination {
    /// Descriptor for a single page holding every item.
    pub fn single_page(total_items: u64, items_per_page: u32) -> Self {
        Self {
            current_page: 1,
            total_pages: u32::from(total_items > 0),
            total_items,
            items_per_page,
            has_next_page: false,
            has_previous_page: false,
        }
    }
}

impl Validate for Pagination {
    fn validate(&self) -> Result<(), String> {
        if self.items_per_page == 0 {
            return Err("pagination.itemsPerPage must be at least 1".to_string());
        }
        if self.current_page == 0 {
            return Err("pagination.currentPage must be at least 1".to_string());
        }
        if self.has_previous_page != (self.current_page > 1) {
            return Err(format!(
                "pagination.hasPreviousPage is {} on page {}",
                self.has_previous_page, self.current_page
            ));
        }
        if self.has_next_page != (self.current_page < self.total_pages) {
            return Err(format!(
                "pagination.hasNextPage is {} on page {} of {}",
                self.has_next_page, self.current_page, self.total_pages
            ));
        }
        Ok(())
    }
}

/// Generic paginated response wrapper for list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    /// The items for the current page, in server order
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T: Validate> Validate for PaginatedResponse<T> {
    fn validate(&self) -> Result<(), String> {
        self.pagination.validate()?;
        if self.data.len() > self.pagination.items_per_page as usize {
            return Err(format!(
                "{} items returned for a page of {}",
                self.data.len(),
                self.pagination.items_per_page
            ));
        }
        for (index, item) in self.data.iter().enumerate() {
            item.validate().map_err(|e| format!("data[{index}]: {e}"))?;
        }
        Ok(())
    }
}
