//! Interaction state of a paginated list view.

use crate::api::models::categories::CategoryListQuery;
use crate::api::models::lab_technicians::LabTechnicianListQuery;
use crate::api::models::pagination::{DEFAULT_LIMIT, ListParams, MAX_LIMIT, Pagination};
use crate::api::resources::ListFilter;
use crate::view::sort::SortState;
use std::collections::{BTreeMap, BTreeSet};

/// Filter name used for the technician clinic dropdown.
pub const CLINIC_FILTER: &str = "clinic";

/// Page, page size, sort, committed search text, categorical filters and row selection.
///
/// Changing the committed search or any filter returns to page 1. Sorting keeps the page.
/// Selection is client-only and never reaches the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListViewState {
    page: u32,
    limit: u32,
    sort: SortState,
    search: Option<String>,
    filters: BTreeMap<String, String>,
    selection: BTreeSet<String>,
}

impl Default for ListViewState {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}

impl ListViewState {
    pub fn new(limit: u32) -> Self {
        Self {
            page: 1,
            limit: limit.clamp(1, MAX_LIMIT),
            sort: SortState::default(),
            search: None,
            filters: BTreeMap::new(),
            selection: BTreeSet::new(),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn filter(&self, name: &str) -> Option<&str> {
        self.filters.get(name).map(String::as_str)
    }

    /// Returns true if the page changed.
    pub fn set_page(&mut self, page: u32) -> bool {
        let page = page.max(1);
        let changed = page != self.page;
        self.page = page;
        changed
    }

    pub fn next_page(&mut self, pagination: &Pagination) -> bool {
        pagination.has_next_page && self.set_page(self.page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> bool {
        self.page > 1 && self.set_page(self.page - 1)
    }

    /// A new page size also returns to page 1.
    pub fn set_limit(&mut self, limit: u32) -> bool {
        let limit = limit.clamp(1, MAX_LIMIT);
        if limit == self.limit {
            return false;
        }
        self.limit = limit;
        self.page = 1;
        true
    }

    pub fn toggle_sort(&mut self, column: &str) {
        self.sort.toggle(column);
    }

    /// Apply a committed (debounced) search value. Blank text clears the search.
    pub fn commit_search(&mut self, text: &str) -> bool {
        let text = text.trim();
        let search = (!text.is_empty()).then(|| text.to_string());
        if search == self.search {
            return false;
        }
        self.search = search;
        self.page = 1;
        true
    }

    /// Set or clear (`None` or empty) a categorical filter.
    pub fn set_filter(&mut self, name: &str, value: Option<&str>) -> bool {
        let changed = match value.filter(|v| !v.is_empty()) {
            Some(value) => self.filters.insert(name.to_string(), value.to_string()).as_deref() != Some(value),
            None => self.filters.remove(name).is_some(),
        };
        if changed {
            self.page = 1;
        }
        changed
    }

    pub fn list_params(&self) -> ListParams {
        let (sort_by, sort_order) = self.sort.params();
        ListParams {
            page: Some(self.page),
            limit: Some(self.limit),
            sort_by,
            sort_order,
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.contains(id)
    }

    pub fn toggle_selected(&mut self, id: &str) {
        if !self.selection.remove(id) {
            self.selection.insert(id.to_string());
        }
    }

    pub fn select_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        self.selection.extend(ids.into_iter().map(str::to_string));
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selected(&self) -> impl Iterator<Item = &str> {
        self.selection.iter().map(String::as_str)
    }
}

/// Builds a list filter from view state.
pub trait FromListView: ListFilter {
    fn from_view(view: &ListViewState) -> Self;
}

impl FromListView for CategoryListQuery {
    fn from_view(view: &ListViewState) -> Self {
        CategoryListQuery::new(view.list_params())
    }
}

impl FromListView for LabTechnicianListQuery {
    fn from_view(view: &ListViewState) -> Self {
        LabTechnicianListQuery {
            params: view.list_params(),
            clinic: view.filter(CLINIC_FILTER).map(str::to_string),
            search: view.search().map(str::to_string),
        }
    }
}
