//! List-view interaction state: sorting, debounced search, filters, paging and selection.

pub mod controller;
pub mod debounce;
pub mod list;
pub mod sort;

pub use controller::{ListController, ListEvent};
pub use debounce::{DebounceState, Debouncer};
pub use list::{FromListView, ListViewState};
pub use sort::SortState;
