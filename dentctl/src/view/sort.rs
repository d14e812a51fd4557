use crate::api::models::pagination::SortOrder;

/// Active sort column and direction of a list view.
///
/// Clicking the active column flips the direction; clicking another column moves the indicator
/// there and starts ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    column: Option<String>,
    order: SortOrder,
}

impl SortState {
    pub fn new(column: impl Into<String>, order: SortOrder) -> Self {
        Self {
            column: Some(column.into()),
            order,
        }
    }

    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn toggle(&mut self, column: &str) {
        if self.column.as_deref() == Some(column) {
            self.order = self.order.toggled();
        } else {
            self.column = Some(column.to_string());
            self.order = SortOrder::Asc;
        }
    }

    /// Direction to show next to `column`, if it is the active one.
    pub fn indicator(&self, column: &str) -> Option<SortOrder> {
        (self.column.as_deref() == Some(column)).then_some(self.order)
    }

    /// `(sortBy, sortOrder)` to send, or nothing when no column is active.
    pub fn params(&self) -> (Option<String>, Option<SortOrder>) {
        match &self.column {
            Some(column) => (Some(column.clone()), Some(self.order)),
            None => (None, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_column_cycles() {
        let mut sort = SortState::default();
        assert_eq!(sort.params(), (None, None));

        sort.toggle("name");
        assert_eq!(sort.indicator("name"), Some(SortOrder::Asc));
        sort.toggle("name");
        assert_eq!(sort.indicator("name"), Some(SortOrder::Desc));
        sort.toggle("name");
        assert_eq!(sort.indicator("name"), Some(SortOrder::Asc));
    }

    #[test]
    fn test_other_column_resets_to_asc() {
        let mut sort = SortState::new("name", SortOrder::Desc);
        sort.toggle("createdAt");

        assert_eq!(sort.column(), Some("createdAt"));
        assert_eq!(sort.order(), SortOrder::Asc);
        assert_eq!(sort.indicator("name"), None);
        assert_eq!(sort.params(), (Some("createdAt".to_string()), Some(SortOrder::Asc)));
    }
}
