//! Concrete order-by fragments carried inside sort options.

use super::sorting::SortOptionFilter;

fn direction(descending: bool) -> &'static str {
    if descending { "DESC" } else { "ASC" }
}

/// Orders by dashboard title, ignoring ASCII case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TitleSorter {
    pub descending: bool,
}

impl SortOptionFilter for TitleSorter {
    fn order_by(&self) -> String {
        format!("title COLLATE NOCASE {}", direction(self.descending))
    }
}

/// Orders by total view count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewsSorter {
    pub descending: bool,
}

impl SortOptionFilter for ViewsSorter {
    fn order_by(&self) -> String {
        format!("views {}", direction(self.descending))
    }

    fn meta_column(&self) -> Option<&'static str> {
        Some("views")
    }
}

/// Orders by last update time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdatedSorter {
    pub descending: bool,
}

impl SortOptionFilter for UpdatedSorter {
    fn order_by(&self) -> String {
        format!("updated_at {}", direction(self.descending))
    }

    fn meta_column(&self) -> Option<&'static str> {
        Some("updated_at")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms() {
        assert_eq!(TitleSorter::default().order_by(), "title COLLATE NOCASE ASC");
        assert_eq!(ViewsSorter { descending: true }.order_by(), "views DESC");
        assert_eq!(UpdatedSorter { descending: false }.order_by(), "updated_at ASC");
    }

    #[test]
    fn only_numeric_sorters_expose_meta() {
        assert_eq!(TitleSorter::default().meta_column(), None);
        assert_eq!(ViewsSorter::default().meta_column(), Some("views"));
        assert_eq!(UpdatedSorter::default().meta_column(), Some("updated_at"));
    }
}
