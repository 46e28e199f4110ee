//! Sort-option registry for search results.
//!
//! A [`SortOptionRegistry`] holds the named sort strategies a search listing
//! can offer. The owning service registers the built-in options at startup,
//! extension providers add their own, and the presentation layer reads the
//! full set back with [`SortOptionRegistry::list`] to populate a sort
//! selector.
//!
//! # Ordering
//!
//! `list()` always returns options ordered by `(index, name)` ascending, so
//! the output is the same no matter which order the options were registered
//! in.
//!
//! # Example
//!
//! ```rust
//! use dashboard_search::search::sorting::{SortOption, SortOptionRegistry};
//!
//! let registry = SortOptionRegistry::with_defaults();
//! registry.register(SortOption::new("newest", "Newest", "Most recent first").with_index(5));
//!
//! let names: Vec<String> = registry.list().into_iter().map(|o| o.name).collect();
//! assert_eq!(names, ["alpha-asc", "alpha-desc", "newest"]);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tracing::debug;

use super::sorters::TitleSorter;

/// Name of the built-in ascending alphabetical option.
pub const SORT_ALPHA_ASC: &str = "alpha-asc";

/// Name of the built-in descending alphabetical option.
pub const SORT_ALPHA_DESC: &str = "alpha-desc";

/// A fragment that contributes one ORDER BY term to a search query.
///
/// The registry never looks inside these; the query builder asks each one for
/// its term in order.
pub trait SortOptionFilter: fmt::Debug + Send + Sync {
    /// SQL ORDER BY term, e.g. `title COLLATE NOCASE DESC`.
    fn order_by(&self) -> String;

    /// Column whose value is reported back on each hit when the owning
    /// option carries a meta name.
    fn meta_column(&self) -> Option<&'static str> {
        None
    }
}

/// One way of ordering search results.
#[derive(Debug, Clone, Default)]
pub struct SortOption {
    /// Unique key; also the value accepted by `--sort`.
    pub name: String,
    pub display_name: String,
    pub description: String,
    /// Lower sorts first in [`SortOptionRegistry::list`].
    pub index: i32,
    /// Label for the per-hit sort value, empty when the option has none.
    pub meta_name: String,
    pub filter: Vec<Arc<dyn SortOptionFilter>>,
}

impl SortOption {
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_index(mut self, index: i32) -> Self {
        self.index = index;
        self
    }

    pub fn with_meta_name(mut self, meta_name: impl Into<String>) -> Self {
        self.meta_name = meta_name.into();
        self
    }

    /// Append an order-by fragment.
    pub fn with_filter(mut self, filter: impl SortOptionFilter + 'static) -> Self {
        self.filter.push(Arc::new(filter));
        self
    }

    /// Serializable projection used for JSON output.
    pub fn view(&self) -> SortOptionView {
        SortOptionView {
            name: self.name.clone(),
            display_name: self.display_name.clone(),
            description: self.description.clone(),
            index: self.index,
            meta: self.meta_name.clone(),
        }
    }
}

/// What a client sees of a [`SortOption`]; filters stay server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortOptionView {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub index: i32,
    pub meta: String,
}

/// Ascending alphabetical order by title.
pub fn sort_alpha_asc() -> SortOption {
    SortOption::new(
        SORT_ALPHA_ASC,
        "Alphabetically (A–Z)",
        "Sort results in an alphabetically ascending order",
    )
    .with_filter(TitleSorter { descending: false })
}

/// Descending alphabetical order by title.
pub fn sort_alpha_desc() -> SortOption {
    SortOption::new(
        SORT_ALPHA_DESC,
        "Alphabetically (Z–A)",
        "Sort results in an alphabetically descending order",
    )
    .with_filter(TitleSorter { descending: true })
}

/// Name-keyed store of sort options.
///
/// Safe to share between threads; `register` and `list` may interleave
/// freely.
#[derive(Debug, Default)]
pub struct SortOptionRegistry {
    options: RwLock<HashMap<String, SortOption>>,
}

impl SortOptionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding `alpha-asc` and `alpha-desc`.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register(sort_alpha_asc());
        registry.register(sort_alpha_desc());
        registry
    }

    /// Insert `option`, replacing any option already registered under the
    /// same name. Options are not validated.
    pub fn register(&self, option: SortOption) {
        let name = option.name.clone();
        let index = option.index;
        let replaced = self.options.write().insert(name.clone(), option).is_some();
        if replaced {
            debug!(name = %name, index, "sort option replaced");
        } else {
            debug!(name = %name, index, "sort option registered");
        }
    }

    /// All options ordered by `(index, name)`.
    pub fn list(&self) -> Vec<SortOption> {
        let mut opts: Vec<SortOption> = self.options.read().values().cloned().collect();
        opts.sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.name.cmp(&b.name)));
        opts
    }

    /// Look up an option by its exact name.
    pub fn get(&self, name: &str) -> Option<SortOption> {
        self.options.read().get(name).cloned()
    }

    /// Option names in listing order.
    pub fn names(&self) -> Vec<String> {
        self.list().into_iter().map(|o| o.name).collect()
    }

    pub fn len(&self) -> usize {
        self.options.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.read().is_empty()
    }
}
