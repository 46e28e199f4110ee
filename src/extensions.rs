//! Extension hooks that contribute sort options at service start.
//!
//! Each [`SortOptionProvider`] is asked once for its options while the
//! [`crate::service::SearchService`] is being built. Providers run in the
//! order given, so a later provider can replace an earlier option by reusing
//! its name.

use crate::search::sorters::{UpdatedSorter, ViewsSorter};
use crate::search::sorting::SortOption;

pub trait SortOptionProvider: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    fn sort_options(&self) -> Vec<SortOption>;
}

/// Usage-based ordering: view counts and recency.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsageInsights;

impl SortOptionProvider for UsageInsights {
    fn name(&self) -> &str {
        "usage-insights"
    }

    fn sort_options(&self) -> Vec<SortOption> {
        vec![
            SortOption::new("views-desc", "Views (most)", "Most viewed dashboards first")
                .with_index(1)
                .with_meta_name("total views")
                .with_filter(ViewsSorter { descending: true }),
            SortOption::new("views-asc", "Views (least)", "Least viewed dashboards first")
                .with_index(1)
                .with_meta_name("total views")
                .with_filter(ViewsSorter { descending: false }),
            SortOption::new(
                "updated-desc",
                "Recently updated",
                "Most recently updated dashboards first",
            )
            .with_index(2)
            .with_meta_name("last updated")
            .with_filter(UpdatedSorter { descending: true }),
            SortOption::new(
                "updated-asc",
                "Least recently updated",
                "Least recently updated dashboards first",
            )
            .with_index(2)
            .with_meta_name("last updated")
            .with_filter(UpdatedSorter { descending: false }),
        ]
    }
}

/// Built-in providers enabled by `config`.
pub fn builtin_providers(
    config: &crate::config::ExtensionsConfig,
) -> Vec<Box<dyn SortOptionProvider>> {
    let mut providers: Vec<Box<dyn SortOptionProvider>> = Vec::new();
    if config.usage_insights {
        providers.push(Box::new(UsageInsights));
    }
    providers
}
