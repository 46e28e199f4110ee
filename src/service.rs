//! Search service: owns the sort-option registry and runs searches.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::config::Config;
use crate::extensions::SortOptionProvider;
use crate::search::query::{SearchHit, SearchQuery, build_sql};
use crate::search::sorting::{SortOption, SortOptionRegistry};
use crate::storage::sqlite::SqliteStorage;

pub struct SearchService {
    config: Config,
    registry: Arc<SortOptionRegistry>,
}

impl SearchService {
    /// Build the registry from the defaults plus every provider's options.
    pub fn new(config: Config, providers: &[Box<dyn SortOptionProvider>]) -> Self {
        let registry = Arc::new(SortOptionRegistry::with_defaults());
        for provider in providers {
            let options = provider.sort_options();
            info!(
                provider = provider.name(),
                count = options.len(),
                "registering extension sort options"
            );
            for option in options {
                registry.register(option);
            }
        }
        info!(sort_options = registry.len(), "search service ready");
        Self { config, registry }
    }

    /// Service with the built-in providers enabled in `config`.
    pub fn from_config(config: Config) -> Self {
        let providers = crate::extensions::builtin_providers(&config.extensions);
        Self::new(config, &providers)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared handle for callers that outlive a borrow of the service.
    pub fn registry(&self) -> Arc<SortOptionRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn register_sort_option(&self, option: SortOption) {
        self.registry.register(option);
    }

    pub fn sort_options(&self) -> Vec<SortOption> {
        self.registry.list()
    }

    pub fn sort_option(&self, name: &str) -> Option<SortOption> {
        self.registry.get(name)
    }

    pub fn search(&self, storage: &SqliteStorage, query: &SearchQuery) -> Result<Vec<SearchHit>> {
        let built = build_sql(&self.registry, query, &self.config.search.default_sort)?;
        let hits = storage.search(&built)?;
        tracing::info!(
            query = %query.query,
            sort = %built.sort,
            hits = hits.len(),
            "search_complete"
        );
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::UsageInsights;

    struct Override;

    impl SortOptionProvider for Override {
        fn name(&self) -> &str {
            "override"
        }

        fn sort_options(&self) -> Vec<SortOption> {
            vec![SortOption::new("views-desc", "Popular", "").with_index(9)]
        }
    }

    #[test]
    fn later_providers_override_earlier_ones() {
        let providers: Vec<Box<dyn SortOptionProvider>> =
            vec![Box::new(UsageInsights), Box::new(Override)];
        let service = SearchService::new(Config::default(), &providers);

        let popular = service.sort_option("views-desc").unwrap();
        assert_eq!(popular.display_name, "Popular");
        assert_eq!(service.sort_options().last().unwrap().name, "views-desc");
    }

    #[test]
    fn registry_handle_sees_late_registrations() {
        let service = SearchService::new(Config::default(), &[]);
        let registry = service.registry();
        service.register_sort_option(SortOption::new("newest", "Newest", "").with_index(5));
        assert_eq!(registry.names(), ["alpha-asc", "alpha-desc", "newest"]);
    }
}
