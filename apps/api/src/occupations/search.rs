//! Fallback search across the two occupation providers.
//!
//! The primary provider is always asked first. The fallback is asked only
//! when the primary produced no records, and its answer is returned as-is.
//! Results from the two providers are never merged.

use std::sync::Arc;

use tracing::{error, info};

use crate::occupations::{ErrorResult, OccupationProvider, SearchOutcome, SearchQuery};

#[derive(Clone)]
pub struct OccupationSearch {
    primary: Arc<dyn OccupationProvider>,
    fallback: Arc<dyn OccupationProvider>,
}

impl OccupationSearch {
    pub fn new(
        primary: Arc<dyn OccupationProvider>,
        fallback: Arc<dyn OccupationProvider>,
    ) -> Self {
        Self { primary, fallback }
    }

    /// Entry point of the `search_onet_codes` tool. Never fails; a search with
    /// no results from either provider yields `SearchOutcome::NotFound`.
    pub async fn search_onet_codes(&self, query: &SearchQuery) -> SearchOutcome {
        let keyword = query.keyword.as_str();

        let mut matches = self.primary.search(keyword, query.n_results).await;

        if matches.is_empty() {
            info!(
                "{} returned no results, falling back to {}",
                self.primary.name(),
                self.fallback.name()
            );
            matches = self.fallback.search(keyword, query.n_results).await;
        }

        if matches.is_empty() {
            let not_found = ErrorResult::no_codes_found(keyword);
            error!("{}", not_found.error);
            return SearchOutcome::NotFound(not_found);
        }

        SearchOutcome::Found(matches)
    }
}
