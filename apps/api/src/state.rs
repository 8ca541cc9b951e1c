use crate::occupations::search::OccupationSearch;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Fallback search over CareerOneStop then O*NET. Immutable; safe to share across requests.
    pub search: OccupationSearch,
}
