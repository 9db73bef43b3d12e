use std::time::Instant;

use crate::{
    models::{Catalog, CatalogEntry, ItemId, RawRating, Recommendation, SecondaryTitle, Strategy, UserId},
    services::{
        cold_start,
        collaborative::CollaborativeEngine,
        content::ContentEngine,
        evaluation::{self, EvaluationReport, GroundTruth},
        ratings::{project_ratings, UserItemMatrix},
        reconciler::reconcile,
    },
};

/// A recommendation session
///
/// Reconciles the catalogs, aggregates ratings and builds both similarity
/// spaces once. Every query afterwards is a read against these structures.
pub struct Recommender {
    catalog: Catalog,
    user_items: UserItemMatrix,
    content: ContentEngine,
    collaborative: CollaborativeEngine,
}

impl Recommender {
    pub fn build(
        primary: Vec<CatalogEntry>,
        secondary: &[SecondaryTitle],
        ratings: &[RawRating],
        match_cutoff: f64,
    ) -> Self {
        let start = Instant::now();
        let catalog = Catalog::new(primary);

        let mapping = reconcile(&catalog, secondary, match_cutoff);
        let events = project_ratings(ratings, &mapping);
        let user_items = UserItemMatrix::from_events(&events);
        let content = ContentEngine::build(&catalog);
        let collaborative = CollaborativeEngine::build(&user_items);

        tracing::info!(
            catalog_size = catalog.len(),
            mapped_titles = mapping.len(),
            rating_events = events.len(),
            users = user_items.users().len(),
            rated_cells = user_items.rating_count(),
            vocabulary = content.vocabulary_size(),
            processing_time_ms = start.elapsed().as_millis(),
            "Recommendation session ready"
        );

        Self {
            catalog,
            user_items,
            content,
            collaborative,
        }
    }

    /// Recommends up to `k` items following a priority chain, never a blend
    ///
    /// - `Content`: content similarity to the seed.
    /// - `Collaborative`: item-item rating similarity; empty when the seed was never rated.
    /// - `Hybrid`: content first, then global popularity (seed excluded) when content
    ///   finds nothing. The collaborative engine is not consulted here even if a
    ///   user is given.
    /// - No seed, or `Popularity`: global popularity.
    pub fn recommend(
        &self,
        user_id: Option<UserId>,
        seed: Option<ItemId>,
        strategy: Strategy,
        k: usize,
    ) -> Vec<Recommendation> {
        tracing::debug!(?user_id, ?seed, %strategy, k, "Recommendation requested");

        match (strategy, seed) {
            (Strategy::Content, Some(seed)) => self.content.recommend(&self.catalog, seed, k),
            (Strategy::Collaborative, Some(seed)) => {
                self.collaborative.recommend(&self.catalog, seed, k)
            }
            (Strategy::Hybrid, Some(seed)) => {
                let content = self.content.recommend(&self.catalog, seed, k);
                if !content.is_empty() {
                    return content;
                }
                tracing::debug!(seed, "Content produced nothing, falling back to popularity");
                let mut popular = cold_start::popular(&self.catalog, k.saturating_add(1));
                popular.retain(|rec| rec.item_id != seed);
                popular.truncate(k);
                popular
            }
            _ => cold_start::popular(&self.catalog, k),
        }
    }

    /// Genre-aware cold start; empty for a user who already has ratings
    pub fn cold_start<S: AsRef<str>>(
        &self,
        user_id: Option<UserId>,
        preferred_genres: &[S],
        k: usize,
    ) -> Vec<Recommendation> {
        let user_has_history = user_id.is_some_and(|user_id| self.has_history(user_id));
        cold_start::cold_start(&self.catalog, user_has_history, preferred_genres, k)
    }

    /// Relevant items per user derived from this session's aggregated ratings
    pub fn ground_truth(&self, relevance_threshold: f64) -> GroundTruth {
        evaluation::relevant_items(&self.user_items, relevance_threshold)
    }

    /// Runs `scoring_fn` for every user of `ground_truth`
    pub fn evaluate<F>(&self, scoring_fn: F, ground_truth: &GroundTruth, k: usize) -> EvaluationReport
    where
        F: FnMut(UserId) -> Vec<ItemId>,
    {
        evaluation::evaluate(scoring_fn, ground_truth, k)
    }

    pub fn has_history(&self, user_id: UserId) -> bool {
        self.user_items.has_user(user_id)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn user_items(&self) -> &UserItemMatrix {
        &self.user_items
    }

    pub fn users(&self) -> &[UserId] {
        self.user_items.users()
    }
}
