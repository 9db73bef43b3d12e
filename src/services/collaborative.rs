/// Item-based collaborative filtering
///
/// Missing ratings are filled with 0 before items are compared, so two
/// items are similar when the same users rated both of them highly.
use crate::{
    models::{Catalog, ItemId, Recommendation},
    services::{
        ratings::UserItemMatrix,
        similarity::{cosine_similarity, sort_by_score_desc, SimilarityMatrix},
    },
};

#[derive(Debug, Clone)]
pub struct CollaborativeEngine {
    similarity: SimilarityMatrix,
}

impl CollaborativeEngine {
    pub fn build(matrix: &UserItemMatrix) -> Self {
        // items become rows
        let item_vectors = matrix.filled(0.0).reversed_axes();
        let values = cosine_similarity(&item_vectors);

        let (users, items) = matrix.shape();
        tracing::info!(users, items, "Collaborative similarity matrix built");

        Self {
            similarity: SimilarityMatrix::new(matrix.items().to_vec(), values),
        }
    }

    /// Items whose rating patterns are closest to `seed`
    ///
    /// Returns an empty list when `seed` was never rated.
    pub fn recommend(&self, catalog: &Catalog, seed: ItemId, k: usize) -> Vec<Recommendation> {
        let Some(ranked) = self.similarity.ranked_row(seed) else {
            tracing::debug!(seed, "Seed absent from collaborative matrix");
            return Vec::new();
        };

        let mut recommendations: Vec<(Recommendation, f64)> = ranked
            .into_iter()
            .filter(|&(item_id, _)| item_id != seed)
            .take(k)
            .filter_map(|(item_id, score)| {
                catalog
                    .get(item_id)
                    .map(|entry| (Recommendation::from_entry(entry, score), score))
            })
            .collect();
        sort_by_score_desc(&mut recommendations);

        recommendations.into_iter().map(|(rec, _)| rec).collect()
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }
}
