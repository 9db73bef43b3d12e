use ndarray::{Array2, ArrayView1, Axis};
use std::collections::HashMap;

use crate::models::ItemId;

/// Square item × item similarity table indexed by item id
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    ids: Vec<ItemId>,
    index: HashMap<ItemId, usize>,
    values: Array2<f64>,
}

impl SimilarityMatrix {
    /// Wraps precomputed values; `ids[i]` labels row and column `i`
    pub fn new(ids: Vec<ItemId>, values: Array2<f64>) -> Self {
        debug_assert_eq!(values.nrows(), ids.len());
        debug_assert_eq!(values.ncols(), ids.len());

        let mut index = HashMap::with_capacity(ids.len());
        for (position, &id) in ids.iter().enumerate() {
            index.entry(id).or_insert(position);
        }
        Self { ids, index, values }
    }

    pub fn contains(&self, item_id: ItemId) -> bool {
        self.index.contains_key(&item_id)
    }

    pub fn position(&self, item_id: ItemId) -> Option<usize> {
        self.index.get(&item_id).copied()
    }

    pub fn row(&self, item_id: ItemId) -> Option<ArrayView1<'_, f64>> {
        self.position(item_id).map(|i| self.values.row(i))
    }

    pub fn get(&self, a: ItemId, b: ItemId) -> Option<f64> {
        Some(self.values[[self.position(a)?, self.position(b)?]])
    }

    /// Row of `item_id` paired with column ids, sorted by descending score
    ///
    /// The sort is stable, so equal scores keep column order.
    pub fn ranked_row(&self, item_id: ItemId) -> Option<Vec<(ItemId, f64)>> {
        let row = self.row(item_id)?;
        let mut scored: Vec<(ItemId, f64)> = self.ids.iter().copied().zip(row.iter().copied()).collect();
        sort_by_score_desc(&mut scored);
        Some(scored)
    }

    pub fn ids(&self) -> &[ItemId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Stable descending sort on the score component
pub fn sort_by_score_desc<T>(scored: &mut [(T, f64)]) {
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
}

/// Pairwise cosine similarity between the rows of `vectors`
///
/// Zero rows have similarity 0 with everything, themselves included.
pub fn cosine_similarity(vectors: &Array2<f64>) -> Array2<f64> {
    let mut normalized = vectors.to_owned();
    for mut row in normalized.axis_iter_mut(Axis(0)) {
        let norm = row.dot(&row).sqrt();
        if norm > 0.0 {
            row.mapv_inplace(|v| v / norm);
        }
    }
    normalized.dot(&normalized.t())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_cosine_identical_and_orthogonal() {
        let vectors = array![[1.0, 0.0], [2.0, 0.0], [0.0, 3.0]];
        let sim = cosine_similarity(&vectors);
        assert!((sim[[0, 1]] - 1.0).abs() < 1e-12);
        assert!(sim[[0, 2]].abs() < 1e-12);
        assert!((sim[[2, 2]] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_is_symmetric() {
        let vectors = array![[1.0, 2.0, 0.0], [0.5, 1.0, 3.0], [4.0, 0.0, 1.0]];
        let sim = cosine_similarity(&vectors);
        for i in 0..3 {
            for j in 0..3 {
                assert!((sim[[i, j]] - sim[[j, i]]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_cosine_zero_row() {
        let vectors = array![[0.0, 0.0], [1.0, 1.0]];
        let sim = cosine_similarity(&vectors);
        assert_eq!(sim[[0, 0]], 0.0);
        assert_eq!(sim[[0, 1]], 0.0);
    }

    #[test]
    fn test_ranked_row_is_stable() {
        let matrix = SimilarityMatrix::new(
            vec![5, 6, 7],
            array![[1.0, 0.2, 0.2], [0.2, 1.0, 0.0], [0.2, 0.0, 1.0]],
        );
        let ranked = matrix.ranked_row(5).unwrap();
        assert_eq!(ranked, vec![(5, 1.0), (6, 0.2), (7, 0.2)]);
        assert!(matrix.ranked_row(8).is_none());
        assert_eq!(matrix.get(6, 7), Some(0.0));
    }
}
