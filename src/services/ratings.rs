/// Rating aggregation
///
/// Projects the raw rating log onto canonical item ids and pivots it into a
/// dense user × item matrix where an absent cell means "not rated".
use ndarray::Array2;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::{
    models::{ItemId, RatingEvent, RawRating, UserId},
    services::reconciler::IdentifierMapping,
};

/// Inner join of the rating log with the identifier mapping
///
/// Ratings whose external id has no mapping are dropped.
pub fn project_ratings(ratings: &[RawRating], mapping: &IdentifierMapping) -> Vec<RatingEvent> {
    let events: Vec<RatingEvent> = ratings
        .iter()
        .filter_map(|raw| {
            mapping.get(raw.external_item_id).map(|item_id| RatingEvent {
                user_id: raw.user_id,
                item_id,
                rating: raw.rating,
            })
        })
        .collect();

    tracing::info!(
        raw_ratings = ratings.len(),
        projected = events.len(),
        dropped = ratings.len() - events.len(),
        "Ratings projected onto catalog ids"
    );

    events
}

#[derive(Debug, Clone)]
pub struct UserItemMatrix {
    users: Vec<UserId>,
    items: Vec<ItemId>,
    user_index: HashMap<UserId, usize>,
    item_index: HashMap<ItemId, usize>,
    cells: Array2<Option<f64>>,
}

impl UserItemMatrix {
    /// Pivots rating events into one row per user and one column per rated item
    ///
    /// Users and items are ordered by ascending id. Several events for the same
    /// (user, item) pair are averaged.
    pub fn from_events(events: &[RatingEvent]) -> Self {
        let mut sums: BTreeMap<(UserId, ItemId), (f64, u32)> = BTreeMap::new();
        let mut users = BTreeSet::new();
        let mut items = BTreeSet::new();

        for event in events {
            users.insert(event.user_id);
            items.insert(event.item_id);
            let cell = sums.entry((event.user_id, event.item_id)).or_insert((0.0, 0));
            cell.0 += event.rating;
            cell.1 += 1;
        }

        let users: Vec<UserId> = users.into_iter().collect();
        let items: Vec<ItemId> = items.into_iter().collect();
        let user_index: HashMap<UserId, usize> =
            users.iter().enumerate().map(|(i, &u)| (u, i)).collect();
        let item_index: HashMap<ItemId, usize> =
            items.iter().enumerate().map(|(i, &m)| (m, i)).collect();

        let mut cells = Array2::from_elem((users.len(), items.len()), None);
        for ((user_id, item_id), (sum, count)) in sums {
            cells[[user_index[&user_id], item_index[&item_id]]] = Some(sum / f64::from(count));
        }

        Self {
            users,
            items,
            user_index,
            item_index,
            cells,
        }
    }

    pub fn get(&self, user_id: UserId, item_id: ItemId) -> Option<f64> {
        let row = *self.user_index.get(&user_id)?;
        let col = *self.item_index.get(&item_id)?;
        self.cells[[row, col]]
    }

    /// Dense copy with every missing rating replaced by `fill`
    pub fn filled(&self, fill: f64) -> Array2<f64> {
        self.cells.mapv(|cell| cell.unwrap_or(fill))
    }

    /// Items the user rated, with their ratings, in item order
    pub fn user_ratings(&self, user_id: UserId) -> Vec<(ItemId, f64)> {
        let Some(&row) = self.user_index.get(&user_id) else {
            return Vec::new();
        };
        self.cells
            .row(row)
            .iter()
            .zip(&self.items)
            .filter_map(|(cell, &item_id)| cell.map(|rating| (item_id, rating)))
            .collect()
    }

    pub fn has_user(&self, user_id: UserId) -> bool {
        self.user_index.contains_key(&user_id)
    }

    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn rating_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.users.len(), self.items.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(user_id: UserId, external_item_id: u64, rating: f64) -> RawRating {
        RawRating {
            user_id,
            external_item_id,
            rating,
        }
    }

    fn event(user_id: UserId, item_id: ItemId, rating: f64) -> RatingEvent {
        RatingEvent {
            user_id,
            item_id,
            rating,
        }
    }

    #[test]
    fn test_project_ratings_inner_join() {
        let mapping = IdentifierMapping::from_rows(vec![(1, 862), (2, 8844)]);
        let events = project_ratings(&[raw(7, 1, 4.0), raw(7, 3, 5.0), raw(8, 2, 3.5)], &mapping);
        assert_eq!(events, vec![event(7, 862, 4.0), event(8, 8844, 3.5)]);
    }

    #[test]
    fn test_pivot_shape_and_order() {
        let matrix = UserItemMatrix::from_events(&[
            event(9, 30, 4.0),
            event(2, 10, 3.0),
            event(2, 30, 5.0),
        ]);
        assert_eq!(matrix.users(), &[2, 9]);
        assert_eq!(matrix.items(), &[10, 30]);
        assert_eq!(matrix.shape(), (2, 2));
        assert_eq!(matrix.rating_count(), 3);
    }

    #[test]
    fn test_missing_is_not_zero() {
        let matrix = UserItemMatrix::from_events(&[event(1, 10, 0.0), event(2, 20, 4.0)]);
        assert_eq!(matrix.get(1, 10), Some(0.0));
        assert_eq!(matrix.get(1, 20), None);
        assert_eq!(matrix.get(3, 10), None);
    }

    #[test]
    fn test_filled_replaces_missing_only() {
        let matrix = UserItemMatrix::from_events(&[event(1, 10, 2.0), event(2, 20, 4.0)]);
        let dense = matrix.filled(0.0);
        assert_eq!(dense[[0, 0]], 2.0);
        assert_eq!(dense[[0, 1]], 0.0);
        assert_eq!(dense[[1, 1]], 4.0);
    }

    #[test]
    fn test_duplicate_cells_averaged() {
        // two external ids reconciled to the same canonical item
        let mapping = IdentifierMapping::from_rows(vec![(1, 862), (2, 862)]);
        let events = project_ratings(&[raw(7, 1, 3.0), raw(7, 2, 5.0)], &mapping);
        let matrix = UserItemMatrix::from_events(&events);
        assert_eq!(matrix.get(7, 862), Some(4.0));
        assert_eq!(matrix.rating_count(), 1);
    }

    #[test]
    fn test_user_ratings() {
        let matrix = UserItemMatrix::from_events(&[
            event(1, 30, 5.0),
            event(1, 10, 3.0),
            event(2, 20, 4.0),
        ]);
        assert_eq!(matrix.user_ratings(1), vec![(10, 3.0), (30, 5.0)]);
        assert!(matrix.user_ratings(99).is_empty());
        assert!(matrix.has_user(2));
    }

    #[test]
    fn test_empty_events() {
        let matrix = UserItemMatrix::from_events(&[]);
        assert_eq!(matrix.shape(), (0, 0));
        assert_eq!(matrix.filled(0.0).len(), 0);
    }
}
