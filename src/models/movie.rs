use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::services::reconciler::normalize_title;

/// Canonical identifier used by the primary catalog and every similarity matrix
pub type ItemId = u64;

/// Identifier used by the secondary (ratings-source) catalog
pub type ExternalItemId = u64;

pub type UserId = u64;

/// A movie from the primary catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    pub item_id: ItemId,
    pub title: String,
    pub normalized_title: String,
    pub genres: BTreeSet<String>,
    pub overview: String,
    /// Average vote on the source's own scale
    pub quality_score: f64,
    pub popularity_score: f64,
}

impl CatalogEntry {
    /// Creates an entry, deriving the normalized title used for reconciliation
    pub fn new(
        item_id: ItemId,
        title: impl Into<String>,
        genres: impl IntoIterator<Item = String>,
        overview: impl Into<String>,
        quality_score: f64,
        popularity_score: f64,
    ) -> Self {
        let title = title.into();
        Self {
            item_id,
            normalized_title: normalize_title(&title),
            title,
            genres: genres.into_iter().collect(),
            overview: overview.into(),
            quality_score,
            popularity_score,
        }
    }

    /// Case-insensitive genre membership
    pub fn has_genre(&self, genre: &str) -> bool {
        let genre = genre.to_lowercase();
        self.genres.iter().any(|g| g.to_lowercase() == genre)
    }
}

/// A title from the secondary catalog, keyed by its own identifier space
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SecondaryTitle {
    pub external_item_id: ExternalItemId,
    pub title: String,
}

/// The primary catalog in load order
///
/// Load order is the tie order for every ranking in the crate. Duplicate
/// ids resolve to their first occurrence.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<ItemId, usize>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let mut index = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            index.entry(entry.item_id).or_insert(position);
        }
        Self { entries, index }
    }

    pub fn get(&self, item_id: ItemId) -> Option<&CatalogEntry> {
        self.index.get(&item_id).map(|&i| &self.entries[i])
    }

    pub fn position(&self, item_id: ItemId) -> Option<usize> {
        self.index.get(&item_id).copied()
    }

    pub fn contains(&self, item_id: ItemId) -> bool {
        self.index.contains_key(&item_id)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn first(&self) -> Option<&CatalogEntry> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: ItemId, title: &str) -> CatalogEntry {
        CatalogEntry::new(id, title, vec!["Drama".to_string()], "", 7.0, 10.0)
    }

    #[test]
    fn test_new_entry_normalizes_title() {
        let movie = entry(1, "Toy Story (1995)");
        assert_eq!(movie.title, "Toy Story (1995)");
        assert_eq!(movie.normalized_title, "toy story");
    }

    #[test]
    fn test_has_genre_ignores_case() {
        let movie = entry(1, "Heat");
        assert!(movie.has_genre("drama"));
        assert!(movie.has_genre("DRAMA"));
        assert!(!movie.has_genre("comedy"));
    }

    #[test]
    fn test_has_genre_ignores_case_beyond_ascii() {
        let movie = CatalogEntry::new(2, "Amélie", vec!["Comédie".to_string()], "", 8.3, 40.0);
        assert!(movie.has_genre("COMÉDIE"));
        assert!(movie.has_genre("comédie"));
    }

    #[test]
    fn test_catalog_duplicate_ids_keep_first() {
        let catalog = Catalog::new(vec![entry(7, "First"), entry(7, "Second"), entry(8, "Other")]);
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get(7).unwrap().title, "First");
        assert_eq!(catalog.position(8), Some(2));
        assert!(!catalog.contains(9));
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = Catalog::default();
        assert!(catalog.is_empty());
        assert!(catalog.first().is_none());
    }
}
