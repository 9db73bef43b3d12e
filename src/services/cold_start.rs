/// Cold-start ranking by global quality and popularity
use std::cmp::Ordering;

use crate::models::{Catalog, CatalogEntry, Recommendation};

fn by_quality_then_popularity(a: &&CatalogEntry, b: &&CatalogEntry) -> Ordering {
    b.quality_score
        .partial_cmp(&a.quality_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| {
            b.popularity_score
                .partial_cmp(&a.popularity_score)
                .unwrap_or(Ordering::Equal)
        })
}

fn rank<'a>(candidates: impl Iterator<Item = &'a CatalogEntry>, k: usize) -> Vec<Recommendation> {
    let mut ranked: Vec<&CatalogEntry> = candidates.collect();
    ranked.sort_by(by_quality_then_popularity);
    ranked
        .into_iter()
        .take(k)
        .map(|entry| Recommendation::from_entry(entry, entry.quality_score))
        .collect()
}

/// Top `k` by quality score, ties broken by popularity
pub fn popular(catalog: &Catalog, k: usize) -> Vec<Recommendation> {
    rank(catalog.entries().iter(), k)
}

/// Like [`popular`], restricted to entries sharing a genre with `preferred`
///
/// Genre names compare case-insensitively. When nothing matches, falls back
/// to the unfiltered ranking.
pub fn popular_by_genre<S: AsRef<str>>(
    catalog: &Catalog,
    preferred: &[S],
    k: usize,
) -> Vec<Recommendation> {
    let matches = |entry: &&CatalogEntry| {
        preferred
            .iter()
            .any(|genre| entry.has_genre(genre.as_ref().trim()))
    };

    if !catalog.entries().iter().any(|entry| matches(&entry)) {
        tracing::debug!("No catalog entry matches preferred genres, using global popularity");
        return popular(catalog, k);
    }

    rank(catalog.entries().iter().filter(matches), k)
}

/// Cold-start entry point: nothing for users with history, genre ranking
/// when preferences are known, global popularity otherwise
pub fn cold_start<S: AsRef<str>>(
    catalog: &Catalog,
    user_has_history: bool,
    preferred_genres: &[S],
    k: usize,
) -> Vec<Recommendation> {
    if user_has_history {
        return Vec::new();
    }
    if preferred_genres.is_empty() {
        popular(catalog, k)
    } else {
        popular_by_genre(catalog, preferred_genres, k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemId;

    fn catalog() -> Catalog {
        let rows: [(ItemId, &str, &[&str], f64, f64); 5] = [
            (1, "Alpha", &["Action"], 8.0, 50.0),
            (2, "Beta", &["Comedy"], 6.0, 90.0),
            (3, "Gamma", &["Action", "Drama"], 9.0, 10.0),
            (4, "Delta", &["Drama"], 8.0, 70.0),
            (5, "Epsilon", &["Comedy"], 8.0, 70.0),
        ];
        Catalog::new(
            rows.iter()
                .map(|(id, title, genres, q, p)| {
                    CatalogEntry::new(*id, *title, genres.iter().map(|g| g.to_string()), "", *q, *p)
                })
                .collect(),
        )
    }

    fn ids(recs: &[Recommendation]) -> Vec<ItemId> {
        recs.iter().map(|r| r.item_id).collect()
    }

    #[test]
    fn test_popular_sorts_by_quality_then_popularity() {
        // 4 and 5 tie on both keys and keep catalog order
        assert_eq!(ids(&popular(&catalog(), 5)), vec![3, 4, 5, 1, 2]);
    }

    #[test]
    fn test_popular_truncates() {
        assert_eq!(popular(&catalog(), 2).len(), 2);
        assert!(popular(&catalog(), 0).is_empty());
        assert_eq!(popular(&catalog(), 50).len(), 5);
    }

    #[test]
    fn test_popular_score_is_quality() {
        let recs = popular(&catalog(), 1);
        assert_eq!(recs[0].score, 9.0);
    }

    #[test]
    fn test_genre_filter_case_insensitive() {
        assert_eq!(ids(&popular_by_genre(&catalog(), &["COMEDY"], 5)), vec![5, 2]);
        assert_eq!(ids(&popular_by_genre(&catalog(), &["drama", "action"], 2)), vec![3, 4]);
    }

    #[test]
    fn test_unknown_genre_matches_global() {
        assert_eq!(
            popular_by_genre(&catalog(), &["Western"], 3),
            popular(&catalog(), 3)
        );
    }

    #[test]
    fn test_cold_start_modes() {
        let none: [&str; 0] = [];
        assert!(cold_start(&catalog(), true, &none, 5).is_empty());
        assert_eq!(cold_start(&catalog(), false, &none, 2), popular(&catalog(), 2));
        assert_eq!(ids(&cold_start(&catalog(), false, &["Comedy"], 1)), vec![5]);
    }

    #[test]
    fn test_empty_catalog() {
        assert!(popular(&Catalog::default(), 3).is_empty());
        assert!(popular_by_genre(&Catalog::default(), &["Action"], 3).is_empty());
    }
}
