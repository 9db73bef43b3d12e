/// Catalog reconciliation
///
/// Aligns the secondary catalog's identifiers with the primary catalog by
/// fuzzy-matching normalized titles. Unmatched secondary titles are dropped
/// silently; several secondary ids may map to the same primary id.
use std::collections::HashMap;

use crate::models::{Catalog, ExternalItemId, ItemId, SecondaryTitle};

pub const DEFAULT_MATCH_CUTOFF: f64 = 0.85;

/// Normalizes a title for matching
///
/// Lowercases, strips a trailing `(YYYY)` year, keeps only ASCII letters,
/// digits and spaces, then collapses runs of whitespace.
pub fn normalize_title(title: &str) -> String {
    let lowered = title.trim().to_lowercase();
    let without_year = strip_trailing_year(&lowered);

    let kept: String = without_year
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect();

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_trailing_year(title: &str) -> &str {
    let bytes = title.as_bytes();
    if bytes.len() >= 6 {
        let tail = &bytes[bytes.len() - 6..];
        if tail[0] == b'(' && tail[5] == b')' && tail[1..5].iter().all(u8::is_ascii_digit) {
            return title[..title.len() - 6].trim_end();
        }
    }
    title
}

/// External id → canonical id table
///
/// Not total (unmatched externals are absent) and not injective.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentifierMapping {
    rows: Vec<(ExternalItemId, ItemId)>,
    lookup: HashMap<ExternalItemId, ItemId>,
}

impl IdentifierMapping {
    pub fn from_rows(rows: Vec<(ExternalItemId, ItemId)>) -> Self {
        let mut lookup = HashMap::with_capacity(rows.len());
        for &(external, item) in &rows {
            lookup.entry(external).or_insert(item);
        }
        Self { rows, lookup }
    }

    pub fn get(&self, external_item_id: ExternalItemId) -> Option<ItemId> {
        self.lookup.get(&external_item_id).copied()
    }

    pub fn rows(&self) -> &[(ExternalItemId, ItemId)] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Fuzzy title matcher over the primary catalog's normalized titles
pub struct TitleMatcher<'a> {
    /// Distinct normalized titles in catalog order, each with its first item id
    titles: Vec<(&'a str, ItemId)>,
    exact: HashMap<&'a str, ItemId>,
    cutoff: f64,
}

impl<'a> TitleMatcher<'a> {
    pub fn new(catalog: &'a Catalog, cutoff: f64) -> Self {
        let mut titles = Vec::with_capacity(catalog.len());
        let mut exact = HashMap::with_capacity(catalog.len());

        for entry in catalog.entries() {
            let title = entry.normalized_title.as_str();
            if !exact.contains_key(title) {
                exact.insert(title, entry.item_id);
                titles.push((title, entry.item_id));
            }
        }

        Self {
            titles,
            exact,
            cutoff: cutoff.clamp(0.0, 1.0),
        }
    }

    /// Best-scoring primary id for an already normalized title, if any clears the cutoff
    pub fn best_match(&self, normalized: &str) -> Option<ItemId> {
        if let Some(&item_id) = self.exact.get(normalized) {
            return Some(item_id);
        }

        let query_len = normalized.chars().count();
        let mut best: Option<(f64, ItemId)> = None;

        for &(candidate, item_id) in &self.titles {
            let floor = best.map_or(self.cutoff, |(score, _)| score);
            if length_bound(query_len, candidate.chars().count()) < floor {
                continue;
            }

            let score = strsim::normalized_levenshtein(normalized, candidate);
            let improves = match best {
                Some((best_score, _)) => score > best_score,
                None => score >= self.cutoff,
            };
            if improves {
                best = Some((score, item_id));
            }
        }

        best.map(|(_, item_id)| item_id)
    }
}

/// Upper bound of normalized Levenshtein similarity given only the lengths
fn length_bound(a: usize, b: usize) -> f64 {
    let longest = a.max(b);
    if longest == 0 {
        return 1.0;
    }
    1.0 - (a.abs_diff(b) as f64 / longest as f64)
}

/// Builds the identifier mapping from secondary titles to primary ids
pub fn reconcile(
    primary: &Catalog,
    secondary: &[SecondaryTitle],
    cutoff: f64,
) -> IdentifierMapping {
    let matcher = TitleMatcher::new(primary, cutoff);
    let mut memo: HashMap<String, Option<ItemId>> = HashMap::new();
    let mut rows = Vec::new();

    for title in secondary {
        let normalized = normalize_title(&title.title);
        let matched = *memo
            .entry(normalized)
            .or_insert_with_key(|key| matcher.best_match(key));

        if let Some(item_id) = matched {
            rows.push((title.external_item_id, item_id));
        }
    }

    tracing::info!(
        secondary_titles = secondary.len(),
        matched = rows.len(),
        unmatched = secondary.len() - rows.len(),
        cutoff = cutoff,
        "Catalog reconciliation completed"
    );

    IdentifierMapping::from_rows(rows)
}
