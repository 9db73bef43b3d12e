use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::{CatalogEntry, ItemId};

/// A scored recommendation produced for a single request
///
/// Scores are only comparable within the strategy that produced them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub item_id: ItemId,
    pub title: String,
    pub score: f64,
    pub quality_score: f64,
    pub popularity_score: f64,
}

impl Recommendation {
    pub fn from_entry(entry: &CatalogEntry, score: f64) -> Self {
        Self {
            item_id: entry.item_id,
            title: entry.title.clone(),
            score,
            quality_score: entry.quality_score,
            popularity_score: entry.popularity_score,
        }
    }
}

/// Requested recommendation strategy
///
/// Names are matched case-insensitively and the dashboard spellings
/// ("Content-Based") are accepted. Anything unrecognized becomes
/// `Popularity`, the global cold-start ranking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Strategy {
    Content,
    Collaborative,
    #[default]
    Hybrid,
    Popularity,
}

impl Strategy {
    pub fn from_name(name: &str) -> Self {
        let key: String = name
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();

        match key.as_str() {
            "content" | "content_based" => Strategy::Content,
            "collaborative" | "collaborative_filtering" | "cf" => Strategy::Collaborative,
            "hybrid" => Strategy::Hybrid,
            _ => Strategy::Popularity,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Content => "content",
            Strategy::Collaborative => "collaborative",
            Strategy::Hybrid => "hybrid",
            Strategy::Popularity => "popularity",
        }
    }
}

impl From<String> for Strategy {
    fn from(name: String) -> Self {
        Strategy::from_name(&name)
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_accepts_dashboard_names() {
        assert_eq!(Strategy::from_name("Content-Based"), Strategy::Content);
        assert_eq!(Strategy::from_name("Collaborative"), Strategy::Collaborative);
        assert_eq!(Strategy::from_name("Hybrid"), Strategy::Hybrid);
    }

    #[test]
    fn test_unknown_strategy_is_popularity() {
        assert_eq!(Strategy::from_name("trending"), Strategy::Popularity);
        assert_eq!(Strategy::from_name(""), Strategy::Popularity);
    }

    #[test]
    fn test_strategy_serde() {
        let json = serde_json::to_string(&Strategy::Collaborative).unwrap();
        assert_eq!(json, "\"collaborative\"");

        let parsed: Strategy = serde_json::from_str("\"CONTENT\"").unwrap();
        assert_eq!(parsed, Strategy::Content);

        let parsed: Strategy = serde_json::from_str("\"something-else\"").unwrap();
        assert_eq!(parsed, Strategy::Popularity);
    }

    #[test]
    fn test_recommendation_from_entry() {
        let entry = CatalogEntry::new(3, "Gamma", Vec::new(), "", 9.0, 40.0);
        let rec = Recommendation::from_entry(&entry, 0.5);
        assert_eq!(rec.item_id, 3);
        assert_eq!(rec.title, "Gamma");
        assert_eq!(rec.score, 0.5);
        assert_eq!(rec.quality_score, 9.0);
        assert_eq!(rec.popularity_score, 40.0);
    }
}
