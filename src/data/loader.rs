use serde::{de::DeserializeOwned, Deserialize};
use std::path::Path;

use crate::{
    error::AppResult,
    models::{CatalogEntry, ExternalItemId, ItemId, RawRating, SecondaryTitle, UserId},
};

#[derive(Debug, Deserialize)]
struct GenreObject {
    name: String,
}

/// Genres as found in the wild: plain names, `{name}` objects, or a string
/// holding either of those encoded as JSON (the TMDB CSV export)
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenreField {
    Names(Vec<String>),
    Objects(Vec<GenreObject>),
    Encoded(String),
}

impl GenreField {
    fn into_names(self) -> Vec<String> {
        match self {
            GenreField::Names(names) => names,
            GenreField::Objects(objects) => objects.into_iter().map(|g| g.name).collect(),
            GenreField::Encoded(raw) => match serde_json::from_str::<GenreField>(&raw) {
                Ok(GenreField::Encoded(_)) | Err(_) => Vec::new(),
                Ok(inner) => inner.into_names(),
            },
        }
    }
}

impl Default for GenreField {
    fn default() -> Self {
        GenreField::Names(Vec::new())
    }
}

#[derive(Debug, Deserialize)]
struct CatalogRecord {
    #[serde(alias = "tmdb_id")]
    id: ItemId,
    title: String,
    #[serde(default)]
    genres: GenreField,
    #[serde(default)]
    overview: Option<String>,
    #[serde(alias = "quality_score", default)]
    vote_average: f64,
    #[serde(alias = "popularity_score", default)]
    popularity: f64,
}

impl From<CatalogRecord> for CatalogEntry {
    fn from(record: CatalogRecord) -> Self {
        CatalogEntry::new(
            record.id,
            record.title,
            record.genres.into_names(),
            record.overview.unwrap_or_default(),
            record.vote_average,
            record.popularity,
        )
    }
}

#[derive(Debug, Deserialize)]
struct SecondaryRecord {
    #[serde(rename = "movieId", alias = "external_item_id")]
    movie_id: ExternalItemId,
    title: String,
}

#[derive(Debug, Deserialize)]
struct RatingRecord {
    #[serde(rename = "userId", alias = "user_id")]
    user_id: UserId,
    #[serde(rename = "movieId", alias = "external_item_id")]
    movie_id: ExternalItemId,
    rating: f64,
}

fn read_json_array<T: DeserializeOwned>(path: &Path) -> AppResult<Vec<T>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn parse_catalog(raw: &str) -> AppResult<Vec<CatalogEntry>> {
    let records: Vec<CatalogRecord> = serde_json::from_str(raw)?;
    Ok(records.into_iter().map(CatalogEntry::from).collect())
}

/// Loads the primary catalog
pub fn load_catalog(path: impl AsRef<Path>) -> AppResult<Vec<CatalogEntry>> {
    let entries = parse_catalog(&std::fs::read_to_string(path.as_ref())?)?;
    tracing::info!(path = %path.as_ref().display(), rows = entries.len(), "Primary catalog loaded");
    Ok(entries)
}

/// Loads the secondary catalog
pub fn load_secondary_catalog(path: impl AsRef<Path>) -> AppResult<Vec<SecondaryTitle>> {
    let records: Vec<SecondaryRecord> = read_json_array(path.as_ref())?;
    tracing::info!(path = %path.as_ref().display(), rows = records.len(), "Secondary catalog loaded");
    Ok(records
        .into_iter()
        .map(|r| SecondaryTitle {
            external_item_id: r.movie_id,
            title: r.title,
        })
        .collect())
}

/// Loads the rating log
pub fn load_ratings(path: impl AsRef<Path>) -> AppResult<Vec<RawRating>> {
    let records: Vec<RatingRecord> = read_json_array(path.as_ref())?;
    tracing::info!(path = %path.as_ref().display(), rows = records.len(), "Rating log loaded");
    Ok(records
        .into_iter()
        .map(|r| RawRating {
            user_id: r.user_id,
            external_item_id: r.movie_id,
            rating: r.rating,
        })
        .collect())
}
