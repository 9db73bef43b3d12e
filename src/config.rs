use serde::Deserialize;

use crate::services::{evaluation::DEFAULT_RELEVANCE_THRESHOLD, reconciler::DEFAULT_MATCH_CUTOFF};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Primary (TMDB-style) catalog, JSON array
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Secondary (MovieLens-style) catalog, JSON array
    #[serde(default = "default_secondary_catalog_path")]
    pub secondary_catalog_path: String,

    /// Rating log keyed by secondary ids, JSON array
    #[serde(default = "default_ratings_path")]
    pub ratings_path: String,

    /// Minimum title similarity for catalog reconciliation
    #[serde(default = "default_match_cutoff")]
    pub match_cutoff: f64,

    #[serde(default = "default_top_k")]
    pub default_top_k: usize,

    #[serde(default = "default_max_top_k")]
    pub max_top_k: usize,

    /// Ratings at or above this value count as relevant during evaluation
    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: f64,

    /// TMDB API key; posters degrade to placeholders when absent
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    #[serde(default = "default_poster_timeout_ms")]
    pub poster_timeout_ms: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_catalog_path() -> String {
    "data/tmdb_5000_movies.json".to_string()
}

fn default_secondary_catalog_path() -> String {
    "data/movielens_movies.json".to_string()
}

fn default_ratings_path() -> String {
    "data/movielens_ratings.json".to_string()
}

fn default_match_cutoff() -> f64 {
    DEFAULT_MATCH_CUTOFF
}

fn default_top_k() -> usize {
    10
}

fn default_max_top_k() -> usize {
    50
}

fn default_relevance_threshold() -> f64 {
    DEFAULT_RELEVANCE_THRESHOLD
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org".to_string()
}

fn default_poster_timeout_ms() -> u64 {
    3000
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            secondary_catalog_path: default_secondary_catalog_path(),
            ratings_path: default_ratings_path(),
            match_cutoff: default_match_cutoff(),
            default_top_k: default_top_k(),
            max_top_k: default_max_top_k(),
            relevance_threshold: default_relevance_threshold(),
            tmdb_api_key: None,
            tmdb_api_url: default_tmdb_api_url(),
            poster_timeout_ms: default_poster_timeout_ms(),
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the recommendation pipeline cannot work with
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.match_cutoff) {
            anyhow::bail!("match_cutoff must be within [0, 1], got {}", self.match_cutoff);
        }
        if self.default_top_k == 0 || self.default_top_k > self.max_top_k {
            anyhow::bail!(
                "default_top_k must be within 1..={}, got {}",
                self.max_top_k,
                self.default_top_k
            );
        }
        Ok(())
    }
}
