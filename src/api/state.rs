use std::sync::Arc;
use std::time::Duration;

use crate::{
    config::Config,
    services::{evaluation::GroundTruth, PlaceholderPosters, PosterProvider, Recommender},
};

/// Shared application state
///
/// The session and its evaluation ground truth are built once at startup
/// and only read afterwards, so no lock guards them.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub posters: Arc<dyn PosterProvider>,
    pub ground_truth: Arc<GroundTruth>,
    pub settings: RequestSettings,
}

/// Per-request defaults and limits taken from configuration
#[derive(Debug, Clone, Copy)]
pub struct RequestSettings {
    pub default_top_k: usize,
    pub max_top_k: usize,
    pub relevance_threshold: f64,
    pub poster_timeout: Duration,
}

impl From<&Config> for RequestSettings {
    fn from(config: &Config) -> Self {
        Self {
            default_top_k: config.default_top_k,
            max_top_k: config.max_top_k,
            relevance_threshold: config.relevance_threshold,
            poster_timeout: Duration::from_millis(config.poster_timeout_ms),
        }
    }
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl AppState {
    pub fn new(
        recommender: Recommender,
        posters: Arc<dyn PosterProvider>,
        settings: RequestSettings,
    ) -> Self {
        let ground_truth = recommender.ground_truth(settings.relevance_threshold);
        Self {
            recommender: Arc::new(recommender),
            posters,
            ground_truth: Arc::new(ground_truth),
            settings,
        }
    }

    /// State with placeholder posters and default settings
    pub fn with_recommender(recommender: Recommender) -> Self {
        Self::new(
            recommender,
            Arc::new(PlaceholderPosters),
            RequestSettings::default(),
        )
    }
}
