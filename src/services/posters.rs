/// Poster lookup
///
/// Posters are cosmetic: lookups run under a timeout and every failure
/// degrades to a placeholder URL instead of reaching the recommendation path.
use reqwest::Client as HttpClient;
use serde::Deserialize;
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::ItemId,
};

pub const PLACEHOLDER_POSTER_URL: &str =
    "https://placehold.co/500x750/1a1a1a/e50914?text=Poster+Unavailable";

const POSTER_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";

/// Source of poster image URLs
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PosterProvider: Send + Sync {
    /// Poster URL for an item, `None` when the source has no poster
    async fn fetch_poster(&self, item_id: ItemId) -> AppResult<Option<String>>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Looks up a poster, falling back to the placeholder on error, timeout or absence
pub async fn poster_or_placeholder(
    provider: &dyn PosterProvider,
    item_id: ItemId,
    timeout: Duration,
) -> String {
    match tokio::time::timeout(timeout, provider.fetch_poster(item_id)).await {
        Ok(Ok(Some(url))) => url,
        Ok(Ok(None)) => PLACEHOLDER_POSTER_URL.to_string(),
        Ok(Err(e)) => {
            tracing::warn!(item_id, provider = provider.name(), error = %e, "Poster lookup failed");
            PLACEHOLDER_POSTER_URL.to_string()
        }
        Err(_) => {
            tracing::warn!(
                item_id,
                provider = provider.name(),
                timeout_ms = timeout.as_millis(),
                "Poster lookup timed out"
            );
            PLACEHOLDER_POSTER_URL.to_string()
        }
    }
}

/// Resolves posters for several items in parallel, preserving input order
pub async fn posters_for(
    provider: Arc<dyn PosterProvider>,
    item_ids: &[ItemId],
    timeout: Duration,
) -> Vec<String> {
    let mut tasks = Vec::with_capacity(item_ids.len());
    for &item_id in item_ids {
        let provider = provider.clone();
        tasks.push(tokio::spawn(async move {
            poster_or_placeholder(provider.as_ref(), item_id, timeout).await
        }));
    }

    let mut urls = Vec::with_capacity(tasks.len());
    for task in tasks {
        match task.await {
            Ok(url) => urls.push(url),
            Err(e) => {
                tracing::error!(error = %e, "Poster task join error");
                urls.push(PLACEHOLDER_POSTER_URL.to_string());
            }
        }
    }
    urls
}

/// Provider used when no poster API is configured
pub struct PlaceholderPosters;

#[async_trait::async_trait]
impl PosterProvider for PlaceholderPosters {
    async fn fetch_poster(&self, _item_id: ItemId) -> AppResult<Option<String>> {
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "placeholder"
    }
}

#[derive(Debug, Deserialize)]
struct TmdbMovieDetails {
    #[serde(default)]
    poster_path: Option<String>,
}

/// TMDB movie-details lookup; successful answers are memoized in-process
#[derive(Clone)]
pub struct TmdbPosterProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    resolved: Arc<RwLock<HashMap<ItemId, Option<String>>>>,
}

impl TmdbPosterProvider {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            resolved: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn poster_url(details: TmdbMovieDetails) -> Option<String> {
        details
            .poster_path
            .filter(|path| !path.is_empty())
            .map(|path| format!("{}{}", POSTER_IMAGE_BASE, path))
    }
}

#[async_trait::async_trait]
impl PosterProvider for TmdbPosterProvider {
    async fn fetch_poster(&self, item_id: ItemId) -> AppResult<Option<String>> {
        if let Some(cached) = self.resolved.read().await.get(&item_id) {
            return Ok(cached.clone());
        }

        let url = format!("{}/3/movie/{}", self.api_url, item_id);
        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {} for movie {}",
                response.status(),
                item_id
            )));
        }

        let details: TmdbMovieDetails = response.json().await?;
        let poster = Self::poster_url(details);

        self.resolved.write().await.insert(item_id, poster.clone());
        tracing::debug!(item_id, found = poster.is_some(), provider = "tmdb", "Poster resolved");

        Ok(poster)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowPosters;

    #[async_trait::async_trait]
    impl PosterProvider for SlowPosters {
        async fn fetch_poster(&self, _item_id: ItemId) -> AppResult<Option<String>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Some("https://example.com/late.jpg".to_string()))
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_poster_found() {
        let mut provider = MockPosterProvider::new();
        provider
            .expect_fetch_poster()
            .returning(|id| Ok(Some(format!("https://example.com/{}.jpg", id))));
        provider.expect_name().return_const("mock");

        let url = poster_or_placeholder(&provider, 862, Duration::from_secs(1)).await;
        assert_eq!(url, "https://example.com/862.jpg");
    }

    #[tokio::test]
    async fn test_error_degrades_to_placeholder() {
        let mut provider = MockPosterProvider::new();
        provider
            .expect_fetch_poster()
            .returning(|_| Err(AppError::ExternalApi("boom".to_string())));
        provider.expect_name().return_const("mock");

        let url = poster_or_placeholder(&provider, 1, Duration::from_secs(1)).await;
        assert_eq!(url, PLACEHOLDER_POSTER_URL);
    }

    #[tokio::test]
    async fn test_timeout_degrades_to_placeholder() {
        let url = poster_or_placeholder(&SlowPosters, 1, Duration::from_millis(10)).await;
        assert_eq!(url, PLACEHOLDER_POSTER_URL);
    }

    #[test]
    fn test_placeholder_provider() {
        let url = tokio_test::block_on(poster_or_placeholder(
            &PlaceholderPosters,
            5,
            Duration::from_millis(100),
        ));
        assert_eq!(url, PLACEHOLDER_POSTER_URL);
    }

    #[tokio::test]
    async fn test_posters_for_preserves_order() {
        let mut provider = MockPosterProvider::new();
        provider
            .expect_fetch_poster()
            .returning(|id| Ok((id % 2 == 0).then(|| format!("https://example.com/{}.jpg", id))));
        provider.expect_name().return_const("mock");

        let urls = posters_for(Arc::new(provider), &[2, 3, 4], Duration::from_secs(1)).await;
        assert_eq!(
            urls,
            vec![
                "https://example.com/2.jpg".to_string(),
                PLACEHOLDER_POSTER_URL.to_string(),
                "https://example.com/4.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn test_tmdb_poster_url() {
        let details: TmdbMovieDetails =
            serde_json::from_str(r#"{"id": 862, "poster_path": "/uXDfjJbdP4ijW5hWSBrPrlKpxab.jpg"}"#)
                .unwrap();
        assert_eq!(
            TmdbPosterProvider::poster_url(details),
            Some("https://image.tmdb.org/t/p/w500/uXDfjJbdP4ijW5hWSBrPrlKpxab.jpg".to_string())
        );

        let missing: TmdbMovieDetails = serde_json::from_str(r#"{"id": 1, "poster_path": null}"#).unwrap();
        assert_eq!(TmdbPosterProvider::poster_url(missing), None);
    }
}
