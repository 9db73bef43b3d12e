use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::{ItemId, Recommendation, Strategy, UserId},
    services::{
        evaluation::{EvaluationReport, GroundTruth},
        posters,
    },
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub seed: Option<ItemId>,
    pub strategy: Option<Strategy>,
    pub k: Option<usize>,
    pub user_id: Option<UserId>,
}

#[derive(Debug, Deserialize)]
pub struct ColdStartQuery {
    /// Comma-separated genre names
    pub genres: Option<String>,
    pub k: Option<usize>,
    pub user_id: Option<UserId>,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateQuery {
    pub user_id: UserId,
    pub seed: Option<ItemId>,
    pub strategy: Option<Strategy>,
    pub k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct MovieSummary {
    pub item_id: ItemId,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct RecommendationView {
    #[serde(flatten)]
    pub recommendation: Recommendation,
    pub poster_url: String,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub strategy: Strategy,
    pub recommendations: Vec<RecommendationView>,
}

#[derive(Debug, Serialize)]
pub struct EvaluationResponse {
    #[serde(flatten)]
    pub report: EvaluationReport,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PosterResponse {
    pub item_id: ItemId,
    pub poster_url: String,
}

impl AppState {
    /// Applies the default and rejects sizes outside `1..=max_top_k`
    fn resolve_k(&self, k: Option<usize>) -> AppResult<usize> {
        let k = k.unwrap_or(self.settings.default_top_k);
        if k == 0 || k > self.settings.max_top_k {
            return Err(AppError::InvalidInput(format!(
                "k must be within 1..={}, got {}",
                self.settings.max_top_k, k
            )));
        }
        Ok(k)
    }

    async fn with_posters(&self, recommendations: Vec<Recommendation>) -> Vec<RecommendationView> {
        let item_ids: Vec<ItemId> = recommendations.iter().map(|r| r.item_id).collect();
        let urls = posters::posters_for(
            self.posters.clone(),
            &item_ids,
            self.settings.poster_timeout,
        )
        .await;

        recommendations
            .into_iter()
            .zip(urls)
            .map(|(recommendation, poster_url)| RecommendationView {
                recommendation,
                poster_url,
            })
            .collect()
    }
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Catalog titles, alphabetically
pub async fn list_movies(State(state): State<AppState>) -> Json<Vec<MovieSummary>> {
    let mut movies: Vec<MovieSummary> = state
        .recommender
        .catalog()
        .entries()
        .iter()
        .map(|entry| MovieSummary {
            item_id: entry.item_id,
            title: entry.title.clone(),
        })
        .collect();
    movies.sort_by(|a, b| a.title.cmp(&b.title));
    Json(movies)
}

/// Users with at least one reconciled rating
pub async fn list_users(State(state): State<AppState>) -> Json<Vec<UserId>> {
    Json(state.recommender.users().to_vec())
}

/// Recommendations for a seed movie under the requested strategy
pub async fn recommend(
    State(state): State<AppState>,
    Query(query): Query<RecommendationQuery>,
) -> AppResult<Json<RecommendationResponse>> {
    let k = state.resolve_k(query.k)?;
    let strategy = query.strategy.unwrap_or_default();

    tracing::info!(
        seed = ?query.seed,
        user_id = ?query.user_id,
        %strategy,
        k,
        "Processing recommendation request"
    );

    let recommendations = state
        .recommender
        .recommend(query.user_id, query.seed, strategy, k);

    tracing::info!(count = recommendations.len(), "Recommendations produced");

    Ok(Json(RecommendationResponse {
        strategy,
        recommendations: state.with_posters(recommendations).await,
    }))
}

/// Popularity ranking filtered by preferred genres, empty for users with ratings
pub async fn cold_start(
    State(state): State<AppState>,
    Query(query): Query<ColdStartQuery>,
) -> AppResult<Json<RecommendationResponse>> {
    let k = state.resolve_k(query.k)?;
    let genres: Vec<&str> = query
        .genres
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .collect();

    let recommendations = state.recommender.cold_start(query.user_id, &genres, k);

    Ok(Json(RecommendationResponse {
        strategy: Strategy::Popularity,
        recommendations: state.with_posters(recommendations).await,
    }))
}

/// Scores one request's recommendations against the user's highly rated movies
pub async fn evaluate(
    State(state): State<AppState>,
    Query(query): Query<EvaluateQuery>,
) -> AppResult<Json<EvaluationResponse>> {
    let k = state.resolve_k(query.k)?;
    let strategy = query.strategy.unwrap_or_default();

    let recommended: Vec<ItemId> = state
        .recommender
        .recommend(Some(query.user_id), query.seed, strategy, k)
        .iter()
        .map(|r| r.item_id)
        .collect();

    let relevant = state
        .ground_truth
        .get(&query.user_id)
        .cloned()
        .unwrap_or_default();
    let ground_truth: GroundTruth = [(query.user_id, relevant)].into_iter().collect();

    let report = state
        .recommender
        .evaluate(|_| recommended.clone(), &ground_truth, k);

    Ok(Json(EvaluationResponse {
        report,
        generated_at: Utc::now(),
    }))
}

/// Poster for a single catalog movie
pub async fn poster(
    State(state): State<AppState>,
    Path(item_id): Path<ItemId>,
) -> AppResult<Json<PosterResponse>> {
    if !state.recommender.catalog().contains(item_id) {
        return Err(AppError::NotFound(format!("Movie {} is not in the catalog", item_id)));
    }

    let poster_url = posters::poster_or_placeholder(
        state.posters.as_ref(),
        item_id,
        state.settings.poster_timeout,
    )
    .await;

    Ok(Json(PosterResponse {
        item_id,
        poster_url,
    }))
}
