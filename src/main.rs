use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use valora::{
    api::{create_router, AppState, RequestSettings},
    config::Config,
    data,
    services::{PlaceholderPosters, PosterProvider, Recommender, TmdbPosterProvider},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("valora=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    // Malformed or missing data is fatal here, never at query time
    let catalog = data::load_catalog(&config.catalog_path)?;
    let secondary = data::load_secondary_catalog(&config.secondary_catalog_path)?;
    let ratings = data::load_ratings(&config.ratings_path)?;

    let recommender = Recommender::build(catalog, &secondary, &ratings, config.match_cutoff);

    let posters: Arc<dyn PosterProvider> = match &config.tmdb_api_key {
        Some(api_key) => Arc::new(TmdbPosterProvider::new(
            api_key.clone(),
            config.tmdb_api_url.clone(),
        )),
        None => {
            tracing::warn!("TMDB_API_KEY not set, posters will use placeholders");
            Arc::new(PlaceholderPosters)
        }
    };

    let state = AppState::new(recommender, posters, RequestSettings::from(&config));
    let app = create_router(state);

    let address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
