pub mod cold_start;
pub mod collaborative;
pub mod content;
pub mod evaluation;
pub mod posters;
pub mod ratings;
pub mod reconciler;
pub mod recommender;
pub mod similarity;

pub use posters::{PlaceholderPosters, PosterProvider, TmdbPosterProvider};
pub use recommender::Recommender;
