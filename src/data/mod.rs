pub mod loader;

pub use loader::{load_catalog, load_ratings, load_secondary_catalog};
