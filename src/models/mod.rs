mod movie;
mod rating;
mod recommendation;

pub use movie::{Catalog, CatalogEntry, ExternalItemId, ItemId, SecondaryTitle, UserId};
pub use rating::{RatingEvent, RawRating};
pub use recommendation::{Recommendation, Strategy};
