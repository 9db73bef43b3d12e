use serde::{Deserialize, Serialize};

use super::{ExternalItemId, ItemId, UserId};

/// A rating as it appears in the source log, keyed by the secondary catalog's ids
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RawRating {
    pub user_id: UserId,
    pub external_item_id: ExternalItemId,
    pub rating: f64,
}

/// A rating projected onto the canonical item id space
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RatingEvent {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub rating: f64,
}
