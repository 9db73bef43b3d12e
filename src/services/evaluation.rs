/// Offline evaluation of ranked recommendations
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::{
    models::{ItemId, UserId},
    services::ratings::UserItemMatrix,
};

pub const DEFAULT_RELEVANCE_THRESHOLD: f64 = 4.0;

/// Held-out relevant items per user
pub type GroundTruth = BTreeMap<UserId, HashSet<ItemId>>;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserEvaluation {
    pub user_id: UserId,
    pub precision_at_k: f64,
    pub hit_rate: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EvaluationReport {
    pub k: usize,
    pub per_user: Vec<UserEvaluation>,
    pub mean_precision: f64,
    pub mean_hit_rate: f64,
}

/// Distinct relevant items among the first `k`, divided by `k`
///
/// Lists shorter than `k` are penalized rather than excluded.
pub fn precision_at_k(recommended: &[ItemId], relevant: &HashSet<ItemId>, k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }
    let hits = recommended
        .iter()
        .take(k)
        .filter(|item| relevant.contains(item))
        .collect::<HashSet<_>>()
        .len();
    hits as f64 / k as f64
}

/// 1.0 when any recommended item is relevant
pub fn hit_rate(recommended: &[ItemId], relevant: &HashSet<ItemId>) -> f64 {
    if recommended.iter().any(|item| relevant.contains(item)) {
        1.0
    } else {
        0.0
    }
}

/// Relevant items per user: aggregated ratings at or above `threshold`
///
/// Reads the pivoted matrix, so a user's duplicate ratings of one item are
/// judged by their average. Every user with at least one rating gets an
/// entry, possibly empty.
pub fn relevant_items(user_items: &UserItemMatrix, threshold: f64) -> GroundTruth {
    user_items
        .users()
        .iter()
        .map(|&user_id| {
            let relevant: HashSet<ItemId> = user_items
                .user_ratings(user_id)
                .into_iter()
                .filter(|&(_, rating)| rating >= threshold)
                .map(|(item_id, _)| item_id)
                .collect();
            (user_id, relevant)
        })
        .collect()
}

/// Scores every user in `ground_truth` with `scoring_fn` and averages the metrics
///
/// An empty ground truth yields means of 0.
pub fn evaluate<F>(mut scoring_fn: F, ground_truth: &GroundTruth, k: usize) -> EvaluationReport
where
    F: FnMut(UserId) -> Vec<ItemId>,
{
    let per_user: Vec<UserEvaluation> = ground_truth
        .iter()
        .map(|(&user_id, relevant)| {
            let recommended = scoring_fn(user_id);
            UserEvaluation {
                user_id,
                precision_at_k: precision_at_k(&recommended, relevant, k),
                hit_rate: hit_rate(&recommended, relevant),
            }
        })
        .collect();

    let mean = |metric: fn(&UserEvaluation) -> f64| {
        if per_user.is_empty() {
            0.0
        } else {
            per_user.iter().map(metric).sum::<f64>() / per_user.len() as f64
        }
    };
    let mean_precision = mean(|u| u.precision_at_k);
    let mean_hit_rate = mean(|u| u.hit_rate);

    tracing::info!(
        users = per_user.len(),
        k,
        mean_precision,
        mean_hit_rate,
        "Evaluation completed"
    );

    EvaluationReport {
        k,
        per_user,
        mean_precision,
        mean_hit_rate,
    }
}
