//! Co-occurrence recommender

use std::collections::HashMap;

use tracing::debug;

use super::support::SupportTable;
use super::types::{RecommendOptions, Recommendation};
use super::{CONFIDENCE_WEIGHT, LIFT_CAP, LIFT_WEIGHT};
use crate::domain::basket::Basket;
use crate::domain::list::CurrentList;

/// Ranks items that tend to be bought together with the current list.
#[derive(Debug, Clone, Default)]
pub struct Recommender {
    options: RecommendOptions,
}

impl Recommender {
    pub fn new(options: RecommendOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RecommendOptions {
        &self.options
    }

    /// Recommend items for `current` from the given history snapshot.
    ///
    /// Candidates are scored by the best association rule `x -> y` over the current items.
    /// When no rule fires the result falls back to plain popularity, which ignores
    /// `min_support`.
    pub fn recommend(&self, current: &CurrentList, baskets: &[Basket]) -> Vec<Recommendation> {
        let table = SupportTable::from_baskets(baskets);
        self.recommend_with_table(current, &table)
    }

    pub fn recommend_with_table(
        &self,
        current: &CurrentList,
        table: &SupportTable,
    ) -> Vec<Recommendation> {
        let mut candidates = self.score_candidates(current, table);

        if candidates.is_empty() {
            candidates = popularity_fallback(current, table);
            debug!(
                event_name = "analytics.recommend.fallback",
                candidates = candidates.len(),
                current_items = current.len(),
                "no association rule fired, ranking by popularity"
            );
        } else {
            debug!(
                event_name = "analytics.recommend.scored",
                candidates = candidates.len(),
                current_items = current.len(),
                "scored association-rule candidates"
            );
        }

        rank(candidates, self.options.limit)
    }

    fn score_candidates(&self, current: &CurrentList, table: &SupportTable) -> Vec<Recommendation> {
        let mut best_by_item: HashMap<&str, Recommendation> = HashMap::new();

        for (candidate, _) in table.items() {
            if current.contains(candidate) {
                continue;
            }

            let candidate_support = table.support(candidate);
            if candidate_support < self.options.min_support {
                continue;
            }

            for antecedent in current.iter() {
                let antecedent_support = table.support(antecedent);
                if antecedent_support == 0.0 {
                    continue;
                }
                let pair_support = table.pair_support(antecedent, candidate);
                if pair_support == 0.0 {
                    continue;
                }

                let confidence = pair_support / antecedent_support;
                let lift = confidence / candidate_support;
                let score = blend_score(confidence, lift);

                let improves = best_by_item.get(candidate).map_or(true, |best| score > best.score);
                if improves {
                    best_by_item.insert(
                        candidate,
                        Recommendation {
                            item: candidate.to_owned(),
                            score,
                            confidence,
                            support: candidate_support,
                            lift,
                        },
                    );
                }
            }
        }

        best_by_item.into_values().filter(|recommendation| recommendation.score > 0.0).collect()
    }
}

/// Recommend with explicit options
pub fn recommend(
    current: &CurrentList,
    baskets: &[Basket],
    options: RecommendOptions,
) -> Vec<Recommendation> {
    Recommender::new(options).recommend(current, baskets)
}

/// `0.6 * confidence + 0.4 * min(lift, 3)`
pub(crate) fn blend_score(confidence: f64, lift: f64) -> f64 {
    CONFIDENCE_WEIGHT * confidence + LIFT_WEIGHT * lift.min(LIFT_CAP)
}

fn popularity_fallback(current: &CurrentList, table: &SupportTable) -> Vec<Recommendation> {
    table
        .items()
        .filter(|(item, _)| !current.contains(item))
        .map(|(item, _)| {
            let support = table.support(item);
            Recommendation { item: item.to_owned(), score: support, confidence: 0.0, support, lift: 1.0 }
        })
        .collect()
}

/// Score descending, then item name ascending so equal scores order reproducibly.
fn rank(mut candidates: Vec<Recommendation>, limit: usize) -> Vec<Recommendation> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.item.cmp(&b.item)));
    candidates.truncate(limit);
    candidates
}
