//! Types for the analytics engine

use std::fmt;

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

/// Options for the co-occurrence recommender
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendOptions {
    /// Maximum number of recommendations to return
    pub limit: usize,
    /// Candidates below this support are not scored by association rules
    pub min_support: f64,
}

impl RecommendOptions {
    pub fn new() -> Self {
        Self { limit: super::DEFAULT_LIMIT, min_support: super::DEFAULT_MIN_SUPPORT }
    }

    /// Set max recommendations
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set minimum candidate support
    pub fn with_min_support(mut self, min_support: f64) -> Self {
        self.min_support = min_support;
        self
    }
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// A ranked candidate item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    /// Normalized item name
    pub item: String,
    /// Blended score (0.0 - 1.8)
    pub score: f64,
    /// P(item | best current item), 0 on the popularity fallback
    pub confidence: f64,
    /// Fraction of baskets containing the item
    pub support: f64,
    /// Confidence relative to the item's baseline support, 1 on the popularity fallback
    pub lift: f64,
}

/// Why a tip was produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TipReason {
    /// Ranked by the co-occurrence recommender
    FrequentWithCurrentItems,
    /// Static pair rule triggered by an item on the list
    Complements { item: String },
    /// Seasonal calendar entry for the current month
    Seasonal,
    /// Purchase cadence says the item is due again
    Replenish { interval_days: i64 },
}

impl fmt::Display for TipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TipReason::FrequentWithCurrentItems => f.write_str("frequent with current items"),
            TipReason::Complements { item } => write!(f, "complements {item}"),
            TipReason::Seasonal => f.write_str("seasonal"),
            TipReason::Replenish { interval_days } => {
                write!(f, "usually bought every ~{interval_days} days")
            }
        }
    }
}

impl Serialize for TipReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A complement suggestion; `score` is set only for recommender-sourced entries
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplementTip {
    pub item: String,
    pub reason: TipReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// A seasonal or replenishment suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tip {
    pub item: String,
    pub reason: TipReason,
}

/// The three independent tip lists
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TipsResponse {
    pub complements: Vec<ComplementTip>,
    pub seasonal: Vec<Tip>,
    pub replenishment: Vec<Tip>,
}

impl TipsResponse {
    /// Every suggested item across the three lists, in list order
    pub fn items(&self) -> impl Iterator<Item = &str> {
        self.complements
            .iter()
            .map(|tip| tip.item.as_str())
            .chain(self.seasonal.iter().map(|tip| tip.item.as_str()))
            .chain(self.replenishment.iter().map(|tip| tip.item.as_str()))
    }
}

/// Price statistics for one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceInsight {
    pub item: String,
    /// Mean of every recorded price, 2 decimals
    pub avg: Decimal,
    /// Price in the most recent basket
    pub last: Decimal,
    /// Percent change between the last two prices, 2 decimals
    pub change: Option<Decimal>,
    /// Number of price observations
    pub count: usize,
}

/// Number of baskets an item appeared in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopularItem {
    pub item: String,
    pub count: usize,
}
