//! Basket analytics engine
//!
//! Co-occurrence recommendations, shopping tips, price insights and popularity
//! ranking computed from a snapshot of basket history. Every entry point is a
//! synchronous function of its inputs: nothing here reads storage, caches results
//! or mutates the baskets it is given.

mod popularity;
mod prices;
mod recommender;
mod support;
mod tips;
mod types;

pub use popularity::popular_items;
pub use prices::price_insights;
pub use recommender::{recommend, Recommender};
pub use support::SupportTable;
pub use tips::{build_tips, ComplementRule, SeasonalCalendar, TipComposer, TipOptions};
pub use types::*;

/// Default number of recommendations returned
pub const DEFAULT_LIMIT: usize = 10;

/// Minimum item support for a candidate to be scored by association rules
pub const DEFAULT_MIN_SUPPORT: f64 = 0.01;

/// Weight of the rule confidence in the blended score
pub const CONFIDENCE_WEIGHT: f64 = 0.6;

/// Weight of the (capped) lift in the blended score
pub const LIFT_WEIGHT: f64 = 0.4;

/// Lift above this value stops raising the score
pub const LIFT_CAP: f64 = 3.0;

/// Upper bound of any blended score
pub const MAX_SCORE: f64 = CONFIDENCE_WEIGHT + LIFT_WEIGHT * LIFT_CAP;

/// Recommendations requested when building complement tips
pub const DEFAULT_COMPLEMENT_RECOMMENDATIONS: usize = 8;

/// Maximum complement tips returned
pub const DEFAULT_MAX_COMPLEMENTS: usize = 10;

/// Floor, in days, before an item can be suggested for replenishment
pub const DEFAULT_MIN_REPLENISH_DAYS: f64 = 7.0;
