//! Shopping tips: complements, seasonal items and replenishment reminders

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Datelike, Utc};
use tracing::debug;

use super::recommender::Recommender;
use super::types::{ComplementTip, RecommendOptions, Tip, TipReason, TipsResponse};
use super::{
    DEFAULT_COMPLEMENT_RECOMMENDATIONS, DEFAULT_MAX_COMPLEMENTS, DEFAULT_MIN_REPLENISH_DAYS,
    DEFAULT_MIN_SUPPORT,
};
use crate::domain::basket::{normalize_item_name, Basket};
use crate::domain::list::CurrentList;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

const DEFAULT_COMPLEMENT_RULES: &[(&str, &str)] = &[
    ("bread", "butter"),
    ("bread", "cheese"),
    ("pasta", "tomato sauce"),
    ("rice", "beans"),
    ("coffee", "coffee filter"),
    ("milk", "cereal"),
    ("meat", "charcoal"),
];

// Southern-hemisphere calendar: summer in Jan/Feb, June festivals, year-end holidays.
const DEFAULT_SEASONAL_ITEMS: &[(u32, &[&str])] = &[
    (1, &["sunscreen", "water"]),
    (2, &["sunscreen", "charcoal"]),
    (3, &["chocolate"]),
    (4, &["chocolate"]),
    (5, &["instant broth", "tea"]),
    (6, &["mulled wine", "corn", "peanuts"]),
    (7, &["hot chocolate", "soups"]),
    (8, &["school supplies"]),
    (9, &["seasonal fruit"]),
    (10, &["candy"]),
    (11, &["panettone", "walnuts"]),
    (12, &["panettone", "chocotone", "sparkling wine"]),
];

/// Symmetric pair rule: having either item on the list suggests the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplementRule {
    pub item: String,
    pub complement: String,
}

impl ComplementRule {
    pub fn new(item: impl AsRef<str>, complement: impl AsRef<str>) -> Self {
        Self {
            item: normalize_item_name(item.as_ref()),
            complement: normalize_item_name(complement.as_ref()),
        }
    }

    pub fn defaults() -> Vec<Self> {
        DEFAULT_COMPLEMENT_RULES.iter().map(|(item, complement)| Self::new(*item, *complement)).collect()
    }
}

/// Month-of-year (1-12) to seasonal items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeasonalCalendar {
    months: BTreeMap<u32, Vec<String>>,
}

impl SeasonalCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the items for `month`. Months outside 1..=12 are never looked up.
    pub fn with_month<I, S>(mut self, month: u32, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let items = items
            .into_iter()
            .map(|item| normalize_item_name(item.as_ref()))
            .filter(|item| !item.is_empty())
            .collect();
        self.months.insert(month, items);
        self
    }

    pub fn items_for(&self, month: u32) -> &[String] {
        self.months.get(&month).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn defaults() -> Self {
        DEFAULT_SEASONAL_ITEMS
            .iter()
            .fold(Self::new(), |calendar, (month, items)| calendar.with_month(*month, items.iter().copied()))
    }
}

/// Tuning knobs for tip composition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TipOptions {
    /// Recommendations requested for the complements list (default: 8)
    pub complement_recommendations: usize,
    /// Cap on the merged complements list (default: 10)
    pub max_complements: usize,
    /// Minimum days since the last purchase before a replenishment tip (default: 7)
    pub min_replenish_days: f64,
    /// Minimum support forwarded to the recommender (default: 0.01)
    pub min_support: f64,
}

impl Default for TipOptions {
    fn default() -> Self {
        Self {
            complement_recommendations: DEFAULT_COMPLEMENT_RECOMMENDATIONS,
            max_complements: DEFAULT_MAX_COMPLEMENTS,
            min_replenish_days: DEFAULT_MIN_REPLENISH_DAYS,
            min_support: DEFAULT_MIN_SUPPORT,
        }
    }
}

/// Builds the complements, seasonal and replenishment lists.
///
/// The rule table and calendar are owned data, so callers can swap them per region
/// without touching global state.
#[derive(Debug, Clone)]
pub struct TipComposer {
    rules: Vec<ComplementRule>,
    calendar: SeasonalCalendar,
    options: TipOptions,
}

impl Default for TipComposer {
    fn default() -> Self {
        Self::new(ComplementRule::defaults(), SeasonalCalendar::defaults())
    }
}

impl TipComposer {
    pub fn new(rules: Vec<ComplementRule>, calendar: SeasonalCalendar) -> Self {
        Self { rules, calendar, options: TipOptions::default() }
    }

    pub fn with_options(mut self, options: TipOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &TipOptions {
        &self.options
    }

    /// Compose tips against the wall clock.
    pub fn compose(&self, current: &CurrentList, baskets: &[Basket]) -> TipsResponse {
        self.compose_at(current, baskets, Utc::now())
    }

    /// Compose tips as of `now`.
    pub fn compose_at(
        &self,
        current: &CurrentList,
        baskets: &[Basket],
        now: DateTime<Utc>,
    ) -> TipsResponse {
        let tips = TipsResponse {
            complements: self.complements(current, baskets),
            seasonal: self.seasonal(current, now),
            replenishment: self.replenishment(current, baskets, now),
        };

        debug!(
            event_name = "analytics.tips.composed",
            complements = tips.complements.len(),
            seasonal = tips.seasonal.len(),
            replenishment = tips.replenishment.len(),
            baskets = baskets.len(),
            "shopping tips composed"
        );

        tips
    }

    pub fn complements(&self, current: &CurrentList, baskets: &[Basket]) -> Vec<ComplementTip> {
        let recommender = Recommender::new(
            RecommendOptions::new()
                .with_limit(self.options.complement_recommendations)
                .with_min_support(self.options.min_support),
        );

        let from_history = recommender.recommend(current, baskets).into_iter().map(|recommendation| {
            ComplementTip {
                item: recommendation.item,
                reason: TipReason::FrequentWithCurrentItems,
                score: Some(recommendation.score),
            }
        });

        let from_rules = self.rules.iter().flat_map(|rule| {
            let forward = (current.contains(&rule.item) && !current.contains(&rule.complement))
                .then(|| rule_tip(&rule.complement, &rule.item));
            let backward = (current.contains(&rule.complement) && !current.contains(&rule.item))
                .then(|| rule_tip(&rule.item, &rule.complement));
            forward.into_iter().chain(backward)
        });

        let mut seen = HashSet::new();
        from_history
            .chain(from_rules)
            .filter(|tip| seen.insert(tip.item.clone()))
            .take(self.options.max_complements)
            .collect()
    }

    pub fn seasonal(&self, current: &CurrentList, now: DateTime<Utc>) -> Vec<Tip> {
        self.calendar
            .items_for(now.month())
            .iter()
            .filter(|item| !current.contains(item))
            .map(|item| Tip { item: item.clone(), reason: TipReason::Seasonal })
            .collect()
    }

    /// Items whose average purchase interval says they are due again.
    pub fn replenishment(
        &self,
        current: &CurrentList,
        baskets: &[Basket],
        now: DateTime<Utc>,
    ) -> Vec<Tip> {
        let mut purchases: BTreeMap<String, Vec<DateTime<Utc>>> = BTreeMap::new();
        let mut undated = 0usize;

        for basket in baskets {
            let Some(created_at) = basket.created_at_utc() else {
                undated += 1;
                continue;
            };
            for item in basket.item_keys() {
                purchases.entry(item).or_default().push(created_at);
            }
        }

        if undated > 0 {
            debug!(
                event_name = "analytics.tips.undated_baskets",
                undated,
                "baskets without a parsable timestamp skipped for replenishment"
            );
        }

        let mut tips: Vec<Tip> = purchases
            .into_iter()
            .filter(|(item, _)| !current.contains(item))
            .filter_map(|(item, mut dates)| {
                dates.sort();
                let cadence = PurchaseCadence::from_sorted(&dates, now)?;
                cadence.is_due(self.options.min_replenish_days).then(|| Tip {
                    item,
                    reason: TipReason::Replenish { interval_days: cadence.mean_interval_days.round() as i64 },
                })
            })
            .collect();

        tips.sort_by_cached_key(|tip| (tip.reason.to_string(), tip.item.clone()));
        tips
    }
}

/// Build tips with the default rules and calendar against the wall clock.
pub fn build_tips(current: &CurrentList, baskets: &[Basket]) -> TipsResponse {
    TipComposer::default().compose(current, baskets)
}

fn rule_tip(item: &str, trigger: &str) -> ComplementTip {
    ComplementTip {
        item: item.to_owned(),
        reason: TipReason::Complements { item: trigger.to_owned() },
        score: None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PurchaseCadence {
    mean_interval_days: f64,
    days_since_last: f64,
}

impl PurchaseCadence {
    /// Needs at least two purchases to estimate an interval.
    fn from_sorted(dates: &[DateTime<Utc>], now: DateTime<Utc>) -> Option<Self> {
        if dates.len() < 2 {
            return None;
        }
        let last = *dates.last()?;

        let total_days: f64 = dates.windows(2).map(|pair| days_between(pair[0], pair[1])).sum();
        let mean_interval_days = total_days / (dates.len() - 1) as f64;

        Some(Self { mean_interval_days, days_since_last: days_between(last, now) })
    }

    fn is_due(&self, min_days: f64) -> bool {
        self.days_since_last >= min_days.max(self.mean_interval_days - 1.0)
    }
}

fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MILLIS_PER_DAY
}
