//! Per-item price insights

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;

use super::types::PriceInsight;
use crate::domain::basket::{normalize_item_name, Basket};

/// Average, latest and trend of every recorded item price.
///
/// Baskets are replayed oldest first; baskets without a parsable timestamp are replayed
/// before all dated ones so they never count as the latest observation when dated data
/// exists.
pub fn price_insights(baskets: &[Basket]) -> Vec<PriceInsight> {
    let mut ordered: Vec<&Basket> = baskets.iter().collect();
    ordered.sort_by_key(|basket| basket.created_at_utc());

    let mut observations: BTreeMap<String, Vec<Decimal>> = BTreeMap::new();
    for basket in ordered {
        for line in basket.items_detailed.iter().flatten() {
            let Some(price) = line.price else {
                continue;
            };
            let name = normalize_item_name(&line.name);
            if name.is_empty() {
                continue;
            }
            observations.entry(name).or_default().push(price);
        }
    }

    let mut insights: Vec<PriceInsight> = observations
        .into_iter()
        .filter_map(|(item, prices)| {
            let insight = summarize(&item, &prices);
            if insight.is_none() {
                warn!(
                    event_name = "analytics.prices.overflow",
                    item = %item,
                    observations = prices.len(),
                    "price aggregation overflowed, item skipped"
                );
            }
            insight
        })
        .collect();

    insights.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.item.cmp(&b.item)));
    insights
}

fn summarize(item: &str, prices: &[Decimal]) -> Option<PriceInsight> {
    let (&last, earlier) = prices.split_last()?;

    let sum = prices.iter().try_fold(Decimal::ZERO, |acc, price| acc.checked_add(*price))?;
    let avg = sum.checked_div(Decimal::from(prices.len()))?;

    let change = earlier
        .last()
        .filter(|previous| !previous.is_zero())
        .and_then(|previous| {
            last.checked_sub(*previous)?.checked_div(*previous)?.checked_mul(Decimal::ONE_HUNDRED)
        })
        .map(round_cents);

    Some(PriceInsight {
        item: item.to_owned(),
        avg: round_cents(avg),
        last: round_cents(last),
        change,
        count: prices.len(),
    })
}

fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::price_insights;
    use crate::domain::basket::{Basket, DetailedItem};

    fn priced(id: &str, created_at: &str, lines: &[(&str, Option<i64>)]) -> Basket {
        let detailed = lines
            .iter()
            .map(|(name, cents)| {
                let line = DetailedItem::new(*name);
                match cents {
                    Some(cents) => line.with_price(Decimal::new(*cents, 2)),
                    None => line,
                }
            })
            .collect::<Vec<_>>();
        let names = lines.iter().map(|(name, _)| *name);
        Basket::new(id, names, created_at).with_detailed_items(detailed)
    }

    #[test]
    fn empty_history_has_no_insights() {
        assert!(price_insights(&[]).is_empty());
    }

    #[test]
    fn two_prices_report_average_last_and_change() {
        // Newest first, the order history providers hand out.
        let baskets = vec![
            priced("2", "2024-02-01T00:00:00Z", &[("coffee", Some(1200))]),
            priced("1", "2024-01-01T00:00:00Z", &[("Coffee", Some(1000))]),
        ];

        let insights = price_insights(&baskets);

        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].item, "coffee");
        assert_eq!(insights[0].avg, Decimal::new(1100, 2));
        assert_eq!(insights[0].last, Decimal::new(1200, 2));
        assert_eq!(insights[0].change, Some(Decimal::new(2000, 2)));
        assert_eq!(insights[0].count, 2);
    }

    #[test]
    fn single_price_has_no_change() {
        let insights =
            price_insights(&[priced("1", "2024-01-01T00:00:00Z", &[("milk", Some(499))])]);

        assert_eq!(insights[0].change, None);
        assert_eq!(insights[0].last, Decimal::new(499, 2));
    }

    #[test]
    fn zero_previous_price_has_no_change() {
        let insights = price_insights(&[
            priced("1", "2024-01-01T00:00:00Z", &[("sample", Some(0))]),
            priced("2", "2024-01-02T00:00:00Z", &[("sample", Some(300))]),
        ]);

        assert_eq!(insights[0].change, None);
        assert_eq!(insights[0].avg, Decimal::new(150, 2));
    }

    #[test]
    fn unpriced_items_are_excluded_and_rounding_is_half_up() {
        let insights = price_insights(&[
            priced("1", "2024-01-01T00:00:00Z", &[("bread", Some(300)), ("salt", None)]),
            priced("2", "2024-01-08T00:00:00Z", &[("bread", Some(301))]),
            priced("3", "2024-01-15T00:00:00Z", &[("bread", Some(302))]),
        ]);

        assert_eq!(insights.len(), 1);
        // (3.00 + 3.01 + 3.02) / 3 = 3.01; (3.02 - 3.01) / 3.01 = 0.3322...%
        assert_eq!(insights[0].avg, Decimal::new(301, 2));
        assert_eq!(insights[0].change, Some(Decimal::new(33, 2)));
    }

    #[test]
    fn sorted_by_count_then_name() {
        let insights = price_insights(&[
            priced("1", "2024-01-01T00:00:00Z", &[("tea", Some(500)), ("eggs", Some(900))]),
            priced("2", "2024-01-02T00:00:00Z", &[("eggs", Some(950)), ("apples", Some(400))]),
        ]);

        let items: Vec<&str> = insights.iter().map(|insight| insight.item.as_str()).collect();
        assert_eq!(items, vec!["eggs", "apples", "tea"]);
    }

    #[test]
    fn undated_baskets_never_become_the_latest_price() {
        let insights = price_insights(&[
            priced("dated", "2024-01-10T00:00:00Z", &[("rice", Some(2000))]),
            priced("undated", "sometime", &[("rice", Some(2500))]),
        ]);

        assert_eq!(insights[0].last, Decimal::new(2000, 2));
        assert_eq!(insights[0].count, 2);
        assert_eq!(insights[0].change, Some(Decimal::new(-2000, 2)));
    }

    #[test]
    fn extreme_prices_of_opposite_sign_drop_the_change() {
        let baskets = vec![
            Basket::new("1", ["gold"], "2024-01-01T00:00:00Z")
                .with_detailed_items(vec![DetailedItem::new("gold").with_price(-Decimal::MAX)]),
            Basket::new("2", ["gold"], "2024-01-02T00:00:00Z")
                .with_detailed_items(vec![DetailedItem::new("gold").with_price(Decimal::MAX)]),
        ];

        let insights = price_insights(&baskets);

        // The difference overflows, so only the change is unavailable.
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].last, Decimal::MAX);
        assert_eq!(insights[0].avg, Decimal::ZERO);
        assert_eq!(insights[0].change, None);
    }
}
