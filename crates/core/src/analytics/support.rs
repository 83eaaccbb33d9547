//! Item and pair support counting

use std::collections::HashMap;

use crate::domain::basket::Basket;

/// Occurrence counts for single items and unordered item pairs across a history snapshot.
///
/// Pairs are stored under their lexicographically smaller member, so `(a, b)` and `(b, a)`
/// share one counter.
#[derive(Debug, Clone, Default)]
pub struct SupportTable {
    total: usize,
    items: HashMap<String, u32>,
    pairs: HashMap<String, HashMap<String, u32>>,
}

impl SupportTable {
    pub fn from_baskets(baskets: &[Basket]) -> Self {
        let mut table = Self { total: baskets.len().max(1), ..Self::default() };

        for basket in baskets {
            let keys: Vec<String> = basket.item_keys().into_iter().collect();

            for (index, first) in keys.iter().enumerate() {
                *table.items.entry(first.clone()).or_insert(0) += 1;

                // `keys` is sorted, so `first < second` for every later element.
                for second in &keys[index + 1..] {
                    *table
                        .pairs
                        .entry(first.clone())
                        .or_default()
                        .entry(second.clone())
                        .or_insert(0) += 1;
                }
            }
        }

        table
    }

    /// Denominator for support values; never zero.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn count(&self, item: &str) -> u32 {
        self.items.get(item).copied().unwrap_or(0)
    }

    pub fn pair_count(&self, a: &str, b: &str) -> u32 {
        if a == b {
            return 0;
        }
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        self.pairs.get(low).and_then(|row| row.get(high)).copied().unwrap_or(0)
    }

    pub fn support(&self, item: &str) -> f64 {
        f64::from(self.count(item)) / self.total as f64
    }

    pub fn pair_support(&self, a: &str, b: &str) -> f64 {
        f64::from(self.pair_count(a, b)) / self.total as f64
    }

    /// Every item seen in history with its basket count, in no particular order.
    pub fn items(&self) -> impl Iterator<Item = (&str, u32)> {
        self.items.iter().map(|(item, count)| (item.as_str(), *count))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::SupportTable;
    use crate::domain::basket::Basket;

    fn basket(id: &str, items: &[&str]) -> Basket {
        Basket::new(id, items.iter().copied(), "2024-01-01T00:00:00Z")
    }

    #[test]
    fn empty_history_has_unit_denominator() {
        let table = SupportTable::from_baskets(&[]);

        assert_eq!(table.total(), 1);
        assert!(table.is_empty());
        assert_eq!(table.support("milk"), 0.0);
    }

    #[test]
    fn counts_items_and_symmetric_pairs() {
        let table = SupportTable::from_baskets(&[
            basket("1", &["rice", "beans"]),
            basket("2", &["beans", "rice"]),
            basket("3", &["rice"]),
        ]);

        assert_eq!(table.count("rice"), 3);
        assert_eq!(table.count("beans"), 2);
        assert_eq!(table.pair_count("rice", "beans"), 2);
        assert_eq!(table.pair_count("beans", "rice"), 2);
        assert!((table.pair_support("beans", "rice") - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(table.pair_count("rice", "rice"), 0);
    }

    #[test]
    fn duplicate_spellings_count_once_per_basket() {
        let table = SupportTable::from_baskets(&[basket("1", &["Milk", " milk", "bread"])]);

        assert_eq!(table.count("milk"), 1);
        assert_eq!(table.pair_count("bread", "milk"), 1);
        assert_eq!(table.support("milk"), 1.0);
    }
}
