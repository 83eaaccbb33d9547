use std::collections::HashMap;

use super::types::PopularItem;
use crate::domain::basket::Basket;

/// Items ranked by the number of baskets they appear in, ties broken by name.
pub fn popular_items(baskets: &[Basket], limit: usize) -> Vec<PopularItem> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for basket in baskets {
        for item in basket.item_keys() {
            *counts.entry(item).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<PopularItem> =
        counts.into_iter().map(|(item, count)| PopularItem { item, count }).collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.item.cmp(&b.item)));
    ranked.truncate(limit);
    ranked
}
