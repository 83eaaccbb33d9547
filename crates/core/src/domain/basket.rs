use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::DomainError;

pub const DEFAULT_QTY: f64 = 1.0;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BasketId(pub String);

impl BasketId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Lower-cases and trims an item name. Every item key in the engine goes through here.
pub fn normalize_item_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// One line of an itemized basket.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedItem {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_qty", deserialize_with = "lenient_qty")]
    pub qty: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
}

impl DetailedItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), qty: DEFAULT_QTY, category: None, unit: None, price: None }
    }

    pub fn with_qty(mut self, qty: f64) -> Self {
        self.qty = qty;
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    fn normalized(self) -> Option<Self> {
        let name = normalize_item_name(&self.name);
        if name.is_empty() {
            return None;
        }

        Some(Self {
            name,
            qty: sanitize_qty(self.qty),
            category: trimmed_or_none(self.category),
            unit: trimmed_or_none(self.unit),
            price: self.price,
        })
    }
}

/// A completed shopping trip as handed over by the history provider.
///
/// `created_at` keeps the raw ISO string: an unparsable value must not reject the
/// basket, it only removes it from time-based analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Basket {
    pub id: BasketId,
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub items_detailed: Option<Vec<DetailedItem>>,
    #[serde(default)]
    pub store: Option<String>,
    #[serde(default)]
    pub total: Option<Decimal>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Basket {
    pub fn new<I, S>(id: impl Into<String>, items: I, created_at: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: BasketId(id.into()),
            items: items.into_iter().map(Into::into).collect(),
            items_detailed: None,
            store: None,
            total: None,
            created_at: created_at.into(),
            user_id: None,
        }
    }

    pub fn with_detailed_items(mut self, items: Vec<DetailedItem>) -> Self {
        self.items_detailed = Some(items);
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Parsed creation instant. Accepts RFC 3339 and bare `YYYY-MM-DD` dates (midnight UTC).
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        let raw = self.created_at.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    /// Distinct, normalized, non-empty item keys of this basket.
    pub fn item_keys(&self) -> BTreeSet<String> {
        self.items
            .iter()
            .map(|item| normalize_item_name(item))
            .filter(|item| !item.is_empty())
            .collect()
    }

    pub fn belongs_to(&self, user_id: &str) -> bool {
        self.user_id.as_deref() == Some(user_id)
    }

    /// Applies the storage-side invariants: normalized, deduplicated, non-empty item names.
    /// When `items` is empty the names are taken from the detailed lines.
    pub fn normalized(self) -> Result<Self, DomainError> {
        let detailed: Vec<DetailedItem> = self
            .items_detailed
            .unwrap_or_default()
            .into_iter()
            .filter_map(DetailedItem::normalized)
            .collect();

        let source: Vec<String> = if self.items.iter().any(|item| !item.trim().is_empty()) {
            self.items
        } else {
            detailed.iter().map(|item| item.name.clone()).collect()
        };

        let mut seen = BTreeSet::new();
        let items: Vec<String> = source
            .iter()
            .map(|item| normalize_item_name(item))
            .filter(|item| !item.is_empty() && seen.insert(item.clone()))
            .collect();

        if items.is_empty() {
            return Err(DomainError::EmptyBasket { id: self.id });
        }

        Ok(Self {
            id: self.id,
            items,
            items_detailed: (!detailed.is_empty()).then_some(detailed),
            store: trimmed_or_none(self.store),
            total: self.total,
            created_at: self.created_at,
            user_id: trimmed_or_none(self.user_id),
        })
    }
}

fn default_qty() -> f64 {
    DEFAULT_QTY
}

fn sanitize_qty(qty: f64) -> f64 {
    if qty.is_finite() && qty > 0.0 {
        qty
    } else {
        DEFAULT_QTY
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawQty {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

/// Numbers and numeric strings are kept; anything else (null, booleans, junk text)
/// becomes the default quantity instead of failing the whole basket.
fn lenient_qty<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let qty = match RawQty::deserialize(deserializer)? {
        RawQty::Number(qty) => Some(qty),
        RawQty::Text(raw) => raw.trim().parse::<f64>().ok(),
        RawQty::Other(_) => None,
    };
    Ok(qty.map(sanitize_qty).unwrap_or(DEFAULT_QTY))
}

fn trimmed_or_none(value: Option<String>) -> Option<String> {
    value.map(|value| value.trim().to_owned()).filter(|value| !value.is_empty())
}
