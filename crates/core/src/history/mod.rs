//! Read-side access to basket history.
//!
//! Providers hand the analytics engine an owned snapshot: normalized baskets, scoped to a
//! user when asked, newest first. Writes (create, edit, delete) belong to the store that
//! owns the data and are not modelled here.

mod json_file;

pub use json_file::JsonFileHistory;

use std::cmp::Reverse;

use tracing::warn;

use crate::domain::basket::{Basket, BasketId};
use crate::errors::ApplicationError;

/// Which slice of history a caller wants
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    /// Only baskets owned by this user; every basket when unset
    pub user_id: Option<String>,
    /// Keep at most this many baskets, newest first
    pub limit: Option<usize>,
}

impl HistoryQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

pub trait HistoryProvider {
    fn snapshot(&self, query: &HistoryQuery) -> Result<Vec<Basket>, ApplicationError>;

    /// One basket by id, whoever owns it.
    fn find(&self, id: &str) -> Result<Option<Basket>, ApplicationError> {
        Ok(self.snapshot(&HistoryQuery::new())?.into_iter().find(|basket| basket.id.as_str() == id))
    }

    /// Basket `id` as seen by `user_id`. Unowned baskets are visible to everyone; a basket
    /// owned by somebody else is `Forbidden`. Without a requesting user every basket is
    /// visible.
    fn lookup(&self, id: &str, user_id: Option<&str>) -> Result<Basket, ApplicationError> {
        let basket =
            self.find(id)?.ok_or_else(|| ApplicationError::NotFound(BasketId(id.to_owned())))?;

        match (user_id, basket.user_id.as_deref()) {
            (Some(requester), Some(owner)) if requester != owner => {
                Err(ApplicationError::Forbidden(basket.id))
            }
            _ => Ok(basket),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryHistory {
    baskets: Vec<Basket>,
}

impl InMemoryHistory {
    /// Normalizes every basket; baskets left without items are dropped.
    pub fn new(baskets: Vec<Basket>) -> Self {
        Self { baskets: normalize_all(baskets, "memory") }
    }

    pub fn insert(&mut self, basket: Basket) -> Result<(), ApplicationError> {
        self.baskets.push(basket.normalized()?);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.baskets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.baskets.is_empty()
    }
}

impl HistoryProvider for InMemoryHistory {
    fn snapshot(&self, query: &HistoryQuery) -> Result<Vec<Basket>, ApplicationError> {
        Ok(select(self.baskets.iter().cloned(), query))
    }

    fn find(&self, id: &str) -> Result<Option<Basket>, ApplicationError> {
        Ok(self.baskets.iter().find(|basket| basket.id.as_str() == id).cloned())
    }
}

/// Applies user scoping, newest-first ordering and the row limit. Baskets without a
/// parsable timestamp sort last.
pub fn select(baskets: impl IntoIterator<Item = Basket>, query: &HistoryQuery) -> Vec<Basket> {
    let mut selected: Vec<Basket> = baskets
        .into_iter()
        .filter(|basket| query.user_id.as_deref().map_or(true, |user_id| basket.belongs_to(user_id)))
        .collect();

    selected.sort_by_cached_key(|basket| Reverse(basket.created_at_utc()));
    if let Some(limit) = query.limit {
        selected.truncate(limit);
    }
    selected
}

pub(crate) fn normalize_all(baskets: Vec<Basket>, source: &str) -> Vec<Basket> {
    baskets
        .into_iter()
        .filter_map(|basket| match basket.normalized() {
            Ok(basket) => Some(basket),
            Err(error) => {
                warn!(
                    event_name = "history.basket.skipped",
                    source,
                    error = %error,
                    "invalid basket skipped"
                );
                None
            }
        })
        .collect()
}
