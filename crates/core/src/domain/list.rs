use std::collections::BTreeSet;

use serde::Serialize;

use super::basket::normalize_item_name;

/// The items currently on the user's active list. Names are normalized on insert, so
/// lookups with keys taken from normalized baskets match regardless of the caller's spelling.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CurrentList {
    items: BTreeSet<String>,
}

impl CurrentList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a comma-separated list such as `rice, Beans,,meat`.
    pub fn parse_csv(raw: &str) -> Self {
        raw.split(',').collect()
    }

    pub fn insert(&mut self, item: &str) -> bool {
        let key = normalize_item_name(item);
        !key.is_empty() && self.items.insert(key)
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items.contains(item)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for CurrentList {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut list = Self::new();
        for item in iter {
            list.insert(item.as_ref());
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::CurrentList;

    #[test]
    fn parse_csv_normalizes_and_skips_blanks() {
        let list = CurrentList::parse_csv(" Rice,beans ,, RICE ,");

        assert_eq!(list.len(), 2);
        assert!(list.contains("rice"));
        assert!(list.contains("beans"));
        assert_eq!(list.iter().collect::<Vec<_>>(), vec!["beans", "rice"]);
    }

    #[test]
    fn empty_input_yields_empty_list() {
        assert!(CurrentList::parse_csv("").is_empty());
        assert!(CurrentList::from_iter(Vec::<String>::new()).is_empty());
    }
}
