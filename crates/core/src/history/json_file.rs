use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use super::{normalize_all, select, HistoryProvider, HistoryQuery};
use crate::domain::basket::Basket;
use crate::errors::ApplicationError;

/// History stored as `{"baskets": [...]}` in a single JSON file.
///
/// A missing file is an empty history. A document without a `baskets` array, or a basket
/// entry that does not deserialize, is logged and skipped instead of failing the read.
#[derive(Clone, Debug)]
pub struct JsonFileHistory {
    path: PathBuf,
}

impl JsonFileHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_all(&self) -> Result<Vec<Basket>, ApplicationError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!(
                    event_name = "history.file.missing",
                    path = %self.path.display(),
                    "history file not found, treating as empty"
                );
                return Ok(Vec::new());
            }
            Err(error) => {
                return Err(ApplicationError::Persistence(format!(
                    "could not read history file `{}`: {error}",
                    self.path.display()
                )));
            }
        };

        Ok(normalize_all(parse_document(&raw, &self.path), "json_file"))
    }
}

impl HistoryProvider for JsonFileHistory {
    fn snapshot(&self, query: &HistoryQuery) -> Result<Vec<Basket>, ApplicationError> {
        Ok(select(self.read_all()?, query))
    }
}

fn parse_document(raw: &str, path: &Path) -> Vec<Basket> {
    let document = match serde_json::from_str::<Value>(raw) {
        Ok(document) => document,
        Err(error) => {
            warn!(
                event_name = "history.file.malformed",
                path = %path.display(),
                error = %error,
                "history file is not valid JSON, treating as empty"
            );
            return Vec::new();
        }
    };

    let Some(entries) = document.get("baskets").and_then(Value::as_array) else {
        warn!(
            event_name = "history.file.malformed",
            path = %path.display(),
            "history file has no `baskets` array, treating as empty"
        );
        return Vec::new();
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<Basket>(entry.clone()) {
            Ok(basket) => Some(basket),
            Err(error) => {
                warn!(
                    event_name = "history.basket.unreadable",
                    path = %path.display(),
                    index,
                    error = %error,
                    "basket entry skipped"
                );
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::JsonFileHistory;
    use crate::history::{HistoryProvider, HistoryQuery};

    #[test]
    fn missing_file_is_empty_history() {
        let dir = TempDir::new().expect("temp dir");
        let history = JsonFileHistory::new(dir.path().join("history.json"));

        assert!(history.read_all().expect("missing file is not an error").is_empty());
    }

    #[test]
    fn malformed_documents_are_empty_history() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("history.json");

        fs::write(&path, "{not json").expect("write fixture");
        assert!(JsonFileHistory::new(&path).read_all().expect("tolerant read").is_empty());

        fs::write(&path, r#"{"baskets": "nope"}"#).expect("write fixture");
        assert!(JsonFileHistory::new(&path).read_all().expect("tolerant read").is_empty());
    }

    #[test]
    fn reads_normalizes_and_scopes_baskets() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("history.json");
        fs::write(
            &path,
            r#"{
  "baskets": [
    {"id": "b1", "items": [" Bread", "butter"], "itemsDetailed": null, "store": null, "total": null,
     "createdAt": "2024-01-05T10:00:00.000Z", "userId": "u1"},
    {"id": "b2", "items": [], "itemsDetailed": [{"name": "Coffee", "qty": 2, "price": 18.9}],
     "createdAt": "2024-01-09T10:00:00.000Z", "userId": "u1"},
    {"id": "b3", "items": ["tea"], "createdAt": "2024-01-07T10:00:00.000Z", "userId": "u2"},
    {"items": "broken"},
    {"id": "b4", "items": [""], "createdAt": "2024-01-08T10:00:00.000Z"}
  ]
}"#,
        )
        .expect("write fixture");

        let history = JsonFileHistory::new(&path);
        let all = history.snapshot(&HistoryQuery::new()).expect("snapshot");
        let mine = history.snapshot(&HistoryQuery::new().for_user("u1")).expect("snapshot");

        assert_eq!(all.len(), 3);
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].id.as_str(), "b2");
        assert_eq!(mine[0].items, vec!["coffee".to_owned()]);
        assert_eq!(mine[1].items, vec!["bread".to_owned(), "butter".to_owned()]);

        let tea = history.lookup("b3", None).expect("lookup by id");
        assert_eq!(tea.user_id.as_deref(), Some("u2"));
        let foreign = history.lookup("b3", Some("u1")).map_err(|error| error.error_class());
        assert_eq!(foreign, Err("forbidden"));
        assert!(history.find("b4").expect("find").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_path_is_a_persistence_error() {
        let dir = TempDir::new().expect("temp dir");

        // Reading a directory as a file fails with something other than NotFound.
        let error = JsonFileHistory::new(dir.path()).read_all().expect_err("directory read fails");

        assert_eq!(error.error_class(), "history_load");
    }
}
