use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use basketwise_core::config::{AppConfig, LoadOptions, CONFIG_FILE_NAME};
use serde::Serialize;
use toml::Value;

use crate::commands::{load_config, CommandResult};

struct FieldSpec {
    key_path: &'static str,
    env_keys: &'static [&'static str],
    flag: Option<&'static str>,
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec {
        key_path: "history.path",
        env_keys: &["BASKETWISE_HISTORY_PATH"],
        flag: Some("--history"),
    },
    FieldSpec {
        key_path: "history.user_id",
        env_keys: &["BASKETWISE_HISTORY_USER_ID"],
        flag: Some("--user"),
    },
    FieldSpec {
        key_path: "history.max_baskets",
        env_keys: &["BASKETWISE_HISTORY_MAX_BASKETS"],
        flag: None,
    },
    FieldSpec {
        key_path: "recommender.limit",
        env_keys: &["BASKETWISE_RECOMMENDER_LIMIT"],
        flag: None,
    },
    FieldSpec {
        key_path: "recommender.min_support",
        env_keys: &["BASKETWISE_RECOMMENDER_MIN_SUPPORT"],
        flag: None,
    },
    FieldSpec {
        key_path: "tips.complement_recommendations",
        env_keys: &["BASKETWISE_TIPS_COMPLEMENT_RECOMMENDATIONS"],
        flag: None,
    },
    FieldSpec {
        key_path: "tips.max_complements",
        env_keys: &["BASKETWISE_TIPS_MAX_COMPLEMENTS"],
        flag: None,
    },
    FieldSpec {
        key_path: "tips.min_replenish_days",
        env_keys: &["BASKETWISE_TIPS_MIN_REPLENISH_DAYS"],
        flag: None,
    },
    FieldSpec { key_path: "tips.complement_rules", env_keys: &[], flag: None },
    FieldSpec { key_path: "tips.seasonal", env_keys: &[], flag: None },
    FieldSpec {
        key_path: "logging.level",
        env_keys: &["BASKETWISE_LOGGING_LEVEL", "BASKETWISE_LOG_LEVEL"],
        flag: Some("--log-level"),
    },
    FieldSpec {
        key_path: "logging.format",
        env_keys: &["BASKETWISE_LOGGING_FORMAT", "BASKETWISE_LOG_FORMAT"],
        flag: Some("--log-format"),
    },
];

/// One effective setting and where its value came from
#[derive(Debug, Serialize)]
struct ConfigField {
    key: &'static str,
    value: String,
    source: String,
}

pub fn run(options: LoadOptions) -> CommandResult {
    let flagged = flagged_fields(&options);
    let explicit_path = options.config_path.clone();
    let config = match load_config("config", options) {
        Ok(config) => config,
        Err(result) => return result,
    };

    let config_file_path = detect_config_path(explicit_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let fields: Vec<ConfigField> = FIELDS
        .iter()
        .map(|field| ConfigField {
            key: field.key_path,
            value: field_value(&config, field.key_path),
            source: field_source(
                field,
                &flagged,
                config_file_doc.as_ref(),
                config_file_path.as_deref(),
            ),
        })
        .collect();

    let message = std::iter::once(
        "effective config (source precedence: flag > env > file > default):".to_string(),
    )
    .chain(fields.iter().map(|field| render_line(field.key, &field.value, &field.source)))
    .collect::<Vec<_>>()
    .join("\n");

    CommandResult::success_with_data("config", message, &fields)
}

fn flagged_fields(options: &LoadOptions) -> Vec<&'static str> {
    let mut flagged = Vec::new();
    if options.overrides.history_path.is_some() {
        flagged.push("history.path");
    }
    if options.overrides.user_id.is_some() {
        flagged.push("history.user_id");
    }
    if options.overrides.log_level.is_some() {
        flagged.push("logging.level");
    }
    if options.overrides.log_format.is_some() {
        flagged.push("logging.format");
    }
    flagged
}

fn field_value(config: &AppConfig, key_path: &str) -> String {
    match key_path {
        "history.path" => config.history.path.display().to_string(),
        "history.user_id" => config.history.user_id.clone().unwrap_or_else(|| "<all users>".into()),
        "history.max_baskets" => config.history.max_baskets.to_string(),
        "recommender.limit" => config.recommender.limit.to_string(),
        "recommender.min_support" => config.recommender.min_support.to_string(),
        "tips.complement_recommendations" => config.tips.complement_recommendations.to_string(),
        "tips.max_complements" => config.tips.max_complements.to_string(),
        "tips.min_replenish_days" => config.tips.min_replenish_days.to_string(),
        "tips.complement_rules" => match &config.tips.complement_rules {
            Some(rules) => format!("{} rule(s)", rules.len()),
            None => "<built-in>".to_string(),
        },
        "tips.seasonal" => match &config.tips.seasonal {
            Some(months) => format!("{} month(s)", months.len()),
            None => "<built-in>".to_string(),
        },
        "logging.level" => config.logging.level.clone(),
        "logging.format" => format!("{:?}", config.logging.format),
        _ => "<unknown>".to_string(),
    }
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    let root = PathBuf::from(CONFIG_FILE_NAME);
    if root.exists() {
        return Some(root);
    }

    let nested = Path::new("config").join(CONFIG_FILE_NAME);
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    field: &FieldSpec,
    flagged: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(flag) = field.flag {
        if flagged.contains(&field.key_path) {
            return format!("flag ({flag})");
        }
    }

    if let Some(env_key) = field.env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, field.key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: &str) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use super::contains_path;
    use toml::Value;

    #[test]
    fn contains_path_walks_nested_tables() {
        let doc: Value = "[history]\npath = \"h.json\"\n".parse().expect("toml");

        assert!(contains_path(&doc, "history.path"));
        assert!(!contains_path(&doc, "history.user_id"));
        assert!(!contains_path(&doc, "tips.max_complements"));
    }
}
