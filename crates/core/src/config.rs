use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analytics::{
    ComplementRule, RecommendOptions, SeasonalCalendar, TipComposer, TipOptions, DEFAULT_COMPLEMENT_RECOMMENDATIONS, DEFAULT_LIMIT,
    DEFAULT_MAX_COMPLEMENTS, DEFAULT_MIN_REPLENISH_DAYS, DEFAULT_MIN_SUPPORT,
};
use crate::history::HistoryQuery;

pub const CONFIG_FILE_NAME: &str = "basketwise.toml";
pub const MAX_RECOMMENDATION_LIMIT: usize = 50;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub history: HistoryConfig,
    pub recommender: RecommenderConfig,
    pub tips: TipsConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct HistoryConfig {
    pub path: PathBuf,
    pub user_id: Option<String>,
    pub max_baskets: usize,
}

#[derive(Clone, Debug)]
pub struct RecommenderConfig {
    pub limit: usize,
    pub min_support: f64,
}

#[derive(Clone, Debug)]
pub struct TipsConfig {
    pub complement_recommendations: usize,
    pub max_complements: usize,
    pub min_replenish_days: f64,
    /// Pair rules replacing the built-in table; the built-in English table when unset
    pub complement_rules: Option<Vec<ComplementRulePair>>,
    /// Month ("1".."12") to seasonal items, replacing the built-in calendar when set
    pub seasonal: Option<BTreeMap<String, Vec<String>>>,
}

/// `[[tips.complement_rules]]` entry
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ComplementRulePair {
    pub item: String,
    pub complement: String,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub history_path: Option<PathBuf>,
    pub user_id: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            history: HistoryConfig {
                path: PathBuf::from("data/history.json"),
                user_id: None,
                max_baskets: 10_000,
            },
            recommender: RecommenderConfig {
                limit: DEFAULT_LIMIT,
                min_support: DEFAULT_MIN_SUPPORT,
            },
            tips: TipsConfig {
                complement_recommendations: DEFAULT_COMPLEMENT_RECOMMENDATIONS,
                max_complements: DEFAULT_MAX_COMPLEMENTS,
                min_replenish_days: DEFAULT_MIN_REPLENISH_DAYS,
                complement_rules: None,
                seasonal: None,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// Snapshot query for the configured user, capped at `max_baskets`.
    pub fn history_query(&self) -> HistoryQuery {
        let query = HistoryQuery::new().with_limit(self.history.max_baskets);
        match &self.history.user_id {
            Some(user_id) => query.for_user(user_id.clone()),
            None => query,
        }
    }

    pub fn recommend_options(&self) -> RecommendOptions {
        RecommendOptions::new()
            .with_limit(self.recommender.limit)
            .with_min_support(self.recommender.min_support)
    }

    pub fn tip_options(&self) -> TipOptions {
        TipOptions {
            complement_recommendations: self.tips.complement_recommendations,
            max_complements: self.tips.max_complements,
            min_replenish_days: self.tips.min_replenish_days,
            min_support: self.recommender.min_support,
        }
    }

    /// Composer with the configured rule table, calendar and tuning.
    pub fn tip_composer(&self) -> TipComposer {
        let rules = match &self.tips.complement_rules {
            Some(pairs) => {
                pairs.iter().map(|pair| ComplementRule::new(&pair.item, &pair.complement)).collect()
            }
            None => ComplementRule::defaults(),
        };

        let calendar = match &self.tips.seasonal {
            Some(months) => months
                .iter()
                .filter_map(|(month, items)| Some((parse_month(month)?, items)))
                .fold(SeasonalCalendar::new(), |calendar, (month, items)| {
                    calendar.with_month(month, items)
                }),
            None => SeasonalCalendar::defaults(),
        };

        TipComposer::new(rules, calendar).with_options(self.tip_options())
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(history) = patch.history {
            if let Some(path) = history.path {
                self.history.path = path;
            }
            if let Some(user_id) = history.user_id {
                self.history.user_id = Some(user_id);
            }
            if let Some(max_baskets) = history.max_baskets {
                self.history.max_baskets = max_baskets;
            }
        }

        if let Some(recommender) = patch.recommender {
            if let Some(limit) = recommender.limit {
                self.recommender.limit = limit;
            }
            if let Some(min_support) = recommender.min_support {
                self.recommender.min_support = min_support;
            }
        }

        if let Some(tips) = patch.tips {
            if let Some(complement_recommendations) = tips.complement_recommendations {
                self.tips.complement_recommendations = complement_recommendations;
            }
            if let Some(max_complements) = tips.max_complements {
                self.tips.max_complements = max_complements;
            }
            if let Some(min_replenish_days) = tips.min_replenish_days {
                self.tips.min_replenish_days = min_replenish_days;
            }
            if let Some(complement_rules) = tips.complement_rules {
                self.tips.complement_rules = Some(complement_rules);
            }
            if let Some(seasonal) = tips.seasonal {
                self.tips.seasonal = Some(seasonal);
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("BASKETWISE_HISTORY_PATH") {
            self.history.path = PathBuf::from(value);
        }
        if let Some(value) = read_env("BASKETWISE_HISTORY_USER_ID") {
            self.history.user_id = Some(value);
        }
        if let Some(value) = read_env("BASKETWISE_HISTORY_MAX_BASKETS") {
            self.history.max_baskets = parse_usize("BASKETWISE_HISTORY_MAX_BASKETS", &value)?;
        }

        if let Some(value) = read_env("BASKETWISE_RECOMMENDER_LIMIT") {
            self.recommender.limit = parse_usize("BASKETWISE_RECOMMENDER_LIMIT", &value)?;
        }
        if let Some(value) = read_env("BASKETWISE_RECOMMENDER_MIN_SUPPORT") {
            self.recommender.min_support =
                parse_f64("BASKETWISE_RECOMMENDER_MIN_SUPPORT", &value)?;
        }

        if let Some(value) = read_env("BASKETWISE_TIPS_COMPLEMENT_RECOMMENDATIONS") {
            self.tips.complement_recommendations =
                parse_usize("BASKETWISE_TIPS_COMPLEMENT_RECOMMENDATIONS", &value)?;
        }
        if let Some(value) = read_env("BASKETWISE_TIPS_MAX_COMPLEMENTS") {
            self.tips.max_complements = parse_usize("BASKETWISE_TIPS_MAX_COMPLEMENTS", &value)?;
        }
        if let Some(value) = read_env("BASKETWISE_TIPS_MIN_REPLENISH_DAYS") {
            self.tips.min_replenish_days =
                parse_f64("BASKETWISE_TIPS_MIN_REPLENISH_DAYS", &value)?;
        }

        let log_level =
            read_env("BASKETWISE_LOGGING_LEVEL").or_else(|| read_env("BASKETWISE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("BASKETWISE_LOGGING_FORMAT").or_else(|| read_env("BASKETWISE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(history_path) = overrides.history_path {
            self.history.path = history_path;
        }
        if let Some(user_id) = overrides.user_id {
            self.history.user_id = Some(user_id);
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_history(&self.history)?;
        validate_recommender(&self.recommender)?;
        validate_tips(&self.tips)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(CONFIG_FILE_NAME), Path::new("config").join(CONFIG_FILE_NAME)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_history(history: &HistoryConfig) -> Result<(), ConfigError> {
    if history.path.as_os_str().is_empty() {
        return Err(ConfigError::Validation("history.path must not be empty".to_string()));
    }

    if history.max_baskets == 0 {
        return Err(ConfigError::Validation(
            "history.max_baskets must be greater than zero".to_string(),
        ));
    }

    if history.user_id.as_deref().is_some_and(|user_id| user_id.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "history.user_id must not be blank when set".to_string(),
        ));
    }

    Ok(())
}

fn validate_recommender(recommender: &RecommenderConfig) -> Result<(), ConfigError> {
    if recommender.limit == 0 || recommender.limit > MAX_RECOMMENDATION_LIMIT {
        return Err(ConfigError::Validation(format!(
            "recommender.limit must be in range 1..={MAX_RECOMMENDATION_LIMIT}"
        )));
    }

    if !(0.0..=1.0).contains(&recommender.min_support) {
        return Err(ConfigError::Validation(
            "recommender.min_support must be in range 0.0..=1.0".to_string(),
        ));
    }

    Ok(())
}

fn validate_tips(tips: &TipsConfig) -> Result<(), ConfigError> {
    if tips.max_complements == 0 {
        return Err(ConfigError::Validation(
            "tips.max_complements must be greater than zero".to_string(),
        ));
    }

    if !tips.min_replenish_days.is_finite() || tips.min_replenish_days <= 0.0 {
        return Err(ConfigError::Validation(
            "tips.min_replenish_days must be a positive number of days".to_string(),
        ));
    }

    let blank_rule = tips.complement_rules.iter().flatten().any(|pair| {
        pair.item.trim().is_empty() || pair.complement.trim().is_empty()
    });
    if blank_rule {
        return Err(ConfigError::Validation(
            "tips.complement_rules entries need a non-blank item and complement".to_string(),
        ));
    }

    if let Some(month) = tips.seasonal.iter().flatten().find_map(|(month, _)| {
        parse_month(month).is_none().then_some(month)
    }) {
        return Err(ConfigError::Validation(format!(
            "tips.seasonal month `{month}` must be a number in range 1..=12"
        )));
    }

    Ok(())
}

fn parse_month(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|month| (1..=12).contains(month))
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.trim().parse::<f64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    history: Option<HistoryPatch>,
    recommender: Option<RecommenderPatch>,
    tips: Option<TipsPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct HistoryPatch {
    path: Option<PathBuf>,
    user_id: Option<String>,
    max_baskets: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct RecommenderPatch {
    limit: Option<usize>,
    min_support: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct TipsPatch {
    complement_recommendations: Option<usize>,
    max_complements: Option<usize>,
    min_replenish_days: Option<f64>,
    complement_rules: Option<Vec<ComplementRulePair>>,
    seasonal: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use chrono::{TimeZone, Utc};

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
    use crate::domain::list::CurrentList;

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    const ENV_KEYS: &[&str] = &[
        "BASKETWISE_HISTORY_PATH",
        "BASKETWISE_HISTORY_USER_ID",
        "BASKETWISE_HISTORY_MAX_BASKETS",
        "BASKETWISE_RECOMMENDER_LIMIT",
        "BASKETWISE_RECOMMENDER_MIN_SUPPORT",
        "BASKETWISE_TIPS_COMPLEMENT_RECOMMENDATIONS",
        "BASKETWISE_TIPS_MAX_COMPLEMENTS",
        "BASKETWISE_TIPS_MIN_REPLENISH_DAYS",
        "BASKETWISE_LOGGING_LEVEL",
        "BASKETWISE_LOGGING_FORMAT",
        "BASKETWISE_LOG_LEVEL",
        "BASKETWISE_LOG_FORMAT",
        "TEST_BASKETWISE_USER",
    ];

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars() {
        for var in ENV_KEYS {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_match_engine_defaults() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();

        let config = AppConfig::load(LoadOptions {
            config_path: Some(PathBuf::from("does-not-exist.toml")),
            ..LoadOptions::default()
        })
        .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.recommender.limit == 10, "default limit should be 10")?;
        ensure(config.recommender.min_support == 0.01, "default min support should be 0.01")?;
        ensure(config.tips.complement_recommendations == 8, "complements use 8 recommendations")?;
        ensure(config.tips.max_complements == 10, "complements are capped at 10")?;
        ensure(config.history.max_baskets == 10_000, "snapshot size should be 10000")?;
        ensure(config.history_query().user_id.is_none(), "no user scoping by default")?;
        ensure(matches!(config.logging.format, LogFormat::Compact), "compact logs by default")
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();
        env::set_var("TEST_BASKETWISE_USER", "user-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("basketwise.toml");
            fs::write(
                &path,
                r#"
[history]
path = "/srv/basketwise/history.json"
user_id = "${TEST_BASKETWISE_USER}"

[recommender]
limit = 5
min_support = 0.05
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.history.user_id.as_deref() == Some("user-from-env"),
                "user id should be interpolated from environment",
            )?;
            ensure(
                config.history_query().user_id.as_deref() == Some("user-from-env"),
                "history query should be scoped to the configured user",
            )?;
            ensure(config.recommend_options().limit == 5, "file limit should apply")?;
            ensure(config.tip_options().min_support == 0.05, "tips share the min support")?;
            Ok(())
        })();

        clear_vars();
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();
        env::set_var("BASKETWISE_LOG_LEVEL", "warn");
        env::set_var("BASKETWISE_LOG_FORMAT", "json");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Json),
                "json logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars();
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();
        env::set_var("BASKETWISE_HISTORY_PATH", "/from-env/history.json");
        env::set_var("BASKETWISE_RECOMMENDER_LIMIT", "7");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("basketwise.toml");
            fs::write(
                &path,
                r#"
[history]
path = "/from-file/history.json"

[recommender]
limit = 3

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    history_path: Some(PathBuf::from("/from-override/history.json")),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.history.path == PathBuf::from("/from-override/history.json"),
                "override history path should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(config.recommender.limit == 7, "env limit should win over file and defaults")?;
            Ok(())
        })();

        clear_vars();
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();
        env::set_var("BASKETWISE_RECOMMENDER_MIN_SUPPORT", "1.5");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("recommender.min_support")
            );
            ensure(has_message, "validation failure should mention recommender.min_support")
        })();

        clear_vars();
        result
    }

    #[test]
    fn invalid_env_number_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();
        env::set_var("BASKETWISE_HISTORY_MAX_BASKETS", "lots");

        let result = match AppConfig::load(LoadOptions::default()) {
            Err(ConfigError::InvalidEnvOverride { key, .. }) => {
                ensure(key == "BASKETWISE_HISTORY_MAX_BASKETS", "error should name the variable")
            }
            Err(other) => Err(format!("unexpected error: {other}")),
            Ok(_) => Err("expected invalid override failure".to_string()),
        };

        clear_vars();
        result
    }

    #[test]
    fn required_file_must_exist() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();

        let result = AppConfig::load(LoadOptions {
            config_path: Some(PathBuf::from("missing/basketwise.toml")),
            require_file: true,
            ..LoadOptions::default()
        });

        ensure(
            matches!(result, Err(ConfigError::MissingConfigFile(_))),
            "missing required file should be reported",
        )
    }

    #[test]
    fn tip_tables_load_from_file() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("basketwise.toml");
        fs::write(
            &path,
            r#"
[[tips.complement_rules]]
item = "Arroz"
complement = "feijão"

[tips.seasonal]
"6" = ["Pamonha", "quentão"]
"#,
        )
        .map_err(|err| err.to_string())?;

        let config = AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
            .map_err(|err| format!("config load failed: {err}"))?;
        let composer = config.tip_composer();
        let current: CurrentList = ["arroz"].iter().collect();
        let june = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).single().ok_or("valid date")?;

        let complements = composer.complements(&current, &[]);
        ensure(complements.len() == 1, "only the configured rule should fire")?;
        ensure(complements[0].item == "feijão", "configured complement should be suggested")?;

        let seasonal: Vec<String> =
            composer.seasonal(&current, june).into_iter().map(|tip| tip.item).collect();
        ensure(seasonal == vec!["pamonha".to_string(), "quentão".to_string()], "june items")?;

        let december = Utc.with_ymd_and_hms(2024, 12, 10, 12, 0, 0).single().ok_or("valid date")?;
        ensure(composer.seasonal(&current, december).is_empty(), "calendar is replaced")
    }

    #[test]
    fn seasonal_months_are_validated() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("basketwise.toml");
        fs::write(&path, "[tips.seasonal]\n\"13\" = [\"snow\"]\n").map_err(|err| err.to_string())?;

        let result =
            AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() });
        ensure(
            matches!(result, Err(ConfigError::Validation(ref message)) if message.contains("tips.seasonal")),
            "out-of-range month should fail validation",
        )
    }
}
