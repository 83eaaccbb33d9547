pub mod basket;
pub mod config;
pub mod export;
pub mod history;
pub mod popular;
pub mod prices;
pub mod recommend;
pub mod tips;

use anyhow::Context;
use basketwise_core::config::{AppConfig, LoadOptions};
use basketwise_core::history::{HistoryProvider, HistoryQuery, JsonFileHistory};
use basketwise_core::{ApplicationError, Basket};
use serde::Serialize;
use serde_json::Value;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_HISTORY: u8 = 3;
pub const EXIT_SERIALIZATION: u8 = 4;
pub const EXIT_NOT_FOUND: u8 = 5;
pub const EXIT_FORBIDDEN: u8 = 6;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: &impl Serialize,
    ) -> Self {
        let data = match serde_json::to_value(data) {
            Ok(data) => data,
            Err(error) => {
                return Self::failure(
                    command,
                    "serialization",
                    format!("could not serialize command output: {error}"),
                    EXIT_SERIALIZATION,
                );
            }
        };

        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data: Some(data),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

/// Effective config plus the history snapshot every analytics command starts from.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: AppConfig,
    pub baskets: Vec<Basket>,
}

impl CommandContext {
    /// Snapshot capped at `history.max_baskets`.
    pub fn load(command: &str, options: LoadOptions) -> Result<Self, CommandResult> {
        let config = load_config(command, options)?;
        let query = config.history_query();
        Self::load_with(command, config, query)
    }

    /// Every basket in scope, ignoring `history.max_baskets`.
    pub fn load_unbounded(command: &str, options: LoadOptions) -> Result<Self, CommandResult> {
        let config = load_config(command, options)?;
        let query = HistoryQuery { limit: None, ..config.history_query() };
        Self::load_with(command, config, query)
    }

    fn load_with(
        command: &str,
        config: AppConfig,
        query: HistoryQuery,
    ) -> Result<Self, CommandResult> {
        let baskets = load_snapshot(&config, &query)
            .map_err(|error| history_failure(command, &error))?;

        tracing::debug!(
            event_name = "cli.history.loaded",
            command,
            baskets = baskets.len(),
            path = %config.history.path.display(),
            "history snapshot loaded"
        );

        Ok(Self { config, baskets })
    }
}

pub fn load_config(command: &str, options: LoadOptions) -> Result<AppConfig, CommandResult> {
    AppConfig::load(options).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            EXIT_CONFIG,
        )
    })
}

/// Maps a history error onto its payload class and exit code.
pub fn history_failure(command: &str, error: &anyhow::Error) -> CommandResult {
    let application_error = error.downcast_ref::<ApplicationError>();
    let error_class = application_error.map_or("history_load", ApplicationError::error_class);
    let exit_code = match application_error {
        Some(ApplicationError::NotFound(_)) => EXIT_NOT_FOUND,
        Some(ApplicationError::Forbidden(_)) => EXIT_FORBIDDEN,
        _ => EXIT_HISTORY,
    };
    CommandResult::failure(command, error_class, format!("{error:#}"), exit_code)
}

fn load_snapshot(config: &AppConfig, query: &HistoryQuery) -> anyhow::Result<Vec<Basket>> {
    JsonFileHistory::new(&config.history.path).snapshot(query).with_context(|| {
        format!("could not load basket history from `{}`", config.history.path.display())
    })
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
