use anyhow::Context;
use basketwise_core::config::LoadOptions;
use basketwise_core::history::{HistoryProvider, JsonFileHistory};
use tracing::info;

use crate::commands::{history_failure, load_config, CommandResult};

/// Prints one basket. With `--user`, a basket owned by someone else is refused.
pub fn run(options: LoadOptions, id: &str) -> CommandResult {
    let config = match load_config("basket", options) {
        Ok(config) => config,
        Err(result) => return result,
    };

    let requester = config.history.user_id.as_deref();
    let basket = JsonFileHistory::new(&config.history.path)
        .lookup(id.trim(), requester)
        .with_context(|| format!("could not load basket `{}`", id.trim()));

    match basket {
        Ok(basket) => {
            info!(event_name = "cli.command.basket", basket_id = basket.id.as_str(), "basket loaded");
            let message = format!("basket {}", basket.id.as_str());
            CommandResult::success_with_data("basket", message, &basket)
        }
        Err(error) => history_failure("basket", &error),
    }
}
