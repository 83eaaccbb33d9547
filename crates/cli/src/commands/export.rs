use basketwise_core::config::LoadOptions;
use basketwise_core::Basket;
use serde::Serialize;
use tracing::info;

use crate::commands::{CommandContext, CommandResult};

/// Same `{"baskets": [...]}` shape the history file uses, so an export can be read back.
#[derive(Debug, Serialize)]
struct HistoryExport<'a> {
    baskets: &'a [Basket],
}

pub fn run(options: LoadOptions) -> CommandResult {
    let context = match CommandContext::load_unbounded("export", options) {
        Ok(context) => context,
        Err(result) => return result,
    };

    info!(
        event_name = "cli.command.export",
        baskets = context.baskets.len(),
        user_scoped = context.config.history.user_id.is_some(),
        "history exported"
    );

    CommandResult::success_with_data(
        "export",
        format!("exported {} basket(s)", context.baskets.len()),
        &HistoryExport { baskets: &context.baskets },
    )
}
