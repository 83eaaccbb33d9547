use basketwise_core::config::LoadOptions;
use basketwise_core::CurrentList;
use tracing::info;

use crate::commands::{CommandContext, CommandResult};

pub fn run(options: LoadOptions, items: &str) -> CommandResult {
    let context = match CommandContext::load("tips", options) {
        Ok(context) => context,
        Err(result) => return result,
    };

    let current = CurrentList::parse_csv(items);
    let composer = context.config.tip_composer();
    let tips = composer.compose(&current, &context.baskets);

    info!(
        event_name = "cli.command.tips",
        complements = tips.complements.len(),
        seasonal = tips.seasonal.len(),
        replenishment = tips.replenishment.len(),
        "shopping tips computed"
    );

    let total = tips.complements.len() + tips.seasonal.len() + tips.replenishment.len();
    CommandResult::success_with_data("tips", format!("{total} tip(s)"), &tips)
}
