use basketwise_core::config::LoadOptions;

use crate::commands::{CommandContext, CommandResult};

pub const DEFAULT_LIMIT: usize = 50;
pub const MAX_LIMIT: usize = 500;

pub fn run(options: LoadOptions, limit: Option<usize>) -> CommandResult {
    let context = match CommandContext::load("history", options) {
        Ok(context) => context,
        Err(result) => return result,
    };

    // The snapshot is already newest first.
    let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let baskets: Vec<_> = context.baskets.into_iter().take(limit).collect();
    CommandResult::success_with_data("history", format!("{} basket(s)", baskets.len()), &baskets)
}
