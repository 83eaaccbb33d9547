use basketwise_core::config::LoadOptions;
use basketwise_core::popular_items;

use crate::commands::{CommandContext, CommandResult};

pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 100;

pub fn run(options: LoadOptions, limit: Option<usize>) -> CommandResult {
    let context = match CommandContext::load("popular", options) {
        Ok(context) => context,
        Err(result) => return result,
    };

    let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let popular = popular_items(&context.baskets, limit);
    CommandResult::success_with_data("popular", format!("{} item(s)", popular.len()), &popular)
}
