use basketwise_core::config::LoadOptions;
use basketwise_core::price_insights;

use crate::commands::{CommandContext, CommandResult};

pub fn run(options: LoadOptions) -> CommandResult {
    let context = match CommandContext::load("prices", options) {
        Ok(context) => context,
        Err(result) => return result,
    };

    let insights = price_insights(&context.baskets);
    CommandResult::success_with_data(
        "prices",
        format!("{} priced item(s)", insights.len()),
        &insights,
    )
}
