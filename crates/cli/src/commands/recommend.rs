use basketwise_core::config::{LoadOptions, MAX_RECOMMENDATION_LIMIT};
use basketwise_core::{CurrentList, Recommender};
use tracing::info;

use crate::commands::{CommandContext, CommandResult};

pub fn run(options: LoadOptions, items: &str, limit: Option<usize>) -> CommandResult {
    let context = match CommandContext::load("recommend", options) {
        Ok(context) => context,
        Err(result) => return result,
    };

    let current = CurrentList::parse_csv(items);
    let mut recommend_options = context.config.recommend_options();
    if let Some(limit) = limit {
        recommend_options = recommend_options.with_limit(limit.clamp(1, MAX_RECOMMENDATION_LIMIT));
    }

    let recommendations = Recommender::new(recommend_options).recommend(&current, &context.baskets);
    info!(
        event_name = "cli.command.recommend",
        current_items = current.len(),
        baskets = context.baskets.len(),
        recommendations = recommendations.len(),
        "recommendations computed"
    );

    let message = if recommendations.is_empty() {
        "no recommendations yet: record a few baskets first".to_string()
    } else {
        format!("{} recommendation(s)", recommendations.len())
    };
    CommandResult::success_with_data("recommend", message, &recommendations)
}
