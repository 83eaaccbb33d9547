pub mod analytics;
pub mod config;
pub mod domain;
pub mod errors;
pub mod history;

pub use analytics::{
    build_tips, popular_items, price_insights, recommend, ComplementTip, PopularItem,
    PriceInsight, RecommendOptions, Recommendation, Recommender, Tip, TipComposer, TipReason,
    TipsResponse,
};
pub use domain::basket::{normalize_item_name, Basket, BasketId, DetailedItem};
pub use domain::list::CurrentList;
pub use errors::{ApplicationError, DomainError};
pub use history::{HistoryProvider, HistoryQuery, InMemoryHistory, JsonFileHistory};
