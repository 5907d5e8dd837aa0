pub mod clock;
pub mod data_manager;
pub mod evaluators;
pub mod feed;
pub mod recommender;

pub use clock::{Clock, ManualClock, SystemClock};
pub use data_manager::{ChannelDataManager, InMemoryChannelStore};
pub use evaluators::{
    Evaluator, FavoriteChannelEvaluator, RecentChannelEvaluator, RoutineWatchEvaluator,
    NOT_RECOMMENDED,
};
pub use recommender::{
    ChannelSortKey, Recommender, RecommenderListener, RecommenderState, ScoredChannel,
};
