//! Channel scoring strategies
//!
//! Each evaluator scores channels from the records the recommender hands it.
//! Evaluators keep only their own cached aggregates; records are read through
//! the data manager borrowed for the duration of a call.

use crate::{
    models::{ChannelId, ChannelRecord},
    services::data_manager::ChannelDataManager,
};

pub mod favorite;
pub mod recent;
pub mod routine_watch;

pub use favorite::FavoriteChannelEvaluator;
pub use recent::RecentChannelEvaluator;
pub use routine_watch::{ProgramTime, RoutineWatchEvaluator};

/// Score meaning "no basis to recommend"
pub const NOT_RECOMMENDED: f64 = -1.0;

/// Whether `score` is a real score rather than the sentinel
pub fn is_recommended(score: f64) -> bool {
    score >= 0.0
}

/// Trait for channel scoring strategies
///
/// Scores are in `[0.0, 1.0]`, or [`NOT_RECOMMENDED`] when the channel is unknown
/// or has nothing to score.
pub trait Evaluator: Send {
    /// Evaluator name for logging and debugging
    fn name(&self) -> &'static str;

    /// Full refresh: rebuild cached aggregates from every record
    fn on_channel_record_list_changed(&mut self, records: &[&ChannelRecord]);

    /// Incremental update: `record` just gained a watch entry
    ///
    /// Default implementation does nothing, for evaluators without cached state.
    fn on_new_watch_log(&mut self, _record: &ChannelRecord) {}

    fn evaluate_channel(&self, data_manager: &dyn ChannelDataManager, channel_id: ChannelId) -> f64;
}
