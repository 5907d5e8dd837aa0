use crate::{
    models::{ChannelId, ChannelRecord},
    services::data_manager::ChannelDataManager,
};

use super::{Evaluator, NOT_RECOMMENDED};

/// Scores channels by cumulative watch duration
///
/// `score = total_watch_duration(channel) / max total_watch_duration`. The maximum
/// is rebuilt on every full refresh and only raised by incremental updates, so
/// it can lag behind evictions until the next refresh.
#[derive(Debug, Default)]
pub struct FavoriteChannelEvaluator {
    max_watch_duration_ms: i64,
}

impl FavoriteChannelEvaluator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Evaluator for FavoriteChannelEvaluator {
    fn name(&self) -> &'static str {
        "favorite"
    }

    fn on_channel_record_list_changed(&mut self, records: &[&ChannelRecord]) {
        self.max_watch_duration_ms = records
            .iter()
            .map(|r| r.total_watch_duration_ms())
            .max()
            .unwrap_or(0);
    }

    fn on_new_watch_log(&mut self, record: &ChannelRecord) {
        self.max_watch_duration_ms = self
            .max_watch_duration_ms
            .max(record.total_watch_duration_ms());
    }

    fn evaluate_channel(&self, data_manager: &dyn ChannelDataManager, channel_id: ChannelId) -> f64 {
        let Some(record) = data_manager.channel_record(channel_id) else {
            return NOT_RECOMMENDED;
        };
        if record.history_len() == 0 || self.max_watch_duration_ms <= 0 {
            return NOT_RECOMMENDED;
        }
        let ratio = record.total_watch_duration_ms() as f64 / self.max_watch_duration_ms as f64;
        ratio.clamp(0.0, 1.0)
    }
}
