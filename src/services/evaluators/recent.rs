use crate::{
    models::{ChannelId, ChannelRecord},
    services::data_manager::ChannelDataManager,
};

use super::{Evaluator, NOT_RECOMMENDED};

/// Scores channels by how recently they were watched
///
/// The gap is measured against the latest watch end time seen on any channel,
/// and the score halves every `half_life_ms` of gap: `0.5^(gap / half_life)`.
/// A channel holding the latest watch scores 1.0.
#[derive(Debug)]
pub struct RecentChannelEvaluator {
    half_life_ms: i64,
    latest_watch_end_time_ms: i64,
}

impl Default for RecentChannelEvaluator {
    fn default() -> Self {
        Self::new(24 * 60 * 60 * 1000)
    }
}

impl RecentChannelEvaluator {
    pub fn new(half_life_ms: i64) -> Self {
        Self {
            half_life_ms: half_life_ms.max(1),
            latest_watch_end_time_ms: 0,
        }
    }
}

impl Evaluator for RecentChannelEvaluator {
    fn name(&self) -> &'static str {
        "recent"
    }

    fn on_channel_record_list_changed(&mut self, records: &[&ChannelRecord]) {
        self.latest_watch_end_time_ms = records
            .iter()
            .map(|r| r.last_watch_end_time_ms())
            .max()
            .unwrap_or(0);
    }

    fn on_new_watch_log(&mut self, record: &ChannelRecord) {
        self.latest_watch_end_time_ms = self
            .latest_watch_end_time_ms
            .max(record.last_watch_end_time_ms());
    }

    fn evaluate_channel(&self, data_manager: &dyn ChannelDataManager, channel_id: ChannelId) -> f64 {
        let Some(record) = data_manager.channel_record(channel_id) else {
            return NOT_RECOMMENDED;
        };
        let last_watch_end_time_ms = record.last_watch_end_time_ms();
        if last_watch_end_time_ms == 0 {
            return NOT_RECOMMENDED;
        }
        let gap_ms = (self.latest_watch_end_time_ms - last_watch_end_time_ms).max(0);
        0.5_f64.powf(gap_ms as f64 / self.half_life_ms as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{log, refresh, store_with_channels};
    use super::*;

    const HOUR_MS: i64 = 60 * 60 * 1000;

    #[test]
    fn test_never_watched_is_not_recommended() {
        let mut store = store_with_channels(2);
        log(&mut store, 1, 0, HOUR_MS);
        let mut evaluator = RecentChannelEvaluator::default();
        refresh(&mut evaluator, &store);
        assert_eq!(evaluator.evaluate_channel(&store, 0), NOT_RECOMMENDED);
        assert_eq!(evaluator.evaluate_channel(&store, 1), 1.0);
    }

    #[test]
    fn test_half_life_decay() {
        let mut store = store_with_channels(2);
        log(&mut store, 0, 0, HOUR_MS);
        log(&mut store, 1, 0, 3 * HOUR_MS);
        let mut evaluator = RecentChannelEvaluator::new(2 * HOUR_MS);
        refresh(&mut evaluator, &store);
        assert!((evaluator.evaluate_channel(&store, 0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_new_log_raises_own_score_and_lowers_others() {
        let mut store = store_with_channels(3);
        log(&mut store, 0, 0, HOUR_MS);
        log(&mut store, 1, 0, 2 * HOUR_MS);
        log(&mut store, 2, 0, 3 * HOUR_MS);
        let mut evaluator = RecentChannelEvaluator::default();
        refresh(&mut evaluator, &store);
        let before: Vec<f64> = (0..3).map(|id| evaluator.evaluate_channel(&store, id)).collect();

        log(&mut store, 0, 4 * HOUR_MS, 5 * HOUR_MS);
        evaluator.on_new_watch_log(store.channel_record(0).unwrap());
        let after: Vec<f64> = (0..3).map(|id| evaluator.evaluate_channel(&store, id)).collect();

        assert!(after[0] >= before[0]);
        assert!(after[1] < before[1]);
        assert!(after[2] < before[2]);
        assert_eq!(after[0], 1.0);
    }
}
