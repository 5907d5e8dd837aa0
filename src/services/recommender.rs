use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    config::{RecommenderConfig, ScoreCombiner},
    models::{Channel, ChannelId, ChannelRecord},
    services::{
        clock::{Clock, SystemClock},
        data_manager::ChannelDataManager,
        evaluators::{is_recommended, Evaluator, NOT_RECOMMENDED},
    },
};

/// Callbacks from the recommender to the host
#[cfg_attr(test, mockall::automock)]
pub trait RecommenderListener {
    /// Fired once, when the initial channel load completes
    fn on_recommender_ready(&mut self);

    /// Fired when a recomputation yields at least one recommended channel
    fn on_recommendation_changed(&mut self);
}

/// Rank token from the latest ranking pass
///
/// A better rank compares lower; `Invalid` compares after every rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChannelSortKey {
    Ranked(usize),
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommenderState {
    Loading,
    Ready,
}

/// A channel with its aggregate score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChannel {
    pub channel: Channel,
    pub score: f64,
}

struct RegisteredEvaluator {
    evaluator: Box<dyn Evaluator>,
    base_score: f64,
    weight: f64,
}

impl RegisteredEvaluator {
    fn score(&self, data_manager: &dyn ChannelDataManager, channel_id: ChannelId) -> f64 {
        let score = self.evaluator.evaluate_channel(data_manager, channel_id);
        if is_recommended(score) {
            self.base_score + self.weight * score
        } else {
            NOT_RECOMMENDED
        }
    }
}

fn combine_scores(combiner: ScoreCombiner, scores: impl Iterator<Item = f64>) -> f64 {
    let mut scored = scores.filter(|score| is_recommended(*score));
    let combined = match combiner {
        ScoreCombiner::Sum => scored.reduce(|sum, score| sum + score),
        ScoreCombiner::Max => scored.reduce(f64::max),
        ScoreCombiner::FirstScored => scored.next(),
    };
    combined.unwrap_or(NOT_RECOMMENDED)
}

/// Descending score, unscored channels last, ties by ascending channel id
fn compare_ranking(a: &ScoredChannel, b: &ScoredChannel) -> Ordering {
    let by_score = match (is_recommended(a.score), is_recommended(b.score)) {
        (true, true) => b.score.total_cmp(&a.score),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => Ordering::Equal,
    };
    by_score.then_with(|| a.channel.id.cmp(&b.channel.id))
}

/// Ranks channels by combining the scores of registered evaluators
///
/// All notifications are plain method calls on the owning thread. Watch-log
/// triggered recomputations are throttled to one per `min_update_interval_ms`.
pub struct Recommender<D: ChannelDataManager> {
    data_manager: D,
    listener: Box<dyn RecommenderListener + Send>,
    evaluators: Vec<RegisteredEvaluator>,
    config: RecommenderConfig,
    clock: Arc<dyn Clock>,
    state: RecommenderState,
    last_recommendation_updated_time_utc_ms: i64,
    sort_keys: HashMap<ChannelId, ChannelSortKey>,
}

impl<D: ChannelDataManager> Recommender<D> {
    pub fn new(
        listener: impl RecommenderListener + Send + 'static,
        include_recommended_only: bool,
        data_manager: D,
    ) -> Self {
        let config = RecommenderConfig {
            include_recommended_only,
            ..RecommenderConfig::default()
        };
        Self::with_config(listener, data_manager, config)
    }

    pub fn with_config(
        listener: impl RecommenderListener + Send + 'static,
        data_manager: D,
        config: RecommenderConfig,
    ) -> Self {
        Self::with_clock(listener, data_manager, config, Arc::new(SystemClock))
    }

    /// Creates a recommender; if `data_manager` has already finished loading,
    /// the recommender becomes ready before returning.
    pub fn with_clock(
        listener: impl RecommenderListener + Send + 'static,
        data_manager: D,
        config: RecommenderConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        tracing::info!(
            include_recommended_only = config.include_recommended_only,
            combiner = ?config.combiner,
            min_update_interval_ms = config.min_update_interval_ms,
            "Creating recommender"
        );

        let mut recommender = Self {
            data_manager,
            listener: Box::new(listener),
            evaluators: Vec::new(),
            config,
            clock,
            state: RecommenderState::Loading,
            last_recommendation_updated_time_utc_ms: 0,
            sort_keys: HashMap::new(),
        };
        if recommender.data_manager.is_loaded() {
            recommender.on_channel_record_loaded();
        }
        recommender
    }

    pub fn register_evaluator(&mut self, evaluator: impl Evaluator + 'static) {
        self.register_weighted_evaluator(evaluator, 0.0, 1.0);
    }

    /// Registers an evaluator contributing `base_score + weight * score`
    ///
    /// Weights are expected to be non-negative; a negative contribution reads
    /// as "not recommended".
    pub fn register_weighted_evaluator(
        &mut self,
        evaluator: impl Evaluator + 'static,
        base_score: f64,
        weight: f64,
    ) {
        let mut evaluator: Box<dyn Evaluator> = Box::new(evaluator);
        tracing::debug!(evaluator = evaluator.name(), base_score, weight, "Registering evaluator");

        let ready = self.state == RecommenderState::Ready;
        if ready {
            let records: Vec<&ChannelRecord> = self.data_manager.channel_records().collect();
            evaluator.on_channel_record_list_changed(&records);
        }
        self.evaluators.push(RegisteredEvaluator {
            evaluator,
            base_score,
            weight,
        });

        // The load-time ranking ran without this evaluator.
        if ready {
            self.update_channel_recommendation(true);
        }
    }

    /// Initial load finished: refresh evaluators, announce readiness, rank
    pub fn on_channel_record_loaded(&mut self) {
        if self.state == RecommenderState::Ready {
            self.on_channel_record_changed();
            return;
        }

        self.refresh_evaluators();
        self.state = RecommenderState::Ready;
        tracing::info!(
            channel_count = self.data_manager.channel_record_count(),
            evaluator_count = self.evaluators.len(),
            "Recommender ready"
        );
        self.listener.on_recommender_ready();
        self.update_channel_recommendation(true);
    }

    /// The set of channels changed: refresh evaluators and re-rank
    pub fn on_channel_record_changed(&mut self) {
        if self.state != RecommenderState::Ready {
            tracing::debug!("Channel change before load completed");
            return;
        }
        self.refresh_evaluators();
        self.update_channel_recommendation(true);
    }

    /// `channel_id` just logged a watch entry
    pub fn on_new_watch_log(&mut self, channel_id: ChannelId) {
        let Some(record) = self.data_manager.channel_record(channel_id) else {
            tracing::warn!(channel_id, "Watch log for unknown channel");
            return;
        };
        for registered in &mut self.evaluators {
            registered.evaluator.on_new_watch_log(record);
        }

        if self.state == RecommenderState::Ready {
            self.update_channel_recommendation(false);
        }
    }

    pub fn get_channel_record(&self, channel_id: ChannelId) -> Option<&ChannelRecord> {
        self.data_manager.channel_record(channel_id)
    }

    /// Aggregate score of `channel_id` across registered evaluators
    pub fn evaluate_channel(&self, channel_id: ChannelId) -> f64 {
        let data_manager: &dyn ChannelDataManager = &self.data_manager;
        combine_scores(
            self.config.combiner,
            self.evaluators
                .iter()
                .map(|registered| registered.score(data_manager, channel_id)),
        )
    }

    /// Every eligible channel, best first
    pub fn recommend_channels(&mut self) -> Vec<Channel> {
        self.recommend_top_channels(usize::MAX)
    }

    /// At most `max_count` eligible channels, best first
    pub fn recommend_top_channels(&mut self, max_count: usize) -> Vec<Channel> {
        self.recommend_scored_channels(max_count)
            .into_iter()
            .map(|scored| scored.channel)
            .collect()
    }

    /// Like [`Self::recommend_top_channels`], keeping the aggregate scores
    pub fn recommend_scored_channels(&mut self, max_count: usize) -> Vec<ScoredChannel> {
        let mut ranking = self.rank_channels();
        ranking.truncate(max_count);
        ranking
    }

    pub fn get_channel_sort_key(&self, channel_id: ChannelId) -> ChannelSortKey {
        self.sort_keys
            .get(&channel_id)
            .copied()
            .unwrap_or(ChannelSortKey::Invalid)
    }

    pub fn state(&self) -> RecommenderState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == RecommenderState::Ready
    }

    pub fn last_recommendation_updated_time_utc_ms(&self) -> i64 {
        self.last_recommendation_updated_time_utc_ms
    }

    pub fn data_manager(&self) -> &D {
        &self.data_manager
    }

    /// Mutable access for hosts that own the records through the recommender;
    /// follow every mutation with the matching notification.
    pub fn data_manager_mut(&mut self) -> &mut D {
        &mut self.data_manager
    }

    fn refresh_evaluators(&mut self) {
        let records: Vec<&ChannelRecord> = self.data_manager.channel_records().collect();
        for registered in &mut self.evaluators {
            registered.evaluator.on_channel_record_list_changed(&records);
        }
    }

    /// Scores and sorts every eligible channel and rebuilds the sort keys
    fn rank_channels(&mut self) -> Vec<ScoredChannel> {
        let include_recommended_only = self.config.include_recommended_only;
        let mut ranking: Vec<ScoredChannel> = self
            .data_manager
            .channel_records()
            .map(|record| ScoredChannel {
                channel: record.channel().clone(),
                score: self.evaluate_channel(record.channel_id()),
            })
            .filter(|scored| !include_recommended_only || is_recommended(scored.score))
            .collect();
        ranking.sort_by(compare_ranking);

        self.sort_keys = ranking
            .iter()
            .enumerate()
            .map(|(rank, scored)| (scored.channel.id, ChannelSortKey::Ranked(rank)))
            .collect();
        ranking
    }

    fn update_channel_recommendation(&mut self, force: bool) {
        let now = self.clock.now_utc_ms();
        let elapsed_ms = now - self.last_recommendation_updated_time_utc_ms;
        if !force && elapsed_ms < self.config.min_update_interval_ms {
            tracing::debug!(elapsed_ms, "Recommendation update throttled");
            return;
        }

        let ranking = self.rank_channels();
        self.last_recommendation_updated_time_utc_ms = now;
        let recommended = ranking.iter().filter(|c| is_recommended(c.score)).count();
        tracing::info!(ranked = ranking.len(), recommended, "Recommendation updated");

        if recommended > 0 {
            self.listener.on_recommendation_changed();
        }
    }
}
