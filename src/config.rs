use serde::Deserialize;

use crate::models::MAX_HISTORY_SIZE;

/// How the scores of several registered evaluators collapse into one
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCombiner {
    /// Sum of every scoring evaluator's weighted contribution
    #[default]
    Sum,
    /// Largest weighted contribution
    Max,
    /// Contribution of the first registered evaluator that scores the channel
    FirstScored,
}

/// Recommender configuration loaded from `RECOMMENDER_*` environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct RecommenderConfig {
    /// Only rank channels with a real aggregate score
    #[serde(default)]
    pub include_recommended_only: bool,

    /// Minimum time between watch-log triggered recomputations
    #[serde(default = "default_min_update_interval_ms")]
    pub min_update_interval_ms: i64,

    /// Watch history entries retained per channel
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// Gap after which the recent-channel score halves
    #[serde(default = "default_recent_half_life_ms")]
    pub recent_half_life_ms: i64,

    #[serde(default)]
    pub combiner: ScoreCombiner,
}

fn default_min_update_interval_ms() -> i64 {
    10 * 60 * 1000
}

fn default_history_size() -> usize {
    MAX_HISTORY_SIZE
}

fn default_recent_half_life_ms() -> i64 {
    24 * 60 * 60 * 1000
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            include_recommended_only: false,
            min_update_interval_ms: default_min_update_interval_ms(),
            history_size: default_history_size(),
            recent_half_life_ms: default_recent_half_life_ms(),
            combiner: ScoreCombiner::default(),
        }
    }
}

impl RecommenderConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::prefixed("RECOMMENDER_")
            .from_env::<RecommenderConfig>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RecommenderConfig::default();
        assert!(!config.include_recommended_only);
        assert_eq!(config.history_size, MAX_HISTORY_SIZE);
        assert_eq!(config.combiner, ScoreCombiner::Sum);
    }

    #[test]
    fn test_from_prefixed_vars() {
        let vars = vec![
            (
                "RECOMMENDER_INCLUDE_RECOMMENDED_ONLY".to_string(),
                "true".to_string(),
            ),
            ("RECOMMENDER_HISTORY_SIZE".to_string(), "5".to_string()),
            ("RECOMMENDER_COMBINER".to_string(), "max".to_string()),
        ];
        let config: RecommenderConfig = envy::prefixed("RECOMMENDER_")
            .from_iter(vars)
            .unwrap();
        assert!(config.include_recommended_only);
        assert_eq!(config.history_size, 5);
        assert_eq!(config.combiner, ScoreCombiner::Max);
        assert_eq!(
            config.min_update_interval_ms,
            default_min_update_interval_ms()
        );
    }
}
