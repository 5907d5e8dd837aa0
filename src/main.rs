use std::path::PathBuf;
use std::sync::Arc;

use channel_recommender::{
    replay::{run_replay, ReplayFile},
    services::{
        feed, FavoriteChannelEvaluator, InMemoryChannelStore, ManualClock, RecentChannelEvaluator,
        Recommender, RecommenderListener, RoutineWatchEvaluator,
    },
    RecommenderConfig,
};
use tracing_subscriber::EnvFilter;

const DEFAULT_MAX_COUNT: usize = 10;

/// Logs recommender callbacks
struct LoggingListener;

impl RecommenderListener for LoggingListener {
    fn on_recommender_ready(&mut self) {
        tracing::info!("Recommender ready");
    }

    fn on_recommendation_changed(&mut self) {
        tracing::info!("Recommendation changed");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let path: PathBuf = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("usage: channel-recommender <replay.json> [max_count]"))?
        .into();
    let max_count = match args.next() {
        Some(raw) => raw.parse()?,
        None => DEFAULT_MAX_COUNT,
    };

    let config = RecommenderConfig::from_env()?;
    let replay = ReplayFile::load(&path)?;

    // Throttling follows log time, not wall time.
    let clock = ManualClock::new(0);
    let mut recommender = Recommender::with_clock(
        LoggingListener,
        InMemoryChannelStore::new(config.history_size),
        config.clone(),
        Arc::new(clock.clone()),
    );
    recommender.register_evaluator(FavoriteChannelEvaluator::new());
    recommender.register_evaluator(RecentChannelEvaluator::new(config.recent_half_life_ms));
    recommender.register_evaluator(RoutineWatchEvaluator::new());

    let (handle, task) = feed::spawn(recommender, 64);
    run_replay(&handle, &clock, replay).await?;

    let ranking = handle.recommend(max_count).await?;
    for scored in &ranking {
        let sort_key = handle.channel_sort_key(scored.channel.id).await?;
        println!(
            "{:>6}  {:<24}  score={:.3}  sort_key={:?}",
            scored.channel.id,
            scored.channel.display_name.as_deref().unwrap_or("-"),
            scored.score,
            sort_key
        );
    }

    drop(handle);
    task.await?;
    Ok(())
}
