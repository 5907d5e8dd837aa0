use crate::models::ChannelId;

/// Recommender-level errors
///
/// Scoring and ranking never fail; these cover the edges where channel data is
/// mutated or events are delivered to the recommender task.
#[derive(thiserror::Error, Debug)]
pub enum RecommenderError {
    #[error("Unknown channel: {0}")]
    UnknownChannel(ChannelId),

    #[error("Channel already exists: {0}")]
    DuplicateChannel(ChannelId),

    #[error("Event feed closed")]
    FeedClosed,

    #[error("Replay parse error: {0}")]
    Replay(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RecommenderResult<T> = Result<T, RecommenderError>;
