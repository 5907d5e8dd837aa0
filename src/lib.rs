//! Channel recommendation engine
//!
//! Bounded per-channel watch histories, pluggable scoring strategies and a
//! recommender combining them into a throttled, notifying channel ranking.

pub mod config;
pub mod error;
pub mod models;
pub mod replay;
pub mod services;

pub use config::{RecommenderConfig, ScoreCombiner};
pub use error::{RecommenderError, RecommenderResult};
