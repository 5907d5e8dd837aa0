use std::path::Path;

use serde::Deserialize;

use crate::{
    error::RecommenderResult,
    models::{Channel, ChannelId, Program, WatchedProgram},
    services::{clock::ManualClock, feed::RecommenderHandle},
};

/// A recorded channel lineup plus watch logs
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayFile {
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub current_programs: Vec<CurrentProgram>,
    #[serde(default)]
    pub watch_logs: Vec<WatchLog>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentProgram {
    pub channel_id: ChannelId,
    pub program: Program,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchLog {
    pub channel_id: ChannelId,
    #[serde(flatten)]
    pub entry: WatchedProgram,
}

impl ReplayFile {
    pub fn load(path: &Path) -> RecommenderResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> RecommenderResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Feeds `replay` through `handle` as if it were happening live
///
/// Channels are loaded first, then watch logs are applied in end-time order
/// with `clock` set to each log's end time, so throttling follows log time.
pub async fn run_replay(
    handle: &RecommenderHandle,
    clock: &ManualClock,
    replay: ReplayFile,
) -> RecommenderResult<()> {
    for channel in replay.channels {
        handle.add_channel(channel).await?;
    }
    for current in replay.current_programs {
        handle
            .set_current_program(current.channel_id, Some(current.program))
            .await?;
    }
    handle.finish_loading().await?;

    let mut watch_logs = replay.watch_logs;
    watch_logs.sort_by_key(|log| log.entry.watch_end_time_ms);
    tracing::info!(log_count = watch_logs.len(), "Replaying watch logs");

    for log in watch_logs {
        handle.flush().await?;
        clock.set(log.entry.watch_end_time_ms);
        handle.log_watch(log.channel_id, log.entry).await?;
    }
    handle.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecommenderError;

    #[test]
    fn test_parse_replay_file() {
        let replay = ReplayFile::parse(
            r#"{
                "channels": [{"id": 1, "displayName": "News 24"}, {"id": 2}],
                "currentPrograms": [
                    {"channelId": 1, "program": {"title": "Headlines", "startTimeUtcMs": 0, "endTimeUtcMs": 1800000}}
                ],
                "watchLogs": [
                    {"channelId": 2, "watchStartTimeMs": 100, "watchEndTimeMs": 200}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(replay.channels.len(), 2);
        assert_eq!(replay.channels[0].display_name.as_deref(), Some("News 24"));
        assert_eq!(replay.current_programs[0].program.title.as_deref(), Some("Headlines"));
        assert_eq!(replay.watch_logs[0].channel_id, 2);
        assert_eq!(replay.watch_logs[0].entry.duration_ms(), 100);
        assert!(replay.watch_logs[0].entry.program.is_none());
    }

    #[test]
    fn test_parse_error() {
        let err = ReplayFile::parse(r#"{"channels": "nope"}"#).unwrap_err();
        assert!(matches!(err, RecommenderError::Replay(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ReplayFile::load(Path::new("/nonexistent/replay.json")).unwrap_err();
        assert!(matches!(err, RecommenderError::Io(_)));
    }
}
