use serde::{Deserialize, Serialize};

mod channel_record;

pub use channel_record::{ChannelRecord, MAX_HISTORY_SIZE};

/// Opaque channel identity assigned by the data manager
pub type ChannelId = u64;

/// A content channel known to the data manager
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: ChannelId,
    #[serde(default)]
    pub display_number: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Channel {
    /// Creates a channel with no display metadata
    pub fn new(id: ChannelId) -> Self {
        Self {
            id,
            display_number: None,
            display_name: None,
        }
    }
}

/// Program metadata from the guide
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    #[serde(default)]
    pub title: Option<String>,
    pub start_time_utc_ms: i64,
    pub end_time_utc_ms: i64,
}

impl Program {
    pub fn new(title: impl Into<String>, start_time_utc_ms: i64, end_time_utc_ms: i64) -> Self {
        Self {
            title: Some(title.into()),
            start_time_utc_ms,
            end_time_utc_ms,
        }
    }
}

/// One watch event on a channel
///
/// The data manager guarantees `watch_start_time_ms <= watch_end_time_ms`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WatchedProgram {
    #[serde(default)]
    pub program: Option<Program>,
    pub watch_start_time_ms: i64,
    pub watch_end_time_ms: i64,
}

impl WatchedProgram {
    pub fn new(program: Option<Program>, watch_start_time_ms: i64, watch_end_time_ms: i64) -> Self {
        Self {
            program,
            watch_start_time_ms,
            watch_end_time_ms,
        }
    }

    pub fn duration_ms(&self) -> i64 {
        self.watch_end_time_ms - self.watch_start_time_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watched_program_duration() {
        let entry = WatchedProgram::new(None, 1_000, 4_500);
        assert_eq!(entry.duration_ms(), 3_500);
    }

    #[test]
    fn test_watched_program_serde_camel_case() {
        let json = r#"{
            "program": {"title": "News", "startTimeUtcMs": 0, "endTimeUtcMs": 60000},
            "watchStartTimeMs": 10,
            "watchEndTimeMs": 20
        }"#;
        let entry: WatchedProgram = serde_json::from_str(json).unwrap();
        assert_eq!(entry.program, Some(Program::new("News", 0, 60_000)));
        assert_eq!(entry.duration_ms(), 10);
    }

    #[test]
    fn test_channel_defaults_missing_metadata() {
        let channel: Channel = serde_json::from_str(r#"{"id": 3}"#).unwrap();
        assert_eq!(channel, Channel::new(3));
    }

    #[test]
    fn test_channel_serde_camel_case() {
        let channel: Channel =
            serde_json::from_str(r#"{"id": 7, "displayNumber": "7-1", "displayName": "Seven"}"#)
                .unwrap();
        assert_eq!(channel.display_number.as_deref(), Some("7-1"));
        assert_eq!(channel.display_name.as_deref(), Some("Seven"));

        let json = serde_json::to_value(&channel).unwrap();
        assert_eq!(json["displayName"], "Seven");
    }
}
