use std::collections::{vec_deque, VecDeque};

use super::{Channel, ChannelId, Program, WatchedProgram};

/// Default number of watch entries kept per channel
pub const MAX_HISTORY_SIZE: usize = 100;

/// Bounded watch history of one channel
///
/// Entries are kept in insertion (chronological) order. Once the history is
/// full, logging a new entry evicts the oldest one, and the running total only
/// counts entries still held.
#[derive(Debug, Clone)]
pub struct ChannelRecord {
    channel: Channel,
    current_program: Option<Program>,
    history: VecDeque<WatchedProgram>,
    capacity: usize,
    last_watch_end_time_ms: i64,
    total_watch_duration_ms: i64,
}

impl ChannelRecord {
    pub fn new(channel: Channel) -> Self {
        Self::with_capacity(channel, MAX_HISTORY_SIZE)
    }

    /// Creates a record retaining at most `capacity` entries (at least one)
    pub fn with_capacity(channel: Channel, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            channel,
            current_program: None,
            history: VecDeque::with_capacity(capacity),
            capacity,
            last_watch_end_time_ms: 0,
            total_watch_duration_ms: 0,
        }
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    pub fn channel_id(&self) -> ChannelId {
        self.channel.id
    }

    pub fn current_program(&self) -> Option<&Program> {
        self.current_program.as_ref()
    }

    pub fn set_current_program(&mut self, program: Option<Program>) {
        self.current_program = program;
    }

    /// Appends a watch entry, evicting the oldest one when full
    pub fn log_watch_history(&mut self, entry: WatchedProgram) {
        if self.history.len() == self.capacity {
            if let Some(evicted) = self.history.pop_front() {
                self.total_watch_duration_ms -= evicted.duration_ms();
            }
        }
        self.total_watch_duration_ms += entry.duration_ms();
        self.last_watch_end_time_ms = entry.watch_end_time_ms;
        self.history.push_back(entry);
    }

    /// Retained entries, oldest first
    pub fn watch_history(&self) -> vec_deque::Iter<'_, WatchedProgram> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// End time of the latest entry ever logged, 0 before any
    pub fn last_watch_end_time_ms(&self) -> i64 {
        self.last_watch_end_time_ms
    }

    pub fn total_watch_duration_ms(&self) -> i64 {
        self.total_watch_duration_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(start: i64, end: i64) -> WatchedProgram {
        WatchedProgram::new(None, start, end)
    }

    #[test]
    fn test_empty_record() {
        let record = ChannelRecord::new(Channel::new(1));
        assert_eq!(record.last_watch_end_time_ms(), 0);
        assert_eq!(record.total_watch_duration_ms(), 0);
        assert_eq!(record.history_len(), 0);
    }

    #[test]
    fn test_history_is_capped_and_keeps_most_recent() {
        let mut record = ChannelRecord::with_capacity(Channel::new(1), 3);
        for i in 0..5 {
            record.log_watch_history(entry(i * 100, i * 100 + 10));
        }
        assert_eq!(record.history_len(), 3);
        let starts: Vec<i64> = record.watch_history().map(|e| e.watch_start_time_ms).collect();
        assert_eq!(starts, vec![200, 300, 400]);
    }

    #[test]
    fn test_total_duration_drops_evicted_entry() {
        let mut record = ChannelRecord::with_capacity(Channel::new(1), 2);
        record.log_watch_history(entry(0, 50));
        record.log_watch_history(entry(100, 120));
        assert_eq!(record.total_watch_duration_ms(), 70);

        record.log_watch_history(entry(200, 205));
        assert_eq!(record.total_watch_duration_ms(), 25);
        assert_eq!(record.last_watch_end_time_ms(), 205);
    }

    #[test]
    fn test_default_capacity() {
        let mut record = ChannelRecord::new(Channel::new(1));
        for i in 0..(MAX_HISTORY_SIZE as i64 + 10) {
            record.log_watch_history(entry(i, i + 1));
        }
        assert_eq!(record.history_len(), MAX_HISTORY_SIZE);
        assert_eq!(record.total_watch_duration_ms(), MAX_HISTORY_SIZE as i64);
        assert_eq!(record.last_watch_end_time_ms(), MAX_HISTORY_SIZE as i64 + 10);
    }

    #[test]
    fn test_zero_capacity_keeps_one_entry() {
        let mut record = ChannelRecord::with_capacity(Channel::new(1), 0);
        record.log_watch_history(entry(0, 10));
        record.log_watch_history(entry(20, 25));
        assert_eq!(record.history_len(), 1);
        assert_eq!(record.total_watch_duration_ms(), 5);
    }
}
