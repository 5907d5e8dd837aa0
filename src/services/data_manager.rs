use std::collections::BTreeMap;

use crate::{
    error::{RecommenderError, RecommenderResult},
    models::{Channel, ChannelId, ChannelRecord, Program, WatchedProgram, MAX_HISTORY_SIZE},
};

/// Read access to the channel records owned by the host
///
/// Loading and persisting records is the implementor's business; the
/// recommender only reads through this trait.
pub trait ChannelDataManager {
    /// Whether the initial channel and history load has finished
    fn is_loaded(&self) -> bool;

    fn channel_record_count(&self) -> usize;

    fn channel_records(&self) -> Box<dyn Iterator<Item = &ChannelRecord> + '_>;

    fn channel_record(&self, channel_id: ChannelId) -> Option<&ChannelRecord>;
}

/// Channel records held in memory, keyed by channel id
#[derive(Debug, Clone)]
pub struct InMemoryChannelStore {
    records: BTreeMap<ChannelId, ChannelRecord>,
    history_size: usize,
    loaded: bool,
}

impl Default for InMemoryChannelStore {
    fn default() -> Self {
        Self::new(MAX_HISTORY_SIZE)
    }
}

impl InMemoryChannelStore {
    /// Creates an empty, not yet loaded store
    pub fn new(history_size: usize) -> Self {
        Self {
            records: BTreeMap::new(),
            history_size,
            loaded: false,
        }
    }

    pub fn add_channel(&mut self, channel: Channel) -> RecommenderResult<()> {
        if self.records.contains_key(&channel.id) {
            tracing::warn!(channel_id = channel.id, "Rejected duplicate channel");
            return Err(RecommenderError::DuplicateChannel(channel.id));
        }
        let id = channel.id;
        self.records
            .insert(id, ChannelRecord::with_capacity(channel, self.history_size));
        Ok(())
    }

    pub fn remove_channel(&mut self, channel_id: ChannelId) -> RecommenderResult<ChannelRecord> {
        self.records
            .remove(&channel_id)
            .ok_or(RecommenderError::UnknownChannel(channel_id))
    }

    pub fn set_current_program(
        &mut self,
        channel_id: ChannelId,
        program: Option<Program>,
    ) -> RecommenderResult<()> {
        self.record_mut(channel_id)?.set_current_program(program);
        Ok(())
    }

    pub fn log_watch_history(
        &mut self,
        channel_id: ChannelId,
        entry: WatchedProgram,
    ) -> RecommenderResult<()> {
        self.record_mut(channel_id)?.log_watch_history(entry);
        Ok(())
    }

    pub fn mark_loaded(&mut self) {
        self.loaded = true;
    }

    fn record_mut(&mut self, channel_id: ChannelId) -> RecommenderResult<&mut ChannelRecord> {
        self.records.get_mut(&channel_id).ok_or_else(|| {
            tracing::warn!(channel_id, "Mutation for unknown channel");
            RecommenderError::UnknownChannel(channel_id)
        })
    }
}

impl ChannelDataManager for InMemoryChannelStore {
    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn channel_record_count(&self) -> usize {
        self.records.len()
    }

    fn channel_records(&self) -> Box<dyn Iterator<Item = &ChannelRecord> + '_> {
        Box::new(self.records.values())
    }

    fn channel_record(&self, channel_id: ChannelId) -> Option<&ChannelRecord> {
        self.records.get(&channel_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_lookup() {
        let mut store = InMemoryChannelStore::new(4);
        store.add_channel(Channel::new(2)).unwrap();
        store.add_channel(Channel::new(1)).unwrap();

        assert_eq!(store.channel_record_count(), 2);
        assert_eq!(store.channel_record(2).unwrap().capacity(), 4);
        assert!(store.channel_record(9).is_none());
        let ids: Vec<ChannelId> = store.channel_records().map(|r| r.channel_id()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_duplicate_channel_rejected() {
        let mut store = InMemoryChannelStore::default();
        store.add_channel(Channel::new(1)).unwrap();
        let err = store.add_channel(Channel::new(1)).unwrap_err();
        assert!(matches!(err, RecommenderError::DuplicateChannel(1)));
    }

    #[test]
    fn test_log_for_unknown_channel() {
        let mut store = InMemoryChannelStore::default();
        let err = store
            .log_watch_history(5, WatchedProgram::new(None, 0, 1))
            .unwrap_err();
        assert!(matches!(err, RecommenderError::UnknownChannel(5)));
    }

    #[test]
    fn test_log_and_remove() {
        let mut store = InMemoryChannelStore::default();
        store.add_channel(Channel::new(1)).unwrap();
        store
            .log_watch_history(1, WatchedProgram::new(None, 0, 30))
            .unwrap();
        let removed = store.remove_channel(1).unwrap();
        assert_eq!(removed.total_watch_duration_ms(), 30);
        assert_eq!(store.channel_record_count(), 0);
        assert!(!store.is_loaded());
    }
}
