use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::{
    error::{RecommenderError, RecommenderResult},
    models::{Channel, ChannelId, Program, WatchedProgram},
    services::{
        data_manager::InMemoryChannelStore,
        recommender::{ChannelSortKey, Recommender, ScoredChannel},
    },
};

/// Events delivered to the recommender task
#[derive(Debug)]
pub enum ChannelEvent {
    ChannelAdded(Channel),
    ChannelRemoved(ChannelId),
    CurrentProgramChanged {
        channel_id: ChannelId,
        program: Option<Program>,
    },
    LoadFinished,
    WatchLogged {
        channel_id: ChannelId,
        entry: WatchedProgram,
    },
    Recommend {
        max_count: usize,
        reply: oneshot::Sender<Vec<ScoredChannel>>,
    },
    SortKey {
        channel_id: ChannelId,
        reply: oneshot::Sender<ChannelSortKey>,
    },
    Flush(oneshot::Sender<()>),
}

/// Sending side of a recommender task
///
/// Events are applied strictly in send order by the single task owning the
/// recommender, so hosts on any thread can share clones of the handle.
#[derive(Debug, Clone)]
pub struct RecommenderHandle {
    sender: mpsc::Sender<ChannelEvent>,
}

impl RecommenderHandle {
    pub async fn add_channel(&self, channel: Channel) -> RecommenderResult<()> {
        self.send(ChannelEvent::ChannelAdded(channel)).await
    }

    pub async fn remove_channel(&self, channel_id: ChannelId) -> RecommenderResult<()> {
        self.send(ChannelEvent::ChannelRemoved(channel_id)).await
    }

    pub async fn set_current_program(
        &self,
        channel_id: ChannelId,
        program: Option<Program>,
    ) -> RecommenderResult<()> {
        self.send(ChannelEvent::CurrentProgramChanged {
            channel_id,
            program,
        })
        .await
    }

    pub async fn finish_loading(&self) -> RecommenderResult<()> {
        self.send(ChannelEvent::LoadFinished).await
    }

    pub async fn log_watch(&self, channel_id: ChannelId, entry: WatchedProgram) -> RecommenderResult<()> {
        self.send(ChannelEvent::WatchLogged { channel_id, entry }).await
    }

    pub async fn recommend(&self, max_count: usize) -> RecommenderResult<Vec<ScoredChannel>> {
        let (reply, response) = oneshot::channel();
        self.send(ChannelEvent::Recommend { max_count, reply }).await?;
        response.await.map_err(|_| RecommenderError::FeedClosed)
    }

    pub async fn channel_sort_key(&self, channel_id: ChannelId) -> RecommenderResult<ChannelSortKey> {
        let (reply, response) = oneshot::channel();
        self.send(ChannelEvent::SortKey { channel_id, reply }).await?;
        response.await.map_err(|_| RecommenderError::FeedClosed)
    }

    /// Resolves once every event sent before it has been applied
    pub async fn flush(&self) -> RecommenderResult<()> {
        let (reply, response) = oneshot::channel();
        self.send(ChannelEvent::Flush(reply)).await?;
        response.await.map_err(|_| RecommenderError::FeedClosed)
    }

    async fn send(&self, event: ChannelEvent) -> RecommenderResult<()> {
        self.sender
            .send(event)
            .await
            .map_err(|_| RecommenderError::FeedClosed)
    }
}

/// Moves `recommender` onto a task draining a bounded event queue
///
/// The task ends once every handle is dropped and returns the recommender.
pub fn spawn(
    recommender: Recommender<InMemoryChannelStore>,
    buffer: usize,
) -> (RecommenderHandle, JoinHandle<Recommender<InMemoryChannelStore>>) {
    let (sender, receiver) = mpsc::channel(buffer.max(1));
    let task = tokio::spawn(run(recommender, receiver));
    (RecommenderHandle { sender }, task)
}

async fn run(
    mut recommender: Recommender<InMemoryChannelStore>,
    mut receiver: mpsc::Receiver<ChannelEvent>,
) -> Recommender<InMemoryChannelStore> {
    while let Some(event) = receiver.recv().await {
        apply(&mut recommender, event);
    }
    tracing::info!("Event feed closed");
    recommender
}

fn apply(recommender: &mut Recommender<InMemoryChannelStore>, event: ChannelEvent) {
    match event {
        ChannelEvent::ChannelAdded(channel) => {
            match recommender.data_manager_mut().add_channel(channel) {
                Ok(()) => recommender.on_channel_record_changed(),
                Err(e) => tracing::warn!(error = %e, "Dropping channel add"),
            }
        }
        ChannelEvent::ChannelRemoved(channel_id) => {
            match recommender.data_manager_mut().remove_channel(channel_id) {
                Ok(_) => recommender.on_channel_record_changed(),
                Err(e) => tracing::warn!(error = %e, "Dropping channel removal"),
            }
        }
        ChannelEvent::CurrentProgramChanged {
            channel_id,
            program,
        } => {
            if let Err(e) = recommender
                .data_manager_mut()
                .set_current_program(channel_id, program)
            {
                tracing::warn!(error = %e, "Dropping program change");
            }
        }
        ChannelEvent::LoadFinished => {
            recommender.data_manager_mut().mark_loaded();
            recommender.on_channel_record_loaded();
        }
        ChannelEvent::WatchLogged { channel_id, entry } => {
            match recommender
                .data_manager_mut()
                .log_watch_history(channel_id, entry)
            {
                Ok(()) => recommender.on_new_watch_log(channel_id),
                Err(e) => tracing::warn!(error = %e, "Dropping watch log"),
            }
        }
        ChannelEvent::Recommend { max_count, reply } => {
            // The requester may have gone away; nothing to do then.
            let _ = reply.send(recommender.recommend_scored_channels(max_count));
        }
        ChannelEvent::SortKey { channel_id, reply } => {
            let _ = reply.send(recommender.get_channel_sort_key(channel_id));
        }
        ChannelEvent::Flush(reply) => {
            let _ = reply.send(());
        }
    }
}
