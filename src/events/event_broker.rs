use std::collections::HashMap;
use tokio::sync::{mpsc, RwLock};

use crate::a2a::TaskUpdateEvent;
use crate::errors::AgentResult;

/// Buffer per subscriber. `try_send` drops events for a consumer that falls
/// this far behind rather than blocking the producer.
const SUBSCRIBER_CHANNEL_CAPACITY: usize = 1000;

/// Per-task broadcast of lifecycle and artifact events.
///
/// Every open subscriber of a task id receives every published event, in
/// publish order. The final status event removes the channel entry: sender
/// halves are dropped so subscribers drain what is buffered and then see
/// end-of-stream, and the map never accumulates finished tasks. The broker
/// keeps no history; late attachment semantics are the caller's concern.
pub struct EventBroker {
    channels: RwLock<HashMap<String, Vec<mpsc::Sender<TaskUpdateEvent>>>>,
}

impl EventBroker {
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Attach a subscriber to a task's event stream.
    ///
    /// With `resume == false` this starts a fresh stream for the id, clearing
    /// any previous channel state. With `resume == true` the subscriber
    /// attaches to whatever producer exists (or may attach later) without
    /// disturbing other subscribers.
    pub async fn open(
        &self,
        task_id: &str,
        resume: bool,
    ) -> AgentResult<mpsc::Receiver<TaskUpdateEvent>> {
        let mut channels = self.channels.write().await;

        if !resume {
            channels.remove(task_id);
        }
        let subscribers = channels.entry(task_id.to_string()).or_default();

        let (sender, receiver) = mpsc::channel(SUBSCRIBER_CHANNEL_CAPACITY);
        subscribers.push(sender);

        Ok(receiver)
    }

    /// Broadcast an event to every open subscriber of the task.
    ///
    /// Callers must only publish an event after the corresponding store
    /// mutation has been applied. A final status event removes the channel
    /// entry, dropping all sender halves.
    pub async fn publish(&self, task_id: &str, event: TaskUpdateEvent) -> AgentResult<()> {
        let mut channels = self.channels.write().await;

        let Some(subscribers) = channels.get_mut(task_id) else {
            tracing::debug!(task_id = %task_id, "No subscribers for event");
            return Ok(());
        };

        subscribers.retain(|sender| !sender.is_closed());

        for sender in subscribers.iter() {
            if sender.try_send(event.clone()).is_err() {
                // Full or closed subscriber queue; never block the producer.
                tracing::warn!(task_id = %task_id, "Dropping event for slow subscriber");
            }
        }

        if event.is_final() {
            channels.remove(task_id);
        }

        Ok(())
    }

    /// Number of live subscribers for a task id.
    pub async fn subscriber_count(&self, task_id: &str) -> usize {
        let channels = self.channels.read().await;
        channels
            .get(task_id)
            .map(|senders| senders.iter().filter(|s| !s.is_closed()).count())
            .unwrap_or(0)
    }
}

impl Default for EventBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::a2a::{TaskState, TaskStatus, TaskStatusUpdateEvent};

    fn status_event(task_id: &str, state: TaskState, is_final: bool) -> TaskUpdateEvent {
        TaskUpdateEvent::Status(TaskStatusUpdateEvent {
            id: task_id.to_string(),
            status: TaskStatus::new(state),
            is_final,
        })
    }

    #[tokio::test]
    async fn events_reach_every_subscriber_in_order() {
        let broker = EventBroker::new();
        let mut first = broker.open("t1", false).await.unwrap();
        let mut second = broker.open("t1", true).await.unwrap();

        broker
            .publish("t1", status_event("t1", TaskState::Working, false))
            .await
            .unwrap();
        broker
            .publish("t1", status_event("t1", TaskState::Completed, true))
            .await
            .unwrap();

        for receiver in [&mut first, &mut second] {
            let working = receiver.recv().await.unwrap();
            assert!(!working.is_final());
            let completed = receiver.recv().await.unwrap();
            assert!(completed.is_final());
            // Channel closed after the final event.
            assert!(receiver.recv().await.is_none());
        }
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_noop() {
        let broker = EventBroker::new();
        broker
            .publish("ghost", status_event("ghost", TaskState::Working, false))
            .await
            .unwrap();
        assert_eq!(broker.subscriber_count("ghost").await, 0);
    }

    #[tokio::test]
    async fn final_event_removes_channel_and_closes_subscribers() {
        let broker = EventBroker::new();
        let mut receiver = broker.open("t1", false).await.unwrap();

        broker
            .publish("t1", status_event("t1", TaskState::Completed, true))
            .await
            .unwrap();
        assert_eq!(broker.subscriber_count("t1").await, 0);

        // Subscriber drains the final event and then sees end-of-stream.
        assert!(receiver.recv().await.unwrap().is_final());
        assert!(receiver.recv().await.is_none());
    }

    #[tokio::test]
    async fn resume_after_final_event_starts_a_fresh_channel() {
        let broker = EventBroker::new();
        let _original = broker.open("t1", false).await.unwrap();
        broker
            .publish("t1", status_event("t1", TaskState::Completed, true))
            .await
            .unwrap();

        // A subscriber attaching after the final event gets a fresh channel
        // that a synthesized publish can still reach.
        let mut late = broker.open("t1", true).await.unwrap();
        broker
            .publish("t1", status_event("t1", TaskState::Completed, true))
            .await
            .unwrap();

        assert!(late.recv().await.unwrap().is_final());
        assert!(late.recv().await.is_none());
    }

    #[tokio::test]
    async fn resume_attaches_without_clearing_existing_subscribers() {
        let broker = EventBroker::new();
        let mut original = broker.open("t1", false).await.unwrap();
        let _late = broker.open("t1", true).await.unwrap();

        broker
            .publish("t1", status_event("t1", TaskState::Working, false))
            .await
            .unwrap();
        assert!(original.recv().await.is_some());
    }

    #[tokio::test]
    async fn dropped_subscribers_are_cleaned_up_on_publish() {
        let broker = EventBroker::new();
        let receiver = broker.open("t1", false).await.unwrap();
        drop(receiver);

        broker
            .publish("t1", status_event("t1", TaskState::Working, false))
            .await
            .unwrap();
        assert_eq!(broker.subscriber_count("t1").await, 0);
    }
}
