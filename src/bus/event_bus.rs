use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::futures::Notified;
use tokio::sync::Notify;
use uuid::Uuid;

use super::{BusError, Channel};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusEvent {
    pub id: String,
    pub seq: i64,
    pub channel: Channel,
    pub payload: serde_json::Value,
    pub created_at: String,
}

/// Unbounded FIFO for a single channel.
#[derive(Default)]
struct ChannelQueue {
    items: Mutex<VecDeque<BusEvent>>,
    published: Notify,
}

/// Process-wide set of channel queues.
///
/// Every queued event is handed to exactly one consumer: the first
/// `try_dequeue` on its channel takes it. Producers never wait on consumers.
pub struct EventBus {
    queues: Vec<ChannelQueue>,
    seq: AtomicI64,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            queues: Channel::all().iter().map(|_| ChannelQueue::default()).collect(),
            seq: AtomicI64::new(0),
        }
    }

    fn queue(&self, channel: Channel) -> &ChannelQueue {
        &self.queues[channel.index()]
    }

    /// Append a payload to `channel`. Always succeeds.
    pub fn enqueue(&self, channel: Channel, payload: serde_json::Value) -> BusEvent {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let event = BusEvent {
            id: Uuid::new_v4().to_string(),
            seq,
            channel,
            payload,
            created_at: Utc::now().to_rfc3339(),
        };

        let queue = self.queue(channel);
        {
            // A push cannot leave the deque half-written, so a poisoned lock
            // is still safe to append to.
            let mut items = queue
                .items
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            items.push_back(event.clone());
        }
        queue.published.notify_waiters();
        event
    }

    /// Take the oldest event on `channel` without waiting.
    ///
    /// Returns `BusError::Empty` when nothing is queued and
    /// `BusError::QueueFault` when the queue lock was poisoned by a panicking
    /// holder; the poison is cleared so later calls proceed normally.
    pub fn try_dequeue(&self, channel: Channel) -> Result<BusEvent, BusError> {
        let queue = self.queue(channel);
        match queue.items.lock() {
            Ok(mut items) => items.pop_front().ok_or(BusError::Empty(channel)),
            Err(poisoned) => {
                let reason = poisoned.to_string();
                drop(poisoned);
                queue.items.clear_poison();
                Err(BusError::QueueFault { channel, reason })
            }
        }
    }

    pub fn is_empty(&self, channel: Channel) -> bool {
        self.len(channel) == 0
    }

    pub fn len(&self, channel: Channel) -> usize {
        self.queue(channel)
            .items
            .lock()
            .map(|items| items.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }

    /// Current depth of every queue, in catalogue order.
    pub fn depths(&self) -> Vec<(Channel, usize)> {
        Channel::all()
            .iter()
            .map(|channel| (*channel, self.len(*channel)))
            .collect()
    }

    /// Future that resolves on the next enqueue to `channel`.
    ///
    /// Only waiters registered before the enqueue are woken, so callers must
    /// bound the wait with a timeout.
    pub fn published(&self, channel: Channel) -> Notified<'_> {
        self.queue(channel).published.notified()
    }

    #[cfg(test)]
    pub(crate) fn poison_queue(&self, channel: Channel) {
        let queue = self.queue(channel);
        std::thread::scope(|scope| {
            let _ = scope
                .spawn(|| {
                    let _guard = queue.items.lock().unwrap();
                    panic!("poisoning {channel} queue for test");
                })
                .join();
        });
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use serde_json::json;

    use super::*;

    #[test]
    fn test_dequeue_preserves_publish_order() {
        let bus = EventBus::new();
        for i in 0..20 {
            bus.enqueue(Channel::IncidentUpdate, json!({ "n": i }));
        }

        for i in 0..20 {
            let event = bus.try_dequeue(Channel::IncidentUpdate).unwrap();
            assert_eq!(event.payload["n"], i);
            assert_eq!(event.channel, Channel::IncidentUpdate);
        }
        assert_eq!(
            bus.try_dequeue(Channel::IncidentUpdate).unwrap_err(),
            BusError::Empty(Channel::IncidentUpdate)
        );
    }

    #[test]
    fn test_channels_are_isolated() {
        let bus = EventBus::new();
        bus.enqueue(Channel::NewIncident, json!({ "id": 1 }));

        assert!(bus.is_empty(Channel::IncidentUpdate));
        assert!(bus.try_dequeue(Channel::StatusChange).is_err());
        assert_eq!(bus.len(Channel::NewIncident), 1);
        assert_eq!(
            bus.depths(),
            vec![
                (Channel::NewIncident, 1),
                (Channel::IncidentUpdate, 0),
                (Channel::ResourceAllocation, 0),
                (Channel::StatusChange, 0),
            ]
        );
    }

    #[test]
    fn test_sequence_numbers_increase() {
        let bus = EventBus::new();
        let a = bus.enqueue(Channel::NewIncident, json!({}));
        let b = bus.enqueue(Channel::StatusChange, json!({}));
        let c = bus.enqueue(Channel::NewIncident, json!({}));
        assert!(a.seq < b.seq && b.seq < c.seq);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn test_concurrent_consumers_never_share_an_event() {
        let bus = Arc::new(EventBus::new());
        let total = 2_000;

        let producers: Vec<_> = (0..4)
            .map(|p| {
                let bus = bus.clone();
                std::thread::spawn(move || {
                    for i in 0..total / 4 {
                        bus.enqueue(Channel::NewIncident, json!({ "p": p, "i": i }));
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().unwrap();
        }

        let consumers: Vec<_> = (0..8)
            .map(|_| {
                let bus = bus.clone();
                std::thread::spawn(move || {
                    let mut taken = Vec::new();
                    while let Ok(event) = bus.try_dequeue(Channel::NewIncident) {
                        taken.push(event.id);
                    }
                    taken
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for consumer in consumers {
            for id in consumer.join().unwrap() {
                assert!(seen.insert(id), "event delivered twice");
            }
        }
        assert_eq!(seen.len(), total);
        assert!(bus.is_empty(Channel::NewIncident));
    }

    #[test]
    fn test_poisoned_queue_reports_fault_once() {
        let bus = EventBus::new();
        bus.enqueue(Channel::ResourceAllocation, json!({ "id": 7 }));
        bus.poison_queue(Channel::ResourceAllocation);

        match bus.try_dequeue(Channel::ResourceAllocation) {
            Err(BusError::QueueFault { channel, .. }) => {
                assert_eq!(channel, Channel::ResourceAllocation)
            }
            other => panic!("expected queue fault, got {other:?}"),
        }

        // The queued item survives the fault.
        let event = bus.try_dequeue(Channel::ResourceAllocation).unwrap();
        assert_eq!(event.payload["id"], 7);
    }

    #[tokio::test]
    async fn test_enqueue_wakes_registered_waiters() {
        let bus = Arc::new(EventBus::new());
        let waiter = {
            let bus = bus.clone();
            tokio::spawn(async move {
                tokio::time::timeout(std::time::Duration::from_secs(5), bus.published(Channel::StatusChange))
                    .await
                    .is_ok()
            })
        };
        tokio::task::yield_now().await;
        // Keep publishing until the waiter has registered and been woken.
        while !waiter.is_finished() {
            bus.enqueue(Channel::StatusChange, json!({}));
            tokio::task::yield_now().await;
        }
        assert!(waiter.await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_enqueue_only_wakes_its_own_channel() {
        let bus = EventBus::new();
        let waiting = bus.published(Channel::ResourceAllocation);
        tokio::pin!(waiting);
        waiting.as_mut().enable();

        bus.enqueue(Channel::NewIncident, json!({}));
        let woken = tokio::time::timeout(std::time::Duration::from_millis(10), waiting.as_mut()).await;
        assert!(woken.is_err());

        let waiting = bus.published(Channel::ResourceAllocation);
        tokio::pin!(waiting);
        waiting.as_mut().enable();
        bus.enqueue(Channel::ResourceAllocation, json!({}));
        assert!(tokio::time::timeout(std::time::Duration::from_millis(10), waiting).await.is_ok());
    }
}
