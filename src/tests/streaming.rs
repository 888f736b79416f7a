//! Publisher and stream session behaviour over a shared bus.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::time::Instant;

use super::{drain, stream_config};
use crate::bus::{Channel, EventBus, Publisher};
use crate::stream::{Frame, StreamSession};

fn event_bodies(frames: &[Frame]) -> Vec<String> {
    frames
        .iter()
        .filter(|f| f.is_event())
        .map(Frame::encode)
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_fifo_within_channel() {
    let bus = Arc::new(EventBus::new());
    let publisher = Publisher::new(bus.clone());
    for n in 1..=4 {
        assert!(publisher.publish(&json!({ "n": n }), "incident-update"));
    }

    let frames = drain(StreamSession::open(bus, "incident-update", stream_config(200, 10, 50))).await;

    assert_eq!(
        event_bodies(&frames),
        (1..=4)
            .map(|n| format!("event: incident-update\ndata: {{\"n\":{n}}}\n\n"))
            .collect::<Vec<_>>()
    );
}

#[tokio::test(start_paused = true)]
async fn test_unknown_channel_publish_leaves_queues_untouched() {
    let bus = Arc::new(EventBus::new());
    let publisher = Publisher::new(bus.clone());
    publisher.publish(&json!({ "keep": true }), "status-change");
    let before = bus.depths();

    assert!(!publisher.publish(&json!({ "id": 1 }), "bogus-channel"));
    assert!(!publisher.publish(&json!({ "id": 1 }), "all"));
    assert!(!publisher.publish(&json!({ "id": 1 }), ""));

    assert_eq!(bus.depths(), before);
}

#[tokio::test(start_paused = true)]
async fn test_scenario_single_event_then_keepalives() {
    let bus = Arc::new(EventBus::new());
    let publisher = Publisher::new(bus.clone());
    assert!(publisher.publish(&json!({ "id": 1 }), "new-incident"));

    let started = Instant::now();
    let frames = drain(StreamSession::open(bus, "all", stream_config(5_000, 5, 50))).await;
    let lifetime = started.elapsed();

    assert_eq!(frames[0], Frame::connected());
    assert_eq!(frames[1].encode(), "event: new-incident\ndata: {\"id\":1}\n\n");
    let middle = &frames[2..frames.len() - 1];
    assert!(!middle.is_empty());
    assert!(middle.iter().all(Frame::is_keepalive));
    assert_eq!(frames.last(), Some(&Frame::closing()));
    assert!(lifetime >= Duration::from_secs(5));
    assert!(lifetime <= Duration::from_millis(5_050), "lifetime {lifetime:?}");
}

#[tokio::test(start_paused = true)]
async fn test_scenario_budget_leaves_remainder_for_next_session() {
    let bus = Arc::new(EventBus::new());
    let publisher = Publisher::new(bus.clone());
    for id in 1..=3 {
        publisher.publish(&json!({ "id": id }), "incident-update");
    }

    let frames = drain(StreamSession::open(bus.clone(), "incident-update", stream_config(5_000, 2, 50))).await;

    assert_eq!(
        frames,
        vec![
            Frame::connected(),
            Frame::Event {
                channel: Channel::IncidentUpdate,
                data: "{\"id\":1}".to_string(),
            },
            Frame::Event {
                channel: Channel::IncidentUpdate,
                data: "{\"id\":2}".to_string(),
            },
            Frame::closing(),
        ]
    );
    assert_eq!(bus.len(Channel::IncidentUpdate), 1);

    let next = drain(StreamSession::open(bus, "incident-update", stream_config(100, 2, 50))).await;
    assert_eq!(event_bodies(&next), vec!["event: incident-update\ndata: {\"id\":3}\n\n"]);
}

#[tokio::test(start_paused = true)]
async fn test_scenario_unknown_channel_subscription() {
    let bus = Arc::new(EventBus::new());
    let frames = drain(StreamSession::open(bus, "bogus-channel", stream_config(5_000, 5, 50))).await;

    assert_eq!(frames.len(), 1);
    assert_eq!(
        frames[0].encode(),
        "data: {\"error\":\"Invalid channel bogus-channel\"}\n\n"
    );
}

#[tokio::test(start_paused = true)]
async fn test_idle_keepalive_count_tracks_interval() {
    let bus = Arc::new(EventBus::new());
    let frames = drain(StreamSession::open(bus, "resource-allocation", stream_config(500, 5, 100))).await;

    let keepalives = frames.iter().filter(|f| f.is_keepalive()).count();
    assert!((4..=6).contains(&keepalives), "got {keepalives} keep-alives");
    assert_eq!(frames.iter().filter(|f| f.is_event()).count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_budget_wins_over_remaining_time() {
    let bus = Arc::new(EventBus::new());
    for n in 0..20 {
        bus.enqueue(Channel::NewIncident, json!({ "n": n }));
    }

    let started = Instant::now();
    let frames = drain(StreamSession::open(bus.clone(), "all", stream_config(60_000, 5, 50))).await;

    assert_eq!(frames.iter().filter(|f| f.is_event()).count(), 5);
    assert_eq!(frames.last(), Some(&Frame::closing()));
    assert!(started.elapsed() < Duration::from_millis(50));
    assert_eq!(bus.len(Channel::NewIncident), 15);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sessions_never_share_an_event() {
    let bus = Arc::new(EventBus::new());
    let publisher = Publisher::new(bus.clone());
    for id in 0..40 {
        publisher.publish(&json!({ "id": id }), "new-incident");
    }

    let sessions: Vec<_> = (0..4)
        .map(|_| {
            let bus = bus.clone();
            tokio::spawn(async move {
                drain(StreamSession::open(bus, "new-incident", stream_config(200, 10, 5))).await
            })
        })
        .collect();

    let mut seen = HashSet::new();
    let mut total = 0;
    for handle in sessions {
        for body in event_bodies(&handle.await.unwrap()) {
            total += 1;
            assert!(seen.insert(body.clone()), "delivered twice: {body}");
        }
    }
    assert_eq!(total, 40);
    assert!(bus.is_empty(Channel::NewIncident));
}

#[tokio::test(start_paused = true)]
async fn test_selector_limits_watched_channels() {
    let bus = Arc::new(EventBus::new());
    bus.enqueue(Channel::NewIncident, json!({ "id": 1 }));
    bus.enqueue(Channel::StatusChange, json!({ "id": 2 }));

    let frames = drain(StreamSession::open(bus.clone(), "status-change", stream_config(100, 5, 50))).await;

    assert_eq!(event_bodies(&frames), vec!["event: status-change\ndata: {\"id\":2}\n\n"]);
    assert_eq!(bus.len(Channel::NewIncident), 1);
}
