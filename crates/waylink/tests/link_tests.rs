//! Integration tests for link delivery
//!
//! Ordering under artificial delays, unsubscribe semantics, independent
//! subscribers, and links driving a shared store.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::sync::{mpsc, Mutex};
use waylink::*;

fn no_dedup() -> SubscriptionConfig {
    SubscriptionConfig {
        capacity: 32,
        dedup_window_ms: 0,
    }
}

#[tokio::test]
async fn test_handler_observes_events_in_arrival_order() {
    let links = LinkSubscription::new(&no_dedup());
    let (tx, mut rx) = mpsc::unbounded_channel();

    let _subscription = links.subscribe(move |event: PendingLinkEvent| {
        let tx = tx.clone();
        async move {
            // First link is slow, second is instant
            let delay = if event.path == "/first" { 50 } else { 0 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            let _ = tx.send(event.path);
        }
    });

    let source = links.source();
    source.deliver("/first");
    source.deliver("/second");
    source.deliver("/third");

    let mut seen = Vec::new();
    for _ in 0..3 {
        seen.push(rx.recv().await.unwrap());
    }
    assert_eq!(seen, vec!["/first", "/second", "/third"]);
}

#[tokio::test]
async fn test_slow_handler_beyond_capacity_sees_every_link() {
    let links = LinkSubscription::new(&SubscriptionConfig {
        capacity: 2,
        dedup_window_ms: 0,
    });
    let (tx, mut rx) = mpsc::unbounded_channel();

    let _subscription = links.subscribe(move |event: PendingLinkEvent| {
        let tx = tx.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let _ = tx.send(event.path);
        }
    });

    let source = links.source();
    let delivered: Vec<String> = (0..6)
        .map(|i| source.deliver(format!("/r/{}", i)).unwrap().path)
        .collect();

    let mut seen = Vec::new();
    for _ in 0..delivered.len() {
        seen.push(rx.recv().await.unwrap());
    }
    assert_eq!(seen, delivered);
}

#[tokio::test]
async fn test_unsubscribe_lets_in_flight_finish_and_stops_dispatch() {
    let links = LinkSubscription::new(&no_dedup());
    let (started_tx, mut started_rx) = mpsc::unbounded_channel();
    let (done_tx, mut done_rx) = mpsc::unbounded_channel();

    let subscription = links.subscribe(move |event: PendingLinkEvent| {
        let started_tx = started_tx.clone();
        let done_tx = done_tx.clone();
        async move {
            let _ = started_tx.send(event.seq);
            tokio::time::sleep(Duration::from_millis(30)).await;
            let _ = done_tx.send(event.seq);
        }
    });

    let source = links.source();
    let first = source.deliver("/one").unwrap();
    assert_eq!(started_rx.recv().await, Some(first.seq));

    // Queued behind the in-flight handler, then cancelled
    source.deliver("/two");
    subscription.unsubscribe();
    subscription.unsubscribe();
    subscription.shutdown().await;

    assert_eq!(done_rx.recv().await, Some(first.seq));
    assert_eq!(done_rx.recv().await, None);
    assert_eq!(started_rx.recv().await, None);
}

#[tokio::test]
async fn test_subscribers_are_independent() {
    let links = LinkSubscription::new(&no_dedup());
    let (a_tx, mut a_rx) = mpsc::unbounded_channel();
    let (b_tx, mut b_rx) = mpsc::unbounded_channel();

    let a = links.subscribe(move |event: PendingLinkEvent| {
        let a_tx = a_tx.clone();
        async move {
            let _ = a_tx.send(event.path);
        }
    });
    let _b = links.subscribe(move |event: PendingLinkEvent| {
        let b_tx = b_tx.clone();
        async move {
            let _ = b_tx.send(event.path);
        }
    });
    assert_eq!(links.subscriber_count(), 2);

    links.source().deliver("/shared");
    assert_eq!(a_rx.recv().await.as_deref(), Some("/shared"));
    assert_eq!(b_rx.recv().await.as_deref(), Some("/shared"));

    a.shutdown().await;
    links.source().deliver("/after");
    assert_eq!(b_rx.recv().await.as_deref(), Some("/after"));
    assert_eq!(a_rx.recv().await, None);
}

#[tokio::test]
async fn test_dropping_subscription_unsubscribes() {
    let links = LinkSubscription::new(&no_dedup());
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    {
        let _subscription = links.subscribe(move |event: PendingLinkEvent| {
            let tx = tx.clone();
            async move {
                let _ = tx.send(event.path);
            }
        });
    }
    assert_eq!(rx.recv().await, None);
}

#[tokio::test]
async fn test_links_drive_store_latest_wins() {
    let config = LinkingConfig::from_toml_str(
        r#"
        [subscription]
        dedup_window_ms = 0

        [[routes]]
        name = "report"
        template = "/r/:id"
        params = { id = "number" }
        "#,
    )
    .unwrap();

    let store = Arc::new(Mutex::new(config.build_store().unwrap()));
    let links = LinkSubscription::new(&config.subscription);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let _subscription = {
        let store = Arc::clone(&store);
        let arrivals = links.clone();
        links.subscribe(move |event: PendingLinkEvent| {
            let store = Arc::clone(&store);
            let latest = arrivals.latest_seq();
            let tx = tx.clone();
            async move {
                let outcome = store.lock().await.handle_link(&event, latest);
                let _ = tx.send(outcome);
            }
        })
    };

    // Both links are delivered before the handler sees the first one
    let source = links.source();
    source.deliver("/r/1");
    source.deliver("/r/2");

    assert_eq!(rx.recv().await, Some(LinkOutcome::Superseded { by: 2 }));
    assert_eq!(rx.recv().await, Some(LinkOutcome::Committed { revision: 1 }));
    assert_eq!(store.lock().await.canonical_path().unwrap(), "/r/2");

    // Unmatched link: tree kept, revision advances
    source.deliver("/nowhere");
    assert_eq!(rx.recv().await, Some(LinkOutcome::Committed { revision: 2 }));
    assert_eq!(store.lock().await.canonical_path().unwrap(), "/r/2");
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_launch_link_is_dropped() {
    let links = LinkSubscription::new(&SubscriptionConfig::default());
    let source = links.source();

    // Initial-launch URL and the OS callback for the same link
    let first = source.deliver("/r/1").unwrap();
    assert!(source.deliver("/r/1").is_none());
    assert_eq!(links.latest_seq(), first.seq);

    tokio::time::advance(Duration::from_secs(1)).await;
    assert!(source.deliver("/r/1").is_some());
}
