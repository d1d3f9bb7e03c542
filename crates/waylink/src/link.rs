// File: waylink/src/link.rs
// Purpose: Fan-out of incoming deep links to subscribers

use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::SubscriptionConfig;

/// A deep link received from the outside
///
/// `seq` is assigned on arrival and strictly increases, so two events can
/// always be ordered even when they carry the same path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingLinkEvent {
    pub seq: u64,
    pub path: String,
    pub received_at: DateTime<Utc>,
}

impl PendingLinkEvent {
    /// A newer event arrived before this one was committed
    pub fn is_superseded(&self, latest_seq: u64) -> bool {
        self.seq < latest_seq
    }
}

/// Queue feeding one subscriber's dispatch task
struct SubscriberQueue {
    tx: mpsc::UnboundedSender<PendingLinkEvent>,
    /// Events queued but not yet taken by the dispatch task
    backlog: Arc<AtomicUsize>,
}

#[derive(Default)]
struct Registry {
    /// Last delivered path, for the duplicate window
    last: Option<(String, Instant)>,
    subscribers: Vec<SubscriberQueue>,
}

struct Shared {
    registry: Mutex<Registry>,
    latest_seq: AtomicU64,
    dedup_window: Duration,
    backlog_warning: usize,
}

impl Shared {
    fn registry(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn deliver(&self, path: String) -> Option<PendingLinkEvent> {
        // Held across seq assignment and fan-out so arrival order is seq order
        let mut registry = self.registry();
        let now = Instant::now();

        if let Some((previous, at)) = registry.last.as_ref() {
            if *previous == path && now.duration_since(*at) < self.dedup_window {
                debug!(path = %path, "dropping duplicate link");
                return None;
            }
        }

        let seq = self.latest_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let event = PendingLinkEvent {
            seq,
            path: path.clone(),
            received_at: Utc::now(),
        };
        registry.last = Some((path, now));

        // Queues whose task has stopped are pruned here
        registry.subscribers.retain(|queue| {
            let backlog = queue.backlog.fetch_add(1, Ordering::SeqCst) + 1;
            if queue.tx.send(event.clone()).is_err() {
                return false;
            }
            if backlog == self.backlog_warning + 1 {
                warn!(seq, backlog, "link subscriber falling behind");
            }
            true
        });

        debug!(seq, receivers = registry.subscribers.len(), path = %event.path, "link delivered");
        Some(event)
    }
}

/// Registry of deep-link listeners
///
/// Every delivered link is queued for every active subscriber; nothing is
/// dropped for a slow one. A subscriber's handler runs one event at a time,
/// in arrival order, and a slow handler delays only its own subscriber.
///
/// # Example
///
/// ```no_run
/// use waylink::{LinkSubscription, SubscriptionConfig};
///
/// # async fn run() {
/// let links = LinkSubscription::new(&SubscriptionConfig::default());
/// let subscription = links.subscribe(|event| async move {
///     println!("{} -> {}", event.seq, event.path);
/// });
///
/// links.source().deliver("/r/42");
/// subscription.unsubscribe();
/// # }
/// ```
#[derive(Clone)]
pub struct LinkSubscription {
    shared: Arc<Shared>,
}

impl LinkSubscription {
    pub fn new(config: &SubscriptionConfig) -> Self {
        LinkSubscription {
            shared: Arc::new(Shared {
                registry: Mutex::new(Registry::default()),
                latest_seq: AtomicU64::new(0),
                dedup_window: config.dedup_window(),
                backlog_warning: config.capacity.max(1),
            }),
        }
    }

    /// Handle for the external mechanism that produces links
    pub fn source(&self) -> LinkSource {
        LinkSource {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Sequence number of the newest delivered link (0 before any)
    pub fn latest_seq(&self) -> u64 {
        self.shared.latest_seq.load(Ordering::SeqCst)
    }

    /// Number of subscribers currently receiving links
    pub fn subscriber_count(&self) -> usize {
        self.shared
            .registry()
            .subscribers
            .iter()
            .filter(|queue| !queue.tx.is_closed())
            .count()
    }

    /// Registers `handler` for every link delivered from now on
    ///
    /// Must be called from within a tokio runtime. The handler is awaited to
    /// completion before the next event is dispatched to it.
    pub fn subscribe<F, Fut>(&self, mut handler: F) -> Subscription
    where
        F: FnMut(PendingLinkEvent) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let backlog = Arc::new(AtomicUsize::new(0));
        self.shared.registry().subscribers.push(SubscriberQueue {
            tx,
            backlog: Arc::clone(&backlog),
        });
        let (cancel, mut cancelled) = watch::channel(false);

        let task = tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    biased;
                    _ = cancelled.changed() => break,
                    received = rx.recv() => match received {
                        Some(event) => event,
                        None => break,
                    },
                };
                backlog.fetch_sub(1, Ordering::SeqCst);

                if *cancelled.borrow() {
                    break;
                }
                handler(event).await;
            }
            debug!(
                undelivered = backlog.load(Ordering::SeqCst),
                "link subscriber stopped"
            );
        });

        Subscription {
            cancel,
            task: Some(task),
        }
    }
}

/// Producer side of a [`LinkSubscription`]
#[derive(Clone)]
pub struct LinkSource {
    shared: Arc<Shared>,
}

impl LinkSource {
    /// Delivers a link to every active subscriber
    ///
    /// Returns `None` when the same path was delivered within the duplicate
    /// window and is dropped.
    pub fn deliver(&self, path: impl Into<String>) -> Option<PendingLinkEvent> {
        self.shared.deliver(path.into())
    }
}

/// A live registration returned by [`LinkSubscription::subscribe`]
///
/// Dropping it unsubscribes.
pub struct Subscription {
    cancel: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Stops delivery to this subscriber
    ///
    /// Idempotent. An event already being handled runs to completion; no
    /// further event is dispatched.
    pub fn unsubscribe(&self) {
        self.cancel.send_replace(true);
    }

    pub fn is_active(&self) -> bool {
        !*self.cancel.borrow() && self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Unsubscribes and waits for an in-flight handler to finish
    pub async fn shutdown(mut self) {
        self.unsubscribe();
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                warn!("link subscriber task failed: {}", err);
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
