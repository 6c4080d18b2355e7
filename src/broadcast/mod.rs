//! Change broadcasting
//!
//! Mutations are buffered and delivered to subscribers in cycles. A cycle
//! is split into time-budgeted slices so a large fan-out does not block
//! the caller; the async driver yields to the runtime between slices.
//!
//! Changes can also be queued from other tasks through a [`ChangeSender`],
//! which lets the coalescing policy wait for a burst of changes to settle
//! before broadcasting.

pub mod cycle;
pub mod policy;
pub mod subscription;

pub use cycle::{BroadcastCycle, CycleState};
pub use policy::{BroadcastDecision, BroadcastPolicy};
pub use subscription::{
    Callback, ChangeSet, Subscriber, SubscriberRegistry, Subscription, SubscriptionHandle,
};

use crate::config::BroadcastConfig;
use crate::rdf::Quad;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, trace};

/// Queues changes into a broadcaster from another task
#[derive(Debug, Clone)]
pub struct ChangeSender {
    inner: UnboundedSender<Vec<Quad>>,
}

impl ChangeSender {
    /// Queue `quads`; `false` once the broadcaster is gone
    pub fn queue(&self, quads: Vec<Quad>) -> bool {
        quads.is_empty() || self.inner.send(quads).is_ok()
    }
}

/// Buffered, time-sliced change fan-out
#[derive(Debug)]
pub struct ChangeBroadcaster {
    config: BroadcastConfig,
    policy: BroadcastPolicy,
    registry: SubscriberRegistry,
    buffer: Vec<Quad>,
    sender: UnboundedSender<Vec<Quad>>,
    inbox: UnboundedReceiver<Vec<Quad>>,
    current: Option<BroadcastCycle>,
    last_cleanup: Instant,
    completed: u64,
}

impl Default for ChangeBroadcaster {
    fn default() -> Self {
        Self::new(BroadcastConfig::default())
    }
}

impl ChangeBroadcaster {
    pub fn new(config: BroadcastConfig) -> Self {
        let (sender, inbox) = unbounded_channel();
        Self {
            policy: BroadcastPolicy::from_config(&config),
            config,
            registry: SubscriberRegistry::new(),
            buffer: Vec::new(),
            sender,
            inbox,
            current: None,
            last_cleanup: Instant::now(),
            completed: 0,
        }
    }

    pub fn subscribe(&mut self, subscription: Subscription) -> SubscriptionHandle {
        let handle = self.registry.subscribe(subscription);
        debug!(id = handle.id(), slots = self.registry.slots(), "subscribed");
        handle
    }

    /// Sender for queueing changes from elsewhere
    pub fn sender(&self) -> ChangeSender {
        ChangeSender {
            inner: self.sender.clone(),
        }
    }

    /// Buffer changes for the next cycle
    pub fn queue(&mut self, quads: impl IntoIterator<Item = Quad>) {
        self.buffer.extend(quads);
    }

    fn drain_inbox(&mut self) {
        while let Ok(batch) = self.inbox.try_recv() {
            self.buffer.extend(batch);
        }
    }

    /// Changes waiting for a cycle
    pub fn pending(&mut self) -> usize {
        self.drain_inbox();
        self.buffer.len()
    }

    /// Whether a cycle is in progress
    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }

    /// Run one slice, starting a cycle if changes are waiting.
    ///
    /// Returns whether work remains.
    pub fn tick(&mut self) -> bool {
        self.drain_inbox();
        if self.current.is_none() {
            if self.buffer.is_empty() {
                self.maybe_cleanup();
                return false;
            }
            let quads = std::mem::take(&mut self.buffer);
            debug!(quads = quads.len(), "starting broadcast cycle");
            self.current = Some(BroadcastCycle::new(quads, &self.registry));
        }

        let deadline = Instant::now() + self.config.slice_budget();
        let finished = match self.current.as_mut() {
            Some(cycle) => cycle.run_slice(deadline, self.config.yield_threshold()),
            None => true,
        };
        if finished {
            if let Some(cycle) = self.current.take() {
                self.completed += 1;
                debug!(
                    quads = cycle.quads().len(),
                    notified = cycle.notified(),
                    "broadcast cycle complete"
                );
            }
            self.maybe_cleanup();
        }
        self.current.is_some() || !self.buffer.is_empty()
    }

    /// Run cycles synchronously until nothing is left
    pub fn flush(&mut self) {
        while self.tick() {}
    }

    /// Run cycles until nothing is left, yielding between slices
    pub async fn drive(&mut self) {
        while self.tick() {
            tokio::task::yield_now().await;
        }
    }

    /// Broadcast after letting a burst of changes settle
    pub async fn broadcast(&mut self) {
        let mut waited = Duration::ZERO;
        loop {
            let pending = self.pending();
            match self.policy.decide(pending, waited) {
                BroadcastDecision::Postpone(step) => {
                    trace!(pending, waited_ms = waited.as_millis() as u64, "postponing broadcast");
                    tokio::time::sleep(step).await;
                    waited += step;
                }
                BroadcastDecision::Broadcast => break,
            }
        }
        self.drive().await;
    }

    fn maybe_cleanup(&mut self) {
        if self.last_cleanup.elapsed() >= self.config.cleanup_interval()
            && self.registry.has_pending_deletions()
        {
            self.cleanup();
        }
    }

    /// Drop cancelled subscribers now
    pub fn cleanup(&mut self) -> usize {
        self.last_cleanup = Instant::now();
        self.registry.cleanup()
    }

    /// Cycles completed so far
    pub fn completed_cycles(&self) -> u64 {
        self.completed
    }

    pub fn registry(&self) -> &SubscriberRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::Term;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn iri(s: &str) -> Term {
        Term::iri(format!("http://example.org/{}", s))
    }

    fn quad(s: &str) -> Quad {
        Quad::triple(iri(s), iri("name"), Term::literal(s))
    }

    fn counting(subjects: Option<Vec<Term>>) -> (Arc<AtomicUsize>, Subscription) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        let mut subscription = Subscription::new(move |_| {
            inner.fetch_add(1, Ordering::SeqCst);
        });
        subscription.subject_filter = subjects;
        (count, subscription)
    }

    #[test]
    fn test_subject_subscriber_ignores_other_subjects() {
        let mut broadcaster = ChangeBroadcaster::default();
        let (count, subscription) = counting(Some(vec![iri("x")]));
        broadcaster.subscribe(subscription);

        broadcaster.queue(vec![quad("y")]);
        broadcaster.flush();
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(broadcaster.completed_cycles(), 1);

        broadcaster.queue(vec![quad("x")]);
        broadcaster.flush();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_one_notification_per_cycle() {
        let mut broadcaster = ChangeBroadcaster::default();
        let (count, subscription) = counting(None);
        broadcaster.subscribe(subscription);

        broadcaster.queue(vec![quad("a"), quad("b"), quad("c")]);
        broadcaster.flush();
        assert_eq!(count.load(Ordering::SeqCst), 1);

        broadcaster.flush();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!broadcaster.tick());
    }

    #[test]
    fn test_zero_budget_runs_one_unit_per_tick() {
        let config = BroadcastConfig {
            slice_budget_ms: 0,
            ..Default::default()
        };
        let mut broadcaster = ChangeBroadcaster::new(config);
        let (count, subscription) = counting(None);
        for _ in 0..3 {
            broadcaster.subscribe(subscription.clone());
        }

        broadcaster.queue(vec![quad("a")]);
        assert!(broadcaster.tick());
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(broadcaster.is_running());
        assert!(broadcaster.tick());
        assert!(!broadcaster.tick());
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(!broadcaster.is_running());
    }

    #[test]
    fn test_changes_during_cycle_go_to_next_cycle() {
        let config = BroadcastConfig {
            slice_budget_ms: 0,
            ..Default::default()
        };
        let mut broadcaster = ChangeBroadcaster::new(config);
        let batches = Arc::new(Mutex::new(Vec::new()));
        for _ in 0..2 {
            let sink = Arc::clone(&batches);
            broadcaster.subscribe(Subscription::new(move |changes| {
                sink.lock().unwrap().push(changes.len());
            }));
        }

        broadcaster.queue(vec![quad("a")]);
        assert!(broadcaster.tick());
        broadcaster.queue(vec![quad("b"), quad("c")]);
        broadcaster.flush();

        assert_eq!(*batches.lock().unwrap(), vec![1, 1, 2, 2]);
        assert_eq!(broadcaster.completed_cycles(), 2);
    }

    #[test]
    fn test_cleanup_is_debounced() {
        let mut broadcaster = ChangeBroadcaster::default();
        let (_, subscription) = counting(Some(vec![iri("x")]));
        let handle = broadcaster.subscribe(subscription);
        handle.unsubscribe();

        broadcaster.queue(vec![quad("x")]);
        broadcaster.flush();
        // interval has not elapsed yet
        assert_eq!(broadcaster.registry().slots(), 1);
        assert_eq!(broadcaster.cleanup(), 1);
        assert_eq!(broadcaster.registry().slots(), 0);
    }

    #[tokio::test]
    async fn test_sender_changes_coalesce_into_one_cycle() {
        let config = BroadcastConfig {
            postpone_threshold: 0,
            postpone_step_ms: 1,
            max_delay_ms: 3,
            ..Default::default()
        };
        let mut broadcaster = ChangeBroadcaster::new(config);
        let sizes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&sizes);
        broadcaster.subscribe(Subscription::new(move |changes| {
            sink.lock().unwrap().push(changes.len());
        }));

        let sender = broadcaster.sender();
        let producer = tokio::spawn(async move {
            for name in ["a", "b", "c"] {
                sender.queue(vec![quad(name)]);
            }
        });
        producer.await.unwrap();

        broadcaster.broadcast().await;
        assert_eq!(*sizes.lock().unwrap(), vec![3]);
        assert_eq!(broadcaster.pending(), 0);
    }
}
