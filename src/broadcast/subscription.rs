//! Subscriptions and the subscriber registry
//!
//! Unsubscribing only flags the subscriber; the registry drops flagged
//! entries in a separate cleanup pass so a running cycle never sees its
//! snapshot change underneath it.

use crate::rdf::{Quad, Term};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Payload handed to a subscriber
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChangeSet<'a> {
    /// Changed quads
    Quads(&'a [Quad]),
    /// Distinct changed subjects
    Subjects(&'a [Term]),
}

impl<'a> ChangeSet<'a> {
    pub fn len(&self) -> usize {
        match self {
            ChangeSet::Quads(quads) => quads.len(),
            ChangeSet::Subjects(subjects) => subjects.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub type Callback = Arc<dyn Fn(ChangeSet<'_>) + Send + Sync>;

/// Subscription request
#[derive(Clone)]
pub struct Subscription {
    pub callback: Callback,
    /// Deliver subjects instead of quads
    pub only_subjects: bool,
    /// Restrict to these subjects; `None` receives every change
    pub subject_filter: Option<Vec<Term>>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("only_subjects", &self.only_subjects)
            .field("subject_filter", &self.subject_filter)
            .finish()
    }
}

impl Subscription {
    /// Bulk subscription receiving every change
    pub fn new(callback: impl Fn(ChangeSet<'_>) + Send + Sync + 'static) -> Self {
        Self {
            callback: Arc::new(callback),
            only_subjects: false,
            subject_filter: None,
        }
    }

    /// Subscription for changes to the given subjects only
    pub fn for_subjects(
        subjects: Vec<Term>,
        callback: impl Fn(ChangeSet<'_>) + Send + Sync + 'static,
    ) -> Self {
        Self {
            subject_filter: Some(subjects),
            ..Self::new(callback)
        }
    }

    pub fn only_subjects(mut self) -> Self {
        self.only_subjects = true;
        self
    }
}

/// Registered subscriber
pub struct Subscriber {
    pub id: u64,
    pub callback: Callback,
    pub only_subjects: bool,
    pending_deletion: Arc<AtomicBool>,
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", &self.id)
            .field("only_subjects", &self.only_subjects)
            .field("pending_deletion", &self.is_pending_deletion())
            .finish()
    }
}

impl Subscriber {
    pub fn is_pending_deletion(&self) -> bool {
        self.pending_deletion.load(Ordering::Acquire)
    }

    pub fn notify(&self, changes: ChangeSet<'_>) {
        (self.callback)(changes)
    }
}

/// Returned by `subscribe`; cancels the subscription
#[derive(Debug, Clone)]
pub struct SubscriptionHandle {
    id: u64,
    pending_deletion: Arc<AtomicBool>,
}

impl SubscriptionHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Stop notifications; the slot is reclaimed by the next cleanup
    pub fn unsubscribe(&self) {
        self.pending_deletion.store(true, Ordering::Release);
    }

    pub fn is_active(&self) -> bool {
        !self.pending_deletion.load(Ordering::Acquire)
    }
}

/// Bulk subscribers plus subject → subscribers map
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    bulk: Vec<Arc<Subscriber>>,
    by_subject: FxHashMap<Term, Vec<Arc<Subscriber>>>,
    next_id: u64,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, subscription: Subscription) -> SubscriptionHandle {
        let id = self.next_id;
        self.next_id += 1;
        let pending_deletion = Arc::new(AtomicBool::new(false));
        let subscriber = Arc::new(Subscriber {
            id,
            callback: subscription.callback,
            only_subjects: subscription.only_subjects,
            pending_deletion: Arc::clone(&pending_deletion),
        });

        match subscription.subject_filter {
            None => self.bulk.push(subscriber),
            Some(subjects) => {
                for subject in subjects {
                    let list = self.by_subject.entry(subject).or_default();
                    if !list.iter().any(|s| s.id == id) {
                        list.push(Arc::clone(&subscriber));
                    }
                }
            }
        }
        SubscriptionHandle {
            id,
            pending_deletion,
        }
    }

    pub fn bulk(&self) -> &[Arc<Subscriber>] {
        &self.bulk
    }

    pub fn for_subject(&self, subject: &Term) -> Option<&[Arc<Subscriber>]> {
        self.by_subject.get(subject).map(Vec::as_slice)
    }

    pub fn has_subject_subscribers(&self) -> bool {
        !self.by_subject.is_empty()
    }

    /// Whether any subscriber is waiting to be dropped
    pub fn has_pending_deletions(&self) -> bool {
        self.bulk
            .iter()
            .chain(self.by_subject.values().flatten())
            .any(|s| s.is_pending_deletion())
    }

    /// Drop cancelled subscribers, returning how many slots were freed
    pub fn cleanup(&mut self) -> usize {
        let before = self.slots();
        self.bulk.retain(|s| !s.is_pending_deletion());
        self.by_subject.retain(|_, list| {
            list.retain(|s| !s.is_pending_deletion());
            !list.is_empty()
        });
        let removed = before - self.slots();
        if removed > 0 {
            debug!(removed, remaining = self.slots(), "removed cancelled subscribers");
        }
        removed
    }

    /// Registered slots: one per bulk subscriber and per (subject, subscriber)
    pub fn slots(&self) -> usize {
        self.bulk.len() + self.by_subject.values().map(Vec::len).sum::<usize>()
    }
}
