//! A single broadcast cycle
//!
//! The cycle snapshots the changed quads and the subscribers interested in
//! them, then hands out notifications one unit at a time: first one call
//! per bulk subscriber, then one call per (changed subject, subscriber).
//! `run_slice` processes units until the slice deadline gets close, so a
//! large fan-out is spread over several slices.

use super::subscription::{ChangeSet, Subscriber, SubscriberRegistry};
use crate::rdf::{Quad, Term};
use indexmap::IndexMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::trace;

/// Cycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Running,
}

#[derive(Debug)]
pub struct BroadcastCycle {
    quads: Vec<Quad>,
    /// Distinct subjects in order of first change
    subjects: Vec<Term>,
    quads_by_subject: IndexMap<Term, Vec<Quad>>,
    bulk: Vec<Arc<Subscriber>>,
    subject_subscribers: Vec<(Term, Vec<Arc<Subscriber>>)>,
    bulk_cursor: usize,
    subject_cursor: usize,
    subscriber_cursor: usize,
    state: CycleState,
    notified: usize,
}

impl BroadcastCycle {
    /// Snapshot `quads` and the subscribers of `registry` that care
    pub fn new(quads: Vec<Quad>, registry: &SubscriberRegistry) -> Self {
        let mut quads_by_subject: IndexMap<Term, Vec<Quad>> = IndexMap::new();
        for quad in &quads {
            quads_by_subject
                .entry(quad.subject.clone())
                .or_default()
                .push(quad.clone());
        }
        let subjects: Vec<Term> = quads_by_subject.keys().cloned().collect();

        let subject_subscribers = if registry.has_subject_subscribers() {
            subjects
                .iter()
                .filter_map(|subject| {
                    registry
                        .for_subject(subject)
                        .map(|subs| (subject.clone(), subs.to_vec()))
                })
                .collect()
        } else {
            Vec::new()
        };

        Self {
            quads,
            subjects,
            quads_by_subject,
            bulk: registry.bulk().to_vec(),
            subject_subscribers,
            bulk_cursor: 0,
            subject_cursor: 0,
            subscriber_cursor: 0,
            state: CycleState::Idle,
            notified: 0,
        }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    /// Subscriber calls made so far
    pub fn notified(&self) -> usize {
        self.notified
    }

    pub fn quads(&self) -> &[Quad] {
        &self.quads
    }

    pub fn done(&self) -> bool {
        self.quads.is_empty()
            || (self.bulk_cursor >= self.bulk.len()
                && (self.subject_subscribers.is_empty()
                    || self.subject_cursor >= self.subject_subscribers.len()))
    }

    /// Process units until done or the deadline is within `yield_threshold`.
    ///
    /// At least one unit runs per call. Returns whether the cycle finished.
    pub fn run_slice(&mut self, deadline: Instant, yield_threshold: Duration) -> bool {
        self.state = CycleState::Running;
        let mut ran = false;
        while !self.done() {
            if ran && deadline.saturating_duration_since(Instant::now()) < yield_threshold {
                trace!(notified = self.notified, "broadcast slice yielding");
                return false;
            }
            ran |= self.step();
        }
        self.state = CycleState::Idle;
        true
    }

    /// Run every remaining unit
    pub fn run_to_completion(&mut self) {
        self.state = CycleState::Running;
        while !self.done() {
            self.step();
        }
        self.state = CycleState::Idle;
    }

    /// Advance one unit; `true` if a subscriber was called
    fn step(&mut self) -> bool {
        if self.bulk_cursor < self.bulk.len() {
            let subscriber = Arc::clone(&self.bulk[self.bulk_cursor]);
            self.bulk_cursor += 1;
            if subscriber.is_pending_deletion() {
                return false;
            }
            if subscriber.only_subjects {
                subscriber.notify(ChangeSet::Subjects(&self.subjects));
            } else {
                subscriber.notify(ChangeSet::Quads(&self.quads));
            }
            self.notified += 1;
            return true;
        }

        let Some((subject, subscribers)) = self.subject_subscribers.get(self.subject_cursor) else {
            return false;
        };
        let subscriber = subscribers.get(self.subscriber_cursor).map(Arc::clone);
        let subject = subject.clone();
        let last = self.subscriber_cursor + 1 >= subscribers.len();
        if last {
            self.subject_cursor += 1;
            self.subscriber_cursor = 0;
        } else {
            self.subscriber_cursor += 1;
        }

        let Some(subscriber) = subscriber else {
            return false;
        };
        if subscriber.is_pending_deletion() {
            return false;
        }
        if subscriber.only_subjects {
            subscriber.notify(ChangeSet::Subjects(std::slice::from_ref(&subject)));
        } else {
            let quads = self
                .quads_by_subject
                .get(&subject)
                .map(Vec::as_slice)
                .unwrap_or_default();
            subscriber.notify(ChangeSet::Quads(quads));
        }
        self.notified += 1;
        true
    }
}
