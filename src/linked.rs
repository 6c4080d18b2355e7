//! Linked data store
//!
//! Ties the quad store, the schema reasoner, the handler resolver and the
//! change broadcaster together:
//! - statements are run through the reasoner before they are stored, and
//!   inferred statements are written alongside them;
//! - every change to the store is buffered for subscribers;
//! - deltas from the fetch layer can be applied directly or queued and
//!   flushed in one go.

use crate::broadcast::{ChangeBroadcaster, ChangeSender, Subscription, SubscriptionHandle};
use crate::config::StoreConfig;
use crate::delta::{DeltaBuckets, DeltaReconciler, DeltaSummary};
use crate::rdf::data::DataObject;
use crate::rdf::namespace::rdf;
use crate::rdf::{Quad, Term};
use crate::resolver::HandlerResolver;
use crate::schema::Schema;
use crate::store::{RecordStatus, Store};
use crate::LinkStoreResult;
use indexmap::IndexSet;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// In-process linked data store with reasoning, handler lookup and
/// change notification
pub struct LinkedStore<H> {
    config: StoreConfig,
    store: Store,
    schema: Schema,
    resolver: HandlerResolver<H>,
    broadcaster: ChangeBroadcaster,
    reconciler: DeltaReconciler,
    /// Deltas waiting for `flush`
    queued: Vec<Quad>,
    /// Documents touched since the last `take_changed_documents`
    changed_documents: Arc<Mutex<IndexSet<String>>>,
}

impl<H> std::fmt::Debug for LinkedStore<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkedStore")
            .field("quads", &self.store.len())
            .field("schema", &self.schema)
            .field("queued", &self.queued.len())
            .finish()
    }
}

impl<H: Clone> Default for LinkedStore<H> {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl<H: Clone> LinkedStore<H> {
    pub fn new(config: StoreConfig) -> Self {
        let changed_documents = Arc::new(Mutex::new(IndexSet::new()));
        let mut store = Store::new();
        let sink = Arc::clone(&changed_documents);
        store.set_on_change(move |document| {
            if let Ok(mut changed) = sink.lock() {
                changed.insert(document.to_string());
            }
        });

        info!(
            owl = config.reasoner.owl,
            materialize = config.reasoner.materialize,
            "linked store created"
        );
        Self {
            schema: Schema::new(&config.reasoner),
            resolver: HandlerResolver::new(&config.resolver),
            broadcaster: ChangeBroadcaster::new(config.broadcast.clone()),
            reconciler: DeltaReconciler::new(),
            store,
            queued: Vec::new(),
            changed_documents,
            config,
        }
    }

    /// Reason over `quads`, then store them with their inferences.
    ///
    /// Returns the quads that were new to the store.
    pub fn add_quads(&mut self, quads: &[Quad]) -> LinkStoreResult<Vec<Quad>> {
        let inferred = self.schema.add_quads(quads)?;
        let mut added = self.store.add_all(quads);
        if self.config.reasoner.materialize {
            added.extend(self.store.add_all(&inferred));
            let lazy = self.schema.take_inferred();
            added.extend(self.store.add_all(&lazy));
        }
        debug!(given = quads.len(), added = added.len(), "added quads");
        self.broadcaster.queue(added.iter().cloned());
        Ok(added)
    }

    /// Add one value to a field
    pub fn add_field(&mut self, id: &Term, field: &Term, value: Term) -> LinkStoreResult<bool> {
        if id.is_literal() {
            return Err(crate::store::StoreError::InvalidRecordId(id.to_string()).into());
        }
        let added = self.add_quads(&[Quad::triple(id.clone(), field.clone(), value)])?;
        Ok(!added.is_empty())
    }

    /// Store a data object, returning its subject
    pub fn add_object(&mut self, object: &DataObject) -> LinkStoreResult<Term> {
        let (subject, quads) = object.to_quads(&Term::default_graph())?;
        self.add_quads(&quads)?;
        Ok(subject)
    }

    /// Remove quads that must exist
    pub fn remove_quads(&mut self, quads: &[Quad]) -> LinkStoreResult<()> {
        let mut removed = Vec::with_capacity(quads.len());
        let mut outcome = Ok(());
        for quad in quads {
            match self.store.remove(quad) {
                Ok(()) => removed.push(quad.clone()),
                Err(e) => {
                    outcome = Err(e.into());
                    break;
                }
            }
        }
        self.broadcaster.queue(removed);
        outcome
    }

    /// What `delta` would change, without applying it
    pub fn classify_delta(&self, delta: &[Quad]) -> DeltaBuckets {
        self.reconciler.classify(&self.store, delta).0
    }

    /// Apply an operation-marked delta
    pub fn process_delta(&mut self, delta: &[Quad]) -> LinkStoreResult<DeltaSummary> {
        let (_, summary) = self.reconciler.process(&mut self.store, delta);
        self.broadcaster.queue(summary.changes().cloned());

        let inferred = self.schema.add_quads(&summary.added)?;
        if self.config.reasoner.materialize {
            let mut materialized = self.store.add_all(&inferred);
            materialized.extend(self.store.add_all(&self.schema.take_inferred()));
            self.broadcaster.queue(materialized);
        }
        Ok(summary)
    }

    /// Queue a delta for the next `flush`
    pub fn queue_delta(&mut self, delta: impl IntoIterator<Item = Quad>) {
        self.queued.extend(delta);
    }

    /// Apply every queued delta as one batch
    pub fn flush(&mut self) -> LinkStoreResult<DeltaSummary> {
        let queued = std::mem::take(&mut self.queued);
        if queued.is_empty() {
            return Ok(DeltaSummary::default());
        }
        self.process_delta(&queued)
    }

    /// Mark a resource as being fetched
    pub fn mark_receiving(&mut self, id: &Term) {
        self.store.mark_receiving(id);
    }

    pub fn status_of(&self, id: &Term) -> RecordStatus {
        self.store.status(id)
    }

    /// Documents changed since the previous call
    pub fn take_changed_documents(&self) -> Vec<String> {
        match self.changed_documents.lock() {
            Ok(mut changed) => changed.drain(..).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Register `handler` for every (type, property, topology) combination
    pub fn register(
        &mut self,
        handler: H,
        types: &[Term],
        properties: &[Term],
        topologies: &[Term],
    ) -> LinkStoreResult<()> {
        Ok(self.resolver.register(handler, types, properties, topologies)?)
    }

    pub fn register_renderer(&mut self, handler: H, types: &[Term]) -> LinkStoreResult<()> {
        Ok(self.resolver.register_renderer(handler, types)?)
    }

    /// Most specific handler for the given types
    pub fn resolve(
        &mut self,
        types: &[Term],
        properties: &[Term],
        topology: &Term,
        default_type: Option<&Term>,
    ) -> Option<H> {
        self.resolver
            .resolve(&mut self.schema, types, properties, topology, default_type)
    }

    /// Most specific handler for a stored resource
    pub fn resolve_for(
        &mut self,
        id: &Term,
        properties: &[Term],
        topology: &Term,
        default_type: Option<&Term>,
    ) -> Option<H> {
        let types = self.types_of(id);
        self.resolve(&types, properties, topology, default_type)
    }

    /// Types plus ancestors, most specific first
    pub fn expand(&mut self, types: &[Term]) -> Vec<Term> {
        self.schema.expand(types)
    }

    /// Whether the stored resource `id` is an instance of `ty`
    pub fn is_instance_of(&mut self, id: &Term, ty: &Term) -> bool {
        let asserted = self.types_of(id);
        self.schema.is_instance_of(&asserted, ty)
    }

    /// `rdf:type` values stored for `id`
    pub fn types_of(&self, id: &Term) -> Vec<Term> {
        self.store
            .get_field(id, &Term::iri(rdf::TYPE))
            .map(|value| value.into_vec())
            .unwrap_or_default()
    }

    pub fn subscribe(&mut self, subscription: Subscription) -> SubscriptionHandle {
        self.broadcaster.subscribe(subscription)
    }

    /// Sender for changes made outside this store
    pub fn change_sender(&self) -> ChangeSender {
        self.broadcaster.sender()
    }

    /// Deliver buffered changes, coalescing bursts
    pub async fn broadcast(&mut self) {
        self.broadcaster.broadcast().await;
    }

    /// Run one broadcast slice; returns whether work remains
    pub fn tick(&mut self) -> bool {
        self.broadcaster.tick()
    }

    /// Deliver all buffered changes now
    pub fn broadcast_now(&mut self) {
        self.broadcaster.flush();
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn resolver(&self) -> &HandlerResolver<H> {
        &self.resolver
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::namespace::{ld, rdfs};
    use crate::rdf::QuadPattern;
    use crate::store::RecordState;

    fn iri(s: &str) -> Term {
        Term::iri(format!("http://example.org/{}", s))
    }

    fn typed(s: &Term, class: &Term) -> Quad {
        Quad::triple(s.clone(), Term::iri(rdf::TYPE), class.clone())
    }

    #[test]
    fn test_inferences_are_materialized() {
        let mut linked: LinkedStore<&str> = LinkedStore::default();
        linked
            .add_quads(&[
                Quad::triple(iri("author"), Term::iri(rdfs::RANGE), iri("Person")),
                Quad::triple(iri("post"), iri("author"), iri("alice")),
            ])
            .unwrap();

        assert!(linked.store().contains(&typed(&iri("alice"), &iri("Person"))));
        assert!(linked.is_instance_of(&iri("alice"), &iri("Person")));
    }

    #[test]
    fn test_materialization_can_be_disabled() {
        let mut config = StoreConfig::default();
        config.reasoner.materialize = false;
        let mut linked: LinkedStore<&str> = LinkedStore::new(config);
        let added = linked
            .add_quads(&[
                Quad::triple(iri("author"), Term::iri(rdfs::RANGE), iri("Person")),
                Quad::triple(iri("post"), iri("author"), iri("alice")),
            ])
            .unwrap();

        assert_eq!(added.len(), 2);
        assert!(!linked.store().contains(&typed(&iri("alice"), &iri("Person"))));
    }

    #[test]
    fn test_resolve_for_stored_resource() {
        let mut linked = LinkedStore::default();
        linked
            .add_quads(&[
                Quad::triple(iri("Article"), Term::iri(rdfs::SUB_CLASS_OF), iri("Work")),
                typed(&iri("post"), &iri("Article")),
            ])
            .unwrap();
        linked.register_renderer("work", &[iri("Work")]).unwrap();

        let found = linked.resolve_for(
            &iri("post"),
            &[Term::iri(ld::TYPE_RENDERER)],
            &Term::iri(ld::DEFAULT_TOPOLOGY),
            None,
        );
        assert_eq!(found, Some("work"));
    }

    #[test]
    fn test_queued_deltas_apply_on_flush() {
        let mut linked: LinkedStore<&str> = LinkedStore::default();
        linked
            .add_field(&iri("bob"), &iri("name"), Term::literal("Bob"))
            .unwrap();
        linked.queue_delta(vec![Quad::new(
            iri("bob"),
            iri("name"),
            Term::literal("Robert"),
            Term::iri(ld::REPLACE),
        )]);
        assert!(linked
            .store()
            .contains(&Quad::triple(iri("bob"), iri("name"), Term::literal("Bob"))));

        let summary = linked.flush().unwrap();
        assert_eq!(summary.added.len(), 1);
        assert_eq!(summary.removed.len(), 1);
        let names = linked.store().match_quads(
            &QuadPattern::any()
                .with_subject(iri("bob"))
                .with_predicate(iri("name")),
            false,
        );
        assert_eq!(names.len(), 1);
        assert!(linked.flush().unwrap().is_empty());
    }

    #[test]
    fn test_changes_reach_subscribers() {
        let mut linked: LinkedStore<&str> = LinkedStore::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        linked.subscribe(Subscription::for_subjects(vec![iri("bob")], move |changes| {
            sink.lock().unwrap().push(changes.len());
        }));

        linked
            .add_field(&iri("bob"), &iri("name"), Term::literal("Bob"))
            .unwrap();
        linked
            .add_field(&iri("carol"), &iri("name"), Term::literal("Carol"))
            .unwrap();
        linked.broadcast_now();

        assert_eq!(*seen.lock().unwrap(), vec![1]);
    }

    #[test]
    fn test_journal_and_changed_documents() {
        let mut linked: LinkedStore<&str> = LinkedStore::default();
        let page = Term::iri("http://example.org/page#section");
        linked.mark_receiving(&page);
        assert_eq!(linked.status_of(&page).current, RecordState::Receiving);

        linked.add_field(&page, &iri("title"), Term::literal("Hi")).unwrap();
        assert_eq!(linked.status_of(&page).current, RecordState::Present);
        assert_eq!(
            linked.take_changed_documents(),
            vec!["http://example.org/page".to_string()]
        );
        assert!(linked.take_changed_documents().is_empty());
    }

    #[test]
    fn test_remove_missing_quad_fails() {
        let mut linked: LinkedStore<&str> = LinkedStore::default();
        let quad = Quad::triple(iri("a"), iri("b"), iri("c"));
        assert!(linked.remove_quads(&[quad]).is_err());
    }
}
