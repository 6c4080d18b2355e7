//! Handler resolution
//!
//! Handlers are registered for (type, property, topology) keys. Resolving
//! picks the handler registered for the most specific type in the
//! expansion of the requested types, falling back to broader types, the
//! default topology and finally a caller-supplied default type.
//!
//! Lookups are memoized per resolver in an LRU cache that is cleared on
//! every registration.

pub mod registry;

pub use registry::Registrations;

use crate::config::ResolverConfig;
use crate::rdf::namespace::{ld, rdfs};
use crate::rdf::Term;
use crate::schema::Schema;
use lru::LruCache;
use std::num::NonZeroUsize;
use thiserror::Error;
use tracing::{debug, trace};

/// Resolver errors
#[derive(Error, Debug, PartialEq)]
pub enum ResolverError {
    /// A registration component list was empty
    #[error("Cannot register a handler without any {0}")]
    EmptyRegistration(&'static str),

    /// Literals cannot be registration keys
    #[error("Invalid {component} in registration: {term}")]
    InvalidTerm { component: &'static str, term: String },
}

pub type ResolverResult<T> = Result<T, ResolverError>;

/// (expanded types, properties, topology, default type)
type CacheKey = (Vec<Term>, Vec<Term>, Term, Option<Term>);

/// Registry of handlers with memoized, hierarchy-aware lookup
pub struct HandlerResolver<H> {
    registrations: Registrations<H>,
    cache: LruCache<CacheKey, Option<H>>,
}

impl<H> std::fmt::Debug for HandlerResolver<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerResolver")
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl<H: Clone> Default for HandlerResolver<H> {
    fn default() -> Self {
        Self::new(&ResolverConfig::default())
    }
}

impl<H: Clone> HandlerResolver<H> {
    pub fn new(config: &ResolverConfig) -> Self {
        let capacity = NonZeroUsize::new(config.cache_capacity).unwrap_or(NonZeroUsize::MIN);
        let mut registrations = Registrations::default();
        registrations.reserve(Term::iri(ld::TYPE_RENDERER));
        Self {
            registrations,
            cache: LruCache::new(capacity),
        }
    }

    fn check(component: &'static str, terms: &[Term]) -> ResolverResult<()> {
        if terms.is_empty() {
            return Err(ResolverError::EmptyRegistration(component));
        }
        if let Some(literal) = terms.iter().find(|t| t.is_literal()) {
            return Err(ResolverError::InvalidTerm {
                component,
                term: literal.to_string(),
            });
        }
        Ok(())
    }

    /// Register `handler` for every combination of the given lists
    pub fn register(
        &mut self,
        handler: H,
        types: &[Term],
        properties: &[Term],
        topologies: &[Term],
    ) -> ResolverResult<()> {
        Self::check("types", types)?;
        Self::check("properties", properties)?;
        Self::check("topologies", topologies)?;

        for property in properties {
            for ty in types {
                for topology in topologies {
                    self.registrations.insert(
                        property.clone(),
                        ty.clone(),
                        topology.clone(),
                        handler.clone(),
                    );
                }
            }
        }
        self.cache.clear();
        debug!(
            count = types.len() * properties.len() * topologies.len(),
            total = self.registrations.len(),
            "registered handler"
        );
        Ok(())
    }

    /// Register a whole-resource handler at the default topology
    pub fn register_renderer(&mut self, handler: H, types: &[Term]) -> ResolverResult<()> {
        self.register(
            handler,
            types,
            &[Term::iri(ld::TYPE_RENDERER)],
            &[Term::iri(ld::DEFAULT_TOPOLOGY)],
        )
    }

    /// Most specific handler for `types` under `properties` at `topology`
    pub fn resolve(
        &mut self,
        schema: &mut Schema,
        types: &[Term],
        properties: &[Term],
        topology: &Term,
        default_type: Option<&Term>,
    ) -> Option<H> {
        let expanded = schema.expand(types);
        let key = (
            expanded,
            properties.to_vec(),
            topology.clone(),
            default_type.cloned(),
        );
        if let Some(hit) = self.cache.get(&key) {
            trace!(topology = %topology, "resolver cache hit");
            return hit.clone();
        }

        let found = self.lookup(schema, &key.0, properties, topology, default_type);
        self.cache.put(key, found.clone());
        found
    }

    fn lookup(
        &self,
        schema: &Schema,
        expanded: &[Term],
        properties: &[Term],
        topology: &Term,
        default_type: Option<&Term>,
    ) -> Option<H> {
        for property in properties {
            for ty in expanded {
                if let Some(handler) = self.registrations.lookup(property, ty, topology) {
                    return Some(handler.clone());
                }
            }
        }

        let registered = self.registrations.types_at(properties, topology);
        if registered.is_empty() {
            if topology.is_iri(ld::DEFAULT_TOPOLOGY) {
                return None;
            }
            debug!(topology = %topology, "no handlers at topology, using default");
            return self.lookup(
                schema,
                expanded,
                properties,
                &Term::iri(ld::DEFAULT_TOPOLOGY),
                default_type,
            );
        }

        // Every registered candidate sits under one of `properties` at this
        // topology, so the exact pass above already tried it. This step only
        // settles which candidate counts as best; it finds nothing new.
        let base = Term::iri(rdfs::RESOURCE);
        let mut candidates = vec![base.clone()];
        candidates.extend(registered.into_iter().filter(|t| *t != base));
        let sorted = schema.sort(expanded);

        for property in properties {
            let best = sorted
                .iter()
                .find(|t| candidates.contains(t))
                .or_else(|| candidates.iter().skip(1).find(|c| expanded.contains(c)));
            if let Some(best) = best {
                if let Some(handler) = self.registrations.lookup(property, best, topology) {
                    return Some(handler.clone());
                }
            }
        }

        let default_type = default_type?;
        properties
            .iter()
            .find_map(|p| self.registrations.lookup(p, default_type, topology))
            .cloned()
    }

    pub fn registrations(&self) -> &Registrations<H> {
        &self.registrations
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}
