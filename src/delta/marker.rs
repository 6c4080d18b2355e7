//! Operation markers carried in the graph position of delta quads
//!
//! A marker is an IRI under `http://purl.org/link-lib/` whose last path
//! segment names the operation. An optional `graph` query parameter holds
//! the percent-encoded IRI of the graph the operation targets, e.g.
//! `http://purl.org/link-lib/replace?graph=http%3A%2F%2Fexample.org%2Fg`.

use crate::rdf::{NamedNode, Term};
use oxiri::Iri;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const MARKER_SCHEME: &str = "http";
const MARKER_AUTHORITY: &str = "purl.org";
const MARKER_PATH: &str = "/link-lib/";

/// Delta errors
#[derive(Error, Debug, PartialEq)]
pub enum DeltaError {
    /// The graph term is not an operation marker
    #[error("Not an operation marker: {0}")]
    NotAMarker(String),

    /// Marker with an operation this store does not know
    #[error("Unknown delta operation: {0}")]
    UnknownOperation(String),

    /// The graph override does not decode to an IRI
    #[error("Invalid graph override in marker {marker}: {reason}")]
    InvalidGraph { marker: String, reason: String },
}

pub type DeltaResult<T> = Result<T, DeltaError>;

/// Operation requested by a delta quad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaOperation {
    /// Insert `(s, p, o)`
    Add,
    /// Replace every value of `(s, p)` with `o`
    Replace,
    /// Remove every value of `(s, p)`
    Remove,
    /// Remove everything about `s`
    Purge,
    /// Remove exactly `(s, p, o)`
    Slice,
}

impl DeltaOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeltaOperation::Add => "add",
            DeltaOperation::Replace => "replace",
            DeltaOperation::Remove => "remove",
            DeltaOperation::Purge => "purge",
            DeltaOperation::Slice => "slice",
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "add" => Some(DeltaOperation::Add),
            "replace" => Some(DeltaOperation::Replace),
            "remove" => Some(DeltaOperation::Remove),
            "purge" => Some(DeltaOperation::Purge),
            "slice" => Some(DeltaOperation::Slice),
            _ => None,
        }
    }
}

impl fmt::Display for DeltaOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parsed operation marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaMarker {
    pub operation: DeltaOperation,
    /// Target graph override
    pub graph: Option<Term>,
}

impl DeltaMarker {
    pub fn new(operation: DeltaOperation) -> Self {
        Self {
            operation,
            graph: None,
        }
    }

    pub fn with_graph(mut self, graph: Term) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Parse a marker IRI
    pub fn parse(marker: &str) -> DeltaResult<Self> {
        let not_a_marker = || DeltaError::NotAMarker(marker.to_string());
        let iri = Iri::parse(marker).map_err(|_| not_a_marker())?;
        if iri.scheme() != MARKER_SCHEME || iri.authority() != Some(MARKER_AUTHORITY) {
            return Err(not_a_marker());
        }
        let segment = iri.path().strip_prefix(MARKER_PATH).ok_or_else(not_a_marker)?;
        let operation = DeltaOperation::from_segment(segment)
            .ok_or_else(|| DeltaError::UnknownOperation(segment.to_string()))?;

        let mut parsed = Self::new(operation);
        if let Some(query) = iri.query() {
            if let Some(encoded) = query
                .split('&')
                .find_map(|pair| pair.strip_prefix("graph="))
            {
                parsed.graph = Some(Self::decode_graph(marker, encoded)?);
            }
        }
        Ok(parsed)
    }

    fn decode_graph(marker: &str, encoded: &str) -> DeltaResult<Term> {
        let invalid = |reason: String| DeltaError::InvalidGraph {
            marker: marker.to_string(),
            reason,
        };
        let decoded = percent_decode_str(encoded)
            .decode_utf8()
            .map_err(|e| invalid(e.to_string()))?;
        let node = NamedNode::new(&decoded).map_err(|e| invalid(e.to_string()))?;
        Ok(Term::from(node))
    }

    /// Marker IRI for this operation, with the graph override encoded
    pub fn to_iri(&self) -> String {
        let base = format!(
            "{}://{}{}{}",
            MARKER_SCHEME,
            MARKER_AUTHORITY,
            MARKER_PATH,
            self.operation.as_str()
        );
        match &self.graph {
            Some(graph) => format!(
                "{}?graph={}",
                base,
                percent_encoding::utf8_percent_encode(
                    graph.value(),
                    percent_encoding::NON_ALPHANUMERIC
                )
            ),
            None => base,
        }
    }

    pub fn to_term(&self) -> Term {
        Term::iri(self.to_iri())
    }
}

impl TryFrom<&Term> for DeltaMarker {
    type Error = DeltaError;

    fn try_from(term: &Term) -> DeltaResult<Self> {
        match term.as_iri() {
            Some(iri) => Self::parse(iri),
            None => Err(DeltaError::NotAMarker(term.to_string())),
        }
    }
}
