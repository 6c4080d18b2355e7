//! Typed data-object builder
//!
//! Converts a nested, strongly typed value tree into quads. Nested objects
//! become local nodes, lists become repeated field values and sequences
//! become `rdf:Seq` nodes with ordinal members.

use super::namespace::{rdf, xsd};
use super::types::{Literal, NamedNode, Quad, Term};
use indexmap::IndexMap;
use serde_json::Value as Json;
use thiserror::Error;

/// Data-object conversion errors
#[derive(Error, Debug, PartialEq)]
pub enum DataError {
    /// A null value has no quad representation
    #[error("Null value for field {0}")]
    NullValue(String),

    /// Lists directly inside lists are ambiguous
    #[error("Nested list in field {0}")]
    NestedList(String),

    /// The root of a data object must be a map
    #[error("Data object root must be an object, got {0}")]
    RootNotObject(&'static str),

    /// Field names must be absolute IRIs
    #[error("Invalid field name: {0}")]
    InvalidFieldName(String),

    /// `@id` must be a string
    #[error("Invalid identifier: {0}")]
    InvalidId(String),
}

pub type DataResult<T> = Result<T, DataError>;

/// A value in a data object
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Literal value
    Scalar(Literal),
    /// Link to another resource
    Reference(Term),
    /// Embedded resource
    Nested(DataObject),
    /// Multiple values for the same field
    List(Vec<Value>),
    /// Ordered sequence, stored as an `rdf:Seq`
    Seq(Vec<Value>),
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Scalar(Literal::new_simple_literal(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Scalar(Literal::new_typed_literal(
            value.to_string(),
            NamedNode::new_unchecked(xsd::INTEGER),
        ))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Scalar(Literal::new_typed_literal(
            value.to_string(),
            NamedNode::new_unchecked(xsd::BOOLEAN),
        ))
    }
}

impl From<Term> for Value {
    fn from(term: Term) -> Self {
        match term {
            Term::Literal(l) => Value::Scalar(l),
            other => Value::Reference(other),
        }
    }
}

impl From<DataObject> for Value {
    fn from(object: DataObject) -> Self {
        Value::Nested(object)
    }
}

/// A resource described as a map of fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataObject {
    /// Explicit identifier; a fresh local node is used when absent
    pub id: Option<Term>,
    pub fields: IndexMap<NamedNode, Value>,
}

impl DataObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: Term) -> Self {
        self.id = Some(id);
        self
    }

    pub fn field(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields
            .insert(NamedNode::new_unchecked(field), value.into());
        self
    }

    /// Walk the object and produce its quads in `graph`.
    ///
    /// Returns the subject used for the root together with the quads.
    pub fn to_quads(&self, graph: &Term) -> DataResult<(Term, Vec<Quad>)> {
        let mut quads = Vec::new();
        let subject = self.walk_object(graph, &mut quads)?;
        Ok((subject, quads))
    }

    fn walk_object(&self, graph: &Term, out: &mut Vec<Quad>) -> DataResult<Term> {
        let subject = self.id.clone().unwrap_or_else(Term::fresh_local);
        for (field, value) in &self.fields {
            let predicate = Term::Named(field.clone());
            walk_value(&subject, &predicate, value, graph, out, false)?;
        }
        Ok(subject)
    }
}

fn walk_value(
    subject: &Term,
    predicate: &Term,
    value: &Value,
    graph: &Term,
    out: &mut Vec<Quad>,
    in_list: bool,
) -> DataResult<()> {
    let object = match value {
        Value::Scalar(lit) => Term::Literal(lit.clone()),
        Value::Reference(term) => term.clone(),
        Value::Nested(object) => object.walk_object(graph, out)?,
        Value::List(items) => {
            if in_list {
                return Err(DataError::NestedList(predicate.value().to_string()));
            }
            for item in items {
                walk_value(subject, predicate, item, graph, out, true)?;
            }
            return Ok(());
        }
        Value::Seq(items) => {
            let seq = Term::fresh_local();
            out.push(Quad::new(
                seq.clone(),
                Term::iri(rdf::TYPE),
                Term::iri(rdf::SEQ),
                graph.clone(),
            ));
            for (i, item) in items.iter().enumerate() {
                walk_value(&seq, &Term::iri(rdf::ordinal(i)), item, graph, out, true)?;
            }
            seq
        }
    };
    out.push(Quad::new(
        subject.clone(),
        predicate.clone(),
        object,
        graph.clone(),
    ));
    Ok(())
}

fn json_kind(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

fn parse_id(value: &Json) -> DataResult<Term> {
    let id = value
        .as_str()
        .ok_or_else(|| DataError::InvalidId(json_kind(value).to_string()))?;
    match id.strip_prefix("_:") {
        Some(local) => Term::local(local).map_err(|_| DataError::InvalidId(id.to_string())),
        None => NamedNode::new(id)
            .map(Term::Named)
            .map_err(|_| DataError::InvalidId(id.to_string())),
    }
}

fn json_to_value(field: &str, json: &Json) -> DataResult<Value> {
    match json {
        Json::Null => Err(DataError::NullValue(field.to_string())),
        Json::Bool(b) => Ok(Value::from(*b)),
        Json::Number(n) => Ok(match n.as_i64() {
            Some(i) => Value::from(i),
            None => Value::Scalar(Literal::new_typed_literal(
                n.to_string(),
                NamedNode::new_unchecked(xsd::DOUBLE),
            )),
        }),
        Json::String(s) => Ok(Value::from(s.as_str())),
        Json::Array(items) => items
            .iter()
            .map(|item| match item {
                Json::Array(_) => Err(DataError::NestedList(field.to_string())),
                other => json_to_value(field, other),
            })
            .collect::<DataResult<Vec<_>>>()
            .map(Value::List),
        Json::Object(map) => {
            if let Some(list) = map.get("@list") {
                return match json_to_value(field, list)? {
                    Value::List(items) => Ok(Value::Seq(items)),
                    single => Ok(Value::Seq(vec![single])),
                };
            }
            if let Some(value) = map.get("@value") {
                let lexical = match value {
                    Json::String(s) => s.clone(),
                    other => other.to_string(),
                };
                let literal = if let Some(lang) = map.get("@language").and_then(Json::as_str) {
                    Literal::new_language_tagged_literal(lexical, lang)
                        .map_err(|_| DataError::InvalidId(lang.to_string()))?
                } else if let Some(dt) = map.get("@type").and_then(Json::as_str) {
                    let datatype =
                        NamedNode::new(dt).map_err(|_| DataError::InvalidId(dt.to_string()))?;
                    Literal::new_typed_literal(lexical, datatype)
                } else {
                    Literal::new_simple_literal(lexical)
                };
                return Ok(Value::Scalar(literal));
            }
            if map.len() == 1 {
                if let Some(id) = map.get("@id") {
                    return parse_id(id).map(Value::Reference);
                }
            }
            DataObject::try_from(json).map(Value::Nested)
        }
    }
}

impl TryFrom<&Json> for DataObject {
    type Error = DataError;

    fn try_from(json: &Json) -> DataResult<Self> {
        let map = match json {
            Json::Object(map) => map,
            other => return Err(DataError::RootNotObject(json_kind(other))),
        };
        let mut object = DataObject::new();
        for (key, value) in map {
            if key == "@id" {
                object.id = Some(parse_id(value)?);
                continue;
            }
            let field =
                NamedNode::new(key).map_err(|_| DataError::InvalidFieldName(key.clone()))?;
            object.fields.insert(field, json_to_value(key, value)?);
        }
        Ok(object)
    }
}
