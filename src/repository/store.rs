//! Document store abstraction.
//!
//! Collections hold JSON documents keyed by a string id. Reads are equality
//! queries with an optional single-field ordering. Multi-document changes go
//! through [`WriteBatch`]: every precondition and guard is checked against
//! the same snapshot and either all writes land or none do.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};

/// Document fields (the storage id is kept separately)
pub type DocumentData = serde_json::Map<String, Value>;

/// A stored document decorated with its storage id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub id: String,
    pub data: DocumentData,
}

impl Document {
    pub fn new(id: impl Into<String>, data: DocumentData) -> Self {
        Self { id: id.into(), data }
    }

    /// Decode into a model, exposing the storage id as its `id` field
    pub fn decode<T: DeserializeOwned>(self) -> AppResult<T> {
        let mut data = self.data;
        data.insert("id".to_string(), Value::String(self.id));
        Ok(serde_json::from_value(Value::Object(data))?)
    }
}

/// Serialize a model into document fields. The `id` field is dropped since
/// the id lives in the key.
pub fn encode<T: Serialize>(value: &T) -> AppResult<DocumentData> {
    match serde_json::to_value(value)? {
        Value::Object(mut map) => {
            map.remove("id");
            Ok(map)
        }
        other => Err(AppError::Internal(format!(
            "document must serialize to an object, got {}",
            other
        ))),
    }
}

/// Fields of a JSON object literal, for building patches
pub fn fields(value: Value) -> DocumentData {
    match value {
        Value::Object(map) => map,
        _ => DocumentData::new(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Conjunction of field equality filters with optional ordering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<(String, Value)>,
    pub order_by: Option<OrderBy>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push((field.to_string(), value.into()));
        self
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.to_string(),
            direction,
        });
        self
    }

    /// Missing fields compare equal to `null`
    pub fn matches(&self, data: &DocumentData) -> bool {
        self.filters
            .iter()
            .all(|(field, expected)| data.get(field).unwrap_or(&Value::Null) == expected)
    }

    /// Filters as a single JSON object, for containment queries
    pub fn filter_object(&self) -> Value {
        Value::Object(self.filters.iter().cloned().collect())
    }

    /// Stable sort by the ordering field, if any
    pub fn sort(&self, documents: &mut [Document]) {
        if let Some(order) = &self.order_by {
            documents.sort_by(|a, b| {
                let left = a.data.get(&order.field).unwrap_or(&Value::Null);
                let right = b.data.get(&order.field).unwrap_or(&Value::Null);
                let ordering = compare_values(left, right);
                match order.direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
        }
    }
}

/// Total order over JSON scalars: null < bool < number < string < other
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Condition on the current state of a written document
#[derive(Debug, Clone, PartialEq)]
pub enum Precondition {
    Exists,
    Missing,
    FieldEquals(String, Value),
}

#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Insert a new document; fails if the id is taken
    Create(DocumentData),
    /// Shallow-merge fields into an existing document
    Update(DocumentData),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Write {
    pub collection: String,
    pub id: String,
    pub op: WriteOp,
    pub preconditions: Vec<Precondition>,
}

impl Write {
    pub fn create(collection: &str, id: &str, data: DocumentData) -> Self {
        Self {
            collection: collection.to_string(),
            id: id.to_string(),
            op: WriteOp::Create(data),
            preconditions: vec![Precondition::Missing],
        }
    }

    pub fn update(collection: &str, id: &str, patch: DocumentData) -> Self {
        Self {
            collection: collection.to_string(),
            id: id.to_string(),
            op: WriteOp::Update(patch),
            preconditions: vec![Precondition::Exists],
        }
    }

    pub fn expect_field(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.preconditions
            .push(Precondition::FieldEquals(field.to_string(), value.into()));
        self
    }

    /// First precondition that `current` violates
    pub fn check(&self, current: Option<&DocumentData>) -> Option<FailureReason> {
        self.preconditions.iter().find_map(|p| match (p, current) {
            (Precondition::Exists, None) => Some(FailureReason::Missing),
            (Precondition::Missing, Some(_)) => Some(FailureReason::AlreadyExists),
            (Precondition::FieldEquals(field, _), None) => {
                Some(FailureReason::FieldMismatch(field.clone()))
            }
            (Precondition::FieldEquals(field, expected), Some(data)) => {
                if data.get(field).unwrap_or(&Value::Null) == expected {
                    None
                } else {
                    Some(FailureReason::FieldMismatch(field.clone()))
                }
            }
            _ => None,
        })
    }

    /// Apply the write to a document that passed its preconditions
    pub fn apply(&self, current: Option<DocumentData>) -> DocumentData {
        match &self.op {
            WriteOp::Create(data) => data.clone(),
            WriteOp::Update(patch) => {
                let mut data = current.unwrap_or_default();
                for (k, v) in patch {
                    data.insert(k.clone(), v.clone());
                }
                data
            }
        }
    }
}

/// Requires the set of ids matching `query` to be exactly `expected`
#[derive(Debug, Clone, PartialEq)]
pub struct Guard {
    pub collection: String,
    pub query: Query,
    pub expected: BTreeSet<String>,
}

impl Guard {
    pub fn check(&self, matching: &BTreeSet<String>) -> Option<WriteFailure> {
        if matching == &self.expected {
            None
        } else {
            Some(WriteFailure {
                collection: self.collection.clone(),
                id: None,
                reason: FailureReason::QueryChanged,
            })
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    pub writes: Vec<Write>,
    pub guards: Vec<Guard>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, write: Write) -> &mut Self {
        self.writes.push(write);
        self
    }

    pub fn guard(&mut self, collection: &str, query: Query, expected: BTreeSet<String>) -> &mut Self {
        self.guards.push(Guard {
            collection: collection.to_string(),
            query,
            expected,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    Missing,
    AlreadyExists,
    FieldMismatch(String),
    QueryChanged,
}

/// A write or guard that blocked a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    pub collection: String,
    /// `None` for guard failures
    pub id: Option<String>,
    pub reason: FailureReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    Committed,
    /// A concurrent transaction interfered; retrying may succeed
    Conflict,
    /// Preconditions failed; nothing was written
    Rejected(Vec<WriteFailure>),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> AppResult<Option<Document>>;

    async fn find(&self, collection: &str, query: &Query) -> AppResult<Vec<Document>>;

    /// Insert a document; `Duplicate` if the id is taken
    async fn create(&self, collection: &str, id: &str, data: DocumentData) -> AppResult<()>;

    /// Shallow-merge fields; `NotFound` if the document is missing
    async fn update(&self, collection: &str, id: &str, patch: DocumentData) -> AppResult<()>;

    async fn commit(&self, batch: WriteBatch) -> AppResult<CommitOutcome>;

    async fn ping(&self) -> AppResult<()>;
}
