// Storage abstraction for the hero service
// This defines the document store interface and the in-memory backend

//! # Storage Abstraction Layer
//!
//! The service never talks to a database driver directly. It talks to a
//! [`DocumentStore`]: a small collection-of-JSON-documents interface with
//! filter-based reads and writes. Backends:
//! - **InMemoryDocumentStore**: default for development and tests
//! - **NATSDocumentStore**: NATS JetStream key-value bucket (`nats_storage`)
//!
//! ## Documents
//!
//! A [`Document`] is a JSON object (`fields`) plus two internal markers the
//! store owns: an opaque `object_id` and a `revision` that is bumped on every
//! effective write. Neither marker is part of `fields`, so nothing above the
//! store adapter can leak them.
//!
//! ## Filters
//!
//! A [`Filter`] is a conjunction of conditions on top-level fields:
//! - `Eq(field, value)`: JSON equality
//! - `Prefix(field, text)`: case-sensitive, literal "starts with" on strings
//!
//! Every backend evaluates filters through [`Filter::matches`] so the matching
//! rules cannot drift between backends.
//!
//! ## Rust Learning Notes:
//!
//! ### Async Traits
//! The `async-trait` crate enables async methods in traits that are used as
//! trait objects (`Arc<dyn DocumentStore>`).
//!
//! ### Default Methods
//! `find_one` has a default body built on `find`. A backend that can look up a
//! single document more cheaply may override it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::Result;

/// JSON object holding a document's client-visible fields
pub type Fields = Map<String, Value>;

/// A stored document and its internal markers
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Store-assigned identifier, never shown to clients
    pub object_id: Uuid,
    /// Version marker, never shown to clients
    pub revision: u64,
    pub fields: Fields,
}

impl Document {
    pub fn new(fields: Fields) -> Self {
        Self {
            object_id: Uuid::new_v4(),
            revision: 0,
            fields,
        }
    }

    /// Apply `$set`-style changes, returning whether any value changed
    pub fn apply_set(&mut self, changes: &Fields) -> bool {
        let mut modified = false;
        for (key, value) in changes {
            if self.fields.get(key) != Some(value) {
                self.fields.insert(key.clone(), value.clone());
                modified = true;
            }
        }
        if modified {
            self.revision += 1;
        }
        modified
    }
}

/// A single condition on a top-level field
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(Value),
    Prefix(String),
}

impl Condition {
    fn matches(&self, value: Option<&Value>) -> bool {
        match (self, value) {
            (Condition::Eq(expected), Some(actual)) => expected == actual,
            (Condition::Prefix(prefix), Some(Value::String(actual))) => actual.starts_with(prefix.as_str()),
            _ => false,
        }
    }
}

/// Conjunction of field conditions; the empty filter matches everything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Condition)>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and_eq(field, value)
    }

    pub fn prefix(field: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::all().and_prefix(field, prefix)
    }

    pub fn and_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), Condition::Eq(value.into())));
        self
    }

    pub fn and_prefix(mut self, field: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.conditions
            .push((field.into(), Condition::Prefix(prefix.into())));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, fields: &Fields) -> bool {
        self.conditions
            .iter()
            .all(|(field, condition)| condition.matches(fields.get(field)))
    }
}

/// Result of `insert_many`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertManySummary {
    pub inserted_count: u64,
}

/// Result of `update_one`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSummary {
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Result of `delete_one` / `delete_many`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSummary {
    pub deleted_count: u64,
}

/// Document store collaborator
///
/// ## Return Values
/// - `find_one` returns `Ok(None)` when nothing matches; that is not an error
/// - `update_one` / `delete_one` report zero counts when nothing matches
/// - `Err(_)` always means the store itself failed
///
/// ## Atomicity
/// Only single-document writes are atomic. `insert_many` may stop part way
/// through on backends that cannot batch, and callers get no read-modify-write
/// guarantee across separate calls (for example `count` then `insert_one`).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document matching `filter`, in the store's natural order
    async fn find(&self, filter: &Filter) -> Result<Vec<Document>>;

    /// The first document matching `filter`
    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>> {
        Ok(self.find(filter).await?.into_iter().next())
    }

    async fn insert_one(&self, fields: Fields) -> Result<Document>;

    async fn insert_many(&self, documents: Vec<Fields>) -> Result<InsertManySummary>;

    /// Overwrite the given fields on the first matching document
    async fn update_one(&self, filter: &Filter, changes: Fields) -> Result<UpdateSummary>;

    async fn delete_one(&self, filter: &Filter) -> Result<DeleteSummary>;

    async fn delete_many(&self, filter: &Filter) -> Result<DeleteSummary>;

    async fn count(&self, filter: &Filter) -> Result<u64>;
}

/// In-memory document store for development and testing
///
/// Documents are kept in insertion order, which is this backend's natural
/// order. Data is lost when the process exits.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<Vec<Document>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn find(&self, filter: &Filter) -> Result<Vec<Document>> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .filter(|doc| filter.matches(&doc.fields))
            .cloned()
            .collect())
    }

    async fn insert_one(&self, fields: Fields) -> Result<Document> {
        let document = Document::new(fields);
        self.documents.write().await.push(document.clone());
        Ok(document)
    }

    async fn insert_many(&self, documents: Vec<Fields>) -> Result<InsertManySummary> {
        let mut stored = self.documents.write().await;
        let inserted_count = documents.len() as u64;
        stored.extend(documents.into_iter().map(Document::new));
        Ok(InsertManySummary { inserted_count })
    }

    async fn update_one(&self, filter: &Filter, changes: Fields) -> Result<UpdateSummary> {
        let mut documents = self.documents.write().await;
        match documents.iter_mut().find(|doc| filter.matches(&doc.fields)) {
            Some(document) => {
                let modified = document.apply_set(&changes);
                Ok(UpdateSummary {
                    matched_count: 1,
                    modified_count: u64::from(modified),
                })
            }
            None => Ok(UpdateSummary {
                matched_count: 0,
                modified_count: 0,
            }),
        }
    }

    async fn delete_one(&self, filter: &Filter) -> Result<DeleteSummary> {
        let mut documents = self.documents.write().await;
        let position = documents.iter().position(|doc| filter.matches(&doc.fields));
        let deleted_count = match position {
            Some(index) => {
                documents.remove(index);
                1
            }
            None => 0,
        };
        Ok(DeleteSummary { deleted_count })
    }

    async fn delete_many(&self, filter: &Filter) -> Result<DeleteSummary> {
        let mut documents = self.documents.write().await;
        let before = documents.len();
        documents.retain(|doc| !filter.matches(&doc.fields));
        Ok(DeleteSummary {
            deleted_count: (before - documents.len()) as u64,
        })
    }

    async fn count(&self, filter: &Filter) -> Result<u64> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .filter(|doc| filter.matches(&doc.fields))
            .count() as u64)
    }
}
