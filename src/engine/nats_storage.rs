// NATS storage implementation for hero documents
// This provides persistent storage using a NATS JetStream key-value bucket

//! # NATS Document Store
//!
//! Implements [`DocumentStore`] on top of a single JetStream key-value bucket.
//!
//! ## Layout
//!
//! - **Key**: the document's `object_id` (UUID, simple form)
//! - **Value**: the document's fields as a JSON object
//! - **Revision**: the KV entry revision, so it moves on every write
//!
//! ## Queries
//!
//! The bucket has no secondary indexes. Reads list the keys, fetch each live
//! entry and evaluate the [`Filter`] client side through [`Filter::matches`],
//! the same as the in-memory backend. Every read is a full scan.
//!
//! ## Writes
//!
//! - Inserts use `create`, which refuses to overwrite an existing key
//! - Updates use revision-checked `update`; a concurrent writer makes the
//!   call fail instead of silently losing a write
//! - Nothing is retried. A failed call surfaces as a storage error

use std::time::Duration;

use anyhow::{anyhow, Context as _};
use async_nats::jetstream::{self, kv};
use async_trait::async_trait;
use futures::StreamExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::engine::storage::{
    DeleteSummary, Document, DocumentStore, Fields, Filter, InsertManySummary, UpdateSummary,
};
use crate::Result;

/// Configuration for the NATS document store
#[derive(Debug, Clone)]
pub struct NATSDocumentStoreConfig {
    /// NATS server URL
    pub nats_url: String,
    /// Key-value bucket holding the collection
    pub bucket: String,
    pub connection_timeout: Duration,
    /// Revisions kept per key
    pub history: i64,
    pub client_name: Option<String>,
}

impl Default for NATSDocumentStoreConfig {
    fn default() -> Self {
        Self {
            nats_url: "nats://localhost:4222".to_string(),
            bucket: "heroes".to_string(),
            connection_timeout: Duration::from_secs(10),
            history: 1,
            client_name: Some("hero-service".to_string()),
        }
    }
}

/// JetStream key-value document store
pub struct NATSDocumentStore {
    store: kv::Store,
    config: NATSDocumentStoreConfig,
}

impl NATSDocumentStore {
    /// Connect to NATS and open (or create) the configured bucket
    pub async fn connect(config: NATSDocumentStoreConfig) -> Result<Self> {
        info!("Connecting to NATS server at {}", config.nats_url);

        let mut options =
            async_nats::ConnectOptions::new().connection_timeout(config.connection_timeout);
        if let Some(client_name) = &config.client_name {
            options = options.name(client_name);
        }

        let client = options
            .connect(&config.nats_url)
            .await
            .with_context(|| format!("Failed to connect to NATS at {}", config.nats_url))?;

        let js = jetstream::new(client);
        let store = Self::ensure_bucket(&js, &config).await?;

        info!("✅ NATS document store ready (bucket: {})", config.bucket);
        Ok(Self { store, config })
    }

    async fn ensure_bucket(
        js: &jetstream::Context,
        config: &NATSDocumentStoreConfig,
    ) -> Result<kv::Store> {
        match js.get_key_value(&config.bucket).await {
            Ok(store) => {
                debug!("Using existing KV bucket: {}", config.bucket);
                Ok(store)
            }
            Err(_) => {
                info!("Creating new KV bucket: {}", config.bucket);
                let store = js
                    .create_key_value(kv::Config {
                        bucket: config.bucket.clone(),
                        description: "Hero documents".to_string(),
                        history: config.history,
                        storage: jetstream::stream::StorageType::File,
                        ..Default::default()
                    })
                    .await
                    .map_err(|e| anyhow!("Failed to create KV bucket {}: {}", config.bucket, e))?;
                Ok(store)
            }
        }
    }

    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }

    /// Load every live document in the bucket
    async fn scan(&self) -> Result<Vec<Document>> {
        let mut keys = self
            .store
            .keys()
            .await
            .map_err(|e| anyhow!("Failed to list keys in {}: {}", self.config.bucket, e))?;

        let mut documents = Vec::new();
        while let Some(key) = keys.next().await {
            let key = key.map_err(|e| anyhow!("Failed to read key: {}", e))?;
            match self.load(&key).await? {
                Some(document) => documents.push(document),
                None => debug!("Key {} vanished during scan", key),
            }
        }

        debug!("Scanned {} documents from {}", documents.len(), self.config.bucket);
        Ok(documents)
    }

    async fn load(&self, key: &str) -> Result<Option<Document>> {
        let entry = self
            .store
            .entry(key)
            .await
            .map_err(|e| anyhow!("Failed to read entry {}: {}", key, e))?;

        let entry = match entry {
            Some(entry) if matches!(entry.operation, kv::Operation::Put) => entry,
            _ => return Ok(None),
        };

        let object_id = match Uuid::parse_str(key) {
            Ok(id) => id,
            Err(_) => {
                warn!("Skipping foreign key {} in bucket {}", key, self.config.bucket);
                return Ok(None);
            }
        };

        let fields: Fields = serde_json::from_slice(entry.value.as_ref())
            .with_context(|| format!("Document {} is not a JSON object", key))?;

        Ok(Some(Document {
            object_id,
            revision: entry.revision,
            fields,
        }))
    }

    fn key_of(document: &Document) -> String {
        document.object_id.simple().to_string()
    }

    async fn create(&self, fields: Fields) -> Result<Document> {
        let mut document = Document::new(fields);
        let data = serde_json::to_vec(&document.fields)?;

        document.revision = self
            .store
            .create(Self::key_of(&document), data.into())
            .await
            .map_err(|e| anyhow!("Failed to insert document: {}", e))?;

        Ok(document)
    }
}

#[async_trait]
impl DocumentStore for NATSDocumentStore {
    async fn find(&self, filter: &Filter) -> Result<Vec<Document>> {
        Ok(self
            .scan()
            .await?
            .into_iter()
            .filter(|doc| filter.matches(&doc.fields))
            .collect())
    }

    async fn insert_one(&self, fields: Fields) -> Result<Document> {
        let document = self.create(fields).await?;
        debug!("Inserted document {}", document.object_id);
        Ok(document)
    }

    async fn insert_many(&self, documents: Vec<Fields>) -> Result<InsertManySummary> {
        let mut inserted_count = 0;
        for fields in documents {
            // No batch primitive: earlier inserts stay if a later one fails
            self.create(fields).await?;
            inserted_count += 1;
        }
        Ok(InsertManySummary { inserted_count })
    }

    async fn update_one(&self, filter: &Filter, changes: Fields) -> Result<UpdateSummary> {
        let mut document = match self.find_one(filter).await? {
            Some(document) => document,
            None => {
                return Ok(UpdateSummary {
                    matched_count: 0,
                    modified_count: 0,
                })
            }
        };

        let expected_revision = document.revision;
        if !document.apply_set(&changes) {
            return Ok(UpdateSummary {
                matched_count: 1,
                modified_count: 0,
            });
        }

        let data = serde_json::to_vec(&document.fields)?;
        self.store
            .update(Self::key_of(&document), data.into(), expected_revision)
            .await
            .map_err(|e| anyhow!("Failed to update document {}: {}", document.object_id, e))?;

        Ok(UpdateSummary {
            matched_count: 1,
            modified_count: 1,
        })
    }

    async fn delete_one(&self, filter: &Filter) -> Result<DeleteSummary> {
        let document = match self.find_one(filter).await? {
            Some(document) => document,
            None => return Ok(DeleteSummary { deleted_count: 0 }),
        };

        self.store
            .delete(Self::key_of(&document))
            .await
            .map_err(|e| anyhow!("Failed to delete document {}: {}", document.object_id, e))?;

        Ok(DeleteSummary { deleted_count: 1 })
    }

    async fn delete_many(&self, filter: &Filter) -> Result<DeleteSummary> {
        let mut deleted_count = 0;
        for document in self.find(filter).await? {
            self.store
                .purge(Self::key_of(&document))
                .await
                .map_err(|e| anyhow!("Failed to purge document {}: {}", document.object_id, e))?;
            deleted_count += 1;
        }
        Ok(DeleteSummary { deleted_count })
    }

    async fn count(&self, filter: &Filter) -> Result<u64> {
        Ok(self.find(filter).await?.len() as u64)
    }
}
