// Store adapter for heroes
// Translates hero operations into DocumentStore calls and back

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::warn;

use crate::engine::storage::{
    DeleteSummary, Document, DocumentStore, Fields, Filter, InsertManySummary, UpdateSummary,
};
use crate::models::{Hero, HeroPatch};
use crate::{HeroServiceError, Result};

/// Hero-shaped view over a [`DocumentStore`]
///
/// Documents come back with store internals attached; this adapter is the
/// only place that sees them. Everything it returns is a plain [`Hero`].
#[derive(Clone)]
pub struct HeroRepository {
    store: Arc<dyn DocumentStore>,
}

impl HeroRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, name_prefix: Option<&str>) -> Result<Vec<Hero>> {
        let filter = match name_prefix {
            Some(prefix) => Filter::prefix("name", prefix),
            None => Filter::all(),
        };

        let documents = self.store.find(&filter).await?;
        Ok(documents
            .iter()
            .filter_map(|doc| match to_hero(doc) {
                Ok(hero) => Some(hero),
                Err(e) => {
                    warn!("Skipping malformed document {}: {}", doc.object_id, e);
                    None
                }
            })
            .collect())
    }

    pub async fn get(&self, id: i64) -> Result<Option<Hero>> {
        match self.store.find_one(&Filter::eq("id", id)).await? {
            Some(doc) => to_hero(&doc).map(Some),
            None => Ok(None),
        }
    }

    pub async fn count(&self) -> Result<u64> {
        self.store.count(&Filter::all()).await
    }

    pub async fn insert(&self, hero: &Hero) -> Result<Hero> {
        let document = self.store.insert_one(to_fields(hero)).await?;
        to_hero(&document)
    }

    pub async fn insert_many(&self, heroes: &[Hero]) -> Result<InsertManySummary> {
        self.store
            .insert_many(heroes.iter().map(to_fields).collect())
            .await
    }

    /// `$set` the present fields of `patch` on the hero with its id
    pub async fn update(&self, patch: &HeroPatch) -> Result<UpdateSummary> {
        let mut changes = Fields::new();
        if let Some(name) = &patch.name {
            changes.insert("name".to_string(), Value::String(name.clone()));
        }
        self.store
            .update_one(&Filter::eq("id", patch.id), changes)
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<DeleteSummary> {
        self.store.delete_one(&Filter::eq("id", id)).await
    }

    pub async fn delete_all(&self) -> Result<DeleteSummary> {
        self.store.delete_many(&Filter::all()).await
    }
}

fn to_fields(hero: &Hero) -> Fields {
    match json!({ "id": hero.id, "name": hero.name }) {
        Value::Object(fields) => fields,
        _ => Fields::new(),
    }
}

/// Project a document onto the client-visible Hero shape
fn to_hero(document: &Document) -> Result<Hero> {
    let id = document
        .fields
        .get("id")
        .and_then(Value::as_i64)
        .ok_or_else(|| {
            HeroServiceError::Storage(anyhow::anyhow!(
                "document {} has no integer id",
                document.object_id
            ))
        })?;
    let name = document
        .fields
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            HeroServiceError::Storage(anyhow::anyhow!(
                "document {} has no name",
                document.object_id
            ))
        })?;
    Ok(Hero::new(id, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::storage::InMemoryDocumentStore;

    fn repository() -> (Arc<InMemoryDocumentStore>, HeroRepository) {
        let store = Arc::new(InMemoryDocumentStore::new());
        (store.clone(), HeroRepository::new(store))
    }

    fn raw(value: Value) -> Fields {
        match value {
            Value::Object(fields) => fields,
            other => panic!("expected an object, got {}", other),
        }
    }

    #[tokio::test]
    async fn test_internal_fields_are_stripped() {
        let (store, repo) = repository();
        store
            .insert_one(raw(json!({"id": 3, "name": "Bombasto", "power": "bombast"})))
            .await
            .unwrap();

        let hero = repo.get(3).await.unwrap().unwrap();
        assert_eq!(hero, Hero::new(3, "Bombasto"));
        assert_eq!(
            serde_json::to_value(&hero).unwrap(),
            json!({"id": 3, "name": "Bombasto"})
        );
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let (_, repo) = repository();
        assert_eq!(repo.get(42).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_skips_malformed_documents() {
        let (store, repo) = repository();
        store.insert_one(raw(json!({"id": 1, "name": "Narco"}))).await.unwrap();
        store.insert_one(raw(json!({"name": "No id"}))).await.unwrap();

        assert_eq!(repo.list(None).await.unwrap(), vec![Hero::new(1, "Narco")]);
    }

    #[tokio::test]
    async fn test_get_of_malformed_document_is_a_store_failure() {
        let (store, repo) = repository();
        store.insert_one(raw(json!({"id": 9}))).await.unwrap();
        assert_eq!(repo.get(9).await.unwrap_err().kind(), "StoreFailure");
    }

    #[tokio::test]
    async fn test_update_without_name_matches_but_does_not_modify() {
        let (_, repo) = repository();
        repo.insert(&Hero::new(5, "Magneta")).await.unwrap();

        let summary = repo.update(&HeroPatch { id: 5, name: None }).await.unwrap();
        assert_eq!(summary.matched_count, 1);
        assert_eq!(summary.modified_count, 0);
    }
}
