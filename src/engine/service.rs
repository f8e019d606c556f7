// Hero service
// The one implementation of list/get/create/update/delete, shared by every transport

//! # Hero Service
//!
//! [`HeroService`] is what REST handlers, GraphQL resolvers and the admin CLI
//! call. It owns no state of its own: the document store and the envelope
//! codec are injected at construction time, so tests can hand it any
//! [`DocumentStore`] they like.
//!
//! ## Id assignment
//!
//! A hero created without an id gets `count + 1`. The count and the insert
//! are separate store calls, so two concurrent creates may both receive the
//! same id, and a delete followed by a create can reuse an id that is still
//! taken. Stored data and existing clients depend on these ids, so the
//! heuristic stays.

use std::sync::Arc;

use tracing::{debug, info};

use crate::engine::envelope::EnvelopeCodec;
use crate::engine::repository::HeroRepository;
use crate::engine::storage::{DeleteSummary, DocumentStore, InsertManySummary, UpdateSummary};
use crate::engine::validation;
use crate::models::{default_heroes, CreatePayload, Hero, HeroInput, HeroPatch};
use crate::Result;

/// What a create produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Single(Hero),
    Batch(InsertManySummary),
}

/// Hero operations over an injected store
#[derive(Clone)]
pub struct HeroService {
    repository: HeroRepository,
    codec: Arc<EnvelopeCodec>,
}

impl HeroService {
    pub fn new(store: Arc<dyn DocumentStore>, codec: EnvelopeCodec) -> Self {
        Self {
            repository: HeroRepository::new(store),
            codec: Arc::new(codec),
        }
    }

    pub fn codec(&self) -> &EnvelopeCodec {
        &self.codec
    }

    /// All heroes, or those whose name starts with `name` (case-sensitive)
    ///
    /// An empty prefix is the same as no prefix.
    pub async fn list(&self, name: Option<&str>) -> Result<Vec<Hero>> {
        let prefix = name.filter(|name| !name.is_empty());
        let heroes = self.repository.list(prefix).await?;
        debug!("Listed {} heroes (prefix: {:?})", heroes.len(), prefix);
        Ok(heroes)
    }

    /// The hero with `id`; absence is `Ok(None)`, not an error
    ///
    /// Ids no hero can carry (zero, negative) simply match nothing.
    pub async fn get(&self, id: i64) -> Result<Option<Hero>> {
        self.repository.get(id).await
    }

    /// Dispatch any of the three create shapes
    pub async fn create(&self, payload: CreatePayload) -> Result<CreateOutcome> {
        match payload {
            CreatePayload::Batch(inputs) => self.create_many(inputs).await.map(CreateOutcome::Batch),
            CreatePayload::Single(input) => self.create_one(input).await.map(CreateOutcome::Single),
            CreatePayload::Envelope { token } => {
                let input = self.codec.open(&token)?;
                debug!("🔓 Envelope verified for hero {:?}", input.name);
                self.create_one(input).await.map(CreateOutcome::Single)
            }
        }
    }

    /// Create one hero, assigning `count + 1` when no id was given
    pub async fn create_one(&self, input: HeroInput) -> Result<Hero> {
        let valid = validation::validate_input(&input)?;
        let fallback = match valid.id {
            Some(id) => id,
            None => self.repository.count().await? as i64 + 1,
        };
        let hero = valid.into_hero(fallback);

        let stored = self.repository.insert(&hero).await?;
        info!("Created hero {} ({})", stored.id, stored.name);
        Ok(stored)
    }

    /// Bulk insert; every entry must be valid before anything is written
    pub async fn create_many(&self, inputs: Vec<HeroInput>) -> Result<InsertManySummary> {
        let heroes = validation::validate_batch(&inputs)?;
        let summary = self.repository.insert_many(&heroes).await?;
        info!("Inserted {} heroes", summary.inserted_count);
        Ok(summary)
    }

    /// Overwrite the fields present in `patch` on the hero with its id
    pub async fn update(&self, patch: HeroPatch) -> Result<UpdateSummary> {
        let patch = validation::validate_patch(&patch)?;
        let summary = self.repository.update(&patch).await?;
        info!(
            "Updated hero {}: matched {}, modified {}",
            patch.id, summary.matched_count, summary.modified_count
        );
        Ok(summary)
    }

    /// Remove the hero with `id`; a missing hero yields `deleted_count: 0`
    pub async fn delete(&self, id: i64) -> Result<DeleteSummary> {
        let summary = self.repository.delete(id).await?;
        info!("Deleted hero {}: {} removed", id, summary.deleted_count);
        Ok(summary)
    }

    pub async fn count(&self) -> Result<u64> {
        self.repository.count().await
    }

    /// Remove every hero
    pub async fn clear(&self) -> Result<DeleteSummary> {
        let summary = self.repository.delete_all().await?;
        info!("🧹 Removed {} heroes", summary.deleted_count);
        Ok(summary)
    }

    /// Insert the classic roster unless the store already holds heroes
    ///
    /// Returns how many heroes were inserted.
    pub async fn seed_defaults(&self) -> Result<u64> {
        let existing = self.repository.count().await?;
        if existing > 0 {
            debug!("Store already holds {} heroes, skipping seed", existing);
            return Ok(0);
        }
        let summary = self.repository.insert_many(&default_heroes()).await?;
        info!("🌱 Seeded {} heroes", summary.inserted_count);
        Ok(summary.inserted_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::envelope::EnvelopeClaims;
    use crate::engine::storage::{Document, Fields, Filter, InMemoryDocumentStore};
    use async_trait::async_trait;
    use std::time::Duration;

    fn service() -> HeroService {
        HeroService::new(
            Arc::new(InMemoryDocumentStore::new()),
            EnvelopeCodec::new("myHeroes"),
        )
    }

    /// A store whose every call fails
    struct FailingStore;

    #[async_trait]
    impl DocumentStore for FailingStore {
        async fn find(&self, _filter: &Filter) -> Result<Vec<Document>> {
            Err(anyhow::anyhow!("connection refused").into())
        }
        async fn insert_one(&self, _fields: Fields) -> Result<Document> {
            Err(anyhow::anyhow!("connection refused").into())
        }
        async fn insert_many(&self, _documents: Vec<Fields>) -> Result<InsertManySummary> {
            Err(anyhow::anyhow!("connection refused").into())
        }
        async fn update_one(&self, _filter: &Filter, _changes: Fields) -> Result<UpdateSummary> {
            Err(anyhow::anyhow!("connection refused").into())
        }
        async fn delete_one(&self, _filter: &Filter) -> Result<DeleteSummary> {
            Err(anyhow::anyhow!("connection refused").into())
        }
        async fn delete_many(&self, _filter: &Filter) -> Result<DeleteSummary> {
            Err(anyhow::anyhow!("connection refused").into())
        }
        async fn count(&self, _filter: &Filter) -> Result<u64> {
            Err(anyhow::anyhow!("connection refused").into())
        }
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let service = service();
        let created = service.create_one(HeroInput::named("Celeritas")).await.unwrap();

        let fetched = service.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Celeritas");
    }

    #[tokio::test]
    async fn test_delete_missing_hero_is_not_an_error() {
        let summary = service().delete(404).await.unwrap();
        assert_eq!(summary.deleted_count, 0);
    }

    #[tokio::test]
    async fn test_unassignable_ids_match_nothing() {
        let service = service();
        service.seed_defaults().await.unwrap();

        for id in [0, -3] {
            assert_eq!(service.get(id).await.unwrap(), None);
            assert_eq!(service.delete(id).await.unwrap().deleted_count, 0);
        }
        assert_eq!(service.count().await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_prefix_search() {
        let service = service();
        for (id, name) in [(1, "Dr. Nice"), (2, "Dr. IQ"), (3, "Narco")] {
            service.create_one(HeroInput::with_id(id, name)).await.unwrap();
        }

        let mut names: Vec<_> = service
            .list(Some("Dr"))
            .await
            .unwrap()
            .into_iter()
            .map(|hero| hero.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["Dr. IQ", "Dr. Nice"]);

        assert!(service.list(Some("dr")).await.unwrap().is_empty());
        assert_eq!(service.list(Some("")).await.unwrap().len(), 3);
        assert_eq!(service.list(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let service = HeroService::new(store.clone(), EnvelopeCodec::new("myHeroes"));
        let mut fields = Fields::new();
        fields.insert("id".to_string(), 5.into());
        fields.insert("name".to_string(), "Magneta".into());
        fields.insert("power".to_string(), "magnetism".into());
        store.insert_one(fields).await.unwrap();

        let summary = service
            .update(HeroPatch {
                id: 5,
                name: Some("X".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(summary.modified_count, 1);

        let doc = store.find_one(&Filter::eq("id", 5i64)).await.unwrap().unwrap();
        assert_eq!(doc.fields["name"], "X");
        assert_eq!(doc.fields["power"], "magnetism");
    }

    #[tokio::test]
    async fn test_update_missing_hero_reports_zero_matches() {
        let summary = service()
            .update(HeroPatch {
                id: 77,
                name: Some("Nobody".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(summary.matched_count, 0);
        assert_eq!(summary.modified_count, 0);
    }

    #[tokio::test]
    async fn test_id_is_count_plus_one() {
        let service = service();
        service
            .create_many(vec![
                HeroInput::with_id(10, "Tornado"),
                HeroInput::with_id(20, "Magma"),
            ])
            .await
            .unwrap();

        let hero = service.create_one(HeroInput::named("Dynama")).await.unwrap();
        assert_eq!(hero.id, 3);

        let hero = service.create_one(HeroInput::with_id(0, "RubberMan")).await.unwrap();
        assert_eq!(hero.id, 4);
    }

    #[tokio::test]
    async fn test_count_based_ids_can_collide_after_delete() {
        // Known non-guarantee of count + 1 assignment
        let service = service();
        for (id, name) in [(1, "Dr. Nice"), (2, "Narco"), (3, "Bombasto")] {
            service.create_one(HeroInput::with_id(id, name)).await.unwrap();
        }
        service.delete(1).await.unwrap();

        let hero = service.create_one(HeroInput::named("Celeritas")).await.unwrap();
        assert_eq!(hero.id, 3);

        let threes = service
            .list(None)
            .await
            .unwrap()
            .into_iter()
            .filter(|hero| hero.id == 3)
            .count();
        assert_eq!(threes, 2);
    }

    #[tokio::test]
    async fn test_envelope_create() {
        let service = service();
        let token = service
            .codec()
            .seal(HeroInput::with_id(11, "Encrypted"), Some(Duration::from_secs(60)))
            .unwrap();

        let outcome = service.create(CreatePayload::Envelope { token }).await.unwrap();
        assert_eq!(outcome, CreateOutcome::Single(Hero::new(11, "Encrypted")));
    }

    #[tokio::test]
    async fn test_rejected_envelope_persists_nothing() {
        let service = service();
        let forged = EnvelopeCodec::new("wrong")
            .seal(HeroInput::with_id(11, "Encrypted"), None)
            .unwrap();

        let err = service
            .create(CreatePayload::Envelope { token: forged })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "TokenVerificationFailure");
        assert_eq!(service.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_expired_envelope_persists_nothing() {
        let service = service();
        let now = chrono::Utc::now().timestamp() as u64;
        let expired = service
            .codec()
            .sign(&EnvelopeClaims {
                hero: HeroInput::with_id(11, "Encrypted"),
                iat: Some(now - 1200),
                exp: Some(now - 600),
                nbf: None,
            })
            .unwrap();

        let err = service
            .create(CreatePayload::Envelope { token: expired })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "<TokenExpiredError, jwt expired>");
        assert_eq!(service.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_batch_writes_nothing() {
        let service = service();
        let err = service
            .create(CreatePayload::Batch(vec![
                HeroInput::with_id(1, "Dr. Nice"),
                HeroInput::with_id(2, ""),
            ]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "ValidationFailure");
        assert_eq!(service.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_seed_only_fills_an_empty_store() {
        let service = service();
        assert_eq!(service.seed_defaults().await.unwrap(), 10);
        assert_eq!(service.seed_defaults().await.unwrap(), 0);
        assert_eq!(service.count().await.unwrap(), 10);

        assert_eq!(service.clear().await.unwrap().deleted_count, 10);
        assert_eq!(service.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_store_failures_surface_as_store_errors() {
        let service = HeroService::new(Arc::new(FailingStore), EnvelopeCodec::new("myHeroes"));

        assert_eq!(service.list(None).await.unwrap_err().kind(), "StoreFailure");
        assert_eq!(service.get(1).await.unwrap_err().kind(), "StoreFailure");
        assert_eq!(
            service.create_one(HeroInput::named("Nobody")).await.unwrap_err().kind(),
            "StoreFailure"
        );
        assert_eq!(service.delete(1).await.unwrap_err().kind(), "StoreFailure");
    }
}
