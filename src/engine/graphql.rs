// GraphQL API for the hero service
// Field-shaped binding of the same five operations the REST routes expose

use async_graphql::{
    Context, EmptySubscription, ErrorExtensions, InputObject, Object, Schema, SimpleObject,
};
use tracing::debug;

use crate::engine::service::HeroService;
use crate::models::{Hero, HeroInput, HeroPatch};
use crate::HeroServiceError;

// GraphQL types - these are the API representations of our domain models

#[derive(SimpleObject, Debug, Clone, PartialEq)]
#[graphql(name = "Hero")]
pub struct HeroGQL {
    pub id: i64,
    pub name: String,
}

impl From<Hero> for HeroGQL {
    fn from(hero: Hero) -> Self {
        Self {
            id: hero.id,
            name: hero.name,
        }
    }
}

/// Input payload for creating hero
#[derive(InputObject, Debug, Clone)]
#[graphql(name = "HeroInput")]
pub struct HeroInputGQL {
    pub id: Option<i64>,
    pub name: Option<String>,
}

impl From<HeroInputGQL> for HeroInput {
    fn from(input: HeroInputGQL) -> Self {
        Self {
            id: input.id,
            name: input.name,
        }
    }
}

/// Convert a service failure into a GraphQL error carrying its kind
fn to_gql_error(err: HeroServiceError) -> async_graphql::Error {
    let kind = err.kind();
    async_graphql::Error::new(err.to_string()).extend_with(|_, e| e.set("kind", kind))
}

pub struct Query;

#[Object]
impl Query {
    /// Get a hero by id
    async fn get_hero(&self, ctx: &Context<'_>, id: i64) -> async_graphql::Result<Option<HeroGQL>> {
        let service = ctx.data::<HeroService>()?;
        debug!("GraphQL getHero({})", id);
        let hero = service.get(id).await.map_err(to_gql_error)?;
        Ok(hero.map(HeroGQL::from))
    }

    /// List every hero
    async fn get_hero_list(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<HeroGQL>> {
        let service = ctx.data::<HeroService>()?;
        let heroes = service.list(None).await.map_err(to_gql_error)?;
        Ok(heroes.into_iter().map(HeroGQL::from).collect())
    }

    /// Heroes whose name starts with `name` (case-sensitive)
    async fn search_heroes(
        &self,
        ctx: &Context<'_>,
        name: Option<String>,
    ) -> async_graphql::Result<Vec<HeroGQL>> {
        let service = ctx.data::<HeroService>()?;
        let heroes = service
            .list(name.as_deref())
            .await
            .map_err(to_gql_error)?;
        Ok(heroes.into_iter().map(HeroGQL::from).collect())
    }
}

pub struct Mutation;

#[Object]
impl Mutation {
    /// Create a hero; the id is assigned by the service
    async fn create_hero(&self, ctx: &Context<'_>, name: String) -> async_graphql::Result<HeroGQL> {
        let service = ctx.data::<HeroService>()?;
        let hero = service
            .create_one(HeroInput::named(name))
            .await
            .map_err(to_gql_error)?;
        Ok(hero.into())
    }

    async fn create_heroes(
        &self,
        ctx: &Context<'_>,
        input: Vec<HeroInputGQL>,
    ) -> async_graphql::Result<String> {
        let service = ctx.data::<HeroService>()?;
        let summary = service
            .create_many(input.into_iter().map(HeroInput::from).collect())
            .await
            .map_err(to_gql_error)?;
        Ok(format!(
            "Number of documents inserted: {}",
            summary.inserted_count
        ))
    }

    async fn update_hero(
        &self,
        ctx: &Context<'_>,
        id: i64,
        name: Option<String>,
    ) -> async_graphql::Result<String> {
        let service = ctx.data::<HeroService>()?;
        let summary = service
            .update(HeroPatch { id, name })
            .await
            .map_err(to_gql_error)?;
        Ok(format!("{} document(s) patched - {}", summary.modified_count, id))
    }

    async fn delete_hero(&self, ctx: &Context<'_>, id: i64) -> async_graphql::Result<String> {
        let service = ctx.data::<HeroService>()?;
        let summary = service.delete(id).await.map_err(to_gql_error)?;
        Ok(format!(
            "Number of documents deleted: {}",
            summary.deleted_count
        ))
    }
}

pub type HeroSchema = Schema<Query, Mutation, EmptySubscription>;

/// Create the GraphQL schema over a hero service
pub fn create_schema(service: HeroService) -> HeroSchema {
    Schema::build(Query, Mutation, EmptySubscription)
        .data(service)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::envelope::EnvelopeCodec;
    use crate::engine::storage::InMemoryDocumentStore;
    use serde_json::{json, Value};
    use std::sync::Arc;

    async fn seeded_schema() -> HeroSchema {
        let service = HeroService::new(
            Arc::new(InMemoryDocumentStore::new()),
            EnvelopeCodec::new("myHeroes"),
        );
        service.seed_defaults().await.unwrap();
        create_schema(service)
    }

    async fn run(schema: &HeroSchema, query: &str) -> Value {
        let response = schema.execute(query).await;
        serde_json::to_value(&response).unwrap()
    }

    #[tokio::test]
    async fn test_get_hero() {
        let schema = seeded_schema().await;
        let body = run(&schema, "{ getHero(id: 8) { id name } }").await;
        assert_eq!(body["data"]["getHero"], json!({"id": 8, "name": "Dr. IQ"}));

        let body = run(&schema, "{ getHero(id: 99) { id name } }").await;
        assert_eq!(body["data"]["getHero"], Value::Null);
    }

    #[tokio::test]
    async fn test_zero_id_finds_nothing() {
        let schema = seeded_schema().await;
        let body = run(&schema, "{ getHero(id: 0) { id name } }").await;
        assert_eq!(body["data"]["getHero"], Value::Null);
        assert!(body.get("errors").is_none());

        let body = run(&schema, "mutation { deleteHero(id: 0) }").await;
        assert_eq!(
            body["data"]["deleteHero"],
            json!("Number of documents deleted: 0")
        );
    }

    #[tokio::test]
    async fn test_list_and_search() {
        let schema = seeded_schema().await;
        let body = run(&schema, "{ getHeroList { id } }").await;
        assert_eq!(body["data"]["getHeroList"].as_array().unwrap().len(), 10);

        let body = run(&schema, r#"{ searchHeroes(name: "Dr") { name } }"#).await;
        assert_eq!(
            body["data"]["searchHeroes"],
            json!([{"name": "Dr. Nice"}, {"name": "Dr. IQ"}])
        );
    }

    #[tokio::test]
    async fn test_mutations_keep_legacy_messages() {
        let schema = seeded_schema().await;

        let body = run(&schema, r#"mutation { createHero(name: "Local") { id name } }"#).await;
        assert_eq!(body["data"]["createHero"], json!({"id": 11, "name": "Local"}));

        let body = run(
            &schema,
            r#"mutation { createHeroes(input: [{id: 12, name: "A"}, {id: 13, name: "B"}]) }"#,
        )
        .await;
        assert_eq!(
            body["data"]["createHeroes"],
            json!("Number of documents inserted: 2")
        );

        let body = run(&schema, r#"mutation { updateHero(id: 12, name: "AA") }"#).await;
        assert_eq!(body["data"]["updateHero"], json!("1 document(s) patched - 12"));

        let body = run(&schema, "mutation { deleteHero(id: 13) }").await;
        assert_eq!(
            body["data"]["deleteHero"],
            json!("Number of documents deleted: 1")
        );

        let body = run(&schema, "mutation { deleteHero(id: 13) }").await;
        assert_eq!(
            body["data"]["deleteHero"],
            json!("Number of documents deleted: 0")
        );
    }

    #[tokio::test]
    async fn test_errors_carry_kind_extension() {
        let schema = seeded_schema().await;
        let body = run(&schema, r#"mutation { createHero(name: "") { id } }"#).await;
        assert_eq!(
            body["errors"][0]["extensions"]["kind"],
            json!("ValidationFailure")
        );
    }
}
