// REST handlers for the hero routes
// Each handler parses its input, calls HeroService and renders the legacy wire shapes

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::api::types::{DataResponse, HealthResponse, ListHeroesQuery};
use crate::engine::service::{CreateOutcome, HeroService};
use crate::engine::validation;
use crate::models::{CreatePayload, Hero, HeroPatch};
use crate::{HeroServiceError, Result};

pub const WELCOME_MESSAGE: &str = "Welcome to the rest service of Heroes powered by Rust/axum.";

/// Log a failed operation before it is rendered
fn failed(operation: &str, err: HeroServiceError) -> HeroServiceError {
    error!("❌ {} failed: {}", operation, err);
    err
}

/// Accept any JSON body, turning axum's rejection into a validation failure
fn parse_body(body: std::result::Result<Json<Value>, JsonRejection>) -> Result<Value> {
    body.map(|Json(value)| value)
        .map_err(|rejection| HeroServiceError::validation(format!("invalid JSON body: {}", rejection.body_text())))
}

/// GET /
pub async fn welcome() -> Json<DataResponse<&'static str>> {
    Json(DataResponse::new(WELCOME_MESSAGE))
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// GET /api/heroes?name=<prefix>
pub async fn list_heroes(
    State(service): State<HeroService>,
    query: std::result::Result<Query<ListHeroesQuery>, QueryRejection>,
) -> Result<Json<Vec<Hero>>> {
    let Query(query) = query
        .map_err(|rejection| failed("list", HeroServiceError::validation(rejection.body_text())))?;
    info!("📋 Listing heroes (name: {:?})", query.name);

    let heroes = service
        .list(query.name.as_deref())
        .await
        .map_err(|e| failed("list", e))?;
    Ok(Json(heroes))
}

/// GET /api/heroes/:id
///
/// Responds with the hero or JSON `null` when there is none.
pub async fn get_hero(
    State(service): State<HeroService>,
    Path(id): Path<String>,
) -> Result<Json<Option<Hero>>> {
    let id = validation::parse_id(&id).map_err(|e| failed("get", e))?;
    debug!("🔍 Getting hero {}", id);

    let hero = service.get(id).await.map_err(|e| failed("get", e))?;
    Ok(Json(hero))
}

/// POST /api/heroes
///
/// Body: a hero, an array of heroes, or `{token}`.
pub async fn create_hero(
    State(service): State<HeroService>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Response> {
    let payload = parse_body(body)
        .and_then(CreatePayload::from_value)
        .map_err(|e| failed("create", e))?;

    match service.create(payload).await.map_err(|e| failed("create", e))? {
        CreateOutcome::Single(hero) => {
            info!("✅ Created hero {} ({})", hero.id, hero.name);
            Ok((StatusCode::CREATED, Json(hero)).into_response())
        }
        CreateOutcome::Batch(summary) => {
            info!("✅ Inserted {} heroes", summary.inserted_count);
            Ok((StatusCode::CREATED, Json(DataResponse::new(summary))).into_response())
        }
    }
}

/// PUT|PATCH /api/heroes
pub async fn update_hero(
    State(service): State<HeroService>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Response> {
    let patch = parse_body(body)
        .and_then(|value| {
            serde_json::from_value::<HeroPatch>(value)
                .map_err(|e| HeroServiceError::validation(format!("invalid hero: {}", e)))
        })
        .map_err(|e| failed("update", e))?;
    info!("✏️ Updating hero {}", patch.id);

    let summary = service.update(patch).await.map_err(|e| failed("update", e))?;
    Ok(Json(DataResponse::new(summary)).into_response())
}

/// DELETE /api/heroes/:id
pub async fn delete_hero(
    State(service): State<HeroService>,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = validation::parse_id(&id).map_err(|e| failed("delete", e))?;
    info!("🗑️ Deleting hero {}", id);

    let summary = service.delete(id).await.map_err(|e| failed("delete", e))?;
    Ok(Json(DataResponse::new(summary)).into_response())
}
