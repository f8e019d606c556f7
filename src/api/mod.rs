// Hero REST API module
// This module provides the REST binding of the hero operations, mounted under /api

pub mod handlers;
pub mod middleware;
pub mod types;


use axum::{routing::get, Router};

use crate::engine::service::HeroService;
use handlers::{create_hero, delete_hero, get_hero, list_heroes, update_hero};

pub use middleware::{default_origins, origin_gate, OriginDecision, OriginGate};
pub use types::{DataResponse, ErrorResponse, HealthResponse, ListHeroesQuery};

/// Create the hero routes, relative to the `/api` mount point
///
/// | Method | Path | Operation |
/// |---|---|---|
/// | GET | `/heroes` | list (optional `?name=` prefix) |
/// | GET | `/heroes/:id` | get |
/// | POST | `/heroes` | create |
/// | PUT, PATCH | `/heroes` | update |
/// | DELETE | `/heroes/:id` | delete |
pub fn create_router(service: HeroService) -> Router {
    Router::new()
        .route(
            "/heroes",
            get(list_heroes)
                .post(create_hero)
                .put(update_hero)
                .patch(update_hero),
        )
        .route("/heroes/:id", get(get_hero).delete(delete_hero))
        .with_state(service)
}
