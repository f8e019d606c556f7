// HTTP server for the hero service
// Mounts the REST routes, the GraphQL endpoint and the origin gate on one axum router

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router, Server,
};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{self, handlers, middleware::default_origins, origin_gate, OriginGate};
use crate::engine::envelope::EnvelopeCodec;
use crate::engine::graphql::create_schema;
use crate::engine::service::HeroService;
use crate::engine::storage::InMemoryDocumentStore;
use crate::server::graphql::{graphiql, graphql_handler};
use crate::{HeroServiceError, Result};

/// HTTP server configuration
#[derive(Clone, Debug)]
pub struct HeroServerConfig {
    pub host: String,
    pub port: u16,
    pub graphiql_enabled: bool,
    /// Browser origins echoed by the origin gate, besides the server's own
    pub allowed_origins: Vec<String>,
}

impl Default for HeroServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            graphiql_enabled: true,
            allowed_origins: default_origins(),
        }
    }
}

/// Hero HTTP server
pub struct HeroServer {
    config: HeroServerConfig,
    service: HeroService,
}

impl HeroServer {
    pub fn new(config: HeroServerConfig, service: HeroService) -> Self {
        Self { config, service }
    }

    pub fn config(&self) -> &HeroServerConfig {
        &self.config
    }

    pub fn service(&self) -> &HeroService {
        &self.service
    }

    /// Build the complete router
    ///
    /// ```text
    /// GET  /              welcome
    /// GET  /health        health check
    /// ANY  /api/heroes…   REST routes
    /// POST /graphql       GraphQL (GET serves GraphiQL when enabled)
    /// ```
    pub fn create_router(&self) -> Router {
        let schema = create_schema(self.service.clone());
        let graphql_route = if self.config.graphiql_enabled {
            get(graphiql).post(graphql_handler)
        } else {
            post(graphql_handler)
        };

        let gate = Arc::new(OriginGate::for_port(
            self.config.allowed_origins.clone(),
            self.config.port,
        ));

        Router::new()
            .route("/", get(handlers::welcome))
            .route("/health", get(handlers::health_check))
            .route("/graphql", graphql_route)
            .with_state(schema)
            .nest("/api", api::create_router(self.service.clone()))
            .layer(middleware::from_fn_with_state(gate, origin_gate))
            .layer(TraceLayer::new_for_http())
    }

    pub async fn run(self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|e| {
                HeroServiceError::Configuration(format!(
                    "invalid listen address {}:{}: {}",
                    self.config.host, self.config.port, e
                ))
            })?;

        let app = self.create_router();

        info!("🚀 Hero server running on http://localhost:{}", self.config.port);
        info!("📋 REST API: http://localhost:{}/api/heroes", self.config.port);
        info!("🔗 GraphQL endpoint: http://localhost:{}/graphql", self.config.port);

        Server::try_bind(&addr)
            .map_err(|e| HeroServiceError::Internal(format!("Failed to bind {}: {}", addr, e)))?
            .serve(app.into_make_service())
            .await
            .map_err(|e| HeroServiceError::Internal(format!("Server error: {}", e)))?;
        Ok(())
    }
}

/// Builder for [`HeroServer`]
///
/// Without an explicit service the server runs on an in-memory store with the
/// default envelope secret.
pub struct HeroServerBuilder {
    config: HeroServerConfig,
    service: Option<HeroService>,
}

impl HeroServerBuilder {
    pub fn new() -> Self {
        Self {
            config: HeroServerConfig::default(),
            service: None,
        }
    }

    pub fn with_config(mut self, config: HeroServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn with_service(mut self, service: HeroService) -> Self {
        self.service = Some(service);
        self
    }

    pub fn build(self) -> HeroServer {
        let service = self.service.unwrap_or_else(|| {
            HeroService::new(
                Arc::new(InMemoryDocumentStore::new()),
                EnvelopeCodec::new(crate::settings::DEFAULT_TOKEN_SECRET),
            )
        });
        HeroServer::new(self.config, service)
    }

    pub async fn build_and_run(self) -> Result<()> {
        self.build().run().await
    }
}

impl Default for HeroServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
