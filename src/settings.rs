// Layered configuration for the hero service
// Defaults, then HERO_* environment variables, then the legacy API_PORT variable

//! # Settings
//!
//! Loaded with the `config` crate. Layers, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. `HERO_*` environment variables (`HERO_STORE=nats`, `HERO_NATS_URL=...`)
//! 3. `API_PORT`, kept for existing deployments
//!
//! The binaries load `.env` with `dotenv` before calling [`Settings::load`]
//! and apply their CLI flags on top of the result.
//!
//! `HERO_ALLOWED_ORIGINS` is a comma-separated list.

use std::collections::HashMap;
use std::sync::Arc;

use config::{Config, Environment};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::middleware::default_origins;
use crate::engine::envelope::EnvelopeCodec;
use crate::engine::nats_storage::{NATSDocumentStore, NATSDocumentStoreConfig};
use crate::engine::service::HeroService;
use crate::engine::storage::{DocumentStore, InMemoryDocumentStore};
use crate::server::HeroServerConfig;
use crate::{HeroServiceError, Result};

pub const DEFAULT_TOKEN_SECRET: &str = "myHeroes";

/// Which document store backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Nats,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Memory => write!(f, "memory"),
            StoreBackend::Nats => write!(f, "nats"),
        }
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = HeroServiceError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "nats" => Ok(StoreBackend::Nats),
            other => Err(HeroServiceError::Configuration(format!(
                "unknown store backend '{}', expected 'memory' or 'nats'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub host: String,
    pub api_port: u16,
    pub store: StoreBackend,
    pub nats_url: String,
    pub nats_bucket: String,
    pub token_secret: String,
    pub allowed_origins: Vec<String>,
    pub graphiql: bool,
    pub seed_defaults: bool,
    pub log_level: String,
}

impl Settings {
    /// Load from the process environment
    pub fn load() -> Result<Self> {
        Self::from_sources(None, std::env::var("API_PORT").ok())
    }

    /// Load from an explicit environment map instead of the process environment
    pub fn from_env_map(env: HashMap<String, String>) -> Result<Self> {
        let api_port = env.get("API_PORT").cloned();
        Self::from_sources(Some(env), api_port)
    }

    fn from_sources(env: Option<HashMap<String, String>>, api_port: Option<String>) -> Result<Self> {
        let settings: Settings = Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("api_port", 8080)?
            .set_default("store", "memory")?
            .set_default("nats_url", "nats://localhost:4222")?
            .set_default("nats_bucket", "heroes")?
            .set_default("token_secret", DEFAULT_TOKEN_SECRET)?
            .set_default("allowed_origins", default_origins())?
            .set_default("graphiql", true)?
            .set_default("seed_defaults", false)?
            .set_default("log_level", "info")?
            .add_source(
                Environment::with_prefix("HERO")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("allowed_origins")
                    .source(env),
            )
            .set_override_option("api_port", api_port)?
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.token_secret.is_empty() {
            return Err(HeroServiceError::Configuration(
                "token_secret must not be empty".to_string(),
            ));
        }
        if self.nats_bucket.trim().is_empty() {
            return Err(HeroServiceError::Configuration(
                "nats_bucket must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn server_config(&self) -> HeroServerConfig {
        HeroServerConfig {
            host: self.host.clone(),
            port: self.api_port,
            graphiql_enabled: self.graphiql,
            allowed_origins: self.allowed_origins.clone(),
        }
    }

    pub fn nats_config(&self) -> NATSDocumentStoreConfig {
        NATSDocumentStoreConfig {
            nats_url: self.nats_url.clone(),
            bucket: self.nats_bucket.clone(),
            ..Default::default()
        }
    }

    /// Construct the configured store backend
    pub async fn build_store(&self) -> Result<Arc<dyn DocumentStore>> {
        match self.store {
            StoreBackend::Memory => {
                info!("📦 Using in-memory document store");
                Ok(Arc::new(InMemoryDocumentStore::new()))
            }
            StoreBackend::Nats => {
                info!("📡 Using NATS document store at {}", self.nats_url);
                let store = NATSDocumentStore::connect(self.nats_config()).await?;
                Ok(Arc::new(store))
            }
        }
    }

    /// The hero service over the configured store and secret
    pub async fn build_service(&self) -> Result<HeroService> {
        let store = self.build_store().await?;
        Ok(HeroService::new(store, EnvelopeCodec::new(&self.token_secret)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_env_map(HashMap::new()).unwrap();
        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.api_port, 8080);
        assert_eq!(settings.store, StoreBackend::Memory);
        assert_eq!(settings.token_secret, "myHeroes");
        assert_eq!(settings.allowed_origins, default_origins());
        assert!(settings.graphiql);
        assert!(!settings.seed_defaults);
    }

    #[test]
    fn test_environment_overrides() {
        let settings = Settings::from_env_map(env(&[
            ("HERO_STORE", "nats"),
            ("HERO_NATS_URL", "nats://nats:4222"),
            ("HERO_SEED_DEFAULTS", "true"),
            ("HERO_ALLOWED_ORIGINS", "http://a.example,http://b.example"),
        ]))
        .unwrap();

        assert_eq!(settings.store, StoreBackend::Nats);
        assert_eq!(settings.nats_config().nats_url, "nats://nats:4222");
        assert!(settings.seed_defaults);
        assert_eq!(
            settings.allowed_origins,
            vec!["http://a.example".to_string(), "http://b.example".to_string()]
        );
    }

    #[test]
    fn test_api_port_wins_over_prefixed_port() {
        let settings = Settings::from_env_map(env(&[
            ("HERO_API_PORT", "7000"),
            ("API_PORT", "9000"),
        ]))
        .unwrap();
        assert_eq!(settings.api_port, 9000);
        assert_eq!(settings.server_config().port, 9000);
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        let err = Settings::from_env_map(env(&[("HERO_TOKEN_SECRET", "")])).unwrap_err();
        assert_eq!(err.kind(), "ConfigurationFailure");
    }

    #[test]
    fn test_store_backend_from_str() {
        assert_eq!("NATS".parse::<StoreBackend>().unwrap(), StoreBackend::Nats);
        assert!("mongo".parse::<StoreBackend>().is_err());
    }
}
