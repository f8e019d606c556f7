// Hero Service - Rust Edition
// A small record-keeping service for Hero documents, exposed over REST and GraphQL

//! # Hero Service Library
//!
//! This is the library crate behind the `server` and `admin` binaries. It keeps
//! a collection of [`Hero`] records in a pluggable document store and exposes
//! the same five operations (list, get, create, update, delete) over two
//! transports.
//!
//! ## Core Components
//!
//! ### Domain Models
//! - [`Hero`]: The only record type, `{id, name}`
//! - [`HeroInput`] / [`HeroPatch`]: Inbound shapes for create and update
//! - [`CreatePayload`]: A single hero, a batch, or a signed envelope
//!
//! ### Engine
//!
//! #### [`HeroService`] - The Operation Contract
//!
//! Every transport calls into `HeroService`. It validates and normalises the
//! input, unwraps signed envelopes, assigns ids to new heroes and delegates
//! to the store adapter.
//!
//! **Id assignment:** a hero created without an id receives
//! `current document count + 1`. The count and the insert are two separate
//! store calls, so concurrent creates can hand out the same id. Existing
//! clients rely on these ids, so the heuristic is kept as-is.
//!
//! #### [`DocumentStore`] - Storage Abstraction
//!
//! The store is an injected dependency with two backends:
//! - [`InMemoryDocumentStore`] for development and tests
//! - [`NATSDocumentStore`] backed by a NATS JetStream key-value bucket
//!
//! ### Transports
//! - REST under `/api/heroes` ([`api`])
//! - GraphQL under `/graphql` ([`engine::graphql`])
//! - A shared origin gate that answers CORS headers for every request
//!
//! ## Rust Learning Notes:
//!
//! ### Re-exports
//! `pub use` statements create shortcuts so users don't need to know the
//! internal module structure. Instead of
//! `use hero_service::engine::service::HeroService`, users can write
//! `use hero_service::HeroService`.

// Core domain models
pub mod models;

// Operations, validation, envelope tokens and storage backends
pub mod engine;

// REST transport
pub mod api;

// HTTP server wiring (REST + GraphQL + origin gate)
pub mod server;

// Layered configuration
pub mod settings;

pub use models::{CreatePayload, Hero, HeroInput, HeroPatch};

pub use engine::{
    envelope::EnvelopeCodec,
    graphql::{create_schema, HeroSchema},
    nats_storage::{NATSDocumentStore, NATSDocumentStoreConfig},
    service::{CreateOutcome, HeroService},
    storage::{
        DeleteSummary, Document, DocumentStore, Filter, InMemoryDocumentStore,
        InsertManySummary, UpdateSummary,
    },
};

pub use server::{HeroServer, HeroServerBuilder, HeroServerConfig};

pub use settings::{Settings, StoreBackend};

use thiserror::Error;

/// Error kinds produced by hero operations
///
/// Internally every failure is typed. Only the transport boundary flattens
/// it into the legacy `{message}` wire shape.
///
/// ## Rust Learning Notes:
///
/// ### The `thiserror` Crate
/// - `#[derive(Error)]` implements the `std::error::Error` trait
/// - `#[error("...")]` provides the `Display` text, which is also the text
///   REST clients see in the `message` field
/// - `#[from]` enables automatic conversion with the `?` operator
#[derive(Error, Debug)]
pub enum HeroServiceError {
    /// Malformed hero, body or path parameter
    #[error("ValidationError: {0}")]
    Validation(String),

    /// The signed envelope could not be verified
    /// `name` and `message` mirror the token library's error naming
    #[error("<{name}, {message}>")]
    TokenVerification { name: String, message: String },

    /// The document store rejected a call
    #[error("StoreError: {0}")]
    Storage(#[from] anyhow::Error),

    /// A lookup that requires a record found nothing
    #[error("NotFound: {0}")]
    NotFound(String),

    /// JSON serialization/deserialization errors
    #[error("SerializationError: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid or incomplete settings
    #[error("ConfigurationError: {0}")]
    Configuration(String),

    /// Internal server error
    #[error("InternalError: {0}")]
    Internal(String),
}

impl HeroServiceError {
    /// Stable name of the failure kind, independent of the message text
    pub fn kind(&self) -> &'static str {
        match self {
            HeroServiceError::Validation(_) => "ValidationFailure",
            HeroServiceError::TokenVerification { .. } => "TokenVerificationFailure",
            HeroServiceError::Storage(_) => "StoreFailure",
            HeroServiceError::NotFound(_) => "NotFound",
            HeroServiceError::Serialization(_) => "SerializationFailure",
            HeroServiceError::Configuration(_) => "ConfigurationFailure",
            HeroServiceError::Internal(_) => "InternalFailure",
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        HeroServiceError::Validation(message.into())
    }
}

impl From<std::io::Error> for HeroServiceError {
    fn from(err: std::io::Error) -> Self {
        HeroServiceError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for HeroServiceError {
    fn from(err: config::ConfigError) -> Self {
        HeroServiceError::Configuration(err.to_string())
    }
}

/// Type alias for Results that use our custom error type
pub type Result<T> = std::result::Result<T, HeroServiceError>;
