// Hero Service Engine
// This contains the operations, storage backends and API interfaces

//! # Hero Engine Module
//!
//! The engine is the layer between the domain models and the transports.
//!
//! ## Architecture Overview
//!
//! - **Domain Models**: Plain data (in `models/`)
//! - **Engine Layer**: Operations, validation and storage (this module)
//! - **Transport Layer**: REST handlers (`api/`) and the HTTP server (`server/`)
//!
//! ## Engine Components
//!
//! ### Hero Service (`service` module)
//! - The single implementation of list, get, create, update and delete
//! - Shared by REST, GraphQL and the admin CLI
//!
//! ### Validation (`validation` module)
//! - Enforces the Hero shape and normalises ids
//!
//! ### Envelope Codec (`envelope` module)
//! - Verifies signed `{token}` creates and issues new envelopes
//!
//! ### Store Adapter (`repository` module)
//! - Turns hero operations into document store calls
//! - Strips store internals from everything it returns
//!
//! ### Storage Engine (`storage` and `nats_storage` modules)
//! - The `DocumentStore` trait and its in-memory backend
//! - A NATS JetStream key-value backend
//!
//! ### GraphQL Engine (`graphql` module)
//! - Schema and resolvers over `HeroService`
//!
//! ## Rust Learning Notes:
//!
//! ### Module Organization Pattern
//! 1. Create a directory with the module name (`engine/`)
//! 2. Add a `mod.rs` file as the module root
//! 3. Declare submodules in `mod.rs`
//! 4. Re-export important types for clean API

/// Signed envelope tokens
pub mod envelope;

/// GraphQL schema and resolvers
pub mod graphql;

/// NATS JetStream key-value document store
pub mod nats_storage;

/// Hero-shaped adapter over a document store
pub mod repository;

/// Hero operations
pub mod service;

/// Storage abstraction layer
///
/// Contains:
/// - `DocumentStore` trait definition
/// - In-memory implementation
/// - Filters and write summaries
pub mod storage;

/// Hero shape checks and id normalisation
pub mod validation;

pub use envelope::EnvelopeCodec;
pub use graphql::{create_schema, HeroSchema};
pub use repository::HeroRepository;
pub use service::{CreateOutcome, HeroService};
pub use storage::{DocumentStore, Filter, InMemoryDocumentStore};
