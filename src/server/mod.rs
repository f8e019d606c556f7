// Hero Service Server
// This contains the HTTP server that exposes the hero operations

//! # Hero Server Module
//!
//! The server layer sits on top of the engine layer and makes the hero
//! operations network-accessible.
//!
//! ## Server Architecture
//!
//! ```text
//! Client (browser, curl, GraphiQL)
//!        ↓ HTTP
//! Origin gate + request tracing
//!        ↓
//! REST routes (/api)    GraphQL (/graphql)
//!        ↓ Function calls
//! HeroService ← validation, envelopes, id assignment
//!        ↓
//! DocumentStore ← in-memory or NATS KV
//! ```
//!
//! ## Rust Learning Notes:
//!
//! This module demonstrates:
//! - Composing several axum routers with different state types
//! - `middleware::from_fn_with_state` for cross-cutting concerns
//! - Configuration and builder patterns

/// Startup banner
pub mod banner;

/// GraphQL endpoint handlers
pub mod graphql;

/// Axum server, router composition and builder
pub mod http;

/// Re-export server types
///
/// - HeroServer: The main server instance
/// - HeroServerConfig: Configuration options
/// - HeroServerBuilder: Builder pattern for easy setup
pub use http::{HeroServer, HeroServerBuilder, HeroServerConfig};
