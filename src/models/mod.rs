// Core domain models for the Hero service

//! # Domain Models Module
//!
//! The service keeps exactly one kind of record, the [`Hero`]. This module
//! holds it together with the shapes clients send in:
//! - [`HeroInput`] for creates, where the id is optional
//! - [`HeroPatch`] for partial updates matched by id
//! - [`CreatePayload`] to tell single, batch and envelope creates apart

pub mod hero;

pub use hero::{default_heroes, CreatePayload, Hero, HeroInput, HeroPatch};
