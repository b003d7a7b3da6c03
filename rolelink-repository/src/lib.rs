//! # Rolelink Repository
//! This crate provides the configuration repository used by the rolelink
//! pipeline. It includes the repository interface, its error types, a JSON
//! file implementation and an in-memory implementation for tests.
pub mod errors;
pub mod interfaces;
pub mod json;
pub mod memory;

mod snapshot;

pub use errors::ConfigRepositoryError;
pub use interfaces::{ConfigMutation, ConfigRepository};
pub use json::JsonFileConfigRepository;
pub use memory::InMemoryConfigRepository;
