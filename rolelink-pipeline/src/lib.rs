//! # Rolelink Pipeline
//!
//! Keeps derived role membership in sync with a configured parent → child
//! role graph.
//!
//! ## Architecture
//!
//! 1. **Consumer**: receives role change events and diffs the snapshots
//! 2. **Processor**: plans the grants and revokes for one event
//! 3. **Loader**: applies the plan against the directory, with retry
//! 4. **Audit**: records one event per applied batch
//! 5. **Orchestrator**: serializes work per member and runs members in parallel
//!
//! The [`store`] and [`permissions`] modules hold the administrator-facing
//! configuration operations, and [`commands`] the moderator role commands.
pub mod audit;
pub mod commands;
pub mod consumer;
pub mod directory;
pub mod errors;
pub mod loader;
pub mod orchestrator;
pub mod permissions;
pub mod processor;
pub mod store;
