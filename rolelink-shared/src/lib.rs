//! # Rolelink Shared
//! This crate defines the data structures shared across the rolelink crates:
//! directory identifiers, the per-guild role graph, the persisted configuration
//! document, role change events, propagation plans and audit events.
pub mod types;
