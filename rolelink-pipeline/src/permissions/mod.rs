//! Guild-scoped command permissions.
//!
//! Each guild maps a command name to the roles allowed to run it. Privileged
//! members bypass the table; everyone else needs an entry that shares at least
//! one role with them. A missing entry denies.
mod registry;

pub use registry::{GrantOutcome, PermissionRegistry, RevokeOutcome};
