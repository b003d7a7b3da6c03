//! Administrator-facing configuration operations.
//!
//! Both stores are thin, typed layers over the injected
//! [`ConfigRepository`](rolelink_repository::ConfigRepository): every write is
//! a single transactional `mutate`, every read a single snapshot.
mod guild_settings;
mod role_graph;

pub use guild_settings::{GuildOverview, GuildSettingsStore};
pub use role_graph::{MAX_CHILDREN_PER_PARENT, RoleGraphStore};
