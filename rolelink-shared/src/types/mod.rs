mod audit;
mod config;
mod directory;
mod event;
mod ids;
mod plan;
mod role_graph;

pub use audit::{AuditAction, AuditEvent};
pub use config::{CommandPermissions, ConfigDocument};
pub use directory::{Channel, MemberContext, MemberPermissions, Role};
pub use event::{MemberKey, RoleChangeEvent, RoleDelta};
pub use ids::{ChannelId, GuildId, MemberId, RoleId};
pub use plan::{PlanBatch, PlannedChange, PropagationPlan};
pub use role_graph::RoleGraph;
