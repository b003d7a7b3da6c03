mod audit;
mod command;
mod consumer;
mod directory;
mod orchestrator;
mod permission;
mod store;

pub use audit::AuditError;
pub use command::CommandError;
pub use consumer::ConsumerError;
pub use directory::{DirectoryError, ExternalErrorKind};
pub use orchestrator::OrchestratorError;
pub use permission::PermissionError;
pub use store::StoreError;
