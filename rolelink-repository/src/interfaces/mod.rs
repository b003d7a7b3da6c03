//! This module defines and re-exports the interfaces for the configuration
//! repository.
mod config_repository;

pub use config_repository::{ConfigMutation, ConfigRepository};
