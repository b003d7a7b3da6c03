//! Rolelink Library
//!
//! Configuration management, error handling and dependency wiring for the
//! rolelink replay service.

pub mod config;
pub mod errors;

pub use config::{Dependencies, Settings};
pub use errors::AppError;
