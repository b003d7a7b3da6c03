//! Configuration module for rolelink.
//! Reads settings from the environment and wires the pipeline together.
mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::Settings;
