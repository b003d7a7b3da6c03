//! Processor module: turns a role delta into a propagation plan.
mod propagation;

pub use propagation::plan;
