//! This module defines the `MutationApplier`, which executes a propagation
//! plan against the directory.
//!
//! Every role is applied independently: one failure never stops its
//! siblings. Transient failures are retried once; permanent failures are
//! recorded and skipped.
mod applier;

pub use applier::{AppliedResult, MutationApplier, RetryPolicy, RoleFailure};
