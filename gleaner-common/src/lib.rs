//! Shared plumbing for the gleaner workspace.
//!
//! Currently this is just the [`observability`] module: every gleaner
//! binary and integration test initialises `tracing` through the same
//! helper so log output lands in one predictable place. The crate is
//! intentionally lightweight so every member can depend on it without
//! dragging in heavy transitive costs.

pub mod observability;
