//! Migration engine: parsing, version tracking, and the apply/rollback
//! state machine
//!
//! This module provides:
//! - Up/down changeset files with `-- migrate:up` / `-- migrate:down` markers
//! - Version-ordered loading from a migrations directory
//! - A single-row version tracker with a dirty flag
//! - A runner enforcing the clean/dirty state machine
//! - Structured status reporting

pub mod changeset;
pub mod parser;
pub mod report;
pub mod runner;
pub mod tracker;

// Re-export main types for convenience
pub use changeset::Changeset;
pub use parser::Parser;
pub use report::{JsonRenderer, PlainRenderer, StatusEntry, StatusRenderer, StatusReport};
pub use runner::Runner;
pub use tracker::Tracker;
