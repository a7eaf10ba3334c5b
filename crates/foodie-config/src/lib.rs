//! Configuration management for foodie-tours
//!
//! Hierarchical configuration with discovery and precedence: CLI > file > defaults.
//! The TOML file lives at `.foodie-tours/config.toml` and has `[defaults]`,
//! `[weather]`, `[execution]` and `[orchestrator]` sections.

mod discovery;
mod model;
mod validation;

pub use discovery::CONFIG_DIR_NAME;
pub use model::*;
