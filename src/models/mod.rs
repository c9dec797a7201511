//! Core data models for taskrun.
//!
//! - `config`: user-tunable parameters, loaded from TOML
//! - `error`: crate error taxonomy
//! - `task`: task identity, marker events, run statistics

mod config;
mod error;
mod task;

pub use config::*;
pub use error::*;
pub use task::*;
