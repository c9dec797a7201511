//! Pool module - task runner, its scope, and the marker task.

mod marker;
mod runner;
mod scope;

pub use marker::*;
pub use runner::*;
pub use scope::*;
