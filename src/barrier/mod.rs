//! Barrier module - completion counting for joined task groups.

mod counter;

pub use counter::*;
