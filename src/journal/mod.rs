//! Journal module for task marker events.
//!
//! Provides:
//! - `EventJournal`: in-memory collection of markers with optional stdout echo
//!   and JSONL persistence

mod events;

pub use events::*;
