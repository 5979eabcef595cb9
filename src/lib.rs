//! Halp Notes application library
//!
//! This library provides a versioned note store with tag normalization,
//! history navigation, search across old versions, and pluggable
//! persistence of the whole collection as a single JSON slot.

mod cli;
mod clock;
mod collection;
mod config;
mod defaults;
mod errors;
mod helper;
mod history;
mod note;
mod persistence;
mod query;
mod save_scheduler;
mod store;
mod tags;
mod types;

// Re-export key components
pub use cli::*;
pub use clock::*;
pub use collection::*;
pub use config::*;
pub use defaults::*;
pub use errors::*;
pub use helper::*;
pub use history::*;
pub use note::*;
pub use persistence::*;
pub use query::*;
pub use save_scheduler::*;
pub use store::*;
pub use tags::*;
pub use types::*;
