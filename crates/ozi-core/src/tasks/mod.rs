//! Durable task document (YAML) and the single-lock store the worker pool
//! pulls from.

pub mod document;
pub mod store;
pub mod types;


pub use document::{load, save};
pub use store::{StoreError, TaskStore};
pub use types::*;
