//! CLI command handlers, one per file.

mod extract;
mod schedule;
mod status;

pub use extract::run_extract;
pub use schedule::run_schedule;
pub use status::run_status;

#[cfg(test)]
pub(crate) use schedule::launcher;
#[cfg(test)]
pub(crate) use status::render_status;
