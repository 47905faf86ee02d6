pub mod config;
pub mod logging;

pub mod api;
pub mod extract;
pub mod pipeline;
pub mod retry;
pub mod scheduler;
pub mod tasks;
pub mod warehouse;
