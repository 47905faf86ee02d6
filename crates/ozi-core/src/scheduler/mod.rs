//! Scheduler: a bounded pool of workers that run each pending task as a child
//! process and record the outcome in the task store.

mod command;
mod pool;

pub use command::{log_file_name, task_args, Launcher};
pub use pool::{run_pool, PoolSettings, PoolSummary};
