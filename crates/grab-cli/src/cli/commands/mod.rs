//! CLI command handlers, one file per command.

mod batch;
mod checksum;
mod get;
mod history;
mod output;
mod stats;

pub use batch::{run_batch, run_list};
pub use checksum::run_checksum;
pub use get::run_get;
pub use history::run_history;
pub use stats::run_stats;
